//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod family_tree;

pub use family_tree::{AddOutcome, FamilyTreeService, EXPORT_NOTICE};
