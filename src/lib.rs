//! Family tree editor core.
//!
//! Given a new relative's dialog input and the relation (or generation) the user
//! picked, [`domain::Resolver`] works out the member's level and parent/spouse
//! links, [`domain::TreeStore`] applies the result atomically,
//! [`domain::SnapshotHistory`] keeps one snapshot per edit for undo, and
//! [`domain::Layout`] derives rows and connector geometry for rendering.
//! [`application::services::FamilyTreeService`] ties them together.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::services::{AddOutcome, FamilyTreeService};
pub use application::{ApplicationError, ApplicationResult};
pub use config::Settings;
