//! Domain layer: entities and relationship logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod history;
pub mod layout;
pub mod model;
pub mod resolver;
pub mod store;

pub use entities::*;
pub use error::{DomainError, DomainResult, ValidationError};
pub use history::SnapshotHistory;
pub use layout::{Connector, ConnectorStyle, Layout, Point, Row, Slot, MIN_GRID_COLUMNS};
pub use model::{LinkRule, ModelPolicy, RelationRule, RelationshipModel, SelectorKind};
pub use resolver::{Resolver, Transaction};
pub use store::TreeStore;
