//! Domain-level errors (no external dependencies)

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::entities::{Level, MemberId, Relation};
use crate::domain::model::RelationshipModel;

/// A required field is missing or malformed.
///
/// Raised before any record is built, so a failing add never touches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,

    #[error("birth date is required")]
    MissingBirthDate,

    #[error("relation or generation is required")]
    MissingRelation,

    #[error("invalid {field} `{value}`: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("death date {death} precedes birth date {birth}")]
    DeathBeforeBirth { birth: NaiveDate, death: NaiveDate },

    #[error("unknown relation `{0}`")]
    UnknownRelation(String),

    #[error("unknown relationship model `{0}`")]
    UnknownModel(String),

    #[error("unknown connector style `{0}`")]
    UnknownConnectorStyle(String),

    #[error("relation `self` is reserved for the seed member")]
    ReservedRelation,

    #[error("relation `{relation}` is not available in the {model} model")]
    RelationNotInModel {
        relation: Relation,
        model: RelationshipModel,
    },

    #[error("the {model} model places members by {expected}")]
    SelectorMismatch {
        model: RelationshipModel,
        expected: &'static str,
    },

    #[error("generation {generation} is out of range (0..{count})")]
    GenerationOutOfRange { generation: Level, count: Level },
}

/// Domain errors represent relationship rule violations.
///
/// Some of them are non-fatal: the resolver records `DanglingReference`,
/// `AnchorMissing` and `NotAdjacentGeneration` as notices on the transaction
/// and continues without the affected link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("member not found: {0}")]
    DanglingReference(MemberId),

    #[error("no anchor member in tree; `{0}` left unlinked")]
    AnchorMissing(Relation),

    #[error("cycle detected in ancestry of member {0}")]
    CycleDetected(MemberId),

    #[error("member {0} cannot be its own parent")]
    SelfParent(MemberId),

    #[error("anchor {0} must be the first member")]
    AnchorNotFirst(MemberId),

    #[error("member already exists: {0}")]
    DuplicateMember(MemberId),

    #[error("member {0} already has two parents")]
    TooManyParents(MemberId),

    #[error("member {0} already has a spouse")]
    SpouseAlreadyLinked(MemberId),

    #[error("spouse linking is not supported by the {0} model")]
    SpouseLinkUnsupported(RelationshipModel),

    #[error("chosen parent {parent} is at level {parent_level}, not directly above level {level}; left unlinked")]
    NotAdjacentGeneration {
        parent: MemberId,
        parent_level: Level,
        level: Level,
    },
}

impl DomainError {
    /// True for conditions the resolver downgrades to notices.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            DomainError::DanglingReference(_)
                | DomainError::AnchorMissing(_)
                | DomainError::NotAdjacentGeneration { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
