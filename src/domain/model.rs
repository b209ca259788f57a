//! Relationship models as data.
//!
//! A tree is created with one [`RelationshipModel`]. Its [`ModelPolicy`] says how
//! a selector maps to a level and which links the resolver derives:
//!
//! ```text
//! four-level      grandparent=0  parent=1  self=2 sibling=2  child=3
//! six-category    as four-level, plus uncle_aunt=1 (never linked)
//! free-generation generation 0..7 chosen explicitly, optional parent, spouses
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Level, Relation, Selector};
use crate::domain::error::ValidationError;

/// Tag selecting one of the supported relationship models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipModel {
    #[default]
    FourLevel,
    SixCategory,
    FreeGeneration,
}

impl RelationshipModel {
    pub const ALL: [RelationshipModel; 3] = [
        RelationshipModel::FourLevel,
        RelationshipModel::SixCategory,
        RelationshipModel::FreeGeneration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipModel::FourLevel => "four-level",
            RelationshipModel::SixCategory => "six-category",
            RelationshipModel::FreeGeneration => "free-generation",
        }
    }

    pub fn policy(self) -> &'static ModelPolicy {
        match self {
            RelationshipModel::FourLevel => &FOUR_LEVEL,
            RelationshipModel::SixCategory => &SIX_CATEGORY,
            RelationshipModel::FreeGeneration => &FREE_GENERATION,
        }
    }
}

impl fmt::Display for RelationshipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipModel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "four-level" | "four" | "4" => Ok(RelationshipModel::FourLevel),
            "six-category" | "six" | "6" => Ok(RelationshipModel::SixCategory),
            "free-generation" | "free" | "8" => Ok(RelationshipModel::FreeGeneration),
            _ => Err(ValidationError::UnknownModel(s.to_string())),
        }
    }
}

/// Link the resolver derives for a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// No automatic links.
    Unlinked,
    /// The anchor gains the new member as a parent.
    ParentOfAnchor,
    /// The new member copies the anchor's parents.
    SharesAnchorParents,
    /// The anchor is the only parent.
    ChildOfAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRule {
    pub relation: Relation,
    pub level: Level,
    pub link: LinkRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Relation,
    Generation,
}

impl SelectorKind {
    fn describe(self) -> &'static str {
        match self {
            SelectorKind::Relation => "relation",
            SelectorKind::Generation => "generation",
        }
    }
}

/// Generation assignment and parent-linking rules of one model.
#[derive(Debug)]
pub struct ModelPolicy {
    pub model: RelationshipModel,
    pub selector: SelectorKind,
    /// Number of rows; levels run `0..level_count`.
    pub level_count: Level,
    pub spouse_links: bool,
    rules: &'static [RelationRule],
}

const fn rule(relation: Relation, level: Level, link: LinkRule) -> RelationRule {
    RelationRule {
        relation,
        level,
        link,
    }
}

const FOUR_LEVEL_RULES: [RelationRule; 5] = [
    rule(Relation::Grandparent, 0, LinkRule::Unlinked),
    rule(Relation::Parent, 1, LinkRule::ParentOfAnchor),
    rule(Relation::Myself, 2, LinkRule::Unlinked),
    rule(Relation::Sibling, 2, LinkRule::SharesAnchorParents),
    rule(Relation::Child, 3, LinkRule::ChildOfAnchor),
];

// uncle_aunt derives no links.
const SIX_CATEGORY_RULES: [RelationRule; 6] = [
    rule(Relation::Grandparent, 0, LinkRule::Unlinked),
    rule(Relation::Parent, 1, LinkRule::ParentOfAnchor),
    rule(Relation::UncleAunt, 1, LinkRule::Unlinked),
    rule(Relation::Myself, 2, LinkRule::Unlinked),
    rule(Relation::Sibling, 2, LinkRule::SharesAnchorParents),
    rule(Relation::Child, 3, LinkRule::ChildOfAnchor),
];

static FOUR_LEVEL: ModelPolicy = ModelPolicy {
    model: RelationshipModel::FourLevel,
    selector: SelectorKind::Relation,
    level_count: 4,
    spouse_links: false,
    rules: &FOUR_LEVEL_RULES,
};

static SIX_CATEGORY: ModelPolicy = ModelPolicy {
    model: RelationshipModel::SixCategory,
    selector: SelectorKind::Relation,
    level_count: 4,
    spouse_links: false,
    rules: &SIX_CATEGORY_RULES,
};

static FREE_GENERATION: ModelPolicy = ModelPolicy {
    model: RelationshipModel::FreeGeneration,
    selector: SelectorKind::Generation,
    level_count: 8,
    spouse_links: true,
    rules: &[],
};

impl ModelPolicy {
    pub fn rule(&self, relation: Relation) -> Option<&RelationRule> {
        self.rules.iter().find(|r| r.relation == relation)
    }

    /// Relations offered by the add-member flow (everything but `self`).
    pub fn selectable_relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.rules
            .iter()
            .map(|r| r.relation)
            .filter(|r| *r != Relation::Myself)
    }

    /// Reject selectors the model cannot place.
    pub fn check_selector(&self, selector: &Selector) -> Result<(), ValidationError> {
        match (self.selector, selector) {
            (SelectorKind::Relation, Selector::Relation(Relation::Myself)) => {
                Err(ValidationError::ReservedRelation)
            }
            (SelectorKind::Relation, Selector::Relation(relation)) => {
                self.rule(*relation)
                    .map(|_| ())
                    .ok_or(ValidationError::RelationNotInModel {
                        relation: *relation,
                        model: self.model,
                    })
            }
            (SelectorKind::Generation, Selector::Generation { generation, .. }) => {
                if *generation < self.level_count {
                    Ok(())
                } else {
                    Err(ValidationError::GenerationOutOfRange {
                        generation: *generation,
                        count: self.level_count,
                    })
                }
            }
            (expected, _) => Err(ValidationError::SelectorMismatch {
                model: self.model,
                expected: expected.describe(),
            }),
        }
    }

    /// Row heading shown above a level.
    pub fn level_label(&self, level: Level) -> String {
        match self.selector {
            SelectorKind::Generation => format!("Generation {}", level),
            SelectorKind::Relation => match (level, self.model) {
                (0, _) => "Grandparents".to_string(),
                (1, RelationshipModel::SixCategory) => "Parents, uncles and aunts".to_string(),
                (1, _) => "Parents".to_string(),
                (2, _) => "You and siblings".to_string(),
                (3, _) => "Children".to_string(),
                (other, _) => format!("Level {}", other),
            },
        }
    }
}
