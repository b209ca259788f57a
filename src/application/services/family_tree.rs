//! Family tree editing service
//!
//! The single entry point the presentation layer talks to: add a member, link a
//! spouse, undo, export, and read rows/connectors for rendering. Every mutation
//! resolves a [`Transaction`](crate::domain::Transaction), applies it to the
//! current store in one step and commits exactly one snapshot. A failed call
//! leaves both the store and the history as they were.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{SeedConfig, Settings};
use crate::domain::{
    Connector, ConnectorStyle, DomainError, FamilyMember, Layout, Level, MemberId, MemberInput,
    ModelPolicy, Placement, Relation, RelationshipModel, Resolver, Selector, SelectorKind,
    SnapshotHistory, TreeStore,
};

/// Message returned by [`FamilyTreeService::export`].
pub const EXPORT_NOTICE: &str = "Tree is ready to print!";

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub member: MemberId,
    /// Links that could not be made; the member was added without them.
    pub notices: Vec<DomainError>,
}

/// Family tree editing session.
pub struct FamilyTreeService {
    resolver: Resolver,
    connector_style: ConnectorStyle,
    history: SnapshotHistory,
}

impl FamilyTreeService {
    /// Start a session holding only the seed member.
    pub fn new(settings: &Settings) -> ApplicationResult<Self> {
        settings.validate()?;
        let resolver = Resolver::new(settings.model);
        let seed = seed_member(resolver.policy(), &settings.seed)?;
        info!(
            "session: model={} seed={}",
            settings.model, settings.seed.name
        );
        Ok(Self {
            resolver,
            connector_style: settings.connector_style,
            history: SnapshotHistory::new(TreeStore::seeded(seed)),
        })
    }

    /// Session with default settings for `model`.
    pub fn with_model(model: RelationshipModel) -> ApplicationResult<Self> {
        Self::new(&Settings {
            model,
            ..Settings::default()
        })
    }

    pub fn model(&self) -> RelationshipModel {
        self.resolver.model()
    }

    pub fn policy(&self) -> &'static ModelPolicy {
        self.resolver.policy()
    }

    pub fn connector_style(&self) -> ConnectorStyle {
        self.connector_style
    }

    /// Live member set.
    pub fn tree(&self) -> &TreeStore {
        self.history.current()
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Add a member described by dialog input.
    ///
    /// # Errors
    /// - Validation errors for missing name, birth date or selector.
    /// - `TooManyParents` when the anchor already has two parents.
    pub fn add_member(
        &mut self,
        input: &MemberInput,
        selector: &Selector,
    ) -> ApplicationResult<AddOutcome> {
        debug!("add_member: name={:?} selector={:?}", input.name, selector);
        let tx = self.resolver.resolve(self.tree(), input, selector)?;
        let next = self.tree().append(&tx)?;
        self.history.commit(next);
        info!(
            "add_member: {} at level {} ({} members)",
            tx.record.name,
            tx.record.level,
            self.tree().len()
        );
        Ok(AddOutcome {
            member: tx.record.id,
            notices: tx.notices,
        })
    }

    /// Create a spouse for `member` and link both ways.
    ///
    /// Returns the new spouse's id.
    pub fn add_spouse(&mut self, member: MemberId, spouse_name: &str) -> ApplicationResult<MemberId> {
        debug!("add_spouse: member={} name={:?}", member, spouse_name);
        let tx = self.resolver.link_spouse(self.tree(), member, spouse_name)?;
        let next = self.tree().append(&tx)?;
        self.history.commit(next);
        info!("add_spouse: {} linked to {}", tx.record.name, member);
        Ok(tx.record.id)
    }

    /// Roll back the last mutation. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(restored) => {
                info!("undo: restored {} members", restored.len());
                true
            }
            None => {
                debug!("undo: nothing to undo");
                false
            }
        }
    }

    /// Export stub: no file or print pipeline, only a notification.
    pub fn export(&self) -> String {
        info!("export: {} members", self.tree().len());
        EXPORT_NOTICE.to_string()
    }

    /// Occupied levels, ascending.
    pub fn list_levels(&self) -> Vec<Level> {
        self.tree().levels()
    }

    pub fn members_at_level(&self, level: Level) -> Vec<Arc<FamilyMember>> {
        self.tree().by_level(level).cloned().collect()
    }

    pub fn members_by_relation(&self, relation: Relation) -> Vec<Arc<FamilyMember>> {
        self.tree().by_relation(relation).cloned().collect()
    }

    pub fn connectors_for_level(&self, level: Level) -> Vec<Connector> {
        self.layout().connectors_for_level(level).cloned().collect()
    }

    pub fn layout(&self) -> Layout {
        Layout::compute(self.tree(), self.policy(), self.connector_style)
    }

    pub fn level_label(&self, level: Level) -> String {
        self.policy().level_label(level)
    }

    /// Card label: "You" for the anchor, otherwise relation or generation.
    pub fn member_label(&self, member: &FamilyMember) -> String {
        if self.tree().anchor_id() == Some(member.id) {
            return Relation::Myself.label().to_string();
        }
        match member.placement {
            Placement::Relation(relation) => relation.label().to_string(),
            Placement::Generation(generation) => format!("Generation {}", generation),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<MemberId> {
        self.tree().find_by_name(name).map(|m| m.id)
    }
}

fn seed_member(policy: &ModelPolicy, seed: &SeedConfig) -> ApplicationResult<FamilyMember> {
    let (placement, level) = match policy.selector {
        SelectorKind::Relation => {
            let rule = policy.rule(Relation::Myself).ok_or_else(|| {
                warn!("seed: {} model has no self rule", policy.model);
                ApplicationError::Config {
                    message: format!("{} model cannot place the seed member", policy.model),
                }
            })?;
            (Placement::Relation(Relation::Myself), rule.level)
        }
        SelectorKind::Generation => (Placement::Generation(seed.generation), seed.generation),
    };
    Ok(FamilyMember {
        id: MemberId::new(),
        name: seed.name.trim().to_string(),
        birth_date: Some(seed.birth_date),
        death_date: None,
        photo: None,
        placement,
        level,
        parent_ids: Vec::new(),
        spouse_id: None,
    })
}
