//! Relationship resolver: turns dialog input plus a selector into a transaction.
//!
//! The resolver only reads the store. Whatever it derives (the new record and
//! replacements for existing records it links to) travels in one
//! [`Transaction`] so the store can apply it as a single snapshot.

use tracing::{debug, instrument, warn};

use crate::domain::entities::{
    FamilyMember, Level, MemberId, MemberInput, Placement, Relation, Selector, ValidInput,
    MAX_PARENTS,
};
use crate::domain::error::{DomainError, DomainResult, ValidationError};
use crate::domain::model::{LinkRule, ModelPolicy, RelationshipModel};
use crate::domain::store::TreeStore;

/// One indivisible change to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The member being added.
    pub record: FamilyMember,
    /// Existing members with their links rewritten.
    pub updates: Vec<FamilyMember>,
    /// Links skipped on the way (non-fatal).
    pub notices: Vec<DomainError>,
}

impl Transaction {
    fn new(record: FamilyMember) -> Self {
        Self {
            record,
            updates: Vec::new(),
            notices: Vec::new(),
        }
    }
}

/// Applies one model's rules to new members.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    policy: &'static ModelPolicy,
}

impl Resolver {
    pub fn new(model: RelationshipModel) -> Self {
        Self {
            policy: model.policy(),
        }
    }

    pub fn model(&self) -> RelationshipModel {
        self.policy.model
    }

    pub fn policy(&self) -> &'static ModelPolicy {
        self.policy
    }

    /// Resolve a new member's level and links.
    ///
    /// # Errors
    /// - `Validation` when a required field or the selector is missing/invalid.
    /// - `TooManyParents` when adding a parent to an anchor that already has two.
    #[instrument(level = "debug", skip(self, store, input), fields(model = %self.policy.model))]
    pub fn resolve(
        &self,
        store: &TreeStore,
        input: &MemberInput,
        selector: &Selector,
    ) -> DomainResult<Transaction> {
        let valid = input.validate()?;
        self.policy.check_selector(selector)?;

        let tx = match *selector {
            Selector::Relation(relation) => self.resolve_relation(store, valid, relation)?,
            Selector::Generation { generation, parent } => {
                self.resolve_generation(store, valid, generation, parent)
            }
        };
        for notice in &tx.notices {
            warn!("resolve: {}", notice);
        }
        debug!(
            "resolve: level={} parents={} updates={}",
            tx.record.level,
            tx.record.parent_ids.len(),
            tx.updates.len()
        );
        Ok(tx)
    }

    fn resolve_relation(
        &self,
        store: &TreeStore,
        valid: ValidInput,
        relation: Relation,
    ) -> DomainResult<Transaction> {
        let rule = self
            .policy
            .rule(relation)
            .ok_or(ValidationError::RelationNotInModel {
                relation,
                model: self.policy.model,
            })?;

        let id = MemberId::new();
        let mut parent_ids = Vec::new();
        let mut updates = Vec::new();
        let mut notices = Vec::new();

        if rule.link != LinkRule::Unlinked {
            match store.find_anchor() {
                None => notices.push(DomainError::AnchorMissing(relation)),
                Some(anchor) => match rule.link {
                    LinkRule::ParentOfAnchor => {
                        if anchor.parent_ids.len() >= MAX_PARENTS {
                            return Err(DomainError::TooManyParents(anchor.id));
                        }
                        let mut updated = FamilyMember::clone(anchor);
                        updated.parent_ids.push(id);
                        updates.push(updated);
                    }
                    LinkRule::SharesAnchorParents => {
                        for &parent in &anchor.parent_ids {
                            if store.contains(parent) {
                                parent_ids.push(parent);
                            } else {
                                notices.push(DomainError::DanglingReference(parent));
                            }
                        }
                    }
                    LinkRule::ChildOfAnchor => parent_ids.push(anchor.id),
                    LinkRule::Unlinked => {}
                },
            }
        }

        let record = valid.into_member(id, Placement::Relation(relation), rule.level, parent_ids);
        Ok(Transaction {
            record,
            updates,
            notices,
        })
    }

    fn resolve_generation(
        &self,
        store: &TreeStore,
        valid: ValidInput,
        generation: Level,
        parent: Option<MemberId>,
    ) -> Transaction {
        let mut parent_ids = Vec::new();
        let mut notices = Vec::new();

        if let Some(parent_id) = parent {
            match store.get(parent_id) {
                None => notices.push(DomainError::DanglingReference(parent_id)),
                Some(chosen) if chosen.level.checked_add(1) != Some(generation) => {
                    notices.push(DomainError::NotAdjacentGeneration {
                        parent: parent_id,
                        parent_level: chosen.level,
                        level: generation,
                    });
                }
                Some(chosen) => {
                    parent_ids.push(chosen.id);
                    if let Some(spouse) = chosen.spouse_id {
                        if store.contains(spouse) {
                            parent_ids.push(spouse);
                        } else {
                            notices.push(DomainError::DanglingReference(spouse));
                        }
                    }
                }
            }
        }

        let record = valid.into_member(
            MemberId::new(),
            Placement::Generation(generation),
            generation,
            parent_ids,
        );
        Transaction {
            record,
            updates: Vec::new(),
            notices,
        }
    }

    /// Create a spouse for `member_id` at the same level, linked both ways.
    ///
    /// # Errors
    /// - `SpouseLinkUnsupported` outside the free-generation model.
    /// - `Validation` for a blank name.
    /// - `DanglingReference` when the member does not exist.
    /// - `SpouseAlreadyLinked` when the member already has a spouse.
    #[instrument(level = "debug", skip(self, store))]
    pub fn link_spouse(
        &self,
        store: &TreeStore,
        member_id: MemberId,
        spouse_name: &str,
    ) -> DomainResult<Transaction> {
        if !self.policy.spouse_links {
            return Err(DomainError::SpouseLinkUnsupported(self.policy.model));
        }
        let name = spouse_name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName.into());
        }
        let target = store
            .get(member_id)
            .ok_or(DomainError::DanglingReference(member_id))?;
        if target.spouse_id.is_some() {
            return Err(DomainError::SpouseAlreadyLinked(member_id));
        }

        let spouse = FamilyMember {
            id: MemberId::new(),
            name: name.to_string(),
            birth_date: None,
            death_date: None,
            photo: None,
            placement: Placement::Generation(target.level),
            level: target.level,
            parent_ids: Vec::new(),
            spouse_id: Some(member_id),
        };
        let mut updated = FamilyMember::clone(target);
        updated.spouse_id = Some(spouse.id);

        let mut tx = Transaction::new(spouse);
        tx.updates.push(updated);
        debug!("link_spouse: {} <-> {}", member_id, tx.record.id);
        Ok(tx)
    }
}
