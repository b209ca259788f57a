//! Tree store: the live, ordered member set and its anchor.
//!
//! A store is a value. [`TreeStore::append`] returns a new store and leaves the
//! receiver untouched, so every snapshot kept for undo stays valid. Records are
//! held behind `Arc`; a new store shares every record the transaction did not
//! replace with the store it was derived from. The pointer vector and the id
//! index are still copied per edit, so a snapshot costs O(n) pointers.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::entities::{FamilyMember, Level, MemberId, Relation, MAX_PARENTS};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::resolver::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStore {
    members: Vec<Arc<FamilyMember>>,
    index: HashMap<MemberId, usize>,
    anchor: Option<MemberId>,
}

impl TreeStore {
    /// Store holding only the seed member, which becomes the anchor.
    pub fn seeded(seed: FamilyMember) -> Self {
        let id = seed.id;
        Self {
            index: HashMap::from([(id, 0)]),
            members: vec![Arc::new(seed)],
            anchor: Some(id),
        }
    }

    /// Build a store from existing records, checking every link invariant.
    ///
    /// The anchor, when given, must be the first record.
    pub fn from_members(
        members: Vec<FamilyMember>,
        anchor: Option<MemberId>,
    ) -> DomainResult<Self> {
        let mut store = Self::default();
        for member in members {
            if store.index.contains_key(&member.id) {
                return Err(DomainError::DuplicateMember(member.id));
            }
            store.index.insert(member.id, store.members.len());
            store.members.push(Arc::new(member));
        }
        if let Some(anchor) = anchor {
            if !store.contains(anchor) {
                return Err(DomainError::DanglingReference(anchor));
            }
            if store.members.first().map(|m| m.id) != Some(anchor) {
                return Err(DomainError::AnchorNotFirst(anchor));
            }
        }
        store.anchor = anchor;

        let ids: Vec<MemberId> = store.members.iter().map(|m| m.id).collect();
        store.check_links(&ids)?;
        Ok(store)
    }

    /// Append one record and replace the records it updates, as one unit.
    ///
    /// Either everything applies or the error is returned and nothing changes.
    #[instrument(level = "debug", skip(self, tx), fields(record = %tx.record.id))]
    pub fn append(&self, tx: &Transaction) -> DomainResult<Self> {
        if self.contains(tx.record.id) {
            return Err(DomainError::DuplicateMember(tx.record.id));
        }

        let mut next = self.clone();
        let mut touched = Vec::with_capacity(tx.updates.len() + 1);
        for update in &tx.updates {
            let idx = *self
                .index
                .get(&update.id)
                .ok_or(DomainError::DanglingReference(update.id))?;
            next.members[idx] = Arc::new(update.clone());
            touched.push(update.id);
        }
        next.index.insert(tx.record.id, next.members.len());
        next.members.push(Arc::new(tx.record.clone()));
        touched.push(tx.record.id);

        next.check_links(&touched)?;
        debug!(
            "append: {} members, {} updated",
            next.members.len(),
            tx.updates.len()
        );
        Ok(next)
    }

    pub fn get(&self, id: MemberId) -> Option<&Arc<FamilyMember>> {
        self.index.get(&id).map(|&idx| &self.members[idx])
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Arc<FamilyMember>] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FamilyMember>> {
        self.members.iter()
    }

    /// Members at `level`, in insertion order.
    pub fn by_level(&self, level: Level) -> impl Iterator<Item = &Arc<FamilyMember>> {
        self.members.iter().filter(move |m| m.level == level)
    }

    /// Members placed by `relation`, in insertion order.
    pub fn by_relation(&self, relation: Relation) -> impl Iterator<Item = &Arc<FamilyMember>> {
        self.members
            .iter()
            .filter(move |m| m.relation() == Some(relation))
    }

    pub fn anchor_id(&self) -> Option<MemberId> {
        self.anchor
    }

    /// The tree's root person, if the store has one.
    pub fn find_anchor(&self) -> Option<&Arc<FamilyMember>> {
        self.anchor.and_then(|id| self.get(id))
    }

    /// First member whose name matches, ignoring case and outer whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<FamilyMember>> {
        let wanted = name.trim().to_lowercase();
        self.members.iter().find(|m| m.name.to_lowercase() == wanted)
    }

    /// Occupied levels, ascending.
    pub fn levels(&self) -> Vec<Level> {
        self.members
            .iter()
            .map(|m| m.level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every member reachable upward through `parent_ids`, BFS order.
    pub fn ancestors(&self, id: MemberId) -> Vec<MemberId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        if let Some(member) = self.get(id) {
            queue.extend(member.parent_ids.iter().copied());
        }
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(member) = self.get(current) {
                queue.extend(member.parent_ids.iter().copied());
            }
        }
        result
    }

    pub fn is_ancestor(&self, ancestor: MemberId, of: MemberId) -> bool {
        self.ancestors(of).contains(&ancestor)
    }

    fn check_links(&self, ids: &[MemberId]) -> DomainResult<()> {
        for &id in ids {
            let member = self.get(id).ok_or(DomainError::DanglingReference(id))?;
            if member.parent_ids.len() > MAX_PARENTS {
                return Err(DomainError::TooManyParents(id));
            }
            for &parent in &member.parent_ids {
                if parent == id {
                    return Err(DomainError::SelfParent(id));
                }
                if !self.contains(parent) {
                    return Err(DomainError::DanglingReference(parent));
                }
            }
            if let Some(spouse) = member.spouse_id {
                if !self.contains(spouse) {
                    return Err(DomainError::DanglingReference(spouse));
                }
            }
            if self.is_ancestor(id, id) {
                return Err(DomainError::CycleDetected(id));
            }
        }
        Ok(())
    }
}
