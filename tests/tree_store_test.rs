//! Tests for TreeStore: atomic append, link invariants and structural sharing

use std::sync::Arc;

use famtree::domain::{
    DomainError, FamilyMember, MemberId, Placement, Relation, RelationshipModel, Resolver,
    MemberInput, Selector, Transaction, TreeStore,
};

fn member(name: &str, level: u8, parent_ids: Vec<MemberId>) -> FamilyMember {
    FamilyMember {
        id: MemberId::new(),
        name: name.into(),
        birth_date: None,
        death_date: None,
        photo: None,
        placement: Placement::Generation(level),
        level,
        parent_ids,
        spouse_id: None,
    }
}

fn tx(record: FamilyMember, updates: Vec<FamilyMember>) -> Transaction {
    Transaction {
        record,
        updates,
        notices: vec![],
    }
}

fn seeded() -> TreeStore {
    TreeStore::seeded(FamilyMember {
        placement: Placement::Relation(Relation::Myself),
        ..member("You", 2, vec![])
    })
}

// ============================================================
// append
// ============================================================

#[test]
fn given_store_when_appending_then_receiver_is_unchanged() {
    let store = seeded();
    let next = store.append(&tx(member("Ivan", 1, vec![]), vec![])).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(next.len(), 2);
    assert_eq!(next.anchor_id(), store.anchor_id());
}

#[test]
fn given_update_when_appending_then_untouched_records_are_shared() {
    let store = seeded();
    let store = store.append(&tx(member("Olga", 2, vec![]), vec![])).unwrap();
    let anchor = store.find_anchor().unwrap().clone();
    let olga = store.find_by_name("olga").unwrap().clone();

    let ivan = member("Ivan", 1, vec![]);
    let mut updated = FamilyMember::clone(&anchor);
    updated.parent_ids.push(ivan.id);
    let next = store.append(&tx(ivan, vec![updated])).unwrap();

    assert!(Arc::ptr_eq(next.get(olga.id).unwrap(), &olga));
    assert!(!Arc::ptr_eq(next.get(anchor.id).unwrap(), &anchor));
    assert_eq!(next.get(anchor.id).unwrap().parent_ids.len(), 1);
}

#[test]
fn given_existing_id_when_appending_then_duplicate_rejected() {
    let store = seeded();
    let anchor = FamilyMember::clone(store.find_anchor().unwrap());

    let result = store.append(&tx(anchor.clone(), vec![]));

    assert_eq!(result, Err(DomainError::DuplicateMember(anchor.id)));
}

#[test]
fn given_unknown_parent_when_appending_then_dangling_and_nothing_applied() {
    let store = seeded();
    let ghost = MemberId::new();

    let result = store.append(&tx(member("Pavel", 3, vec![ghost]), vec![]));

    assert_eq!(result, Err(DomainError::DanglingReference(ghost)));
    assert_eq!(store.len(), 1);
}

#[test]
fn given_record_naming_itself_as_parent_when_appending_then_rejected() {
    let store = seeded();
    let mut looped = member("Loop", 3, vec![]);
    looped.parent_ids.push(looped.id);

    assert_eq!(
        store.append(&tx(looped.clone(), vec![])),
        Err(DomainError::SelfParent(looped.id))
    );
}

#[test]
fn given_three_parents_when_appending_then_too_many_parents() {
    let mut store = seeded();
    let mut parents = Vec::new();
    for name in ["A", "B", "C"] {
        let parent = member(name, 1, vec![]);
        parents.push(parent.id);
        store = store.append(&tx(parent, vec![])).unwrap();
    }
    let child = member("Child", 2, parents);

    assert_eq!(
        store.append(&tx(child.clone(), vec![])),
        Err(DomainError::TooManyParents(child.id))
    );
}

#[test]
fn given_update_closing_a_loop_when_appending_then_cycle_detected() {
    let store = seeded();
    let anchor = FamilyMember::clone(store.find_anchor().unwrap());

    // the new child is the anchor's child; making it the anchor's parent too closes a loop
    let child = member("Child", 3, vec![anchor.id]);
    let mut updated = anchor.clone();
    updated.parent_ids.push(child.id);

    let result = store.append(&tx(child, vec![updated]));

    assert!(matches!(result, Err(DomainError::CycleDetected(_))));
    assert!(store.find_anchor().unwrap().parent_ids.is_empty());
}

#[test]
fn given_update_for_unknown_member_when_appending_then_dangling() {
    let store = seeded();
    let stranger = member("Stranger", 1, vec![]);

    let result = store.append(&tx(member("Ivan", 1, vec![]), vec![stranger.clone()]));

    assert_eq!(result, Err(DomainError::DanglingReference(stranger.id)));
}

// ============================================================
// from_members
// ============================================================

#[test]
fn given_consistent_records_when_building_then_store_keeps_order_and_anchor() {
    let root = member("Root", 0, vec![]);
    let kid = member("Kid", 1, vec![root.id]);
    let ids = [root.id, kid.id];

    let store = TreeStore::from_members(vec![root, kid], Some(ids[0])).unwrap();

    let order: Vec<MemberId> = store.iter().map(|m| m.id).collect();
    assert_eq!(order, ids);
    assert_eq!(store.anchor_id(), Some(ids[0]));
}

#[test]
fn given_anchor_after_first_record_when_building_then_anchor_not_first() {
    let root = member("Root", 0, vec![]);
    let you = member("You", 1, vec![root.id]);
    let anchor = you.id;

    let result = TreeStore::from_members(vec![root, you], Some(anchor));

    assert_eq!(result, Err(DomainError::AnchorNotFirst(anchor)));
}

#[test]
fn given_anchor_not_in_records_when_building_then_dangling() {
    let ghost = MemberId::new();
    let result = TreeStore::from_members(vec![member("Root", 0, vec![])], Some(ghost));
    assert_eq!(result, Err(DomainError::DanglingReference(ghost)));
}

#[test]
fn given_mutual_parents_when_building_then_cycle_detected() {
    let mut a = member("A", 0, vec![]);
    let mut b = member("B", 1, vec![]);
    a.parent_ids.push(b.id);
    b.parent_ids.push(a.id);

    let result = TreeStore::from_members(vec![a, b], None);

    assert!(matches!(result, Err(DomainError::CycleDetected(_))));
}

#[test]
fn given_repeated_id_when_building_then_duplicate() {
    let a = member("A", 0, vec![]);
    let result = TreeStore::from_members(vec![a.clone(), a.clone()], None);
    assert_eq!(result, Err(DomainError::DuplicateMember(a.id)));
}

// ============================================================
// queries
// ============================================================

#[test]
fn given_built_tree_when_querying_then_levels_and_buckets_follow_insertion_order() {
    let resolver = Resolver::new(RelationshipModel::FourLevel);
    let mut store = seeded();
    for (name, relation) in [
        ("Ivan", Relation::Parent),
        ("Lena", Relation::Child),
        ("Olga", Relation::Sibling),
        ("Pavel", Relation::Child),
    ] {
        let tx = resolver
            .resolve(
                &store,
                &MemberInput::new(name, "1970-01-01"),
                &Selector::Relation(relation),
            )
            .unwrap();
        store = store.append(&tx).unwrap();
    }

    assert_eq!(store.levels(), vec![1, 2, 3]);
    let children: Vec<&str> = store.by_level(3).map(|m| m.name.as_str()).collect();
    assert_eq!(children, ["Lena", "Pavel"]);
    let siblings: Vec<&str> = store
        .by_relation(Relation::Sibling)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(siblings, ["Olga"]);
}

#[test]
fn given_three_generations_when_listing_ancestors_then_all_are_reached() {
    let grand = member("Grand", 0, vec![]);
    let parent = member("Parent", 1, vec![grand.id]);
    let kid = member("Kid", 2, vec![parent.id]);
    let (g, p, k) = (grand.id, parent.id, kid.id);
    let store = TreeStore::from_members(vec![grand, parent, kid], None).unwrap();

    assert_eq!(store.ancestors(k), vec![p, g]);
    assert!(store.is_ancestor(g, k));
    assert!(!store.is_ancestor(k, g));
}

#[test]
fn given_name_in_other_case_when_finding_then_member_found() {
    let store = seeded();
    assert!(store.find_by_name("  you ").is_some());
    assert!(store.find_by_name("nobody").is_none());
}
