//! Tests for SnapshotHistory and undo through the service

use famtree::domain::{MemberInput, RelationshipModel, Selector, SnapshotHistory, TreeStore};
use famtree::FamilyTreeService;

#[test]
fn given_only_initial_snapshot_when_undoing_then_noop() {
    let mut history = SnapshotHistory::new(TreeStore::default());

    assert!(history.undo().is_none());
    assert_eq!(history.len(), 1);
    assert!(!history.can_undo());
}

#[test]
fn given_commits_when_undoing_then_previous_snapshot_is_current() {
    let service = FamilyTreeService::with_model(RelationshipModel::FourLevel).unwrap();
    let initial = service.tree().clone();
    let mut history = SnapshotHistory::new(initial.clone());
    history.commit(TreeStore::default());

    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.undo(), Some(&initial));
    assert_eq!(history.current(), &initial);
    assert_eq!(history.snapshots().count(), 1);
}

#[test]
fn given_add_when_undoing_then_state_equals_state_before_add() {
    let mut service = FamilyTreeService::with_model(RelationshipModel::FourLevel).unwrap();
    service
        .add_member(
            &MemberInput::new("Ivan", "1960-01-01"),
            &Selector::relation("parent").unwrap(),
        )
        .unwrap();
    let before = service.tree().clone();

    service
        .add_member(
            &MemberInput::new("Lena", "2015-06-01"),
            &Selector::relation("child").unwrap(),
        )
        .unwrap();
    assert!(service.undo());

    assert_eq!(service.tree(), &before);
    assert_eq!(service.history().len(), 2);
}

#[test]
fn given_several_adds_when_undoing_all_then_back_to_seed_and_further_undo_is_noop() {
    let mut service = FamilyTreeService::with_model(RelationshipModel::SixCategory).unwrap();
    let seed = service.tree().clone();
    for (name, relation) in [("Ivan", "parent"), ("Oleg", "uncle_aunt"), ("Olga", "sibling")] {
        service
            .add_member(
                &MemberInput::new(name, "1960-01-01"),
                &Selector::relation(relation).unwrap(),
            )
            .unwrap();
    }
    assert_eq!(service.history().undo_depth(), 3);

    while service.undo() {}

    assert_eq!(service.tree(), &seed);
    assert!(!service.undo());
    assert_eq!(service.tree(), &seed);
}

#[test]
fn given_failed_add_when_checking_history_then_no_snapshot_committed() {
    let mut service = FamilyTreeService::with_model(RelationshipModel::FourLevel).unwrap();

    let result = service.add_member(
        &MemberInput::new("", "1960-01-01"),
        &Selector::relation("parent").unwrap(),
    );

    assert!(result.is_err());
    assert_eq!(service.history().len(), 1);
}
