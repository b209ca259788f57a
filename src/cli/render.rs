//! Terminal rendering of the laid-out tree.

use termtree::Tree;

use crate::application::services::FamilyTreeService;
use crate::domain::{Connector, FamilyMember, Layout, MemberId, Row, TreeStore};

/// Rows as branches, member cards as leaves.
pub fn level_tree(service: &FamilyTreeService, layout: &Layout) -> Tree<String> {
    let tree = service.tree();
    let mut root = Tree::new(format!(
        "Family tree ({} members, {} model)",
        tree.len(),
        service.model()
    ));
    for row in layout.rows() {
        root.push(row_tree(service, row));
    }
    root
}

fn row_tree(service: &FamilyTreeService, row: &Row) -> Tree<String> {
    let tree = service.tree();
    let cards = row
        .slots
        .iter()
        .filter_map(|slot| tree.get(slot.member))
        .map(|member| Tree::new(member_card(service, member)));
    Tree::new(format!("{} [level {}]", row.label, row.level)).with_leaves(cards)
}

/// One-line card: name, initials, years, label and links.
pub fn member_card(service: &FamilyTreeService, member: &FamilyMember) -> String {
    let tree = service.tree();
    let mut card = format!("{} ({})", member.name, member.initials());
    if let Some(years) = member.lifespan() {
        card.push_str(&format!(" {}", years));
    }
    card.push_str(&format!(" · {}", service.member_label(member)));
    if !member.parent_ids.is_empty() {
        let parents: Vec<String> = member
            .parent_ids
            .iter()
            .map(|id| name_of(tree, *id))
            .collect();
        card.push_str(&format!(" ← {}", parents.join(" & ")));
    }
    if let Some(spouse) = member.spouse_id {
        card.push_str(&format!(" ⚭ {}", name_of(tree, spouse)));
    }
    card
}

/// `parent → child: (x, y) …` per connector.
pub fn connector_line(tree: &TreeStore, connector: &Connector) -> String {
    let points: Vec<String> = connector
        .points
        .iter()
        .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
        .collect();
    format!(
        "{} → {}: {}",
        name_of(tree, connector.parent),
        name_of(tree, connector.child),
        points.join(" ")
    )
}

fn name_of(tree: &TreeStore, id: MemberId) -> String {
    tree.get(id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "?".to_string())
}
