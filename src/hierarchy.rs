//! Forest construction from the flat shop-item table.
//!
//! Two-pass indexed build: first index every item by id, then attach each item
//! to its parent's children list in input order. An item whose parent_id is
//! absent or unresolvable is a root. An item whose ancestor chain cycles is
//! promoted to a root instead of being dropped, so every input item appears in
//! the output exactly once.

use crate::models::ShopItem;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Serialize)]
pub struct ShopItemNode {
    #[serde(flatten)]
    pub item: ShopItem,
    pub children: Vec<ShopItemNode>,
}

/// Build the multi-root forest. O(n) in the forest case; cyclic chains cost the
/// length of the chain per member.
pub fn build_forest(items: Vec<ShopItem>) -> Vec<ShopItemNode> {
    let parent_by_id: HashMap<i64, i64> = items
        .iter()
        .filter_map(|i| i.parent_id.map(|p| (i.id, p)))
        .collect();
    let known: HashSet<i64> = items.iter().map(|i| i.id).collect();

    // Pass 2: decide each item's effective parent; group child indexes per parent.
    let mut roots: Vec<usize> = Vec::new();
    let mut children_of: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        match item.parent_id {
            Some(p) if known.contains(&p) && !chain_cycles(item.id, &parent_by_id, &known) => {
                children_of.entry(p).or_default().push(idx);
            }
            _ => roots.push(idx),
        }
    }

    let mut slots: Vec<Option<ShopItem>> = items.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|idx| assemble(idx, &mut slots, &children_of))
        .collect()
}

/// Walk the ancestor chain; true when a node repeats (the chain never reaches a
/// root). Unresolvable ancestors terminate the walk and count as no cycle.
fn chain_cycles(start: i64, parent_by_id: &HashMap<i64, i64>, known: &HashSet<i64>) -> bool {
    let mut seen = HashSet::new();
    let mut cur = start;
    loop {
        if !seen.insert(cur) {
            return true;
        }
        match parent_by_id.get(&cur) {
            Some(p) if known.contains(p) => cur = *p,
            _ => return false,
        }
    }
}

fn assemble(
    idx: usize,
    slots: &mut Vec<Option<ShopItem>>,
    children_of: &HashMap<i64, Vec<usize>>,
) -> Option<ShopItemNode> {
    let item = slots[idx].take()?;
    let child_indexes = children_of.get(&item.id).cloned().unwrap_or_default();
    let children = child_indexes
        .into_iter()
        .filter_map(|c| assemble(c, slots, children_of))
        .collect();
    Some(ShopItemNode { item, children })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: i64, parent_id: Option<i64>) -> ShopItem {
        let now = Utc::now();
        ShopItem {
            id,
            parent_id,
            title: format!("item {}", id),
            item_type: "book".into(),
            price: None,
            order_index: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_nodes(nodes: &[ShopItemNode]) -> usize {
        nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
    }

    #[test]
    fn single_root_with_children_in_input_order() {
        let forest = build_forest(vec![item(1, None), item(2, Some(1)), item(3, Some(1))]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].item.id, 1);
        let child_ids: Vec<i64> = forest[0].children.iter().map(|n| n.item.id).collect();
        assert_eq!(child_ids, vec![2, 3]);
    }

    #[test]
    fn every_item_appears_exactly_once_in_a_valid_forest() {
        let forest = build_forest(vec![
            item(1, None),
            item(2, Some(1)),
            item(3, Some(2)),
            item(4, None),
            item(5, Some(4)),
        ]);
        assert_eq!(count_nodes(&forest), 5);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn unresolvable_parent_becomes_root() {
        let forest = build_forest(vec![item(1, Some(99)), item(2, Some(1))]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].item.id, 1);
        assert_eq!(forest[0].children[0].item.id, 2);
    }

    #[test]
    fn cycle_members_are_promoted_to_roots_not_dropped() {
        // 1 <-> 2 form a cycle; 3 points into it.
        let forest = build_forest(vec![item(1, Some(2)), item(2, Some(1)), item(3, Some(1))]);
        assert_eq!(count_nodes(&forest), 3);
        let root_ids: Vec<i64> = forest.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_forest(Vec::new()).is_empty());
    }

    #[test]
    fn deep_chain_nests_in_order() {
        let forest = build_forest(vec![
            item(10, None),
            item(11, Some(10)),
            item(12, Some(11)),
            item(13, Some(12)),
        ]);
        let mut node = &forest[0];
        for expected in [11, 12, 13] {
            node = &node.children[0];
            assert_eq!(node.item.id, expected);
        }
        assert!(node.children.is_empty());
    }
}
