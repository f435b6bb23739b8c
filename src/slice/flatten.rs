//! Hierarchical row flattening.
//!
//! Joined queries return one row per leaf-level match with the parent-level
//! columns repeated on every row; an outer join adds all-null child columns
//! for parents with no match. This module regroups such flat rows into
//! parent-with-children nodes in application memory, in one pass, without
//! re-querying per parent.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A parent with its regrouped children.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<P, C> {
    pub parent: P,
    pub children: Vec<C>,
}

/// Regroup flat joined rows into parent nodes, preserving first-seen parent
/// order from the driving query.
///
/// `parent_key`/`child` extract the grouping key, the parent value (taken
/// from the first row of each group, since it repeats), and the optional
/// child with its own dedup key. A row whose child side is `None` (the outer
/// join "no match" row) still materializes its parent, with no children.
/// Duplicate children within one parent are kept once, in row order.
pub fn group_by_preserving_order<R, PK, P, CK, C>(
    rows: Vec<R>,
    parent_key: impl Fn(&R) -> PK,
    parent_value: impl Fn(&R) -> P,
    child: impl Fn(R) -> Option<(CK, C)>,
) -> Vec<Grouped<P, C>>
where
    PK: Eq + Hash + Clone,
    CK: Eq + Hash,
{
    let mut order: Vec<PK> = Vec::new();
    let mut groups: HashMap<PK, (P, Vec<C>, HashSet<CK>)> = HashMap::new();

    for row in rows {
        let key = parent_key(&row);
        if !groups.contains_key(&key) {
            order.push(key.clone());
            groups.insert(key.clone(), (parent_value(&row), Vec::new(), HashSet::new()));
        }
        if let Some((child_key, child_value)) = child(row) {
            // contains_key above guarantees the entry exists
            let (_, children, seen) = groups.get_mut(&key).expect("group inserted above");
            if seen.insert(child_key) {
                children.push(child_value);
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let (parent, children, _) = groups.remove(&key).expect("key came from order");
            Grouped { parent, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// One flat row of a `layers LEFT JOIN modules` style query.
    #[derive(Clone)]
    struct Row {
        parent_id: i64,
        parent_name: &'static str,
        child: Option<(i64, &'static str)>,
    }

    fn regroup(rows: Vec<Row>) -> Vec<Grouped<(i64, &'static str), (i64, &'static str)>> {
        group_by_preserving_order(
            rows,
            |r| r.parent_id,
            |r| (r.parent_id, r.parent_name),
            |r| r.child.map(|c| (c.0, c)),
        )
    }

    #[test]
    fn repeated_parent_columns_collapse_into_one_node() {
        let grouped = regroup(vec![
            Row {
                parent_id: 2,
                parent_name: "domain",
                child: Some((10, "orders")),
            },
            Row {
                parent_id: 2,
                parent_name: "domain",
                child: Some((11, "billing")),
            },
            Row {
                parent_id: 1,
                parent_name: "api",
                child: Some((12, "rest")),
            },
        ]);

        assert_eq!(grouped.len(), 2);
        // First-seen order from the driving query, not re-sorted
        assert_eq!(grouped[0].parent, (2, "domain"));
        assert_eq!(grouped[0].children, vec![(10, "orders"), (11, "billing")]);
        assert_eq!(grouped[1].parent, (1, "api"));
    }

    #[test]
    fn null_child_row_keeps_the_parent_with_no_children() {
        let grouped = regroup(vec![
            Row {
                parent_id: 5,
                parent_name: "infra",
                child: None,
            },
            Row {
                parent_id: 4,
                parent_name: "domain",
                child: Some((20, "orders")),
            },
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].parent, (5, "infra"));
        assert_eq!(grouped[0].children, vec![]);
        assert_eq!(grouped[1].children.len(), 1);
    }

    #[test]
    fn duplicate_children_are_kept_once_in_row_order() {
        let grouped = regroup(vec![
            Row {
                parent_id: 1,
                parent_name: "api",
                child: Some((30, "rest")),
            },
            Row {
                parent_id: 1,
                parent_name: "api",
                child: Some((31, "grpc")),
            },
            Row {
                parent_id: 1,
                parent_name: "api",
                child: Some((30, "rest")),
            },
        ]);

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].children, vec![(30, "rest"), (31, "grpc")]);
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert_eq!(regroup(vec![]), vec![]);
    }
}
