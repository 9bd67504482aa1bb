//! Hobby hierarchy helpers.
//!
//! Categories arrive either flat (parent pointers) or nested (`GET /hobbies/tree`).
//! [`HobbyArena`] keeps them in an id-keyed arena with a derived children index, so nothing
//! holds references both ways and every view (sidebar rows, select options, descendant sets)
//! is recomputed from flat data.

use crate::models::Hobby;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Indent marker for hierarchical select options.
pub const DEPTH_MARKER: &str = "• ";

/// One rendered line of the hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeRow {
    pub hobby: Hobby,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Ids of expanded nodes. Keyed by id, so rebuilding the arena keeps unrelated nodes as they were.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedSet(BTreeSet<i64>);

impl ExpandedSet {
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.0.remove(&id) {
            self.0.insert(id);
        }
    }

    pub fn expand(&mut self, id: i64) {
        self.0.insert(id);
    }

    pub fn expand_all(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.0.extend(ids);
    }

    /// Drop ids that no longer exist.
    pub fn retain_known(&mut self, arena: &HobbyArena) {
        self.0.retain(|id| arena.get(*id).is_some());
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HobbyArena {
    nodes: Vec<Hobby>,
    index: HashMap<i64, usize>,
    children: HashMap<i64, Vec<usize>>,
    roots: Vec<usize>,
}

impl HobbyArena {
    /// Build from flat records. Sibling order follows input order.
    ///
    /// Roots are nodes without a parent, nodes whose parent is not in the set, and, for any
    /// parent cycle not reachable from those, its first member in input order. Every distinct
    /// id appears exactly once; later duplicates of an id are ignored.
    pub fn new(hobbies: impl IntoIterator<Item = Hobby>) -> Self {
        let mut nodes: Vec<Hobby> = Vec::new();
        let mut index: HashMap<i64, usize> = HashMap::new();

        for mut hobby in hobbies {
            if index.contains_key(&hobby.id) {
                continue;
            }
            hobby.children.clear();
            index.insert(hobby.id, nodes.len());
            nodes.push(hobby);
        }

        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut roots: Vec<usize> = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent_id {
                Some(pid) if pid != node.id && index.contains_key(&pid) => {
                    children.entry(pid).or_default().push(i);
                }
                _ => roots.push(i),
            }
        }

        let mut arena = Self {
            nodes,
            index,
            children,
            roots,
        };
        arena.promote_unreachable();
        arena
    }

    /// Accept the nested shape returned by the tree endpoint.
    pub fn from_forest(forest: &[Hobby]) -> Self {
        Self::new(flatten_forest(forest))
    }

    fn promote_unreachable(&mut self) {
        let mut seen: HashSet<usize> = HashSet::new();
        for &root in &self.roots {
            self.mark_reachable(root, &mut seen);
        }
        for i in 0..self.nodes.len() {
            if !seen.contains(&i) {
                self.roots.push(i);
                self.mark_reachable(i, &mut seen);
            }
        }
    }

    fn mark_reachable(&self, start: usize, seen: &mut HashSet<usize>) {
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            if let Some(kids) = self.children.get(&self.nodes[i].id) {
                stack.extend(kids.iter().copied());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Hobby> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Flat records in input order.
    pub fn hobbies(&self) -> &[Hobby] {
        &self.nodes
    }

    pub fn roots(&self) -> impl Iterator<Item = &Hobby> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn children_of(&self, id: i64) -> impl Iterator<Item = &Hobby> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.nodes[i])
    }

    pub fn has_children(&self, id: i64) -> bool {
        self.children.get(&id).is_some_and(|c| !c.is_empty())
    }

    /// Pre-order walk. `descend` decides whether a node's children are visited.
    fn walk(&self, descend: impl Fn(i64) -> bool) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut seen: HashSet<usize> = HashSet::new();
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (i, 0)).collect();

        while let Some((i, depth)) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            out.push((i, depth));
            let id = self.nodes[i].id;
            if descend(id) {
                if let Some(kids) = self.children.get(&id) {
                    stack.extend(kids.iter().rev().map(|&k| (k, depth + 1)));
                }
            }
        }
        out
    }

    fn row(&self, i: usize, depth: usize, expanded: bool) -> TreeRow {
        let hobby = self.nodes[i].clone();
        TreeRow {
            has_children: self.has_children(hobby.id),
            hobby,
            depth,
            expanded,
        }
    }

    /// Every node in pre-order with its depth.
    pub fn rows(&self) -> Vec<TreeRow> {
        self.walk(|_| true)
            .into_iter()
            .map(|(i, depth)| self.row(i, depth, true))
            .collect()
    }

    /// Rows shown by the sidebar: children of collapsed nodes are skipped.
    pub fn visible_rows(&self, expanded: &ExpandedSet) -> Vec<TreeRow> {
        self.walk(|id| expanded.contains(id))
            .into_iter()
            .map(|(i, depth)| {
                let id = self.nodes[i].id;
                self.row(i, depth, expanded.contains(id))
            })
            .collect()
    }

    /// Ids reachable below `id`, excluding `id` itself.
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut seen: HashSet<i64> = HashSet::from([id]);
        let mut stack: Vec<i64> = vec![id];
        while let Some(current) = stack.pop() {
            for child in self.children_of(current) {
                if seen.insert(child.id) {
                    out.push(child.id);
                    stack.push(child.id);
                }
            }
        }
        out
    }

    /// Ancestor ids of `id`, nearest first.
    pub fn ancestors(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut seen: HashSet<i64> = HashSet::from([id]);
        let mut current = self.get(id).and_then(|h| h.parent_id);
        while let Some(pid) = current {
            if !seen.insert(pid) || self.get(pid).is_none() {
                break;
            }
            out.push(pid);
            current = self.get(pid).and_then(|h| h.parent_id);
        }
        out
    }

    /// `(id, label)` pairs in pre-order, labels indented with [`DEPTH_MARKER`] per level.
    pub fn select_options(&self) -> Vec<(i64, String)> {
        self.walk(|_| true)
            .into_iter()
            .map(|(i, depth)| {
                let hobby = &self.nodes[i];
                (hobby.id, format!("{}{}", DEPTH_MARKER.repeat(depth), hobby.name))
            })
            .collect()
    }

    /// Nested forest with `children` populated.
    pub fn to_forest(&self) -> Vec<Hobby> {
        let mut seen: HashSet<usize> = HashSet::new();
        self.roots
            .iter()
            .filter_map(|&i| self.nest(i, &mut seen))
            .collect()
    }

    fn nest(&self, i: usize, seen: &mut HashSet<usize>) -> Option<Hobby> {
        if !seen.insert(i) {
            return None;
        }
        let mut node = self.nodes[i].clone();
        node.children = self
            .children
            .get(&node.id)
            .into_iter()
            .flatten()
            .filter_map(|&k| self.nest(k, seen))
            .collect();
        Some(node)
    }
}

/// Nest flat parent-pointer records into a forest.
pub fn build_forest(hobbies: &[Hobby]) -> Vec<Hobby> {
    HobbyArena::new(hobbies.iter().cloned()).to_forest()
}

/// Flatten a nested forest in pre-order. A nested record's `parent_id` is set to the node it
/// was nested under; a root keeps its own (an orphan still points at its missing parent).
/// `children` is cleared.
pub fn flatten_forest(forest: &[Hobby]) -> Vec<Hobby> {
    fn visit(nodes: &[Hobby], parent_id: Option<i64>, out: &mut Vec<Hobby>) {
        for node in nodes {
            let mut flat = node.clone();
            if parent_id.is_some() {
                flat.parent_id = parent_id;
            }
            flat.children = Vec::new();
            out.push(flat);
            visit(&node.children, Some(node.id), out);
        }
    }

    let mut out = Vec::new();
    visit(forest, None, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hobby(id: i64, parent_id: Option<i64>) -> Hobby {
        Hobby {
            id,
            name: format!("Hobby {id}"),
            color: None,
            icon: None,
            parent_id,
            slug: None,
            description: None,
            sort_order: None,
            children: vec![],
        }
    }

    fn ids(rows: &[TreeRow]) -> Vec<(i64, usize)> {
        rows.iter().map(|r| (r.hobby.id, r.depth)).collect()
    }

    #[test]
    fn builds_nested_forest_in_input_order() {
        let flat = vec![
            hobby(1, None),
            hobby(2, None),
            hobby(3, Some(1)),
            hobby(4, Some(1)),
            hobby(5, Some(3)),
        ];
        let forest = build_forest(&flat);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].id, 1);
        assert_eq!(forest[1].id, 2);
        let kids: Vec<i64> = forest[0].children.iter().map(|h| h.id).collect();
        assert_eq!(kids, vec![3, 4]);
        assert_eq!(forest[0].children[0].children[0].id, 5);
    }

    #[test]
    fn flatten_of_build_yields_each_node_once() {
        let flat = vec![
            hobby(4, Some(2)),
            hobby(1, None),
            hobby(2, Some(1)),
            hobby(3, None),
            hobby(5, Some(4)),
            hobby(6, Some(99)),
            hobby(7, Some(6)),
        ];
        let mut back = flatten_forest(&build_forest(&flat));
        back.sort_by_key(|h| h.id);
        let mut expected = flat.clone();
        expected.sort_by_key(|h| h.id);
        assert_eq!(back, expected);
    }

    #[test]
    fn missing_parent_becomes_root() {
        let arena = HobbyArena::new(vec![hobby(1, None), hobby(2, Some(99))]);
        let roots: Vec<i64> = arena.roots().map(|h| h.id).collect();
        assert_eq!(roots, vec![1, 2]);
    }

    #[test]
    fn parent_cycle_is_promoted_not_dropped() {
        let arena = HobbyArena::new(vec![
            hobby(1, None),
            hobby(2, Some(3)),
            hobby(3, Some(2)),
            hobby(4, Some(4)),
        ]);
        let mut all: Vec<i64> = arena.rows().iter().map(|r| r.hobby.id).collect();
        all.sort();
        assert_eq!(all, vec![1, 2, 3, 4]);
        let roots: Vec<i64> = arena.roots().map(|h| h.id).collect();
        assert_eq!(roots, vec![1, 4, 2]);
        assert_eq!(arena.descendants(2), vec![3]);
    }

    #[test]
    fn flatten_resolves_parent_from_nesting() {
        let mut root = hobby(1, None);
        let mut child = hobby(2, None);
        child.children = vec![hobby(3, Some(42))];
        root.children = vec![child];

        let flat = flatten_forest(&[root]);
        let parents: Vec<(i64, Option<i64>)> = flat.iter().map(|h| (h.id, h.parent_id)).collect();
        assert_eq!(parents, vec![(1, None), (2, Some(1)), (3, Some(2))]);
        assert!(flat.iter().all(|h| h.children.is_empty()));
    }

    #[test]
    fn visible_rows_skip_collapsed_children() {
        let arena = HobbyArena::new(vec![
            hobby(1, None),
            hobby(2, Some(1)),
            hobby(3, Some(2)),
            hobby(4, None),
        ]);
        let mut expanded = ExpandedSet::default();
        assert_eq!(ids(&arena.visible_rows(&expanded)), vec![(1, 0), (4, 0)]);

        expanded.toggle(1);
        let rows = arena.visible_rows(&expanded);
        assert_eq!(ids(&rows), vec![(1, 0), (2, 1), (4, 0)]);
        assert!(rows[0].expanded && rows[0].has_children);
        assert!(rows[1].has_children && !rows[1].expanded);
        assert!(!rows[2].has_children);
    }

    #[test]
    fn toggling_one_node_keeps_others_after_rebuild() {
        let mut expanded = ExpandedSet::default();
        expanded.toggle(1);
        expanded.toggle(4);
        expanded.toggle(4);

        let rebuilt = HobbyArena::new(vec![
            hobby(1, None),
            hobby(2, Some(1)),
            hobby(4, None),
            hobby(5, Some(4)),
            hobby(6, Some(1)),
        ]);
        assert_eq!(
            ids(&rebuilt.visible_rows(&expanded)),
            vec![(1, 0), (2, 1), (6, 1), (4, 0)]
        );
    }

    #[test]
    fn descendants_and_ancestors_follow_parent_links() {
        let arena = HobbyArena::new(vec![
            hobby(1, None),
            hobby(2, Some(1)),
            hobby(3, Some(2)),
            hobby(4, Some(1)),
            hobby(5, None),
        ]);
        let mut desc = arena.descendants(1);
        desc.sort();
        assert_eq!(desc, vec![2, 3, 4]);
        assert!(arena.descendants(5).is_empty());
        assert_eq!(arena.ancestors(3), vec![2, 1]);
    }

    #[test]
    fn select_options_indent_by_depth() {
        let arena = HobbyArena::new(vec![hobby(1, None), hobby(2, Some(1)), hobby(3, Some(2))]);
        let labels: Vec<String> = arena.select_options().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["Hobby 1", "• Hobby 2", "• • Hobby 3"]);
    }

    #[test]
    fn expanded_set_forgets_removed_ids() {
        let mut expanded = ExpandedSet::default();
        expanded.expand_all([1, 2, 9]);
        expanded.retain_known(&HobbyArena::new(vec![hobby(1, None), hobby(2, Some(1))]));
        assert!(expanded.contains(1) && expanded.contains(2));
        assert!(!expanded.contains(9));
    }
}
