//! The resolver: a post-build validation pass over a loaded [`Document`]
//! (spec §4.6), independent of the inline anchor bookkeeping `Document::load`
//! already does while building the tree.
//!
//! Aliases are substituted with their target node index at build time
//! (`document.rs`'s `register_anchor`/`load_alias`), so by the time a
//! `Document` reaches this pass its node graph may already be a DAG or even
//! cyclic (an alias is free to point at an ancestor). What is left for a
//! dedicated resolve pass, grounded on that same anchor bookkeeping, is the
//! part of spec §4.6 that only makes sense once the whole tree exists:
//! cycle-safe structural comparison, and duplicate-mapping-key detection.

use std::collections::HashSet;

use crate::diag::{Diagnostic, DiagnosticSink, Level};
use crate::document::{Document, NodeData};
use crate::error::ModuleTag;

impl Document {
    /// Walk the tree from the root, reporting a warning diagnostic for every
    /// mapping key after the first that compares equal to an earlier one in
    /// the same mapping (spec.md's Open Question resolution: first
    /// occurrence wins for lookup, later ones are kept in `pairs` so the
    /// document still round-trips through the emitter unchanged).
    pub fn resolve(&self, sink: &mut DiagnosticSink) {
        if self.get_root_node().is_none() {
            return;
        }
        let mut visited = HashSet::new();
        self.resolve_node(1, &mut visited, sink);
    }

    fn resolve_node(&self, index: i32, visited: &mut HashSet<i32>, sink: &mut DiagnosticSink) {
        if !visited.insert(index) {
            return;
        }
        let Some(node) = self.get_node(index) else {
            return;
        };
        match &node.data {
            NodeData::Sequence { items, .. } => {
                for &item in items {
                    self.resolve_node(item, visited, sink);
                }
            }
            NodeData::Mapping { pairs, .. } => {
                let mut seen: Vec<i32> = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    if seen.iter().any(|&prior| self.nodes_equal(prior, pair.key)) {
                        let mut diag = Diagnostic::new(
                            Level::Warning,
                            ModuleTag::Doc,
                            "duplicate mapping key; first occurrence wins for lookup",
                        );
                        if let Some(key_node) = self.get_node(pair.key) {
                            diag = diag.with_mark(key_node.start_mark);
                        }
                        sink.report(diag);
                    } else {
                        seen.push(pair.key);
                    }
                    self.resolve_node(pair.key, visited, sink);
                    self.resolve_node(pair.value, visited, sink);
                }
            }
            NodeData::Scalar { .. } | NodeData::NoNode => {}
        }
    }

    /// Structural equality between two nodes, terminating on cycles via a
    /// visited-pair guard (spec.md §4.6: "a compare operation against a
    /// cyclic subgraph must terminate").
    pub fn nodes_equal(&self, a: i32, b: i32) -> bool {
        let mut visited = HashSet::new();
        self.nodes_equal_inner(a, b, &mut visited)
    }

    fn nodes_equal_inner(&self, a: i32, b: i32, visited: &mut HashSet<(i32, i32)>) -> bool {
        if a == b {
            return true;
        }
        if !visited.insert((a, b)) {
            // Already comparing this pair further up the call stack: assume
            // equal so the recursion terminates instead of looping forever.
            return true;
        }
        let (Some(na), Some(nb)) = (self.get_node(a), self.get_node(b)) else {
            return false;
        };
        match (&na.data, &nb.data) {
            (NodeData::Scalar { value: va, .. }, NodeData::Scalar { value: vb, .. }) => va == vb,
            (NodeData::Sequence { items: ia, .. }, NodeData::Sequence { items: ib, .. }) => {
                ia.len() == ib.len()
                    && ia
                        .iter()
                        .zip(ib.iter())
                        .all(|(&x, &y)| self.nodes_equal_inner(x, y, visited))
            }
            (NodeData::Mapping { pairs: pa, .. }, NodeData::Mapping { pairs: pb, .. }) => {
                pa.len() == pb.len()
                    && pa.iter().all(|p| {
                        pb.iter().any(|q| {
                            self.nodes_equal_inner(p.key, q.key, visited)
                                && self.nodes_equal_inner(p.value, q.value, visited)
                        })
                    })
            }
            _ => false,
        }
    }

    /// Look up a mapping's value by a plain scalar key, honoring
    /// first-occurrence-wins for duplicate keys.
    pub fn mapping_lookup(&self, mapping: i32, key: &str) -> Option<i32> {
        let NodeData::Mapping { pairs, .. } = &self.get_node(mapping)?.data else {
            return None;
        };
        for pair in pairs {
            if let Some(node) = self.get_node(pair.key) {
                if let NodeData::Scalar { value, .. } = &node.data {
                    if value == key {
                        return Some(pair.value);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;
    use crate::parser::Parser;

    fn load_one(src: &str) -> Document {
        let mut parser = Parser::new(Input::from_str("t", src));
        Document::load(&mut parser).unwrap()
    }

    #[test]
    fn flags_duplicate_mapping_key_but_keeps_both_pairs() {
        let doc = load_one("a: 1\na: 2\n");
        let mut sink = DiagnosticSink::new();
        doc.resolve(&mut sink);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.records()[0].level, Level::Warning);
        let NodeData::Mapping { pairs, .. } = &doc.get_root_node().unwrap().data else {
            panic!("expected mapping");
        };
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn mapping_lookup_returns_first_occurrence() {
        let doc = load_one("a: 1\na: 2\n");
        let root_index = 1;
        let value_index = doc.mapping_lookup(root_index, "a").unwrap();
        let NodeData::Scalar { value, .. } = &doc.get_node(value_index).unwrap().data else {
            panic!("expected scalar");
        };
        assert_eq!(value, "1");
    }

    #[test]
    fn structural_compare_terminates_on_isomorphic_cyclic_aliases() {
        let doc = load_one("[&a [1, *a], &b [1, *b]]\n");
        let NodeData::Sequence { items, .. } = &doc.get_root_node().unwrap().data else {
            panic!("expected sequence");
        };
        let (first, second) = (items[0], items[1]);
        // Two separately-anchored but structurally identical self-referential
        // sequences; comparing them must terminate rather than recurse
        // forever chasing the cycle back and forth.
        assert!(doc.nodes_equal(first, second));
    }
}
