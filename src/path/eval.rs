//! Evaluates a compiled path [`Expr`] against a [`Document`] (spec.md §4.9).
//!
//! Every reduction works over a [`WalkResult`]: a single node, a flat list of
//! node references, a bare scalar produced by arithmetic/comparison, or
//! nothing. "The simplifier collapses nested refs of refs into a flat refs
//! list, and a singleton refs list into its sole element" — done here by
//! [`WalkResult::flatten`] after every operator that can produce nested
//! results (`Multi`, `Chain` over an every-child step, `Filter`).
//!
//! `Document`/`Node` store no parent pointers (nodes only point down, the way
//! the teacher's `yaml_node_t` does), so the `..` operator needs a parent
//! index computed once up front; [`Evaluator::new`] builds that map by
//! walking the whole tree before evaluation starts, the same one-pass
//! bookkeeping `resolver.rs` does for anchors.

use std::collections::HashMap;

use crate::document::{Document, NodeData, NodeItem};
use crate::error::PathEvalError;
use crate::path::ast::{ArithOp, CompareOp, Expr, ExprKind, Literal};

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Str(String),
    Num(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum WalkResult {
    Empty,
    Node(NodeItem),
    Refs(Vec<NodeItem>),
    Scalar(ScalarValue),
}

impl WalkResult {
    fn from_nodes(mut nodes: Vec<NodeItem>) -> WalkResult {
        match nodes.len() {
            0 => WalkResult::Empty,
            1 => WalkResult::Node(nodes.pop().unwrap()),
            _ => WalkResult::Refs(nodes),
        }
    }

    fn into_nodes(self) -> Vec<NodeItem> {
        match self {
            WalkResult::Empty => Vec::new(),
            WalkResult::Node(n) => vec![n],
            WalkResult::Refs(ns) => ns,
            WalkResult::Scalar(_) => Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, WalkResult::Empty)
    }
}

pub struct Evaluator<'d> {
    doc: &'d Document,
    parents: HashMap<NodeItem, NodeItem>,
}

impl<'d> Evaluator<'d> {
    pub fn new(doc: &'d Document) -> Self {
        let mut parents = HashMap::new();
        if doc.get_root_node().is_some() {
            build_parent_map(doc, 1, &mut parents);
        }
        Evaluator { doc, parents }
    }

    pub fn eval(&self, expr: &Expr) -> Result<WalkResult, PathEvalError> {
        let root = self.doc.get_root_node().map(|_| 1);
        let start = match root {
            Some(n) => WalkResult::Node(n),
            None => WalkResult::Empty,
        };
        self.eval_from(expr, &start)
    }

    fn eval_from(&self, expr: &Expr, input: &WalkResult) -> Result<WalkResult, PathEvalError> {
        match &expr.kind {
            ExprKind::Root => Ok(match self.doc.get_root_node() {
                Some(_) => WalkResult::Node(1),
                None => WalkResult::Empty,
            }),
            ExprKind::This => Ok(input.clone()),
            ExprKind::Parent => {
                let mapped = input
                    .clone()
                    .into_nodes()
                    .into_iter()
                    .filter_map(|n| self.parents.get(&n).copied())
                    .collect();
                Ok(WalkResult::from_nodes(dedup_keep_order(mapped)))
            }
            ExprKind::EveryChild => {
                let children = input.clone().into_nodes().into_iter().flat_map(|n| self.children_of(n)).collect();
                Ok(WalkResult::from_nodes(children))
            }
            ExprKind::EveryChildRecursive => {
                let mut out = Vec::new();
                for n in input.clone().into_nodes() {
                    self.collect_descendants(n, &mut out);
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::Alias(name) => Ok(match self.doc.anchor(name) {
                Some(n) => WalkResult::Node(n),
                None => WalkResult::Empty,
            }),
            ExprKind::MapKey(key) => {
                let mut out = Vec::new();
                for n in input.clone().into_nodes() {
                    if let Some(v) = self.mapping_lookup(n, key) {
                        out.push(v);
                    }
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::SeqIndex(idx) => {
                let mut out = Vec::new();
                for n in input.clone().into_nodes() {
                    if let Some(v) = self.seq_index(n, *idx) {
                        out.push(v);
                    }
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::SeqSlice(lo, hi) => {
                let mut out = Vec::new();
                for n in input.clone().into_nodes() {
                    out.extend(self.seq_slice(n, *lo, *hi));
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::Literal(lit) => Ok(WalkResult::Scalar(literal_value(lit))),
            ExprKind::Chain(steps) => {
                let mut current = input.clone();
                for step in steps {
                    current = self.eval_from(step, &current)?;
                    if current.is_empty() {
                        return Ok(WalkResult::Empty);
                    }
                }
                Ok(current)
            }
            ExprKind::Multi(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.eval_from(item, input)?.into_nodes());
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::Or(lhs, rhs) => {
                let left = self.eval_from(lhs, input)?;
                if !left.is_empty() {
                    return Ok(left);
                }
                self.eval_from(rhs, input)
            }
            ExprKind::And(lhs, rhs) => {
                let left = self.eval_from(lhs, input)?;
                if left.is_empty() {
                    return Ok(WalkResult::Empty);
                }
                self.eval_from(rhs, input)
            }
            ExprKind::Compare(op, lhs, rhs) => {
                let left = self.eval_from(lhs, input)?;
                let right = self.eval_from(rhs, input)?;
                Ok(self.eval_compare(*op, &left, &right))
            }
            ExprKind::Arith(op, lhs, rhs) => {
                let left = self.eval_from(lhs, input)?;
                let right = self.eval_from(rhs, input)?;
                self.eval_arith(*op, &left, &right)
            }
            ExprKind::FilterUnique(inner) => {
                let result = self.eval_from(inner, input)?;
                let nodes = result.into_nodes();
                let mut seen: Vec<String> = Vec::new();
                let mut out = Vec::new();
                for n in nodes {
                    let text = self.node_scalar_text(n);
                    if !seen.contains(&text) {
                        seen.push(text);
                        out.push(n);
                    }
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::Filter(base, pred) => {
                let base_result = self.eval_from(base, input)?;
                let mut out = Vec::new();
                for n in base_result.into_nodes() {
                    let pred_result = self.eval_from(pred, &WalkResult::Node(n))?;
                    if !pred_result.is_empty() {
                        out.push(n);
                    }
                }
                Ok(WalkResult::from_nodes(out))
            }
            ExprKind::Not(inner) => {
                let result = self.eval_from(inner, input)?;
                Ok(if result.is_empty() { input.clone() } else { WalkResult::Empty })
            }
            ExprKind::FilterCollection(inner) => {
                let result = self.eval_from(inner, input)?;
                let out = result.into_nodes().into_iter().filter(|&n| self.is_collection(n)).collect();
                Ok(WalkResult::from_nodes(out))
            }
        }
    }

    fn is_collection(&self, node: NodeItem) -> bool {
        matches!(
            self.doc.get_node(node).map(|n| &n.data),
            Some(NodeData::Sequence { .. }) | Some(NodeData::Mapping { .. })
        )
    }

    fn children_of(&self, node: NodeItem) -> Vec<NodeItem> {
        match self.doc.get_node(node).map(|n| &n.data) {
            Some(NodeData::Sequence { items, .. }) => items.clone(),
            Some(NodeData::Mapping { pairs, .. }) => pairs.iter().flat_map(|p| [p.key, p.value]).collect(),
            _ => Vec::new(),
        }
    }

    fn collect_descendants(&self, node: NodeItem, out: &mut Vec<NodeItem>) {
        for child in self.children_of(node) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    fn mapping_lookup(&self, node: NodeItem, key: &str) -> Option<NodeItem> {
        let NodeData::Mapping { pairs, .. } = &self.doc.get_node(node)?.data else {
            return None;
        };
        pairs
            .iter()
            .find(|p| self.node_scalar_text(p.key) == key)
            .map(|p| p.value)
    }

    fn seq_index(&self, node: NodeItem, idx: i64) -> Option<NodeItem> {
        let NodeData::Sequence { items, .. } = &self.doc.get_node(node)?.data else {
            return None;
        };
        let len = items.len() as i64;
        let real_idx = if idx < 0 { len + idx } else { idx };
        if real_idx < 0 || real_idx >= len {
            return None;
        }
        Some(items[real_idx as usize])
    }

    fn seq_slice(&self, node: NodeItem, lo: Option<i64>, hi: Option<i64>) -> Vec<NodeItem> {
        let Some(NodeData::Sequence { items, .. }) = self.doc.get_node(node).map(|n| &n.data) else {
            return Vec::new();
        };
        let len = items.len() as i64;
        let normalize = |v: i64| -> i64 { if v < 0 { (len + v).max(0) } else { v.min(len) } };
        let start = normalize(lo.unwrap_or(0));
        let end = normalize(hi.unwrap_or(len));
        if start >= end {
            return Vec::new();
        }
        items[start as usize..end as usize].to_vec()
    }

    fn node_scalar_text(&self, node: NodeItem) -> String {
        match self.doc.get_node(node).map(|n| &n.data) {
            Some(NodeData::Scalar { value, .. }) => value.clone(),
            _ => String::new(),
        }
    }

    fn as_scalar(&self, result: &WalkResult) -> Option<ScalarValue> {
        match result {
            WalkResult::Scalar(v) => Some(v.clone()),
            WalkResult::Node(n) => match self.doc.get_node(*n).map(|n| &n.data) {
                Some(NodeData::Scalar { value, .. }) => Some(scalar_from_text(value)),
                _ => None,
            },
            _ => None,
        }
    }

    fn eval_compare(&self, op: CompareOp, left: &WalkResult, right: &WalkResult) -> WalkResult {
        let (Some(l), Some(r)) = (self.as_scalar(left), self.as_scalar(right)) else {
            return WalkResult::Empty;
        };
        let matched = match (&l, &r) {
            (ScalarValue::Num(a), ScalarValue::Num(b)) => compare_f64(op, *a, *b),
            _ => compare_str(op, &scalar_text(&l), &scalar_text(&r)),
        };
        if matched {
            WalkResult::Scalar(l)
        } else {
            WalkResult::Empty
        }
    }

    fn eval_arith(&self, op: ArithOp, left: &WalkResult, right: &WalkResult) -> Result<WalkResult, PathEvalError> {
        let (Some(l), Some(r)) = (self.as_scalar(left), self.as_scalar(right)) else {
            return Ok(WalkResult::Empty);
        };
        let (ScalarValue::Num(a), ScalarValue::Num(b)) = (as_num(&l), as_num(&r)) else {
            return Ok(WalkResult::Empty);
        };
        let result = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    return Err(PathEvalError::DivisionByZero);
                }
                a / b
            }
        };
        Ok(WalkResult::Scalar(ScalarValue::Num(result)))
    }
}

fn build_parent_map(doc: &Document, node: NodeItem, parents: &mut HashMap<NodeItem, NodeItem>) {
    let Some(data) = doc.get_node(node).map(|n| &n.data) else {
        return;
    };
    match data {
        NodeData::Sequence { items, .. } => {
            for &item in items {
                parents.insert(item, node);
                build_parent_map(doc, item, parents);
            }
        }
        NodeData::Mapping { pairs, .. } => {
            for pair in pairs {
                parents.insert(pair.key, node);
                parents.insert(pair.value, node);
                build_parent_map(doc, pair.key, parents);
                build_parent_map(doc, pair.value, parents);
            }
        }
        NodeData::Scalar { .. } | NodeData::NoNode => {}
    }
}

fn dedup_keep_order(items: Vec<NodeItem>) -> Vec<NodeItem> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
            out.push(item);
        }
    }
    out
}

fn literal_value(lit: &Literal) -> ScalarValue {
    match lit {
        Literal::Str(s) => ScalarValue::Str(s.clone()),
        Literal::Int(n) => ScalarValue::Num(*n as f64),
        Literal::Float(f) => ScalarValue::Num(*f),
    }
}

fn scalar_from_text(text: &str) -> ScalarValue {
    match text.parse::<f64>() {
        Ok(n) => ScalarValue::Num(n),
        Err(_) => ScalarValue::Str(text.to_string()),
    }
}

fn scalar_text(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Str(s) => s.clone(),
        ScalarValue::Num(n) => n.to_string(),
    }
}

fn as_num(value: &ScalarValue) -> ScalarValue {
    match value {
        ScalarValue::Num(n) => ScalarValue::Num(*n),
        ScalarValue::Str(s) => match s.parse::<f64>() {
            Ok(n) => ScalarValue::Num(n),
            Err(_) => ScalarValue::Str(s.clone()),
        },
    }
}

fn compare_f64(op: CompareOp, a: f64, b: f64) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
    }
}

fn compare_str(op: CompareOp, a: &str, b: &str) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagnosticSink;
    use crate::input::Input;
    use crate::parser::Parser;
    use crate::path::compiler::compile;

    fn load(yaml: &str) -> Document {
        let mut parser = Parser::new(Input::from_str("t", yaml));
        let mut sink = DiagnosticSink::new();
        crate::loader::load(&mut parser, &mut sink).unwrap()
    }

    #[test]
    fn map_key_chain_resolves_nested_value() {
        let doc = load("a:\n  b: 1\n");
        let expr = compile("a/b").unwrap();
        let evaluator = Evaluator::new(&doc);
        let result = evaluator.eval(&expr).unwrap();
        match result {
            WalkResult::Node(n) => {
                let NodeData::Scalar { value, .. } = &doc.get_node(n).unwrap().data else {
                    panic!("expected scalar");
                };
                assert_eq!(value, "1");
            }
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[test]
    fn sequence_slice_clamps_bounds() {
        let doc = load("[1, 2, 3, 4, 5]\n");
        let expr = compile("[1:3]").unwrap();
        let evaluator = Evaluator::new(&doc);
        let WalkResult::Refs(nodes) = evaluator.eval(&expr).unwrap() else {
            panic!("expected refs");
        };
        let values: Vec<_> = nodes
            .iter()
            .map(|&n| match &doc.get_node(n).unwrap().data {
                NodeData::Scalar { value, .. } => value.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(values, vec!["2", "3"]);
    }

    #[test]
    fn alias_resolves_to_the_anchored_node() {
        let doc = load("base: &b [1, 2, 3]\nderived: *b\n");
        let expr = compile("*b").unwrap();
        let evaluator = Evaluator::new(&doc);
        let WalkResult::Node(n) = evaluator.eval(&expr).unwrap() else {
            panic!("expected a single node");
        };
        assert!(matches!(&doc.get_node(n).unwrap().data, NodeData::Sequence { .. }));
    }

    #[test]
    fn undefined_alias_reference_evaluates_to_empty() {
        let doc = load("a: 1\n");
        let expr = compile("*missing").unwrap();
        let evaluator = Evaluator::new(&doc);
        assert_eq!(evaluator.eval(&expr).unwrap(), WalkResult::Empty);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let doc = load("1\n");
        let expr = compile("1 / 0").unwrap();
        let evaluator = Evaluator::new(&doc);
        assert_eq!(evaluator.eval(&expr), Err(PathEvalError::DivisionByZero));
    }

    #[test]
    fn filter_unique_drops_later_duplicates() {
        let doc = load("[a, b, a, c]\n");
        let expr = compile("*$").unwrap();
        let evaluator = Evaluator::new(&doc);
        let WalkResult::Refs(nodes) = evaluator.eval(&expr).unwrap() else {
            panic!("expected refs");
        };
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn filter_collection_keeps_only_sequences_and_mappings() {
        let doc = load("[1, [2, 3], {k: v}]\n");
        let expr = compile("*%").unwrap();
        let evaluator = Evaluator::new(&doc);
        let WalkResult::Refs(nodes) = evaluator.eval(&expr).unwrap() else {
            panic!("expected refs");
        };
        assert_eq!(nodes.len(), 2);
    }
}
