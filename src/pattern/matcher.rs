//! Pattern matching engine
//!
//! Matching is root-down recursive descent over the pattern DAG. It only
//! reads the function, so a failed (or discarded) match never changes the
//! graph.
//!
//! `Or` nodes choose the first alternative whose local check (operation kind
//! and predicate) accepts the candidate. If that alternative's sub-patterns
//! then fail, the whole match fails; other alternatives are not retried at
//! that position.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::graph::{Function, NodeId, Output};

use super::ops::{Pattern, PatternId, PatternKind};

/// Result of a successful match
#[derive(Debug, Clone)]
pub struct MatchResult {
    root_value: Output,
    pattern_map: FxHashMap<PatternId, Output>,
    matched_nodes: Vec<NodeId>,
}

impl MatchResult {
    /// The value the pattern root matched
    pub fn root_value(&self) -> Output {
        self.root_value
    }

    /// Node producing the root value
    pub fn root_node(&self) -> NodeId {
        self.root_value.node
    }

    /// Value bound to `pattern`
    pub fn get(&self, pattern: &Pattern) -> Option<Output> {
        self.pattern_map.get(&pattern.id()).copied()
    }

    /// Node producing the value bound to `pattern`
    pub fn node(&self, pattern: &Pattern) -> Option<NodeId> {
        self.get(pattern).map(|o| o.node)
    }

    /// Full pattern value map
    pub fn pattern_map(&self) -> &FxHashMap<PatternId, Output> {
        &self.pattern_map
    }

    /// Every data node touched by the match, in visit order, without repeats
    pub fn matched_nodes(&self) -> &[NodeId] {
        &self.matched_nodes
    }
}

#[derive(Default)]
struct MatchState {
    pattern_map: FxHashMap<PatternId, Output>,
    matched_nodes: Vec<NodeId>,
}

impl MatchState {
    fn bind(&mut self, pattern: &Pattern, value: Output) {
        self.pattern_map.insert(pattern.id(), value);
        if !self.matched_nodes.contains(&value.node) {
            self.matched_nodes.push(value.node);
        }
    }
}

/// A named pattern ready to be matched against candidate values
#[derive(Debug, Clone)]
pub struct Matcher {
    root: Pattern,
    name: String,
}

impl Matcher {
    /// Create a matcher for `root`
    pub fn new(root: Pattern, name: impl Into<String>) -> Self {
        Self {
            root,
            name: name.into(),
        }
    }

    /// Matcher name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root pattern
    pub fn pattern(&self) -> &Pattern {
        &self.root
    }

    /// Match the root pattern against `value`
    pub fn match_value(&self, func: &Function, value: Output) -> Option<MatchResult> {
        let mut state = MatchState::default();
        if !match_pattern(func, &self.root, value, &mut state) {
            trace!(matcher = %self.name, value = %value, "no match");
            return None;
        }
        Some(MatchResult {
            root_value: value,
            pattern_map: state.pattern_map,
            matched_nodes: state.matched_nodes,
        })
    }

    /// Match the root pattern against the outputs of `node`, in index order
    ///
    /// Returns the first successful binding.
    pub fn match_node(&self, func: &Function, node: NodeId) -> Option<MatchResult> {
        let outputs = func.node(node).ok()?.output_size();
        (0..outputs).find_map(|i| self.match_value(func, Output::new(node, i)))
    }
}

/// Operation kind and predicate check, without descending into inputs
fn local_check(func: &Function, pattern: &Pattern, value: Output) -> bool {
    match pattern.kind() {
        PatternKind::Any { predicate } => predicate.as_ref().map_or(true, |p| p(func, value)),
        PatternKind::WrapType {
            types, predicate, ..
        } => {
            let Ok(node) = func.node(value.node) else {
                return false;
            };
            types.contains(&node.type_info())
                && predicate.as_ref().map_or(true, |p| p(func, value))
        }
        PatternKind::Or { alternatives } => {
            alternatives.iter().any(|alt| local_check(func, alt, value))
        }
    }
}

fn match_pattern(
    func: &Function,
    pattern: &Pattern,
    value: Output,
    state: &mut MatchState,
) -> bool {
    if let Some(bound) = state.pattern_map.get(&pattern.id()) {
        return *bound == value;
    }
    if func.output_desc(value).is_err() {
        return false;
    }

    match pattern.kind() {
        PatternKind::Any { .. } => {
            if !local_check(func, pattern, value) {
                return false;
            }
            state.bind(pattern, value);
            true
        }
        PatternKind::WrapType { inputs, .. } => {
            if !local_check(func, pattern, value) {
                return false;
            }
            state.bind(pattern, value);
            if inputs.is_empty() {
                return true;
            }
            let Ok(node) = func.node(value.node) else {
                return false;
            };
            if node.input_size() != inputs.len() {
                return false;
            }
            inputs
                .iter()
                .zip(node.input_values())
                .all(|(child, source)| match_pattern(func, child, *source, state))
        }
        PatternKind::Or { alternatives } => {
            let Some(chosen) = alternatives
                .iter()
                .find(|alt| local_check(func, alt, value))
            else {
                return false;
            };
            if !match_pattern(func, chosen, value, state) {
                return false;
            }
            state.pattern_map.insert(pattern.id(), value);
            true
        }
    }
}
