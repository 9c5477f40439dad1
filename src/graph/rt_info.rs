//! Runtime info attached to nodes
//!
//! String-keyed provenance metadata. It never influences inference or
//! matching; replacement primitives merge it with last-writer-wins semantics.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

/// Key recording the friendly names of the nodes a fused node derives from
pub const FUSED_NAMES: &str = "fused_names";

/// Insertion-ordered runtime info map
pub type RtInfo = IndexMap<String, RtValue>;

/// One runtime info attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtValue {
    /// Flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Free text
    Str(String),
    /// Ordered set of node names
    Names(IndexSet<String>),
}

impl RtValue {
    /// Names set, if this is one
    pub fn as_names(&self) -> Option<&IndexSet<String>> {
        match self {
            RtValue::Names(names) => Some(names),
            _ => None,
        }
    }
}

impl From<bool> for RtValue {
    fn from(v: bool) -> Self {
        RtValue::Bool(v)
    }
}

impl From<i64> for RtValue {
    fn from(v: i64) -> Self {
        RtValue::Int(v)
    }
}

impl From<&str> for RtValue {
    fn from(v: &str) -> Self {
        RtValue::Str(v.to_string())
    }
}

impl From<String> for RtValue {
    fn from(v: String) -> Self {
        RtValue::Str(v)
    }
}

impl fmt::Display for RtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtValue::Bool(v) => write!(f, "{}", v),
            RtValue::Int(v) => write!(f, "{}", v),
            RtValue::Str(v) => f.write_str(v),
            RtValue::Names(names) => {
                let joined: Vec<&str> = names.iter().map(String::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// Merge `from` into `into`; colliding keys take the value from `from`
pub fn merge_rt_info(into: &mut RtInfo, from: &RtInfo) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}

/// Union of the [`FUSED_NAMES`] sets over `infos`, in first-seen order
pub fn union_fused_names<'a>(infos: impl IntoIterator<Item = &'a RtInfo>) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for info in infos {
        if let Some(set) = info.get(FUSED_NAMES).and_then(RtValue::as_names) {
            names.extend(set.iter().cloned());
        }
    }
    names
}
