//! Multi-rule rewrite pass and the shared traversal driver

use tracing::{debug, warn};

use crate::error::GraphResult;
use crate::graph::Function;

use super::matcher_pass::MatcherPass;
use super::{FunctionPass, PassConfig, RewriteConfig};

// =============================================================================
// Driver
// =============================================================================

/// One traversal over a fresh topological snapshot
///
/// Every live node is offered to the enabled rules in order. The first rule
/// whose callback reports a change wins the node. Once anything has changed,
/// each visited node is re-inferred first (when enabled) so that predicates
/// see current shapes.
fn traverse_once(
    func: &mut Function,
    matchers: &mut [MatcherPass],
    config: &RewriteConfig,
    pass_config: &PassConfig,
) -> GraphResult<bool> {
    let mut changed = false;

    for id in func.get_ordered_ops() {
        if !func.contains(id) {
            continue;
        }
        if changed && config.enable_shape_inference {
            func.revalidate(id)?;
        }

        for matcher in matchers.iter_mut() {
            if pass_config.is_disabled(matcher.matcher().name()) {
                continue;
            }
            if matcher.apply(func, id)? {
                changed = true;
                break;
            }
        }
    }

    Ok(changed)
}

/// Drive `matchers` over `func` once or to fixpoint
pub(crate) fn run_matchers(
    func: &mut Function,
    matchers: &mut [MatcherPass],
    config: &RewriteConfig,
    pass_config: &PassConfig,
) -> GraphResult<bool> {
    if !config.run_to_fixpoint {
        return traverse_once(func, matchers, config, pass_config);
    }

    let max_iterations = config.max_iterations.max(1);
    let mut any_changed = false;
    for iteration in 0..max_iterations {
        if !traverse_once(func, matchers, config, pass_config)? {
            debug!(iterations = iteration + 1, "rewrite converged");
            return Ok(any_changed);
        }
        any_changed = true;
    }

    warn!(max_iterations, "rewrite still changing at iteration cap");
    Ok(any_changed)
}

// =============================================================================
// GraphRewrite
// =============================================================================

/// Several [`MatcherPass`] rules driven together in one traversal
///
/// Rules are tried per visited node in registration order.
#[derive(Debug)]
pub struct GraphRewrite {
    name: String,
    matchers: Vec<MatcherPass>,
    config: RewriteConfig,
    pass_config: PassConfig,
}

impl GraphRewrite {
    /// Create an empty rewrite
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matchers: Vec::new(),
            config: RewriteConfig::default(),
            pass_config: PassConfig::default(),
        }
    }

    /// Set the traversal configuration
    pub fn with_config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a rule
    pub fn add_matcher(&mut self, matcher: MatcherPass) -> &mut Self {
        self.matchers.push(matcher);
        self
    }

    /// Builder form of [`GraphRewrite::add_matcher`]
    pub fn with_matcher(mut self, matcher: MatcherPass) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Check if there are no rules
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Traversal configuration
    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }
}

impl FunctionPass for GraphRewrite {
    fn name(&self) -> &str {
        &self.name
    }

    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
        run_matchers(func, &mut self.matchers, &self.config, &self.pass_config)
    }

    fn set_pass_config(&mut self, config: &PassConfig) {
        self.pass_config = config.clone();
    }
}
