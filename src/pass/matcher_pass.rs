//! Single-rule matcher pass

use tracing::debug;

use crate::error::GraphResult;
use crate::graph::{Function, NodeId};
use crate::pattern::{MatchResult, Matcher};

use super::graph_rewrite::run_matchers;
use super::{FunctionPass, PassConfig, RewriteConfig};

/// Rewrite callback
///
/// Called with the graph and a successful match. Returns whether it changed
/// the graph. All checks must happen before the first mutation: an error
/// aborts the whole run and nothing is rolled back.
pub type MatcherCallback = Box<dyn FnMut(&mut Function, &MatchResult) -> GraphResult<bool>>;

/// One (pattern, callback) rewrite rule
///
/// Usable on its own as a [`FunctionPass`] or grouped in a
/// [`GraphRewrite`](super::GraphRewrite).
pub struct MatcherPass {
    matcher: Matcher,
    callback: MatcherCallback,
    config: RewriteConfig,
    pass_config: PassConfig,
}

impl MatcherPass {
    /// Create a rule; its name is the matcher's name
    pub fn new(
        matcher: Matcher,
        callback: impl FnMut(&mut Function, &MatchResult) -> GraphResult<bool> + 'static,
    ) -> Self {
        Self {
            matcher,
            callback: Box::new(callback),
            config: RewriteConfig::default(),
            pass_config: PassConfig::default(),
        }
    }

    /// Set the traversal configuration used when run on its own
    pub fn with_config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    /// The rule's matcher
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Try the rule rooted at `node`
    ///
    /// On a match the callback runs; if it reports a change, the matched
    /// nodes that lost all consumers are released right away so that later
    /// predicates see exact consumer counts.
    pub fn apply(&mut self, func: &mut Function, node: NodeId) -> GraphResult<bool> {
        let Some(m) = self.matcher.match_node(func, node) else {
            return Ok(false);
        };
        if !(self.callback)(func, &m)? {
            return Ok(false);
        }
        let released = func.release_unused(m.matched_nodes().iter().copied());
        debug!(matcher = %self.matcher.name(), root = %node, released, "callback applied");
        Ok(true)
    }
}

impl std::fmt::Debug for MatcherPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherPass")
            .field("matcher", &self.matcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FunctionPass for MatcherPass {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
        let config = self.config;
        let pass_config = std::mem::take(&mut self.pass_config);
        let result = run_matchers(func, std::slice::from_mut(self), &config, &pass_config);
        self.pass_config = pass_config;
        result
    }

    fn set_pass_config(&mut self, config: &PassConfig) {
        self.pass_config = config.clone();
    }
}
