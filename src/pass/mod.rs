//! Pass infrastructure
//!
//! This module provides the rewrite protocol that drives matchers over a
//! function:
//!
//! - [`FunctionPass`]: whole-graph pass trait
//! - [`MatcherPass`]: one (pattern, callback) rule
//! - [`GraphRewrite`]: several rules tried per visited node in registration
//!   order
//! - [`Manager`]: runs registered passes in sequence
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::pass::{Manager, Validate};
//! use graph_rewrite::transformers::{ConstantFolding, FuseMultiplyConstants};
//!
//! let mut manager = Manager::new();
//! manager
//!     .register_pass(ConstantFolding::new())
//!     .register_pass(FuseMultiplyConstants::new())
//!     .register_pass(Validate::new());
//!
//! let changed = manager.run_passes(&mut function)?;
//! println!("{:?}", manager.stats());
//! ```

pub mod graph_rewrite;
pub mod manager;
pub mod matcher_pass;
pub mod validate;

use rustc_hash::FxHashSet;

use crate::error::GraphResult;
use crate::graph::Function;

// Re-export main types
pub use graph_rewrite::GraphRewrite;
pub use manager::{Manager, ManagerConfig, PassRecord, RunStats};
pub use matcher_pass::{MatcherCallback, MatcherPass};
pub use validate::Validate;

/// A pass over a whole function
pub trait FunctionPass {
    /// Pass name, used for configuration, logging and error context
    fn name(&self) -> &str;

    /// Run once over `func`, returning whether the graph changed
    fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool>;

    /// Receive the manager's pass configuration before running
    fn set_pass_config(&mut self, _config: &PassConfig) {}
}

/// Names of passes and matchers to skip
#[derive(Debug, Clone, Default)]
pub struct PassConfig {
    disabled: FxHashSet<String>,
}

impl PassConfig {
    /// Create a configuration with everything enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a pass or matcher by name
    pub fn disable(&mut self, name: impl Into<String>) -> &mut Self {
        self.disabled.insert(name.into());
        self
    }

    /// Re-enable a pass or matcher by name
    pub fn enable(&mut self, name: &str) -> &mut Self {
        self.disabled.remove(name);
        self
    }

    /// Builder form of [`PassConfig::disable`]
    pub fn with_disabled(mut self, name: impl Into<String>) -> Self {
        self.disable(name);
        self
    }

    /// Check if `name` is disabled
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }
}

/// Traversal configuration of a [`GraphRewrite`] or stand-alone [`MatcherPass`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Repeat full traversals until one changes nothing
    pub run_to_fixpoint: bool,
    /// Upper bound on traversals when running to fixpoint, at least one
    pub max_iterations: usize,
    /// Re-infer each visited node once the traversal has changed the graph
    pub enable_shape_inference: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            run_to_fixpoint: true,
            max_iterations: 100,
            enable_shape_inference: true,
        }
    }
}

impl RewriteConfig {
    /// Single traversal
    pub fn once() -> Self {
        Self {
            run_to_fixpoint: false,
            ..Default::default()
        }
    }

    /// Set whether to run to fixpoint
    pub fn with_fixpoint(mut self, run_to_fixpoint: bool) -> Self {
        self.run_to_fixpoint = run_to_fixpoint;
        self
    }

    /// Set the traversal bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set whether visited nodes are re-inferred after a change
    pub fn with_shape_inference(mut self, enable: bool) -> Self {
        self.enable_shape_inference = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_config() {
        let mut config = PassConfig::new().with_disabled("Fuse");
        assert!(config.is_disabled("Fuse"));
        assert!(!config.is_disabled("Validate"));
        config.enable("Fuse");
        assert!(!config.is_disabled("Fuse"));
    }

    #[test]
    fn test_rewrite_config_defaults() {
        let config = RewriteConfig::default();
        assert!(config.run_to_fixpoint);
        assert_eq!(config.max_iterations, 100);
        assert!(config.enable_shape_inference);
        assert!(!RewriteConfig::once().run_to_fixpoint);
        assert_eq!(RewriteConfig::once().with_max_iterations(3).max_iterations, 3);
    }
}
