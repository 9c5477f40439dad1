//! Pass manager
//!
//! Runs registered passes in order. A run either completes or returns the
//! first error wrapped in [`GraphError::PassFailed`]; no partial rollback is
//! attempted.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Function;

use super::{FunctionPass, PassConfig};

/// Manager configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Re-infer the whole graph after each pass that reports a change
    pub per_pass_validation: bool,
    /// Sweep unreachable nodes after each pass that reports a change
    pub collect_garbage: bool,
    /// Re-infer the whole graph once after the last pass
    pub final_validation: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            per_pass_validation: true,
            collect_garbage: true,
            final_validation: true,
        }
    }
}

impl ManagerConfig {
    /// Set per-pass validation
    pub fn with_per_pass_validation(mut self, enable: bool) -> Self {
        self.per_pass_validation = enable;
        self
    }

    /// Set garbage collection between passes
    pub fn with_collect_garbage(mut self, enable: bool) -> Self {
        self.collect_garbage = enable;
        self
    }

    /// Set final validation
    pub fn with_final_validation(mut self, enable: bool) -> Self {
        self.final_validation = enable;
        self
    }
}

/// Outcome of one pass in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRecord {
    /// Pass name
    pub name: String,
    /// Whether the pass changed the graph
    pub changed: bool,
    /// Wall time spent in the pass
    pub elapsed: Duration,
}

/// Statistics of the last run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Passes executed (disabled ones excluded)
    pub passes_run: usize,
    /// Passes that reported a change
    pub passes_changed: usize,
    /// Nodes removed from the arena during the run
    pub nodes_released: usize,
    /// Per-pass records in execution order
    pub per_pass: Vec<PassRecord>,
}

/// Ordered list of passes run over a function
#[derive(Default)]
pub struct Manager {
    passes: Vec<Box<dyn FunctionPass>>,
    config: ManagerConfig,
    pass_config: PassConfig,
    stats: RunStats,
}

impl Manager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the manager configuration
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the disabled pass/matcher names
    pub fn with_pass_config(mut self, pass_config: PassConfig) -> Self {
        self.pass_config = pass_config;
        self
    }

    /// Mutable access to the disabled pass/matcher names
    pub fn pass_config_mut(&mut self) -> &mut PassConfig {
        &mut self.pass_config
    }

    /// Append a pass
    pub fn register_pass(&mut self, pass: impl FunctionPass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Append an already boxed pass
    pub fn register_boxed(&mut self, pass: Box<dyn FunctionPass>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    /// Names of the registered passes in order
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run every enabled pass over `func` in registration order
    ///
    /// Returns whether any pass changed the graph.
    #[tracing::instrument(skip_all, fields(function = %func.name()))]
    pub fn run_passes(&mut self, func: &mut Function) -> GraphResult<bool> {
        self.stats = RunStats::default();
        let released_before = func.released_count();
        let mut any_changed = false;

        for pass in self.passes.iter_mut() {
            let name = pass.name().to_string();
            if self.pass_config.is_disabled(&name) {
                debug!(pass = %name, "pass disabled");
                continue;
            }

            pass.set_pass_config(&self.pass_config);
            let start = Instant::now();
            let changed = pass
                .run_on_function(func)
                .and_then(|changed| {
                    if changed {
                        Self::after_change(&self.config, func)?;
                    }
                    Ok(changed)
                })
                .map_err(|source| GraphError::PassFailed {
                    pass: name.clone(),
                    source: Box::new(source),
                })?;
            let elapsed = start.elapsed();

            debug!(pass = %name, changed, ?elapsed, "pass finished");
            self.stats.passes_run += 1;
            if changed {
                self.stats.passes_changed += 1;
                any_changed = true;
            }
            self.stats.per_pass.push(PassRecord {
                name,
                changed,
                elapsed,
            });
        }

        if self.config.final_validation {
            func.validate_nodes_and_infer_types()?;
        }
        self.stats.nodes_released = func.released_count() - released_before;
        Ok(any_changed)
    }

    fn after_change(config: &ManagerConfig, func: &mut Function) -> GraphResult<()> {
        if config.collect_garbage {
            let released = func.collect_garbage();
            if released > 0 {
                debug!(released, "garbage collected");
            }
        }
        if config.per_pass_validation {
            func.validate_nodes_and_infer_types()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("passes", &self.pass_names())
            .field("config", &self.config)
            .field("pass_config", &self.pass_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Negative, Relu};
    use crate::pass::{MatcherPass, Validate};
    use crate::pattern::{any_input, wrap_type, Matcher};
    use crate::tensor::ElementType;
    use crate::transform::replace_node;

    struct Failing;

    impl FunctionPass for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn run_on_function(&mut self, _func: &mut Function) -> GraphResult<bool> {
            Err(GraphError::Internal("boom".to_string()))
        }
    }

    /// Leaves an unreachable node behind for the manager to sweep
    struct AddDangling;

    impl FunctionPass for AddDangling {
        fn name(&self) -> &str {
            "AddDangling"
        }

        fn run_on_function(&mut self, func: &mut Function) -> GraphResult<bool> {
            let p = func.parameters()[0];
            let value = func.output(p, 0)?;
            func.add_node(Relu::new(), &[value])?;
            Ok(true)
        }
    }

    fn neg_to_relu() -> MatcherPass {
        let matcher = Matcher::new(wrap_type::<Negative>(vec![any_input()]), "NegToRelu");
        MatcherPass::new(matcher, |f, m| {
            let input = f.node(m.root_node())?.input_value(0)?;
            let relu = f.add_node(Relu::new(), &[input])?;
            replace_node(f, m.root_node(), relu)?;
            Ok(true)
        })
    }

    fn graph() -> Function {
        let mut f = Function::new("f");
        let p = f.add_parameter(ElementType::F32, [2]).unwrap();
        let neg = f.add_op(Negative::new(), &[p]).unwrap();
        f.add_result(neg).unwrap();
        f
    }

    #[test]
    fn test_run_passes_records_stats() {
        let mut f = graph();
        let mut manager = Manager::new();
        manager.register_pass(neg_to_relu()).register_pass(Validate::new());
        assert_eq!(manager.pass_names(), vec!["NegToRelu", "Validate"]);

        assert!(manager.run_passes(&mut f).unwrap());
        let stats = manager.stats();
        assert_eq!(stats.passes_run, 2);
        assert_eq!(stats.passes_changed, 1);
        assert_eq!(stats.nodes_released, 1);
        assert!(stats.per_pass[0].changed);
        assert!(!stats.per_pass[1].changed);

        assert!(!manager.run_passes(&mut f).unwrap());
        assert_eq!(manager.stats().nodes_released, 0);
    }

    #[test]
    fn test_error_names_pass() {
        let mut f = graph();
        let mut manager = Manager::new();
        manager.register_pass(Validate::new()).register_pass(Failing);
        let err = manager.run_passes(&mut f).unwrap_err();
        match &err {
            GraphError::PassFailed { pass, .. } => assert_eq!(pass, "Failing"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), GraphError::Internal(_)));
    }

    #[test]
    fn test_disabled_pass_skipped() {
        let mut f = graph();
        let mut manager =
            Manager::new().with_pass_config(PassConfig::new().with_disabled("Failing"));
        manager.register_pass(Failing).register_pass(Validate::new());
        assert!(!manager.run_passes(&mut f).unwrap());
        assert_eq!(manager.stats().passes_run, 1);
    }

    #[test]
    fn test_garbage_collected_after_change() {
        let mut f = graph();
        let mut manager = Manager::new();
        manager.register_pass(AddDangling);
        assert!(manager.run_passes(&mut f).unwrap());
        assert_eq!(manager.stats().nodes_released, 1);
        assert!(f.find_nodes::<Relu>().is_empty());

        let mut f = graph();
        let mut manager =
            Manager::new().with_config(ManagerConfig::default().with_collect_garbage(false));
        manager.register_pass(AddDangling);
        manager.run_passes(&mut f).unwrap();
        assert_eq!(f.find_nodes::<Relu>().len(), 1);
    }
}
