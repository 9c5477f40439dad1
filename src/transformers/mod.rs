//! Ready-made passes
//!
//! This module provides transformations for common graph optimizations:
//!
//! - **Constant folding**: evaluate subgraphs computable ahead of time
//! - **Decomposition**: rewrite operations into simpler ones (`Negative`)
//! - **Fusion**: combine adjacent nodes (Multiply-by-constant chains)
//! - **Elimination**: remove no-op nodes (same-type Convert, `x * 1`, `x + 0`)
//!
//! Each one implements [`FunctionPass`](crate::pass::FunctionPass) and can be
//! registered on a [`Manager`] individually or through
//! [`OptimizationPipeline`].
//!
//! # Example
//!
//! ```ignore
//! use graph_rewrite::transformers::OptimizationPipeline;
//!
//! let mut manager = OptimizationPipeline::default().build();
//! let changed = manager.run_passes(&mut function)?;
//! println!("released {} nodes", manager.stats().nodes_released);
//! ```

/// Common utilities
pub mod common;
/// Constant folding
pub mod constant_fold;
/// Negative decomposition
pub mod convert_negative;
/// No-op elimination
pub mod eliminate;
/// Multiply-constant fusion
pub mod fuse_multiply;

pub use constant_fold::ConstantFolding;
pub use convert_negative::ConvertNegative;
pub use eliminate::{
    eliminate_add_zero, eliminate_convert, eliminate_multiply_by_one, NopElimination,
};
pub use fuse_multiply::FuseMultiplyConstants;

use crate::error::GraphResult;
use crate::graph::Function;
use crate::pass::{Manager, ManagerConfig, RunStats};

/// Standard pass sequence
///
/// Passes run in the order decompose, constant fold, fuse, eliminate:
/// decomposition exposes new multiplications, folding turns constant
/// subgraphs into the `Constant`s the fusion and elimination rules look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationPipeline {
    /// Enable constant folding
    pub constant_fold: bool,
    /// Enable no-op elimination
    pub eliminate: bool,
    /// Enable fusion passes
    pub fuse: bool,
    /// Enable decomposition passes
    pub decompose: bool,
    /// Manager configuration
    pub manager: ManagerConfig,
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self {
            constant_fold: true,
            eliminate: true,
            fuse: true,
            decompose: true,
            manager: ManagerConfig::default(),
        }
    }
}

impl OptimizationPipeline {
    /// Create a pipeline with every pass enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable only elimination passes
    pub fn eliminate_only() -> Self {
        Self {
            constant_fold: false,
            eliminate: true,
            fuse: false,
            decompose: false,
            ..Default::default()
        }
    }

    /// Enable only fusion passes
    pub fn fuse_only() -> Self {
        Self {
            constant_fold: false,
            eliminate: false,
            fuse: true,
            decompose: false,
            ..Default::default()
        }
    }

    /// Set the manager configuration
    pub fn with_manager_config(mut self, manager: ManagerConfig) -> Self {
        self.manager = manager;
        self
    }

    /// Build a manager with the enabled passes registered
    pub fn build(&self) -> Manager {
        let mut manager = Manager::new().with_config(self.manager);
        if self.decompose {
            manager.register_pass(ConvertNegative::new());
        }
        if self.constant_fold {
            manager.register_pass(ConstantFolding::new());
        }
        if self.fuse {
            manager.register_pass(FuseMultiplyConstants::new());
        }
        if self.eliminate {
            manager.register_pass(NopElimination::new());
        }
        manager
    }

    /// Build a manager, run it over `func` and return its statistics
    pub fn run(&self, func: &mut Function) -> GraphResult<RunStats> {
        let mut manager = self.build();
        manager.run_passes(func)?;
        Ok(manager.stats().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Add, Constant, Multiply, Negative, Relu};
    use crate::tensor::{ElementType, Tensor};

    /// `relu(-(x) * 2 * (1 + 2)) + 0`
    fn make_test_graph() -> Function {
        let mut f = Function::new("test");
        let x = f.add_parameter(ElementType::F32, [1, 4]).unwrap();
        let neg = f.add_op(Negative::new(), &[x]).unwrap();
        let two = f.add_constant(Tensor::scalar(ElementType::F32, 2.0)).unwrap();
        let scaled = f.add_op(Multiply::new(), &[neg, two]).unwrap();
        let one = f.add_constant(Tensor::scalar(ElementType::F32, 1.0)).unwrap();
        let sum = f.add_op(Add::new(), &[one, two]).unwrap();
        let scaled = f.add_op(Multiply::new(), &[scaled, sum]).unwrap();
        let relu = f.add_op(Relu::new(), &[scaled]).unwrap();
        let zero = f.add_constant(Tensor::scalar(ElementType::F32, 0.0)).unwrap();
        let out = f.add_op(Add::new(), &[relu, zero]).unwrap();
        f.add_result(out).unwrap();
        f
    }

    #[test]
    fn test_optimization_pipeline() {
        let mut f = make_test_graph();
        let stats = OptimizationPipeline::default().run(&mut f).unwrap();

        assert_eq!(stats.passes_run, 4);
        assert_eq!(stats.passes_changed, 4);
        assert!(f.find_nodes::<Negative>().is_empty());
        assert!(f.find_nodes::<Add>().is_empty());

        let muls = f.find_nodes::<Multiply>();
        assert_eq!(muls.len(), 1);
        let scale = f.node(muls[0]).unwrap().input_value(1).unwrap();
        assert_eq!(f.constant_value(scale).unwrap().values(), vec![-6.0]);
        assert_eq!(f.find_nodes::<Constant>().len(), 1);
        assert_eq!(f.node_count(), 5);
    }

    #[test]
    fn test_eliminate_only_pipeline() {
        let mut f = make_test_graph();
        let manager = OptimizationPipeline::eliminate_only().build();
        assert_eq!(manager.pass_names(), vec!["NopElimination"]);

        let stats = OptimizationPipeline::eliminate_only().run(&mut f).unwrap();
        assert_eq!(stats.passes_changed, 1);
        assert_eq!(f.find_nodes::<Negative>().len(), 1);
        assert_eq!(f.find_nodes::<Add>().len(), 1);
    }

    #[test]
    fn test_pipeline_order() {
        let manager = OptimizationPipeline::new().build();
        assert_eq!(
            manager.pass_names(),
            vec![
                "ConvertNegative",
                "ConstantFolding",
                "FuseMultiplyConstants",
                "NopElimination"
            ]
        );
        assert_eq!(
            OptimizationPipeline::fuse_only().build().pass_names(),
            vec!["FuseMultiplyConstants"]
        );
    }
}
