//! Tessera Eval - reduction and method execution for the expression kernel.
//!
//! This crate turns `tess_ir` expression trees into values and runs the
//! methods they call.
//!
//! # Architecture
//!
//! - `Reduce`: recursive, three-valued reduction of an `Expression` to a
//!   constant, plus static typing (`get_type`)
//! - `EvalEnv`: the typed evaluation environment. Capabilities (references,
//!   variables, methods, the current group, authorization) are injected
//!   explicitly through `EvalEnvBuilder`
//! - `Method` / `MethodInfo`: declared methods and their execution,
//!   including argument binding through `MethodContext`
//! - `AggregateFunction`: the seed / iterate / merge protocol driven once per
//!   GROUP BY group
//! - `MethodRegistry`: signature-based storage and overload resolution
//! - `system`: the built-in aggregates and scalar functions
//! - `memory`: in-memory implementations of every capability
//!
//! Reduction is synchronous. Cancellation and deadlines are observed at
//! checkpoints before every method execution and on every aggregate row.

mod env;
pub mod errors;
mod interrupt;
pub mod memory;
mod method;
mod options;
mod reduce;
mod registry;
mod resolvers;
mod shared;
mod stack;
pub mod system;
mod tracing_setup;

pub use env::{DepthGuard, EvalEnv, EvalEnvBuilder};
pub use errors::{Capability, ErrorCategory, EvalError, EvalErrorKind, EvalResult};
pub use interrupt::Interrupt;
pub use method::{
    AggregateFunction, Direction, Method, MethodContext, MethodInfo, MethodInfoBuilder,
    MethodKind, MethodResult, Parameter, RoutineFn, Seed,
};
pub use options::{EvalOptions, UndeclaredAssignment};
pub use reduce::Reduce;
pub use registry::MethodRegistry;
pub use resolvers::{
    Authorizer, GroupResolver, MethodResolver, ReferenceResolver, Variable, VariableResolver,
};
pub use shared::{SharedMutableRegistry, SharedRegistry};
pub use stack::with_stack_headroom;
pub use tracing_setup::init_tracing;
