//! The evaluation environment threaded through reduction and execution.
//!
//! `EvalEnv` carries borrowed capabilities, the active options, and the
//! cancellation state. It is built once per evaluation through
//! [`EvalEnvBuilder`] and passed by shared reference; every capability is
//! optional, and reduction fails with `NoResolver` when a node needs one that
//! is absent.
//!
//! # Usage
//!
//! ```text
//! let env = EvalEnv::builder()
//!     .references(&row)
//!     .methods(&registry)
//!     .authorizer(&AllowAll)
//!     .options(EvalOptions::default().with_max_depth(256))
//!     .build();
//! let value = expr.reduce_to_constant(&env)?;
//! ```

use std::cell::Cell;
use std::fmt;
use std::time::Instant;

use crate::errors::{cancelled, deadline_exceeded, depth_exceeded, no_resolver, Capability};
use crate::{
    Authorizer, EvalOptions, EvalResult, GroupResolver, Interrupt, MethodResolver,
    ReferenceResolver, VariableResolver,
};

/// Capabilities and policy for one evaluation.
pub struct EvalEnv<'a> {
    references: Option<&'a dyn ReferenceResolver>,
    variables: Option<&'a dyn VariableResolver>,
    methods: Option<&'a dyn MethodResolver>,
    group: Option<&'a dyn GroupResolver>,
    authorizer: Option<&'a dyn Authorizer>,
    options: EvalOptions,
    interrupt: Option<Interrupt>,
    deadline: Option<Instant>,
    /// Current reduction nesting depth.
    depth: Cell<usize>,
}

impl<'a> EvalEnv<'a> {
    pub fn builder() -> EvalEnvBuilder<'a> {
        EvalEnvBuilder::new()
    }

    /// An environment with no capabilities and default options.
    ///
    /// Enough for trees of constants, operators, casts and conditions.
    pub fn empty() -> Self {
        EvalEnvBuilder::new().build()
    }

    #[inline]
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    #[inline]
    pub fn ignore_case(&self) -> bool {
        self.options.ignore_case
    }

    pub fn references(&self) -> Option<&'a dyn ReferenceResolver> {
        self.references
    }

    pub fn variables(&self) -> Option<&'a dyn VariableResolver> {
        self.variables
    }

    pub fn methods(&self) -> Option<&'a dyn MethodResolver> {
        self.methods
    }

    pub fn group(&self) -> Option<&'a dyn GroupResolver> {
        self.group
    }

    pub fn authorizer(&self) -> Option<&'a dyn Authorizer> {
        self.authorizer
    }

    /// The reference resolver, or a `NoResolver` error.
    pub fn require_references(&self) -> EvalResult<&'a dyn ReferenceResolver> {
        self.references
            .ok_or_else(|| no_resolver(Capability::References))
    }

    pub fn require_variables(&self) -> EvalResult<&'a dyn VariableResolver> {
        self.variables.ok_or_else(|| no_resolver(Capability::Variables))
    }

    pub fn require_methods(&self) -> EvalResult<&'a dyn MethodResolver> {
        self.methods.ok_or_else(|| no_resolver(Capability::Methods))
    }

    pub fn require_group(&self) -> EvalResult<&'a dyn GroupResolver> {
        self.group.ok_or_else(|| no_resolver(Capability::Group))
    }

    pub fn require_authorizer(&self) -> EvalResult<&'a dyn Authorizer> {
        self.authorizer
            .ok_or_else(|| no_resolver(Capability::Authorization))
    }

    /// Fail if evaluation was cancelled or ran past its deadline.
    #[inline]
    pub fn checkpoint(&self) -> EvalResult<()> {
        if self.interrupt.as_ref().is_some_and(Interrupt::is_triggered) {
            return Err(cancelled());
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(deadline_exceeded());
        }
        Ok(())
    }

    /// Enter one level of reduction nesting.
    ///
    /// The returned guard restores the depth when dropped.
    pub fn enter(&self) -> EvalResult<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(depth_exceeded(limit));
            }
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// A child environment for evaluating one row of a group.
    ///
    /// References resolve against `row`; the group capability is removed so a
    /// nested aggregate cannot see the outer group. Everything else, including
    /// the current depth, is inherited.
    pub fn for_row<'b>(&'b self, row: &'b dyn ReferenceResolver) -> EvalEnv<'b> {
        EvalEnv {
            references: Some(row),
            variables: self.variables,
            methods: self.methods,
            group: None,
            authorizer: self.authorizer,
            options: self.options,
            interrupt: self.interrupt.clone(),
            deadline: self.deadline,
            depth: Cell::new(self.depth.get()),
        }
    }
}

impl fmt::Debug for EvalEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalEnv")
            .field("references", &self.references.is_some())
            .field("variables", &self.variables.is_some())
            .field("methods", &self.methods.is_some())
            .field("group", &self.group.is_some())
            .field("authorizer", &self.authorizer.is_some())
            .field("options", &self.options)
            .field("depth", &self.depth.get())
            .finish_non_exhaustive()
    }
}

/// RAII guard returned by [`EvalEnv::enter`].
pub struct DepthGuard<'env> {
    depth: &'env Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Builder for [`EvalEnv`].
#[derive(Default)]
pub struct EvalEnvBuilder<'a> {
    references: Option<&'a dyn ReferenceResolver>,
    variables: Option<&'a dyn VariableResolver>,
    methods: Option<&'a dyn MethodResolver>,
    group: Option<&'a dyn GroupResolver>,
    authorizer: Option<&'a dyn Authorizer>,
    options: EvalOptions,
    interrupt: Option<Interrupt>,
}

impl<'a> EvalEnvBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn references(mut self, resolver: &'a dyn ReferenceResolver) -> Self {
        self.references = Some(resolver);
        self
    }

    #[must_use]
    pub fn variables(mut self, resolver: &'a dyn VariableResolver) -> Self {
        self.variables = Some(resolver);
        self
    }

    #[must_use]
    pub fn methods(mut self, resolver: &'a dyn MethodResolver) -> Self {
        self.methods = Some(resolver);
        self
    }

    /// Set the group for aggregate evaluation.
    #[must_use]
    pub fn group(mut self, resolver: &'a dyn GroupResolver) -> Self {
        self.group = Some(resolver);
        self
    }

    #[must_use]
    pub fn authorizer(mut self, authorizer: &'a dyn Authorizer) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    #[must_use]
    pub fn options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Build the environment. The deadline starts counting now.
    pub fn build(self) -> EvalEnv<'a> {
        let deadline = self
            .options
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        EvalEnv {
            references: self.references,
            variables: self.variables,
            methods: self.methods,
            group: self.group,
            authorizer: self.authorizer,
            options: self.options,
            interrupt: self.interrupt,
            deadline,
            depth: Cell::new(0),
        }
    }
}
