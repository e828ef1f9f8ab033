//! Signature-based method registry.
//!
//! Methods are stored by name, with overloads distinguished by their
//! parameter types. Types take part through compatibility: two signatures are
//! the same when their names are equal and each pair of parameter types is
//! mutually assignable. Registering a signature that already exists replaces
//! the earlier method.
//!
//! Case-insensitive lookups go through a lowercase name index. The index is
//! dropped on every registration and rebuilt by the next resolution. It sits
//! behind a lock so resolution through a shared reference stays sound.
//!
//! When several spellings fold to the invoked name, the exact spelling is
//! tried first and the rest follow in the order they were first registered.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tess_ir::{Invoke, ObjectName};
use tess_value::SqlType;

use crate::errors::EvalResult;
use crate::{EvalEnv, Method, MethodInfo, MethodResolver, Reduce};

/// Lowercased full name to the registered spellings of that name.
type NameIndex = FxHashMap<String, SmallVec<[ObjectName; 1]>>;

/// Methods keyed by name and parameter types.
#[derive(Default)]
pub struct MethodRegistry {
    /// Exact name to overloads, in registration order.
    methods: FxHashMap<ObjectName, SmallVec<[Arc<Method>; 2]>>,
    /// Distinct names in first-registration order.
    names: Vec<ObjectName>,
    /// `None` when stale.
    name_index: RwLock<Option<Arc<NameIndex>>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `method`, returning the method it replaces, if any.
    pub fn register(&mut self, method: Method) -> Option<Arc<Method>> {
        *self.name_index.get_mut() = None;

        if !self.methods.contains_key(method.name()) {
            self.names.push(method.name().clone());
        }
        let overloads = self.methods.entry(method.name().clone()).or_default();
        let method = Arc::new(method);
        match overloads
            .iter()
            .position(|existing| same_signature(existing.info(), method.info()))
        {
            Some(index) => {
                tracing::warn!(method = %method.name(), "replacing method with the same signature");
                Some(std::mem::replace(&mut overloads[index], method))
            }
            None => {
                overloads.push(method);
                None
            }
        }
    }

    /// Register every method in `methods`.
    pub fn extend(&mut self, methods: impl IntoIterator<Item = Method>) {
        for method in methods {
            self.register(method);
        }
    }

    /// Number of registered methods, counting each overload.
    pub fn len(&self) -> usize {
        self.methods.values().map(|overloads| overloads.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Overloads registered under exactly `name`.
    pub fn overloads(&self, name: &ObjectName) -> &[Arc<Method>] {
        self.methods
            .get(name)
            .map(|overloads| overloads.as_slice())
            .unwrap_or(&[])
    }

    /// Find the method `invoke` calls.
    ///
    /// The case policy comes from `env`. Argument types are computed
    /// statically; the first overload whose parameters accept them wins.
    /// `Ok(None)` means no method matched.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %invoke.method()))]
    pub fn resolve(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<Option<Arc<Method>>> {
        let candidates: SmallVec<[ObjectName; 1]> = if env.ignore_case() {
            let index = self.name_index();
            let Some(names) = index.get(&invoke.method().full_name().to_ascii_lowercase()) else {
                return Ok(None);
            };
            let mut names = names.clone();
            if let Some(exact) = names.iter().position(|name| name == invoke.method()) {
                names[..=exact].rotate_right(1);
            }
            names
        } else {
            SmallVec::from_elem(invoke.method().clone(), 1)
        };

        let argument_types = invoke
            .arguments()
            .iter()
            .map(|argument| argument.value().get_type(env))
            .collect::<EvalResult<Vec<_>>>()?;

        for name in &candidates {
            if let Some(method) = self
                .overloads(name)
                .iter()
                .find(|method| accepts(method.info(), invoke, &argument_types))
            {
                return Ok(Some(Arc::clone(method)));
            }
        }
        tracing::debug!(?argument_types, "no overload accepts the arguments");
        Ok(None)
    }

    /// The name index, rebuilding it if a registration made it stale.
    fn name_index(&self) -> Arc<NameIndex> {
        if let Some(index) = self.name_index.read().as_ref() {
            return Arc::clone(index);
        }
        let mut slot = self.name_index.write();
        let index = slot.get_or_insert_with(|| {
            let mut index = NameIndex::default();
            for name in &self.names {
                index
                    .entry(name.full_name().to_ascii_lowercase())
                    .or_default()
                    .push(name.clone());
            }
            Arc::new(index)
        });
        Arc::clone(index)
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.len())
            .finish_non_exhaustive()
    }
}

impl MethodResolver for MethodRegistry {
    fn resolve_method(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<Option<Arc<Method>>> {
        self.resolve(env, invoke)
    }
}

/// Same name and pairwise compatible parameter types.
fn same_signature(a: &MethodInfo, b: &MethodInfo) -> bool {
    a.name() == b.name()
        && a.parameters().len() == b.parameters().len()
        && a
            .parameter_types()
            .zip(b.parameter_types())
            .all(|(x, y)| x.is_compatible_with(y))
}

/// Whether `info` can be called with `invoke`, whose argument types are
/// `argument_types`.
fn accepts(info: &MethodInfo, invoke: &Invoke, argument_types: &[SqlType]) -> bool {
    if !invoke.is_named() {
        return info.parameters().len() == argument_types.len()
            && info
                .parameter_types()
                .zip(argument_types)
                .all(|(param, arg)| param.is_compatible_with(arg));
    }

    let all_targeted = invoke
        .arguments()
        .iter()
        .zip(argument_types)
        .all(|(argument, arg_type)| {
            argument
                .name()
                .and_then(|name| info.parameter(name))
                .is_some_and(|param| param.param_type.is_compatible_with(arg_type))
        });
    let omitted_have_defaults = info.parameters().iter().all(|param| {
        param.default.is_some()
            || !param.direction.is_input()
            || invoke
                .arguments()
                .iter()
                .any(|argument| argument.name().is_some_and(|name| param.is_named(name)))
    });
    all_targeted && omitted_have_defaults
}
