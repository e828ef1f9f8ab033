//! Method registries handed to several evaluation environments at once.
//!
//! [`SharedRegistry`] freezes a filled [`MethodRegistry`]; clones share it and
//! it dereferences to the registry for inspection. [`SharedMutableRegistry`]
//! keeps registration open for every clone. A registration takes the write
//! lock, so it is never observed half-done by a resolution.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tess_ir::Invoke;

use crate::errors::EvalResult;
use crate::{EvalEnv, Method, MethodRegistry, MethodResolver};

/// A frozen registry. Cloning shares the same methods.
#[derive(Clone)]
pub struct SharedRegistry(Arc<MethodRegistry>);

impl SharedRegistry {
    pub fn new(registry: MethodRegistry) -> Self {
        SharedRegistry(Arc::new(registry))
    }
}

impl std::ops::Deref for SharedRegistry {
    type Target = MethodRegistry;

    fn deref(&self) -> &MethodRegistry {
        &self.0
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRegistry").field(&*self.0).finish()
    }
}

impl MethodResolver for SharedRegistry {
    fn resolve_method(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<Option<Arc<Method>>> {
        self.0.resolve(env, invoke)
    }
}

/// A registry that still accepts methods after it has been handed out.
#[derive(Clone)]
pub struct SharedMutableRegistry(Arc<RwLock<MethodRegistry>>);

impl SharedMutableRegistry {
    pub fn new(registry: MethodRegistry) -> Self {
        SharedMutableRegistry(Arc::new(RwLock::new(registry)))
    }

    /// Read access, e.g. to list overloads. Hold it briefly: registrations
    /// wait for it.
    pub fn read(&self) -> RwLockReadGuard<'_, MethodRegistry> {
        self.0.read()
    }

    /// Register `method`, returning the method it replaces, if any.
    pub fn register(&self, method: Method) -> Option<Arc<Method>> {
        self.0.write().register(method)
    }

    /// Register every method in `methods` under one write lock.
    pub fn extend(&self, methods: impl IntoIterator<Item = Method>) {
        self.0.write().extend(methods);
    }
}

impl fmt::Debug for SharedMutableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedMutableRegistry")
            .field(&*self.0.read())
            .finish()
    }
}

/// The read lock covers the lookup only; a method returned here stays usable
/// after it is replaced. Typing a nested call re-enters the lock, so the read
/// is recursive.
impl MethodResolver for SharedMutableRegistry {
    fn resolve_method(&self, env: &EvalEnv<'_>, invoke: &Invoke) -> EvalResult<Option<Arc<Method>>> {
        self.0.read_recursive().resolve(env, invoke)
    }
}
