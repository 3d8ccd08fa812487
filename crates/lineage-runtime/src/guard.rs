use std::marker::PhantomData;
use std::sync::Arc;

use crate::{DebugInfo, DebugInfoBase, DebugInfoError, DebugInfoKind, DebugInfoStack};

/// Scope guard that sets debug info for the calling thread.
///
/// A guard either pushes one frame ([`new`](Self::new),
/// [`with_kind`](Self::with_kind)) or replaces the whole stack with a
/// snapshot ([`install`](Self::install)). Dropping it restores exactly the
/// stack that was current before it was built, on every exit path,
/// unwinding included.
///
/// Guards nest: they must be dropped in reverse order of construction, on
/// the thread that built them (guards are `!Send`). Dropping a guard whose
/// frame is no longer on top panics with [`DebugInfoError::OutOfOrder`].
///
/// ```
/// use std::sync::Arc;
/// use lineage_runtime::{DebugInfo, DebugInfoGuard, DebugInfoKind, get_as};
///
/// #[derive(Debug)]
/// struct ModelId(&'static str);
///
/// impl DebugInfo for ModelId {
///     const KIND: DebugInfoKind = DebugInfoKind::ProducerInfo;
/// }
///
/// {
///     let _guard = DebugInfoGuard::new(Arc::new(ModelId("resnet")));
///     assert_eq!(get_as::<ModelId>().map(|id| id.0), Some("resnet"));
/// }
/// assert!(get_as::<ModelId>().is_none());
/// ```
#[must_use = "dropping the guard immediately restores the previous debug info"]
pub struct DebugInfoGuard {
    prev: DebugInfoStack,
    installed: DebugInfoStack,
    /// `Some` for single-frame guards, `None` for whole-stack guards.
    kind: Option<DebugInfoKind>,
    _not_send: PhantomData<*const ()>,
}

impl DebugInfoGuard {
    /// Pushes `info` under its bound kind.
    pub fn new<T: DebugInfo>(info: Arc<T>) -> Self {
        Self::with_kind(T::KIND, info)
    }

    /// Pushes an untyped payload under `kind`.
    pub fn with_kind(kind: DebugInfoKind, info: Arc<dyn DebugInfoBase>) -> Self {
        let prev = DebugInfoStack::current();
        let installed = DebugInfoStack::push(kind, info);
        Self {
            prev,
            installed,
            kind: Some(kind),
            _not_send: PhantomData,
        }
    }

    /// Replaces the calling thread's stack with `stack`, typically a
    /// snapshot captured on another thread before spawning work.
    pub fn install(stack: DebugInfoStack) -> Self {
        let installed = stack.clone();
        let prev = DebugInfoStack::force_current(stack);
        Self {
            prev,
            installed,
            kind: None,
            _not_send: PhantomData,
        }
    }

    /// Kind pushed by this guard, `None` for whole-stack guards.
    pub fn kind(&self) -> Option<DebugInfoKind> {
        self.kind
    }

    fn restore(&mut self) -> Result<(), DebugInfoError> {
        if !DebugInfoStack::current().ptr_eq(&self.installed) {
            return Err(DebugInfoError::OutOfOrder { kind: self.kind });
        }
        match self.kind {
            Some(kind) => DebugInfoStack::pop(kind).map(drop),
            None => {
                drop(DebugInfoStack::force_current(std::mem::take(&mut self.prev)));
                Ok(())
            }
        }
    }
}

impl Drop for DebugInfoGuard {
    fn drop(&mut self) {
        let Err(err) = self.restore() else {
            return;
        };
        if std::thread::panicking() {
            tracing::error!(%err, "debug info guard misused while unwinding, restoring previous stack");
            drop(DebugInfoStack::force_current(std::mem::take(&mut self.prev)));
        } else {
            panic!("{err}");
        }
    }
}

impl std::fmt::Debug for DebugInfoGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugInfoGuard")
            .field("kind", &self.kind)
            .field("depth", &self.installed.depth())
            .finish()
    }
}

/// Runs `f` with `info` pushed on the calling thread's stack.
pub fn with_debug_info<T: DebugInfo, R>(info: Arc<T>, f: impl FnOnce() -> R) -> R {
    let _guard = DebugInfoGuard::new(info);
    f()
}

/// Runs `f` with `stack` installed as the calling thread's stack.
pub fn with_stack<R>(stack: DebugInfoStack, f: impl FnOnce() -> R) -> R {
    let _guard = DebugInfoGuard::install(stack);
    f()
}
