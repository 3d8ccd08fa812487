//! `std::thread` spawning that carries the caller's debug info.

use std::io;
use std::thread::{Builder, JoinHandle};

use crate::{DebugInfoGuard, DebugInfoStack};

/// Like [`std::thread::spawn`], with the new thread starting from the
/// caller's debug info stack.
pub fn spawn<F, T>(f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(inherit(f))
}

/// Named variant of [`spawn`], built through [`std::thread::Builder`].
pub fn spawn_named<F, T>(name: impl Into<String>, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Builder::new().name(name.into()).spawn(inherit(f))
}

/// Wraps `f` so that it runs under the debug info stack current at the
/// time `inherit` is called.
pub fn inherit<F, T>(f: F) -> impl FnOnce() -> T + Send + 'static
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let stack = DebugInfoStack::current();
    tracing::trace!(depth = stack.depth(), "handing debug info stack to new thread of work");
    move || {
        let _guard = DebugInfoGuard::install(stack);
        f()
    }
}
