//! Task spawning that carries debug info, mirroring [`tokio::task`].
//!
//! Every function here captures the spawning thread's stack at call time.
//! Frames the spawned work pushes stay local to it.
//!
//! | Item | Tokio equivalent |
//! |---|---|
//! | [`spawn`] | `tokio::task::spawn` |
//! | [`spawn_local`] | `tokio::task::spawn_local` |
//! | [`spawn_blocking`] | `tokio::task::spawn_blocking` |
//! | [`JoinSet`] | `tokio::task::JoinSet` |

use std::fmt;
use std::future::Future;

use lineage_runtime::thread::inherit;
use tokio::task::{JoinError, JoinHandle};

use crate::FutureExt;

/// Spawns `future` on the current runtime, inheriting the caller's stack.
#[track_caller]
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future.with_current_debug_info())
}

/// Spawns a `!Send` future on the current `LocalSet`, inheriting the
/// caller's stack. Guards may be held across `.await` in such futures.
#[track_caller]
pub fn spawn_local<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    tokio::task::spawn_local(future.with_current_debug_info())
}

/// Runs `f` on the blocking pool, inheriting the caller's stack.
#[track_caller]
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(inherit(f))
}

/// [`tokio::task::JoinSet`] whose tasks inherit the stack current at each
/// [`spawn`](JoinSet::spawn) call.
pub struct JoinSet<T> {
    inner: tokio::task::JoinSet<T>,
}

impl<T> JoinSet<T>
where
    T: Send + 'static,
{
    /// Creates an empty set, matching [`tokio::task::JoinSet::new`].
    pub fn new() -> Self {
        Self {
            inner: tokio::task::JoinSet::new(),
        }
    }

    /// Spawns a future into the set, matching [`tokio::task::JoinSet::spawn`].
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.inner.spawn(future.with_current_debug_info());
    }

    /// Runs `f` on the blocking pool as part of the set, matching
    /// [`tokio::task::JoinSet::spawn_blocking`].
    pub fn spawn_blocking<F>(&mut self, f: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.inner.spawn_blocking(inherit(f));
    }

    /// Returns whether the set is empty, matching [`tokio::task::JoinSet::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of tasks in the set, like [`tokio::task::JoinSet::len`].
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Aborts every task in the set, matching [`tokio::task::JoinSet::abort_all`].
    pub fn abort_all(&mut self) {
        self.inner.abort_all();
    }

    /// Waits for one task to complete, matching [`tokio::task::JoinSet::join_next`].
    pub fn join_next(&mut self) -> impl Future<Output = Option<Result<T, JoinError>>> + '_ {
        self.inner.join_next()
    }
}

impl<T> Default for JoinSet<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JoinSet<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinSet")
            .field("len", &self.len())
            .field("is_empty", &self.is_empty())
            .finish()
    }
}
