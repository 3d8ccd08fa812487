use std::future::{Future, IntoFuture};
use std::mem::ManuallyDrop;
use std::pin::Pin;
use std::task::{Context, Poll};

use lineage_runtime::DebugInfoStack;

/// Future that runs every poll of `inner` under its own debug info stack.
///
/// Tokio tasks share worker threads and migrate between them, so a plain
/// thread-local would leak one task's frames into the next task polled on
/// the same worker. The wrapper swaps the task's stack in before each poll
/// and swaps the worker's stack back afterwards, keeping whatever the inner
/// future left pushed for its next poll.
///
/// Dropping the wrapper drops `inner` under the task's stack as well, so
/// guards still held by a cancelled or timed-out future restore cleanly.
pub struct WithDebugInfo<F> {
    inner: ManuallyDrop<F>,
    stack: DebugInfoStack,
}

impl<F> WithDebugInfo<F> {
    pub fn new(inner: F, stack: DebugInfoStack) -> Self {
        Self {
            inner: ManuallyDrop::new(inner),
            stack,
        }
    }

    /// Stack the next poll will start from.
    pub fn stack(&self) -> &DebugInfoStack {
        &self.stack
    }
}

impl<F> Future for WithDebugInfo<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: we never move `inner` after pinning `Self`.
        let this = unsafe { self.get_unchecked_mut() };
        let _scope = PollScope::enter(&mut this.stack);
        unsafe { Pin::new_unchecked(&mut *this.inner) }.poll(cx)
    }
}

impl<F> Drop for WithDebugInfo<F> {
    fn drop(&mut self) {
        let _scope = PollScope::enter(&mut self.stack);
        // SAFETY: `inner` is dropped exactly once, here, and never touched
        // again. Dropping in place keeps the pinning guarantee.
        unsafe { ManuallyDrop::drop(&mut self.inner) }
    }
}

/// Installs a task's stack for the duration of one poll. Restores the
/// worker's stack on drop, so a panicking poll leaves the worker clean.
struct PollScope<'a> {
    slot: &'a mut DebugInfoStack,
    worker: DebugInfoStack,
}

impl<'a> PollScope<'a> {
    fn enter(slot: &'a mut DebugInfoStack) -> Self {
        let worker = DebugInfoStack::force_current(std::mem::take(slot));
        Self { slot, worker }
    }
}

impl Drop for PollScope<'_> {
    fn drop(&mut self) {
        let worker = std::mem::take(&mut self.worker);
        *self.slot = DebugInfoStack::force_current(worker);
    }
}

pub trait FutureExt: IntoFuture + Sized {
    /// Runs this future under `stack`.
    fn with_debug_info(self, stack: DebugInfoStack) -> WithDebugInfo<Self::IntoFuture> {
        tracing::trace!(depth = stack.depth(), "binding debug info stack to future");
        WithDebugInfo::new(self.into_future(), stack)
    }

    /// Runs this future under the calling thread's current stack, captured
    /// now rather than at first poll.
    fn with_current_debug_info(self) -> WithDebugInfo<Self::IntoFuture> {
        self.with_debug_info(DebugInfoStack::current())
    }
}

impl<F> FutureExt for F where F: IntoFuture {}
