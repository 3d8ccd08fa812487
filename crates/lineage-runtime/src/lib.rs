//! Thread-local debug info for lineage.
//!
//! Outer code tags a scope with a payload through a [`DebugInfoGuard`];
//! anything running below it on the same thread (operators, observers,
//! loggers) reads it back with [`get`] or [`get_as`] without the value being
//! passed down explicitly.
//!
//! Each thread owns one [`DebugInfoStack`]: an immutable, `Arc`-linked list
//! of frames, one payload and one [`DebugInfoKind`] per frame. Work handed to
//! another thread takes a snapshot with [`current`] and installs it there
//! with [`DebugInfoGuard::install`]; [`thread::spawn`] does both.

mod dump;
mod error;
mod guard;
mod info;
mod kind;
mod stack;
pub mod thread;

pub use self::dump::*;
pub use self::error::*;
pub use self::guard::*;
pub use self::info::{DebugInfo, DebugInfoBase};
pub use self::kind::*;
pub use self::stack::{DebugInfoStack, Iter};

use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Innermost payload of `kind` on the calling thread, if any.
pub fn get(kind: DebugInfoKind) -> Option<Arc<dyn DebugInfoBase>> {
    DebugInfoStack::get(kind)
}

/// Innermost payload of type `T` on the calling thread, if any.
///
/// # Panics
///
/// If the innermost frame of `T::KIND` holds a different concrete type.
#[track_caller]
pub fn get_as<T: DebugInfo>() -> Option<Arc<T>> {
    DebugInfoStack::get_as::<T>()
}

/// Snapshot of the calling thread's debug info stack.
pub fn current() -> DebugInfoStack {
    DebugInfoStack::current()
}
