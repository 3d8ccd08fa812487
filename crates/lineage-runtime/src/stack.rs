//! The per-thread debug info stack.
//!
//! Frames form a persistent singly-linked list. A frame is never mutated
//! after it is built; pushing and popping only move the thread's "current
//! top" pointer. Taking a snapshot is cloning one `Arc`, and the frames it
//! reaches may be read from any number of threads at once.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::info::{downcast_payload, payload_type_name};
use crate::{DebugInfo, DebugInfoBase, DebugInfoError, DebugInfoKind};

struct Frame {
    info: Arc<dyn DebugInfoBase>,
    kind: DebugInfoKind,
    parent: Option<Arc<Frame>>,
}

thread_local! {
    static CURRENT: RefCell<DebugInfoStack> = const { RefCell::new(DebugInfoStack::EMPTY) };
}

/// Handle to the top of a debug info stack.
///
/// The handle returned by [`DebugInfoStack::current`] is a snapshot: later
/// pushes on the originating thread do not affect it, and it can be sent to
/// another thread and installed there with [`DebugInfoGuard::install`].
///
/// [`DebugInfoGuard::install`]: crate::DebugInfoGuard::install
#[derive(Clone, Default)]
pub struct DebugInfoStack {
    top: Option<Arc<Frame>>,
}

// ── Current-thread operations ────────────────────────────

impl DebugInfoStack {
    pub const EMPTY: Self = Self { top: None };

    /// Returns the innermost payload of `kind` on the calling thread's stack.
    ///
    /// Absence is the normal case when nothing set a context. Returns `None`
    /// during thread-local teardown as well.
    pub fn get(kind: DebugInfoKind) -> Option<Arc<dyn DebugInfoBase>> {
        CURRENT
            .try_with(|current| current.borrow().lookup(kind))
            .ok()
            .flatten()
    }

    /// Typed [`get`](Self::get) for payloads bound to a kind via [`DebugInfo`].
    ///
    /// # Panics
    ///
    /// If the innermost frame of `T::KIND` holds a different concrete type.
    #[track_caller]
    pub fn get_as<T: DebugInfo>() -> Option<Arc<T>> {
        match Self::try_get_as::<T>() {
            Ok(info) => info,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_get_as<T: DebugInfo>() -> Result<Option<Arc<T>>, DebugInfoError> {
        CURRENT
            .try_with(|current| current.borrow().try_lookup_as::<T>())
            .unwrap_or(Ok(None))
    }

    /// Snapshot of the calling thread's stack. O(1).
    ///
    /// Empty during thread-local teardown.
    pub fn current() -> Self {
        CURRENT
            .try_with(|current| current.borrow().clone())
            .unwrap_or_default()
    }

    /// Replaces the calling thread's stack and returns the displaced one.
    ///
    /// Low-level: prefer [`DebugInfoGuard::install`], which restores the
    /// previous stack when it goes out of scope.
    ///
    /// [`DebugInfoGuard::install`]: crate::DebugInfoGuard::install
    ///
    /// # Panics
    ///
    /// If called while the thread-local is being torn down.
    pub fn force_current(stack: Self) -> Self {
        tracing::trace!(depth = stack.depth(), "installing debug info stack");
        CURRENT.with(|current| current.replace(stack))
    }

    /// Pushes a frame on the calling thread's stack and returns the new top.
    ///
    /// Low-level: prefer [`DebugInfoGuard::with_kind`], which pops on drop.
    ///
    /// [`DebugInfoGuard::with_kind`]: crate::DebugInfoGuard::with_kind
    ///
    /// # Panics
    ///
    /// If called while the thread-local is being torn down.
    pub fn push(kind: DebugInfoKind, info: Arc<dyn DebugInfoBase>) -> Self {
        let pushed = CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            let parent = current.top.take();
            current.top = Some(Arc::new(Frame { info, kind, parent }));
            current.clone()
        });
        tracing::trace!(%kind, depth = pushed.depth(), "pushed debug info");
        pushed
    }

    /// Pops the top frame of the calling thread's stack, which must be of
    /// `kind`. On error the stack is left untouched.
    ///
    /// # Panics
    ///
    /// If called while the thread-local is being torn down.
    pub fn pop(kind: DebugInfoKind) -> Result<Arc<dyn DebugInfoBase>, DebugInfoError> {
        // The popped frame is released after the borrow ends: dropping a
        // payload may run code that reads the stack.
        let popped = CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            match current.top.take() {
                None => Err(DebugInfoError::EmptyStack { expected: kind }),
                Some(top) if top.kind != kind => {
                    let found = top.kind;
                    current.top = Some(top);
                    Err(DebugInfoError::MismatchedKind {
                        expected: kind,
                        found,
                    })
                }
                Some(top) => {
                    current.top = top.parent.clone();
                    Ok(top)
                }
            }
        })?;
        tracing::trace!(%kind, "popped debug info");
        Ok(Arc::clone(&popped.info))
    }
}

// ── Snapshot inspection ──────────────────────────────────

impl DebugInfoStack {
    /// Innermost payload of `kind` in this snapshot.
    pub fn lookup(&self, kind: DebugInfoKind) -> Option<Arc<dyn DebugInfoBase>> {
        self.iter()
            .find(|(frame_kind, _)| *frame_kind == kind)
            .map(|(_, info)| Arc::clone(info))
    }

    /// # Panics
    ///
    /// If the innermost frame of `T::KIND` holds a different concrete type.
    #[track_caller]
    pub fn lookup_as<T: DebugInfo>(&self) -> Option<Arc<T>> {
        match self.try_lookup_as::<T>() {
            Ok(info) => info,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_lookup_as<T: DebugInfo>(&self) -> Result<Option<Arc<T>>, DebugInfoError> {
        let Some(info) = self.lookup(T::KIND) else {
            return Ok(None);
        };
        match downcast_payload::<T>(&info) {
            Some(typed) => Ok(Some(typed)),
            None => Err(DebugInfoError::PayloadType {
                kind: T::KIND,
                expected: std::any::type_name::<T>(),
                found: payload_type_name(&info),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of frames, shadowed ones included.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Frames from top to bottom.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.top.as_deref(),
        }
    }

    /// Whether both handles designate the same top frame.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.top, &other.top) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for DebugInfoStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a DebugInfoStack {
    type Item = (DebugInfoKind, &'a Arc<dyn DebugInfoBase>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the frames of a [`DebugInfoStack`], innermost first.
pub struct Iter<'a> {
    next: Option<&'a Frame>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (DebugInfoKind, &'a Arc<dyn DebugInfoBase>);

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.parent.as_deref();
        Some((frame.kind, &frame.info))
    }
}
