use std::error::Error;
use std::fmt;

use crate::DebugInfoKind;

/// Misuse of the debug info stack. Every variant is a programming error at
/// the call site, never a transient condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugInfoError {
    /// `pop` asked for a kind that is not on top.
    MismatchedKind {
        expected: DebugInfoKind,
        found: DebugInfoKind,
    },
    /// `pop` on an empty stack.
    EmptyStack { expected: DebugInfoKind },
    /// A guard was dropped while something it did not install was current.
    /// `kind` is `None` for whole-stack guards.
    OutOfOrder { kind: Option<DebugInfoKind> },
    /// Typed lookup found a frame of the right kind holding another type.
    PayloadType {
        kind: DebugInfoKind,
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for DebugInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedKind { expected, found } => write!(
                f,
                "expected debug info of kind {expected} on top of the stack, found {found}"
            ),
            Self::EmptyStack { expected } => {
                write!(f, "expected debug info of kind {expected}, but the stack is empty")
            }
            Self::OutOfOrder { kind: Some(kind) } => write!(
                f,
                "debug info guard for {kind} dropped out of LIFO order: its frame is no longer on top"
            ),
            Self::OutOfOrder { kind: None } => write!(
                f,
                "whole-stack debug info guard dropped out of LIFO order: the stack it installed is no longer current"
            ),
            Self::PayloadType {
                kind,
                expected,
                found,
            } => write!(
                f,
                "debug info of kind {kind} holds `{found}`, but `{expected}` was requested"
            ),
        }
    }
}

impl Error for DebugInfoError {}
