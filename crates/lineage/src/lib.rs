//! Debug info that follows a unit of work.
//!
//! Lineage lets code high up a call stack attach contextual records (a model
//! id, runtime flags, profiler state) that code far below it reads back,
//! without passing them through every signature. Records follow the work
//! when it forks onto other threads or Tokio tasks.
//!
//! ```rust
//! use std::sync::Arc;
//! use lineage::{DebugInfo, DebugInfoGuard, DebugInfoKind};
//!
//! #[derive(Debug)]
//! struct ModelId(u64);
//!
//! impl DebugInfo for ModelId {
//!     const KIND: DebugInfoKind = DebugInfoKind::ProducerInfo;
//! }
//!
//! fn operator() -> Option<u64> {
//!     lineage::get_as::<ModelId>().map(|id| id.0)
//! }
//!
//! let _guard = DebugInfoGuard::new(Arc::new(ModelId(42)));
//! assert_eq!(operator(), Some(42));
//! let forked = lineage::thread::spawn(operator).join().unwrap();
//! assert_eq!(forked, Some(42));
//! ```
//!
//! # Cargo features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `tokio` *(default)* | [`task`] spawning and [`FutureExt`] for Tokio tasks. |
//!
//! Without `tokio`, only thread-based propagation is available.

pub use lineage_runtime::*;

#[cfg(feature = "tokio")]
pub use lineage_tokio::{FutureExt, WithDebugInfo, task};
