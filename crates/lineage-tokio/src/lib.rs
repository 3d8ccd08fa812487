//! Tokio integration for lineage debug info.
//!
//! Tasks spawned through [`task`] start from the spawner's debug info stack,
//! and each task keeps its own stack across polls and worker migrations.

mod future;
pub mod task;

pub use self::future::*;
