pub mod local_task_interleave;
pub mod task_fork_join;
pub mod thread_fork_join;

use lineage::{DebugInfo, DebugInfoKind};

/// Identifies the model a request runs against.
#[derive(Debug)]
pub(crate) struct ModelId(pub &'static str);

impl DebugInfo for ModelId {
    const KIND: DebugInfoKind = DebugInfoKind::ProducerInfo;
}

#[derive(Debug)]
pub(crate) struct ProfilerSettings {
    pub record_shapes: bool,
}

impl DebugInfo for ProfilerSettings {
    const KIND: DebugInfoKind = DebugInfoKind::ProfilerState;
}

/// Stand-in for an operator deep in the call stack: it only learns about
/// the model and profiler through the debug info stack.
pub(crate) fn operator(name: &str) -> Option<&'static str> {
    let model = lineage::get_as::<ModelId>().map(|id| id.0);
    let record_shapes = lineage::get_as::<ProfilerSettings>().is_some_and(|p| p.record_shapes);
    tracing::info!(
        operator = name,
        model = model.unwrap_or("<none>"),
        record_shapes,
        "operator ran"
    );
    model
}

pub(crate) fn expect_model(
    operator_name: &str,
    seen: Option<&'static str>,
    expected: Option<&'static str>,
) -> Result<(), String> {
    if seen == expected {
        Ok(())
    } else {
        Err(format!(
            "{operator_name} saw model {seen:?}, expected {expected:?}"
        ))
    }
}
