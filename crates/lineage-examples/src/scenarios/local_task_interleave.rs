use std::sync::Arc;

use lineage::{DebugInfoGuard, task};

use super::{ModelId, expect_model, operator};

async fn request(model: &'static str, steps: usize) -> Result<(), String> {
    // Held across awaits: only possible on a LocalSet, where guards never
    // change threads.
    let _model = DebugInfoGuard::new(Arc::new(ModelId(model)));
    for step in 0..steps {
        tokio::task::yield_now().await;
        expect_model(&format!("{model}.step{step}"), operator(model), Some(model))?;
    }
    Ok(())
}

pub async fn run() -> Result<(), String> {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let a = task::spawn_local(request("gpt-small", 3));
            let b = task::spawn_local(request("gpt-large", 3));
            a.await.map_err(|e| format!("gpt-small failed: {e}"))??;
            b.await.map_err(|e| format!("gpt-large failed: {e}"))??;
            Ok::<(), String>(())
        })
        .await
}
