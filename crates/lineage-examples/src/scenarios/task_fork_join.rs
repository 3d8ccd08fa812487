use std::sync::Arc;

use lineage::{DebugInfoGuard, task};

use super::{ModelId, expect_model, operator};

pub async fn run() -> Result<(), String> {
    let mut set = task::JoinSet::new();
    {
        let _model = DebugInfoGuard::new(Arc::new(ModelId("bert-base")));
        for shard in 0..4 {
            set.spawn(async move {
                tokio::task::yield_now().await;
                operator(&format!("attention.shard{shard}"))
            });
        }
        set.spawn_blocking(|| operator("tokenizer"));
    }

    // The guard is gone; tasks captured the stack when they were spawned.
    expect_model("spawner", operator("spawner"), None)?;

    while let Some(joined) = set.join_next().await {
        let seen = joined.map_err(|e| format!("task failed: {e}"))?;
        expect_model("task", seen, Some("bert-base"))?;
    }
    Ok(())
}
