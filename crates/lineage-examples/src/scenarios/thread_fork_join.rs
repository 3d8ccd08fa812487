use std::sync::Arc;

use lineage::{DebugInfoGuard, thread};

use super::{ModelId, ProfilerSettings, expect_model, operator};

pub fn run() -> Result<(), String> {
    let _model = DebugInfoGuard::new(Arc::new(ModelId("resnet50")));
    let _profiler = DebugInfoGuard::new(Arc::new(ProfilerSettings {
        record_shapes: true,
    }));

    let workers: Vec<_> = ["conv", "relu", "pool"]
        .into_iter()
        .map(|name| {
            thread::spawn_named(format!("fork.{name}"), move || {
                let inherited = operator(name);
                // A nested model override inside the fork stays inside it.
                let _override = DebugInfoGuard::new(Arc::new(ModelId("resnet50.quantized")));
                let overridden = operator(name);
                (name, inherited, overridden)
            })
            .map_err(|e| format!("failed to spawn fork.{name}: {e}"))
        })
        .collect::<Result<_, _>>()?;

    for worker in workers {
        let (name, inherited, overridden) = worker
            .join()
            .map_err(|_| "fork worker panicked".to_owned())?;
        expect_model(name, inherited, Some("resnet50"))?;
        expect_model(name, overridden, Some("resnet50.quantized"))?;
    }

    expect_model("join", operator("join"), Some("resnet50"))?;

    let dump = lineage::current()
        .dump()
        .to_json()
        .map_err(|e| format!("failed to render stack dump: {e}"))?;
    println!("{dump}");
    Ok(())
}
