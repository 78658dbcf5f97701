//! Concurrent use of a shared renderer.

use anyhow::Result;
use manifest_render::cache::CacheOptions;
use manifest_render::core::RenderContext;
use manifest_render::renderer::{RendererOptions, TemplateRenderer};
use manifest_render::source::{MemoryCollection, Source};
use manifest_render::test_utils::{CountingCollection, init_test_logging};
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::common::{config_map, names, vals};

const THREADS: usize = 16;

#[test]
fn test_concurrent_first_calls_compile_once() -> Result<()> {
    init_test_logging(None);
    let counting = Arc::new(CountingCollection::new(
        MemoryCollection::new()
            .with_file("a.yaml", config_map("{{ prefix }}-a"))
            .with_file("b.yaml", config_map("{{ prefix }}-b")),
    ));
    let renderer = Arc::new(TemplateRenderer::new(
        vec![Source::from_shared(counting.clone(), "*.yaml")],
        RendererOptions::new(),
    )?);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let renderer = Arc::clone(&renderer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                renderer.process(&RenderContext::new(), &vals(json!({"prefix": format!("t{i}")})))
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let objects = handle.join().expect("render thread panicked")?;
        assert_eq!(names(&objects), [format!("t{i}-a"), format!("t{i}-b")]);
    }

    assert_eq!(counting.list_calls(), 1);
    assert_eq!(counting.read_calls(), 2);
    Ok(())
}

#[test]
fn test_concurrent_renders_with_cache() -> Result<()> {
    let renderer = Arc::new(TemplateRenderer::new(
        vec![Source::new(MemoryCollection::new().with_file("cm.yaml", config_map("n-{{ n }}")), "*.yaml")],
        RendererOptions::new().with_cache(CacheOptions::with_ttl(Duration::from_secs(60))),
    )?);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let renderer = Arc::clone(&renderer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Four distinct value sets, each requested by several threads.
                let n = i % 4;
                let objects = renderer.process(&RenderContext::new(), &vals(json!({"n": n})))?;
                Ok::<_, manifest_render::RenderError>((n, objects))
            })
        })
        .collect();

    for handle in handles {
        let (n, mut objects) = handle.join().expect("render thread panicked")?;
        assert_eq!(names(&objects), [format!("n-{n}")]);
        objects[0].set_label("mine", "yes");
    }

    let again = renderer.process(&RenderContext::new(), &vals(json!({"n": 0})))?;
    assert_eq!(again[0].label("mine"), None);
    Ok(())
}

#[test]
fn test_cancel_from_another_thread() -> Result<()> {
    let renderer = TemplateRenderer::new(
        vec![
            Source::new(MemoryCollection::new().with_file("a.yaml", config_map("a")), "*.yaml"),
            Source::new(MemoryCollection::new().with_file("b.yaml", config_map("b")), "*.yaml"),
        ],
        RendererOptions::new(),
    )?;

    let ctx = RenderContext::new();
    let remote = ctx.clone();
    thread::spawn(move || remote.cancel()).join().expect("cancel thread panicked");

    assert!(renderer.process(&ctx, &Default::default()).is_err());
    Ok(())
}
