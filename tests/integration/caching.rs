//! Render cache behavior.

use anyhow::Result;
use manifest_render::cache::{TtlCache, path_key_fn};
use manifest_render::core::RenderContext;
use manifest_render::pipeline::SetLabels;
use manifest_render::renderer::{RendererOptions, TemplateRenderer};
use manifest_render::source::{MemoryCollection, Source};
use manifest_render::test_utils::CountingCollection;
use manifest_render::values::values;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{config_map, names, vals};

fn renderer_with(cache: Arc<TtlCache>, ttl: Duration) -> Result<TemplateRenderer> {
    let files = MemoryCollection::new().with_file("cm.yaml", config_map("{{ name }}"));
    let source = Source::new(files, "*.yaml").with_values(values(vals(json!({"name": "base"}))));
    Ok(TemplateRenderer::new(
        vec![source],
        RendererOptions::new().with_cache_instance(cache, ttl),
    )?)
}

#[test]
fn test_repeated_render_is_idempotent() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer = renderer_with(cache.clone(), Duration::from_secs(60))?;
    let input = vals(json!({"name": "web"}));

    let first = renderer.process(&RenderContext::new(), &input)?;
    let second = renderer.process(&RenderContext::new(), &input)?;

    assert_eq!(first, second);
    assert_eq!(cache.stats(), (1, 1));
    assert!(cache.hit_rate() > 49.0);
    Ok(())
}

#[test]
fn test_mutating_results_does_not_leak() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer = renderer_with(cache, Duration::from_secs(60))?;
    let input = vals(json!({"name": "web"}));

    let mut first = renderer.process(&RenderContext::new(), &input)?;
    first[0].set_label("tampered", "yes");
    first[0].set_namespace("elsewhere");

    let second = renderer.process(&RenderContext::new(), &input)?;
    assert_eq!(second[0].label("tampered"), None);
    assert_eq!(second[0].namespace(), None);
    Ok(())
}

#[test]
fn test_default_key_separates_values() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer = renderer_with(cache.clone(), Duration::from_secs(60))?;

    let a = renderer.process(&RenderContext::new(), &vals(json!({"name": "a"})))?;
    let b = renderer.process(&RenderContext::new(), &vals(json!({"name": "b"})))?;

    assert_eq!(names(&a), ["a"]);
    assert_eq!(names(&b), ["b"]);
    assert_eq!(cache.len(), 2);
    Ok(())
}

#[test]
fn test_default_key_ignores_mapping_order() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer = renderer_with(cache.clone(), Duration::from_secs(60))?;

    let forward: manifest_render::Values =
        serde_json::from_str(r#"{"name": "a", "extra": {"x": 1, "y": 2}}"#)?;
    let reverse: manifest_render::Values =
        serde_json::from_str(r#"{"extra": {"y": 2, "x": 1}, "name": "a"}"#)?;

    renderer.process(&RenderContext::new(), &forward)?;
    renderer.process(&RenderContext::new(), &reverse)?;
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().0, 1);
    Ok(())
}

#[test]
fn test_path_key_shares_one_slot() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let files = MemoryCollection::new().with_file("cm.yaml", config_map("{{ name }}"));
    let renderer = TemplateRenderer::new(
        vec![Source::new(files, "*.yaml")],
        RendererOptions::new()
            .with_cache_instance(cache.clone(), Duration::from_secs(60))
            .with_key_fn(path_key_fn()),
    )?;

    renderer.process(&RenderContext::new(), &vals(json!({"name": "a"})))?;
    let second = renderer.process(&RenderContext::new(), &vals(json!({"name": "b"})))?;

    assert_eq!(cache.len(), 1);
    assert_eq!(names(&second), ["a"]);
    assert!(cache.keys()[0].ends_with("/0/path:*.yaml"), "got: {:?}", cache.keys());
    Ok(())
}

#[test]
fn test_expired_entries_are_re_rendered() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer = renderer_with(cache.clone(), Duration::ZERO)?;
    let input = vals(json!({"name": "web"}));

    renderer.process(&RenderContext::new(), &input)?;
    renderer.process(&RenderContext::new(), &input)?;
    assert_eq!(cache.stats(), (0, 2));
    Ok(())
}

#[test]
fn test_shared_cache_keeps_renderers_apart() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let counting = Arc::new(CountingCollection::new(
        MemoryCollection::new().with_file("cm.yaml", config_map("cm")),
    ));
    let shared = |options: RendererOptions| {
        TemplateRenderer::new(
            vec![Source::from_shared(counting.clone(), "*.yaml")],
            options.with_cache_instance(cache.clone(), Duration::from_secs(60)),
        )
    };

    let plain = shared(RendererOptions::new())?;
    let annotated = shared(RendererOptions::new().with_source_annotations(true))?;
    let labelled = shared(RendererOptions::new().with_transformer(SetLabels::new([("env", "prod")])))?;

    let first = plain.process(&RenderContext::new(), &Default::default())?;
    let second = annotated.process(&RenderContext::new(), &Default::default())?;
    let third = labelled.process(&RenderContext::new(), &Default::default())?;

    assert!(first[0].annotations().is_none());
    assert_eq!(second[0].annotation("manifest-render.io/source-file"), Some("cm.yaml"));
    assert!(third[0].annotations().is_none());
    assert_eq!(third[0].label("env"), Some("prod"));
    assert_eq!(first[0].label("env"), None);
    assert_eq!(cache.len(), 3);
    assert_eq!(counting.list_calls(), 3);

    // Each renderer still hits its own entry.
    let again = annotated.process(&RenderContext::new(), &Default::default())?;
    assert_eq!(again, second);
    assert_eq!(counting.list_calls(), 3);
    Ok(())
}

#[test]
fn test_shared_cache_keeps_collections_apart() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let renderer_for = |name: &str| {
        TemplateRenderer::new(
            vec![Source::new(MemoryCollection::new().with_file("cm.yaml", config_map(name)), "*.yaml")],
            RendererOptions::new()
                .with_cache_instance(cache.clone(), Duration::from_secs(60))
                .with_key_fn(path_key_fn()),
        )
    };
    let team_a = renderer_for("team-a")?;
    let team_b = renderer_for("team-b")?;

    assert_eq!(names(&team_a.process(&RenderContext::new(), &Default::default())?), ["team-a"]);
    assert_eq!(names(&team_b.process(&RenderContext::new(), &Default::default())?), ["team-b"]);
    assert_eq!(names(&team_a.process(&RenderContext::new(), &Default::default())?), ["team-a"]);
    assert_eq!(cache.len(), 2);
    Ok(())
}

#[test]
fn test_same_selector_in_one_renderer() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let base = MemoryCollection::new().with_file("cm.yaml", config_map("base-{{ env }}"));
    let overlay = MemoryCollection::new().with_file("cm.yaml", config_map("overlay-{{ env }}"));
    let renderer = TemplateRenderer::new(
        vec![Source::new(base, "*.yaml"), Source::new(overlay, "*.yaml")],
        RendererOptions::new().with_cache_instance(cache.clone(), Duration::from_secs(60)),
    )?;

    let input = vals(json!({"env": "prod"}));
    let first = renderer.process(&RenderContext::new(), &input)?;
    let second = renderer.process(&RenderContext::new(), &input)?;

    assert_eq!(names(&first), ["base-prod", "overlay-prod"]);
    assert_eq!(first, second);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats(), (2, 2));
    Ok(())
}
