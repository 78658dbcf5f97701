//! Rendering behavior through the public API.

use anyhow::Result;
use manifest_render::cache::TtlCache;
use manifest_render::core::{RenderContext, RenderError};
use manifest_render::pipeline::{KindFilter, SetLabels};
use manifest_render::renderer::{RendererOptions, TemplateRenderer};
use manifest_render::source::{DirCollection, MemoryCollection, Source};
use manifest_render::test_utils::init_test_logging;
use manifest_render::values::{Values, values};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use crate::common::{config_map, names, vals, write_file};

#[test]
fn test_render_directory_tree() -> Result<()> {
    init_test_logging(None);
    let dir = TempDir::new()?;
    write_file(dir.path(), "app/deploy.yaml", &config_map("{{ app }}-deploy"))?;
    write_file(dir.path(), "app/svc.yaml", &config_map("{{ app }}-svc"))?;
    write_file(dir.path(), "app/README.md", "not a template {{")?;
    write_file(dir.path(), "other/cm.yaml", &config_map("other"))?;

    let source = Source::new(DirCollection::new(dir.path()), "app/*.yaml")
        .with_values(values(vals(json!({"app": "web"}))));
    let renderer = TemplateRenderer::new(vec![source], RendererOptions::new())?;

    let objects = renderer.process(&RenderContext::new(), &Values::new())?;
    assert_eq!(names(&objects), ["web-deploy", "web-svc"]);
    Ok(())
}

#[test]
fn test_nested_values_merge() -> Result<()> {
    let files = MemoryCollection::new().with_file(
        "deploy.yaml",
        "kind: Deployment\nmetadata:\n  name: {{ app.name }}\nspec:\n  replicas: {{ app.replicas }}\n  image: {{ image.repo }}:{{ image.tag }}\n",
    );
    let source = Source::new(files, "*.yaml").with_values(values(vals(json!({
        "app": {"name": "web", "replicas": 1},
        "image": {"repo": "nginx", "tag": "1.25"}
    }))));
    let renderer = TemplateRenderer::new(vec![source], RendererOptions::new())?;

    let objects = renderer.process(
        &RenderContext::new(),
        &vals(json!({"app": {"replicas": 5}, "image": {"tag": "1.27"}})),
    )?;

    let spec = &objects[0].content()["spec"];
    assert_eq!(objects[0].name(), Some("web"));
    assert_eq!(spec["replicas"], 5);
    assert_eq!(spec["image"], "nginx:1.27");
    Ok(())
}

#[test]
fn test_strict_lookup_reports_variable() -> Result<()> {
    let files = MemoryCollection::new().with_file("cm.yaml", config_map("{{ release.nmae }}"));
    let source =
        Source::new(files, "*.yaml").with_values(values(vals(json!({"release": {"name": "r1"}}))));
    let renderer = TemplateRenderer::new(vec![source], RendererOptions::new())?;

    let err = renderer.process(&RenderContext::new(), &Values::new()).unwrap_err();
    assert!(err.is_undefined_variable());
    let report = err.format_with_context();
    assert!(report.contains("release.nmae"), "got: {report}");
    assert!(report.contains("did you mean: release.name"), "got: {report}");
    Ok(())
}

#[test]
fn test_default_filter_allows_optional_values() -> Result<()> {
    let files = MemoryCollection::new().with_file(
        "cm.yaml",
        "kind: ConfigMap\nmetadata:\n  name: {{ name | default(value=\"fallback\") }}\n",
    );
    let renderer =
        TemplateRenderer::new(vec![Source::new(files, "*.yaml")], RendererOptions::new())?;

    let objects = renderer.process(&RenderContext::new(), &Values::new())?;
    assert_eq!(names(&objects), ["fallback"]);
    Ok(())
}

#[test]
fn test_conditional_documents() -> Result<()> {
    let files = MemoryCollection::new().with_file(
        "all.yaml",
        "kind: Service\nmetadata:\n  name: svc\n---\n{% if ingress.enabled %}kind: Ingress\nmetadata:\n  name: ing\n{% endif %}\n",
    );
    let renderer =
        TemplateRenderer::new(vec![Source::new(files, "*.yaml")], RendererOptions::new())?;

    let off = renderer.process(&RenderContext::new(), &vals(json!({"ingress": {"enabled": false}})))?;
    let on = renderer.process(&RenderContext::new(), &vals(json!({"ingress": {"enabled": true}})))?;
    assert_eq!(names(&off), ["svc"]);
    assert_eq!(names(&on), ["svc", "ing"]);

    let err = renderer.process(&RenderContext::new(), &Values::new()).unwrap_err();
    assert!(err.is_undefined_variable(), "got: {err:?}");
    Ok(())
}

#[test]
fn test_undefined_values_in_control_flow_fail() -> Result<()> {
    let cases = [
        ("{% if ingress.enabled %}x: 1{% endif %}", "ingress.enabled"),
        ("{% if not debug %}x: 1{% endif %}", "debug"),
        ("{% if ready and tls.enabled %}x: 1{% endif %}", "tls.enabled"),
        ("{% for port in ports %}- {{ port }}\n{% endfor %}", "ports"),
    ];

    for (template, missing) in cases {
        let files = MemoryCollection::new().with_file("t.yaml", template);
        let renderer =
            TemplateRenderer::new(vec![Source::new(files, "*.yaml")], RendererOptions::new())?;

        let err = renderer.process(&RenderContext::new(), &vals(json!({"ready": true}))).unwrap_err();
        match &err {
            RenderError::Execution {
                template: name,
                message,
                ..
            } => {
                assert_eq!(name, "t.yaml");
                assert!(message.contains(missing), "{template}: {message}");
            }
            other => panic!("{template}: unexpected error: {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn test_optional_values_in_conditions() -> Result<()> {
    let files = MemoryCollection::new().with_file(
        "cm.yaml",
        "kind: ConfigMap\nmetadata:\n  name: cm\n{% if extra is defined and extra.on %}  labels:\n    extra: \"yes\"\n{% endif %}",
    );
    let renderer =
        TemplateRenderer::new(vec![Source::new(files, "*.yaml")], RendererOptions::new())?;

    let without = renderer.process(&RenderContext::new(), &Values::new())?;
    let with = renderer.process(&RenderContext::new(), &vals(json!({"extra": {"on": true}})))?;
    assert_eq!(without[0].label("extra"), None);
    assert_eq!(with[0].label("extra"), Some("yes"));
    Ok(())
}

#[test]
fn test_partials_are_include_only() -> Result<()> {
    let files = MemoryCollection::new()
        .with_file("_labels.yaml", "  labels:\n    app: {{ app }}\n")
        .with_file(
            "cm.yaml",
            "kind: ConfigMap\nmetadata:\n  name: cm\n{% include \"_labels.yaml\" %}",
        );
    let renderer = TemplateRenderer::new(
        vec![Source::new(files, "*.yaml")],
        RendererOptions::new().with_source_annotations(true),
    )?;

    let objects = renderer.process(&RenderContext::new(), &vals(json!({"app": "web"})))?;
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].label("app"), Some("web"));
    assert_eq!(objects[0].annotation("manifest-render.io/source-file"), Some("cm.yaml"));
    Ok(())
}

#[test]
fn test_provenance_annotations_merge_with_existing() -> Result<()> {
    let files = MemoryCollection::new().with_file(
        "cm.yaml",
        "kind: ConfigMap\nmetadata:\n  name: cm\n  annotations:\n    owner: team-a\n",
    );
    let renderer = TemplateRenderer::new(
        vec![Source::new(files, "*.yaml")],
        RendererOptions::new().with_source_annotations(true),
    )?;

    let objects = renderer.process(&RenderContext::new(), &Values::new())?;
    let object = &objects[0];
    assert_eq!(object.annotation("owner"), Some("team-a"));
    assert_eq!(object.annotation("manifest-render.io/source-type"), Some("tera"));
    assert_eq!(object.annotation("manifest-render.io/source-path"), Some("*.yaml"));
    assert_eq!(object.annotation("manifest-render.io/source-file"), Some("cm.yaml"));
    Ok(())
}

#[test]
fn test_filter_then_transform() -> Result<()> {
    let files = MemoryCollection::new()
        .with_file("a.yaml", "kind: Deployment\nmetadata:\n  name: a\n")
        .with_file("b.yaml", "kind: Secret\nmetadata:\n  name: b\n")
        .with_file("c.yaml", "kind: Service\nmetadata:\n  name: c\n");
    let options = RendererOptions::new()
        .with_filter(KindFilter::new(["Deployment", "Service"]))
        .with_transformer(SetLabels::new([("env", "prod")]));
    let renderer = TemplateRenderer::new(vec![Source::new(files, "*.yaml")], options)?;

    let objects = renderer.process(&RenderContext::new(), &Values::new())?;
    assert_eq!(names(&objects), ["a", "c"]);
    assert!(objects.iter().all(|o| o.label("env") == Some("prod")));
    Ok(())
}

#[test]
fn test_failure_is_all_or_nothing() -> Result<()> {
    let cache = Arc::new(TtlCache::new());
    let good = MemoryCollection::new().with_file("ok.yaml", config_map("ok"));
    let bad = MemoryCollection::new().with_file("bad.yaml", "kind: [unclosed\n");

    let renderer = TemplateRenderer::new(
        vec![Source::new(good, "*.yaml"), Source::new(bad, "*.yaml")],
        RendererOptions::new().with_cache_instance(cache.clone(), Duration::from_secs(60)),
    )?;

    let err = renderer.process(&RenderContext::new(), &Values::new()).unwrap_err();
    match err {
        RenderError::Decode {
            template,
            ..
        } => assert_eq!(template, "bad.yaml"),
        other => panic!("unexpected error: {other:?}"),
    }
    // Only the successful source reached the cache.
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn test_empty_selection_is_parse_error() -> Result<()> {
    let files = MemoryCollection::new().with_file("cm.yml", config_map("cm"));
    let renderer =
        TemplateRenderer::new(vec![Source::new(files, "*.yaml")], RendererOptions::new())?;

    let err = renderer.process(&RenderContext::new(), &Values::new()).unwrap_err();
    assert!(matches!(err, RenderError::Parse { .. }), "got: {err:?}");
    Ok(())
}

#[test]
fn test_value_function_error_and_cancellation() -> Result<()> {
    let files = MemoryCollection::new().with_file("cm.yaml", config_map("cm"));
    let source = Source::new(files, "*.yaml").with_values(Arc::new(
        |ctx: &RenderContext| -> anyhow::Result<Values> {
            if let Some(err) = ctx.err() {
                return Err(err.into());
            }
            Ok(Values::new())
        },
    ));
    let renderer = TemplateRenderer::new(vec![source], RendererOptions::new())?;

    assert!(renderer.process(&RenderContext::new(), &Values::new()).is_ok());

    let expired = RenderContext::with_timeout(Duration::ZERO);
    assert!(matches!(
        renderer.process(&expired, &Values::new()),
        Err(RenderError::Cancelled(_))
    ));
    Ok(())
}
