use std::sync::Arc;

use models::{DefaultSet, OptionRecord, Slug};
use serde_json::{json, Value};
use service::admin::{SettingsPage, SettingsRegistry, TextField};
use service::composite::{BoundedOption, CompositeOption, OpenOption, Settings};
use service::errors::ServiceError;
use service::hooks::{EventRegistrar, HookRegistry, OptionEvent};
use service::options::OptionService;
use service::storage::{JsonFileBackend, MemoryBackend, OptionBackend};

fn rec(pairs: &[(&str, Value)]) -> OptionRecord {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

fn theme_defaults() -> DefaultSet {
    DefaultSet::new().with("color", json!("blue")).with("size", json!(12))
}

fn memory() -> (Arc<MemoryBackend>, Arc<OptionService>) {
    let backend = Arc::new(MemoryBackend::new());
    let svc = Arc::new(OptionService::with_backend(backend.clone()));
    (backend, svc)
}

#[tokio::test]
async fn absent_record_reads_defaults() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("absent_bounded")?, theme_defaults(), &svc);
    let open = OpenOption::from_service(Slug::new("absent_open")?, theme_defaults(), &svc);

    for opt in [&bounded as &dyn CompositeOption, &open as &dyn CompositeOption] {
        assert_eq!(opt.get("color").await?, json!("blue"));
        assert_eq!(opt.get("size").await?, json!(12));
        assert!(opt.exists("size").await?);
    }
    assert!(backend.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn bounded_without_absent_record_hook_is_not_found() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let slug = Slug::new("unhooked_bounded")?;
    // hooks land in a registry the service never consults
    let detached: Arc<dyn EventRegistrar> = Arc::new(HookRegistry::new());
    let bounded = BoundedOption::new(slug.clone(), theme_defaults(), svc.clone(), detached.clone());

    assert!(detached.has(&OptionEvent::DefaultOption.hook_name(&slug)));
    assert!(!svc.hooks().has(&OptionEvent::DefaultOption.hook_name(&slug)));
    assert!(matches!(bounded.get("color").await, Err(ServiceError::NotFound(_))));
    assert!(!bounded.exists("color").await?);
    assert!(matches!(bounded.set("color", json!("red")).await, Err(ServiceError::NotFound(_))));
    assert!(backend.is_empty().await);

    // once the service's own registry carries the hook, the default is served
    let hooked = BoundedOption::from_service(slug, theme_defaults(), &svc);
    assert_eq!(hooked.get("color").await?, json!("blue"));
    Ok(())
}

#[tokio::test]
async fn partial_record_reads_defaults_for_missing_keys() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("partial_bounded")?, theme_defaults(), &svc);
    let open = OpenOption::from_service(Slug::new("partial_open")?, theme_defaults(), &svc);
    backend.write(bounded.slug(), rec(&[("color", json!("red"))])).await?;
    backend.write(open.slug(), rec(&[("color", json!("red"))])).await?;

    for opt in [&bounded as &dyn CompositeOption, &open as &dyn CompositeOption] {
        assert_eq!(opt.get("color").await?, json!("red"));
        assert_eq!(opt.get("size").await?, json!(12));
    }
    Ok(())
}

#[tokio::test]
async fn unknown_key_is_not_found_in_both_variants() -> Result<(), anyhow::Error> {
    let (_, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("unknown_bounded")?, theme_defaults(), &svc);
    let open = OpenOption::from_service(Slug::new("unknown_open")?, theme_defaults(), &svc);

    for opt in [&bounded as &dyn CompositeOption, &open as &dyn CompositeOption] {
        let err = opt.get("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "not found: there is no setting 'missing'");
        assert!(!opt.exists("missing").await?);
    }
    Ok(())
}

#[tokio::test]
async fn set_then_get_round_trips() -> Result<(), anyhow::Error> {
    let (_, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("rw_bounded")?, theme_defaults(), &svc);
    let open = OpenOption::from_service(Slug::new("rw_open")?, theme_defaults(), &svc);

    bounded.set("size", json!(14)).await?;
    assert_eq!(bounded.get("size").await?, json!(14));
    assert!(matches!(bounded.set("new_key", json!(1)).await, Err(ServiceError::NotFound(_))));

    open.set("new_key", json!({"nested": [1, 2]})).await?;
    assert_eq!(open.get("new_key").await?, json!({"nested": [1, 2]}));
    Ok(())
}

#[tokio::test]
async fn merge_honours_overwrite() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let open = OpenOption::from_service(Slug::new("merge_it")?, DefaultSet::new(), &svc);
    backend.write(open.slug(), rec(&[("a", json!(2)), ("b", json!(3))])).await?;

    assert!(!open.merge(rec(&[("a", json!(1))]), false).await?);
    assert_eq!(backend.read(open.slug()).await?, Some(rec(&[("a", json!(2)), ("b", json!(3))])));

    assert!(open.merge(rec(&[("a", json!(1))]), true).await?);
    assert_eq!(backend.read(open.slug()).await?, Some(rec(&[("a", json!(1)), ("b", json!(3))])));
    Ok(())
}

#[tokio::test]
async fn clear_non_default_leaves_empty_record() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let open = OpenOption::from_service(
        Slug::new("prune_me")?,
        DefaultSet::new().with("foo", json!("bar")),
        &svc,
    );
    backend.write(open.slug(), rec(&[("foo", json!("bar")), ("extra", json!("x"))])).await?;

    assert!(open.clear_non_default().await?);
    assert_eq!(backend.read(open.slug()).await?, Some(OptionRecord::new()));
    assert_eq!(open.get("foo").await?, json!("bar"));
    Ok(())
}

#[tokio::test]
async fn bounded_delete_is_not_supported() -> Result<(), anyhow::Error> {
    let (_, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("no_delete")?, theme_defaults(), &svc);
    for key in ["color", "missing"] {
        let err = bounded.delete(key).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotSupported(_)));
        assert_eq!(err.code(), 1005);
    }
    Ok(())
}

#[tokio::test]
async fn settings_submit_keeps_omitted_keys() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let defaults = DefaultSet::new().with("foo", json!("")).with("bar", json!(""));
    let settings: Arc<dyn CompositeOption> =
        Arc::new(Settings::from_service(Slug::new("my_settings")?, defaults, &svc));
    backend.write(settings.slug(), rec(&[("foo", json!("old")), ("bar", json!("kept"))])).await?;

    let mut page = SettingsPage::new(settings.clone(), svc.clone(), Arc::new(SettingsRegistry::new()), None)?;
    page.add_field("foo", Box::new(TextField::new("Foo")))?;
    assert!(page.submit(rec(&[("foo", json!("new"))])).await?);

    assert_eq!(
        backend.read(settings.slug()).await?,
        Some(rec(&[("foo", json!("new")), ("bar", json!("kept"))]))
    );
    Ok(())
}

#[tokio::test]
async fn count_tracks_variant_semantics() -> Result<(), anyhow::Error> {
    let (backend, svc) = memory();
    let bounded = BoundedOption::from_service(Slug::new("count_bounded")?, theme_defaults(), &svc);
    let open = OpenOption::from_service(Slug::new("count_open")?, theme_defaults(), &svc);
    backend.write(bounded.slug(), rec(&[("color", json!("red")), ("stray", json!(1))])).await?;

    assert_eq!(bounded.count().await?, 2);
    assert_eq!(open.count().await?, 2);
    open.set("extra", json!(true)).await?;
    assert_eq!(open.count().await?, 3);
    open.delete("extra").await?;
    assert_eq!(open.count().await?, 2);
    Ok(())
}

#[tokio::test]
async fn invalid_sub_keys_are_rejected() -> Result<(), anyhow::Error> {
    let (_, svc) = memory();
    let open = OpenOption::from_service(Slug::new("keys_checked")?, DefaultSet::new(), &svc);
    for key in ["", "a[b]", "line\nbreak"] {
        assert!(matches!(open.set(key, json!(1)).await, Err(ServiceError::InvalidArgument(_))));
    }
    Ok(())
}

#[tokio::test]
async fn json_file_backend_survives_reopen() -> Result<(), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("composite-{}.json", uuid::Uuid::new_v4()));
    let slug = Slug::new("persisted_theme")?;
    {
        let svc = Arc::new(OptionService::with_backend(JsonFileBackend::open(&path).await?));
        let opt = BoundedOption::from_service(slug.clone(), theme_defaults(), &svc);
        opt.set("color", json!("green")).await?;
    }

    let backend = JsonFileBackend::open(&path).await?;
    assert_eq!(
        backend.read(&slug).await?,
        Some(rec(&[("color", json!("green")), ("size", json!(12))]))
    );
    let svc = Arc::new(OptionService::with_backend(backend));
    let opt = OpenOption::from_service(slug, theme_defaults(), &svc);
    assert_eq!(opt.get("color").await?, json!("green"));

    let _ = std::fs::remove_file(&path);
    Ok(())
}
