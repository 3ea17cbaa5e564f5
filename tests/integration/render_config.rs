//! Integration tests for renderer settings loaded from TOML

use std::sync::Arc;

use anyhow::Result;
use jstreamer::Renderer;
use jstreamer::cache::{CacheOptions, MemoryStore};
use jstreamer::config::RenderConfig;
use tempfile::TempDir;

async fn load(content: &str) -> Result<RenderConfig> {
    let temp = TempDir::new()?;
    let path = temp.path().join("jstreamer.toml");
    tokio::fs::write(&path, content).await?;
    RenderConfig::load_from(&path).await
}

#[tokio::test]
async fn test_loaded_key_format_applies_to_every_render() -> Result<()> {
    let config = load(
        r#"
        [[key_format]]
        strategy = "camelize"
        args = ["lower"]
        "#,
    )
    .await?;

    let renderer = Renderer::new(config)?;
    let json = renderer.render(|json| {
        json.set("camel_style", "for JS")?;
        json.push_child_object("nested_object", |json| json.set("inner_key", 1))
    })?;

    assert_eq!(json, r#"{"camelStyle":"for JS","nestedObject":{"innerKey":1}}"#);
    Ok(())
}

#[tokio::test]
async fn test_loaded_namespace_and_caching_flag() -> Result<()> {
    let config = load("cache_namespace = \"views\"\n").await?;
    let store = Arc::new(MemoryStore::new());
    let renderer = Renderer::new(config)?.with_cache_store(store.clone());

    renderer.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("a", 1)))?;
    assert!(store.contains_key("views/cachekey"));

    let config = load("perform_caching = false\n").await?;
    let disabled = Renderer::new(config)?.with_cache_store(store.clone());
    let json = disabled.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("a", 2)))?;
    assert_eq!(json, r#"{"a":2}"#);
    assert_eq!(store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_strategy_in_file_is_rejected() {
    let result = load("[[key_format]]\nstrategy = \"camelise\"\n").await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("camelise"));
}
