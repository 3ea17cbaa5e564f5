//! Integration tests for fragment caching

use std::sync::{Arc, Mutex};

use anyhow::Result;
use jstreamer::Renderer;
use jstreamer::cache::{
    CacheKeyExpr, CacheOptions, CacheStore, FragmentNamer, LegacyDigestNamer, MemoryStore,
    TemplateDigestNamer,
};
use jstreamer::templating::PartialOptions;
use jstreamer::test_utils::{
    BlogPost, assert_collection_rendered, blog_post_collection, fixture_partials, init_test_logging,
};

fn renderer(store: &Arc<MemoryStore>) -> Renderer {
    init_test_logging(None);
    Renderer::default()
        .with_partials(fixture_partials())
        .with_cache_store(Arc::clone(store) as Arc<dyn CacheStore>)
}

fn render_post(json: &mut jstreamer::JsonBuilder<'_>, post: &BlogPost) -> jstreamer::Result<()> {
    let post = serde_json::to_value(post)?;
    json.partial("blog_post", PartialOptions::new().local("blog_post", post))
}

#[test]
fn test_fragment_caching_a_json_object() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);

    renderer.render(|json| {
        json.object(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("name", "Cache")))
    })?;
    let json = renderer.render(|json| {
        json.object(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("name", "Miss")))
    })?;

    assert_eq!(json, r#"{"name":"Cache"}"#);
    Ok(())
}

#[test]
fn test_conditionally_fragment_caching_a_json_object() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);

    let render = |value: &'static str| {
        renderer.render(|json| {
            json.object(|json| {
                json.cache_if(true, "cachekey", CacheOptions::new(), |json| json.set("test1", value))?;
                json.cache_if(false, "cachekey", CacheOptions::new(), |json| json.set("test2", value))
            })
        })
    };

    render("Cache")?;
    let json = render("Miss")?;

    assert_eq!(json, r#"{"test1":"Cache","test2":"Miss"}"#);
    assert_eq!(store.len(), 1);
    Ok(())
}

#[test]
fn test_fragment_caching_deserializes_an_array() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);

    let json = renderer
        .render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.array_values(["a", "b", "c"])))?;
    assert_eq!(json, r#"["a","b","c"]"#);

    let json = renderer
        .render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.array_values(["1", "2", "3"])))?;
    assert_eq!(json, r#"["a","b","c"]"#);
    Ok(())
}

/// Records the naming calls the coordinator makes.
#[derive(Default)]
struct RecordingNamer {
    current: bool,
    calls: Mutex<Vec<(String, String, Option<bool>)>>,
}

impl FragmentNamer for RecordingNamer {
    fn cache_fragment_name(&self, key: &CacheKeyExpr, options: &CacheOptions) -> Option<CacheKeyExpr> {
        if !self.current {
            return None;
        }
        let mut calls = self.calls.lock().expect("namer lock");
        calls.push(("current".into(), key.expand(), Some(options.skip_digest)));
        Some(key.clone())
    }

    fn fragment_name_with_digest(&self, key: &CacheKeyExpr) -> Option<CacheKeyExpr> {
        let mut calls = self.calls.lock().expect("namer lock");
        calls.push(("legacy".into(), key.expand(), None));
        Some(key.clone())
    }
}

fn render_with_namer(namer: &Arc<RecordingNamer>, options: CacheOptions) -> Result<()> {
    let renderer = Renderer::default()
        .with_cache_store(Arc::new(MemoryStore::new()))
        .with_fragment_namer(Arc::clone(namer) as Arc<dyn FragmentNamer>);
    renderer.render(|json| json.cache("cachekey", options, |json| json.set("name", "Cache")))?;
    Ok(())
}

#[test]
fn test_fragment_caching_works_with_previous_version_of_cache_digests() -> Result<()> {
    let namer = Arc::new(RecordingNamer::default());
    render_with_namer(&namer, CacheOptions::new())?;

    let calls = namer.calls.lock().expect("namer lock");
    assert_eq!(*calls, [("legacy".to_string(), "cachekey".to_string(), None)]);
    Ok(())
}

#[test]
fn test_fragment_caching_works_with_current_cache_digests() -> Result<()> {
    let namer = Arc::new(RecordingNamer {
        current: true,
        ..RecordingNamer::default()
    });
    render_with_namer(&namer, CacheOptions::new())?;

    let calls = namer.calls.lock().expect("namer lock");
    assert_eq!(*calls, [("current".to_string(), "cachekey".to_string(), Some(false))]);
    Ok(())
}

#[test]
fn test_current_cache_digest_option_accepts_options() -> Result<()> {
    let namer = Arc::new(RecordingNamer {
        current: true,
        ..RecordingNamer::default()
    });
    render_with_namer(&namer, CacheOptions::new().skip_digest(true))?;

    let calls = namer.calls.lock().expect("namer lock");
    assert_eq!(*calls, [("current".to_string(), "cachekey".to_string(), Some(true))]);
    Ok(())
}

#[test]
fn test_template_digest_changes_invalidate_fragments() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let render = |source: &str, value: &'static str| {
        renderer(&store)
            .with_fragment_namer(Arc::new(TemplateDigestNamer::new("posts/show", source)))
            .render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("v", value)))
    };

    render("v1", "first")?;
    assert_eq!(render("v1", "second")?, r#"{"v":"first"}"#);
    assert_eq!(render("v2", "third")?, r#"{"v":"third"}"#);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[test]
fn test_legacy_digest_namer_caches() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer =
        renderer(&store).with_fragment_namer(Arc::new(LegacyDigestNamer::new("posts/show", "source")));

    renderer.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("v", 1)))?;
    let json = renderer.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("v", 2)))?;

    assert_eq!(json, r#"{"v":1}"#);
    Ok(())
}

#[test]
fn test_does_not_perform_caching_when_disabled() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store).with_perform_caching(false);

    renderer.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("name", "Cache")))?;
    let json =
        renderer.render(|json| json.cache("cachekey", CacheOptions::new(), |json| json.set("name", "Fresh")))?;

    assert_eq!(json, r#"{"name":"Fresh"}"#);
    assert_eq!(store.len(), 0);
    Ok(())
}

#[test]
fn test_renders_cached_array_of_block_partials() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);
    let posts = blog_post_collection();

    let json = renderer.render(|json| {
        json.cache_collection(Some(&posts), CacheOptions::new(), None, |json, post| render_post(json, post))
    })?;
    assert_collection_rendered(&json, None);
    assert_eq!(store.len(), 10);
    assert_eq!(store.stats().multi_reads, 1);

    // Every element now comes from the store.
    let again = renderer.render(|json| {
        json.cache_collection(Some(&posts), CacheOptions::new(), None, |json, _| json.set("stale", true))
    })?;
    assert_eq!(again, json);
    Ok(())
}

#[test]
fn test_renders_cached_array_with_a_key_specified_as_a_callable() -> Result<()> {
    let posts = blog_post_collection();
    let calls = Mutex::new(0);
    let key = |_: &&BlogPost| {
        *calls.lock().expect("counter lock") += 1;
        CacheKeyExpr::from(serde_json::Value::Bool(true))
    };

    for store in [MemoryStore::new(), MemoryStore::new().without_multi_key()] {
        let store = Arc::new(store);
        let renderer = renderer(&store);

        for _ in 0..2 {
            let json = renderer.render(|json| {
                json.cache_collection(Some(&posts), CacheOptions::new(), Some(&key), |json, post| {
                    render_post(json, post)
                })
            })?;
            assert_collection_rendered(&json, None);
        }
        assert_eq!(store.len(), 10);
    }

    assert_eq!(*calls.lock().expect("counter lock"), 40);
    Ok(())
}

#[test]
fn test_record_keys_with_cacheable() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);
    let posts = blog_post_collection();
    let key = |post: &&BlogPost| CacheKeyExpr::record(*post);

    renderer.render(|json| {
        json.cache_collection(Some(&posts), CacheOptions::new().version("v1"), Some(&key), |json, post| {
            render_post(json, post)
        })
    })?;

    let first = CacheKeyExpr::List(vec![CacheKeyExpr::from_serialize(&posts[0])?, key(&&posts[0])]);
    assert!(first.expand().ends_with("/blog_posts/1"));
    assert!(store.contains_key(&format!("jstreamer/{first}/v1")));
    assert_eq!(store.len(), 10);
    Ok(())
}

#[test]
fn test_reverts_to_cache_if_store_does_not_support_multi_key() -> Result<()> {
    let store = Arc::new(MemoryStore::new().without_multi_key());
    let renderer = renderer(&store);
    let posts = blog_post_collection();

    // Warm half the elements through the single-key path.
    renderer.render(|json| {
        json.cache_collection(Some(&posts[..5]), CacheOptions::new(), None, |json, post| {
            render_post(json, post)
        })
    })?;

    let json = renderer.render(|json| {
        json.cache_collection(Some(&posts), CacheOptions::new(), None, |json, post| render_post(json, post))
    })?;

    assert_collection_rendered(&json, None);
    assert_eq!(store.len(), 10);
    assert_eq!(store.stats().multi_reads, 0);
    assert_eq!(store.stats().hits, 5);
    Ok(())
}

#[test]
fn test_reverts_to_plain_array_when_caching_is_disabled() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store).with_perform_caching(false);
    let posts = blog_post_collection();

    let json = renderer.render(|json| {
        json.cache_collection(Some(&posts), CacheOptions::new(), None, |json, post| render_post(json, post))
    })?;

    assert_collection_rendered(&json, None);
    assert!(store.is_empty());
    Ok(())
}

#[test]
fn test_cached_collection_as_attribute_value() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let renderer = renderer(&store);
    let posts = blog_post_collection();

    let json = renderer.render(|json| {
        json.object(|json| {
            json.push_child_object("posts", |json| {
                json.cache_collection(Some(&posts), CacheOptions::new(), None, |json, post| {
                    render_post(json, post)
                })
            })
        })
    })?;

    assert_collection_rendered(&json, Some("posts"));
    Ok(())
}
