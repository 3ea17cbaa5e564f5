//! Integration tests for partial rendering

use anyhow::Result;
use jstreamer::templating::{Locals, PartialOptions};
use jstreamer::test_utils::{
    BlogPost, assert_collection_rendered, blog_post_collection, collection_collection,
    fixture_partials,
};
use jstreamer::{JstreamerError, Renderer};
use serde_json::Value;

fn renderer() -> Renderer {
    Renderer::default().with_partials(fixture_partials())
}

#[test]
fn test_partial_renders_partial() -> Result<()> {
    let json = renderer().render(|json| json.partial("partial", PartialOptions::new()))?;

    assert_eq!(json, r#"{"content":"hello"}"#);
    Ok(())
}

#[test]
fn test_partial_renders_collections() -> Result<()> {
    let options = PartialOptions::new()
        .collection(Some(to_values(blog_post_collection())))
        .as_binding("blog_post");
    let json = renderer().render(|json| json.partial("blog_post", options))?;

    assert_collection_rendered(&json, None);
    Ok(())
}

#[test]
fn test_partial_renders_collections_when_binding_is_a_string() -> Result<()> {
    let binding = String::from("blog_post");
    let options = PartialOptions::new()
        .collection(Some(to_values(blog_post_collection())))
        .as_binding(&binding);
    let json = renderer().render(|json| json.partial("blog_post", options))?;

    assert_collection_rendered(&json, None);
    Ok(())
}

#[test]
fn test_partial_renders_collections_as_collections() -> Result<()> {
    let options = PartialOptions::new()
        .collection(Some(to_values(collection_collection())))
        .as_binding("collection");
    let json = renderer().render(|json| json.partial("collection", options))?;

    let parsed: Value = serde_json::from_str(&json)?;
    assert_eq!(parsed.as_array().map(Vec::len), Some(5));
    assert_eq!(parsed[4]["name"], "collection 5");
    Ok(())
}

#[test]
fn test_partial_renders_empty_array_for_nil_collection() -> Result<()> {
    let options = PartialOptions::new().collection(None::<Vec<Value>>).as_binding("blog_post");
    let json = renderer().render(|json| json.partial("blog_post", options))?;

    assert_eq!(json, "[]");
    Ok(())
}

#[test]
fn test_partial_renders_collection_alt_syntax() -> Result<()> {
    let options = PartialOptions::named("blog_post")
        .collection(Some(to_values(blog_post_collection())))
        .as_binding("blog_post");
    let json = renderer().render(|json| json.partial_with(options))?;

    assert_collection_rendered(&json, None);
    Ok(())
}

#[test]
fn test_partial_renders_empty_array_for_nil_collection_alt_syntax() -> Result<()> {
    let options =
        PartialOptions::named("blog_post").collection(None::<Vec<Value>>).as_binding("blog_post");
    let json = renderer().render(|json| json.partial_with(options))?;

    assert_eq!(json, "[]");
    Ok(())
}

#[test]
fn test_render_array_of_partials() -> Result<()> {
    let json = renderer()
        .render(|json| json.array_of_partials(Some(blog_post_collection()), "blog_post", "blog_post"))?;

    assert_collection_rendered(&json, None);
    Ok(())
}

#[test]
fn test_render_array_of_partials_as_empty_array_with_nil_collection() -> Result<()> {
    let json = renderer()
        .render(|json| json.array_of_partials(None::<Vec<BlogPost>>, "blog_post", "blog_post"))?;

    assert_eq!(json, "[]");
    Ok(())
}

#[test]
fn test_render_array_of_partials_as_a_value() -> Result<()> {
    let json = renderer().render(|json| {
        json.object(|json| {
            json.set_array_of_partials("posts", Some(blog_post_collection()), "blog_post", "blog_post")
        })
    })?;

    assert_collection_rendered(&json, Some("posts"));
    Ok(())
}

#[test]
fn test_render_as_empty_array_if_partials_as_a_nil_value() -> Result<()> {
    let json = renderer().render(|json| {
        json.object(|json| {
            json.set_array_of_partials("posts", None::<Vec<BlogPost>>, "blog_post", "blog_post")
        })
    })?;

    assert_eq!(json, r#"{"posts":[]}"#);
    Ok(())
}

#[test]
fn test_partial_with_extra_locals() -> Result<()> {
    let post = serde_json::to_value(&blog_post_collection()[1])?;
    let json = renderer().render(|json| json.partial("blog_post", PartialOptions::new().local("blog_post", post)))?;

    let parsed: Value = serde_json::from_str(&json)?;
    assert_eq!(parsed["id"], 2);
    assert_eq!(parsed["author"]["first_name"], "Pavel");
    assert_eq!(parsed["author"]["last_name"], "Pravosud");
    Ok(())
}

#[test]
fn test_render_template_as_document() -> Result<()> {
    let post = serde_json::to_value(&blog_post_collection()[0])?;
    let json = renderer().render_template("_blog_post", &Locals::new().with("blog_post", post))?;

    assert_eq!(
        json,
        r#"{"id":1,"body":"post body 1","author":{"first_name":"David","last_name":"Heinemeier Hansson"}}"#
    );
    Ok(())
}

#[test]
fn test_partial_missing_local_is_an_error() {
    let err = renderer().render(|json| json.partial("blog_post", PartialOptions::new())).unwrap_err();

    assert!(matches!(err, JstreamerError::MissingLocal { .. }));
}

fn to_values<T: serde::Serialize>(items: Vec<T>) -> Vec<Value> {
    items.into_iter().map(|item| serde_json::to_value(item).expect("fixture serializes")).collect()
}
