//! Integration tests for document rendering

use anyhow::Result;
use jstreamer::builder::Shape;
use jstreamer::{JstreamerError, Renderer};
use serde_json::{Value, json};

#[test]
fn test_rendering_object() -> Result<()> {
    let json = Renderer::default().render(|json| json.object(|json| json.set("content", "hello")))?;

    assert_eq!(json, r#"{"content":"hello"}"#);
    Ok(())
}

#[test]
fn test_nothing_rendered_is_null() -> Result<()> {
    assert_eq!(Renderer::default().render(|_| Ok(()))?, "null");
    Ok(())
}

#[test]
fn test_nested_objects_and_arrays_keep_insertion_order() -> Result<()> {
    let json = Renderer::default().render(|json| {
        json.object(|json| {
            json.set("zeta", 1)?;
            json.push_child_object("tags", |json| json.array_values(["b", "a"]))?;
            json.push_child_object("meta", |json| {
                json.set("yes", true)?;
                json.set("none", Value::Null)
            })?;
            json.set("alpha", 2.5)
        })
    })?;

    assert_eq!(json, r#"{"zeta":1,"tags":["b","a"],"meta":{"yes":true,"none":null},"alpha":2.5}"#);
    Ok(())
}

#[test]
fn test_array_of_objects_built_per_item() -> Result<()> {
    let people = vec![json!({"name": "David", "age": 32}), json!({"name": "Jamie", "age": 31})];
    let json = Renderer::default()
        .render(|json| json.array_from(&people, |json, person| json.extract(person, &["name"])))?;

    assert_eq!(json, r#"[{"name":"David"},{"name":"Jamie"}]"#);
    Ok(())
}

#[test]
fn test_shape_conflict_surfaces_to_caller() {
    let err = Renderer::default()
        .render(|json| {
            json.set("a", 1)?;
            json.append(2)
        })
        .unwrap_err();

    match err {
        JstreamerError::ShapeConflict {
            shape,
            ..
        } => assert_eq!(shape, Shape::Object),
        other => panic!("expected a shape conflict, got {other}"),
    }
}

#[test]
fn test_renderer_is_shareable_across_threads() -> Result<()> {
    let renderer = std::sync::Arc::new(Renderer::default());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let renderer = std::sync::Arc::clone(&renderer);
            std::thread::spawn(move || renderer.render(|json| json.set("n", n)))
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let json = handle.join().expect("render thread panicked")?;
        assert_eq!(json, format!(r#"{{"n":{n}}}"#));
    }
    Ok(())
}
