//! Integration tests for key format propagation

use anyhow::Result;
use jstreamer::key_format::{KeyFormat, KeyTransform};
use jstreamer::templating::PartialOptions;
use jstreamer::test_utils::fixture_partials;
use jstreamer::{JstreamerError, Renderer};

#[test]
fn test_key_format_with_parameter() -> Result<()> {
    let json = Renderer::default().render(|json| {
        json.object(|json| {
            json.key_format("camelize", &["lower"])?;
            json.set("camel_style", "for JS")
        })
    })?;

    assert_eq!(json, r#"{"camelStyle":"for JS"}"#);
    Ok(())
}

#[test]
fn test_key_format_propagates_to_child_elements() -> Result<()> {
    let json = Renderer::default().render(|json| {
        json.object(|json| {
            json.key_format("upcase", &[] as &[&str])?;
            json.set("level1", "one")?;
            json.push_child_object("level2", |json| json.object(|json| json.set("value", "two")))
        })
    })?;

    assert_eq!(json, r#"{"LEVEL1":"one","LEVEL2":{"VALUE":"two"}}"#);
    Ok(())
}

#[test]
fn test_key_format_crosses_partials() -> Result<()> {
    let renderer = Renderer::default().with_partials(fixture_partials());
    let json = renderer.render(|json| {
        json.key_format("upcase", &[] as &[&str])?;
        json.set_partial("first", PartialOptions::named("partial"))
    })?;

    assert_eq!(json, r#"{"FIRST":{"CONTENT":"hello"}}"#);
    Ok(())
}

#[test]
fn test_chained_format() -> Result<()> {
    let format = KeyFormat::from(KeyTransform::Underscore).then(KeyTransform::Dasherize);
    let json = Renderer::default().render(|json| {
        json.set_key_format(format);
        json.set("authorName", "Pavel")
    })?;

    assert_eq!(json, r#"{"author-name":"Pavel"}"#);
    Ok(())
}

#[test]
fn test_unknown_strategy_suggests_close_names() {
    let err = Renderer::default()
        .render(|json| json.key_format("camelise", &[] as &[&str]))
        .unwrap_err();

    assert!(matches!(err, JstreamerError::UnknownKeyStrategy { .. }));
    assert_eq!(err.suggestions(), ["camelize".to_string()]);
}

#[test]
fn test_invalid_strategy_argument() {
    let err = Renderer::default().render(|json| json.key_format("camelize", &["sideways"])).unwrap_err();

    assert!(matches!(err, JstreamerError::InvalidKeyStrategyArgument { .. }));
}
