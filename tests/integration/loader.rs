//! Behavior of [`DefaultJsonLoader`] through the public [`JsonLoader`] trait.

use jsonteng::core::TemplateError;
use jsonteng::loader::{DefaultJsonLoader, JsonLoader, ROOT_SCOPE};
use jsonteng::test_utils::TemplateDir;
use serde_json::json;

#[test]
fn test_relative_loads_follow_the_scope_stack() {
    let dir = TemplateDir::new().unwrap();
    dir.write("main.json", r#"{"level": "main"}"#).unwrap();
    dir.write("nets/sub.json", r#"{"level": "sub"}"#).unwrap();
    dir.write("nets/leaf.json", r#"{"level": "leaf"}"#).unwrap();

    let mut loader = DefaultJsonLoader::new(Some(dir.path().to_path_buf()));
    assert_eq!(loader.load("main.json").unwrap(), json!({"level": "main"}));
    assert_eq!(loader.load("nets/sub.json").unwrap(), json!({"level": "sub"}));
    // Relative to nets/, not to the template home
    assert_eq!(loader.load("leaf.json").unwrap(), json!({"level": "leaf"}));
    assert_eq!(loader.depth(), 3);

    loader.unload("leaf.json").unwrap();
    loader.unload("nets/sub.json").unwrap();
    loader.unload("main.json").unwrap();
    assert_eq!(loader.depth(), 0);
}

#[test]
fn test_inline_values_inherit_the_enclosing_directory() {
    let dir = TemplateDir::new().unwrap();
    dir.write("nets/sub.json", r#"{"kind": "file"}"#).unwrap();
    dir.write("nets/leaf.json", r#"{"kind": "leaf"}"#).unwrap();

    let mut loader = DefaultJsonLoader::new(Some(dir.path().to_path_buf()));
    loader.load("nets/sub.json").unwrap();
    assert_eq!(loader.load(r#"{"inline": true}"#).unwrap(), json!({"inline": true}));
    assert_eq!(loader.load("leaf.json").unwrap(), json!({"kind": "leaf"}));
}

#[test]
fn test_file_scheme_is_accepted() {
    let dir = TemplateDir::new().unwrap();
    let path = dir.write("data.json", "[1, 2]").unwrap();

    let mut loader = DefaultJsonLoader::default();
    let identifier = format!("file://{}", path.display());
    assert_eq!(loader.load(&identifier).unwrap(), json!([1, 2]));
    loader.unload(&identifier).unwrap();
}

#[test]
fn test_identifier_classification() {
    let mut loader = DefaultJsonLoader::default();
    assert_eq!(loader.load(r#"{"a": [1]}"#).unwrap(), json!({"a": [1]}));
    assert_eq!(loader.load("42").unwrap(), json!(42));
    assert_eq!(loader.load("-7").unwrap(), json!(-7));
    assert_eq!(loader.load("2.5").unwrap(), json!(2.5));
    assert_eq!(loader.load("no-such-template.json").unwrap(), json!("no-such-template.json"));
    assert_eq!(loader.depth(), 5);
}

#[test]
fn test_file_that_is_not_json_is_treated_as_a_value() {
    let dir = TemplateDir::new().unwrap();
    let path = dir.write("notes.txt", "not json").unwrap();

    let mut loader = DefaultJsonLoader::default();
    let identifier = path.to_str().unwrap();
    assert_eq!(loader.load(identifier).unwrap(), json!(identifier));
}

#[test]
fn test_unload_out_of_order_is_a_scope_violation() {
    let mut loader = DefaultJsonLoader::default();
    loader.load("1").unwrap();
    loader.load("2").unwrap();

    let err = loader.unload("1").unwrap_err();
    assert_eq!(
        err,
        TemplateError::LoaderScopeViolation {
            expected: "1".to_string(),
            found: "2".to_string(),
        }
    );

    loader.unload("2").unwrap();
    loader.unload("1").unwrap();
    let err = loader.unload("1").unwrap_err();
    assert_eq!(
        err,
        TemplateError::LoaderScopeViolation {
            expected: "1".to_string(),
            found: ROOT_SCOPE.to_string(),
        }
    );
}
