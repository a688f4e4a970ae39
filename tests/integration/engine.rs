//! End-to-end resolutions through [`TemplateEngine`].

use jsonteng::core::{Result, TemplateError};
use jsonteng::tags::Tag;
use jsonteng::templating::{Resolver, TemplateEngine};
use jsonteng::test_utils::{TemplateDir, init_test_logging};
use serde_json::{Value, json};

#[test]
fn test_nested_includes_resolve_relative_to_their_directory() {
    init_test_logging(None);
    let dir = TemplateDir::new().unwrap();
    dir.write(
        "vm.json",
        r##"{"name": "${name}", "nics": ["#for-each", "${nics}", "nics/nic.json"]}"##,
    )
    .unwrap();
    dir.write(
        "nics/nic.json",
        r##"{
            "dev": "eth${_index_}",
            "ip": ["#ipv4-host-ip", "${cidr}", "${host}"],
            "routes": ["#for-each", "${routes}", "route.json"]
        }"##,
    )
    .unwrap();
    dir.write("nics/route.json", r#"{"to": "${to}", "via": "${gateway}"}"#).unwrap();

    let bindings = [json!({
        "name": "vm1",
        "cidr": "10.0.0.0/24",
        "nics": [
            {"host": 5, "routes": [{"to": "10.1.0.0/16"}]},
            {"host": 6, "routes": []}
        ]
    })];
    let mut engine = TemplateEngine::builder()
        .with_env(json!({"gateway": "10.0.0.1"}))
        .with_template_home(dir.path())
        .build();

    let result = engine.resolve("vm.json", &bindings).unwrap();
    assert_eq!(
        result,
        json!({
            "name": "vm1",
            "nics": [
                {"dev": "eth0", "ip": "10.0.0.5", "routes": [{"to": "10.1.0.0/16", "via": "10.0.0.1"}]},
                {"dev": "eth1", "ip": "10.0.0.6", "routes": []}
            ]
        })
    );

    // The loader is back at its root scope, so a second run behaves the same
    assert_eq!(engine.resolve("vm.json", &bindings).unwrap(), result);
}

#[test]
fn test_main_template_from_absolute_path() {
    let dir = TemplateDir::new().unwrap();
    let path = dir.write("main.json", r#"{"size": "${size}"}"#).unwrap();

    let mut engine = TemplateEngine::default();
    let result = engine.resolve(path.to_str().unwrap(), &[json!({"size": 3})]).unwrap();
    assert_eq!(result, json!({"size": 3}));
}

#[test]
fn test_first_binding_source_wins() {
    let mut engine = TemplateEngine::builder().with_env(json!({"zone": "env"})).build();
    let bindings = [json!({"zone": "a"}), json!({"zone": "b", "rack": 7})];

    let result = engine.resolve(r#"["${zone}", "${rack}"]"#, &bindings).unwrap();
    assert_eq!(result, json!(["a", 7]));

    let duplicates = engine.duplicated_parameters();
    assert_eq!(duplicates["zone"], vec![json!("a"), json!("b"), json!("env")]);
    assert!(!duplicates.contains_key("rack"));
}

#[test]
fn test_nested_parameter_references() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({
        "size": "large",
        "sizes": {"small": {"cpu": 1}, "large": {"cpu": 8}},
        "disks": [{"gb": 20}, {"gb": 100}],
        "disk": 1
    })];

    let result = engine
        .resolve(r#"{"cpu": "${sizes.${size}.cpu}", "gb": "${disks[${disk}].gb}"}"#, &bindings)
        .unwrap();
    assert_eq!(result, json!({"cpu": 8, "gb": 100}));
}

#[test]
fn test_typed_and_embedded_references() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"ports": [80, 443], "port": 8080, "host": "web"})];

    let result = engine
        .resolve(r#"{"ports": "${ports}", "url": "http://${host}:${port}/"}"#, &bindings)
        .unwrap();
    assert_eq!(result, json!({"ports": [80, 443], "url": "http://web:8080/"}));
}

#[test]
fn test_escaped_characters_are_kept_literally() {
    let mut engine = TemplateEngine::default();
    let result = engine
        .resolve(r#"{"price": "\\$${amount}", "shell": "\\${HOME\\}"}"#, &[json!({"amount": 5})])
        .unwrap();
    assert_eq!(result, json!({"price": "$5", "shell": "${HOME}"}));
}

#[test]
fn test_omitted_values_disappear() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"optional": ["#one-of", ["False", "never"]]})];

    let result = engine
        .resolve(
            r#"{"a": "${optional}", "b": ["x", "${optional}", "y"], "c": "prefix-${optional}"}"#,
            &bindings,
        )
        .unwrap();
    assert_eq!(result, json!({"b": ["x", "y"]}));
}

#[test]
fn test_labeled_object_tags_merge() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"ha": true})];

    let result = engine
        .resolve(
            r##"{
                "name": "db",
                "#one-of:replicas": [["${ha}", {"replicas": 3}], {"replicas": 1}],
                "#one-of:backup": [["${ha} == False", {"backup": "none"}]]
            }"##,
            &bindings,
        )
        .unwrap();
    assert_eq!(result, json!({"name": "db", "replicas": 3}));
}

#[test]
fn test_unknown_tag_suggests_similar_names() {
    let mut engine = TemplateEngine::default();
    let err = engine.resolve(r##"["#lenn", "abc"]"##, &[]).unwrap_err();
    match err {
        TemplateError::UnknownTag { name, suggestions } => {
            assert_eq!(name, "lenn");
            assert!(suggestions.contains(&"len".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unresolvable_parameter_suggests_known_names() {
    let mut engine = TemplateEngine::default();
    let err = engine.resolve(r#""${hostnme}""#, &[json!({"hostname": "web"})]).unwrap_err();
    match err {
        TemplateError::UnresolvableParameter { parameter, suggestions } => {
            assert_eq!(parameter, "hostnme");
            assert_eq!(suggestions.first().map(String::as_str), Some("hostname"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unterminated_reference_is_malformed() {
    let mut engine = TemplateEngine::default();
    let err = engine.resolve(r#""${name""#, &[json!({"name": 1})]).unwrap_err();
    assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
}

#[test]
fn test_stats_count_every_lookup() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"a": 1, "b": 2, "list": [1, 2, 3]})];

    engine
        .resolve(r##"["${a}", "${a}${b}", ["#for-each", "${list}", "${_index_}"]]"##, &bindings)
        .unwrap();
    let stats = engine.stats();
    assert_eq!(stats.count("a"), 2);
    assert_eq!(stats.count("_index_"), 3);
    assert_eq!(stats.count("b"), 1);
    assert_eq!(stats.count("list"), 1);
    assert_eq!(stats.count("missing"), 0);
}

/// Loads a template from `sub/` and fails without unloading it.
struct AbandonTag;

impl Tag for AbandonTag {
    fn name(&self) -> &'static str {
        "abandon"
    }

    fn process(&self, _: &[Value], _: &[&Value], resolver: &mut Resolver<'_>) -> Result<Option<Value>> {
        resolver.loader().load("sub/main.json")?;
        Err(TemplateError::malformed("abandoned"))
    }
}

#[test]
fn test_next_run_starts_from_the_template_home() {
    let dir = TemplateDir::new().unwrap();
    dir.write("main.json", r#"{"ok": "top"}"#).unwrap();
    dir.write("sub/main.json", r#"{"ok": "sub"}"#).unwrap();
    dir.write("bad.json", r##"["#abandon"]"##).unwrap();

    let mut engine =
        TemplateEngine::builder().with_template_home(dir.path()).with_tag(AbandonTag).build();
    assert!(engine.resolve("bad.json", &[]).is_err());
    assert_eq!(engine.resolve("main.json", &[]).unwrap(), json!({"ok": "top"}));
}
