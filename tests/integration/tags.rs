//! Built-in tags and custom tag registration through the engine.

use jsonteng::core::{Result, TemplateError};
use jsonteng::tags::{Tag, TagRegistry, check_arity};
use jsonteng::templating::{Resolver, TemplateEngine};
use jsonteng::test_utils::TemplateDir;
use serde_json::{Value, json};

/// Joins its resolved string arguments with `-`.
struct JoinTag;

impl Tag for JoinTag {
    fn name(&self) -> &'static str {
        "join"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        let mut parts = Vec::new();
        for token in tokens {
            match resolver.resolve(token, bindings)? {
                Some(Value::String(s)) => parts.push(s),
                Some(other) => parts.push(other.to_string()),
                None => {}
            }
        }
        Ok(Some(Value::String(parts.join("-"))))
    }
}

/// Always produces nothing.
struct DropTag;

impl Tag for DropTag {
    fn name(&self) -> &'static str {
        "drop"
    }

    fn process(&self, tokens: &[Value], _: &[&Value], _: &mut Resolver<'_>) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 0)?;
        Ok(None)
    }
}

#[test]
fn test_custom_tags_through_builder_and_engine() {
    let mut engine = TemplateEngine::builder().with_tag(JoinTag).build();
    engine.register_tag(DropTag);
    assert!(engine.tag_names().contains(&"join"));
    assert!(engine.tag_names().contains(&"drop"));

    let result = engine
        .resolve(
            r##"{"id": ["#join", "${site}", "${rack}", ["#drop"]], "gone": ["#drop"]}"##,
            &[json!({"site": "fra", "rack": 4})],
        )
        .unwrap();
    assert_eq!(result, json!({"id": "fra-4"}));
}

#[test]
fn test_registering_replaces_an_existing_tag() {
    struct FixedLen;
    impl Tag for FixedLen {
        fn name(&self) -> &'static str {
            "len"
        }
        fn process(&self, _: &[Value], _: &[&Value], _: &mut Resolver<'_>) -> Result<Option<Value>> {
            Ok(Some(json!(0)))
        }
    }

    let mut registry = TagRegistry::core();
    assert!(registry.register(Box::new(FixedLen)).is_some());
    let mut engine = TemplateEngine::builder().with_tags(registry).build();
    assert_eq!(engine.resolve(r##"["#len", "abc"]"##, &[]).unwrap(), json!(0));
}

#[test]
fn test_conditional_selection_from_bindings() {
    let template = r##"{
        "tier": ["#one-of", ["${cpu} >= 8 and '${env}' == 'prod'", "gold"], ["${cpu} >= 4", "silver"], "bronze"],
        "debug": ["#one-of", ["not ${prod}", true]]
    }"##;
    let mut engine = TemplateEngine::default();

    let result = engine.resolve(template, &[json!({"cpu": 8, "env": "prod", "prod": true})]).unwrap();
    assert_eq!(result, json!({"tier": "gold"}));

    let result = engine.resolve(template, &[json!({"cpu": 4, "env": "prod", "prod": false})]).unwrap();
    assert_eq!(result, json!({"tier": "silver", "debug": true}));

    let result = engine.resolve(template, &[json!({"cpu": 1, "env": "dev", "prod": true})]).unwrap();
    assert_eq!(result, json!({"tier": "bronze"}));
}

#[test]
fn test_optional_parameters_with_exists() {
    let template = r##"{
        "mtu": ["#one-of", [["#exists", "${mtu}"], "${mtu}"], 1500]
    }"##;
    let mut engine = TemplateEngine::default();

    assert_eq!(engine.resolve(template, &[json!({"mtu": 9000})]).unwrap(), json!({"mtu": 9000}));
    assert_eq!(engine.resolve(template, &[json!({})]).unwrap(), json!({"mtu": 1500}));
}

#[test]
fn test_element_access_and_length() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"zones": ["a", "b", "c"], "map": {"a": 1}, "i": "2"})];

    let result = engine
        .resolve(
            r##"{
                "last": ["#at", "${zones}", "${i}"],
                "mapped": ["#at", "${map}", "a"],
                "count": ["#len", "${zones}"],
                "chars": ["#len", "naïve"]
            }"##,
            &bindings,
        )
        .unwrap();
    assert_eq!(result, json!({"last": "c", "mapped": 1, "count": 3, "chars": 5}));

    let err = engine.resolve(r##"["#at", "${zones}", 3]"##, &bindings).unwrap_err();
    assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
}

#[test]
fn test_conversions_of_interpolated_strings() {
    let mut engine = TemplateEngine::default();
    let bindings = [json!({"base": 80, "offset": 80, "on": "True", "ratio": "0.5"})];

    let result = engine
        .resolve(
            r##"[["#to-int", "${base}${offset}"], ["#to-bool", "${on}"], ["#to-float", "${ratio}"], ["#to-null", "NULL"]]"##,
            &bindings,
        )
        .unwrap();
    assert_eq!(result, json!([8080, true, 0.5, null]));
}

#[test]
fn test_for_each_with_file_template_and_condition() {
    let dir = TemplateDir::new().unwrap();
    dir.write("disk.json", r#"{"name": "disk${_index_}", "gb": "${gb}"}"#).unwrap();

    let mut engine = TemplateEngine::builder().with_template_home(dir.path()).build();
    let result = engine
        .resolve(
            r##"["#for-each", "${disks}", "disk.json", "${gb} > 10"]"##,
            &[json!({"disks": [{"gb": 5}, {"gb": 20}, {"gb": 40}]})],
        )
        .unwrap();
    assert_eq!(result, json!([{"name": "disk1", "gb": 20}, {"name": "disk2", "gb": 40}]));
}

#[test]
fn test_for_each_requires_a_list() {
    let mut engine = TemplateEngine::default();
    let err = engine
        .resolve(r##"["#for-each", "${disks}", "{}"]"##, &[json!({"disks": {"gb": 5}})])
        .unwrap_err();
    assert!(matches!(err, TemplateError::MalformedTemplate { .. }));

    let err = engine.resolve(r##"["#for-each", "${disks}"]"##, &[json!({"disks": []})]).unwrap_err();
    assert!(matches!(err, TemplateError::TagArity { .. }));
}

#[test]
fn test_ipv4_tags() {
    let mut engine = TemplateEngine::default();
    let result = engine
        .resolve(
            r##"{
                "subnet": ["#ipv4-subnet", "${cidr}", 4, 1],
                "gateway": ["#ipv4-host-gateway", "${cidr}"],
                "netmask": ["#ipv4-host-netmask", "${cidr}"],
                "vip": ["#ipv4-host-ip", "${cidr}", 100]
            }"##,
            &[json!({"cidr": "192.168.0.0/16"})],
        )
        .unwrap();
    assert_eq!(
        result,
        json!({
            "subnet": "192.168.64.0/18",
            "gateway": "192.168.0.1",
            "netmask": "255.255.0.0",
            "vip": "192.168.0.100"
        })
    );
}

#[test]
fn test_arity_errors_name_the_tag() {
    let mut engine = TemplateEngine::default();
    let err = engine.resolve(r##"["#len", 1, 2]"##, &[]).unwrap_err();
    assert_eq!(err.to_string(), r#"Tag "len" requires 1 parameter. Parameters given [1,2]"#);
}
