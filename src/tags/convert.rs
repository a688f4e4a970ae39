//! Type conversion tags: `to-bool`, `to-int`, `to-float` and `to-null`.
//!
//! Each takes one argument that must resolve to a string. They exist because
//! interpolation into a larger string always yields a string, e.g.
//! `["#to-int", "${base}${offset}"]`.

use super::{Tag, check_arity, resolve_string_arg};
use crate::core::{Result, TemplateError};
use crate::templating::Resolver;
use serde_json::{Number, Value};

fn invalid(tag: &str, text: &str) -> TemplateError {
    TemplateError::malformed(format!("Tag \"{tag}\" invalid string \"{text}\""))
}

/// `"true"`/`"false"`, case-insensitive, to a boolean.
pub struct ToBoolTag;

impl Tag for ToBoolTag {
    fn name(&self) -> &'static str {
        "to-bool"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let text = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(Value::Bool(true))),
            "false" => Ok(Some(Value::Bool(false))),
            _ => Err(invalid(self.name(), &text)),
        }
    }
}

/// Decimal integer string to a number.
pub struct ToIntTag;

impl Tag for ToIntTag {
    fn name(&self) -> &'static str {
        "to-int"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let text = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        let number: i64 = text.trim().parse().map_err(|_| invalid(self.name(), &text))?;
        Ok(Some(Value::from(number)))
    }
}

/// Floating point string to a number.
pub struct ToFloatTag;

impl Tag for ToFloatTag {
    fn name(&self) -> &'static str {
        "to-float"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let text = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        // NaN and infinities have no JSON representation
        let number = text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| invalid(self.name(), &text))?;
        Ok(Some(Value::Number(number)))
    }
}

/// `"null"`, case-insensitive, to null.
pub struct ToNullTag;

impl Tag for ToNullTag {
    fn name(&self) -> &'static str {
        "to-null"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let text = resolve_string_arg(self.name(), &tokens[0], bindings, resolver)?;
        if text.eq_ignore_ascii_case("null") {
            Ok(Some(Value::Null))
        } else {
            Err(invalid(self.name(), &text))
        }
    }
}
