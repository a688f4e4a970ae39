//! The `len` tag.

use super::{Tag, check_arity};
use crate::core::Result;
use crate::templating::Resolver;
use serde_json::Value;

/// `["#len", value]`: entry count of an array or object, character count of a
/// string, `-1` for anything else.
pub struct LenTag;

impl Tag for LenTag {
    fn name(&self) -> &'static str {
        "len"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let len = match resolver.resolve(&tokens[0], bindings)? {
            Some(Value::Array(items)) => items.len() as i64,
            Some(Value::Object(map)) => map.len() as i64,
            Some(Value::String(s)) => s.chars().count() as i64,
            _ => -1,
        };
        Ok(Some(Value::from(len)))
    }
}
