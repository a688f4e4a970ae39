//! The `exists` tag.

use super::{Tag, check_arity};
use crate::core::Result;
use crate::templating::Resolver;
use serde_json::Value;

/// `["#exists", value]` produces `"True"` if the value resolves and `"False"` if
/// it references a parameter that no binding source defines.
///
/// The result is a string so that it can be used directly as a condition.
/// Errors other than an unresolvable parameter still propagate.
pub struct ExistsTag;

impl Tag for ExistsTag {
    fn name(&self) -> &'static str {
        "exists"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 1)?;
        let exists = match resolver.resolve(&tokens[0], bindings) {
            Ok(_) => "True",
            Err(e) if e.is_unresolvable() => "False",
            Err(e) => return Err(e),
        };
        Ok(Some(Value::String(exists.to_string())))
    }
}
