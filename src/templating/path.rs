//! Parameter path lookup.
//!
//! A parameter path such as `net.subnets[1].cidr` is split on unescaped dots.
//! Each segment names an object key, optionally followed by one or more array
//! indices (`m[0][1]`). Before a segment is applied, the whole remaining path is
//! tried as a literal key, so `{"a.b": 1}` is reachable as `a.b`.
//!
//! Lookup misses are local: they return `None` and the caller moves on to the
//! next binding source.

use super::utils::unescape_str;
use serde_json::Value;

/// Byte offsets of the unescaped `.` separators in `path`.
fn separator_indices(path: &str) -> Vec<usize> {
    let bytes = path.as_bytes();
    let mut indices = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'.' => indices.push(i),
            _ => {}
        }
        i += 1;
    }
    indices
}

/// Split a trailing `[n][m]...` suffix off a segment.
///
/// Returns `None` when the segment has no well-formed index suffix, in which case
/// the whole segment is a plain key.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let mut rest = segment;
    let mut indices = Vec::new();
    while let Some((body, pos)) =
        rest.strip_suffix(']').and_then(|s| s.rfind('[').map(|pos| (s, pos)))
    {
        let digits = &body[pos + 1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        let Ok(index) = digits.parse::<usize>() else {
            break;
        };
        indices.push(index);
        rest = &body[..pos];
    }
    if indices.is_empty() {
        return None;
    }
    indices.reverse();
    Some((rest, indices))
}

/// Apply one segment (key plus optional indices) to an object.
fn match_key<'v>(segment: &str, data: &'v Value) -> Option<&'v Value> {
    let object = data.as_object()?;
    match split_indices(segment) {
        Some((key, indices)) => {
            let mut current = object.get(unescape_str(key).as_ref())?;
            for index in indices {
                current = current.as_array()?.get(index)?;
            }
            Some(current)
        }
        None => object.get(unescape_str(segment).as_ref()),
    }
}

/// Look up `path` in a single binding source.
///
/// # Examples
///
/// ```rust
/// use jsonteng::templating::find_param;
/// use serde_json::json;
///
/// let binding = json!({"net": {"subnets": ["10.0.0.0/24", "10.0.1.0/24"]}, "a.b": 1});
/// assert_eq!(find_param("net.subnets[1]", &binding), Some(&json!("10.0.1.0/24")));
/// assert_eq!(find_param("a.b", &binding), Some(&json!(1)));
/// assert_eq!(find_param("net.missing", &binding), None);
/// ```
pub fn find_param<'v>(path: &str, binding: &'v Value) -> Option<&'v Value> {
    let separators = separator_indices(path);
    let mut current = binding;
    let mut start = 0;

    for i in 0..=separators.len() {
        if let Some(value) = match_key(&path[start..], current) {
            return Some(value);
        }
        let &end = separators.get(i)?;
        current = match_key(&path[start..end], current)?;
        start = end + 1;
    }
    None
}
