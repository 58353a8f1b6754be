//! Derives inspectable fragments from a buffered request body.
//!
//! Extraction order is fixed: the whole raw body first, then decoded form
//! fields in document order, then JSON string leaves in traversal order.
//! Decoding failures are soft: they only shrink the set of fragments, the raw
//! body fragment is always produced.
//!
//! JSON nesting depth is unbounded: documents deeper than serde_json's
//! recursion limit go through [`json::parse_deep`], and trees are walked and
//! dismantled with an explicit work list.

use serde_json::Value;
use url::form_urlencoded;

use crate::inspection::fragment::{InspectableFragment, Location};
use crate::inspection::json;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Splits a body into fragments according to its declared content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyExtractor;

impl BodyExtractor {
    pub fn extract<'a>(body: &'a [u8], content_type: Option<&str>) -> Vec<InspectableFragment<'a>> {
        let mut fragments = vec![InspectableFragment::new(
            Location::Body,
            String::from_utf8_lossy(body),
        )];

        let content_type = content_type.map(str::to_ascii_lowercase).unwrap_or_default();

        if content_type.contains(FORM_CONTENT_TYPE) {
            match decode_form(body) {
                Some(fields) => {
                    fragments.extend(fields.into_iter().map(|(name, value)| {
                        InspectableFragment::new(Location::FormField(name), value)
                    }));
                }
                None => tracing::debug!("Form body failed to decode; inspecting raw body only"),
            }
        }

        if content_type.contains(JSON_CONTENT_TYPE) {
            match parse_json(body) {
                Ok(tree) => visit_strings(tree, |leaf| {
                    fragments.push(InspectableFragment::new(Location::Json, leaf));
                }),
                Err(e) => tracing::debug!(error = %e, "JSON body failed to parse; inspecting raw body only"),
            }
        }

        fragments
    }
}

/// Decode `application/x-www-form-urlencoded` pairs.
///
/// Returns `None` when the body contains a malformed percent-escape.
fn decode_form(body: &[u8]) -> Option<Vec<(String, String)>> {
    if !has_valid_percent_escapes(body) {
        return None;
    }
    Some(form_urlencoded::parse(body).into_owned().collect())
}

fn has_valid_percent_escapes(input: &[u8]) -> bool {
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' {
            match input.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

fn parse_json(body: &[u8]) -> Result<Value, json::JsonError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(tree) => Ok(tree),
        Err(e) if json::is_recursion_limit(&e) => json::parse_deep(body),
        Err(e) => Err(e.into()),
    }
}

/// Visit every string leaf of a JSON tree in traversal order.
///
/// Object values and array elements are descended into; numbers, booleans
/// and nulls are skipped. The tree is consumed so no node is dropped with
/// children still attached.
pub fn visit_strings<F>(root: Value, mut visit: F)
where
    F: FnMut(String),
{
    let mut pending = vec![root];
    while let Some(value) = pending.pop() {
        match value {
            Value::String(s) => visit(s),
            Value::Array(items) => pending.extend(items.into_iter().rev()),
            Value::Object(entries) => pending.extend(entries.into_iter().rev().map(|(_, v)| v)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}
