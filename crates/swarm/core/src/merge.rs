//! In-place merging of streamed response deltas.
//!
//! Merge rules:
//! - Text in the delta is appended to the text already held by the accumulator
//! - Objects merge recursively into the matching accumulator object
//! - `null`, numbers, booleans and arrays in the delta are skipped
//! - A top-level `role` is never merged
//! - The first `tool_calls` element is merged into the accumulator slot named
//!   by its `index`, not appended
//!
//! The accumulator must be seeded with every field a delta can touch; see
//! [`ResponseAccumulator`](crate::accumulator::ResponseAccumulator) for the
//! standard chat-completion shape.

use crate::error::MergeError;
use serde_json::{Map, Value};

const ROLE: &str = "role";
const TOOL_CALLS: &str = "tool_calls";
const INDEX: &str = "index";

/// Recursively merge `source` into `target`.
///
/// Neither side is special-cased: no keys are skipped and `tool_calls` arrays
/// are ignored. Non-object sources are a no-op.
///
/// # Errors
/// Returns a [`MergeError`] when `source` addresses a field `target` lacks, or
/// a field of the wrong shape. `target` may be partially updated.
pub fn merge_fields(target: &mut Value, source: &Value) -> Result<(), MergeError> {
    match source {
        Value::Object(fields) => merge_object(target, fields, None, ""),
        _ => Ok(()),
    }
}

/// Merge one streamed delta into the accumulator.
///
/// `role` is dropped before merging. When the delta carries `tool_calls`, only
/// its first element is used; its `index` selects the accumulator slot and is
/// not itself merged.
///
/// # Errors
/// - [`MergeError::InvalidIndex`] when the tool-call element has no usable `index`.
/// - [`MergeError::MissingSlot`] when the accumulator has no slot at that index.
/// - Any error from [`merge_fields`].
pub fn merge_chunk(accumulator: &mut Value, delta: &Value) -> Result<(), MergeError> {
    let Value::Object(fields) = delta else {
        return Ok(());
    };
    merge_object(accumulator, fields, Some(ROLE), "")?;

    let Some(call) = first_tool_call(fields) else {
        return Ok(());
    };
    let call = call.as_object().ok_or(MergeError::InvalidIndex)?;
    let index = tool_call_index(call)?;

    let slots = match accumulator.get_mut(TOOL_CALLS) {
        Some(Value::Array(slots)) => slots,
        Some(_) => return Err(MergeError::NotArray(TOOL_CALLS.into())),
        None => return Err(MergeError::MissingField(TOOL_CALLS.into())),
    };
    let count = slots.len();
    let slot = slots.get_mut(index).ok_or(MergeError::MissingSlot {
        index,
        slots: count,
    })?;
    merge_object(slot, call, Some(INDEX), &format!("{TOOL_CALLS}[{index}]"))
}

/// The tool-call element a delta carries, if any.
fn first_tool_call(fields: &Map<String, Value>) -> Option<&Value> {
    let calls = fields.get(TOOL_CALLS)?.as_array()?;
    if calls.len() > 1 {
        tracing::warn!(
            count = calls.len(),
            "delta carries several tool call fragments, merging the first only"
        );
    }
    calls.first()
}

pub(crate) fn tool_call_index(call: &Map<String, Value>) -> Result<usize, MergeError> {
    call.get(INDEX)
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or(MergeError::InvalidIndex)
}

fn merge_object(
    target: &mut Value,
    source: &Map<String, Value>,
    skip: Option<&str>,
    path: &str,
) -> Result<(), MergeError> {
    let Some(target) = target.as_object_mut() else {
        let path = if path.is_empty() { "$" } else { path };
        return Err(MergeError::NotObject(path.to_string()));
    };

    for (key, value) in source {
        if skip == Some(key.as_str()) {
            continue;
        }
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        match value {
            Value::String(text) => match target.get_mut(key) {
                Some(Value::String(acc)) => acc.push_str(text),
                Some(_) => return Err(MergeError::NotText(child)),
                None => return Err(MergeError::MissingField(child)),
            },
            Value::Object(nested) => match target.get_mut(key) {
                Some(slot) => merge_object(slot, nested, None, &child)?,
                None => return Err(MergeError::MissingField(child)),
            },
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) => {}
        }
    }
    Ok(())
}
