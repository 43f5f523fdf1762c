//! Assembles a complete assistant message from chat-completion stream deltas.

use crate::error::MergeError;
use crate::logging::debug_print;
use crate::merge::{merge_chunk, tool_call_index};
use serde_json::{Value, json};

/// Accumulates streaming deltas into a complete assistant message.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use swarm_core::ResponseAccumulator;
///
/// let mut acc = ResponseAccumulator::new();
/// acc.push(&json!({"role": "assistant", "content": "Hel"})).unwrap();
/// acc.push(&json!({"content": "lo"})).unwrap();
/// assert_eq!(acc.content(), "Hello");
///
/// let message = acc.finish();
/// assert_eq!(message["content"], "Hello");
/// assert!(message["tool_calls"].is_null());
/// ```
#[derive(Debug, Clone)]
pub struct ResponseAccumulator {
    message: Value,
    debug: bool,
}

impl Default for ResponseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAccumulator {
    /// Create an accumulator seeded with the chat-completion message shape.
    pub fn new() -> Self {
        Self {
            message: json!({
                "content": "",
                "role": "assistant",
                "function_call": null,
                "tool_calls": [],
            }),
            debug: false,
        }
    }

    /// Record which agent produced the message.
    pub fn with_sender<S: Into<String>>(mut self, sender: S) -> Self {
        if let Some(obj) = self.message.as_object_mut() {
            obj.insert("sender".into(), Value::String(sender.into()));
        }
        self
    }

    /// Log every received delta through [`debug_print`].
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Merge one delta.
    ///
    /// A tool-call fragment addressing the next free slot opens that slot.
    ///
    /// # Errors
    /// See [`merge_chunk`]. An index past the next free slot is reported as
    /// [`MergeError::MissingSlot`]. As with [`merge_chunk`], the delta's
    /// other fields are merged before a bad tool-call fragment is reported.
    pub fn push(&mut self, delta: &Value) -> Result<(), MergeError> {
        debug_print(self.debug, format_args!("Received completion delta: {delta}"));

        if let Some(call) = delta
            .get("tool_calls")
            .and_then(Value::as_array)
            .and_then(|calls| calls.first())
            .and_then(Value::as_object)
            && let Ok(index) = tool_call_index(call)
            && let Some(Value::Array(slots)) = self.message.get_mut("tool_calls")
            && index == slots.len()
        {
            slots.push(empty_tool_call());
        }

        merge_chunk(&mut self.message, delta)
    }

    /// Text content assembled so far.
    pub fn content(&self) -> &str {
        self.message["content"].as_str().unwrap_or_default()
    }

    /// Number of tool-call slots opened so far.
    pub fn tool_call_count(&self) -> usize {
        self.message["tool_calls"].as_array().map_or(0, Vec::len)
    }

    pub fn as_value(&self) -> &Value {
        &self.message
    }

    /// Finish the stream and return the assembled message.
    ///
    /// `tool_calls` is `null` when no tool call was streamed.
    pub fn finish(mut self) -> Value {
        if self.tool_call_count() == 0
            && let Some(obj) = self.message.as_object_mut()
        {
            obj.insert("tool_calls".into(), Value::Null);
        }
        debug_print(
            self.debug,
            format_args!("Assembled message: {}", self.message),
        );
        self.message
    }
}

fn empty_tool_call() -> Value {
    json!({
        "id": "",
        "type": "",
        "function": {"name": "", "arguments": ""},
    })
}
