//! Error types for schema generation and delta merging.

use thiserror::Error;

/// Error returned when a callable cannot be described as a tool schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The callable's parameter list could not be obtained.
    #[error("failed to get signature for function {function}: {reason}")]
    SignatureIntrospection {
        /// Name of the callable, possibly empty.
        function: String,
        /// What went wrong while reading the signature.
        reason: String,
    },

    /// A list parameter declares an element type outside the schema vocabulary,
    /// or more than one element type.
    #[error("parameter `{parameter}`: type {declared} not supported")]
    TypeConversion {
        /// Offending parameter name.
        parameter: String,
        /// Rendered declaration of the unsupported type.
        declared: String,
    },
}

impl SchemaError {
    /// Create a signature introspection error.
    pub fn introspection<F: ToString, R: ToString>(function: F, reason: R) -> Self {
        SchemaError::SignatureIntrospection {
            function: function.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion<P: ToString, D: ToString>(parameter: P, declared: D) -> Self {
        SchemaError::TypeConversion {
            parameter: parameter.to_string(),
            declared: declared.to_string(),
        }
    }
}

/// Error returned when a streamed delta does not fit the accumulator's shape.
///
/// Paths are dotted field paths from the accumulator root, with tool-call
/// slots rendered as `tool_calls[i]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The delta names a field the accumulator was never seeded with.
    #[error("accumulator has no field `{0}`")]
    MissingField(String),

    /// A text delta targets a field that does not hold text.
    #[error("accumulator field `{0}` does not hold text")]
    NotText(String),

    /// A nested delta targets a field that is not an object.
    #[error("accumulator field `{0}` is not an object")]
    NotObject(String),

    /// The accumulator's tool-call slots are not held in an array.
    #[error("accumulator field `{0}` is not an array")]
    NotArray(String),

    /// A tool-call element lacks a non-negative integer `index`.
    #[error("tool call fragment has no valid `index`")]
    InvalidIndex,

    /// A tool-call element addresses a slot the accumulator does not have.
    #[error("tool call index {index} has no slot (accumulator holds {slots})")]
    MissingSlot {
        /// Index carried by the fragment.
        index: usize,
        /// Number of slots currently in the accumulator.
        slots: usize,
    },
}
