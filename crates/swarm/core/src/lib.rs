//! Tool schemas and streamed-response assembly for function-calling agents.
//!
//! This crate provides:
//! - [`Signature`] and [`DeclaredType`]: a callable's parameter list captured as data
//! - [`generate`] / [`function_to_json`]: signature → `{"type": "function", ...}` tool schema
//! - [`merge_chunk`]: in-place merge of one streamed delta into an accumulator
//! - [`ResponseAccumulator`]: seeded accumulator for chat-completion streams
//! - [`SwarmConfig`] and [`init_tracing`]: logging configuration
//!
//! # Example
//! ```
//! use swarm_core::{DeclaredType, ParameterDescriptor, Signature, generate};
//!
//! let sig = Signature::new("get_weather")
//!     .with_description("Get the weather for a location.")
//!     .param(ParameterDescriptor::of::<String>("location"))
//!     .param(
//!         ParameterDescriptor::new("unit")
//!             .typed(DeclaredType::described(DeclaredType::string(), "celsius or fahrenheit"))
//!             .with_default(),
//!     );
//!
//! let tool = generate(&sig).unwrap().to_value();
//! assert_eq!(tool["function"]["parameters"]["required"], serde_json::json!(["location"]));
//! ```

pub mod accumulator;
pub mod config;
pub mod error;
pub mod logging;
pub mod merge;
pub mod schema;
pub mod signature;

pub use accumulator::ResponseAccumulator;
pub use config::{LoggingConfig, SwarmConfig};
pub use error::{MergeError, SchemaError};
pub use logging::{debug_print, init_tracing};
pub use merge::{merge_chunk, merge_fields};
pub use schema::{
    FunctionSchema, ItemsSchema, JsonType, ParametersSchema, PropertySchema, ToolKind,
    ToolSchema, function_to_json, generate,
};
pub use signature::{
    Annotation, Declare, DeclaredType, Introspect, ParameterDescriptor, Primitive, Signature,
};
