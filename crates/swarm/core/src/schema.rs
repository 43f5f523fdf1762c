//! Tool schema generation from captured signatures.
//!
//! Output format:
//! ```json
//! {
//!   "type": "function",
//!   "function": {
//!     "name": "...",
//!     "description": "...",
//!     "parameters": {
//!       "type": "object",
//!       "properties": { ... },
//!       "required": [ ... ],
//!       "additionalProperties": false
//!     }
//!   }
//! }
//! ```

use crate::error::SchemaError;
use crate::signature::{Annotation, DeclaredType, Introspect, Primitive, Signature};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The closed set of schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Array => "array",
            JsonType::Object => "object",
            JsonType::Null => "null",
        }
    }
}

impl From<Primitive> for JsonType {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Str => JsonType::String,
            Primitive::Int => JsonType::Integer,
            Primitive::Float => JsonType::Number,
            Primitive::Bool => JsonType::Boolean,
            Primitive::List => JsonType::Array,
            Primitive::Dict => JsonType::Object,
            Primitive::NoneType => JsonType::Null,
        }
    }
}

/// Element type of an array property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsSchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
}

/// Schema for a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present only when `kind` is [`JsonType::Array`] and the element type is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,
}

impl PropertySchema {
    pub fn new(kind: JsonType) -> Self {
        Self {
            kind,
            description: None,
            items: None,
        }
    }

    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::from(self.kind.as_str()));
        if let Some(d) = &self.description {
            obj.insert("description".into(), Value::from(d.as_str()));
        }
        if let Some(items) = &self.items {
            obj.insert("items".into(), json!({ "type": items.kind.as_str() }));
        }
        Value::Object(obj)
    }
}

/// The closed object schema describing all parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
    /// Properties in signature order.
    pub properties: IndexMap<String, PropertySchema>,
    /// Names of parameters without a default, in signature order.
    pub required: Vec<String>,
    pub additional_properties: bool,
}

/// Name, description and parameters of one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    /// Empty when the callable has no description.
    pub description: String,
    pub parameters: ParametersSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
}

/// A complete tool definition, ready to be sent in a tool-calling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub function: FunctionSchema,
}

impl ToolSchema {
    /// Render as a JSON value. Property order follows the signature.
    pub fn to_value(&self) -> Value {
        let params = &self.function.parameters;
        let properties: Map<String, Value> = params
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), prop.to_value()))
            .collect();
        json!({
            "type": "function",
            "function": {
                "name": self.function.name,
                "description": self.function.description,
                "parameters": {
                    "type": params.kind.as_str(),
                    "properties": properties,
                    "required": params.required,
                    "additionalProperties": params.additional_properties,
                }
            }
        })
    }
}

/// Generate the tool schema for a callable.
///
/// # Errors
/// - [`SchemaError::SignatureIntrospection`] when the callable cannot report a
///   valid signature.
/// - [`SchemaError::TypeConversion`] when a list parameter declares an
///   unsupported or multi-argument element type.
pub fn generate<F: Introspect + ?Sized>(callable: &F) -> Result<ToolSchema, SchemaError> {
    let signature = callable.signature()?;
    function_to_json(&signature)
}

/// Generate the tool schema for an already captured signature.
pub fn function_to_json(signature: &Signature) -> Result<ToolSchema, SchemaError> {
    signature.validate()?;

    let mut properties = IndexMap::with_capacity(signature.parameters.len());
    for param in &signature.parameters {
        let prop = match &param.declared_type {
            None => PropertySchema::new(JsonType::String),
            Some(ty) => resolve_parameter(&param.name, ty)?,
        };
        properties.insert(param.name.clone(), prop);
    }

    let required: Vec<String> = signature
        .parameters
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name.clone())
        .collect();

    tracing::debug!(
        tool = %signature.name,
        parameters = properties.len(),
        required = required.len(),
        "generated tool schema"
    );

    Ok(ToolSchema {
        kind: ToolKind::Function,
        function: FunctionSchema {
            name: signature.name.clone(),
            description: signature.description.clone().unwrap_or_default(),
            parameters: ParametersSchema {
                kind: JsonType::Object,
                properties,
                required,
                additional_properties: false,
            },
        },
    })
}

fn resolve_parameter(name: &str, ty: &DeclaredType) -> Result<PropertySchema, SchemaError> {
    match ty {
        DeclaredType::Annotated { inner, metadata } => match metadata.as_slice() {
            [Annotation::Text(description)] => {
                let mut prop = resolve_value(name, inner)?;
                prop.description = Some(description.clone());
                Ok(prop)
            }
            _ => Ok(PropertySchema::new(JsonType::String)),
        },
        other => resolve_value(name, other),
    }
}

fn resolve_value(name: &str, ty: &DeclaredType) -> Result<PropertySchema, SchemaError> {
    let prop = match ty {
        DeclaredType::Primitive(p) => PropertySchema::new((*p).into()),
        DeclaredType::Optional(inner) => return resolve_value(name, inner),
        DeclaredType::List(args) => {
            let items = match args.as_slice() {
                [] => None,
                [element] => {
                    let kind = element_type(element)
                        .ok_or_else(|| SchemaError::type_conversion(name, ty))?;
                    Some(ItemsSchema { kind })
                }
                _ => return Err(SchemaError::type_conversion(name, ty)),
            };
            PropertySchema {
                kind: JsonType::Array,
                description: None,
                items,
            }
        }
        DeclaredType::Dict(_) => PropertySchema::new(JsonType::Object),
        // Nested annotations and unknown types degrade to text.
        DeclaredType::Annotated { .. } | DeclaredType::Named(_) => {
            PropertySchema::new(JsonType::String)
        }
    };
    Ok(prop)
}

/// Element types resolve through the fixed table only, one level deep.
fn element_type(ty: &DeclaredType) -> Option<JsonType> {
    match ty {
        DeclaredType::Primitive(p) => Some((*p).into()),
        DeclaredType::Optional(inner) => match inner.as_ref() {
            DeclaredType::Primitive(p) => Some((*p).into()),
            _ => None,
        },
        DeclaredType::List(args) if args.is_empty() => Some(JsonType::Array),
        DeclaredType::Dict(args) if args.is_empty() => Some(JsonType::Object),
        _ => None,
    }
}
