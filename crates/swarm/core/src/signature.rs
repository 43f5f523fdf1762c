//! Captured callable signatures.
//!
//! Rust has no runtime reflection over function parameters, so a tool's
//! signature is captured once, as data, when the tool is registered. The
//! [`DeclaredType`] tags mirror the shapes a parameter declaration can take;
//! [`Declare`] builds them from ordinary Rust types.

use crate::error::SchemaError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Scalar and bare-container types of the fixed schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Text.
    Str,
    /// Whole numbers.
    Int,
    /// Floating point numbers.
    Float,
    /// Booleans.
    Bool,
    /// A list with no declared element type.
    List,
    /// A mapping with no declared key/value types.
    Dict,
    /// The unit / none type.
    NoneType,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Primitive::Str => "string",
            Primitive::Int => "integer",
            Primitive::Float => "float",
            Primitive::Bool => "boolean",
            Primitive::List => "list",
            Primitive::Dict => "map",
            Primitive::NoneType => "none",
        };
        f.write_str(s)
    }
}

/// Metadata attached to an annotated type.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Free-text description.
    Text(String),
    /// Any other metadata value.
    Value(serde_json::Value),
}

impl From<&str> for Annotation {
    fn from(s: &str) -> Self {
        Annotation::Text(s.to_string())
    }
}

impl From<String> for Annotation {
    fn from(s: String) -> Self {
        Annotation::Text(s)
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// A type from the fixed table.
    Primitive(Primitive),
    /// A nullable wrapper. Resolves like the wrapped type.
    Optional(Box<DeclaredType>),
    /// A list with declared element types. Exactly one is supported.
    List(Vec<DeclaredType>),
    /// A mapping with declared key/value types.
    Dict(Vec<DeclaredType>),
    /// A type with attached metadata.
    Annotated {
        /// The wrapped type.
        inner: Box<DeclaredType>,
        /// Attached metadata, in declaration order.
        metadata: Vec<Annotation>,
    },
    /// Any type outside the table, by name.
    Named(String),
}

impl DeclaredType {
    pub fn string() -> Self {
        DeclaredType::Primitive(Primitive::Str)
    }

    pub fn integer() -> Self {
        DeclaredType::Primitive(Primitive::Int)
    }

    pub fn float() -> Self {
        DeclaredType::Primitive(Primitive::Float)
    }

    pub fn boolean() -> Self {
        DeclaredType::Primitive(Primitive::Bool)
    }

    pub fn none() -> Self {
        DeclaredType::Primitive(Primitive::NoneType)
    }

    /// Wrap `inner` as nullable.
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional(Box::new(inner))
    }

    /// A list of `element`.
    pub fn list_of(element: DeclaredType) -> Self {
        DeclaredType::List(vec![element])
    }

    /// Attach a single free-text description to `inner`.
    pub fn described<D: Into<String>>(inner: DeclaredType, description: D) -> Self {
        DeclaredType::Annotated {
            inner: Box::new(inner),
            metadata: vec![Annotation::Text(description.into())],
        }
    }

    /// An opaque named type.
    pub fn named<N: Into<String>>(name: N) -> Self {
        DeclaredType::Named(name.into())
    }
}

impl From<Primitive> for DeclaredType {
    fn from(p: Primitive) -> Self {
        DeclaredType::Primitive(p)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, head: &str, args: &[DeclaredType]) -> fmt::Result {
    write!(f, "{head}<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Primitive(p) => write!(f, "{p}"),
            DeclaredType::Optional(inner) => write!(f, "optional<{inner}>"),
            DeclaredType::List(args) => write_args(f, "list", args),
            DeclaredType::Dict(args) => write_args(f, "map", args),
            DeclaredType::Annotated { inner, .. } => write!(f, "annotated<{inner}>"),
            DeclaredType::Named(name) => f.write_str(name),
        }
    }
}

/// Rust types that know their [`DeclaredType`].
pub trait Declare {
    fn declared_type() -> DeclaredType;
}

macro_rules! declare_primitive {
    ($prim:expr => $($t:ty),+ $(,)?) => {
        $(
            impl Declare for $t {
                fn declared_type() -> DeclaredType {
                    DeclaredType::Primitive($prim)
                }
            }
        )+
    };
}

declare_primitive!(Primitive::Str => String, &str, char);
declare_primitive!(Primitive::Int => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
declare_primitive!(Primitive::Float => f32, f64);
declare_primitive!(Primitive::Bool => bool);
declare_primitive!(Primitive::NoneType => ());

impl<T: Declare> Declare for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::List(vec![T::declared_type()])
    }
}

impl<T: Declare> Declare for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Optional(Box::new(T::declared_type()))
    }
}

impl<K: Declare, V: Declare, S> Declare for HashMap<K, V, S> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Dict(vec![K::declared_type(), V::declared_type()])
    }
}

impl<K: Declare, V: Declare> Declare for BTreeMap<K, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Dict(vec![K::declared_type(), V::declared_type()])
    }
}

impl Declare for serde_json::Value {
    fn declared_type() -> DeclaredType {
        DeclaredType::Named("Any".into())
    }
}

/// One parameter of a captured signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter name, unique within its signature.
    pub name: String,
    /// Declared type, `None` when the parameter is untyped.
    pub declared_type: Option<DeclaredType>,
    /// Whether the parameter has a default value (and so is not required).
    pub has_default: bool,
}

impl ParameterDescriptor {
    /// An untyped parameter without a default.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            has_default: false,
        }
    }

    /// A parameter whose type is taken from the Rust type `T`.
    pub fn of<T: Declare>(name: impl Into<String>) -> Self {
        Self::new(name).typed(T::declared_type())
    }

    pub fn typed(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    /// Mark the parameter as having a default value.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Whether the parameter must be supplied by the caller.
    pub fn is_required(&self) -> bool {
        !self.has_default
    }
}

/// A callable's captured name, description and ordered parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
}

impl Signature {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a parameter. Order of calls is the signature's parameter order.
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Check the captured signature is usable: a non-empty name and unique
    /// parameter names.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::introspection(&self.name, "function has no name"));
        }
        let mut seen = HashSet::new();
        for p in &self.parameters {
            if p.name.is_empty() {
                return Err(SchemaError::introspection(
                    &self.name,
                    "parameter with empty name",
                ));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(SchemaError::introspection(
                    &self.name,
                    format!("duplicate parameter `{}`", p.name),
                ));
            }
        }
        Ok(())
    }
}

/// A callable that can report its own signature.
///
/// Tool types implement this to be advertised through
/// [`generate`](crate::schema::generate).
pub trait Introspect {
    fn signature(&self) -> Result<Signature, SchemaError>;
}

impl Introspect for Signature {
    fn signature(&self) -> Result<Signature, SchemaError> {
        self.validate()?;
        Ok(self.clone())
    }
}

impl<T: Introspect + ?Sized> Introspect for &T {
    fn signature(&self) -> Result<Signature, SchemaError> {
        (**self).signature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_maps_rust_types() {
        assert_eq!(String::declared_type(), DeclaredType::string());
        assert_eq!(u32::declared_type(), DeclaredType::integer());
        assert_eq!(f64::declared_type(), DeclaredType::float());
        assert_eq!(
            Option::<bool>::declared_type(),
            DeclaredType::optional(DeclaredType::boolean())
        );
        assert_eq!(
            Vec::<i64>::declared_type(),
            DeclaredType::list_of(DeclaredType::integer())
        );
        assert_eq!(
            HashMap::<String, i32>::declared_type(),
            DeclaredType::Dict(vec![DeclaredType::string(), DeclaredType::integer()])
        );
    }

    #[test]
    fn display_renders_nested_declarations() {
        let t = DeclaredType::List(vec![DeclaredType::string(), DeclaredType::integer()]);
        assert_eq!(t.to_string(), "list<string, integer>");
        let t = DeclaredType::optional(DeclaredType::list_of(DeclaredType::named("Path")));
        assert_eq!(t.to_string(), "optional<list<Path>>");
    }

    #[test]
    fn descriptor_builders() {
        let p = ParameterDescriptor::of::<Option<String>>("note").with_default();
        assert_eq!(p.name, "note");
        assert!(!p.is_required());
        assert!(ParameterDescriptor::new("x").is_required());
        assert_eq!(ParameterDescriptor::new("x").declared_type, None);
    }

    #[test]
    fn validate_rejects_duplicate_parameters() {
        let sig = Signature::new("f")
            .param(ParameterDescriptor::new("a"))
            .param(ParameterDescriptor::new("a"));
        let err = sig.signature().unwrap_err();
        assert!(matches!(err, SchemaError::SignatureIntrospection { .. }));
        assert!(err.to_string().contains("duplicate parameter `a`"));
    }

    #[test]
    fn validate_rejects_missing_name() {
        let err = Signature::new("  ").signature().unwrap_err();
        assert_eq!(
            err,
            SchemaError::introspection("  ", "function has no name")
        );
    }
}
