use crate::error::ParamTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of primitive value types a parameter may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Tuple,
    List,
    Dict,
    Set,
    FrozenSet,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Complex => "complex",
            PrimitiveType::Str => "str",
            PrimitiveType::Bytes => "bytes",
            PrimitiveType::Tuple => "tuple",
            PrimitiveType::List => "list",
            PrimitiveType::Dict => "dict",
            PrimitiveType::Set => "set",
            PrimitiveType::FrozenSet => "frozenset",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let primitive = match tag {
            "bool" => PrimitiveType::Bool,
            "int" => PrimitiveType::Int,
            "float" => PrimitiveType::Float,
            "complex" => PrimitiveType::Complex,
            "str" | "string" => PrimitiveType::Str,
            "bytes" => PrimitiveType::Bytes,
            "tuple" => PrimitiveType::Tuple,
            "list" => PrimitiveType::List,
            "dict" => PrimitiveType::Dict,
            "set" => PrimitiveType::Set,
            "frozenset" => PrimitiveType::FrozenSet,
            _ => return None,
        };
        Some(primitive)
    }
}

/// Containers that may be parameterized with a single primitive element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerKind {
    List,
    Set,
    Tuple,
    FrozenSet,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::List => "list",
            ContainerKind::Set => "set",
            ContainerKind::Tuple => "tuple",
            ContainerKind::FrozenSet => "frozenset",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "list" => Some(ContainerKind::List),
            "set" => Some(ContainerKind::Set),
            "tuple" => Some(ContainerKind::Tuple),
            "frozenset" => Some(ContainerKind::FrozenSet),
            _ => None,
        }
    }
}

/// A validated parameter type: a primitive, or a one-level container of a primitive.
///
/// Serialized as its type tag (`"int"`, `"list[str]"`), so invalid tags coming from
/// an oracle are rejected while deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    Primitive(PrimitiveType),
    Container {
        kind: ContainerKind,
        element: PrimitiveType,
    },
}

impl FromStr for ParamType {
    type Err = ParamTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.trim();
        let Some(open) = tag.find('[') else {
            return PrimitiveType::from_tag(tag)
                .map(ParamType::Primitive)
                .ok_or_else(|| ParamTypeError::Unknown(tag.to_string()));
        };

        let container = tag[..open].trim();
        let inner = tag[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| ParamTypeError::Malformed(tag.to_string()))?
            .trim();

        let kind = ContainerKind::from_tag(container)
            .ok_or_else(|| ParamTypeError::Unknown(tag.to_string()))?;
        let element =
            PrimitiveType::from_tag(inner).ok_or_else(|| ParamTypeError::InvalidElement {
                container: container.to_string(),
                element: inner.to_string(),
            })?;

        Ok(ParamType::Container { kind, element })
    }
}

impl TryFrom<String> for ParamType {
    type Error = ParamTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

impl From<PrimitiveType> for ParamType {
    fn from(value: PrimitiveType) -> Self {
        ParamType::Primitive(value)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Primitive(p) => write!(f, "{}", p.as_str()),
            ParamType::Container { kind, element } => {
                write!(f, "{}[{}]", kind.as_str(), element.as_str())
            }
        }
    }
}

/// A named, typed value flowing between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(alias = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The key a producer's output and a consumer's input must share to be wired together.
    pub fn key(&self) -> ParamKey {
        ParamKey {
            name: self.name.clone(),
            param_type: self.param_type,
        }
    }
}

/// The `(name, type)` pair used to match producers with consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamKey {
    pub name: String,
    pub param_type: ParamType,
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.param_type)
    }
}
