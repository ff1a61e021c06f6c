use std::fmt;

use crate::{ast::function::FunctionId, types::object::ObjectType};

/// Synthesis of the generic list object type.
pub mod list;
/// Object types: fields, methods and the parent chain.
pub mod object;
/// The interning registry that owns every type.
pub mod registry;

pub use registry::TypeRegistry;

/// Handle of a type inside a [`TypeRegistry`].
///
/// Structural types are interned, so two handles are equal exactly when they
/// denote the same type. The builtin types have fixed handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    /// `Int`
    pub const INT: Self = Self(0);
    /// `Float`
    pub const FLOAT: Self = Self(1);
    /// `Bool`
    pub const BOOL: Self = Self(2);
    /// `Char`
    pub const CHAR: Self = Self(3);
    /// `Void`
    pub const VOID: Self = Self(4);
    /// The builtin `Object` base type, the type of `None`.
    pub const OBJECT: Self = Self(5);

    /// Position of the type in its registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `Int`, a 64 bit signed integer.
    Integer,
    /// `Float`, a 64 bit float.
    Float,
    /// `Bool`
    Boolean,
    /// `Char`, the type of string literals.
    Char,
    /// `Void`, the absence of a value.
    Void,
}

impl PrimitiveType {
    /// All primitives in handle order.
    pub const ALL: [Self; 5] = [Self::Integer, Self::Float, Self::Boolean, Self::Char, Self::Void];

    /// The source name of the primitive.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "Int",
            Self::Float => "Float",
            Self::Boolean => "Bool",
            Self::Char => "Char",
            Self::Void => "Void",
        }
    }

    /// Looks a primitive up by its source name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The fixed handle of the primitive.
    #[must_use]
    pub const fn id(self) -> TypeId {
        match self {
            Self::Integer => TypeId::INT,
            Self::Float => TypeId::FLOAT,
            Self::Boolean => TypeId::BOOL,
            Self::Char => TypeId::CHAR,
            Self::Void => TypeId::VOID,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A list type: an object type generated for one element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListType {
    /// The element type.
    pub element: TypeId,
    /// The generated object layout and methods.
    pub object:  ObjectType,
}

/// Every kind of type the language knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A builtin scalar.
    Primitive(PrimitiveType),
    /// A declared object type, or the builtin `Object` base.
    Object(ObjectType),
    /// `<T>`, a fixed size array of `T`.
    Array(TypeId),
    /// `&T`
    Reference(TypeId),
    /// `[T]`, a growable list of `T`.
    List(ListType),
}

impl Type {
    /// The object layout of object and list types.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(object) | Self::List(ListType { object, .. }) => Some(object),
            _ => None,
        }
    }

    /// Mutable access to the object layout of object and list types.
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectType> {
        match self {
            Self::Object(object) | Self::List(ListType { object, .. }) => Some(object),
            _ => None,
        }
    }

    /// Returns `true` for object and list types.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        self.as_object().is_some()
    }

    /// Returns the method registered under `name` directly on this type.
    #[must_use]
    pub fn own_method(&self, name: &str) -> Option<FunctionId> {
        self.as_object()
            .and_then(|object| object.node.methods.get(name).copied())
    }
}
