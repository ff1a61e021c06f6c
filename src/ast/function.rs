use std::{fmt, ops::BitOr, ops::BitOrAssign};

use crate::{ast::statement::Statement, types::TypeId};

/// Bit set of function traits.
///
/// # Example
/// ```
/// use kvantum::ast::function::Traits;
///
/// let traits = Traits::PUBLIC | Traits::STATIC;
/// assert!(traits.contains(Traits::STATIC));
/// assert!(!traits.contains(Traits::VIRTUAL));
/// assert_eq!(Traits::from_name("override"), Some(Traits::OVERRIDE));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Traits(u8);

impl Traits {
    /// No traits.
    pub const NONE: Self = Self(0);
    /// Visible to `use` from other modules.
    pub const PUBLIC: Self = Self(1);
    /// Does not modify its receiver.
    pub const CONST: Self = Self(2);
    /// Called through the type, no `self`.
    pub const STATIC: Self = Self(4);
    /// May be overridden by derived types.
    pub const VIRTUAL: Self = Self(8);
    /// Overrides a virtual method of a parent.
    pub const OVERRIDE: Self = Self(16);
    /// The return type is fixed and must not be inferred.
    pub const EXPLICIT_TYPE: Self = Self(32);

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses a trait name as written inside `[...]`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "public" => Some(Self::PUBLIC),
            "const" => Some(Self::CONST),
            "static" => Some(Self::STATIC),
            "virtual" => Some(Self::VIRTUAL),
            "override" => Some(Self::OVERRIDE),
            _ => None,
        }
    }
}

impl BitOr for Traits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Traits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A `@name` marker on a function declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// The body is provided by the host, not by source code.
    Native,
}

impl Annotation {
    /// Parses the text of an annotation token, including the `@`.
    #[must_use]
    pub fn from_token(text: &str) -> Option<Self> {
        match text {
            "@native" => Some(Self::Native),
            _ => None,
        }
    }
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The parameter name.
    pub name: String,
    /// The declared type.
    pub ty:   TypeId,
    /// Line number in the source code.
    pub line: usize,
}

impl Parameter {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, ty: TypeId, line: usize) -> Self {
        Self { name: name.into(),
               ty,
               line }
    }
}

/// Handle of a function inside a [`FunctionArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(usize);

impl FunctionId {
    /// Position of the function in its arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A declared function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    /// The function name, without the owning type.
    pub name:        String,
    /// `Void` until declared or inferred.
    pub return_type: TypeId,
    /// Formal parameters; methods start with `self`.
    pub params:      Vec<Parameter>,
    /// The body.
    pub body:        Vec<Statement>,
    /// Declared traits.
    pub traits:      Traits,
    /// The owning object type of a method.
    pub parent:      Option<TypeId>,
    /// `@native` and friends.
    pub annotation:  Option<Annotation>,
    /// Index of the declaring module.
    pub module:      usize,
    /// Line of the declaration.
    pub line:        usize,
}

impl FunctionNode {
    /// Creates a function without parameters, body or traits.
    pub fn new(name: impl Into<String>, module: usize, line: usize) -> Self {
        Self { name: name.into(),
               return_type: TypeId::VOID,
               params: Vec::new(),
               body: Vec::new(),
               traits: Traits::NONE,
               parent: None,
               annotation: None,
               module,
               line }
    }

    /// Returns `true` for functions whose body is supplied by the host.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self.annotation, Some(Annotation::Native))
    }

    /// The parameter types in order.
    #[must_use]
    pub fn param_types(&self) -> Vec<TypeId> {
        self.params.iter().map(|param| param.ty).collect()
    }

    /// The lookup key of this function.
    #[must_use]
    pub fn identifier(&self) -> FunctionIdentifier {
        FunctionIdentifier { owner:  self.parent,
                             name:   self.name.clone(),
                             params: self.param_types() }
    }
}

/// The overload lookup key: owner, name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionIdentifier {
    /// The owning object type of a method.
    pub owner:  Option<TypeId>,
    /// The function name.
    pub name:   String,
    /// Parameter types in order.
    pub params: Vec<TypeId>,
}

impl FunctionIdentifier {
    /// Creates a key for a free function.
    pub fn free(name: impl Into<String>, params: Vec<TypeId>) -> Self {
        Self { owner: None,
               name: name.into(),
               params }
    }

    /// Overload matching.
    ///
    /// Owners, names and arity must agree and every parameter type must
    /// match pairwise under `same`, which is usually
    /// [`TypeRegistry::equals`](crate::types::TypeRegistry::equals).
    pub fn matches(&self, other: &Self, mut same: impl FnMut(TypeId, TypeId) -> bool) -> bool {
        self.owner == other.owner
        && self.name == other.name
        && self.params.len() == other.params.len()
        && self.params
               .iter()
               .zip(&other.params)
               .all(|(lhs, rhs)| same(*lhs, *rhs))
    }
}

/// Owns every function of a compilation.
///
/// Call sites refer to their target by [`FunctionId`], so the tree never
/// holds a second owner of a function node.
#[derive(Debug, Clone, Default)]
pub struct FunctionArena {
    functions: Vec<FunctionNode>,
}

impl FunctionArena {
    /// Stores a function and returns its handle.
    pub fn alloc(&mut self, function: FunctionNode) -> FunctionId {
        self.functions.push(function);
        FunctionId(self.functions.len() - 1)
    }

    /// Returns the function behind a handle.
    #[must_use]
    pub fn get(&self, id: FunctionId) -> &FunctionNode {
        &self.functions[id.0]
    }

    /// Returns mutable access to the function behind a handle.
    pub fn get_mut(&mut self, id: FunctionId) -> &mut FunctionNode {
        &mut self.functions[id.0]
    }

    /// Number of stored functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no function is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_distinguish_overloads() {
        let mut arena = FunctionArena::default();

        let mut by_int = FunctionNode::new("show", 1, 1);
        by_int.params.push(Parameter::new("x", TypeId::INT, 1));
        let mut by_float = FunctionNode::new("show", 1, 2);
        by_float.params.push(Parameter::new("x", TypeId::FLOAT, 2));

        let int_id = arena.alloc(by_int);
        let float_id = arena.alloc(by_float);

        let wanted = FunctionIdentifier::free("show", vec![TypeId::FLOAT]);
        let found: Vec<_> = [int_id, float_id].into_iter()
                                              .filter(|id| {
                                                  arena.get(*id)
                                                       .identifier()
                                                       .matches(&wanted, |a, b| a == b)
                                              })
                                              .collect();
        assert_eq!(found, vec![float_id]);
    }

    #[test]
    fn arity_is_part_of_the_identifier() {
        let one = FunctionIdentifier::free("f", vec![TypeId::INT]);
        let two = FunctionIdentifier::free("f", vec![TypeId::INT, TypeId::INT]);
        assert!(!one.matches(&two, |_, _| true));
    }
}
