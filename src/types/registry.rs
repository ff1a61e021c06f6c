use std::collections::HashMap;

use crate::{
    ast::function::FunctionId,
    error::{CheckError, CheckResult},
    types::{object::ObjectType, PrimitiveType, Type, TypeId},
};

/// Owns every type of a compilation and interns the structural ones.
///
/// There is exactly one array type per element type, one reference type per
/// referent and one list type per element type, so handle equality is type
/// identity for them. Object types are nominal: every declaration gets a new
/// handle.
///
/// # Example
/// ```
/// use kvantum::types::{TypeId, TypeRegistry};
///
/// let mut types = TypeRegistry::new();
/// let ints = types.array_of(TypeId::INT);
///
/// assert_eq!(ints, types.array_of(TypeId::INT));
/// assert_ne!(ints, types.array_of(TypeId::FLOAT));
/// assert_eq!(types.name(ints), "<Int>");
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types:      Vec<Type>,
    arrays:     HashMap<TypeId, TypeId>,
    references: HashMap<TypeId, TypeId>,
    lists:      HashMap<TypeId, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the primitives and the `Object` base.
    #[must_use]
    pub fn new() -> Self {
        let mut types: Vec<Type> = PrimitiveType::ALL.into_iter().map(Type::Primitive).collect();
        types.push(Type::Object(ObjectType::new("Object", None)));

        Self { types,
               arrays: HashMap::new(),
               references: HashMap::new(),
               lists: HashMap::new() }
    }

    /// Resolves a builtin type name.
    ///
    /// # Errors
    /// [`CheckError::UnknownType`] for anything but `Int`, `Float`, `Bool`,
    /// `Char`, `Void` and `Object`.
    ///
    /// # Example
    /// ```
    /// use kvantum::types::{TypeId, TypeRegistry};
    ///
    /// assert_eq!(TypeRegistry::primitive("Bool").unwrap(), TypeId::BOOL);
    /// assert!(TypeRegistry::primitive("Integer").is_err());
    /// ```
    pub fn primitive(name: &str) -> CheckResult<TypeId> {
        if name == "Object" {
            return Ok(TypeId::OBJECT);
        }
        PrimitiveType::from_name(name).map(PrimitiveType::id)
                                      .ok_or_else(|| CheckError::UnknownType { name: name.to_string() })
    }

    /// Returns the type behind a handle.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Returns mutable access to the type behind a handle.
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false`: the builtin types are registered on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn push(&mut self, ty: Type) -> TypeId {
        self.types.push(ty);
        TypeId(self.types.len() - 1)
    }

    /// Returns the interned array type of `element`.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        if let Some(&id) = self.arrays.get(&element) {
            return id;
        }
        let id = self.push(Type::Array(element));
        self.arrays.insert(element, id);
        id
    }

    /// Returns the interned reference type to `referent`.
    pub fn reference_to(&mut self, referent: TypeId) -> TypeId {
        if let Some(&id) = self.references.get(&referent) {
            return id;
        }
        let id = self.push(Type::Reference(referent));
        self.references.insert(referent, id);
        id
    }

    /// Looks up the array type of `element` without creating it.
    #[must_use]
    pub fn find_array(&self, element: TypeId) -> Option<TypeId> {
        self.arrays.get(&element).copied()
    }

    /// Looks up the reference type to `referent` without creating it.
    #[must_use]
    pub fn find_reference(&self, referent: TypeId) -> Option<TypeId> {
        self.references.get(&referent).copied()
    }

    /// Looks up the list type of `element` without creating it.
    ///
    /// Lists are created through
    /// [`CompilationContext::list_of`](crate::context::CompilationContext::list_of)
    /// because their methods live in the function arena.
    #[must_use]
    pub fn find_list(&self, element: TypeId) -> Option<TypeId> {
        self.lists.get(&element).copied()
    }

    pub(crate) fn register_list(&mut self, element: TypeId, list: Type) -> TypeId {
        let id = self.push(list);
        self.lists.insert(element, id);
        id
    }

    /// Declares a new nominal object type.
    pub fn declare_object(&mut self, name: impl Into<String>, parent: Option<TypeId>) -> TypeId {
        self.push(Type::Object(ObjectType::new(name, parent)))
    }

    /// The source spelling of a type.
    #[must_use]
    pub fn name(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Primitive(primitive) => primitive.name().to_string(),
            Type::Object(object) => object.name().to_string(),
            Type::List(list) => list.object.name().to_string(),
            Type::Array(element) => format!("<{}>", self.name(*element)),
            Type::Reference(referent) => format!("&{}", self.name(*referent)),
        }
    }

    /// Type equivalence.
    ///
    /// Handles compare by identity. The builtin `Object` type matches every
    /// type on either side, and arrays and references match when their
    /// element types do.
    #[must_use]
    pub fn equals(&self, lhs: TypeId, rhs: TypeId) -> bool {
        if lhs == rhs || lhs == TypeId::OBJECT || rhs == TypeId::OBJECT {
            return true;
        }
        match (self.get(lhs), self.get(rhs)) {
            (Type::Array(a), Type::Array(b)) | (Type::Reference(a), Type::Reference(b)) => {
                self.equals(*a, *b)
            },
            _ => false,
        }
    }

    /// Returns `true` for object and list types.
    #[must_use]
    pub fn is_object(&self, id: TypeId) -> bool {
        self.get(id).is_object()
    }

    /// The element type of an array type.
    #[must_use]
    pub fn element_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Array(element) => Some(*element),
            _ => None,
        }
    }

    /// The parent of an object type.
    #[must_use]
    pub fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).as_object().and_then(|object| object.parent)
    }

    /// Returns `true` if `id` is `ancestor` or derives from it.
    #[must_use]
    pub fn derives_from(&self, id: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(ty) = current {
            if ty == ancestor {
                return true;
            }
            current = self.parent(ty);
        }
        false
    }

    /// The type of field `name`, searching the parent chain.
    ///
    /// A field declared on the derived type shadows a parent field.
    #[must_use]
    pub fn field_type(&self, id: TypeId, name: &str) -> Option<TypeId> {
        let object = self.get(id).as_object()?;
        object.node
              .fields
              .get(name)
              .copied()
              .or_else(|| object.parent.and_then(|parent| self.field_type(parent, name)))
    }

    /// Returns `true` if the type or one of its parents has field `name`.
    #[must_use]
    pub fn has_field(&self, id: TypeId, name: &str) -> bool {
        self.field_type(id, name).is_some()
    }

    /// Every field of the type, parent fields first.
    #[must_use]
    pub fn fields(&self, id: TypeId) -> Vec<(String, TypeId)> {
        let Some(object) = self.get(id).as_object() else {
            return Vec::new();
        };

        let mut fields = object.parent
                               .map(|parent| self.fields(parent))
                               .unwrap_or_default();
        for (name, ty) in &object.node.fields {
            fields.retain(|(existing, _)| existing != name);
            fields.push((name.clone(), *ty));
        }
        fields
    }

    /// The method `name`, searching the parent chain.
    #[must_use]
    pub fn find_method(&self, id: TypeId, name: &str) -> Option<FunctionId> {
        let ty = self.get(id);
        ty.own_method(name)
          .or_else(|| self.parent(id).and_then(|parent| self.find_method(parent, name)))
    }

    /// Returns `true` if the type or one of its parents has method `name`.
    #[must_use]
    pub fn has_method(&self, id: TypeId, name: &str) -> bool {
        self.find_method(id, name).is_some()
    }

    /// The methods declared directly on the type.
    #[must_use]
    pub fn methods(&self, id: TypeId) -> Vec<FunctionId> {
        self.get(id)
            .as_object()
            .map(|object| object.node.methods.values().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_lookup_is_stable() {
        for name in ["Int", "Float", "Bool", "Char", "Void"] {
            let first = TypeRegistry::primitive(name).unwrap();
            let second = TypeRegistry::primitive(name).unwrap();
            assert_eq!(first, second);
        }
        assert!(matches!(TypeRegistry::primitive("Str"), Err(CheckError::UnknownType { .. })));
    }

    #[test]
    fn object_base_matches_everything() {
        let mut types = TypeRegistry::new();
        let point = types.declare_object("Point", None);

        assert!(types.equals(TypeId::OBJECT, point));
        assert!(types.equals(TypeId::INT, TypeId::OBJECT));
        assert!(!types.equals(TypeId::INT, point));
    }

    #[test]
    fn derived_fields_shadow_parent_fields() {
        let mut types = TypeRegistry::new();
        let base = types.declare_object("Base", None);
        let derived = types.declare_object("Derived", Some(base));

        if let Some(object) = types.get_mut(base).as_object_mut() {
            object.node.fields.insert("x".into(), TypeId::INT);
            object.node.fields.insert("y".into(), TypeId::INT);
        }
        if let Some(object) = types.get_mut(derived).as_object_mut() {
            object.node.fields.insert("x".into(), TypeId::FLOAT);
        }

        assert_eq!(types.field_type(derived, "x"), Some(TypeId::FLOAT));
        assert_eq!(types.field_type(derived, "y"), Some(TypeId::INT));
        assert_eq!(types.fields(derived).len(), 2);
        assert!(types.derives_from(derived, base));
        assert!(!types.derives_from(base, derived));
    }

    #[test]
    fn references_are_interned() {
        let mut types = TypeRegistry::new();
        let first = types.reference_to(TypeId::CHAR);

        assert_eq!(first, types.reference_to(TypeId::CHAR));
        assert_eq!(types.name(first), "&Char");
        assert_eq!(types.find_reference(TypeId::CHAR), Some(first));
    }
}
