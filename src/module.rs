use crate::{
    ast::function::{FunctionArena, FunctionId, FunctionIdentifier},
    types::{PrimitiveType, TypeId, TypeRegistry},
};

/// Index of the builtin module inside a compiler.
pub const BUILTIN_MODULE: usize = 0;

/// Name of the builtin module holding the host functions.
pub const BUILTIN_MODULE_NAME: &str = "_c_builtin_";

/// The types and functions of one compiled source file.
///
/// Both lists are split in two: imported entries sit in front of the
/// boundary index and local entries behind it. Imports are inserted at the
/// front, so adding one shifts the boundary forward and never reorders the
/// local entries.
#[derive(Debug, Clone)]
pub struct Module {
    name:                    String,
    file:                    String,
    index:                   usize,
    types:                   Vec<TypeId>,
    functions:               Vec<FunctionId>,
    external_type_index:     usize,
    external_function_index: usize,
    body:                    Option<FunctionId>,
}

impl Module {
    /// Creates an empty module that knows the builtin types.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        let mut types: Vec<TypeId> = PrimitiveType::ALL.into_iter().map(PrimitiveType::id).collect();
        types.push(TypeId::OBJECT);

        let name = name.into();
        Self { file: name.clone(),
               name,
               index,
               types,
               functions: Vec::new(),
               external_type_index: 0,
               external_function_index: 0,
               body: None }
    }

    /// The module name, usually the file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source file the module was parsed from. Diagnostics are keyed by
    /// it.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Records the source file the module was parsed from.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = file.into();
    }

    /// Position of the module in its compiler.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Appends a local function.
    pub fn add_function(&mut self, id: FunctionId) {
        self.functions.push(id);
    }

    /// Appends a local type.
    pub fn add_type(&mut self, id: TypeId) {
        if !self.types.contains(&id) {
            self.types.push(id);
        }
    }

    /// Imports a function from another module.
    pub fn add_external_function(&mut self, id: FunctionId) {
        if self.functions.contains(&id) {
            return;
        }
        self.functions.insert(0, id);
        self.external_function_index += 1;
    }

    /// Imports a type from another module.
    pub fn add_external_type(&mut self, id: TypeId) {
        if self.types.contains(&id) {
            return;
        }
        self.types.insert(0, id);
        self.external_type_index += 1;
    }

    /// Boundary between imported and local functions.
    #[must_use]
    pub const fn external_function_index(&self) -> usize {
        self.external_function_index
    }

    /// Boundary between imported and local types.
    #[must_use]
    pub const fn external_type_index(&self) -> usize {
        self.external_type_index
    }

    /// Every function visible in the module, imports first.
    #[must_use]
    pub fn all_functions(&self) -> &[FunctionId] {
        &self.functions
    }

    /// The functions declared by the module itself.
    #[must_use]
    pub fn functions(&self) -> &[FunctionId] {
        &self.functions[self.external_function_index..]
    }

    /// Every type visible in the module, imports first.
    #[must_use]
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Finds a visible type by its source name.
    #[must_use]
    pub fn find_type(&self, types: &TypeRegistry, name: &str) -> Option<TypeId> {
        self.types.iter().copied().find(|ty| types.name(*ty) == name)
    }

    /// Returns `true` if a type of that name is visible.
    #[must_use]
    pub fn has_type(&self, types: &TypeRegistry, name: &str) -> bool {
        self.find_type(types, name).is_some()
    }

    /// Returns `true` if the module itself declares a type of that name.
    #[must_use]
    pub fn has_internal_type(&self, types: &TypeRegistry, name: &str) -> bool {
        self.types[self.external_type_index..].iter()
                                               .any(|ty| types.name(*ty) == name)
    }

    /// The object types the module itself declares, including the list
    /// types its literals introduced.
    #[must_use]
    pub fn object_types(&self, types: &TypeRegistry) -> Vec<TypeId> {
        self.types[self.external_type_index..].iter()
                                               .copied()
                                               .filter(|ty| *ty != TypeId::OBJECT && types.is_object(*ty))
                                               .collect()
    }

    /// Every visible object type, imported ones included.
    #[must_use]
    pub fn visible_object_types(&self, types: &TypeRegistry) -> Vec<TypeId> {
        self.types
            .iter()
            .copied()
            .filter(|ty| *ty != TypeId::OBJECT && types.is_object(*ty))
            .collect()
    }

    /// Resolves a call key against the visible functions.
    ///
    /// The first function whose identifier matches wins; parameter types are
    /// compared with [`TypeRegistry::equals`].
    #[must_use]
    pub fn find_function(&self,
                         functions: &FunctionArena,
                         types: &TypeRegistry,
                         key: &FunctionIdentifier)
                         -> Option<FunctionId> {
        self.functions.iter().copied().find(|id| {
                                          functions.get(*id)
                                                   .identifier()
                                                   .matches(key, |lhs, rhs| types.equals(lhs, rhs))
                                      })
    }

    /// Returns `true` if a function with exactly this identifier is already
    /// declared by the module itself.
    #[must_use]
    pub fn declares(&self, functions: &FunctionArena, key: &FunctionIdentifier) -> bool {
        self.functions()
            .iter()
            .any(|id| functions.get(*id).identifier() == *key)
    }

    /// Every local free function called `name`, all overloads.
    #[must_use]
    pub fn function_group(&self, functions: &FunctionArena, name: &str) -> Vec<FunctionId> {
        self.functions()
            .iter()
            .copied()
            .filter(|id| {
                let function = functions.get(*id);
                function.name == name && function.parent.is_none()
            })
            .collect()
    }

    /// Returns `true` if the module itself declares a free function `name`.
    #[must_use]
    pub fn has_internal_function(&self, functions: &FunctionArena, name: &str) -> bool {
        !self.function_group(functions, name).is_empty()
    }

    /// Records the function holding the top-level statements.
    pub fn set_body(&mut self, id: FunctionId) {
        self.body = Some(id);
    }

    /// The function holding the top-level statements.
    #[must_use]
    pub const fn body(&self) -> Option<FunctionId> {
        self.body
    }

    /// The local free function `main` without parameters, if declared.
    #[must_use]
    pub fn main_function(&self, functions: &FunctionArena) -> Option<FunctionId> {
        self.function_group(functions, "main")
            .into_iter()
            .find(|id| functions.get(*id).params.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::function::FunctionNode;

    #[test]
    fn imports_shift_the_boundary() {
        let mut arena = FunctionArena::default();
        let local = arena.alloc(FunctionNode::new("local", 1, 1));
        let imported = arena.alloc(FunctionNode::new("imported", 2, 1));

        let mut module = Module::new("main", 1);
        module.add_function(local);
        module.add_external_function(imported);
        module.add_external_function(imported);

        assert_eq!(module.external_function_index(), 1);
        assert_eq!(module.all_functions(), &[imported, local]);
        assert_eq!(module.functions(), &[local]);
        assert!(module.has_internal_function(&arena, "local"));
        assert!(!module.has_internal_function(&arena, "imported"));
    }

    #[test]
    fn object_types_skip_builtins_and_imports() {
        let mut types = TypeRegistry::new();
        let local = types.declare_object("Point", None);
        let imported = types.declare_object("Shape", None);

        let mut module = Module::new("main", 1);
        module.add_type(local);
        module.add_external_type(imported);

        assert_eq!(module.object_types(&types), vec![local]);
        assert_eq!(module.visible_object_types(&types), vec![imported, local]);
        assert_eq!(module.find_type(&types, "Shape"), Some(imported));
        assert!(module.has_internal_type(&types, "Point"));
        assert!(!module.has_internal_type(&types, "Shape"));
        assert_eq!(module.find_type(&types, "Int"), Some(TypeId::INT));
    }
}
