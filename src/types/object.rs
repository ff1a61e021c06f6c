use std::collections::BTreeMap;

use crate::{
    ast::{
        expression::{DynamicAllocation, Expr, Variable},
        function::{FunctionId, Parameter, Traits},
        statement::{Assignment, Return, Statement},
    },
    context::CompilationContext,
    error::{ParseError, ParseResult},
    types::TypeId,
};

/// Backing data of an object type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNode {
    /// The declared name.
    pub name:    String,
    /// Field name to field type.
    pub fields:  BTreeMap<String, TypeId>,
    /// Method name to method.
    pub methods: BTreeMap<String, FunctionId>,
}

/// A nominal object type with an optional single parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    /// Fields and methods declared on this type.
    pub node:   TypeNode,
    /// The type this one derives from.
    pub parent: Option<TypeId>,
}

impl ObjectType {
    /// Creates an object type without fields or methods.
    pub fn new(name: impl Into<String>, parent: Option<TypeId>) -> Self {
        Self { node: TypeNode { name: name.into(),
                                ..TypeNode::default() },
               parent }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.node.name
    }
}

impl CompilationContext {
    /// Attaches the function `id` to the object type `owner` as a method.
    ///
    /// - An `override` method needs a virtual method of the same name in the
    ///   parent chain whose traits match once `virtual` and `override` are
    ///   swapped.
    /// - Any other method name must be new to `owner` itself; shadowing a
    ///   parent method is allowed.
    /// - Non static methods get a leading `self: owner` parameter.
    /// - A method named `new` becomes a constructor: it allocates `self`
    ///   first, returns it last and its return type is `owner`.
    ///
    /// # Errors
    /// [`ParseError::InvalidOverride`] or [`ParseError::DuplicateMethod`]; the
    /// method is not attached in either case.
    pub fn add_method(&mut self, owner: TypeId, id: FunctionId) -> ParseResult<()> {
        let owner_name = self.types.name(owner);
        let function = self.functions.get(id);
        let name = function.name.clone();
        let traits = function.traits;
        let line = function.line;

        if traits.contains(Traits::OVERRIDE) {
            let overridden = self.types
                                 .parent(owner)
                                 .and_then(|parent| self.types.find_method(parent, &name))
                                 .map(|parent_method| self.functions.get(parent_method).traits);

            let valid = overridden.is_some_and(|parent_traits| {
                                      parent_traits.contains(Traits::VIRTUAL)
                                      && (parent_traits | Traits::OVERRIDE)
                                         == (traits | Traits::VIRTUAL)
                                  });
            if !valid {
                return Err(ParseError::InvalidOverride { owner: owner_name,
                                                         name,
                                                         line });
            }
        } else if self.types.get(owner).own_method(&name).is_some() {
            return Err(ParseError::DuplicateMethod { owner: owner_name,
                                                     name,
                                                     line });
        }

        let function = self.functions.get_mut(id);
        function.parent = Some(owner);

        if !traits.contains(Traits::STATIC) {
            function.params.insert(0, Parameter::new("self", owner, line));
        }

        if name == "new" {
            let allocate = Assignment::declare(Expr::Variable(Variable::new("self", line)),
                                               Expr::DynamicAllocation(DynamicAllocation { ty: owner,
                                                                                           line }),
                                               line);
            function.body.insert(0, Statement::Assignment(allocate));
            function.body
                    .push(Statement::Return(Return { value: Expr::Variable(Variable::new("self", line)),
                                                     line }));
            function.return_type = owner;
            function.traits |= Traits::EXPLICIT_TYPE;
        }

        if let Some(object) = self.types.get_mut(owner).as_object_mut() {
            object.node.methods.insert(name, id);
        }

        Ok(())
    }
}
