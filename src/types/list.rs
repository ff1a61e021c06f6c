use crate::{
    ast::{
        expression::{
            ArrayAllocation, ArrayIndex, BinaryOperation, BinaryOperator, Expr, FieldAccess,
            FunctionCall, Literal, Variable,
        },
        function::{FunctionId, FunctionNode, Parameter, Traits},
        statement::{Assignment, IfElse, Return, Statement},
    },
    context::CompilationContext,
    module::BUILTIN_MODULE,
    types::{object::ObjectType, ListType, Type, TypeId},
};

const LIST_INDEX_MESSAGE: &str = "list index out of range";

fn var(name: &str) -> Expr {
    Expr::Variable(Variable::new(name, 0))
}

fn int(value: i64) -> Expr {
    Expr::Literal(Literal::new(value, 0))
}

fn field(name: &str) -> Expr {
    Expr::FieldAccess(FieldAccess::new(var("self"), name, 0))
}

fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
    Expr::BinaryOperation(BinaryOperation { op,
                                            lhs: Box::new(lhs),
                                            rhs: Box::new(rhs),
                                            line: 0 })
}

fn call_statement(callee: Expr, arguments: Vec<Expr>) -> Statement {
    Statement::Call(FunctionCall::new(callee, arguments, 0))
}

fn assign(target: Expr, value: Expr) -> Statement {
    Statement::Assignment(Assignment::assign(target, value, 0))
}

fn method(name: &str, return_type: TypeId, params: Vec<Parameter>, body: Vec<Statement>) -> FunctionNode {
    let mut function = FunctionNode::new(name, BUILTIN_MODULE, 0);
    function.return_type = return_type;
    function.params = params;
    function.body = body;
    function.traits = Traits::PUBLIC | Traits::EXPLICIT_TYPE;
    function
}

impl CompilationContext {
    /// Returns the list type `[element]`, synthesizing it on first use.
    ///
    /// A list is an object with the fields `_arr: <element>`, `size: Int`
    /// and `max_size: Int` and the methods below, whose bodies are built as
    /// syntax trees and checked like any other builtin code:
    ///
    /// - `reSize(new_size: Int)` moves the elements into fresh storage of
    ///   `new_size` slots.
    /// - `getSize() -> Int`
    /// - `at(index: Int) -> element` panics with `list index out of range`
    ///   when `index < 0 or index >= size`.
    /// - `append(item: element)` grows the storage to `max_size * 2 + 1`
    ///   when it is full.
    /// - `new(initializer: <element>, arr_size: Int)` is the static
    ///   constructor used by list literals.
    ///
    /// # Example
    /// ```
    /// use kvantum::{context::CompilationContext, types::TypeId};
    ///
    /// let mut ctx = CompilationContext::new();
    /// let ints = ctx.list_of(TypeId::INT);
    ///
    /// assert_eq!(ints, ctx.list_of(TypeId::INT));
    /// assert_eq!(ctx.types.name(ints), "[Int]");
    /// assert!(ctx.types.has_method(ints, "append"));
    /// assert_eq!(ctx.types.field_type(ints, "size"), Some(TypeId::INT));
    /// ```
    pub fn list_of(&mut self, element: TypeId) -> TypeId {
        if let Some(list) = self.types.find_list(element) {
            return list;
        }

        let array = self.types.array_of(element);
        let mut object = ObjectType::new(format!("[{}]", self.types.name(element)), None);
        object.node.fields.insert("_arr".into(), array);
        object.node.fields.insert("size".into(), TypeId::INT);
        object.node.fields.insert("max_size".into(), TypeId::INT);

        let list = self.types
                       .register_list(element, Type::List(ListType { element, object }));

        let methods = [self.functions.alloc(resize_method(element)),
                       self.functions.alloc(get_size_method()),
                       self.functions.alloc(at_method(element)),
                       self.functions.alloc(append_method(element)),
                       self.functions.alloc(constructor(array))];
        self.attach_methods(list, &methods);

        tracing::trace!(list = %self.types.name(list), "list type synthesized");
        list
    }

    fn attach_methods(&mut self, owner: TypeId, methods: &[FunctionId]) {
        for &id in methods {
            if let Err(error) = self.add_method(owner, id) {
                self.diagnostics.error_at(error.line(), error);
            }
        }
    }
}

fn resize_method(element: TypeId) -> FunctionNode {
    let body = vec![Statement::Assignment(Assignment::declare(var("arr"), field("_arr"), 0)),
                    assign(field("_arr"),
                           Expr::ArrayAllocation(ArrayAllocation { element,
                                                                   size:    Box::new(var("new_size")),
                                                                   line:    0 })),
                    call_statement(var("memcpy"), vec![field("_arr"), var("arr"), field("size")]),
                    assign(field("max_size"), var("new_size"))];

    method("reSize", TypeId::VOID, vec![Parameter::new("new_size", TypeId::INT, 0)], body)
}

fn get_size_method() -> FunctionNode {
    let mut function = method("getSize",
                              TypeId::INT,
                              Vec::new(),
                              vec![Statement::Return(Return { value: field("size"),
                                                              line:  0 })]);
    function.traits |= Traits::CONST;
    function
}

fn at_method(element: TypeId) -> FunctionNode {
    let out_of_range = binary(BinaryOperator::Or,
                              binary(BinaryOperator::Less, var("index"), int(0)),
                              binary(BinaryOperator::GreaterOrEqual, var("index"), field("size")));
    let panic = call_statement(var("panic"),
                               vec![Expr::Literal(Literal::new(LIST_INDEX_MESSAGE, 0))]);
    let element_at = Expr::ArrayIndex(ArrayIndex { array: Box::new(field("_arr")),
                                                   index: Box::new(var("index")),
                                                   line:  0 });

    let body = vec![Statement::IfElse(IfElse { condition: out_of_range,
                                               then:      Box::new(panic),
                                               otherwise: None,
                                               line:      0 }),
                    Statement::Return(Return { value: element_at,
                                               line:  0 })];

    let mut function = method("at", element, vec![Parameter::new("index", TypeId::INT, 0)], body);
    function.traits |= Traits::CONST;
    function
}

fn append_method(element: TypeId) -> FunctionNode {
    let grow = call_statement(FieldAccess::new(var("self"), "reSize", 0).into(),
                              vec![binary(BinaryOperator::Add,
                                          binary(BinaryOperator::Multiply, field("max_size"), int(2)),
                                          int(1))]);
    let slot = Expr::ArrayIndex(ArrayIndex { array: Box::new(field("_arr")),
                                             index: Box::new(field("size")),
                                             line:  0 });

    let body = vec![Statement::IfElse(IfElse { condition: binary(BinaryOperator::Equal,
                                                                 field("size"),
                                                                 field("max_size")),
                                               then:      Box::new(grow),
                                               otherwise: None,
                                               line:      0 }),
                    assign(slot, var("item")),
                    assign(field("size"), binary(BinaryOperator::Add, field("size"), int(1)))];

    method("append", TypeId::VOID, vec![Parameter::new("item", element, 0)], body)
}

fn constructor(array: TypeId) -> FunctionNode {
    let body = vec![assign(field("size"), int(0)),
                    call_statement(FieldAccess::new(var("self"), "reSize", 0).into(),
                                   vec![var("arr_size")]),
                    call_statement(var("memcpy"),
                                   vec![field("_arr"), var("initializer"), var("arr_size")]),
                    assign(field("size"), var("arr_size"))];

    let mut function = method("new",
                              TypeId::VOID,
                              vec![Parameter::new("initializer", array, 0),
                                   Parameter::new("arr_size", TypeId::INT, 0)],
                              body);
    function.traits |= Traits::STATIC | Traits::CONST;
    function
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_returns_the_list() {
        let mut ctx = CompilationContext::new();
        let list = ctx.list_of(TypeId::CHAR);
        let new = ctx.types.find_method(list, "new").unwrap();
        let constructor = ctx.functions.get(new);

        assert_eq!(constructor.return_type, list);
        assert!(constructor.traits.contains(Traits::STATIC));
        assert_eq!(constructor.params.len(), 2);
        assert!(matches!(constructor.body.last(), Some(Statement::Return(_))));
    }

    #[test]
    fn methods_receive_self() {
        let mut ctx = CompilationContext::new();
        let list = ctx.list_of(TypeId::FLOAT);
        let at = ctx.types.find_method(list, "at").unwrap();

        let at = ctx.functions.get(at);
        assert_eq!(at.params[0].name, "self");
        assert_eq!(at.params[0].ty, list);
        assert_eq!(at.return_type, TypeId::FLOAT);
    }

    #[test]
    fn lists_of_different_elements_differ() {
        let mut ctx = CompilationContext::new();
        assert_ne!(ctx.list_of(TypeId::INT), ctx.list_of(TypeId::BOOL));
    }
}
