/// The parser state shared by every part of the grammar.
///
/// Holds the token stream stack, the module under construction and the
/// helpers for consuming tokens, entering bracket scopes and recording
/// recoverable errors.
pub mod core;
/// Expression parsing.
///
/// Binary operators are right recursive: the right operand is always a whole
/// expression, so `a - b - c` groups as `a - (b - c)`. List literals are
/// rewritten into calls of the list constructor here.
pub mod expression;
/// Function and method declarations.
pub mod function_def;
/// Top-level declarations, imports and the module body.
pub mod module;
/// Statement parsing and statement-level error recovery.
pub mod statement;
/// Type names: primitives, objects, arrays, references and lists.
pub mod types;

pub use self::{core::Parser, module::parse_module};

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            expression::{BinaryOperator, Expr, LiteralValue},
            function::{FunctionNode, Traits},
            statement::Statement,
        },
        context::CompilationContext,
        lexer::tokenize,
        module::Module,
        parser::parse_module,
        types::TypeId,
    };

    fn parse(source: &str) -> (CompilationContext, Module) {
        let mut ctx = CompilationContext::new();
        let lexed = tokenize("t.kv", source);
        let module = parse_module(&mut ctx, &[], "t", 0, lexed.tokens);
        (ctx, module)
    }

    fn errors(ctx: &CompilationContext) -> Vec<String> {
        ctx.diagnostics.errors().map(|d| d.message.clone()).collect()
    }

    fn body(ctx: &CompilationContext, module: &Module) -> Vec<Statement> {
        module.body()
              .map(|id| ctx.functions.get(id).body.clone())
              .unwrap_or_default()
    }

    fn function<'c>(ctx: &'c CompilationContext, module: &Module, name: &str) -> &'c FunctionNode {
        let group = module.function_group(&ctx.functions, name);
        assert_eq!(group.len(), 1, "{name}");
        ctx.functions.get(group[0])
    }

    #[test]
    fn binary_operators_group_to_the_right() {
        let (ctx, module) = parse("ret 1 - 2 * 3;");
        assert!(errors(&ctx).is_empty());

        let body = body(&ctx, &module);
        let [Statement::Return(ret)] = body.as_slice() else {
            panic!("expected one return, got {body:?}");
        };
        let Expr::BinaryOperation(outer) = &ret.value else {
            panic!("expected a binary operation");
        };
        assert_eq!(outer.op, BinaryOperator::Subtract);
        assert!(matches!(&*outer.lhs, Expr::Literal(literal) if literal.value == LiteralValue::Integer(1)));
        assert!(matches!(&*outer.rhs, Expr::BinaryOperation(inner) if inner.op == BinaryOperator::Multiply));
    }

    #[test]
    fn not_compares_against_false() {
        let (ctx, module) = parse("ret not x.ok or y;");
        assert!(errors(&ctx).is_empty());

        let body = body(&ctx, &module);
        let [Statement::Return(ret)] = body.as_slice() else {
            panic!("expected one return, got {body:?}");
        };
        let Expr::BinaryOperation(or) = &ret.value else {
            panic!("expected a binary operation");
        };
        assert_eq!(or.op, BinaryOperator::Or);
        let Expr::BinaryOperation(not) = &*or.lhs else {
            panic!("expected the negation on the left");
        };
        assert_eq!(not.op, BinaryOperator::Equal);
        assert!(matches!(&*not.lhs, Expr::FieldAccess(_)));
        assert!(matches!(&*not.rhs, Expr::Literal(literal) if literal.value == LiteralValue::Boolean(false)));
    }

    #[test]
    fn functions_record_their_signature() {
        let (ctx, module) = parse("fn add(a: Int, b: Int) -> Int { ret a + b; }\nfn half(x: Float) => x / 2.0;");
        assert!(errors(&ctx).is_empty());

        let add = function(&ctx, &module, "add");
        assert_eq!(add.return_type, TypeId::INT);
        assert!(add.traits.contains(Traits::EXPLICIT_TYPE));
        assert_eq!(add.params.len(), 2);

        let half = function(&ctx, &module, "half");
        assert_eq!(half.return_type, TypeId::VOID);
        assert!(!half.traits.contains(Traits::EXPLICIT_TYPE));
        assert!(matches!(half.body.as_slice(), [Statement::Return(_)]));
    }

    #[test]
    fn constructors_allocate_and_return_self() {
        let (ctx, module) = parse("type Pair { x: Int; y: Int; }\nfn Pair.new(x: Int, y: Int) { self.x = x; self.y = y; }");
        assert!(errors(&ctx).is_empty());

        let pair = module.find_type(&ctx.types, "Pair").unwrap();
        let new = ctx.functions.get(ctx.types.find_method(pair, "new").unwrap());
        assert_eq!(new.return_type, pair);
        assert!(new.traits.contains(Traits::STATIC));
        assert_eq!(new.params.len(), 2);

        assert!(matches!(new.body.first(), Some(Statement::Assignment(a)) if a.declaration
                                                                        && matches!(a.value, Expr::DynamicAllocation(_))));
        assert!(matches!(new.body.last(), Some(Statement::Return(r)) if matches!(&r.value, Expr::Variable(v) if v.name == "self")));
        assert_eq!(new.body.len(), 4);
    }

    #[test]
    fn methods_take_self_first() {
        let (ctx, module) = parse("type P { x: Int; }\nfn P.get() -> Int => self.x;");
        let p = module.find_type(&ctx.types, "P").unwrap();
        let get = ctx.functions.get(ctx.types.find_method(p, "get").unwrap());

        assert_eq!(get.params.len(), 1);
        assert_eq!(get.params[0].name, "self");
        assert_eq!(get.params[0].ty, p);
    }

    #[test]
    fn broken_statements_are_skipped() {
        let (ctx, module) = parse("let a = ;\nlet b = 2;\nelse 3;\nlet c = 4;");
        assert_eq!(errors(&ctx).len(), 2, "{:?}", errors(&ctx));
        assert_eq!(body(&ctx, &module).len(), 2);
    }

    #[test]
    fn list_literals_become_constructor_calls() {
        let (ctx, module) = parse("let xs = [1, 2, 3];");
        assert!(errors(&ctx).is_empty());

        let list = ctx.types.find_list(TypeId::INT).unwrap();
        assert!(module.types().contains(&list));

        let body = body(&ctx, &module);
        let [Statement::Assignment(assignment)] = body.as_slice() else {
            panic!("expected one assignment");
        };
        let Expr::Call(call) = &assignment.value else {
            panic!("expected a call");
        };
        assert_eq!(call.target, ctx.types.find_method(list, "new"));
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn declaration_errors() {
        let (ctx, _) = parse("fn f() => 1;\nfn f() => 2;\ntype T { a: Int; a: Float; }\nfn g() [fast] => 3;");
        assert_eq!(errors(&ctx),
                   vec!["redeclaration of function f", "T already has a field named a", "unknown trait fast"]);
    }
}
