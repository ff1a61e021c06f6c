use crate::{
    ast::{
        expression::{Expr, FunctionCall},
        statement::{Assignment, For, IfElse, Return, Statement, StatementBlock, While},
        visitor::StatementVisitor,
    },
    error::{EvalResult, RuntimeError},
    interpreter::{Interpreter, Value},
    util::num::index_checked,
};

impl Interpreter<'_> {
    fn condition(&mut self, condition: &Expr, line: usize) -> EvalResult<bool> {
        condition.accept(self)?.as_bool(line)
    }

    /// Runs the body of a branch or loop in its own segment.
    fn nested(&mut self, statement: &Statement) -> EvalResult<()> {
        self.scoped(|interpreter| statement.accept(interpreter))
    }

    /// Stores `value` into an existing variable, field or array element.
    fn store(&mut self, target: &Expr, value: Value, line: usize) -> EvalResult<()> {
        match target {
            Expr::Variable(variable) => {
                let slot = self.symbols()
                               .get_mut(&variable.name)
                               .ok_or_else(|| RuntimeError::UnknownVariable { name: variable.name.clone(),
                                                                              line })?;
                *slot = value;
            },
            Expr::FieldAccess(access) => {
                let object = access.base.accept(self)?.as_object(line)?;
                object.borrow_mut().fields.insert(access.field.clone(), value);
            },
            Expr::ArrayIndex(index) => {
                let array = index.array.accept(self)?.as_array(line)?;
                let position = index.index.accept(self)?.as_int(line)?;

                let mut items = array.borrow_mut();
                let position = index_checked(position, items.len(), line)?;
                items[position] = value;
            },
            _ => {
                return Err(RuntimeError::TypeViolation { operation: "=".to_string(),
                                                         lhs: "expression",
                                                         rhs: value.kind(),
                                                         line })
            },
        }
        Ok(())
    }
}

impl StatementVisitor for Interpreter<'_> {
    type Output = EvalResult<()>;

    fn visit_block(&mut self, node: &StatementBlock) -> Self::Output {
        self.scoped(|interpreter| interpreter.execute_block(&node.statements))
    }

    fn visit_assignment(&mut self, node: &Assignment) -> Self::Output {
        let value = node.value.accept(self)?;

        match &node.target {
            Expr::Variable(variable) if node.declaration => {
                self.symbols().push(variable.name.clone(), value);
                Ok(())
            },
            target => self.store(target, value, node.line),
        }
    }

    fn visit_return(&mut self, node: &Return) -> Self::Output {
        let value = node.value.accept(self)?;
        self.set_return(value);
        Ok(())
    }

    fn visit_if_else(&mut self, node: &IfElse) -> Self::Output {
        if self.condition(&node.condition, node.line)? {
            self.nested(&node.then)
        } else if let Some(otherwise) = &node.otherwise {
            self.nested(otherwise)
        } else {
            Ok(())
        }
    }

    fn visit_while(&mut self, node: &While) -> Self::Output {
        while !self.returned() && self.condition(&node.condition, node.line)? {
            self.nested(&node.body)?;
        }
        Ok(())
    }

    /// The loop variable lives in a segment of its own around the loop.
    fn visit_for(&mut self, node: &For) -> Self::Output {
        self.scoped(|interpreter| {
                node.init.accept(interpreter)?;
                while !interpreter.returned() && interpreter.condition(&node.condition, node.line)? {
                    interpreter.nested(&node.body)?;
                    if interpreter.returned() {
                        break;
                    }
                    node.step.accept(interpreter)?;
                }
                Ok(())
            })
    }

    fn visit_call_statement(&mut self, node: &FunctionCall) -> Self::Output {
        self.call(node).map(|_| ())
    }
}
