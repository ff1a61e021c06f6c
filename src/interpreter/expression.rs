use crate::{
    ast::{
        expression::{
            ArrayAllocation, ArrayExpression, ArrayIndex, BinaryOperation, Cast, DynamicAllocation,
            FieldAccess, FunctionCall, Literal, TakeReference, Variable,
        },
        visitor::ExpressionVisitor,
    },
    error::{EvalResult, RuntimeError},
    interpreter::{Interpreter, Value},
    util::num::{index_checked, size_checked},
};

impl Interpreter<'_> {
    /// Evaluates the arguments and runs the function the checker bound the
    /// call to.
    ///
    /// The callee expression itself is never evaluated: a method receiver
    /// was already moved into the arguments and a static call names a type.
    pub(crate) fn call(&mut self, node: &FunctionCall) -> EvalResult<Value> {
        let target = node.target
                         .ok_or_else(|| RuntimeError::UnresolvedCall { name: node.name().to_string(),
                                                                       line: node.line })?;

        let arguments = node.arguments
                            .iter()
                            .map(|argument| argument.accept(self))
                            .collect::<EvalResult<Vec<_>>>()?;

        let receiver = if node.receiver_injected { arguments.first() } else { None };
        let target = self.dispatch(target, receiver);
        self.call_function(target, arguments, node.line)
    }
}

impl ExpressionVisitor for Interpreter<'_> {
    type Output = EvalResult<Value>;

    fn visit_binary_operation(&mut self, node: &BinaryOperation) -> Self::Output {
        let lhs = node.lhs.accept(self)?;
        let rhs = node.rhs.accept(self)?;
        lhs.binary(node.op, &rhs, node.line)
    }

    fn visit_literal(&mut self, node: &Literal) -> Self::Output {
        Ok(Value::from(&node.value))
    }

    fn visit_variable(&mut self, node: &Variable) -> Self::Output {
        self.symbols()
            .get(&node.name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownVariable { name: node.name.clone(),
                                                           line: node.line })
    }

    fn visit_field_access(&mut self, node: &FieldAccess) -> Self::Output {
        let object = node.base.accept(self)?.as_object(node.line)?;
        let value = object.borrow().fields.get(&node.field).cloned();
        value.ok_or_else(|| RuntimeError::UnknownField { name: node.field.clone(),
                                                         line: node.line })
    }

    fn visit_dynamic_allocation(&mut self, node: &DynamicAllocation) -> Self::Output {
        Ok(self.instantiate(node.ty))
    }

    fn visit_array_allocation(&mut self, node: &ArrayAllocation) -> Self::Output {
        let size = node.size.accept(self)?.as_int(node.line)?;
        let size = size_checked(size, node.line)?;

        let element = Value::default_for(node.element, &self.context().types);
        Value::filled_array(element, size, node.line)
    }

    fn visit_array_expression(&mut self, node: &ArrayExpression) -> Self::Output {
        let items = node.items
                        .iter()
                        .map(|item| item.accept(self))
                        .collect::<EvalResult<Vec<_>>>()?;
        Ok(Value::array(items))
    }

    fn visit_array_index(&mut self, node: &ArrayIndex) -> Self::Output {
        let array = node.array.accept(self)?.as_array(node.line)?;
        let index = node.index.accept(self)?.as_int(node.line)?;

        let items = array.borrow();
        let position = index_checked(index, items.len(), node.line)?;
        Ok(items[position].clone())
    }

    /// Objects and arrays are shared already; taking a reference yields the
    /// value itself.
    fn visit_take_reference(&mut self, node: &TakeReference) -> Self::Output {
        node.expr.accept(self)
    }

    fn visit_cast(&mut self, node: &Cast) -> Self::Output {
        node.expr.accept(self)?.cast(node.to, node.line)
    }

    fn visit_call(&mut self, node: &FunctionCall) -> Self::Output {
        self.call(node)
    }
}
