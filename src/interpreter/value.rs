use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::expression::{BinaryOperator, LiteralValue},
    error::{EvalResult, RuntimeError},
    types::{TypeId, TypeRegistry},
    util::num::{f64_to_i64_checked, i64_to_f64_checked},
};

/// The field storage of an object instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// The runtime type of the instance. Method calls on virtual methods
    /// dispatch on it.
    pub ty:     TypeId,
    /// Current field values by name.
    pub fields: HashMap<String, Value>,
}

/// A runtime value.
///
/// Objects and arrays are shared handles: copying a value copies the handle,
/// so every copy observes writes through any other. Everything else is a
/// plain value.
#[derive(Debug, Clone)]
pub enum Value {
    /// An `Int`.
    Int(i64),
    /// A `Float`.
    Rat(f64),
    /// A `Char` string.
    Str(String),
    /// A `Bool`.
    Bool(bool),
    /// An object instance.
    Object(Rc<RefCell<ObjectValue>>),
    /// An array.
    Array(Rc<RefCell<Vec<Value>>>),
    /// No value: the result of a `Void` call, `None` and unset slots.
    Void,
}

impl Value {
    /// Wraps a fresh object instance.
    #[must_use]
    pub fn object(ty: TypeId, fields: HashMap<String, Value>) -> Self {
        Self::Object(Rc::new(RefCell::new(ObjectValue { ty, fields })))
    }

    /// Wraps a fresh array.
    #[must_use]
    pub fn array(items: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    /// An array of `size` copies of `element`.
    ///
    /// # Errors
    /// Returns [`RuntimeError::AllocationFailed`] if the storage cannot be
    /// reserved.
    pub fn filled_array(element: Self, size: usize, line: usize) -> EvalResult<Self> {
        let mut items = Vec::new();
        items.try_reserve_exact(size)
             .map_err(|_| RuntimeError::AllocationFailed { size, line })?;
        items.resize(size, element);
        Ok(Self::array(items))
    }

    /// The value a field or array slot of type `ty` starts with.
    ///
    /// Numbers start at zero, `Bool` at `False`, `Char` empty and arrays
    /// empty. Objects start as `Void` until something is assigned.
    #[must_use]
    pub fn default_for(ty: TypeId, types: &TypeRegistry) -> Self {
        match ty {
            TypeId::INT => Self::Int(0),
            TypeId::FLOAT => Self::Rat(0.0),
            TypeId::BOOL => Self::Bool(false),
            TypeId::CHAR => Self::Str(String::new()),
            _ if types.element_of(ty).is_some() => Self::array(Vec::new()),
            _ => Self::Void,
        }
    }

    /// A short name of the value's kind for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Rat(_) => "Float",
            Self::Str(_) => "Char",
            Self::Bool(_) => "Bool",
            Self::Object(_) => "Object",
            Self::Array(_) => "Array",
            Self::Void => "Void",
        }
    }

    /// # Errors
    /// [`RuntimeError::ExpectedBoolean`] for anything but a `Bool`.
    pub const fn as_bool(&self, line: usize) -> EvalResult<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            _ => Err(RuntimeError::ExpectedBoolean { line }),
        }
    }

    /// # Errors
    /// [`RuntimeError::ExpectedInteger`] for anything but an `Int`.
    pub const fn as_int(&self, line: usize) -> EvalResult<i64> {
        match self {
            Self::Int(value) => Ok(*value),
            _ => Err(RuntimeError::ExpectedInteger { line }),
        }
    }

    /// Returns the shared array handle.
    ///
    /// # Errors
    /// [`RuntimeError::ExpectedArray`] for anything but an array.
    pub fn as_array(&self, line: usize) -> EvalResult<Rc<RefCell<Vec<Self>>>> {
        match self {
            Self::Array(items) => Ok(Rc::clone(items)),
            _ => Err(RuntimeError::ExpectedArray { line }),
        }
    }

    /// Returns the shared object handle.
    ///
    /// # Errors
    /// [`RuntimeError::ExpectedObject`] for anything but an object.
    pub fn as_object(&self, line: usize) -> EvalResult<Rc<RefCell<ObjectValue>>> {
        match self {
            Self::Object(object) => Ok(Rc::clone(object)),
            _ => Err(RuntimeError::ExpectedObject { line }),
        }
    }

    /// Applies a binary operator.
    ///
    /// - `Int` arithmetic is checked; division truncates.
    /// - `Char + Char` concatenates.
    /// - On `Bool`, `+` is `or` and `*` is `and`.
    /// - Ordering compares numbers numerically and strings by length.
    /// - `==` and `!=` accept any two values; objects and arrays are equal
    ///   only to themselves.
    ///
    /// # Errors
    /// Division by zero, integer overflow and operand kinds the operator does
    /// not support.
    ///
    /// # Example
    /// ```
    /// use kvantum::{ast::expression::BinaryOperator, interpreter::Value};
    ///
    /// let sum = Value::Int(2).binary(BinaryOperator::Add, &Value::Int(3), 1).unwrap();
    /// assert_eq!(sum, Value::Int(5));
    ///
    /// let longer = Value::from("abc").binary(BinaryOperator::Greater, &Value::from("zz"), 1).unwrap();
    /// assert_eq!(longer, Value::Bool(true));
    /// ```
    pub fn binary(&self, op: BinaryOperator, rhs: &Self, line: usize) -> EvalResult<Self> {
        use BinaryOperator as Op;

        let overflow = || RuntimeError::Overflow { line };
        let value = match (op, self, rhs) {
            (Op::Equal, ..) => Self::Bool(self == rhs),
            (Op::NotEqual, ..) => Self::Bool(self != rhs),

            (Op::Add, Self::Int(a), Self::Int(b)) => Self::Int(a.checked_add(*b).ok_or_else(overflow)?),
            (Op::Subtract, Self::Int(a), Self::Int(b)) => Self::Int(a.checked_sub(*b).ok_or_else(overflow)?),
            (Op::Multiply, Self::Int(a), Self::Int(b)) => Self::Int(a.checked_mul(*b).ok_or_else(overflow)?),
            (Op::Divide, Self::Int(_), Self::Int(0)) => return Err(RuntimeError::DivisionByZero { line }),
            (Op::Divide, Self::Int(a), Self::Int(b)) => Self::Int(a.checked_div(*b).ok_or_else(overflow)?),

            (Op::Add, Self::Rat(a), Self::Rat(b)) => Self::Rat(a + b),
            (Op::Subtract, Self::Rat(a), Self::Rat(b)) => Self::Rat(a - b),
            (Op::Multiply, Self::Rat(a), Self::Rat(b)) => Self::Rat(a * b),
            (Op::Divide, Self::Rat(a), Self::Rat(b)) => Self::Rat(a / b),

            (Op::Add, Self::Str(a), Self::Str(b)) => Self::Str(format!("{a}{b}")),

            (Op::Add | Op::Or, Self::Bool(a), Self::Bool(b)) => Self::Bool(*a || *b),
            (Op::Multiply | Op::And, Self::Bool(a), Self::Bool(b)) => Self::Bool(*a && *b),

            (Op::Less | Op::LessOrEqual | Op::Greater | Op::GreaterOrEqual, Self::Int(a), Self::Int(b)) => {
                Self::Bool(compare(op, a, b))
            },
            (Op::Less | Op::LessOrEqual | Op::Greater | Op::GreaterOrEqual, Self::Rat(a), Self::Rat(b)) => {
                Self::Bool(compare(op, a, b))
            },
            (Op::Less | Op::LessOrEqual | Op::Greater | Op::GreaterOrEqual, Self::Str(a), Self::Str(b)) => {
                Self::Bool(compare(op, &a.chars().count(), &b.chars().count()))
            },

            _ => {
                return Err(RuntimeError::TypeViolation { operation: op.symbol().to_string(),
                                                         lhs: self.kind(),
                                                         rhs: rhs.kind(),
                                                         line })
            },
        };
        Ok(value)
    }

    /// Converts the value for an explicit cast to `to`.
    ///
    /// `Int` and `Float` convert into each other, a `Float` truncating toward
    /// zero. Every other cast reinterprets the value unchanged.
    ///
    /// # Errors
    /// [`RuntimeError::Overflow`] when a number does not fit the target.
    pub fn cast(self, to: TypeId, line: usize) -> EvalResult<Self> {
        match (self, to) {
            (Self::Int(value), TypeId::FLOAT) => Ok(Self::Rat(i64_to_f64_checked(value, line)?)),
            (Self::Rat(value), TypeId::INT) => Ok(Self::Int(f64_to_i64_checked(value, line)?)),
            (value, _) => Ok(value),
        }
    }
}

fn compare<T: PartialOrd>(op: BinaryOperator, a: &T, b: &T) -> bool {
    match op {
        BinaryOperator::Less => a < b,
        BinaryOperator::LessOrEqual => a <= b,
        BinaryOperator::Greater => a > b,
        _ => a >= b,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Rat(a), Self::Rat(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Void, Self::Void) => true,
            _ => false,
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Integer(value) => Self::Int(*value),
            LiteralValue::Float(value) => Self::Rat(value.into_inner()),
            LiteralValue::Boolean(value) => Self::Bool(*value),
            LiteralValue::Char(value) => Self::Str(value.clone()),
            LiteralValue::None => Self::Void,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Rat(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::array(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Rat(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Object(_) => f.write_str("<object>"),
            Self::Array(items) => {
                f.write_str("<")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(">")
            },
            Self::Void => f.write_str("None"),
        }
    }
}
