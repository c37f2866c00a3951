use std::fmt;
use std::rc::Rc;

use crate::error::BasicResult;
use crate::expr::LiteralValue;
use crate::scanner::Token;
use crate::stmt::Stmt;

/// The universe of runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Nil,
    Number(f64),
    String(String),
    Function(Function),
    NativeFunction(NativeFunction),
}

/// User function wrapping its declaration. The parameter list and body are
/// shared, so copies made by variable lookups stay cheap and compare by
/// identity.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Rc<Vec<Token>>,
    pub body: Rc<Vec<Stmt>>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

pub type NativeFn = fn(&[Value]) -> BasicResult<Value>;

#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub arity: usize,
    pub func: NativeFn,
    pub name: String,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.func == other.func
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Nil, Value::Nil) => true,
            // IEEE-754 comparison, NaN is not equal to itself
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Function(left), Value::Function(right)) => left == right,
            (Value::NativeFunction(left), Value::NativeFunction(right)) => left == right,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(boolean: bool) -> Value {
        Value::Bool(boolean)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Value {
        Value::Number(number)
    }
}

impl From<String> for Value {
    fn from(string: String) -> Value {
        Value::String(string)
    }
}

impl From<LiteralValue> for Value {
    fn from(literal: LiteralValue) -> Value {
        match literal {
            LiteralValue::Boolean(value) => Value::Bool(value),
            LiteralValue::Nil => Value::Nil,
            LiteralValue::Number(value) => Value::Number(value),
            LiteralValue::String(value) => Value::String(value),
        }
    }
}

// Canonical textual form used by print and by the prompt.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Nil => write!(f, "nil"),
            Value::Number(value) => write!(f, "{}", format_number(*value)),
            Value::String(value) => write!(f, "{value}"),
            Value::Function(function) => write!(f, "<fn {}>", function.name.lexeme),
            Value::NativeFunction(_) => write!(f, "<native fn>"),
        }
    }
}

// Shortest decimal form without a trailing ".0"; the host prints "inf" and
// that spelling leaks into scripts, so infinities get the long name.
fn format_number(value: f64) -> String {
    if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        value.to_string()
    }
}
