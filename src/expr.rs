use crate::scanner::Token;
use crate::scanner::TokenType;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Grouping {
        expression: Box<Expr>,
    },
    Literal {
        value: LiteralValue,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Boolean(bool),
    Nil,
    Number(f64),
    String(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Nil => write!(f, "nil"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
        }
    }
}

impl From<&Token> for LiteralValue {
    fn from(token: &Token) -> LiteralValue {
        match &token.token_type {
            TokenType::False => LiteralValue::Boolean(false),
            TokenType::True => LiteralValue::Boolean(true),
            TokenType::Nil => LiteralValue::Nil,
            TokenType::Number(value) => LiteralValue::Number(*value),
            TokenType::String(value) => LiteralValue::String(value.clone()),
            // reaching this arm indicates a bug in the parser
            _ => panic!("no literal value behind token {:?}", token.token_type),
        }
    }
}

/// Render an expression tree in prefix parenthesized form, e.g. "(+ 1 (* 2 3))".
pub fn print_ast(root: &Expr) -> String {
    match root {
        Expr::Assign { name, value } => wrap(&format!("= {}", name.lexeme), &[value.as_ref()]),
        Expr::Binary {
            left,
            operator,
            right,
        } => wrap(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
        Expr::Call {
            callee,
            paren: _,
            arguments,
        } => {
            let mut parts = vec![print_ast(callee)];
            parts.extend(arguments.iter().map(print_ast));
            format!("(call {})", parts.join(" "))
        }
        Expr::Grouping { expression } => wrap("group", &[expression.as_ref()]),
        Expr::Literal { value } => value.to_string(),
        Expr::Logical {
            left,
            operator,
            right,
        } => wrap(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
        Expr::Unary { operator, right } => wrap(&operator.lexeme, &[right.as_ref()]),
        Expr::Variable { name } => name.lexeme.clone(),
    }
}

// label and children between one pair of parens, all separated by spaces
fn wrap(label: &str, children: &[&Expr]) -> String {
    let mut rendered = format!("({label}");
    for child in children {
        rendered.push(' ');
        rendered.push_str(&print_ast(child));
    }
    rendered.push(')');
    rendered
}
