use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::scanner::Token;
use crate::value::Value;

/// Handle to one scope in the lexical chain.
///
/// Cloning copies the handle, not the bindings: every clone observes the same
/// mutations. Scopes point only at their enclosing scope, so the chain is
/// acyclic and a scope stays alive for as long as any handle or child scope
/// references it.
#[derive(Debug, Clone)]
pub struct Environment {
    scope: Rc<Scope>,
}

#[derive(Debug)]
struct Scope {
    values: RefCell<HashMap<String, Value>>,
    enclosing: Option<Environment>,
}

impl Environment {
    /// The outermost scope, ending the chain.
    pub fn new() -> Environment {
        Environment {
            scope: Rc::new(Scope {
                values: RefCell::new(HashMap::new()),
                enclosing: None,
            }),
        }
    }

    /// A child scope whose lookups fall through to `enclosing`.
    pub fn with_enclosing(enclosing: &Environment) -> Environment {
        Environment {
            scope: Rc::new(Scope {
                values: RefCell::new(HashMap::new()),
                enclosing: Some(enclosing.clone()),
            }),
        }
    }

    // a second define for the same name overwrites the first
    pub fn define(&self, name: String, value: Value) {
        self.scope.values.borrow_mut().insert(name, value);
    }

    /// Nearest binding for the token's lexeme, walking the chain outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let mut current = self;
        loop {
            if let Some(value) = current.scope.values.borrow().get(&name.lexeme) {
                return Ok(value.clone());
            }
            match &current.scope.enclosing {
                Some(enclosing) => current = enclosing,
                None => {
                    return Err(RuntimeError::new(
                        name.line,
                        &format!("Undefined variable '{}'.", name.lexeme),
                    ))
                }
            }
        }
    }

    /// Update the nearest binding; assignment never creates one.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut current = self;
        loop {
            if current.scope.values.borrow().contains_key(&name.lexeme) {
                current
                    .scope
                    .values
                    .borrow_mut()
                    .insert(name.lexeme.clone(), value);
                return Ok(());
            }
            match &current.scope.enclosing {
                Some(enclosing) => current = enclosing,
                None => {
                    return Err(RuntimeError::new(
                        name.line,
                        &format!("Undefined Variable '{}'.", name.lexeme),
                    ))
                }
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}
