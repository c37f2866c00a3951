use std::io::Write;
use std::mem;
use std::rc::Rc;

use log::{debug, trace};

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::{Expr, LiteralValue};
use crate::scanner::{Token, TokenType};
use crate::stdlib;
use crate::stmt::Stmt;
use crate::value::{Function, Value};

type ValueResult = Result<Value, RuntimeError>;
type StatementResult = Result<(), RuntimeError>;

/// Tree-walking evaluator.
///
/// Holds the currently active environment, which always chains back to the
/// globals created at construction, and the writer that receives program
/// output. One interpreter per thread; instances are independent.
pub struct Interpreter<'a> {
    globals: Environment,
    environment: Environment,
    output_writer: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output_writer: &'a mut dyn Write) -> Interpreter<'a> {
        let globals = Environment::new();
        for native in stdlib::standard_library() {
            debug!("defining native function '{}'", native.name);
            globals.define(native.name.clone(), Value::NativeFunction(native));
        }

        Interpreter {
            environment: globals.clone(),
            globals,
            output_writer,
        }
    }

    /// Execute statements top to bottom, stopping at the first runtime error.
    /// The error unwinds to the caller with the active environment already
    /// restored to the one in effect when interpretation began.
    pub fn interpret(&mut self, statements: &[Stmt]) -> StatementResult {
        trace!("interpreting {} statements", statements.len());
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Stmt) -> StatementResult {
        match statement {
            Stmt::Block { statements } => self.block_statement(statements),
            Stmt::Expression { expression } => self.expression_statement(expression),
            Stmt::Function { name, params, body } => self.function_statement(name, params, body),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.if_statement(condition, then_branch, else_branch),
            Stmt::Print { expression } => self.print_statement(expression),
            Stmt::Var { name, initializer } => self.var_statement(name, initializer),
            Stmt::While { condition, body } => self.while_statement(condition, body),
        }
    }

    fn block_statement(&mut self, statements: &[Stmt]) -> StatementResult {
        self.execute_block(statements, Environment::with_enclosing(&self.environment))
    }

    // Runs statements with the given environment active, restoring the
    // previous one on every exit path, runtime errors included.
    fn execute_block(&mut self, statements: &[Stmt], environment: Environment) -> StatementResult {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            result = self.execute_statement(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn expression_statement(&mut self, expression: &Expr) -> StatementResult {
        self.evaluate(expression)?;
        Ok(())
    }

    fn function_statement(&mut self, name: &Token, params: &[Token], body: &[Stmt]) -> StatementResult {
        let function = Function {
            name: name.clone(),
            params: Rc::new(params.to_vec()),
            body: Rc::new(body.to_vec()),
        };
        self.environment
            .define(name.lexeme.clone(), Value::Function(function));
        Ok(())
    }

    fn if_statement(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: &Option<Box<Stmt>>,
    ) -> StatementResult {
        if is_truthy(&self.evaluate(condition)?) {
            self.execute_statement(then_branch)
        } else if let Some(else_statement) = else_branch {
            self.execute_statement(else_statement)
        } else {
            Ok(())
        }
    }

    fn print_statement(&mut self, expression: &Expr) -> StatementResult {
        let result = self.evaluate(expression)?;
        writeln!(self.output_writer, "{result}")
            .expect("Writing to program output should always succeed.");
        Ok(())
    }

    fn var_statement(&mut self, name: &Token, initializer: &Option<Expr>) -> StatementResult {
        let value = match initializer {
            Some(expression) => self.evaluate(expression)?,
            // uninitialized variables default to nil
            None => Value::Nil,
        };
        self.environment.define(name.lexeme.clone(), value);
        Ok(())
    }

    fn while_statement(&mut self, condition: &Expr, body: &Stmt) -> StatementResult {
        while is_truthy(&self.evaluate(condition)?) {
            self.execute_statement(body)?;
        }
        Ok(())
    }

    fn evaluate(&mut self, expression: &Expr) -> ValueResult {
        match expression {
            Expr::Assign { name, value } => self.evaluate_assign(name, value),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
            Expr::Grouping { expression } => self.evaluate_grouping(expression),
            Expr::Literal { value } => evaluate_literal(value),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),
            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),
            Expr::Variable { name } => self.evaluate_variable(name),
        }
    }

    fn evaluate_assign(&mut self, name: &Token, value: &Expr) -> ValueResult {
        let result = self.evaluate(value)?;
        self.environment.assign(name, result.clone())?;
        Ok(result)
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> ValueResult {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Plus => match (left, right) {
                (Value::Number(left), Value::Number(right)) => Ok(Value::from(left + right)),
                (Value::String(left), Value::String(right)) => {
                    Ok(Value::from(format!("{left}{right}")))
                }
                _ => Err(RuntimeError::new(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::Minus => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left - right))
            }
            TokenType::Slash => {
                // division by zero follows IEEE-754, no explicit check
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left / right))
            }
            TokenType::Star => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left * right))
            }
            TokenType::Greater => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left > right))
            }
            TokenType::GreaterEqual => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left >= right))
            }
            TokenType::Less => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left < right))
            }
            TokenType::LessEqual => {
                let (left, right) = check_number_operands(operator, &left, &right)?;
                Ok(Value::from(left <= right))
            }
            // equality works across every value kind, no operand check
            TokenType::EqualEqual => Ok(Value::from(left == right)),
            TokenType::BangEqual => Ok(Value::from(left != right)),
            // unhandled case here indicates a bug in the parser or interpreter
            _ => panic!(
                "Unhandled binary operation type: {:?}",
                operator.token_type
            ),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> ValueResult {
        match self.evaluate(callee)? {
            Value::NativeFunction(native) => {
                let arguments = self.evaluate_arguments(arguments)?;
                check_arity(paren, native.arity, arguments.len())?;
                (native.func)(&arguments)
                    .map_err(|error| RuntimeError::new(paren.line, &error.description))
            }
            Value::Function(function) => {
                let arguments = self.evaluate_arguments(arguments)?;
                check_arity(paren, function.arity(), arguments.len())?;
                self.call_function(&function, arguments)
            }
            _ => Err(RuntimeError::new(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }

    fn evaluate_arguments(&mut self, arguments: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut evaluated = Vec::with_capacity(arguments.len());
        for argument in arguments {
            evaluated.push(self.evaluate(argument)?);
        }
        Ok(evaluated)
    }

    // Call frames hang off the globals, not the scope where the function was
    // declared, so block locals are invisible to the body at call time.
    fn call_function(&mut self, function: &Function, arguments: Vec<Value>) -> ValueResult {
        let environment = Environment::with_enclosing(&self.globals);
        for (param, argument) in function.params.iter().zip(arguments) {
            environment.define(param.lexeme.clone(), argument);
        }

        self.execute_block(&function.body, environment)?;

        // there is no return statement, calls always produce nil
        Ok(Value::Nil)
    }

    fn evaluate_grouping(&mut self, expression: &Expr) -> ValueResult {
        self.evaluate(expression)
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> ValueResult {
        let left = self.evaluate(left)?;

        // short circuit yields the deciding operand unchanged
        if operator.token_type == TokenType::Or {
            if is_truthy(&left) {
                return Ok(left);
            }
        } else if operator.token_type == TokenType::And {
            if !is_truthy(&left) {
                return Ok(left);
            }
        } else {
            // unhandled case here indicates a bug in the parser or interpreter
            panic!("Unhandled logical operator: {:?}", operator.token_type);
        }

        self.evaluate(right)
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> ValueResult {
        let operand = self.evaluate(right)?;
        match operator.token_type {
            TokenType::Bang => Ok(Value::from(!is_truthy(&operand))),
            TokenType::Minus => {
                let value = check_number_operand(operator, &operand)?;
                Ok(Value::from(-value))
            }
            // unhandled case here indicates a bug in the parser or interpreter
            _ => panic!(
                "Unary expression not implemented in interpreter: {:?}",
                operator.token_type
            ),
        }
    }

    fn evaluate_variable(&mut self, name: &Token) -> ValueResult {
        self.environment.get(name)
    }
}

fn evaluate_literal(value: &LiteralValue) -> ValueResult {
    Ok(Value::from(value.clone()))
}

fn check_number_operand(operator: &Token, operand: &Value) -> Result<f64, RuntimeError> {
    match operand {
        Value::Number(value) => Ok(*value),
        _ => Err(RuntimeError::new(operator.line, "Operand must be a number.")),
    }
}

fn check_number_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeError::new(operator.line, "Operands must be numbers.")),
    }
}

fn check_arity(paren: &Token, arity: usize, count: usize) -> Result<(), RuntimeError> {
    if count == arity {
        Ok(())
    } else {
        Err(RuntimeError::new(
            paren.line,
            &format!("Expected {arity} arguments, but got {count}."),
        ))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(value) => *value,
        _ => true,
    }
}
