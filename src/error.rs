use std::error::Error;
use std::fmt;
use std::io::Write;
use std::result;

use thiserror::Error;

use crate::scanner::{Token, TokenType};

pub type GenericResult<T> = result::Result<T, Box<dyn Error>>;
pub type BasicResult<T> = result::Result<T, BasicError>;

/// Message-only error used by native functions and driver glue.
#[derive(Debug)]
pub struct BasicError {
    pub description: String,
}

impl BasicError {
    pub fn new(description: &str) -> BasicError {
        BasicError {
            description: description.to_string(),
        }
    }
}

impl fmt::Display for BasicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl Error for BasicError {}

/// Lexical or syntactic error tied to a source location.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub line: u32,
    pub location: String,
    pub message: String,
}

impl SyntaxError {
    /// Error reported against a whole line, with no offending lexeme (scanner errors).
    pub fn at_line(line: u32, message: &str) -> SyntaxError {
        SyntaxError {
            line,
            location: String::new(),
            message: message.to_string(),
        }
    }

    /// Error reported at a specific token.
    pub fn at_token(token: &Token, message: &str) -> SyntaxError {
        let location = if token.token_type == TokenType::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        SyntaxError {
            line: token.line,
            location,
            message: message.to_string(),
        }
    }
}

/// Evaluation error carrying the line of the offending token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub line: u32,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: u32, message: &str) -> RuntimeError {
        RuntimeError {
            line,
            message: message.to_string(),
        }
    }
}

/// Collector for every diagnostic produced by a run.
///
/// Scanner and parser report here and keep going; the interpreter reports the
/// single runtime error that unwound evaluation. The flags drive the process
/// exit code in file mode and are reset between lines in the prompt.
pub struct ErrorSink<'a> {
    pub had_error: bool,
    pub had_runtime_error: bool,
    writer: &'a mut dyn Write,
}

impl<'a> ErrorSink<'a> {
    pub fn new(writer: &'a mut dyn Write) -> ErrorSink<'a> {
        ErrorSink {
            had_error: false,
            had_runtime_error: false,
            writer,
        }
    }

    pub fn syntax_error(&mut self, error: &SyntaxError) {
        self.had_error = true;
        writeln!(self.writer, "{error}").expect("Writing to diagnostic output should always succeed.");
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        self.had_runtime_error = true;
        writeln!(self.writer, "{error}").expect("Writing to diagnostic output should always succeed.");
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
