//! Tree-walking interpreter for the linnet scripting language.
//!
//! Source text goes in one end; program output or diagnostics come out the
//! other. The pipeline is scan ([`scanner`]), parse ([`parser`]), interpret
//! ([`interpreter`]), with every diagnostic routed through an
//! [`error::ErrorSink`] so callers decide where reports land.
//!
//! # Examples
//!
//! ```
//! use linnet::error::ErrorSink;
//! use linnet::Interpreter;
//!
//! let mut output = Vec::new();
//! let mut diagnostics = Vec::new();
//! {
//!     let mut interpreter = Interpreter::new(&mut output);
//!     let mut sink = ErrorSink::new(&mut diagnostics);
//!     linnet::run("print 1 + 2;", &mut interpreter, &mut sink);
//! }
//! assert_eq!(output, b"3\n");
//! ```
//!
//! # Limitations
//!
//! - Function call frames chain to the global environment rather than to the
//!   scope where the function was declared, so a function does not capture
//!   the block locals around its declaration.
//! - There is no `return` statement; every call produces `nil`.
//! - `class` is scanned as a keyword but has no grammar behind it yet.

pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod stmt;
pub mod value;

mod stdlib;

pub use interpreter::Interpreter;

use log::trace;

use error::ErrorSink;

/// Run a chunk of source through the full pipeline. Any static error
/// suppresses execution; a runtime error is reported to the sink after it has
/// unwound evaluation.
pub fn run(code: &str, interpreter: &mut Interpreter, sink: &mut ErrorSink) {
    trace!("scanning {} chars of source", code.len());
    let tokens = scanner::scan_tokens(code, sink);

    let statements = parser::parse(&tokens, sink);
    if sink.had_error {
        return;
    }

    if let Err(error) = interpreter.interpret(&statements) {
        sink.runtime_error(&error);
    }
}
