use std::env;
use std::fs;
use std::io;
use std::io::Write;
use std::process;

use anyhow::Context;

use linnet::error::ErrorSink;
use linnet::Interpreter;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() > 1 {
        println!("Usage: linnet [script]");
        process::exit(64);
    } else if let Some(path) = args.first() {
        run_file(path)
    } else {
        run_prompt()
    }
}

fn run_file(path: &str) -> anyhow::Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read script at '{path}'"))?;

    let mut output_writer = io::stdout().lock();
    let mut diagnostic_writer = io::stderr().lock();
    let mut interpreter = Interpreter::new(&mut output_writer);
    let mut sink = ErrorSink::new(&mut diagnostic_writer);

    linnet::run(&contents, &mut interpreter, &mut sink);

    if sink.had_error {
        process::exit(65);
    }
    if sink.had_runtime_error {
        process::exit(70);
    }
    Ok(())
}

fn run_prompt() -> anyhow::Result<()> {
    println!("Welcome to the interactive prompt for the linnet interpreter.");

    let stdin = io::stdin();
    let mut output_writer = io::stdout().lock();
    let mut diagnostic_writer = io::stderr().lock();
    let mut interpreter = Interpreter::new(&mut output_writer);
    let mut sink = ErrorSink::new(&mut diagnostic_writer);

    let mut buffer = String::new();
    loop {
        // the stdout lock is reentrant, printing through a fresh handle is fine
        print!("> ");
        io::stdout().flush()?;

        buffer.clear();
        if stdin.read_line(&mut buffer)? == 0 {
            // end of input closes the session
            break;
        }

        linnet::run(&buffer, &mut interpreter, &mut sink);

        // the prompt survives errors, clear the flags for the next line
        sink.reset();
    }

    Ok(())
}
