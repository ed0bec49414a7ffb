//! The exprgate command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{fs, io::Read, process};

use clap::Parser;
use serde_json::json;

use crate::cli::args::{Command, ExprGateArgs};
use crate::errors::{GateError, SourceContext};
use crate::gate::Gate;
use crate::syntax::parser;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = ExprGateArgs::parse();

    let exit_code = match args.command {
        Command::Check {
            expression,
            file,
            json,
            max_depth,
        } => handle_check(expression, file, json, max_depth),
        Command::Ast { expression } => handle_ast(&expression),
    };

    process::exit(exit_code);
}

/// Handles the `check` subcommand. Exit code 0 means admitted, 1 rejected,
/// 2 usage or I/O trouble.
fn handle_check(
    expression: Option<String>,
    file: Option<std::path::PathBuf>,
    json: bool,
    max_depth: usize,
) -> i32 {
    let expression = match read_expression(expression, file) {
        Ok(text) => text,
        Err(message) => {
            eprintln!("error: {}", message);
            return 2;
        }
    };

    let gate = Gate::new().with_max_depth(max_depth);
    match gate.check(&expression) {
        Ok(()) => {
            if json {
                println!("{}", json!({ "ok": true }));
            } else {
                println!("ok");
            }
            0
        }
        Err(error) => {
            if json {
                println!("{}", verdict_json(&error));
            } else {
                eprintln!("{:?}", miette::Report::new(error));
            }
            1
        }
    }
}

/// Handles the `ast` subcommand.
fn handle_ast(expression: &str) -> i32 {
    let source = SourceContext::from_expression(expression);
    match parser::parse(expression, &source) {
        Ok(stmts) => {
            // Vec<Stmt> is always serializable.
            println!("{}", serde_json::to_string_pretty(&stmts).unwrap());
            0
        }
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            1
        }
    }
}

fn read_expression(
    expression: Option<String>,
    file: Option<std::path::PathBuf>,
) -> Result<String, String> {
    match (expression, file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => {
            if path.as_os_str() == "-" {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| format!("cannot read stdin: {}", e))?;
                Ok(text)
            } else {
                fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))
            }
        }
        (None, None) => Err("an expression or --file is required".into()),
        (Some(_), Some(_)) => Err("an expression and --file are mutually exclusive".into()),
    }
}

fn verdict_json(error: &GateError) -> serde_json::Value {
    json!({
        "ok": false,
        "category": error.category().as_str(),
        "code": error.diagnostic_info.error_code,
        "message": error.to_string(),
    })
}
