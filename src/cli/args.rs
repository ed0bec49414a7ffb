//! Defines the command-line arguments and subcommands for the exprgate CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "exprgate",
    version,
    about = "Fail-closed structural validator for untrusted configuration expressions."
)]
pub struct ExprGateArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check an expression against the admission policy.
    Check {
        /// The expression to check. Omit to read from a file instead.
        expression: Option<String>,
        /// Read the expression from this file.
        #[arg(long, short, conflicts_with = "expression")]
        file: Option<PathBuf>,
        /// Report the verdict as a JSON object.
        #[arg(long)]
        json: bool,
        /// Maximum permitted nesting depth.
        #[arg(long, default_value_t = crate::gate::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Show the syntax tree for an expression, without checking it.
    Ast {
        /// The expression to parse.
        #[arg(required = true)]
        expression: String,
    },
}
