// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Template compilation and execution
//!
//! A template is an ordered list of cloud operations with parameter
//! bindings. Compilation is a pipeline of rewriting and validation
//! passes over the parsed statements; the runner then drives each
//! statement through its registered command object.

mod ast;
mod compile;
mod driver;
mod env;
mod params;
mod parser;
mod passes;
mod runner;
mod template;

pub use ast::{CommandNode, DeclExpr, Declaration, Expr, Statement, Val};
pub use compile::{
    compile, CompileError, Mode, Pass, LENIENT_COMPILE_MODE, RUNNER_COMPILE_MODE,
    STRICT_COMPILE_MODE,
};
pub use driver::{
    dry_run, run, Command, CommandError, CommandHandle, DriverParams, ParamsConversion, Registry,
    RegistryError, RunContext,
};
pub use env::{AliasFn, DefLookupFn, Definition, Env, LookupFn, MissingHolesFn};
pub use params::{parse_params, parse_value};
pub use parser::ParseError;
pub use runner::RunError;
pub use template::Template;
