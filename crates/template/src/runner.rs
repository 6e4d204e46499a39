// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statement-by-statement execution of a compiled template

use crate::ast::{CommandNode, DeclExpr, Statement, Val};
use crate::driver::{self, RunContext};
use crate::env::Env;
use crate::template::{new_id, Template};
use std::collections::HashMap;
use thiserror::Error;

/// Structural errors preventing execution. Command failures are not
/// errors here; they are recorded on the statement's node.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no command injected for '{0}'; template was not compiled for execution")]
    NotCompiled(String),

    #[error("cannot execute declaration '{0}': value is unresolved")]
    UnresolvedDeclaration(String),
}

impl Template {
    /// Execute statements in source order, returning the executed
    /// template (fresh id, per-node result/error filled in).
    ///
    /// A failing command halts the run: earlier statements keep their
    /// side effects, later statements are skipped, and the partial
    /// template is returned for reporting. Dry runs never halt; every
    /// statement surfaces its own result or error.
    pub fn run(&self, env: &mut Env) -> Result<Template, RunError> {
        let mut vars: HashMap<String, Val> = HashMap::new();
        let mut current = Template {
            id: new_id(),
            statements: Vec::new(),
        };

        for st in &self.statements {
            let mut st = st.clone();
            let halt = match &mut st {
                Statement::Command(node) => run_command(node, None, env, &mut vars)?,
                Statement::Declaration(decl) => match &mut decl.expr {
                    DeclExpr::Command(node) => {
                        run_command(node, Some(&decl.ident), env, &mut vars)?
                    }
                    DeclExpr::Value(expr) => {
                        expr.process_refs(&vars);
                        let Some(val) = expr.value() else {
                            return Err(RunError::UnresolvedDeclaration(decl.ident.clone()));
                        };
                        vars.insert(decl.ident.clone(), val.clone());
                        env.resolved_variables.insert(decl.ident.clone(), val);
                        false
                    }
                },
            };
            current.statements.push(st);
            if halt {
                break;
            }
        }

        Ok(current)
    }
}

/// Dispatch one command node; returns whether the run must halt.
fn run_command(
    node: &mut CommandNode,
    ident: Option<&str>,
    env: &mut Env,
    vars: &mut HashMap<String, Val>,
) -> Result<bool, RunError> {
    node.process_refs(vars);

    let Some(handle) = node.command.clone() else {
        return Err(RunError::NotCompiled(node.key()));
    };
    let ctx = RunContext::new(env.resolved_variables.clone());
    let params = node.driver_params();

    if env.is_dry_run {
        match driver::dry_run(&handle, &ctx, &params) {
            Some(Ok(result)) => node.result = Some(result),
            Some(Err(e)) => node.err = Some(format!("dry run: {}", e)),
            None => {}
        }
    } else {
        match driver::run(&handle, &ctx, &params) {
            Ok(result) => node.result = Some(result),
            Err(e) => node.err = Some(e.to_string()),
        }
    }

    if let (Some(ident), Some(result)) = (ident, &node.result) {
        let value = handle
            .lock()
            .extract_result(result)
            .map(Val::Str)
            .unwrap_or_else(|| result.clone());
        vars.insert(ident.to_string(), value.clone());
        env.resolved_variables.insert(ident.to_string(), value);
    }

    Ok(!env.is_dry_run && node.err.is_some())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
