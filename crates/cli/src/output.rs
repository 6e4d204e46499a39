// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-statement run reporting

use std::io::Write;
use stratus_template::{DeclExpr, Statement, Template};

/// Print one line per executed statement:
///
/// ```text
/// [OK] sub = create subnet cidr=10.0.2.0/24 vpc=vpc-default -> subnet-0001
/// [KO] create instance image=ami-1 ...: provider error: ...
/// ```
pub fn report(executed: &Template, out: &mut impl Write) -> std::io::Result<()> {
    for st in &executed.statements {
        let (label, node) = match st {
            Statement::Command(node) => (None, node),
            Statement::Declaration(decl) => match &decl.expr {
                DeclExpr::Command(node) => (Some(decl.ident.as_str()), node),
                DeclExpr::Value(_) => continue,
            },
        };

        let rendered = match label {
            Some(ident) => format!("{} = {}", ident, node),
            None => node.to_string(),
        };

        match (&node.err, &node.result) {
            (Some(err), _) => writeln!(out, "[KO] {}: {}", rendered, err)?,
            (None, Some(result)) => writeln!(out, "[OK] {} -> {}", rendered, result)?,
            (None, None) => writeln!(out, "[--] {}", rendered)?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
