// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template model and statement iterators

use crate::ast::{CommandNode, DeclExpr, Declaration, Expr, Statement};
use crate::parser::{self, ParseError};
use std::fmt;

/// Returns a fresh time-ordered, collision-resistant identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// An ordered sequence of statements, identified per run.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub statements: Vec<Statement>,
}

impl Template {
    /// An empty template with a fresh id.
    pub fn new() -> Self {
        Template {
            id: new_id(),
            statements: Vec::new(),
        }
    }

    /// Parse template source text into a statement list.
    pub fn parse(input: &str) -> Result<Template, ParseError> {
        let statements = parser::parse(input)?;
        Ok(Template {
            id: new_id(),
            statements,
        })
    }

    /// Every command node, whether a bare invocation or the right-hand
    /// side of a declaration, in statement order.
    pub fn command_nodes(&self) -> impl Iterator<Item = &CommandNode> {
        self.statements.iter().filter_map(Statement::command_node)
    }

    pub fn command_nodes_mut(&mut self) -> impl Iterator<Item = &mut CommandNode> {
        self.statements
            .iter_mut()
            .filter_map(Statement::command_node_mut)
    }

    /// Declarations whose right-hand side is a value expression.
    pub fn value_declarations(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.statements.iter().filter_map(|st| match st {
            Statement::Declaration(Declaration {
                ident,
                expr: DeclExpr::Value(expr),
            }) => Some((ident.as_str(), expr)),
            _ => None,
        })
    }

    /// Value expressions of every statement: command params plus the
    /// right-hand sides of value declarations, in statement order.
    pub fn expressions(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        for st in &self.statements {
            match st {
                Statement::Command(node) => out.extend(node.params.values()),
                Statement::Declaration(decl) => match &decl.expr {
                    DeclExpr::Command(node) => out.extend(node.params.values()),
                    DeclExpr::Value(expr) => out.push(expr),
                },
            }
        }
        out
    }

    pub fn expressions_mut(&mut self) -> Vec<&mut Expr> {
        let mut out = Vec::new();
        for st in &mut self.statements {
            match st {
                Statement::Command(node) => out.extend(node.params.values_mut()),
                Statement::Declaration(decl) => match &mut decl.expr {
                    DeclExpr::Command(node) => out.extend(node.params.values_mut()),
                    DeclExpr::Value(expr) => out.push(expr),
                },
            }
        }
        out
    }

    /// True when any command node recorded an execution error.
    pub fn has_errors(&self) -> bool {
        self.command_nodes().any(|cmd| cmd.err.is_some())
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::new()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, st) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", st)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
