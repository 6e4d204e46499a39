// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statement and value-expression nodes

use crate::driver::{CommandHandle, DriverParams};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

/// Bare words that survive printing without quotes.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static SIMPLE_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.:/~^;-]+$").expect("constant regex pattern is valid")
});

/// A plain, fully-resolved parameter value.
///
/// This is the flat form commands receive at execution time; expressions
/// collapse into it once every hole, reference and alias is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Val {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Val>),
}

impl Val {
    /// Text used when this value is spliced into a concatenation.
    pub fn raw_text(&self) -> String {
        match self {
            Val::Str(s) => s.clone(),
            Val::Int(i) => i.to_string(),
            Val::Bool(b) => b.to_string(),
            Val::List(items) => items
                .iter()
                .map(Val::raw_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl From<i64> for Val {
    fn from(i: i64) -> Self {
        Val::Int(i)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Str(s) => {
                if SIMPLE_STRING.is_match(s) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "'{}'", s)
                }
            }
            Val::Int(i) => write!(f, "{}", i),
            Val::Bool(b) => write!(f, "{}", b),
            Val::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A value expression: the right-hand side of a param binding or of a
/// variable declaration.
///
/// An expression is *resolved* when it contains no hole, reference or
/// alias. Capabilities ("has holes", "has refs", "has aliases") are
/// derived structurally rather than declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// An already-resolved literal.
    Lit(Val),
    /// `{name}`, filled from fillers or the missing-hole callback.
    Hole(String),
    /// `$name`, bound to a previously declared identifier.
    Ref(String),
    /// `@name`, resolved against the local resource index.
    Alias(String),
    /// Parts joined into one string once every part is resolved.
    Concat(Vec<Expr>),
    /// An ordered list of expressions.
    List(Vec<Expr>),
}

impl Expr {
    /// Hole names carried by this expression, in structural order.
    pub fn holes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_holes(&mut out);
        out
    }

    fn collect_holes(&self, out: &mut Vec<String>) {
        match self {
            Expr::Hole(name) => out.push(name.clone()),
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.collect_holes(out);
                }
            }
            _ => {}
        }
    }

    /// Reference names carried by this expression, in structural order.
    pub fn refs(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut Vec<String>) {
        match self {
            Expr::Ref(name) => out.push(name.clone()),
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.collect_refs(out);
                }
            }
            _ => {}
        }
    }

    /// Alias names carried by this expression, in structural order.
    pub fn aliases(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_aliases(&mut out);
        out
    }

    fn collect_aliases(&self, out: &mut Vec<String>) {
        match self {
            Expr::Alias(name) => out.push(name.clone()),
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.collect_aliases(out);
                }
            }
            _ => {}
        }
    }

    /// True when the expression contains no hole, reference or alias.
    pub fn is_resolved(&self) -> bool {
        match self {
            Expr::Lit(_) => true,
            Expr::Hole(_) | Expr::Ref(_) | Expr::Alias(_) => false,
            Expr::Concat(parts) | Expr::List(parts) => parts.iter().all(Expr::is_resolved),
        }
    }

    /// The plain value of a resolved expression, `None` otherwise.
    pub fn value(&self) -> Option<Val> {
        match self {
            Expr::Lit(v) => Some(v.clone()),
            Expr::Hole(_) | Expr::Ref(_) | Expr::Alias(_) => None,
            Expr::Concat(parts) => {
                let mut joined = String::new();
                for p in parts {
                    joined.push_str(&p.value()?.raw_text());
                }
                Some(Val::Str(joined))
            }
            Expr::List(parts) => {
                let mut items = Vec::with_capacity(parts.len());
                for p in parts {
                    items.push(p.value()?);
                }
                Some(Val::List(items))
            }
        }
    }

    /// Replace holes that have a filler, returning the consumed fillers.
    ///
    /// A filler may itself be an unresolved expression (typically an
    /// alias); the hole then becomes that expression and is handled by a
    /// later pass.
    pub fn process_holes(&mut self, fillers: &HashMap<String, Expr>) -> HashMap<String, Expr> {
        let mut consumed = HashMap::new();
        self.process_holes_inner(fillers, &mut consumed);
        self.normalize();
        consumed
    }

    fn process_holes_inner(
        &mut self,
        fillers: &HashMap<String, Expr>,
        consumed: &mut HashMap<String, Expr>,
    ) {
        match self {
            Expr::Hole(name) => {
                if let Some(fill) = fillers.get(name) {
                    consumed.insert(name.clone(), fill.clone());
                    *self = fill.clone();
                }
            }
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.process_holes_inner(fillers, consumed);
                }
            }
            _ => {}
        }
    }

    /// Replace references with values from `vars` (run-time binding).
    pub fn process_refs(&mut self, vars: &HashMap<String, Val>) {
        self.process_refs_inner(vars);
        self.normalize();
    }

    fn process_refs_inner(&mut self, vars: &HashMap<String, Val>) {
        match self {
            Expr::Ref(name) => {
                if let Some(val) = vars.get(name) {
                    *self = Expr::Lit(val.clone());
                }
            }
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.process_refs_inner(vars);
                }
            }
            _ => {}
        }
    }

    /// Replace every `$ident` with a deep copy of `with` (inlining).
    pub fn replace_ref(&mut self, ident: &str, with: &Expr) {
        self.replace_ref_inner(ident, with);
        self.normalize();
    }

    fn replace_ref_inner(&mut self, ident: &str, with: &Expr) {
        match self {
            Expr::Ref(name) if name == ident => *self = with.clone(),
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.replace_ref_inner(ident, with);
                }
            }
            _ => {}
        }
    }

    /// Resolve aliases through `f`; `None` leaves the alias in place.
    pub fn resolve_aliases<F>(&mut self, f: &mut F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.resolve_aliases_inner(f);
        self.normalize();
    }

    fn resolve_aliases_inner<F>(&mut self, f: &mut F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        match self {
            Expr::Alias(name) => {
                if let Some(actual) = f(name) {
                    *self = Expr::Lit(Val::Str(actual));
                }
            }
            Expr::Concat(parts) | Expr::List(parts) => {
                for p in parts {
                    p.resolve_aliases_inner(f);
                }
            }
            _ => {}
        }
    }

    /// Collapse concatenations whose parts are all resolved.
    fn normalize(&mut self) {
        match self {
            Expr::Concat(parts) => {
                for p in parts.iter_mut() {
                    p.normalize();
                }
                if parts.iter().all(Expr::is_resolved) {
                    let mut joined = String::new();
                    for p in parts.iter() {
                        if let Some(v) = p.value() {
                            joined.push_str(&v.raw_text());
                        }
                    }
                    *self = Expr::Lit(Val::Str(joined));
                }
            }
            Expr::List(parts) => {
                for p in parts.iter_mut() {
                    p.normalize();
                }
            }
            _ => {}
        }
    }
}

impl From<Val> for Expr {
    fn from(v: Val) -> Self {
        match v {
            Val::List(items) => Expr::List(items.into_iter().map(Expr::from).collect()),
            scalar => Expr::Lit(scalar),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(v) => write!(f, "{}", v),
            Expr::Hole(name) => write!(f, "{{{}}}", name),
            Expr::Ref(name) => write!(f, "${}", name),
            Expr::Alias(name) => write!(f, "@{}", name),
            Expr::Concat(parts) => {
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "+")?;
                    }
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
            Expr::List(parts) => {
                write!(f, "[")?;
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A command invocation: `action entity key=value …`.
///
/// The `command`, `result` and `err` fields are late-bound: the command
/// object is attached by the injection pass, the other two by the runner.
#[derive(Clone, Default)]
pub struct CommandNode {
    pub action: String,
    pub entity: String,
    pub params: BTreeMap<String, Expr>,
    pub command: Option<CommandHandle>,
    pub result: Option<Val>,
    pub err: Option<String>,
}

impl CommandNode {
    pub fn new(action: impl Into<String>, entity: impl Into<String>) -> Self {
        CommandNode {
            action: action.into(),
            entity: entity.into(),
            ..CommandNode::default()
        }
    }

    /// The registry lookup key: `action` and `entity` concatenated.
    pub fn key(&self) -> String {
        format!("{}{}", self.action, self.entity)
    }

    /// Param keys currently present on the node.
    pub fn keys(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    /// The flat param form handed to commands. Unresolved entries are
    /// skipped; they are either tolerated (live references) or already
    /// rejected by a guard pass.
    pub fn driver_params(&self) -> DriverParams {
        self.params
            .iter()
            .filter_map(|(k, e)| e.value().map(|v| (k.clone(), v)))
            .collect()
    }

    /// Param keys whose expression still carries a live reference.
    pub fn ref_keys(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|(_, e)| !e.refs().is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn process_refs(&mut self, vars: &HashMap<String, Val>) {
        for expr in self.params.values_mut() {
            expr.process_refs(vars);
        }
    }

    fn collect_from_params(&self, mut per_expr: impl FnMut(&Expr, &mut Vec<String>)) -> Vec<String> {
        let mut out = Vec::new();
        for expr in self.params.values() {
            per_expr(expr, &mut out);
        }
        out
    }

    pub fn holes(&self) -> Vec<String> {
        self.collect_from_params(|e, out| out.extend(e.holes()))
    }

    pub fn refs(&self) -> Vec<String> {
        self.collect_from_params(|e, out| out.extend(e.refs()))
    }

    pub fn aliases(&self) -> Vec<String> {
        self.collect_from_params(|e, out| out.extend(e.aliases()))
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("action", &self.action)
            .field("entity", &self.entity)
            .field("params", &self.params)
            .field("command", &self.command.as_ref().map(|_| "<injected>"))
            .field("result", &self.result)
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.entity)?;
        for (key, expr) in &self.params {
            write!(f, " {}={}", key, expr)?;
        }
        Ok(())
    }
}

/// The right-hand side of a declaration.
#[derive(Debug, Clone)]
pub enum DeclExpr {
    Command(CommandNode),
    Value(Expr),
}

/// `ident = expr`
#[derive(Debug, Clone)]
pub struct Declaration {
    pub ident: String,
    pub expr: DeclExpr,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            DeclExpr::Command(node) => write!(f, "{} = {}", self.ident, node),
            DeclExpr::Value(expr) => write!(f, "{} = {}", self.ident, expr),
        }
    }
}

/// One template statement.
#[derive(Debug, Clone)]
pub enum Statement {
    Command(CommandNode),
    Declaration(Declaration),
}

impl Statement {
    /// The command node carried by this statement, if any.
    pub fn command_node(&self) -> Option<&CommandNode> {
        match self {
            Statement::Command(node) => Some(node),
            Statement::Declaration(decl) => match &decl.expr {
                DeclExpr::Command(node) => Some(node),
                DeclExpr::Value(_) => None,
            },
        }
    }

    pub fn command_node_mut(&mut self) -> Option<&mut CommandNode> {
        match self {
            Statement::Command(node) => Some(node),
            Statement::Declaration(decl) => match &mut decl.expr {
                DeclExpr::Command(node) => Some(node),
                DeclExpr::Value(_) => None,
            },
        }
    }

    /// Reference names used anywhere in this statement's expression.
    pub fn refs(&self) -> Vec<String> {
        match self {
            Statement::Command(node) => node.refs(),
            Statement::Declaration(decl) => match &decl.expr {
                DeclExpr::Command(node) => node.refs(),
                DeclExpr::Value(expr) => expr.refs(),
            },
        }
    }

    /// Hole names used anywhere in this statement's expression.
    pub fn holes(&self) -> Vec<String> {
        match self {
            Statement::Command(node) => node.holes(),
            Statement::Declaration(decl) => match &decl.expr {
                DeclExpr::Command(node) => node.holes(),
                DeclExpr::Value(expr) => expr.holes(),
            },
        }
    }

    /// Alias names used anywhere in this statement's expression.
    pub fn aliases(&self) -> Vec<String> {
        match self {
            Statement::Command(node) => node.aliases(),
            Statement::Declaration(decl) => match &decl.expr {
                DeclExpr::Command(node) => node.aliases(),
                DeclExpr::Value(expr) => expr.aliases(),
            },
        }
    }

    /// Inline `$ident` with a copy of `with` in this statement.
    pub fn replace_ref(&mut self, ident: &str, with: &Expr) {
        match self {
            Statement::Command(node) => {
                for expr in node.params.values_mut() {
                    expr.replace_ref(ident, with);
                }
            }
            Statement::Declaration(decl) => match &mut decl.expr {
                DeclExpr::Command(node) => {
                    for expr in node.params.values_mut() {
                        expr.replace_ref(ident, with);
                    }
                }
                DeclExpr::Value(expr) => expr.replace_ref(ident, with),
            },
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Command(node) => write!(f, "{}", node),
            Statement::Declaration(decl) => write!(f, "{}", decl),
        }
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
