// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Externally provided parameter strings
//!
//! Fillers may arrive from outside the template, e.g. a CLI tail like
//! `count=3 subnets=[@a, @b] name='my lb'`. They use the same value
//! grammar as the template language, so alias and list forms are honored.

use crate::ast::Expr;
use crate::parser::ParseError;
use std::collections::HashMap;

/// Parse a whitespace-separated `key=value` list into fillers.
pub fn parse_params(input: &str) -> Result<HashMap<String, Expr>, ParseError> {
    let mut out = HashMap::new();
    for (key, expr) in crate::parser::parse_param_bindings(input)? {
        out.insert(key, expr);
    }
    Ok(out)
}

/// Parse a single value using the template value grammar.
///
/// Used for missing-hole replies: `@alias`, `[a,b]` and quoted strings
/// all behave as they would inside a template.
pub fn parse_value(input: &str) -> Result<Expr, ParseError> {
    crate::parser::parse_single_value(input)
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
