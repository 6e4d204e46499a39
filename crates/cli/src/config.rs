// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default fillers from a TOML file
//!
//! Nested tables flatten to dotted hole names, so
//!
//! ```toml
//! [instance]
//! type = "t2.micro"
//! count = 1
//! ```
//!
//! provides fillers for `{instance.type}` and `{instance.count}`.
//! String values use the template value grammar, so `"@myvpc"` is an
//! alias and `"[a,b]"` a list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use stratus_template::{parse_value, Expr, Val};
use thiserror::Error;

/// Errors while loading default fillers
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read defaults file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid defaults file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported value for '{key}': {reason}")]
    UnsupportedValue { key: String, reason: String },
}

/// The conventional defaults location, e.g.
/// `~/.config/stratus/defaults.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stratus").join("defaults.toml"))
}

/// Load fillers from a TOML defaults file.
pub fn load_defaults(path: &Path) -> Result<HashMap<String, Expr>, ConfigError> {
    parse_defaults(&std::fs::read_to_string(path)?)
}

/// Parse TOML content into fillers.
pub fn parse_defaults(content: &str) -> Result<HashMap<String, Expr>, ConfigError> {
    let table: toml::Table = content.parse()?;
    let mut out = HashMap::new();
    flatten("", &table, &mut out)?;
    Ok(out)
}

fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut HashMap<String, Expr>,
) -> Result<(), ConfigError> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            toml::Value::Table(inner) => flatten(&key, inner, out)?,
            other => {
                out.insert(key.clone(), to_expr(&key, other)?);
            }
        }
    }
    Ok(())
}

fn to_expr(key: &str, value: &toml::Value) -> Result<Expr, ConfigError> {
    match value {
        toml::Value::String(s) => {
            // template value grammar first, raw string as fallback
            Ok(parse_value(s).unwrap_or_else(|_| Expr::Lit(Val::Str(s.clone()))))
        }
        toml::Value::Integer(i) => Ok(Expr::Lit(Val::Int(*i))),
        toml::Value::Boolean(b) => Ok(Expr::Lit(Val::Bool(*b))),
        toml::Value::Array(items) => {
            let mut exprs = Vec::with_capacity(items.len());
            for item in items {
                exprs.push(to_expr(key, item)?);
            }
            Ok(Expr::List(exprs))
        }
        other => Err(ConfigError::UnsupportedValue {
            key: key.to_string(),
            reason: format!("{} values cannot fill holes", other.type_str()),
        }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
