// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver-param access helpers for command implementations

use crate::api::ApiError;
use stratus_template::{CommandError, DriverParams, Val};

/// Generic shape check for commands with a flat required/extra schema.
/// Unknown keys are structural errors; absent required keys are returned
/// so the pipeline can turn them into holes.
pub(crate) fn shape_check(
    keys: &[String],
    required: &[&str],
    extra: &[&str],
) -> Result<Vec<String>, CommandError> {
    for k in keys {
        if !required.contains(&k.as_str()) && !extra.contains(&k.as_str()) {
            return Err(CommandError::UnexpectedParam(k.clone()));
        }
    }
    Ok(required
        .iter()
        .filter(|r| !keys.iter().any(|k| k == *r))
        .map(|r| (*r).to_string())
        .collect())
}

/// Compile-time check that every required param is bound or will be
/// bound by a run-time reference.
pub(crate) fn missing_required_errors(
    params: &DriverParams,
    ref_keys: &[String],
    required: &[&str],
) -> Vec<CommandError> {
    required
        .iter()
        .filter(|r| !params.contains_key(**r) && !ref_keys.iter().any(|k| k == *r))
        .map(|r| CommandError::MissingParam((*r).to_string()))
        .collect()
}

fn coerce_str(key: &str, val: &Val) -> Result<String, CommandError> {
    match val {
        Val::Str(s) => Ok(s.clone()),
        Val::Int(i) => Ok(i.to_string()),
        Val::Bool(b) => Ok(b.to_string()),
        Val::List(_) => Err(CommandError::InvalidParam {
            key: key.to_string(),
            reason: "expected a single value, got a list".to_string(),
        }),
    }
}

pub(crate) fn required_str(params: &DriverParams, key: &str) -> Result<String, CommandError> {
    let val = params
        .get(key)
        .ok_or_else(|| CommandError::MissingParam(key.to_string()))?;
    coerce_str(key, val)
}

pub(crate) fn optional_str(
    params: &DriverParams,
    key: &str,
) -> Result<Option<String>, CommandError> {
    params.get(key).map(|v| coerce_str(key, v)).transpose()
}

pub(crate) fn required_int(params: &DriverParams, key: &str) -> Result<i64, CommandError> {
    let val = params
        .get(key)
        .ok_or_else(|| CommandError::MissingParam(key.to_string()))?;
    match val {
        Val::Int(i) => Ok(*i),
        Val::Str(s) => s.parse().map_err(|_| CommandError::InvalidParam {
            key: key.to_string(),
            reason: format!("'{}' is not an integer", s),
        }),
        _ => Err(CommandError::InvalidParam {
            key: key.to_string(),
            reason: "expected an integer".to_string(),
        }),
    }
}

pub(crate) fn optional_bool(
    params: &DriverParams,
    key: &str,
) -> Result<Option<bool>, CommandError> {
    let Some(val) = params.get(key) else {
        return Ok(None);
    };
    match val {
        Val::Bool(b) => Ok(Some(*b)),
        Val::Str(s) if s == "true" => Ok(Some(true)),
        Val::Str(s) if s == "false" => Ok(Some(false)),
        _ => Err(CommandError::InvalidParam {
            key: key.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

/// A list param: single values are accepted as one-element lists.
pub(crate) fn required_list(params: &DriverParams, key: &str) -> Result<Vec<String>, CommandError> {
    let val = params
        .get(key)
        .ok_or_else(|| CommandError::MissingParam(key.to_string()))?;
    match val {
        Val::List(items) => items.iter().map(|v| coerce_str(key, v)).collect(),
        other => Ok(vec![coerce_str(key, other)?]),
    }
}

pub(crate) fn optional_list(
    params: &DriverParams,
    key: &str,
) -> Result<Vec<String>, CommandError> {
    if params.contains_key(key) {
        required_list(params, key)
    } else {
        Ok(Vec::new())
    }
}

/// A field that inject() must have bound before run().
pub(crate) fn bound<'a>(field: &'a Option<String>, key: &str) -> Result<&'a str, CommandError> {
    field
        .as_deref()
        .ok_or_else(|| CommandError::MissingParam(key.to_string()))
}

pub(crate) fn api_err(err: ApiError) -> CommandError {
    CommandError::Provider(err.to_string())
}

#[cfg(test)]
#[path = "param_tests.rs"]
mod tests;
