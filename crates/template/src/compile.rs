// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compilation driver: ordered pass lists over a template

use crate::env::Env;
use crate::passes;
use crate::template::Template;
use thiserror::Error;

/// A single deterministic rewrite of a template. The only observable
/// side effects are on `env.processed_fillers` and
/// `env.resolved_variables`.
pub type Pass = fn(Template, &mut Env) -> Result<Template, CompileError>;

/// An ordered pass list.
pub type Mode = &'static [Pass];

/// Schema and hole resolution for legacy free-form templates.
pub static LENIENT_COMPILE_MODE: Mode = &[
    passes::resolve_against_definitions,
    passes::check_invalid_reference_declarations,
    passes::resolve_holes,
    passes::resolve_missing_holes,
    passes::resolve_aliases,
    passes::inline_variable_values,
];

/// Lenient mode plus failure on anything left unresolved.
pub static STRICT_COMPILE_MODE: Mode = &[
    passes::resolve_against_definitions,
    passes::check_invalid_reference_declarations,
    passes::resolve_holes,
    passes::resolve_missing_holes,
    passes::resolve_aliases,
    passes::inline_variable_values,
    passes::fail_on_unresolved_holes,
    passes::fail_on_unresolved_aliases,
];

/// The registry-backed pipeline producing a runnable template.
pub static RUNNER_COMPILE_MODE: Mode = &[
    passes::verify_commands_defined,
    passes::validate_commands_params,
    passes::normalize_missing_required_params_as_holes,
    passes::check_invalid_reference_declarations,
    passes::resolve_holes,
    passes::resolve_missing_holes,
    passes::resolve_aliases,
    passes::inline_variable_values,
    passes::fail_on_unresolved_holes,
    passes::fail_on_unresolved_aliases,
    passes::convert_params,
    passes::validate_commands,
    passes::inject_commands,
];

/// Errors surfaced by compilation passes
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("definition lookup function is undefined")]
    NoDefinitionLookup,

    #[error("command lookup function is undefined")]
    NoCommandLookup,

    #[error("cannot find definition for '{0}'")]
    DefinitionNotFound(String),

    #[error("cannot find command for '{0}'")]
    CommandNotFound(String),

    #[error(
        "{action} {entity}: unexpected param key '{key}'{}{}",
        format_key_list("required params", .required),
        format_key_list("extra params", .extra)
    )]
    UnexpectedParamKey {
        action: String,
        entity: String,
        key: String,
        required: Vec<String>,
        extra: Vec<String>,
    },

    #[error("using reference '${0}' but '{0}' is undefined in template")]
    UndefinedReference(String),

    #[error("using reference '${0}' but '{0}' has already been assigned in template")]
    AlreadyAssigned(String),

    #[error("cannot resolve aliases: [{}]", .0.join(", "))]
    CannotResolveAliases(Vec<String>),

    #[error("template contains unresolved holes: [{}]", .0.join(", "))]
    UnresolvedHoles(Vec<String>),

    #[error("template contains unresolved aliases: [{}]", .0.join(", "))]
    UnresolvedAliases(Vec<String>),

    #[error("{action} {entity}: {message}")]
    Command {
        action: String,
        entity: String,
        message: String,
    },

    #[error("{}", format_validation_errors(.0))]
    Validation(Vec<String>),
}

fn format_key_list(label: &str, keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!("\n\t- {}: {}", label, keys.join(", "))
    }
}

fn format_validation_errors(errs: &[String]) -> String {
    match errs {
        [single] => format!("validation error: {}", single),
        many => format!("validation errors:\n\t- {}", many.join("\n\t- ")),
    }
}

/// Run `tpl` through each pass of `mode` in order, stopping at the first
/// error.
pub fn compile(tpl: Template, env: &mut Env, mode: Mode) -> Result<Template, CompileError> {
    let mut current = tpl;
    for pass in mode {
        current = pass(current, env)?;
    }
    Ok(current)
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod tests;
