// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command contract, execution lifecycle and registry

use crate::ast::Val;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// The flat `name → plain value` form a command receives.
pub type DriverParams = HashMap<String, Val>;

/// A command object shared between the compiled template and the runner.
/// Injection mutates the object, so commands are per-template.
pub type CommandHandle = Arc<Mutex<dyn Command>>;

/// Errors produced by command implementations
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing required parameter '{0}'")]
    MissingParam(String),
    #[error("unexpected param key '{0}'")]
    UnexpectedParam(String),
    #[error("invalid value for '{key}': {reason}")]
    InvalidParam { key: String, reason: String },
    #[error("provider error: {0}")]
    Provider(String),
    #[error("{0}")]
    Other(String),
}

/// Snapshot of resolved variables handed to a command at execution time.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    variables: HashMap<String, Val>,
}

impl RunContext {
    pub fn new(variables: HashMap<String, Val>) -> Self {
        RunContext { variables }
    }

    pub fn variables(&self) -> &HashMap<String, Val> {
        &self.variables
    }
}

/// An optional param reshaping: `keys` are collected from the command's
/// driver params, folded through `convert`, and merged back.
pub struct ParamsConversion {
    pub keys: Vec<String>,
    #[allow(clippy::type_complexity)]
    pub convert: Box<dyn Fn(DriverParams) -> Result<DriverParams, CommandError>>,
}

/// The command contract.
///
/// `validate_params`, `inject` and `run` are mandatory; the remaining
/// capabilities are opted into by overriding the defaults. Passes and the
/// runner probe each capability at the site of use.
pub trait Command: Send {
    /// Shape check: given the param keys bound in the template, return
    /// the names of required params that are missing. A structural
    /// problem (e.g. an unknown key) is an error.
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError>;

    /// Optional param reshaping capability.
    fn convert_params(&self) -> Option<ParamsConversion> {
        None
    }

    /// Full semantic check. `ref_keys` names params whose value is still
    /// a live reference; those are resolved at run time and must be
    /// tolerated.
    fn validate_command(&self, _params: &DriverParams, _ref_keys: &[String]) -> Vec<CommandError> {
        Vec::new()
    }

    /// Bind driver params into internal fields.
    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError>;

    /// Post-bind check.
    fn validate(&self) -> Result<(), CommandError> {
        Ok(())
    }

    /// Execute against the provider.
    fn run(&mut self, ctx: &RunContext) -> Result<Val, CommandError>;

    /// Dry-run variant; `None` when the command has no dry-run support.
    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        None
    }

    /// Post-success hook.
    fn after_run(&mut self, _ctx: &RunContext) -> Result<(), CommandError> {
        Ok(())
    }

    /// Printable identifier of the created resource, when the raw run
    /// output is not directly usable.
    fn extract_result(&self, _output: &Val) -> Option<String> {
        None
    }
}

/// Full lifecycle: inject, validate, run, after-run.
pub fn run(
    cmd: &CommandHandle,
    ctx: &RunContext,
    params: &DriverParams,
) -> Result<Val, CommandError> {
    let mut c = cmd.lock();
    c.inject(params)?;
    c.validate()?;
    let result = c.run(ctx)?;
    c.after_run(ctx)?;
    Ok(result)
}

/// Dry-run lifecycle: inject and validate, then the dry-run variant.
/// Returns `None` when the command is not a dry runner.
pub fn dry_run(
    cmd: &CommandHandle,
    ctx: &RunContext,
    params: &DriverParams,
) -> Option<Result<Val, CommandError>> {
    let mut c = cmd.lock();
    if let Err(e) = c.inject(params) {
        return Some(Err(e));
    }
    if let Err(e) = c.validate() {
        return Some(Err(e));
    }
    c.dry_run(ctx)
}

type Factory = Box<dyn Fn() -> CommandHandle + Send + Sync>;

/// Errors raised while assembling registries
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("command key '{0}' is claimed more than once")]
    DuplicateKey(String),
}

/// Maps command keys (`action+entity`) to factories producing fresh
/// command objects. Registration order is preserved.
#[derive(Default)]
pub struct Registry {
    factories: IndexMap<String, Factory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a factory under `key`. Duplicate keys are rejected.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> CommandHandle + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Registered command keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// A fresh command object for `key`, if registered.
    pub fn lookup(&self, key: &str) -> Option<CommandHandle> {
        self.factories.get(key).map(|f| f())
    }

    /// Compose registries into one. Fails when more than one registry
    /// claims the same key.
    pub fn compose(registries: impl IntoIterator<Item = Registry>) -> Result<Registry, RegistryError> {
        let mut out = Registry::new();
        for reg in registries {
            for (key, factory) in reg.factories {
                if out.factories.contains_key(&key) {
                    return Err(RegistryError::DuplicateKey(key));
                }
                out.factories.insert(key, factory);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
