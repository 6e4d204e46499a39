// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load balancer commands

use crate::api::CloudApi;
use crate::param::{api_err, bound, missing_required_errors, required_list, required_str, shape_check};
use std::sync::Arc;
use stratus_template::{Command, CommandError, DriverParams, ParamsConversion, RunContext, Val};

/// `create loadbalancer`: accepts `subnets` (a list) and the legacy
/// singular `subnet`, folded into one list by the converter capability.
pub struct CreateLoadbalancer {
    api: Arc<dyn CloudApi>,
    name: Option<String>,
    subnets: Vec<String>,
}

impl CreateLoadbalancer {
    pub const REQUIRED: &'static [&'static str] = &["name", "subnets"];
    pub const EXTRA: &'static [&'static str] = &["subnet"];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        CreateLoadbalancer {
            api,
            name: None,
            subnets: Vec::new(),
        }
    }
}

impl Command for CreateLoadbalancer {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        let missing = shape_check(keys, Self::REQUIRED, Self::EXTRA)?;
        // the singular form satisfies the subnets requirement
        Ok(missing
            .into_iter()
            .filter(|m| !(m == "subnets" && keys.iter().any(|k| k == "subnet")))
            .collect())
    }

    fn convert_params(&self) -> Option<ParamsConversion> {
        Some(ParamsConversion {
            keys: vec!["subnet".to_string(), "subnets".to_string()],
            convert: Box::new(|values| {
                let mut merged: Vec<Val> = Vec::new();
                match values.get("subnets") {
                    Some(Val::List(items)) => merged.extend(items.iter().cloned()),
                    Some(single) => merged.push(single.clone()),
                    None => {}
                }
                if let Some(single) = values.get("subnet") {
                    merged.push(single.clone());
                }
                if merged.is_empty() {
                    return Ok(values);
                }
                Ok([("subnets".to_string(), Val::List(merged))].into())
            }),
        })
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        missing_required_errors(params, ref_keys, Self::REQUIRED)
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.name = Some(required_str(params, "name")?);
        self.subnets = required_list(params, "subnets")?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CommandError> {
        if self.subnets.is_empty() {
            return Err(CommandError::MissingParam("subnets".to_string()));
        }
        bound(&self.name, "name").map(|_| ())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let id = self
            .api
            .create_load_balancer(bound(&self.name, "name")?, &self.subnets)
            .map_err(api_err)?;
        tracing::info!(id = %id, subnets = self.subnets.len(), "load balancer created");
        Ok(Val::Str(id))
    }

    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        Some(self.validate().map(|()| Val::Str("loadbalancer creation ok".to_string())))
    }
}

#[cfg(test)]
#[path = "loadbalancer_tests.rs"]
mod tests;
