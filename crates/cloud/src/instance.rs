// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance commands

use crate::api::{CloudApi, RunInstancesInput};
use crate::param::{
    api_err, bound, missing_required_errors, optional_list, optional_str, required_int,
    required_list, required_str, shape_check,
};
use std::sync::Arc;
use stratus_template::{Command, CommandError, DriverParams, RunContext, Val};

/// `create instance`: runs `count` instances and names the first one.
pub struct CreateInstance {
    api: Arc<dyn CloudApi>,
    image: Option<String>,
    count: Option<i64>,
    instance_type: Option<String>,
    subnet: Option<String>,
    name: Option<String>,
    keypair: Option<String>,
    ip: Option<String>,
    security_groups: Vec<String>,
    created: Vec<String>,
}

impl CreateInstance {
    pub const REQUIRED: &'static [&'static str] = &["count", "image", "name", "subnet", "type"];
    pub const EXTRA: &'static [&'static str] = &["ip", "keypair", "securitygroup"];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        CreateInstance {
            api,
            image: None,
            count: None,
            instance_type: None,
            subnet: None,
            name: None,
            keypair: None,
            ip: None,
            security_groups: Vec::new(),
            created: Vec::new(),
        }
    }

    fn input(&self) -> Result<RunInstancesInput, CommandError> {
        Ok(RunInstancesInput {
            image: bound(&self.image, "image")?.to_string(),
            count: self
                .count
                .ok_or_else(|| CommandError::MissingParam("count".to_string()))?,
            instance_type: bound(&self.instance_type, "type")?.to_string(),
            subnet: bound(&self.subnet, "subnet")?.to_string(),
            keypair: self.keypair.clone(),
            ip: self.ip.clone(),
            security_groups: self.security_groups.clone(),
        })
    }
}

impl Command for CreateInstance {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        shape_check(keys, Self::REQUIRED, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        let mut errs = missing_required_errors(params, ref_keys, Self::REQUIRED);
        if let Some(Val::Int(count)) = params.get("count") {
            if *count < 1 {
                errs.push(CommandError::InvalidParam {
                    key: "count".to_string(),
                    reason: format!("must be positive, got {}", count),
                });
            }
        }
        errs
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.image = Some(required_str(params, "image")?);
        self.count = Some(required_int(params, "count")?);
        self.instance_type = Some(required_str(params, "type")?);
        self.subnet = Some(required_str(params, "subnet")?);
        self.name = Some(required_str(params, "name")?);
        self.keypair = optional_str(params, "keypair")?;
        self.ip = optional_str(params, "ip")?;
        self.security_groups = optional_list(params, "securitygroup")?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CommandError> {
        self.input().map(|_| ())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let input = self.input()?;
        let ids = self.api.run_instances(&input).map_err(api_err)?;
        tracing::info!(count = ids.len(), image = %input.image, "instances created");
        self.created = ids.clone();
        Ok(Val::List(ids.into_iter().map(Val::Str).collect()))
    }

    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        Some(match self.input() {
            Ok(input) => Ok(Val::Str(format!(
                "instance creation ok: image={} count={}",
                input.image, input.count
            ))),
            Err(e) => Err(e),
        })
    }

    fn after_run(&mut self, _ctx: &RunContext) -> Result<(), CommandError> {
        let Some(name) = self.name.as_deref() else {
            return Ok(());
        };
        if let Some(first) = self.created.first() {
            self.api.tag(first, "Name", name).map_err(api_err)?;
        }
        Ok(())
    }

    fn extract_result(&self, output: &Val) -> Option<String> {
        match output {
            Val::List(ids) => ids.first().and_then(Val::as_str).map(str::to_string),
            _ => None,
        }
    }
}

macro_rules! instance_ids_command {
    (
        $(#[$meta:meta])*
        $name:ident, $api_call:ident
    ) => {
        $(#[$meta])*
        pub struct $name {
            api: Arc<dyn CloudApi>,
            ids: Vec<String>,
        }

        impl $name {
            pub const REQUIRED: &'static [&'static str] = &["id"];
            pub const EXTRA: &'static [&'static str] = &[];

            pub fn new(api: Arc<dyn CloudApi>) -> Self {
                $name {
                    api,
                    ids: Vec::new(),
                }
            }
        }

        impl Command for $name {
            fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
                shape_check(keys, Self::REQUIRED, Self::EXTRA)
            }

            fn validate_command(
                &self,
                params: &DriverParams,
                ref_keys: &[String],
            ) -> Vec<CommandError> {
                missing_required_errors(params, ref_keys, Self::REQUIRED)
            }

            fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
                self.ids = required_list(params, "id")?;
                Ok(())
            }

            fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
                let ids = self.api.$api_call(&self.ids).map_err(api_err)?;
                Ok(Val::List(ids.into_iter().map(Val::Str).collect()))
            }

            fn extract_result(&self, output: &Val) -> Option<String> {
                match output {
                    Val::List(ids) => ids.first().and_then(Val::as_str).map(str::to_string),
                    _ => None,
                }
            }
        }
    };
}

instance_ids_command! {
    /// `delete instance`: terminates the listed instances.
    DeleteInstance, terminate_instances
}

instance_ids_command! {
    /// `start instance`
    StartInstance, start_instances
}

instance_ids_command! {
    /// `stop instance`
    StopInstance, stop_instances
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
