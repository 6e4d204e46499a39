// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subnet commands

use crate::api::{CloudApi, CreateSubnetInput};
use crate::param::{
    api_err, bound, missing_required_errors, optional_bool, optional_str, required_str,
    shape_check,
};
use crate::validators::validate_cidr;
use std::sync::Arc;
use stratus_template::{Command, CommandError, DriverParams, RunContext, Val};

/// `create subnet`: the optional name is applied as a tag after the
/// subnet exists.
pub struct CreateSubnet {
    api: Arc<dyn CloudApi>,
    cidr: Option<String>,
    vpc: Option<String>,
    name: Option<String>,
    created: Option<String>,
}

impl CreateSubnet {
    pub const REQUIRED: &'static [&'static str] = &["cidr", "vpc"];
    pub const EXTRA: &'static [&'static str] = &["name"];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        CreateSubnet {
            api,
            cidr: None,
            vpc: None,
            name: None,
            created: None,
        }
    }
}

impl Command for CreateSubnet {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        shape_check(keys, Self::REQUIRED, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        let mut errs = missing_required_errors(params, ref_keys, Self::REQUIRED);
        if let Some(Val::Str(cidr)) = params.get("cidr") {
            if let Err(reason) = validate_cidr(cidr) {
                errs.push(CommandError::InvalidParam {
                    key: "cidr".to_string(),
                    reason,
                });
            }
        }
        errs
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.cidr = Some(required_str(params, "cidr")?);
        self.vpc = Some(required_str(params, "vpc")?);
        self.name = optional_str(params, "name")?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CommandError> {
        let cidr = bound(&self.cidr, "cidr")?;
        validate_cidr(cidr).map_err(|reason| CommandError::InvalidParam {
            key: "cidr".to_string(),
            reason,
        })?;
        bound(&self.vpc, "vpc").map(|_| ())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let input = CreateSubnetInput {
            cidr: bound(&self.cidr, "cidr")?.to_string(),
            vpc: bound(&self.vpc, "vpc")?.to_string(),
        };
        let id = self.api.create_subnet(&input).map_err(api_err)?;
        tracing::info!(id = %id, cidr = %input.cidr, "subnet created");
        self.created = Some(id.clone());
        Ok(Val::Str(id))
    }

    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        Some(self.validate().map(|()| Val::Str("subnet creation ok".to_string())))
    }

    fn after_run(&mut self, _ctx: &RunContext) -> Result<(), CommandError> {
        if let (Some(id), Some(name)) = (self.created.as_deref(), self.name.as_deref()) {
            self.api.tag(id, "Name", name).map_err(api_err)?;
        }
        Ok(())
    }
}

/// `update subnet`
pub struct UpdateSubnet {
    api: Arc<dyn CloudApi>,
    id: Option<String>,
    public: Option<bool>,
}

impl UpdateSubnet {
    pub const REQUIRED: &'static [&'static str] = &["id"];
    pub const EXTRA: &'static [&'static str] = &["public"];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        UpdateSubnet {
            api,
            id: None,
            public: None,
        }
    }
}

impl Command for UpdateSubnet {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        shape_check(keys, Self::REQUIRED, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        missing_required_errors(params, ref_keys, Self::REQUIRED)
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.id = Some(required_str(params, "id")?);
        self.public = optional_bool(params, "public")?;
        Ok(())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let id = bound(&self.id, "id")?.to_string();
        self.api.modify_subnet(&id, self.public).map_err(api_err)?;
        Ok(Val::Str(id))
    }
}

/// `delete subnet`
pub struct DeleteSubnet {
    api: Arc<dyn CloudApi>,
    id: Option<String>,
}

impl DeleteSubnet {
    pub const REQUIRED: &'static [&'static str] = &["id"];
    pub const EXTRA: &'static [&'static str] = &[];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        DeleteSubnet { api, id: None }
    }
}

impl Command for DeleteSubnet {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        shape_check(keys, Self::REQUIRED, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        missing_required_errors(params, ref_keys, Self::REQUIRED)
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.id = Some(required_str(params, "id")?);
        Ok(())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let id = bound(&self.id, "id")?.to_string();
        self.api.delete_subnet(&id).map_err(api_err)?;
        Ok(Val::Str(id))
    }
}

#[cfg(test)]
#[path = "subnet_tests.rs"]
mod tests;
