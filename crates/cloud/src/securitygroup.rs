// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security group commands

use crate::api::{CloudApi, SecurityGroupRuleInput};
use crate::param::{
    api_err, bound, missing_required_errors, optional_str, required_str, shape_check,
};
use crate::rule::{all_of, key, one_of, one_of_required, ParamRule};
use crate::validators::{validate_cidr, EnumValidator};
use std::sync::Arc;
use stratus_template::{Command, CommandError, DriverParams, RunContext, Val};

const RULE_DIRECTIONS: &[&str] = &["authorize", "revoke"];

/// `create securitygroup`
pub struct CreateSecuritygroup {
    api: Arc<dyn CloudApi>,
    name: Option<String>,
    vpc: Option<String>,
    description: Option<String>,
}

impl CreateSecuritygroup {
    pub const REQUIRED: &'static [&'static str] = &["description", "name", "vpc"];
    pub const EXTRA: &'static [&'static str] = &[];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        CreateSecuritygroup {
            api,
            name: None,
            vpc: None,
            description: None,
        }
    }
}

impl Command for CreateSecuritygroup {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        shape_check(keys, Self::REQUIRED, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        missing_required_errors(params, ref_keys, Self::REQUIRED)
    }

    fn inject(&mut self, params: &DriverParams) -> Result<(), CommandError> {
        self.name = Some(required_str(params, "name")?);
        self.vpc = Some(required_str(params, "vpc")?);
        self.description = Some(required_str(params, "description")?);
        Ok(())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        let id = self
            .api
            .create_security_group(
                bound(&self.name, "name")?,
                bound(&self.vpc, "vpc")?,
                bound(&self.description, "description")?,
            )
            .map_err(api_err)?;
        Ok(Val::Str(id))
    }

    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        Some(Ok(Val::Str("securitygroup creation ok".to_string())))
    }
}

/// `update securitygroup`: authorize or revoke one inbound or outbound
/// rule, scoped to a CIDR or another security group.
pub struct UpdateSecuritygroup {
    api: Arc<dyn CloudApi>,
    input: SecurityGroupRuleInput,
}

impl UpdateSecuritygroup {
    pub const EXTRA: &'static [&'static str] = &["portrange"];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        UpdateSecuritygroup {
            api,
            input: SecurityGroupRuleInput::default(),
        }
    }

    fn rule() -> ParamRule {
        all_of(vec![
            key("id"),
            key("protocol"),
            one_of_required(vec![key("inbound"), key("outbound")]),
            one_of(vec![key("cidr"), key("securitygroup")]),
        ])
    }
}

impl Command for UpdateSecuritygroup {
    fn validate_params(&self, keys: &[String]) -> Result<Vec<String>, CommandError> {
        Self::rule().verify(keys, Self::EXTRA)
    }

    fn validate_command(&self, params: &DriverParams, ref_keys: &[String]) -> Vec<CommandError> {
        let mut keys: Vec<String> = params.keys().cloned().collect();
        keys.extend(ref_keys.iter().cloned());
        let mut errs = Self::rule().errors(&keys);

        let direction = EnumValidator::new(RULE_DIRECTIONS);
        for dir_key in ["inbound", "outbound"] {
            if let Some(Val::Str(value)) = params.get(dir_key) {
                if let Err(reason) = direction.validate(value) {
                    errs.push(CommandError::InvalidParam {
                        key: dir_key.to_string(),
                        reason,
                    });
                }
            }
        }
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
        self.input = SecurityGroupRuleInput {
            id: required_str(params, "id")?,
            protocol: required_str(params, "protocol")?,
            inbound: optional_str(params, "inbound")?,
            outbound: optional_str(params, "outbound")?,
            cidr: optional_str(params, "cidr")?,
            source_group: optional_str(params, "securitygroup")?,
            port_range: optional_str(params, "portrange")?,
        };
        Ok(())
    }

    fn validate(&self) -> Result<(), CommandError> {
        let direction = EnumValidator::new(RULE_DIRECTIONS);
        let dir = self
            .input
            .inbound
            .as_deref()
            .or(self.input.outbound.as_deref())
            .ok_or_else(|| {
                CommandError::Other("expecting either 'inbound' or 'outbound'".to_string())
            })?;
        direction
            .validate(dir)
            .map_err(|reason| CommandError::InvalidParam {
                key: if self.input.inbound.is_some() {
                    "inbound".to_string()
                } else {
                    "outbound".to_string()
                },
                reason,
            })?;
        if let Some(cidr) = self.input.cidr.as_deref() {
            validate_cidr(cidr).map_err(|reason| CommandError::InvalidParam {
                key: "cidr".to_string(),
                reason,
            })?;
        }
        Ok(())
    }

    fn run(&mut self, _ctx: &RunContext) -> Result<Val, CommandError> {
        self.api.update_security_group(&self.input).map_err(api_err)?;
        Ok(Val::Str(self.input.id.clone()))
    }
}

/// `delete securitygroup`
pub struct DeleteSecuritygroup {
    api: Arc<dyn CloudApi>,
    id: Option<String>,
}

impl DeleteSecuritygroup {
    pub const REQUIRED: &'static [&'static str] = &["id"];
    pub const EXTRA: &'static [&'static str] = &[];

    pub fn new(api: Arc<dyn CloudApi>) -> Self {
        DeleteSecuritygroup { api, id: None }
    }
}

impl Command for DeleteSecuritygroup {
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
        self.api.delete_security_group(&id).map_err(api_err)?;
        Ok(Val::Str(id))
    }

    fn dry_run(&mut self, _ctx: &RunContext) -> Option<Result<Val, CommandError>> {
        Some(Ok(Val::Str("securitygroup deletion ok".to_string())))
    }
}

#[cfg(test)]
#[path = "securitygroup_tests.rs"]
mod tests;
