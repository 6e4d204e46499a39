// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog registry and definition schemas

use crate::api::CloudApi;
use crate::instance::{CreateInstance, DeleteInstance, StartInstance, StopInstance};
use crate::loadbalancer::CreateLoadbalancer;
use crate::securitygroup::{CreateSecuritygroup, DeleteSecuritygroup, UpdateSecuritygroup};
use crate::subnet::{CreateSubnet, DeleteSubnet, UpdateSubnet};
use parking_lot::Mutex;
use std::sync::Arc;
use stratus_template::{CommandHandle, Definition, Registry, RegistryError};

macro_rules! register_commands {
    ($reg:expr, $api:expr, { $($key:literal => $command:ident),+ $(,)? }) => {
        $(
            {
                let api = $api.clone();
                $reg.register($key, move || {
                    Arc::new(Mutex::new($command::new(api.clone()))) as CommandHandle
                })?;
            }
        )+
    };
}

/// Build the registry for the whole catalog against one provider.
pub fn registry(api: Arc<dyn CloudApi>) -> Result<Registry, RegistryError> {
    let mut reg = Registry::new();
    register_commands!(reg, api, {
        "createinstance" => CreateInstance,
        "deleteinstance" => DeleteInstance,
        "startinstance" => StartInstance,
        "stopinstance" => StopInstance,
        "createsubnet" => CreateSubnet,
        "updatesubnet" => UpdateSubnet,
        "deletesubnet" => DeleteSubnet,
        "createsecuritygroup" => CreateSecuritygroup,
        "updatesecuritygroup" => UpdateSecuritygroup,
        "deletesecuritygroup" => DeleteSecuritygroup,
        "createloadbalancer" => CreateLoadbalancer,
    });
    Ok(reg)
}

/// Parameter schemas for the lenient/strict pipeline, matching the
/// catalog's shape checks.
pub fn definitions(key: &str) -> Option<Definition> {
    let def = match key {
        "createinstance" => Definition::new(CreateInstance::REQUIRED, CreateInstance::EXTRA),
        "deleteinstance" => Definition::new(DeleteInstance::REQUIRED, DeleteInstance::EXTRA),
        "startinstance" => Definition::new(StartInstance::REQUIRED, StartInstance::EXTRA),
        "stopinstance" => Definition::new(StopInstance::REQUIRED, StopInstance::EXTRA),
        "createsubnet" => Definition::new(CreateSubnet::REQUIRED, CreateSubnet::EXTRA),
        "updatesubnet" => Definition::new(UpdateSubnet::REQUIRED, UpdateSubnet::EXTRA),
        "deletesubnet" => Definition::new(DeleteSubnet::REQUIRED, DeleteSubnet::EXTRA),
        "createsecuritygroup" => {
            Definition::new(CreateSecuritygroup::REQUIRED, CreateSecuritygroup::EXTRA)
        }
        "updatesecuritygroup" => Definition::new(
            &["id", "protocol"],
            &["cidr", "inbound", "outbound", "portrange", "securitygroup"],
        ),
        "deletesecuritygroup" => {
            Definition::new(DeleteSecuritygroup::REQUIRED, DeleteSecuritygroup::EXTRA)
        }
        "createloadbalancer" => {
            Definition::new(CreateLoadbalancer::REQUIRED, CreateLoadbalancer::EXTRA)
        }
        _ => return None,
    };
    Some(def)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
