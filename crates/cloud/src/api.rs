// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider seam and the in-memory provider
//!
//! Real SDK calls stay out of scope; commands talk to [`CloudApi`] and
//! the CLI and tests plug in [`MemoryCloud`], which hands out
//! deterministic ids and doubles as the local resource index backing
//! alias resolution.

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned by a provider
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Default)]
pub struct RunInstancesInput {
    pub image: String,
    pub count: i64,
    pub instance_type: String,
    pub subnet: String,
    pub keypair: Option<String>,
    pub ip: Option<String>,
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSubnetInput {
    pub cidr: String,
    pub vpc: String,
}

#[derive(Debug, Clone, Default)]
pub struct SecurityGroupRuleInput {
    pub id: String,
    pub protocol: String,
    /// `authorize` or `revoke`, at most one of inbound/outbound set.
    pub inbound: Option<String>,
    pub outbound: Option<String>,
    pub cidr: Option<String>,
    pub source_group: Option<String>,
    pub port_range: Option<String>,
}

/// The provider calls the command catalog is written against.
pub trait CloudApi: Send + Sync {
    fn run_instances(&self, input: &RunInstancesInput) -> Result<Vec<String>, ApiError>;
    fn terminate_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError>;
    fn start_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError>;
    fn stop_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError>;

    fn create_subnet(&self, input: &CreateSubnetInput) -> Result<String, ApiError>;
    fn modify_subnet(&self, id: &str, public: Option<bool>) -> Result<(), ApiError>;
    fn delete_subnet(&self, id: &str) -> Result<(), ApiError>;

    fn create_security_group(
        &self,
        name: &str,
        vpc: &str,
        description: &str,
    ) -> Result<String, ApiError>;
    fn update_security_group(&self, input: &SecurityGroupRuleInput) -> Result<(), ApiError>;
    fn delete_security_group(&self, id: &str) -> Result<(), ApiError>;

    fn create_load_balancer(&self, name: &str, subnets: &[String]) -> Result<String, ApiError>;

    /// Attach a key/value tag to an existing resource.
    fn tag(&self, id: &str, key: &str, value: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub entity: String,
    pub name: Option<String>,
}

#[derive(Default)]
struct State {
    counters: HashMap<&'static str, u64>,
    resources: Vec<Resource>,
    journal: Vec<String>,
}

/// In-memory provider with deterministic ids (`i-0001`, `subnet-0001`,
/// …) and a call journal for assertions.
#[derive(Default)]
pub struct MemoryCloud {
    state: Mutex<State>,
}

impl MemoryCloud {
    pub fn new() -> Self {
        MemoryCloud::default()
    }

    /// Pre-populate a named resource, e.g. a vpc the templates alias.
    pub fn seed(&self, entity: &str, name: &str, id: &str) {
        self.state.lock().resources.push(Resource {
            id: id.to_string(),
            entity: entity.to_string(),
            name: Some(name.to_string()),
        });
    }

    /// Resolve a resource name to its id, preferring the given entity.
    /// Usable directly as an environment alias callback.
    pub fn resolve_alias(&self, entity: &str, _key: &str, alias: &str) -> Option<String> {
        let state = self.state.lock();
        let by_name = |r: &&Resource| r.name.as_deref() == Some(alias);
        state
            .resources
            .iter()
            .filter(|r| r.entity == entity)
            .find(by_name)
            .or_else(|| state.resources.iter().find(by_name))
            .map(|r| r.id.clone())
    }

    pub fn journal(&self) -> Vec<String> {
        self.state.lock().journal.clone()
    }

    pub fn resource(&self, id: &str) -> Option<Resource> {
        self.state
            .lock()
            .resources
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn next_id(&self, prefix: &'static str) -> String {
        let mut state = self.state.lock();
        let counter = state.counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{}-{:04}", prefix, counter)
    }

    fn record(&self, entry: String) {
        self.state.lock().journal.push(entry);
    }

    fn create(&self, entity: &str, prefix: &'static str) -> String {
        let id = self.next_id(prefix);
        self.state.lock().resources.push(Resource {
            id: id.clone(),
            entity: entity.to_string(),
            name: None,
        });
        id
    }

    fn ensure_exists(&self, id: &str) -> Result<(), ApiError> {
        if self.state.lock().resources.iter().any(|r| r.id == id) {
            Ok(())
        } else {
            Err(ApiError::NotFound(id.to_string()))
        }
    }
}

impl CloudApi for MemoryCloud {
    fn run_instances(&self, input: &RunInstancesInput) -> Result<Vec<String>, ApiError> {
        if input.count < 1 {
            return Err(ApiError::InvalidInput(format!(
                "instance count must be positive, got {}",
                input.count
            )));
        }
        let ids: Vec<String> = (0..input.count)
            .map(|_| self.create("instance", "i"))
            .collect();
        self.record(format!(
            "run_instances image={} count={} type={} subnet={}",
            input.image, input.count, input.instance_type, input.subnet
        ));
        Ok(ids)
    }

    fn terminate_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError> {
        for id in ids {
            self.ensure_exists(id)?;
        }
        self.state
            .lock()
            .resources
            .retain(|r| !ids.contains(&r.id));
        self.record(format!("terminate_instances ids={}", ids.join(",")));
        Ok(ids.to_vec())
    }

    fn start_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError> {
        for id in ids {
            self.ensure_exists(id)?;
        }
        self.record(format!("start_instances ids={}", ids.join(",")));
        Ok(ids.to_vec())
    }

    fn stop_instances(&self, ids: &[String]) -> Result<Vec<String>, ApiError> {
        for id in ids {
            self.ensure_exists(id)?;
        }
        self.record(format!("stop_instances ids={}", ids.join(",")));
        Ok(ids.to_vec())
    }

    fn create_subnet(&self, input: &CreateSubnetInput) -> Result<String, ApiError> {
        let id = self.create("subnet", "subnet");
        self.record(format!("create_subnet cidr={} vpc={}", input.cidr, input.vpc));
        Ok(id)
    }

    fn modify_subnet(&self, id: &str, public: Option<bool>) -> Result<(), ApiError> {
        self.ensure_exists(id)?;
        self.record(format!("modify_subnet id={} public={:?}", id, public));
        Ok(())
    }

    fn delete_subnet(&self, id: &str) -> Result<(), ApiError> {
        self.ensure_exists(id)?;
        self.state.lock().resources.retain(|r| r.id != id);
        self.record(format!("delete_subnet id={}", id));
        Ok(())
    }

    fn create_security_group(
        &self,
        name: &str,
        vpc: &str,
        description: &str,
    ) -> Result<String, ApiError> {
        let id = self.create("securitygroup", "sg");
        if let Some(r) = self.state.lock().resources.iter_mut().find(|r| r.id == id) {
            r.name = Some(name.to_string());
        }
        self.record(format!(
            "create_security_group name={} vpc={} description={}",
            name, vpc, description
        ));
        Ok(id)
    }

    fn update_security_group(&self, input: &SecurityGroupRuleInput) -> Result<(), ApiError> {
        self.ensure_exists(&input.id)?;
        self.record(format!(
            "update_security_group id={} protocol={}",
            input.id, input.protocol
        ));
        Ok(())
    }

    fn delete_security_group(&self, id: &str) -> Result<(), ApiError> {
        self.ensure_exists(id)?;
        self.state.lock().resources.retain(|r| r.id != id);
        self.record(format!("delete_security_group id={}", id));
        Ok(())
    }

    fn create_load_balancer(&self, name: &str, subnets: &[String]) -> Result<String, ApiError> {
        if subnets.is_empty() {
            return Err(ApiError::InvalidInput(
                "a load balancer needs at least one subnet".to_string(),
            ));
        }
        let id = self.create("loadbalancer", "lb");
        if let Some(r) = self.state.lock().resources.iter_mut().find(|r| r.id == id) {
            r.name = Some(name.to_string());
        }
        self.record(format!(
            "create_load_balancer name={} subnets={}",
            name,
            subnets.join(",")
        ));
        Ok(id)
    }

    fn tag(&self, id: &str, key: &str, value: &str) -> Result<(), ApiError> {
        self.ensure_exists(id)?;
        if key == "Name" {
            if let Some(r) = self.state.lock().resources.iter_mut().find(|r| r.id == id) {
                r.name = Some(value.to_string());
            }
        }
        self.record(format!("tag id={} {}={}", id, key, value));
        Ok(())
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
