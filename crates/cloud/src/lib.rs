// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Cloud command catalog
//!
//! Thin adapters marshalling template params into provider calls. Each
//! command opts into the capabilities it needs; the registry exposes the
//! whole catalog to the compilation pipeline.

mod api;
mod instance;
mod loadbalancer;
mod param;
mod registry;
mod rule;
mod securitygroup;
mod subnet;
mod validators;

pub use api::{
    ApiError, CloudApi, CreateSubnetInput, MemoryCloud, Resource, RunInstancesInput,
    SecurityGroupRuleInput,
};
pub use instance::{CreateInstance, DeleteInstance, StartInstance, StopInstance};
pub use loadbalancer::CreateLoadbalancer;
pub use registry::{definitions, registry};
pub use rule::{all_of, key, one_of, one_of_required, ParamRule};
pub use securitygroup::{CreateSecuritygroup, DeleteSecuritygroup, UpdateSecuritygroup};
pub use subnet::{CreateSubnet, DeleteSubnet, UpdateSubnet};
pub use validators::{validate_cidr, EnumValidator};
