// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::api::MemoryCloud;

fn api() -> Arc<MemoryCloud> {
    Arc::new(MemoryCloud::new())
}

fn update_params() -> DriverParams {
    [
        ("id".to_string(), Val::Str("sg-1".into())),
        ("protocol".to_string(), Val::Str("tcp".into())),
        ("inbound".to_string(), Val::Str("authorize".into())),
        ("cidr".to_string(), Val::Str("0.0.0.0/0".into())),
    ]
    .into()
}

#[test]
fn create_requires_name_vpc_and_description() {
    let cmd = CreateSecuritygroup::new(api());
    let missing = cmd.validate_params(&["name".to_string()]).expect("known keys");
    assert_eq!(missing, vec!["description", "vpc"]);
}

#[test]
fn create_produces_a_named_group() {
    let cloud = api();
    let mut cmd = CreateSecuritygroup::new(cloud.clone());
    cmd.inject(
        &[
            ("name".to_string(), Val::Str("web-sg".into())),
            ("vpc".to_string(), Val::Str("vpc-1".into())),
            ("description".to_string(), Val::Str("web tier".into())),
        ]
        .into(),
    )
    .expect("injects");
    let result = cmd.run(&RunContext::default()).expect("runs");

    assert_eq!(result, Val::Str("sg-0001".into()));
    assert_eq!(
        cloud.resolve_alias("securitygroup", "id", "web-sg"),
        Some("sg-0001".to_string())
    );
}

#[test]
fn update_shape_uses_the_rule_tree() {
    let cmd = UpdateSecuritygroup::new(api());
    // direction and scope choices never surface as missing params
    let missing = cmd.validate_params(&["inbound".to_string()]).expect("known keys");
    assert_eq!(missing, vec!["id", "protocol"]);

    assert!(cmd.validate_params(&["bogus".to_string()]).is_err());
    assert!(cmd
        .validate_params(&["id".to_string(), "portrange".to_string()])
        .is_ok());
}

#[test]
fn update_without_a_direction_is_a_semantic_error() {
    let cmd = UpdateSecuritygroup::new(api());
    let mut params = update_params();
    params.remove("inbound");
    let errs = cmd.validate_command(&params, &[]);
    assert_eq!(errs.len(), 1);
    let msg = errs[0].to_string();
    assert!(msg.contains("inbound") && msg.contains("outbound"), "got: {}", msg);
}

#[test]
fn update_direction_must_be_authorize_or_revoke() {
    let cmd = UpdateSecuritygroup::new(api());
    let mut params = update_params();
    params.insert("inbound".to_string(), Val::Str("allow".into()));
    let errs = cmd.validate_command(&params, &[]);
    assert!(errs.iter().any(|e| e.to_string().contains("authorize, revoke")));
}

#[test]
fn update_checks_the_cidr() {
    let cmd = UpdateSecuritygroup::new(api());
    let mut params = update_params();
    params.insert("cidr".to_string(), Val::Str("bad".into()));
    let errs = cmd.validate_command(&params, &[]);
    assert!(errs.iter().any(|e| e.to_string().contains("cidr")));
}

#[test]
fn update_tolerates_reference_bound_id() {
    let cmd = UpdateSecuritygroup::new(api());
    let mut params = update_params();
    params.remove("id");
    assert!(cmd.validate_command(&params, &["id".to_string()]).is_empty());
}

#[test]
fn update_runs_against_the_provider() {
    let cloud = api();
    let id = cloud
        .create_security_group("web-sg", "vpc-1", "web tier")
        .expect("creates");

    let mut cmd = UpdateSecuritygroup::new(cloud.clone());
    let mut params = update_params();
    params.insert("id".to_string(), Val::Str(id.clone()));
    cmd.inject(&params).expect("injects");
    cmd.validate().expect("validates");
    let result = cmd.run(&RunContext::default()).expect("runs");
    assert_eq!(result, Val::Str(id));
}

#[test]
fn delete_removes_the_group() {
    let cloud = api();
    let id = cloud
        .create_security_group("web-sg", "vpc-1", "web tier")
        .expect("creates");

    let mut cmd = DeleteSecuritygroup::new(cloud.clone());
    cmd.inject(&[("id".to_string(), Val::Str(id.clone()))].into())
        .expect("injects");
    cmd.run(&RunContext::default()).expect("runs");
    assert!(cloud.resource(&id).is_none());
}
