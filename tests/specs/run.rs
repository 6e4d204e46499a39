//! Runner scenarios against the in-memory provider: commit-and-halt
//! behavior, late reference binding, and dry runs.

use crate::prelude::{catalog_env, fillers, parse};
use stratus_template::{compile, Val, RUNNER_COMPILE_MODE};

#[test]
fn end_to_end_create_and_update() {
    let (cloud, mut env) = catalog_env();
    env.fillers = fillers(&[("net.cidr", "10.0.2.0/24")]);

    let tpl = parse(
        "vpcref = @default\n\
         sub = create subnet cidr={net.cidr} vpc=$vpcref name=web-subnet\n\
         update subnet id=$sub public=true",
    );
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    let executed = compiled.run(&mut env).expect("runs");

    assert!(!executed.has_errors());
    assert_eq!(
        env.resolved_variables.get("sub"),
        Some(&Val::Str("subnet-0001".into()))
    );

    let journal = cloud.journal();
    assert_eq!(journal.len(), 3);
    assert!(journal[0].starts_with("create_subnet cidr=10.0.2.0/24 vpc=vpc-default"));
    assert!(journal[1].starts_with("tag id=subnet-0001 Name=web-subnet"));
    assert!(journal[2].starts_with("modify_subnet id=subnet-0001 public=Some(true)"));

    // the subnet name is now aliasable for the next template
    assert_eq!(
        cloud.resolve_alias("subnet", "id", "web-subnet"),
        Some("subnet-0001".to_string())
    );
}

#[test]
fn a_provider_failure_halts_and_keeps_prior_side_effects() {
    let (cloud, mut env) = catalog_env();

    let tpl = parse(
        "sub = create subnet cidr=10.0.2.0/24 vpc=@default\n\
         update subnet id=subnet-9999 public=true\n\
         create loadbalancer name=lb subnets=[$sub]",
    );
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    let executed = compiled.run(&mut env).expect("structurally runs");

    // first statement committed, second failed, third never ran
    assert_eq!(executed.statements.len(), 2);
    let nodes: Vec<_> = executed.command_nodes().collect();
    assert_eq!(nodes[0].result, Some(Val::Str("subnet-0001".into())));
    let err = nodes[1].err.as_deref().expect("second statement failed");
    assert!(err.contains("subnet-9999"), "got: {}", err);
    assert!(executed.has_errors());

    // no rollback: the created subnet is still there, and no load
    // balancer call was ever attempted
    assert!(cloud.resource("subnet-0001").is_some());
    assert!(!cloud.journal().iter().any(|c| c.starts_with("create_load_balancer")));
}

#[test]
fn instance_creation_binds_the_first_id() {
    let (cloud, mut env) = catalog_env();
    env.fillers = fillers(&[("instance.type", "t2.micro")]);

    let tpl = parse(
        "inst = create instance image=ami-1 count=2 subnet=sub-1 name=web\n\
         stop instance id=$inst",
    );
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    let executed = compiled.run(&mut env).expect("runs");

    assert!(!executed.has_errors());
    // extract_result picks the first of the two created instances
    assert_eq!(
        env.resolved_variables.get("inst"),
        Some(&Val::Str("i-0001".into()))
    );
    assert!(cloud
        .journal()
        .iter()
        .any(|c| c == "stop_instances ids=i-0001"));
}

#[test]
fn dry_run_touches_nothing_and_reports_every_statement() {
    let (cloud, mut env) = catalog_env();
    env.is_dry_run = true;

    let tpl = parse(
        "sub = create subnet cidr=10.0.2.0/24 vpc=@default\n\
         create loadbalancer name=lb subnets=[sub-1]",
    );
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    let executed = compiled.run(&mut env).expect("runs");

    assert_eq!(executed.statements.len(), 2);
    assert!(!executed.has_errors());
    for node in executed.command_nodes() {
        assert!(node.result.is_some(), "dry-run result for {}", node);
    }
    assert!(cloud.journal().is_empty());
}

#[test]
fn inlined_variables_run_identically_to_literals() {
    let run = |source: &str| {
        let (cloud, mut env) = catalog_env();
        let compiled =
            compile(parse(source), &mut env, RUNNER_COMPILE_MODE).expect("compiles");
        let executed = compiled.run(&mut env).expect("runs");
        assert!(!executed.has_errors());
        cloud.journal()
    };

    let with_variable = run(
        "cidr = 10.0.2.0/24\n\
         sub = create subnet cidr=$cidr vpc=@default",
    );
    let with_literal = run("sub = create subnet cidr=10.0.2.0/24 vpc=@default");

    assert_eq!(with_variable, with_literal);
}

#[test]
fn security_group_lifecycle() {
    let (cloud, mut env) = catalog_env();

    let tpl = parse(
        "sg = create securitygroup name=web-sg vpc=@default description='web tier'\n\
         update securitygroup id=$sg protocol=tcp inbound=authorize cidr=0.0.0.0/0\n\
         delete securitygroup id=$sg",
    );
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    let executed = compiled.run(&mut env).expect("runs");

    assert!(!executed.has_errors());
    assert!(cloud.resource("sg-0001").is_none());
    let journal = cloud.journal();
    assert!(journal.iter().any(|c| c.starts_with("create_security_group")));
    assert!(journal.iter().any(|c| c.starts_with("update_security_group id=sg-0001")));
    assert!(journal.iter().any(|c| c.starts_with("delete_security_group id=sg-0001")));
}
