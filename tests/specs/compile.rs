//! Compilation scenarios: variables, holes, aliases, lists and the
//! failure modes of the reference checks and terminal guards.

use crate::prelude::{catalog_env, fillers, parse};
use similar_asserts::assert_eq;
use stratus_template::{compile, Val, RUNNER_COMPILE_MODE, STRICT_COMPILE_MODE};

#[test]
fn variable_hole_and_alias_resolve_together() {
    let (_cloud, mut env) = catalog_env();
    env.fillers = fillers(&[("test.cidr", "10.0.2.0/24")]);

    let tpl = parse(
        "subnetname = my-subnet\n\
         vpcref = @default\n\
         sub = create subnet cidr={test.cidr} vpc=$vpcref name=$subnetname\n\
         update subnet id=$sub public=true",
    );
    let compiled = compile(tpl, &mut env, STRICT_COMPILE_MODE).expect("compiles");

    assert_eq!(
        compiled.to_string(),
        "sub = create subnet cidr=10.0.2.0/24 name=my-subnet vpc=vpc-default\n\
         update subnet id=$sub public=true"
    );
    assert_eq!(
        env.processed_fillers(),
        fillers(&[("test.cidr", "10.0.2.0/24")])
    );
    assert_eq!(
        env.resolved_variables.get("subnetname"),
        Some(&Val::Str("my-subnet".into()))
    );
    assert_eq!(
        env.resolved_variables.get("vpcref"),
        Some(&Val::Str("vpc-default".into()))
    );
}

#[test]
fn lists_mix_literals_aliases_and_repeats() {
    let (cloud, mut env) = catalog_env();
    cloud.seed("subnet", "a", "sub-9");

    let tpl = parse("create loadbalancer subnets=[sub-1, @a, @a] name=lb");
    let compiled = compile(tpl, &mut env, STRICT_COMPILE_MODE).expect("compiles");

    assert_eq!(
        compiled.to_string(),
        "create loadbalancer name=lb subnets=[sub-1,sub-9,sub-9]"
    );
}

#[test]
fn bracketless_and_bracketed_lists_compile_identically() {
    let (_cloud, mut env) = catalog_env();
    let bare = compile(
        parse("create loadbalancer name=lb subnets=sub1, sub2"),
        &mut env,
        STRICT_COMPILE_MODE,
    )
    .expect("compiles");

    let (_cloud, mut env) = catalog_env();
    let bracketed = compile(
        parse("create loadbalancer name=lb subnets=[sub1,sub2]"),
        &mut env,
        STRICT_COMPILE_MODE,
    )
    .expect("compiles");

    assert_eq!(bare.to_string(), bracketed.to_string());
}

#[test]
fn concatenation_of_fillers_becomes_one_literal() {
    let (_cloud, mut env) = catalog_env();
    env.fillers = fillers(&[("a", "one"), ("b", "2")]);

    let tpl = parse("name = 'pre-'+{a}+{b}\ncreate loadbalancer name=$name subnets=[s-1]");
    let compiled = compile(tpl, &mut env, STRICT_COMPILE_MODE).expect("compiles");

    assert_eq!(
        compiled.to_string(),
        "create loadbalancer name=pre-one2 subnets=[s-1]"
    );
}

#[test]
fn a_filler_may_itself_be_an_alias() {
    let (cloud, mut env) = catalog_env();
    cloud.seed("subnet", "sub", "subnet-2345");
    env.fillers = fillers(&[("hole", "@sub")]);

    let tpl = parse("create loadbalancer name=lb subnets=[{hole}]");
    let compiled = compile(tpl, &mut env, STRICT_COMPILE_MODE).expect("compiles");

    assert_eq!(
        compiled.to_string(),
        "create loadbalancer name=lb subnets=[subnet-2345]"
    );
    assert_eq!(env.processed_fillers(), fillers(&[("hole", "@sub")]));
}

#[test]
fn missing_required_params_become_holes_and_fail_strict() {
    let (_cloud, mut env) = catalog_env();
    env.fillers = fillers(&[("instance.name", "web"), ("instance.type", "t2.micro")]);

    // the registry reports `subnet` (among others) as missing required
    let tpl = parse("create instance image=ami-1 count=1");
    let err = compile(tpl, &mut env, RUNNER_COMPILE_MODE).unwrap_err();

    assert!(
        err.to_string().contains("unresolved holes: [instance.subnet]"),
        "got: {}",
        err
    );
}

#[test]
fn forward_references_are_rejected() {
    let (_cloud, mut env) = catalog_env();
    let tpl = parse("create instance subnet=$sub image=ami-1 count=1\nsub = create subnet");
    let err = compile(tpl, &mut env, RUNNER_COMPILE_MODE).unwrap_err();
    assert!(
        err.to_string().contains("'sub' is undefined in template"),
        "got: {}",
        err
    );
}

#[test]
fn duplicate_declarations_are_rejected() {
    let (_cloud, mut env) = catalog_env();
    let tpl = parse("inst = create instance\ninst = create instance");
    let err = compile(tpl, &mut env, RUNNER_COMPILE_MODE).unwrap_err();
    assert!(
        err.to_string().contains("'inst' has already been assigned in template"),
        "got: {}",
        err
    );
}

#[test]
fn declaring_from_a_later_variable_fails() {
    let (_cloud, mut env) = catalog_env();
    let tpl = parse("x = $y\ny = 127.0.0.1");
    let err = compile(tpl, &mut env, STRICT_COMPILE_MODE).unwrap_err();
    assert!(
        err.to_string().contains("'y' is undefined in template"),
        "got: {}",
        err
    );
}

#[test]
fn unknown_commands_fail_before_execution_is_possible() {
    let (_cloud, mut env) = catalog_env();
    let tpl = parse("create wormhole name=w");
    let err = compile(tpl, &mut env, RUNNER_COMPILE_MODE).unwrap_err();
    assert!(
        err.to_string().contains("cannot find command for 'createwormhole'"),
        "got: {}",
        err
    );
}

#[test]
fn semantic_validation_errors_are_grouped() {
    let (_cloud, mut env) = catalog_env();
    // both statements carry an invalid cidr
    let tpl = parse(
        "create subnet cidr=bad-cidr vpc=vpc-1\n\
         create subnet cidr=also-bad vpc=vpc-1",
    );
    let err = compile(tpl, &mut env, RUNNER_COMPILE_MODE).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("validation errors:"), "got: {}", msg);
    assert!(msg.contains("bad-cidr") && msg.contains("also-bad"), "got: {}", msg);
}

#[test]
fn converted_params_reach_the_compiled_template() {
    let (_cloud, mut env) = catalog_env();
    // singular subnet folds into the subnets list during compilation
    let tpl = parse("create loadbalancer name=lb subnet=sub-1");
    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE).expect("compiles");
    assert_eq!(
        compiled.to_string(),
        "create loadbalancer name=lb subnets=[sub-1]"
    );
}
