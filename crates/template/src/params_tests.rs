// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ast::Val;

#[test]
fn parses_scalar_bindings() {
    let fillers = parse_params("instance.type=t2.nano count=3 lock=true").expect("parses");
    assert_eq!(
        fillers.get("instance.type"),
        Some(&Expr::Lit(Val::Str("t2.nano".into())))
    );
    assert_eq!(fillers.get("count"), Some(&Expr::Lit(Val::Int(3))));
    assert_eq!(fillers.get("lock"), Some(&Expr::Lit(Val::Bool(true))));
}

#[test]
fn alias_fillers_stay_aliases() {
    let fillers = parse_params("hole.name=@subalias").expect("parses");
    assert_eq!(fillers.get("hole.name"), Some(&Expr::Alias("subalias".into())));
}

#[test]
fn list_bindings_with_aliases() {
    let fillers = parse_params("my.subnets=[@sub1, @sub2]").expect("parses");
    assert_eq!(
        fillers.get("my.subnets"),
        Some(&Expr::List(vec![
            Expr::Alias("sub1".into()),
            Expr::Alias("sub2".into()),
        ]))
    );
}

#[test]
fn bracketless_list_binding() {
    let fillers = parse_params("my.subnets=sub1, sub2 my.name=loadbalancername").expect("parses");
    assert_eq!(
        fillers.get("my.subnets"),
        Some(&Expr::List(vec![
            Expr::Lit(Val::Str("sub1".into())),
            Expr::Lit(Val::Str("sub2".into())),
        ]))
    );
    assert_eq!(
        fillers.get("my.name"),
        Some(&Expr::Lit(Val::Str("loadbalancername".into())))
    );
}

#[test]
fn quoted_binding_values() {
    let fillers = parse_params("name='my test instance'").expect("parses");
    assert_eq!(
        fillers.get("name"),
        Some(&Expr::Lit(Val::Str("my test instance".into())))
    );
}

#[test]
fn empty_input_yields_no_fillers() {
    assert!(parse_params("").expect("parses").is_empty());
    assert!(parse_params("   ").expect("parses").is_empty());
}

#[test]
fn rejects_binding_without_value() {
    assert!(parse_params("key=").is_err());
    assert!(parse_params("justkey").is_err());
}

#[test]
fn parse_value_accepts_template_forms() {
    assert_eq!(parse_value("@sub").expect("parses"), Expr::Alias("sub".into()));
    assert_eq!(
        parse_value("[a,b]").expect("parses"),
        Expr::List(vec![
            Expr::Lit(Val::Str("a".into())),
            Expr::Lit(Val::Str("b".into())),
        ])
    );
    assert_eq!(parse_value("42").expect("parses"), Expr::Lit(Val::Int(42)));
}
