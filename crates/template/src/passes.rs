// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compilation pass library
//!
//! Each pass is a pure `(Template, &mut Env) -> Template` rewrite; the
//! pass lists in [`crate::compile`] fix their order. Passes mutate value
//! expressions in place; only variable inlining rebuilds the statement
//! list.

use crate::ast::{DeclExpr, Expr, Statement};
use crate::compile::CompileError;
use crate::driver::DriverParams;
use crate::env::Env;
use crate::template::Template;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Check every command against its definition schema and turn missing
/// required params into holes named `entity.param`.
pub fn resolve_against_definitions(
    mut tpl: Template,
    env: &mut Env,
) -> Result<Template, CompileError> {
    let Some(def_lookup) = env.def_lookup.as_ref() else {
        return Err(CompileError::NoDefinitionLookup);
    };

    for node in tpl.command_nodes() {
        let key = node.key();
        let Some(def) = def_lookup(&key) else {
            return Err(CompileError::DefinitionNotFound(key));
        };
        for param_key in node.keys() {
            if !def.required.contains(&param_key) && !def.extra.contains(&param_key) {
                return Err(CompileError::UnexpectedParamKey {
                    action: node.action.clone(),
                    entity: node.entity.clone(),
                    key: param_key,
                    required: def.required.clone(),
                    extra: def.extra.clone(),
                });
            }
        }
    }

    for node in tpl.command_nodes_mut() {
        let key = node.key();
        let Some(def) = def_lookup(&key) else {
            continue;
        };
        for required in &def.required {
            if !node.params.contains_key(required) {
                let normalized = format!("{}.{}", node.entity, required);
                node.params.insert(required.clone(), Expr::Hole(normalized));
            }
        }
    }

    Ok(tpl)
}

/// Verify the registry knows every command used by the template.
pub fn verify_commands_defined(tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    for node in tpl.command_nodes() {
        let key = node.key();
        if lookup(&key).is_none() {
            return Err(CompileError::CommandNotFound(key));
        }
    }
    Ok(tpl)
}

/// Ask each command object to shape-check its bound param keys.
pub fn validate_commands_params(tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    for node in tpl.command_nodes() {
        let key = node.key();
        let Some(cmd) = lookup(&key) else {
            return Err(CompileError::CommandNotFound(key));
        };
        let guard = cmd.lock();
        if let Err(e) = guard.validate_params(&node.keys()) {
            return Err(CompileError::Command {
                action: node.action.clone(),
                entity: node.entity.clone(),
                message: e.to_string(),
            });
        }
    }
    Ok(tpl)
}

/// Turn each command's reported missing required params into holes named
/// `entity.param`, exactly as the lenient pipeline does.
pub fn normalize_missing_required_params_as_holes(
    mut tpl: Template,
    env: &mut Env,
) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    for node in tpl.command_nodes_mut() {
        let key = node.key();
        let Some(cmd) = lookup(&key) else {
            return Err(CompileError::CommandNotFound(key));
        };
        let missing = match cmd.lock().validate_params(&node.keys()) {
            Ok(missing) => missing,
            Err(e) => {
                return Err(CompileError::Command {
                    action: node.action.clone(),
                    entity: node.entity.clone(),
                    message: e.to_string(),
                })
            }
        };
        for name in missing {
            let normalized = format!("{}.{}", node.entity, name);
            node.params.insert(name, Expr::Hole(normalized));
        }
    }
    Ok(tpl)
}

/// Enforce single assignment and forward-only references.
pub fn check_invalid_reference_declarations(
    tpl: Template,
    _env: &mut Env,
) -> Result<Template, CompileError> {
    let mut known: HashSet<String> = HashSet::new();
    for st in &tpl.statements {
        for reference in st.refs() {
            if !known.contains(&reference) {
                return Err(CompileError::UndefinedReference(reference));
            }
        }
        if let Statement::Declaration(decl) = st {
            if known.contains(&decl.ident) {
                return Err(CompileError::AlreadyAssigned(decl.ident.clone()));
            }
            known.insert(decl.ident.clone());
        }
    }
    Ok(tpl)
}

/// Replace holes that have a filler, recording what was consumed.
pub fn resolve_holes(mut tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    for expr in tpl.expressions_mut() {
        let consumed = expr.process_holes(&env.fillers);
        if !consumed.is_empty() {
            env.add_processed_fillers(consumed);
        }
    }
    Ok(tpl)
}

/// Ask the missing-hole callback for every hole still unresolved, once
/// per unique name, in lexicographic order.
pub fn resolve_missing_holes(mut tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let mut unique: BTreeSet<String> = BTreeSet::new();
    for expr in tpl.expressions() {
        unique.extend(expr.holes());
    }

    let mut fillers: HashMap<String, Expr> = HashMap::new();
    if let Some(missing_fn) = env.missing_holes_func.as_mut() {
        for name in &unique {
            fillers.insert(name.clone(), missing_fn(name));
        }
    }

    for expr in tpl.expressions_mut() {
        let consumed = expr.process_holes(&fillers);
        if !consumed.is_empty() {
            env.add_processed_fillers(consumed);
        }
    }
    Ok(tpl)
}

/// Resolve aliases through the alias callback. Without a callback the
/// pass is a no-op; with one, any alias it cannot resolve fails the pass,
/// reported as a group.
pub fn resolve_aliases(mut tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(alias_fn) = env.alias_func.as_ref() else {
        return Ok(tpl);
    };

    let mut unresolved: Vec<String> = Vec::new();
    for st in &mut tpl.statements {
        match st {
            Statement::Command(node) => {
                resolve_node_aliases(node, alias_fn, &mut unresolved);
            }
            Statement::Declaration(decl) => match &mut decl.expr {
                DeclExpr::Command(node) => {
                    resolve_node_aliases(node, alias_fn, &mut unresolved);
                }
                DeclExpr::Value(expr) => {
                    expr.resolve_aliases(&mut |alias| {
                        resolve_one_alias(alias_fn, "", "", alias, &mut unresolved)
                    });
                }
            },
        }
    }

    if unresolved.is_empty() {
        Ok(tpl)
    } else {
        Err(CompileError::CannotResolveAliases(unresolved))
    }
}

fn resolve_node_aliases(
    node: &mut crate::ast::CommandNode,
    alias_fn: &crate::env::AliasFn,
    unresolved: &mut Vec<String>,
) {
    let entity = node.entity.clone();
    for (key, expr) in node.params.iter_mut() {
        expr.resolve_aliases(&mut |alias| {
            resolve_one_alias(alias_fn, &entity, key, alias, unresolved)
        });
    }
}

fn resolve_one_alias(
    alias_fn: &crate::env::AliasFn,
    entity: &str,
    key: &str,
    alias: &str,
    unresolved: &mut Vec<String>,
) -> Option<String> {
    match alias_fn(entity, key, alias) {
        Some(actual) if !actual.is_empty() => {
            tracing::debug!(alias, actual = %actual, key, "alias resolved");
            Some(actual)
        }
        _ => {
            unresolved.push(alias.to_string());
            None
        }
    }
}

/// Inline value declarations into later statements. Fully-resolved
/// declarations are recorded in `env.resolved_variables` and elided;
/// partially-resolved ones are retained for run-time resolution.
pub fn inline_variable_values(tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let mut statements = tpl.statements;
    let mut kept: Vec<Statement> = Vec::with_capacity(statements.len());

    for i in 0..statements.len() {
        let mut inline: Option<(String, Expr, bool)> = None;
        if let Statement::Declaration(decl) = &statements[i] {
            if let DeclExpr::Value(expr) = &decl.expr {
                inline = Some((decl.ident.clone(), expr.clone(), expr.is_resolved()));
            }
        }

        let Some((ident, value, resolved)) = inline else {
            kept.push(statements[i].clone());
            continue;
        };

        if let Some(val) = value.value() {
            env.resolved_variables.insert(ident.clone(), val);
        }
        for later in statements[i + 1..].iter_mut() {
            later.replace_ref(&ident, &value);
        }
        if !resolved {
            kept.push(statements[i].clone());
        }
    }

    Ok(Template {
        id: tpl.id,
        statements: kept,
    })
}

/// Fold multi-key params through each command's converter capability.
pub fn convert_params(mut tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    for node in tpl.command_nodes_mut() {
        let key = node.key();
        let Some(cmd) = lookup(&key) else {
            return Err(CompileError::CommandNotFound(key));
        };
        let conversion = cmd.lock().convert_params();
        let Some(conversion) = conversion else {
            continue;
        };

        let driver = node.driver_params();
        let mut values = DriverParams::new();
        let mut collected: Vec<String> = Vec::new();
        for k in &conversion.keys {
            if let Some(v) = driver.get(k) {
                values.insert(k.clone(), v.clone());
                collected.push(k.clone());
            }
        }
        let converted = (conversion.convert)(values).map_err(|e| CompileError::Command {
            action: node.action.clone(),
            entity: node.entity.clone(),
            message: e.to_string(),
        })?;
        for k in collected {
            node.params.remove(&k);
        }
        for (k, v) in converted {
            node.params.insert(k, Expr::from(v));
        }
    }
    Ok(tpl)
}

/// Run each command's full semantic check and report every error at
/// once, prefixed `action entity:`.
pub fn validate_commands(tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    let mut errs: Vec<String> = Vec::new();
    for node in tpl.command_nodes() {
        let key = node.key();
        let Some(cmd) = lookup(&key) else {
            return Err(CompileError::CommandNotFound(key));
        };
        let params = node.driver_params();
        let ref_keys = node.ref_keys();
        for e in cmd.lock().validate_command(&params, &ref_keys) {
            errs.push(format!("{} {}: {}", node.action, node.entity, e));
        }
    }
    if errs.is_empty() {
        Ok(tpl)
    } else {
        Err(CompileError::Validation(errs))
    }
}

/// Attach the concrete command object to each command node, protecting
/// the runner from late lookup failures.
pub fn inject_commands(mut tpl: Template, env: &mut Env) -> Result<Template, CompileError> {
    let Some(lookup) = env.lookup.as_ref() else {
        return Err(CompileError::NoCommandLookup);
    };
    for node in tpl.command_nodes_mut() {
        let key = node.key();
        match lookup(&key) {
            Some(handle) => node.command = Some(handle),
            None => return Err(CompileError::CommandNotFound(key)),
        }
    }
    Ok(tpl)
}

/// Terminal guard: fail when any hole survived resolution.
pub fn fail_on_unresolved_holes(tpl: Template, _env: &mut Env) -> Result<Template, CompileError> {
    let mut unresolved: Vec<String> = Vec::new();
    for expr in tpl.expressions() {
        unresolved.extend(expr.holes());
    }
    if unresolved.is_empty() {
        Ok(tpl)
    } else {
        Err(CompileError::UnresolvedHoles(unresolved))
    }
}

/// Terminal guard: fail when any alias survived resolution.
pub fn fail_on_unresolved_aliases(tpl: Template, _env: &mut Env) -> Result<Template, CompileError> {
    let mut unresolved: Vec<String> = Vec::new();
    for expr in tpl.expressions() {
        unresolved.extend(expr.aliases());
    }
    if unresolved.is_empty() {
        Ok(tpl)
    } else {
        Err(CompileError::UnresolvedAliases(unresolved))
    }
}

#[cfg(test)]
#[path = "passes_tests.rs"]
mod tests;
