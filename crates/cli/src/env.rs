// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment wiring: fillers, callbacks and the command catalog

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::Arc;
use stratus_cloud::MemoryCloud;
use stratus_template::{parse_value, Env, Expr, Registry, Val};

/// Assemble a compilation environment around the in-memory provider.
///
/// `fillers` should already merge defaults and command-line params
/// (later entries win). The missing-hole callback prompts on stdin
/// unless `interactive` is false, in which case unfilled holes stay
/// unresolved and surface through the strict guards.
pub fn build_env(
    fillers: HashMap<String, Expr>,
    cloud: &Arc<MemoryCloud>,
    registry: Option<Arc<Registry>>,
    interactive: bool,
) -> Env {
    let mut env = Env::new();
    env.fillers = fillers;

    let alias_cloud = cloud.clone();
    env.alias_func = Some(Box::new(move |entity, key, alias| {
        alias_cloud.resolve_alias(entity, key, alias)
    }));

    env.def_lookup = Some(Box::new(stratus_cloud::definitions));

    if let Some(registry) = registry {
        env.lookup = Some(Box::new(move |key| registry.lookup(key)));
    }

    if interactive {
        env.missing_holes_func = Some(Box::new(prompt_for_hole));
    }

    env
}

/// Merge default fillers with command-line ones; the command line wins.
pub fn merge_fillers(
    defaults: HashMap<String, Expr>,
    cli: HashMap<String, Expr>,
) -> HashMap<String, Expr> {
    let mut merged = defaults;
    merged.extend(cli);
    merged
}

fn prompt_for_hole(name: &str) -> Expr {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "Please specify a value for {}: ", name);
    let _ = stderr.flush();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return Expr::Lit(Val::Str(String::new()));
    }
    let line = line.trim();
    parse_value(line).unwrap_or_else(|_| Expr::Lit(Val::Str(line.to_string())))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
