//! Shared helpers for the spec suite

use std::collections::HashMap;
use std::sync::Arc;
use stratus_cloud::{CloudApi, MemoryCloud};
use stratus_template::{Env, Expr, Registry, Template};

/// An environment wired to a fresh in-memory provider: catalog registry,
/// definitions, and alias resolution through the provider's name index.
pub fn catalog_env() -> (Arc<MemoryCloud>, Env) {
    let cloud = Arc::new(MemoryCloud::new());
    cloud.seed("vpc", "default", "vpc-default");

    let api: Arc<dyn CloudApi> = cloud.clone();
    let registry: Arc<Registry> = Arc::new(stratus_cloud::registry(api).expect("registry builds"));

    let mut env = Env::new();
    env.def_lookup = Some(Box::new(stratus_cloud::definitions));
    env.lookup = Some(Box::new(move |key| registry.lookup(key)));
    let alias_cloud = cloud.clone();
    env.alias_func = Some(Box::new(move |entity, key, alias| {
        alias_cloud.resolve_alias(entity, key, alias)
    }));

    (cloud, env)
}

pub fn fillers(pairs: &[(&str, &str)]) -> HashMap<String, Expr> {
    pairs
        .iter()
        .map(|(k, v)| {
            (
                k.to_string(),
                stratus_template::parse_value(v).expect("filler value parses"),
            )
        })
        .collect()
}

pub fn parse(input: &str) -> Template {
    Template::parse(input).expect("template parses")
}
