// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Param-rule combinators for commands with non-trivial shapes
//!
//! A rule tree describes which param keys a command accepts and which
//! combinations satisfy it, e.g. for updating a security group:
//! `all_of([key("id"), key("protocol"), one_of_required([key("inbound"),
//! key("outbound")]), one_of([key("cidr"), key("securitygroup")])])`.

use stratus_template::CommandError;

#[derive(Debug, Clone)]
pub enum ParamRule {
    /// A single required key.
    Key(String),
    /// Every child must be satisfied; unsatisfied keys are "missing".
    AllOf(Vec<ParamRule>),
    /// An optional choice between alternatives.
    OneOf(Vec<ParamRule>),
    /// Exactly this choice is mandatory; none satisfied is a semantic
    /// error rather than a missing param.
    OneOfRequired(Vec<ParamRule>),
}

pub fn key(name: impl Into<String>) -> ParamRule {
    ParamRule::Key(name.into())
}

pub fn all_of(rules: Vec<ParamRule>) -> ParamRule {
    ParamRule::AllOf(rules)
}

pub fn one_of(rules: Vec<ParamRule>) -> ParamRule {
    ParamRule::OneOf(rules)
}

pub fn one_of_required(rules: Vec<ParamRule>) -> ParamRule {
    ParamRule::OneOfRequired(rules)
}

impl ParamRule {
    /// Every key mentioned anywhere in the tree.
    pub fn known_keys(&self) -> Vec<String> {
        match self {
            ParamRule::Key(name) => vec![name.clone()],
            ParamRule::AllOf(rules) | ParamRule::OneOf(rules) | ParamRule::OneOfRequired(rules) => {
                rules.iter().flat_map(ParamRule::known_keys).collect()
            }
        }
    }

    /// True when the bound keys satisfy this rule.
    pub fn satisfied(&self, keys: &[String]) -> bool {
        match self {
            ParamRule::Key(name) => keys.iter().any(|k| k == name),
            ParamRule::AllOf(rules) => rules.iter().all(|r| r.satisfied(keys)),
            ParamRule::OneOf(rules) | ParamRule::OneOfRequired(rules) => {
                rules.is_empty() || rules.iter().any(|r| r.satisfied(keys))
            }
        }
    }

    /// Required keys not yet bound. Choice nodes report nothing here:
    /// there is no single key to turn into a hole.
    pub fn missing(&self, keys: &[String]) -> Vec<String> {
        match self {
            ParamRule::Key(name) => {
                if keys.iter().any(|k| k == name) {
                    Vec::new()
                } else {
                    vec![name.clone()]
                }
            }
            ParamRule::AllOf(rules) => rules.iter().flat_map(|r| r.missing(keys)).collect(),
            ParamRule::OneOf(_) | ParamRule::OneOfRequired(_) => Vec::new(),
        }
    }

    /// Semantic violations: mandatory choices with no alternative bound.
    pub fn errors(&self, keys: &[String]) -> Vec<CommandError> {
        match self {
            ParamRule::Key(_) | ParamRule::OneOf(_) => Vec::new(),
            ParamRule::AllOf(rules) => rules.iter().flat_map(|r| r.errors(keys)).collect(),
            ParamRule::OneOfRequired(rules) => {
                if self.satisfied(keys) {
                    rules.iter().flat_map(|r| r.errors(keys)).collect()
                } else {
                    vec![CommandError::Other(format!(
                        "expecting one of: {}",
                        self.known_keys().join(", ")
                    ))]
                }
            }
        }
    }

    /// Shape check: reject unknown keys, then report missing required
    /// ones. `extras` lists keys accepted outside the rule tree.
    pub fn verify(&self, keys: &[String], extras: &[&str]) -> Result<Vec<String>, CommandError> {
        let known = self.known_keys();
        for k in keys {
            if !known.iter().any(|n| n == k) && !extras.contains(&k.as_str()) {
                return Err(CommandError::UnexpectedParam(k.clone()));
            }
        }
        Ok(self.missing(keys))
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
