// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field validators shared across commands

use std::net::IpAddr;

/// Validate `addr/prefix` CIDR notation.
pub fn validate_cidr(s: &str) -> Result<(), String> {
    let Some((addr, prefix)) = s.split_once('/') else {
        return Err(format!("'{}' is not CIDR notation", s));
    };
    let addr: IpAddr = addr
        .parse()
        .map_err(|_| format!("'{}' has an invalid address", s))?;
    let max = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    match prefix.parse::<u8>() {
        Ok(p) if p <= max => Ok(()),
        _ => Err(format!("'{}' has an invalid prefix length", s)),
    }
}

/// Validates a value against a fixed set of accepted words.
pub struct EnumValidator {
    allowed: &'static [&'static str],
}

impl EnumValidator {
    pub fn new(allowed: &'static [&'static str]) -> Self {
        EnumValidator { allowed }
    }

    pub fn validate(&self, value: &str) -> Result<(), String> {
        if self.allowed.contains(&value) {
            Ok(())
        } else {
            Err(format!(
                "invalid value '{}': expecting one of {}",
                value,
                self.allowed.join(", ")
            ))
        }
    }
}

#[cfg(test)]
#[path = "validators_tests.rs"]
mod tests;
