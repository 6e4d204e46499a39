// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `stratus`: compile and run cloud templates against the local catalog

mod config;
mod env;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stratus_cloud::{CloudApi, MemoryCloud};
use stratus_template::{
    compile, parse_params, Expr, Template, RUNNER_COMPILE_MODE, STRICT_COMPILE_MODE,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratus", version, about = "Template-driven cloud operations")]
struct Cli {
    /// TOML file providing default fillers (falls back to
    /// ~/.config/stratus/defaults.toml)
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Never prompt for missing holes; fail instead
    #[arg(long, global = true)]
    no_prompt: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Resolve a template and print its compiled form
    Compile {
        /// Template file
        file: PathBuf,
        /// Hole fillers as key=value bindings
        params: Vec<String>,
        /// Also print consumed fillers and resolved variables as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile against the command catalog and execute each statement
    Run {
        /// Template file
        file: PathBuf,
        /// Hole fillers as key=value bindings
        params: Vec<String>,
        /// Validate and plan without mutating the provider
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STRATUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let fillers = gather_fillers(
        cli.defaults.as_deref(),
        match &cli.command {
            Cmd::Compile { params, .. } | Cmd::Run { params, .. } => params,
        },
    )?;

    match cli.command {
        Cmd::Compile { file, json, .. } => compile_template(&file, fillers, !cli.no_prompt, json),
        Cmd::Run { file, dry_run, .. } => run_template(&file, fillers, !cli.no_prompt, dry_run),
    }
}

/// Defaults file first, command-line bindings on top.
fn gather_fillers(
    defaults: Option<&Path>,
    params: &[String],
) -> anyhow::Result<HashMap<String, Expr>> {
    let default_fillers = match defaults {
        Some(path) => config::load_defaults(path)
            .with_context(|| format!("loading defaults from {}", path.display()))?,
        None => match config::default_path() {
            Some(path) if path.exists() => config::load_defaults(&path)
                .with_context(|| format!("loading defaults from {}", path.display()))?,
            _ => HashMap::new(),
        },
    };
    let cli_fillers = parse_params(&params.join(" ")).context("parsing command-line params")?;
    Ok(env::merge_fillers(default_fillers, cli_fillers))
}

fn load_template(file: &Path) -> anyhow::Result<Template> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("reading template {}", file.display()))?;
    Template::parse(&source).with_context(|| format!("parsing template {}", file.display()))
}

fn provider() -> Arc<MemoryCloud> {
    let cloud = Arc::new(MemoryCloud::new());
    // a resolvable starting point for @default aliases
    cloud.seed("vpc", "default", "vpc-default");
    cloud
}

fn compile_template(
    file: &Path,
    fillers: HashMap<String, Expr>,
    interactive: bool,
    json: bool,
) -> anyhow::Result<()> {
    let tpl = load_template(file)?;
    let cloud = provider();
    let mut env = env::build_env(fillers, &cloud, None, interactive);

    let compiled = compile(tpl, &mut env, STRICT_COMPILE_MODE)?;
    println!("{}", compiled);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "processed_fillers": env.processed_fillers(),
                "resolved_variables": env.resolved_variables,
            })
        );
    }
    Ok(())
}

fn run_template(
    file: &Path,
    fillers: HashMap<String, Expr>,
    interactive: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let tpl = load_template(file)?;
    let cloud = provider();
    let api: Arc<dyn CloudApi> = cloud.clone();
    let registry = Arc::new(stratus_cloud::registry(api)?);

    let mut env = env::build_env(fillers, &cloud, Some(registry), interactive);
    env.is_dry_run = dry_run;

    let compiled = compile(tpl, &mut env, RUNNER_COMPILE_MODE)?;
    tracing::info!(id = %compiled.id, dry_run, "template compiled");

    let executed = compiled.run(&mut env)?;
    output::report(&executed, &mut std::io::stdout())?;

    if executed.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
