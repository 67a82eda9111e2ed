// NetShare - Main Entry Point
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # NetShare
//!
//! NetworkManager connection-sharing reconciler for USB gadget uplinks.
//!
//! Reads a snapshot of the host's adapters, computes the minimal set of
//! changes toward the declared sharing topology, applies them, and
//! verifies the result. Safe to re-run; a converged host is a no-op.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

mod applier;
mod host;
mod inventory;
mod models;
mod planner;
mod services;
mod storage;

use applier::{Applier, ApplyOptions};
use host::{NetworkHost, NmcliHost};
use models::{validation, Config, Inventory, ReconciliationPlan, Result, StepStatus};
use services::{ConnectivityCheck, ConnectivityOutcome};

#[derive(Parser)]
#[command(name = "netshare", version)]
#[command(about = "NetworkManager connection-sharing reconciler for USB gadget uplinks")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show adapters, routes and sharing state
    Status,

    /// Compute and print the reconciliation plan without applying it
    Plan(TargetArgs),

    /// Reconcile the host toward the declared sharing topology
    Apply(TargetArgs),

    /// Probe connectivity, reconnecting once on failure
    Check,

    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Upstream adapter override (defaults from the config file)
    #[arg(long, value_name = "ADAPTER")]
    public: Option<String>,

    /// Downstream adapter override (defaults from the config file)
    #[arg(long, value_name = "ADAPTER")]
    private: Option<String>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a commented starter configuration file
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_config_error() {
                ExitCode::from(2)
            } else if e.is_fatal() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Command::Config {
        command: ConfigCommand::Init,
    } = &cli.command
    {
        let path = storage::init_config(cli.config.as_deref())?;
        println!("Wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = storage::load_config(cli.config.as_deref())?;
    let host = NmcliHost::new();

    match cli.command {
        Command::Status => cmd_status(&host, &config, cli.json),
        Command::Plan(args) => {
            let config = config.with_overrides(args.public, args.private);
            config.validate()?;
            cmd_plan(&host, &config, cli.json)
        }
        Command::Apply(args) => {
            let config = config.with_overrides(args.public, args.private);
            config.validate()?;
            cmd_apply(&host, &config, cli.json)
        }
        Command::Check => cmd_check(&host, &config),
        Command::Config { .. } => unreachable!("handled above"),
    }
}

fn cmd_status(host: &dyn NetworkHost, config: &Config, json: bool) -> Result<ExitCode> {
    let inv = inventory::read(host, &config.service.name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inv)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{:<12} {:<10} {:<5} {:<20} {:<20} {:>7} {:>8}",
        "ADAPTER", "TYPE", "LINK", "CONNECTION", "IPV4", "METRIC", "SHARING"
    );
    for a in &inv.adapters {
        println!(
            "{:<12} {:<10} {:<5} {:<20} {:<20} {:>7} {:>8}",
            a.name,
            a.adapter_type.display_name(),
            if a.link_up { "up" } else { "down" },
            a.connection_name().unwrap_or("-"),
            a.ipv4.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
            a.route_metric
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".into()),
            if a.sharing_enabled { "yes" } else { "no" },
        );
    }

    println!();
    println!(
        "Service {}: {}",
        inv.service.name,
        if inv.service.active { "active" } else { "inactive" }
    );
    if let Some(preferred) = inv.preferred_route() {
        println!(
            "Preferred route: {} (metric {})",
            preferred.name,
            preferred.route_metric.unwrap_or(0)
        );
    }
    for dup in &inv.duplicates {
        println!(
            "Warning: connection name '{}' has {} stored profiles",
            dup.name,
            dup.uuids.len()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_plan(host: &dyn NetworkHost, config: &Config, json: bool) -> Result<ExitCode> {
    let (_, plan) = compute_plan(host, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(ExitCode::SUCCESS);
    }

    if plan.is_empty() {
        println!("Already converged, nothing to do.");
    } else {
        println!("Plan ({} actions):", plan.len());
        for (i, action) in plan.actions.iter().enumerate() {
            println!("  {}. {}", i + 1, action.description());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_apply(host: &dyn NetworkHost, config: &Config, json: bool) -> Result<ExitCode> {
    let (inv, plan) = compute_plan(host, config)?;

    let private_connection = inv
        .adapter(&config.sharing.private)
        .and_then(|a| a.connection_name().map(str::to_string));
    let expected_subnet = config
        .verify
        .expected_subnet
        .as_deref()
        .map(validation::validate_cidr)
        .transpose()?;

    let options = ApplyOptions {
        private_adapter: config.sharing.private.clone(),
        private_connection,
        settle_wait: Duration::from_secs(config.verify.settle_wait_secs as u64),
        expected_subnet,
    };

    let result = Applier::new(host, options).apply(&plan)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for action in &result.actions {
            let marker = match action.status {
                StepStatus::Success => "ok",
                StepStatus::Warning => "warn",
                StepStatus::Error => "FAIL",
                _ => "-",
            };
            println!("[{:^4}] {}", marker, action.message);
            if let Some(detail) = &action.error_detail {
                println!("       {}", detail);
            }
        }
        for warning in &result.warnings {
            println!("Warning: {}", warning);
        }
        println!("{} (phase: {})", result.message, result.phase.as_str());

        // A converged-and-verified pass still deserves a reachability answer
        let check = ConnectivityCheck::new(
            config.verify.ping_target.clone(),
            Duration::from_secs(config.verify.settle_wait_secs as u64),
        );
        match check.check_with_remediation(host) {
            ConnectivityOutcome::Reachable => {
                println!("Connectivity: {} reachable", config.verify.ping_target)
            }
            ConnectivityOutcome::RecoveredAfterReconnect => {
                println!(
                    "Connectivity: {} reachable after reconnect",
                    config.verify.ping_target
                )
            }
            ConnectivityOutcome::Unreachable => {
                warn!("{} unreachable after reconnect", config.verify.ping_target);
                println!("Connectivity: {} unreachable", config.verify.ping_target)
            }
        }
    }

    if result.status == StepStatus::Error {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(host: &dyn NetworkHost, config: &Config) -> Result<ExitCode> {
    let check = ConnectivityCheck::new(
        config.verify.ping_target.clone(),
        Duration::from_secs(config.verify.settle_wait_secs as u64),
    );
    match check.check_with_remediation(host) {
        ConnectivityOutcome::Reachable => {
            println!("{} reachable", config.verify.ping_target);
            Ok(ExitCode::SUCCESS)
        }
        ConnectivityOutcome::RecoveredAfterReconnect => {
            println!("{} reachable after reconnect", config.verify.ping_target);
            Ok(ExitCode::SUCCESS)
        }
        ConnectivityOutcome::Unreachable => {
            println!("{} unreachable", config.verify.ping_target);
            Ok(ExitCode::from(1))
        }
    }
}

/// Snapshot the host and compute the plan for the configured intents.
fn compute_plan(host: &dyn NetworkHost, config: &Config) -> Result<(Inventory, ReconciliationPlan)> {
    let inv = inventory::read(host, &config.service.name)?;
    let plan = planner::plan(
        &inv,
        &config.sharing,
        &config.priority,
        config.prune_duplicate_connections,
    )?;
    Ok((inv, plan))
}
