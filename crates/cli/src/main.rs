// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `sg`: compile, build and repair TypeSpec-generated SDKs.

mod args;
mod color;
mod config;
mod exit_error;
mod run;

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};
use crate::config::AppSettings;
use crate::exit_error::{exit_code, ExitError};

const DEFAULT_LOG_FILTER: &str = "sg=info,sg_engine=info,sg_adapters=info,sg_shell=info,sg_core=info";

/// `SG_LOG`, then `RUST_LOG`, then [`DEFAULT_LOG_FILTER`]. Logs go to
/// stderr so stdout carries only results.
fn init_tracing() {
    let filter = std::env::var("SG_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(color::should_colorize(std::io::stderr().is_terminal()))
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<()> {
    match cli.command {
        Some(Command::Validate(input)) => run::validate(&input),
        None if cli.repair.input.is_empty() => {
            Cli::command().print_help()?;
            Ok(())
        }
        None => {
            let mut settings = AppSettings::load(cli.config.as_deref())
                .map_err(|e| ExitError::invalid_input(e.to_string()))?;
            settings.apply_args(&cli.repair);
            run::repair(&cli.repair, &settings, cancel).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match dispatch(cli, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            eprintln!("error: {err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
