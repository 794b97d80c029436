// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("SG_BUILD_HASH"));

/// Compile a TypeSpec project into an SDK, build it, and repair the
/// TypeSpec until both succeed.
#[derive(Debug, Parser)]
#[command(
    name = "sg",
    version = VERSION,
    styles = crate::color::styles(),
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// TOML settings file
    #[arg(long, global = true, value_name = "FILE", env = "SG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub repair: RepairArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the inputs and print the resolved run context
    Validate(InputArgs),
}

/// The three run inputs. Blank values are reported by validation rather
/// than by argument parsing.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Local TypeSpec project directory, or a path inside the spec
    /// repository when --commit-id is given
    #[arg(long, value_name = "DIR")]
    pub typespec_dir: Option<String>,

    /// Spec repository commit to fetch the TypeSpec files from
    #[arg(long, value_name = "SHA")]
    pub commit_id: Option<String>,

    /// SDK output directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

impl InputArgs {
    pub fn is_empty(&self) -> bool {
        self.typespec_dir.is_none() && self.commit_id.is_none() && self.output_dir.is_none()
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct RepairArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Compile/build attempts before giving up
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
