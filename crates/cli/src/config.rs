// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings: an optional TOML file, then `SG_*` environment variables,
//! then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sg_adapters::SessionConfig;
use sg_engine::{GenerationConfig, RepairConfig, DEFAULT_EMITTER_PACKAGE, DEFAULT_GENERATION_SCRIPT};
use thiserror::Error;

use crate::args::RepairArgs;

pub const DEFAULT_SPEC_REPOSITORY: &str = "Azure/azure-rest-api-specs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    pub agent: AgentSettings,
    pub repair: RepairSettings,
    pub generation: GenerationSettings,
    pub github: GitHubSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub run_polling_interval_secs: u64,
    pub run_max_wait_secs: u64,
    pub indexing_polling_interval_secs: u64,
    pub indexing_max_wait_secs: u64,
    pub max_concurrent_uploads: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: "gpt-4o".to_string(),
            name: "AZC Fixer".to_string(),
            instructions: String::new(),
            run_polling_interval_secs: 2,
            run_max_wait_secs: 300,
            indexing_polling_interval_secs: 5,
            indexing_max_wait_secs: 180,
            max_concurrent_uploads: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepairSettings {
    pub max_attempts: u32,
    pub process_timeout_secs: u64,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self { max_attempts: sg_engine::DEFAULT_MAX_ATTEMPTS, process_timeout_secs: 30 * 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings {
    pub powershell_script: String,
    pub emitter_package: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            powershell_script: DEFAULT_GENERATION_SCRIPT.to_string(),
            emitter_package: DEFAULT_EMITTER_PACKAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSettings {
    pub spec_repository: String,
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            spec_repository: DEFAULT_SPEC_REPOSITORY.to_string(),
            api_url: sg_adapters::github::DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl AppSettings {
    /// Defaults, overlaid by `path` when given, overlaid by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_string("SG_AGENT_ENDPOINT") {
            self.agent.endpoint = Some(v);
        }
        if let Some(v) = env_string("SG_AGENT_API_KEY") {
            self.agent.api_key = Some(v);
        }
        if let Some(v) = env_string("SG_AGENT_MODEL") {
            self.agent.model = v;
        }
        if let Some(v) = env_parsed("SG_MAX_ATTEMPTS")? {
            self.repair.max_attempts = v;
        }
        if let Some(v) = env_parsed("SG_PROCESS_TIMEOUT_SECS")? {
            self.repair.process_timeout_secs = v;
        }
        if let Some(v) = env_string("SG_GENERATION_SCRIPT") {
            self.generation.powershell_script = v;
        }
        if let Some(v) = env_string("SG_SPEC_REPOSITORY") {
            self.github.spec_repository = v;
        }
        if let Some(v) = env_string("SG_GITHUB_TOKEN").or_else(|| env_string("GITHUB_TOKEN")) {
            self.github.token = Some(v);
        }
        Ok(())
    }

    /// Flags win over file and environment.
    pub fn apply_args(&mut self, args: &RepairArgs) {
        if let Some(max_attempts) = args.max_attempts {
            self.repair.max_attempts = max_attempts;
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let agent = &self.agent;
        SessionConfig::default()
            .model(agent.model.as_str())
            .name(agent.name.as_str())
            .instructions(agent.instructions.as_str())
            .run_polling_interval(Duration::from_secs(agent.run_polling_interval_secs))
            .run_max_wait(Duration::from_secs(agent.run_max_wait_secs))
            .indexing_polling_interval(Duration::from_secs(agent.indexing_polling_interval_secs))
            .indexing_max_wait(Duration::from_secs(agent.indexing_max_wait_secs))
            .max_concurrent_uploads(agent.max_concurrent_uploads.max(1))
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::default()
            .script(self.generation.powershell_script.as_str())
            .emitter_package(self.generation.emitter_package.as_str())
            .timeout(Duration::from_secs(self.repair.process_timeout_secs))
    }

    pub fn repair_config(&self) -> RepairConfig {
        RepairConfig::default().max_attempts(self.repair.max_attempts.max(1))
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidEnv { name, value }),
        },
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
