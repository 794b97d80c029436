// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two external steps of one generation attempt: compile the TypeSpec
//! into the SDK directory, then build the SDK.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sg_core::ValidationContext;
use sg_shell::{CapturedOutput, ExecError, Invocation, ProcessSpawner, DEFAULT_TIMEOUT};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_GENERATION_SCRIPT: &str =
    "eng/scripts/automation/Invoke-TypeSpecDataPlaneGenerateSDKPackage.ps1";
pub const DEFAULT_EMITTER_PACKAGE: &str = "@typespec/http-client-csharp";

const DEPENDENCY_INSTALL_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// How compile and build are invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    script: String,
    emitter_package: String,
    timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            script: DEFAULT_GENERATION_SCRIPT.to_string(),
            emitter_package: DEFAULT_EMITTER_PACKAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GenerationConfig {
    sg_core::setters! {
        into {
            script: String,
            emitter_package: String,
        }
        set {
            timeout: Duration,
        }
    }
}

/// Compile and build through a [`ProcessSpawner`].
#[derive(Clone)]
pub struct GenerationSteps<P: ProcessSpawner> {
    spawner: P,
    config: GenerationConfig,
}

impl<P: ProcessSpawner> GenerationSteps<P> {
    pub fn new(spawner: P, config: GenerationConfig) -> Self {
        Self { spawner, config }
    }

    /// Install the TypeSpec compiler and emitter globally.
    pub async fn install_dependencies(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError> {
        let invocation = Invocation::new("pwsh")
            .args(format!(
                "-Command \"npm install --global @typespec/compiler {}\"",
                self.config.emitter_package
            ))
            .cwd(std::env::temp_dir())
            .timeout(DEPENDENCY_INSTALL_TIMEOUT);
        self.spawner.execute(&invocation, cancel).await
    }

    /// Compile the TypeSpec project into the SDK directory.
    pub async fn compile(
        &self,
        context: &ValidationContext,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError> {
        let invocation = self.compile_invocation(context);
        tracing::info!(command = %invocation, "compiling TypeSpec");
        self.spawner.execute(&invocation, cancel).await
    }

    /// Build the generated SDK.
    pub async fn build(
        &self,
        context: &ValidationContext,
        cancel: &CancellationToken,
    ) -> Result<CapturedOutput, ExecError> {
        let invocation = self.build_invocation(context.sdk_dir());
        tracing::info!(command = %invocation, "building SDK");
        self.spawner.execute(&invocation, cancel).await
    }

    /// Local projects compile with the TypeSpec CLI in place; GitHub
    /// projects go through the repository's generation script.
    pub(crate) fn compile_invocation(&self, context: &ValidationContext) -> Invocation {
        let sdk_dir = context.sdk_dir();
        match (context.is_github(), context.current_typespec_dir()) {
            (false, Some(typespec_dir)) => {
                let emitter = &self.config.emitter_package;
                Invocation::new("pwsh")
                    .args(format!(
                        "-Command \"npx tsp compile . --emit {emitter} --option '{emitter}.emitter-output-dir={}'\"",
                        sdk_dir.display()
                    ))
                    .cwd(typespec_dir)
                    .timeout(self.config.timeout)
            }
            (_, typespec_dir) => {
                let script = resolve_script(sdk_dir, &self.config.script);
                let mut args = format!("-File \"{}\" -sdkFolder \"{}\"", script.display(), sdk_dir.display());
                if let Some(dir) = typespec_dir {
                    args.push_str(&format!(" -tspConfig \"{}\"", dir.join("tspconfig.yaml").display()));
                }
                Invocation::new("pwsh").args(args).cwd(sdk_dir).timeout(self.config.timeout)
            }
        }
    }

    pub(crate) fn build_invocation(&self, sdk_dir: &Path) -> Invocation {
        let args = match build_target(sdk_dir) {
            Some(target) => format!("build \"{}\"", target.display()),
            None => "build".to_string(),
        };
        Invocation::new("dotnet").args(args).cwd(sdk_dir).timeout(self.config.timeout)
    }
}

/// A relative script path is looked up from the SDK directory upwards, so
/// it resolves against the SDK repository root.
fn resolve_script(sdk_dir: &Path, script: &str) -> PathBuf {
    let script_path = Path::new(script);
    if script_path.is_absolute() {
        return script_path.to_path_buf();
    }
    sdk_dir
        .ancestors()
        .map(|dir| dir.join(script_path))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| script_path.to_path_buf())
}

/// Whether a previous generation left something to build.
pub(crate) fn has_build_target(sdk_dir: &Path) -> bool {
    build_target(sdk_dir).is_some()
}

/// First solution in the SDK directory, else the first project there or
/// under `src/`.
fn build_target(sdk_dir: &Path) -> Option<PathBuf> {
    let with_extension = |dir: &Path, ext: &str| -> Option<PathBuf> {
        let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
            .collect();
        found.sort();
        found.into_iter().next()
    };
    with_extension(sdk_dir, "sln")
        .or_else(|| with_extension(sdk_dir, "csproj"))
        .or_else(|| with_extension(&sdk_dir.join("src"), "csproj"))
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod tests;
