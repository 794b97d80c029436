// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the `sg` specs.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use assert_cmd::Command;
use tempfile::TempDir;

/// The `sg` binary, built once per test run into this test's own target
/// profile. It belongs to another package, so cargo does not hand its path
/// to these specs.
static SG_BIN: LazyLock<PathBuf> = LazyLock::new(|| {
    let exe = std::env::current_exe().unwrap();
    // <target>/<profile>/deps/specs-<hash>
    let profile_dir = exe.parent().and_then(Path::parent).unwrap().to_path_buf();
    let target_dir = profile_dir.parent().unwrap();
    let profile = match profile_dir.file_name().and_then(|n| n.to_str()).unwrap() {
        "debug" => "dev",
        other => other,
    };

    let status = std::process::Command::new(env!("CARGO"))
        .args(["build", "--quiet", "--package", "sg", "--bin", "sg", "--profile", profile])
        .arg("--target-dir")
        .arg(target_dir)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .status()
        .unwrap();
    assert!(status.success(), "building sg failed: {status}");

    profile_dir.join(format!("sg{}", std::env::consts::EXE_SUFFIX))
});

/// Variables that would leak the developer's setup into a spec.
const SCRUBBED_ENV: &[&str] = &[
    "SG_CONFIG",
    "SG_LOG",
    "RUST_LOG",
    "SG_AGENT_ENDPOINT",
    "SG_AGENT_API_KEY",
    "SG_AGENT_MODEL",
    "SG_MAX_ATTEMPTS",
    "SG_PROCESS_TIMEOUT_SECS",
    "SG_GENERATION_SCRIPT",
    "SG_SPEC_REPOSITORY",
    "SG_GITHUB_TOKEN",
    "GITHUB_TOKEN",
];

/// `sg` with a scrubbed environment.
pub fn cli() -> Cli {
    let mut cmd = Command::new(&*SG_BIN);
    for name in SCRUBBED_ENV {
        cmd.env_remove(name);
    }
    cmd.env("NO_COLOR", "1");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(self) -> Output {
        self.exits(0)
    }

    pub fn exits(mut self, code: i32) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        assert_eq!(out.code, Some(code), "unexpected exit status\n{out}");
        out
    }
}

pub struct Output {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout is missing {needle:?}\n{self}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout unexpectedly has {needle:?}\n{self}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr is missing {needle:?}\n{self}");
        self
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exit: {:?}\n--- stdout\n{}--- stderr\n{}", self.code, self.stdout, self.stderr)
    }
}

/// A scratch TypeSpec project plus an SDK output directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("spec")).unwrap();
        std::fs::create_dir_all(dir.path().join("sdk")).unwrap();
        Self { dir }
    }

    /// A project with a `main.tsp`.
    pub fn typespec() -> Self {
        let project = Self::empty();
        project.file("spec/main.tsp", "import \"@typespec/http\";\n");
        project
    }

    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn spec_dir(&self) -> String {
        self.path().join("spec").display().to_string()
    }

    pub fn sdk_dir(&self) -> String {
        self.path().join("sdk").display().to_string()
    }
}
