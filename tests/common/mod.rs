//! Shared helpers for the integration suite.
//!
//! [`TestProject`] lays out the sample project from
//! `doc_mgmt_deploy::test_utils::fixtures` in a temporary directory and runs
//! the binary against it with a controlled environment.

#![allow(dead_code)]

use anyhow::{Context, Result};
use doc_mgmt_deploy::secrets::SECRET_KEYS;
use doc_mgmt_deploy::test_utils::fixtures::{self, ProjectFixture};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Environment variables the binary reads; always cleared for the child.
const CONTROLLED_ENV: [&str; 8] = [
    "DEPLOY_STACK",
    "AWS_ACCOUNT_ID",
    "AWS_REGION",
    "IMAGE_TAG",
    "DEPLOY_REFERENCES_DIR",
    "DEPLOY_INVENTORY",
    "DEPLOY_SECRETS_PREFIX",
    "RUST_LOG",
];

/// Temporary project directory plus the environment to run the binary with.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl TestProject {
    /// Sample project on disk with every secret set.
    pub fn new() -> Result<Self> {
        let mut project = Self::empty()?;
        ProjectFixture::sample().write_to(&project.project_dir)?;
        for key in SECRET_KEYS {
            project.set_env(key, &fixtures::secret_value(key));
        }
        Ok(project)
    }

    /// Empty project directory and no secrets.
    pub fn empty() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("deploy");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            env: BTreeMap::new(),
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Set an environment variable for every run.
    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Stop passing `key` to the binary.
    pub fn unset_env(&mut self, key: &str) -> &mut Self {
        self.env.remove(key);
        self
    }

    /// Overwrite `deploy.toml`.
    pub fn write_manifest(&self, content: &str) -> Result<()> {
        let manifest_path = self.project_dir.join("deploy.toml");
        fs::write(&manifest_path, content)
            .with_context(|| format!("Failed to write manifest to {}", manifest_path.display()))
    }

    /// Path of the exported outputs file for `stack`.
    pub fn outputs_file(&self, stack: &str) -> PathBuf {
        self.project_dir
            .join(".stack-outputs")
            .join(fixtures::ORG)
            .join(format!("{}-infra", fixtures::PROJECT))
            .join(format!("{stack}.json"))
    }

    /// Remove one output key from the exported outputs of `stack`.
    pub fn remove_output(&self, stack: &str, key: &str) -> Result<()> {
        let path = self.outputs_file(stack);
        let mut outputs: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&path)?)?;
        outputs.remove(key);
        fs::write(&path, serde_json::to_string_pretty(&outputs)?)?;
        Ok(())
    }

    /// A command for the binary, in the project directory, with the controlled env.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("doc-mgmt-deploy")
            .expect("binary is built for integration tests");
        cmd.current_dir(&self.project_dir).env("NO_COLOR", "1");
        for key in CONTROLLED_ENV.iter().chain(SECRET_KEYS.iter()) {
            cmd.env_remove(key);
        }
        cmd.envs(&self.env);
        cmd
    }

    /// Run the binary and capture its output.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_doc-mgmt-deploy");
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .current_dir(&self.project_dir)
            .env("NO_COLOR", "1");
        for key in CONTROLLED_ENV.iter().chain(SECRET_KEYS.iter()) {
            cmd.env_remove(key);
        }
        let output = cmd
            .envs(&self.env)
            .output()
            .context("Failed to run doc-mgmt-deploy")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "Command unexpectedly succeeded\nStdout: {}",
            self.stdout
        );
        assert_eq!(self.code, Some(1), "Stderr: {}", self.stderr);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}
