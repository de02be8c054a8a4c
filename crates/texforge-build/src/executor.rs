//! Process execution behind a trait, so engines can be driven without a TeX
//! installation.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;

pub trait CommandExecutor: Send + Sync + std::fmt::Debug {
    /// Runs `program` with `args` and waits for it to finish.
    fn execute(&self, program: &Path, args: &[&str]) -> Result<Output>;
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Default)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, program: &Path, args: &[&str]) -> Result<Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| anyhow!("failed to execute {}: {}", program.display(), e))
    }
}

/// Records every invocation and answers with a fixed exit status per program.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    /// Exit codes keyed by program name; unknown programs succeed.
    pub status_codes: Vec<(String, i32)>,
    pub stdout: String,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, program: &str, code: i32) -> Self {
        self.status_codes.push((program.to_string(), code));
        self
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    /// The invocations seen so far, in order.
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn status_for(&self, program: &Path) -> i32 {
        let name = program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.status_codes
            .iter()
            .rev()
            .find(|(p, _)| *p == name)
            .map_or(0, |(_, code)| *code)
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, program: &Path, args: &[&str]) -> Result<Output> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((
                program.to_path_buf(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
        }
        let code = self.status_for(program);

        #[cfg(unix)]
        let status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code << 8)
        };
        #[cfg(windows)]
        let status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(code as u32)
        };

        Ok(Output {
            status,
            stdout: self.stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }
}
