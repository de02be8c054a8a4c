use crate::executor::{CommandExecutor, RealCommandExecutor};
use crate::{CompileJob, Engine};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texforge_core::{Document, TexEngine};

const FATAL_MARKER: &str = "Fatal error occurred";

/// Runs a TeX engine binary on the job's source file.
#[derive(Debug, Clone)]
pub struct ShellEngine {
    engine: TexEngine,
    program: PathBuf,
    biber: PathBuf,
    executor: Arc<dyn CommandExecutor>,
}

impl ShellEngine {
    pub fn new(engine: TexEngine) -> Self {
        Self {
            engine,
            program: PathBuf::from(engine.executable()),
            biber: PathBuf::from("biber"),
            executor: Arc::new(RealCommandExecutor),
        }
    }

    /// The engine selected in the document's settings.
    pub fn for_document(document: &Document) -> Self {
        Self::new(document.settings().compiler_or_default())
    }

    /// Resolves the engine on `PATH`, `None` if it is not installed.
    pub fn detect(engine: TexEngine) -> Option<Self> {
        let program = which::which(engine.executable()).ok()?;
        info!("detected {} at {:?}", engine, program);
        Some(Self {
            program,
            ..Self::new(engine)
        })
    }

    /// The first installed engine, in the order of [`TexEngine::ALL`].
    pub fn detect_any() -> Option<Self> {
        TexEngine::ALL.iter().find_map(|engine| Self::detect(*engine))
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn engine(&self) -> TexEngine {
        self.engine
    }

    fn run_pass(&self, job: &CompileJob, tex: &Path) -> Result<i32> {
        let output_dir = format!("--output-directory={}", job.output_dir.display());
        let tex = tex.to_string_lossy();
        let args = [
            output_dir.as_str(),
            "--enable-write18",
            "--interaction=nonstopmode",
            "-halt-on-error",
            &*tex,
        ];
        let output = self.executor.execute(&self.program, &args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains(FATAL_MARKER) {
            warn!("{} reported a fatal error:\n{}", self.engine, stdout);
        }
        Ok(output.status.code().unwrap_or(-1))
    }

    fn run_biber(&self, job: &CompileJob) -> Result<()> {
        let output_dir = format!("--output-directory={}", job.output_dir.display());
        let output = self
            .executor
            .execute(&self.biber, &[output_dir.as_str(), job.filename.as_str()])?;
        if !output.status.success() {
            warn!("biber exited with {:?} for {}", output.status.code(), job.filename);
        }
        Ok(())
    }

    fn clean(&self, job: &CompileJob) {
        for ext in &job.clean {
            let path = job.output_dir.join(format!("{}.{}", job.filename, ext));
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed {:?}", path),
                Err(e) => warn!("unable to remove {:?}: {}", path, e),
            }
        }
    }
}

impl Engine for ShellEngine {
    fn name(&self) -> &str {
        self.engine.executable()
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn compile(&self, job: &CompileJob) -> Result<i32> {
        fs::create_dir_all(&job.output_dir)
            .with_context(|| format!("failed to create {:?}", job.output_dir))?;
        let tex = job.tex_path();
        fs::write(&tex, &job.source).with_context(|| format!("failed to write {:?}", tex))?;

        let passes = job.repeat.max(1);
        let mut status = 0;
        for pass in 1..=passes {
            info!("{} pass {}/{} on {:?}", self.engine, pass, passes, tex);
            status = status.max(self.run_pass(job, &tex)?);
            if job.bibliography && pass < passes {
                self.run_biber(job)?;
            }
        }

        self.clean(job);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MockCommandExecutor;

    fn engine_with(mock: &Arc<MockCommandExecutor>) -> ShellEngine {
        ShellEngine::new(TexEngine::PdfLatex).with_executor(mock.clone())
    }

    #[test]
    fn test_compile_runs_every_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCommandExecutor::new());
        let job = CompileJob::new("\\documentclass{article}", dir.path(), "paper").with_repeat(3);

        let status = engine_with(&mock).compile(&job).unwrap();

        assert_eq!(status, 0);
        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(program, _)| program == Path::new("pdflatex")));
        let args = &calls[0].1;
        assert!(args[0].starts_with("--output-directory="));
        assert!(args.contains(&"-halt-on-error".to_string()));
        assert!(args.last().unwrap().ends_with("paper.tex"));
        assert_eq!(
            fs::read_to_string(dir.path().join("paper.tex")).unwrap(),
            "\\documentclass{article}"
        );
    }

    #[test]
    fn test_biber_between_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCommandExecutor::new());
        let job = CompileJob::new("", dir.path(), "paper")
            .with_repeat(2)
            .with_bibliography(true);

        engine_with(&mock).compile(&job).unwrap();

        let programs: Vec<_> = mock
            .calls()
            .into_iter()
            .map(|(program, _)| program.to_string_lossy().into_owned())
            .collect();
        assert_eq!(programs, ["pdflatex", "biber", "pdflatex"]);
    }

    #[test]
    fn test_highest_status_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(
            MockCommandExecutor::new()
                .with_status("pdflatex", 1)
                .with_stdout("! Emergency stop.\nFatal error occurred, no output PDF file produced!"),
        );
        let job = CompileJob::new("", dir.path(), "broken").with_repeat(2);
        assert_eq!(engine_with(&mock).compile(&job).unwrap(), 1);
    }

    #[test]
    fn test_zero_repeat_still_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockCommandExecutor::new());
        let job = CompileJob::new("", dir.path(), "once").with_repeat(0);
        engine_with(&mock).compile(&job).unwrap();
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_clean_removes_helper_files() {
        let dir = tempfile::tempdir().unwrap();
        for ext in ["aux", "log", "pdf"] {
            fs::write(dir.path().join(format!("paper.{}", ext)), "").unwrap();
        }
        let mock = Arc::new(MockCommandExecutor::new());
        let job = CompileJob::new("", dir.path(), "paper").with_clean(["aux", "log", "bbl"]);

        engine_with(&mock).compile(&job).unwrap();

        assert!(!dir.path().join("paper.aux").exists());
        assert!(!dir.path().join("paper.log").exists());
        assert!(dir.path().join("paper.pdf").exists());
        assert!(dir.path().join("paper.tex").exists());
    }

    #[test]
    fn test_name_and_engine() {
        let engine = ShellEngine::new(TexEngine::XeTex);
        assert_eq!(engine.name(), "xetex");
        assert_eq!(engine.engine(), TexEngine::XeTex);
    }
}
