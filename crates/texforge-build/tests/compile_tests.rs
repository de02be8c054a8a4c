use std::sync::Arc;
use texforge_build::{BuildRecord, CompileJob, Engine, MockCommandExecutor, ShellEngine};
use texforge_core::equation::Equation;
use texforge_core::{Document, TexEngine};

#[test]
fn test_document_to_compiled_job() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::new();
    doc.compiler(TexEngine::XeTex)
        .folder(&dir.path().to_string_lossy())
        .filename("notes")
        .repeat(2)
        .clean(true, &[]);
    doc.add(&Equation::new().line("e = mc^2", true)).unwrap();

    let mock = Arc::new(MockCommandExecutor::new());
    let engine = ShellEngine::for_document(&doc).with_executor(mock.clone());
    let job = CompileJob::from_document(&doc);
    std::fs::write(dir.path().join("notes.aux"), "").unwrap();

    assert_eq!(engine.name(), "xetex");
    assert_eq!(engine.compile(&job).unwrap(), 0);

    let written = std::fs::read_to_string(dir.path().join("notes.tex")).unwrap();
    assert!(written.starts_with("% !TEX program = xetex"));
    assert!(written.contains("e = mc^2"));
    assert!(!dir.path().join("notes.aux").exists());
    assert_eq!(mock.calls().len(), 2);
}

#[test]
fn test_record_skips_until_document_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::new();
    doc.folder(&dir.path().to_string_lossy()).repeat(1).line("first");

    let mock = Arc::new(MockCommandExecutor::new());
    let engine = ShellEngine::for_document(&doc).with_executor(mock.clone());
    let mut record = BuildRecord::new();

    let job = CompileJob::from_document(&doc);
    assert_eq!(record.compile_if_changed(&engine, &job).unwrap(), Some(0));
    std::fs::write(job.pdf_path(), "%PDF").unwrap();
    assert_eq!(record.compile_if_changed(&engine, &job).unwrap(), None);

    doc.line("second");
    let job = CompileJob::from_document(&doc);
    assert_eq!(record.compile_if_changed(&engine, &job).unwrap(), Some(0));
    assert_eq!(mock.calls().len(), 2);
}
