use rustydigest::extraction::{
    ExtractionError, PlainTextExtractor, TextExtractor, collect_documents,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn text_files_are_read_with_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Notes.TXT");
    fs::write(&path, "Solar output rose in spring.").unwrap();

    let document = PlainTextExtractor::default().extract(&path).unwrap();
    assert_eq!(document.raw_text, "Solar output rose in spring.");
    assert_eq!(document.info.filename, "Notes.TXT");
    assert_eq!(document.info.extension, ".txt");
    assert_eq!(document.info.size, 28);
}

#[test]
fn invalid_utf8_is_replaced_not_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.md");
    fs::write(&path, b"caf\xff ok").unwrap();

    let document = PlainTextExtractor::default().extract(&path).unwrap();
    assert_eq!(document.raw_text, "caf\u{fffd} ok");
}

#[test]
fn csv_files_are_rendered_as_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("output.csv");
    fs::write(&path, "region,mwh\nnorth,120\n").unwrap();

    let document = PlainTextExtractor::default().extract(&path).unwrap();
    assert!(document.raw_text.starts_with("CSV Data from output.csv:\nColumns: region, mwh\n"));
    assert!(document.raw_text.contains("north  120"));
}

#[test]
fn binary_formats_and_large_files_are_rejected() {
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("paper.pdf");
    fs::write(&pdf, b"%PDF-1.7").unwrap();
    let big = dir.path().join("big.txt");
    fs::write(&big, "x".repeat(64)).unwrap();

    let extractor = PlainTextExtractor::new(32);
    assert!(matches!(
        extractor.extract(&pdf),
        Err(ExtractionError::UnsupportedFormat { extension, .. }) if extension == ".pdf"
    ));
    assert!(matches!(
        extractor.extract(&big),
        Err(ExtractionError::TooLarge { size: 64, limit: 32, .. })
    ));
    assert!(matches!(
        extractor.extract(&dir.path().join("missing.txt")),
        Err(ExtractionError::Io { .. })
    ));
}

#[test]
fn collect_documents_skips_failures_and_keeps_order() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("b.txt");
    let blank = dir.path().join("blank.txt");
    let binary = dir.path().join("slides.pptx");
    let second = dir.path().join("a.txt");
    fs::write(&first, "First document.").unwrap();
    fs::write(&blank, " \n ").unwrap();
    fs::write(&binary, b"PK").unwrap();
    fs::write(&second, "Second document.").unwrap();

    let documents = collect_documents(
        &PlainTextExtractor::default(),
        &[&first, &blank, &binary, &dir.path().join("gone.txt"), &second],
    );
    let names: Vec<&str> = documents.iter().map(|doc| doc.info.filename.as_str()).collect();
    assert_eq!(names, vec!["b.txt", "a.txt"]);
}
