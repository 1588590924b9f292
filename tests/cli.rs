mod common;

use assert_cmd::Command;
use common::{image_stream, text_pdf, write_pdf, FixturePage};
use pdf_slurp::pdf::text::extract_pages;
use pdf_slurp::pdf::PdfDocument;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn pdf_slurp() -> Command {
    Command::cargo_bin("pdf-slurp").unwrap()
}

fn page_texts(path: &std::path::Path, pages: &[u32]) -> Vec<String> {
    let doc = PdfDocument::open(path).unwrap();
    extract_pages(&doc, pages, &mut std::io::sink())
        .unwrap()
        .into_iter()
        .map(|p| p.text)
        .collect()
}

#[test]
fn test_all_pages_prints_unmarked_concatenation() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "three.pdf", 3);
    let expected = page_texts(&path, &[1, 2, 3]).concat();

    let output = pdf_slurp().arg(&path).arg("--all-pages").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, expected);
    assert!(!stdout.contains("Content of page"));
}

#[test]
fn test_single_page_has_header_and_blank_line() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "three.pdf", 3);
    let page_two = page_texts(&path, &[2]).concat();

    let output = pdf_slurp().arg(&path).args(["--pages", "2"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, format!("Content of page 2:\n{}\n\n", page_two));
    assert!(stdout.contains("Sample text on page 2"));
}

#[test]
fn test_missing_pages_go_to_stderr() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "five.pdf", 5);

    pdf_slurp()
        .arg(&path)
        .args(["-p", "6,4-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Content of page 4:\n"))
        .stdout(predicate::str::contains("Content of page 5:\n"))
        .stdout(predicate::str::contains("Content of page 6").not())
        .stderr(predicate::str::contains("Page 6 not found in the PDF.\n"));
}

#[test]
fn test_image_written_as_png() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(
        dir.path(),
        "image.pdf",
        vec![FixturePage::images(vec![image_stream(
            "DeviceRGB",
            1,
            2,
            vec![0, 0, 0, 250, 100, 50],
        )])],
    );

    let output = pdf_slurp()
        .arg(&path)
        .args(["-p", "1", "-i", "1", "-v"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let image = image::load_from_memory_with_format(&output.stdout, image::ImageFormat::Png)
        .unwrap()
        .to_rgb8();
    assert_eq!(image.into_raw(), vec![255, 255, 255, 5, 155, 205]);
}

#[test]
fn test_missing_image_reported_once() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "text.pdf", 1);

    let output = pdf_slurp()
        .arg(&path)
        .args(["--pages", "1", "--image", "3"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("Image 3 not found on page 1.").count(), 1);
}

#[test]
fn test_invalid_selector_fails() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "text.pdf", 1);

    pdf_slurp()
        .arg(&path)
        .args(["--pages", "1,two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid page selector"));
}

#[test]
fn test_missing_document_fails() {
    let dir = TempDir::new().unwrap();

    pdf_slurp()
        .arg(dir.path().join("absent.pdf"))
        .arg("--all-pages")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open PDF"));
}

#[test]
fn test_no_request_fails() {
    let dir = TempDir::new().unwrap();
    let path = text_pdf(dir.path(), "text.pdf", 1);

    pdf_slurp()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to extract"));
}
