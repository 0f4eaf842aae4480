use crate::artifact::Artifact;
use crate::error::HubError;
use crate::job::{Deliverable, JobSpec, ProgressStep, SimulatedWork};
use crate::validation::{require_file_count, require_text, FileRule, InputFile};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::time::Duration;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 15;
const WRAP_COLUMNS: usize = 90;

pub const MERGE_RULE: FileRule = FileRule {
    mimes: &["application/pdf"],
    extensions: &[],
    rejection: "Some files were not PDFs and were ignored.",
};

pub const MERGE_WORK: SimulatedWork = SimulatedWork {
    tick: Some(Duration::from_millis(200)),
    step: ProgressStep::Fixed(10),
    ceiling: 95,
    duration: Duration::from_millis(2500),
    countdown_secs: 0,
    seed: None,
};

/// Greedy word wrap; words longer than a line are hard-split.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(columns);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > columns && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    lines
}

/// Standard fonts only cover Latin-1.
fn latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(latin1(line), StringFormat::Literal)],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Lay out lines on as many A4 pages as needed.
pub fn lines_to_pdf(lines: &[String]) -> Result<Vec<u8>, String> {
    let per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let empty = [String::new()];
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&empty[..]]
    } else {
        lines.chunks(per_page.max(1)).collect()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let encoded = page_content(chunk)
            .encode()
            .map_err(|e| format!("pdf_content_failed:{e}"))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| format!("pdf_save_failed:{e}"))?;
    Ok(buf)
}

pub fn text_to_pdf(text: &str) -> Result<Vec<u8>, String> {
    lines_to_pdf(&wrap_text(text, WRAP_COLUMNS))
}

fn pdf_error(code: String) -> HubError {
    log::warn!("pdf generation failed: {code}");
    HubError::resource("An error occurred while generating the PDF.")
}

// Text to PDF

pub fn validate_text(text: &str) -> Result<(), HubError> {
    require_text(text, "Please enter some text to convert.").map(|_| ())
}

pub fn build_text_job(text: &str) -> Result<JobSpec, HubError> {
    validate_text(text)?;
    let text = text.to_string();
    Ok(JobSpec::simulated(SimulatedWork::immediate(), move || {
        let bytes = text_to_pdf(&text).map_err(pdf_error)?;
        Ok(Deliverable::Artifact(Artifact::new(
            bytes,
            "application/pdf",
            "converted-text.pdf",
        )))
    }))
}

// PDF merge

/// Keeps only PDFs. Returns the notice to show when something was dropped.
pub fn accept_merge_files(current: &mut Vec<InputFile>, incoming: Vec<InputFile>) -> Option<String> {
    let offered = incoming.len();
    let accepted: Vec<InputFile> = incoming
        .into_iter()
        .filter(|f| MERGE_RULE.accepts(f))
        .collect();
    let dropped = offered - accepted.len();
    current.extend(accepted);
    (dropped > 0).then(|| MERGE_RULE.rejection.to_string())
}

pub fn validate_merge(files: &[InputFile]) -> Result<(), HubError> {
    require_file_count(files, 2, "Please select at least two PDF files to merge.")
}

pub fn merge_listing(files: &[InputFile]) -> Vec<String> {
    let mut lines = vec![
        format!("This is a simulated merged PDF containing {} files:", files.len()),
        String::new(),
    ];
    lines.extend(files.iter().map(|f| f.name.clone()));
    lines
}

pub fn build_merge_job(files: &[InputFile]) -> Result<JobSpec, HubError> {
    validate_merge(files)?;
    let lines = merge_listing(files);
    Ok(JobSpec::simulated(MERGE_WORK, move || {
        let bytes = lines_to_pdf(&lines).map_err(pdf_error)?;
        Ok(Deliverable::Artifact(Artifact::new(
            bytes,
            "application/pdf",
            "merged.pdf",
        )))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> InputFile {
        InputFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
    }

    #[test]
    fn wrap_respects_width_and_blank_lines() {
        let lines = wrap_text("one two three four\n\nfive", 9);
        assert_eq!(lines, vec!["one two", "three", "four", "", "five"]);
        let long = wrap_text("abcdefghij", 4);
        assert_eq!(long, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn generated_pdf_parses_with_expected_pages() {
        let text = (0..120).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let bytes = text_to_pdf(&text).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn non_latin_text_still_renders() {
        let bytes = text_to_pdf("héllo 世界").unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn blank_text_is_rejected() {
        let err = validate_text("  \n ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter some text to convert.");
    }

    #[test]
    fn merge_filters_non_pdfs_with_notice() {
        let mut files = vec![pdf("a.pdf")];
        let notice = accept_merge_files(
            &mut files,
            vec![pdf("b.pdf"), InputFile::new("c.png", "image/png", vec![1])],
        );
        assert_eq!(files.len(), 2);
        assert_eq!(notice.as_deref(), Some("Some files were not PDFs and were ignored."));
        assert!(accept_merge_files(&mut files, vec![pdf("d.pdf")]).is_none());
    }

    #[test]
    fn merge_needs_two_files() {
        assert!(validate_merge(&[pdf("a.pdf")]).is_err());
        assert!(validate_merge(&[pdf("a.pdf"), pdf("b.pdf")]).is_ok());
    }

    #[test]
    fn listing_names_every_input() {
        let lines = merge_listing(&[pdf("a.pdf"), pdf("b.pdf")]);
        assert_eq!(lines[0], "This is a simulated merged PDF containing 2 files:");
        assert_eq!(&lines[2..], &["a.pdf".to_string(), "b.pdf".to_string()]);
    }
}
