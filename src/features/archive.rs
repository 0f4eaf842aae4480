use crate::artifact::{output_filename, Artifact};
use crate::error::HubError;
use crate::job::{Deliverable, JobSpec, ProgressStep, SimulatedWork};
use crate::validation::{require_file_count, require_single_file, FileRule, InputFile};
use std::time::Duration;

pub const ARCHIVE_WORK: SimulatedWork = SimulatedWork {
    tick: Some(Duration::from_millis(200)),
    step: ProgressStep::Fixed(10),
    ceiling: 95,
    duration: Duration::from_millis(2500),
    countdown_secs: 0,
    seed: None,
};

pub const EXTRACT_RULE: FileRule = FileRule {
    mimes: &[
        "application/zip",
        "application/x-zip-compressed",
        "application/x-7z-compressed",
        "application/vnd.rar",
        "application/x-rar-compressed",
        "application/x-tar",
        "application/gzip",
        "application/x-gzip",
    ],
    extensions: &["zip", "7z", "rar", "tar", "gz", "tgz"],
    rejection: "Unsupported file type. Please upload a .zip, .7z, .rar, .tar or .gz archive.",
};

pub fn validate_create(files: &[InputFile]) -> Result<(), HubError> {
    require_file_count(files, 1, "Please select at least one file to archive.")
}

/// Contents of the simulated archive. It is a plain text manifest.
pub fn archive_manifest(files: &[InputFile]) -> String {
    let entries: Vec<String> = files
        .iter()
        .map(|f| format!("- {} ({} bytes)", f.name, f.size()))
        .collect();
    format!(
        "This is a simulated ZIP archive containing {} files:\n\n{}",
        files.len(),
        entries.join("\n")
    )
}

pub fn build_create_job(files: &[InputFile]) -> Result<JobSpec, HubError> {
    validate_create(files)?;
    let manifest = archive_manifest(files);
    Ok(JobSpec::simulated(ARCHIVE_WORK, move || {
        Ok(Deliverable::Artifact(Artifact::new(
            manifest.into_bytes(),
            "text/plain",
            "archive.zip",
        )))
    }))
}

pub fn validate_extract(files: &[InputFile]) -> Result<(), HubError> {
    require_single_file(files, &EXTRACT_RULE, "Please select an archive to extract.").map(|_| ())
}

pub fn extraction_report(archive: &InputFile) -> String {
    let kind = archive
        .extension()
        .map(|ext| ext.to_ascii_uppercase())
        .unwrap_or_else(|| "archive".into());
    format!(
        "This is a simulated extraction of {} ({} bytes, {}).\n\n\
         Extracted entries:\n- {}/\n- {}/README.txt\n",
        archive.name,
        archive.size(),
        kind,
        stem(&archive.name),
        stem(&archive.name),
    )
}

fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

pub fn build_extract_job(files: &[InputFile]) -> Result<JobSpec, HubError> {
    let archive =
        require_single_file(files, &EXTRACT_RULE, "Please select an archive to extract.")?.clone();
    Ok(JobSpec::simulated(ARCHIVE_WORK, move || {
        let filename = output_filename(
            Some(archive.name.as_str()),
            "-contents",
            "txt",
            "extracted-contents.txt",
        );
        Ok(Deliverable::Artifact(Artifact::new(
            extraction_report(&archive).into_bytes(),
            "text/plain",
            filename,
        )))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_names_and_sizes() {
        let files = vec![
            InputFile::new("a.txt", "text/plain", vec![0; 3]),
            InputFile::new("b.png", "image/png", vec![0; 10]),
        ];
        let manifest = archive_manifest(&files);
        assert!(manifest.starts_with("This is a simulated ZIP archive containing 2 files:"));
        assert!(manifest.contains("- a.txt (3 bytes)"));
        assert!(manifest.contains("- b.png (10 bytes)"));
    }

    #[test]
    fn create_requires_a_file() {
        assert_eq!(
            validate_create(&[]).unwrap_err().to_string(),
            "Please select at least one file to archive."
        );
    }

    #[test]
    fn extract_accepts_by_extension() {
        let tgz = InputFile::new("backup.tgz", "application/octet-stream", vec![1]);
        assert!(validate_extract(&[tgz]).is_ok());
        let doc = InputFile::new("notes.docx", "application/octet-stream", vec![1]);
        assert!(validate_extract(&[doc]).is_err());
    }

    #[test]
    fn report_names_the_archive() {
        let zip = InputFile::new("photos.zip", "application/zip", vec![0; 42]);
        let report = extraction_report(&zip);
        assert!(report.contains("photos.zip (42 bytes, ZIP)"));
        assert!(report.contains("- photos/README.txt"));
    }
}
