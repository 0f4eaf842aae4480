use crate::ai::TextService;
use crate::error::HubError;
use crate::job::{Deliverable, JobSpec, RemoteCall};
use crate::validation::{require_single_file, require_text, FileRule, InputFile};
use std::sync::Arc;

pub const SUMMARY_EMPTY: &str = "Please enter some text to summarize.";
pub const TRANSLATION_EMPTY: &str = "Please enter some text to translate.";
pub const AUDIO_MISSING: &str = "Please select an audio file to transcribe.";

pub const AUDIO_RULE: FileRule = FileRule {
    mimes: &["audio/*"],
    extensions: &[],
    rejection: "Please select a valid audio file.",
};

pub const TEXT_FILE_RULE: FileRule = FileRule {
    mimes: &["text/plain"],
    extensions: &[],
    rejection: "Unsupported file type. Please upload a .txt file.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Japanese,
    ChineseSimplified,
    Russian,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::ChineseSimplified,
        Language::Russian,
        Language::Hindi,
    ];

    /// Also the name sent to the model.
    pub fn label(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Japanese => "Japanese",
            Language::ChineseSimplified => "Chinese (Simplified)",
            Language::Russian => "Russian",
            Language::Hindi => "Hindi",
        }
    }

    pub fn from_label(label: &str) -> Option<Language> {
        let label = label.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.label().eq_ignore_ascii_case(label))
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn text_job(call: RemoteCall) -> JobSpec {
    JobSpec::remote(call, |text| Ok(Deliverable::Text(text)))
}

pub fn validate_summary(text: &str) -> Result<(), HubError> {
    require_text(text, SUMMARY_EMPTY).map(|_| ())
}

pub fn build_summary_job(text: &str, service: Arc<dyn TextService>) -> Result<JobSpec, HubError> {
    validate_summary(text)?;
    let text = text.to_string();
    Ok(text_job(Box::pin(async move {
        service.summarize(&text).await.map_err(HubError::from)
    })))
}

pub fn validate_translation(text: &str) -> Result<(), HubError> {
    require_text(text, TRANSLATION_EMPTY).map(|_| ())
}

pub fn build_translation_job(
    text: &str,
    source: Language,
    target: Language,
    service: Arc<dyn TextService>,
) -> Result<JobSpec, HubError> {
    validate_translation(text)?;
    let text = text.to_string();
    Ok(text_job(Box::pin(async move {
        service
            .translate(&text, source.label(), target.label())
            .await
            .map_err(HubError::from)
    })))
}

pub fn validate_transcription(files: &[InputFile]) -> Result<(), HubError> {
    require_single_file(files, &AUDIO_RULE, AUDIO_MISSING).map(|_| ())
}

pub fn build_transcription_job(
    files: &[InputFile],
    service: Arc<dyn TextService>,
) -> Result<JobSpec, HubError> {
    let audio = require_single_file(files, &AUDIO_RULE, AUDIO_MISSING)?;
    let bytes = audio.bytes.clone();
    let mime = audio.effective_mime();
    Ok(text_job(Box::pin(async move {
        service.transcribe(&bytes, &mime).await.map_err(HubError::from)
    })))
}

/// Text loaded from an uploaded `.txt` file.
pub fn read_text_file(file: &InputFile) -> Result<String, HubError> {
    TEXT_FILE_RULE.check(file)?;
    String::from_utf8(file.bytes.clone())
        .map_err(|_| HubError::resource("An error occurred while reading the file."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_round_trip_through_labels() {
        for lang in Language::ALL {
            assert_eq!(Language::from_label(lang.label()), Some(lang));
        }
        assert_eq!(
            Language::from_label("chinese (simplified)"),
            Some(Language::ChineseSimplified)
        );
        assert_eq!(Language::from_label("Klingon"), None);
    }

    #[test]
    fn word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one\ttwo \n three "), 3);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn summary_requires_text() {
        assert_eq!(
            validate_summary(" ").unwrap_err(),
            HubError::validation(SUMMARY_EMPTY)
        );
    }

    #[test]
    fn transcription_requires_audio() {
        let video = InputFile::new("clip.mp4", "video/mp4", vec![1]);
        assert_eq!(
            validate_transcription(&[video]).unwrap_err().to_string(),
            "Please select a valid audio file."
        );
        assert_eq!(
            validate_transcription(&[]).unwrap_err().to_string(),
            AUDIO_MISSING
        );
    }

    #[test]
    fn text_file_must_be_plain_utf8() {
        let ok = InputFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(read_text_file(&ok).unwrap(), "hello");

        let md = InputFile::new("notes.md", "text/markdown", b"# hi".to_vec());
        assert_eq!(read_text_file(&md).unwrap_err().kind(), "validation_error");

        let broken = InputFile::new("bad.txt", "text/plain", vec![0xFF, 0xFE, 0x00]);
        assert_eq!(read_text_file(&broken).unwrap_err().kind(), "resource_error");
    }
}
