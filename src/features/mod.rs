pub mod ai_tools;
pub mod archive;
pub mod auth;
pub mod coming_soon;
pub mod converters;
pub mod image_tools;
pub mod job_view;
pub mod navigation;
pub mod online_media;
pub mod pdf;
pub mod text_to_speech;
pub mod web_capture;

use crate::ai::TextService;
use crate::artifact::ArtifactStore;
use crate::error::HubError;
use crate::job::JobSpec;
use crate::registry::{ToolKey, ToolRegistry, CATEGORIES, DEFAULT_TOOL};
use crate::state::{ToolInputs, ToolSession};
use crate::ui::{heading, node, Button, Card, Select, SelectOption, Text, TextInput};
use crate::validation::{require_text, FileRule, InputFile};
use ai_tools::Language;
use converters::ConverterProfile;
use online_media::AspectRatio;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use web_capture::CaptureFormat;

/// Concrete handler behind an implemented tool key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Summarizer,
    Translator,
    SpeechToText,
    TextToSpeech,
    Converter(&'static ConverterProfile),
    PdfMerge,
    TextToPdf,
    WebCapture(CaptureFormat),
    CreateArchive,
    ExtractArchive,
    YouTubeShorts,
    SpotifyDownload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    None,
    Single,
    Multiple,
}

/// Button and status copy for the job area.
#[derive(Debug, Clone, Copy)]
pub struct JobLabels {
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
    pub busy: &'static str,
    pub success: &'static str,
    pub download: &'static str,
}

pub fn handler_for(key: ToolKey) -> Option<HandlerKind> {
    use ToolKey::*;
    match key {
        Summarizer => Some(HandlerKind::Summarizer),
        Translator => Some(HandlerKind::Translator),
        SpeechToText => Some(HandlerKind::SpeechToText),
        TextToSpeech => Some(HandlerKind::TextToSpeech),
        Mp4ToMp3 | Mp3ToMp4 | PngToJpg | WebpToPng | WordToPdf | CompressPdf | CompressPng
        | CompressJpg | PdfOcr => converters::profile_for(key).map(HandlerKind::Converter),
        PdfMerge => Some(HandlerKind::PdfMerge),
        TextToPdf => Some(HandlerKind::TextToPdf),
        WebsiteToPdf => Some(HandlerKind::WebCapture(CaptureFormat::Pdf)),
        WebsiteToPng => Some(HandlerKind::WebCapture(CaptureFormat::Png)),
        WebsiteToJpg => Some(HandlerKind::WebCapture(CaptureFormat::Jpg)),
        CreateArchive => Some(HandlerKind::CreateArchive),
        ExtractArchive => Some(HandlerKind::ExtractArchive),
        YoutubeToShorts => Some(HandlerKind::YouTubeShorts),
        SpotifyDownloader => Some(HandlerKind::SpotifyDownload),
        ArchiveConverter | AudioConverter | CadConverter | DocumentConverter | EbookConverter
        | FontConverter | ImageConverter | PresentationConverter | SpreadsheetConverter
        | VectorConverter | VideoConverter => None,
    }
}

/// Process-wide registry, built on first use.
pub fn registry() -> &'static ToolRegistry<HandlerKind> {
    static REGISTRY: OnceLock<ToolRegistry<HandlerKind>> = OnceLock::new();
    REGISTRY.get_or_init(|| ToolRegistry::build(CATEGORIES, DEFAULT_TOOL, handler_for))
}

impl HandlerKind {
    pub fn file_mode(self) -> FileMode {
        match self {
            HandlerKind::Summarizer
            | HandlerKind::SpeechToText
            | HandlerKind::Converter(_)
            | HandlerKind::ExtractArchive => FileMode::Single,
            HandlerKind::PdfMerge | HandlerKind::CreateArchive => FileMode::Multiple,
            _ => FileMode::None,
        }
    }

    pub fn file_rule(self) -> Option<&'static FileRule> {
        match self {
            HandlerKind::Summarizer => Some(&ai_tools::TEXT_FILE_RULE),
            HandlerKind::SpeechToText => Some(&ai_tools::AUDIO_RULE),
            HandlerKind::Converter(profile) => Some(&profile.rule),
            HandlerKind::PdfMerge => Some(&pdf::MERGE_RULE),
            HandlerKind::ExtractArchive => Some(&archive::EXTRACT_RULE),
            _ => None,
        }
    }

    /// Network-bound work reports no incremental progress.
    pub fn is_remote(self) -> bool {
        matches!(
            self,
            HandlerKind::Summarizer | HandlerKind::Translator | HandlerKind::SpeechToText
        )
    }

    pub fn labels(self) -> JobLabels {
        match self {
            HandlerKind::Summarizer => JobLabels {
                title: "AI Text Summarizer",
                description: "Paste your text or upload a .txt file to get a concise summary.",
                action: "Summarize",
                busy: "Summarizing...",
                success: "Summary",
                download: "",
            },
            HandlerKind::Translator => JobLabels {
                title: "AI Translator",
                description: "Translate text between languages.",
                action: "Translate",
                busy: "Translating...",
                success: "Translation",
                download: "",
            },
            HandlerKind::SpeechToText => JobLabels {
                title: "Speech to Text",
                description: "Upload an audio file to transcribe it into text.",
                action: "Transcribe",
                busy: "Transcribing...",
                success: "Transcription",
                download: "",
            },
            HandlerKind::TextToSpeech => JobLabels {
                title: "Text to Speech",
                description: "Type some text and listen to it with your device's voices.",
                action: "Speak",
                busy: "Speaking...",
                success: "",
                download: "",
            },
            HandlerKind::Converter(profile) => JobLabels {
                title: profile.title,
                description: profile.description,
                action: profile.action_label,
                busy: profile.busy_label,
                success: profile.success_label,
                download: profile.download_label,
            },
            HandlerKind::PdfMerge => JobLabels {
                title: "Merge PDF",
                description: "Combine multiple PDF files into a single document.",
                action: "Merge PDFs",
                busy: "Merging...",
                success: "Merge Complete!",
                download: "Download Merged PDF",
            },
            HandlerKind::TextToPdf => JobLabels {
                title: "Text to PDF",
                description: "Turn plain text into a PDF document.",
                action: "Convert to PDF",
                busy: "Converting...",
                success: "Conversion Successful!",
                download: "Download PDF",
            },
            HandlerKind::WebCapture(format) => JobLabels {
                title: format.title(),
                description: format.description(),
                action: format.action_label(),
                busy: "Capturing website...",
                success: "Capture Complete!",
                download: format.download_label(),
            },
            HandlerKind::CreateArchive => JobLabels {
                title: "Create Archive",
                description: "Bundle several files into a single ZIP archive.",
                action: "Create Archive",
                busy: "Archiving...",
                success: "Archive Ready!",
                download: "Download Archive",
            },
            HandlerKind::ExtractArchive => JobLabels {
                title: "Extract Archive",
                description: "Look inside ZIP, 7Z, RAR and TAR archives.",
                action: "Extract Files",
                busy: "Extracting...",
                success: "Extraction Complete!",
                download: "Download Contents",
            },
            HandlerKind::YouTubeShorts => JobLabels {
                title: "YouTube to Shorts",
                description: "Turn a long YouTube video into short clips.",
                action: "Generate Shorts",
                busy: "Generating shorts...",
                success: "Your shorts are ready!",
                download: "Download",
            },
            HandlerKind::SpotifyDownload => JobLabels {
                title: "Spotify Downloader",
                description: "Fetch a Spotify track or playlist.",
                action: "Fetch",
                busy: "Fetching...",
                success: "Ready to download",
                download: "Download",
            },
        }
    }
}

/// Synchronous pre-flight check run while the job is `Validating`.
pub fn validate(kind: HandlerKind, inputs: &ToolInputs) -> Result<(), HubError> {
    match kind {
        HandlerKind::Summarizer => ai_tools::validate_summary(&inputs.text),
        HandlerKind::Translator => ai_tools::validate_translation(&inputs.text),
        HandlerKind::SpeechToText => ai_tools::validate_transcription(&inputs.files),
        HandlerKind::TextToSpeech => {
            require_text(&inputs.text, text_to_speech::SPEAK_EMPTY).map(|_| ())
        }
        HandlerKind::Converter(profile) => converters::validate(profile, &inputs.files),
        HandlerKind::PdfMerge => pdf::validate_merge(&inputs.files),
        HandlerKind::TextToPdf => pdf::validate_text(&inputs.text),
        HandlerKind::WebCapture(_) => web_capture::validate(&inputs.url),
        HandlerKind::CreateArchive => archive::validate_create(&inputs.files),
        HandlerKind::ExtractArchive => archive::validate_extract(&inputs.files),
        HandlerKind::YouTubeShorts => online_media::validate_youtube(&inputs.url),
        HandlerKind::SpotifyDownload => online_media::validate_spotify(&inputs.url),
    }
}

/// What `start` does with a validated form.
pub enum Launch {
    Job(JobSpec),
    /// Playback belongs to the host speech engine.
    Speak,
}

pub fn build_job(
    kind: HandlerKind,
    inputs: &ToolInputs,
    service: &Arc<dyn TextService>,
) -> Result<Launch, HubError> {
    let spec = match kind {
        HandlerKind::Summarizer => ai_tools::build_summary_job(&inputs.text, Arc::clone(service)),
        HandlerKind::Translator => ai_tools::build_translation_job(
            &inputs.text,
            inputs.source_lang,
            inputs.target_lang,
            Arc::clone(service),
        ),
        HandlerKind::SpeechToText => {
            ai_tools::build_transcription_job(&inputs.files, Arc::clone(service))
        }
        HandlerKind::TextToSpeech => return Ok(Launch::Speak),
        HandlerKind::Converter(profile) => converters::build_job(profile, &inputs.files),
        HandlerKind::PdfMerge => pdf::build_merge_job(&inputs.files),
        HandlerKind::TextToPdf => pdf::build_text_job(&inputs.text),
        HandlerKind::WebCapture(format) => web_capture::build_job(format, &inputs.url),
        HandlerKind::CreateArchive => archive::build_create_job(&inputs.files),
        HandlerKind::ExtractArchive => archive::build_extract_job(&inputs.files),
        HandlerKind::YouTubeShorts => online_media::build_shorts_job(&inputs.url, inputs.aspect),
        HandlerKind::SpotifyDownload => online_media::build_spotify_job(&inputs.url),
    }?;
    Ok(Launch::Job(spec))
}

/// Applies a file-picker result to the mounted tool.
pub fn accept_files(session: &mut ToolSession, files: Vec<InputFile>, artifacts: &mut ArtifactStore) {
    let Some(kind) = session.handler else {
        log::debug!("files ignored by placeholder {}", session.key.as_str());
        return;
    };
    session.clear_messages();
    match kind {
        HandlerKind::Summarizer => {
            let Some(file) = files.into_iter().next() else {
                return;
            };
            session.job.clear(artifacts);
            match ai_tools::read_text_file(&file) {
                Ok(text) => session.inputs.text = text,
                Err(err) => session.notice = Some(err),
            }
        }
        HandlerKind::PdfMerge => {
            if let Some(notice) = pdf::accept_merge_files(&mut session.inputs.files, files) {
                session.notice = Some(HubError::validation(notice));
            }
        }
        HandlerKind::CreateArchive => session.inputs.files.extend(files),
        _ if kind.file_mode() == FileMode::Single => {
            let Some(file) = files.into_iter().next() else {
                return;
            };
            session.job.clear(artifacts);
            if let Some(rule) = kind.file_rule() {
                if let Err(err) = rule.check(&file) {
                    session.notice = Some(err);
                }
            }
            session.inputs.files = vec![file];
        }
        _ => log::debug!("{} takes no files", session.key.as_str()),
    }
}

pub fn remove_file(session: &mut ToolSession, index: usize) -> Result<(), String> {
    if index >= session.inputs.files.len() {
        return Err(format!("invalid_file_index:{index}"));
    }
    session.inputs.files.remove(index);
    Ok(())
}

/// `accept` attribute for the host's file picker.
pub fn accept_list(rule: &FileRule) -> String {
    rule.mimes
        .iter()
        .map(|m| m.to_string())
        .chain(rule.extensions.iter().map(|e| format!(".{e}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Body of the mounted tool: form, notices and job area.
pub fn render_tool(session: &ToolSession, artifacts: &ArtifactStore, locale: &str) -> Vec<Value> {
    let Some(kind) = session.handler else {
        return coming_soon::render_coming_soon(&session.name, session.icon);
    };
    let labels = kind.labels();
    let mut out = heading(labels.title, labels.description);
    out.extend(render_form(kind, session, locale));

    if let Some(notice) = &session.notice {
        out.push(crate::ui::error_panel(&notice.to_string(), notice.kind()));
    }
    if let Some(info) = &session.info {
        out.push(node(Text::new(info).tone("muted")));
    }

    if kind == HandlerKind::TextToSpeech {
        out.extend(render_speech_controls(session));
        return out;
    }

    let status = session.job.status();
    let idle = !status.is_busy() && session.job.output().is_none();
    if idle {
        out.push(node(Button::new(labels.action, "start").id("start")));
    }
    out.extend(job_view::render_job(session, kind, artifacts, locale));
    out
}

fn render_form(kind: HandlerKind, session: &ToolSession, locale: &str) -> Vec<Value> {
    let inputs = &session.inputs;
    let mut out = Vec::new();
    match kind {
        HandlerKind::Summarizer => {
            out.push(node(
                TextInput::new("text_input")
                    .text(&inputs.text)
                    .hint("Paste your text here..."),
            ));
            let count = format!("{} words", ai_tools::word_count(&inputs.text));
            out.push(node(Text::new(&count).size(12.0).tone("muted")));
            out.push(file_picker(kind, locale));
        }
        HandlerKind::Translator => {
            out.push(language_select("source_lang", "From", inputs.source_lang));
            out.push(node(Button::new("⇄", "swap_languages").content_description("Swap languages")));
            out.push(language_select("target_lang", "To", inputs.target_lang));
            out.push(node(
                TextInput::new("text_input")
                    .text(&inputs.text)
                    .hint("Enter text to translate..."),
            ));
            let paste = rust_i18n::t!("job.paste", locale = locale);
            out.push(node(Button::new(&paste, "clipboard_paste")));
        }
        HandlerKind::TextToSpeech => {
            out.push(node(
                TextInput::new("text_input")
                    .text(&inputs.text)
                    .hint("Type something to say..."),
            ));
            if !session.speech.voices.is_empty() {
                let options = session
                    .speech
                    .voices
                    .iter()
                    .map(|v| SelectOption { value: v, label: v })
                    .collect();
                let selected = session.speech.selected_voice.as_deref().unwrap_or("");
                out.push(node(Select::new("speech_voice", options, selected).label("Voice")));
            }
        }
        HandlerKind::TextToPdf => {
            out.push(node(
                TextInput::new("text_input")
                    .text(&inputs.text)
                    .hint("Type or paste your text..."),
            ));
        }
        HandlerKind::WebCapture(_) | HandlerKind::SpotifyDownload => {
            out.push(url_input(&inputs.url, "https://"));
        }
        HandlerKind::YouTubeShorts => {
            out.push(url_input(&inputs.url, "https://www.youtube.com/watch?v=..."));
            let options = [AspectRatio::Portrait, AspectRatio::Landscape]
                .into_iter()
                .map(|a| SelectOption {
                    value: a.as_str(),
                    label: a.as_str(),
                })
                .collect();
            out.push(node(
                Select::new("aspect_ratio", options, inputs.aspect.as_str()).label("Aspect ratio"),
            ));
        }
        HandlerKind::SpeechToText
        | HandlerKind::Converter(_)
        | HandlerKind::ExtractArchive
        | HandlerKind::PdfMerge
        | HandlerKind::CreateArchive => {
            out.push(file_picker(kind, locale));
            out.extend(file_listing(kind, &inputs.files, locale));
        }
    }
    out
}

fn file_picker(kind: HandlerKind, locale: &str) -> Value {
    let multiple = kind.file_mode() == FileMode::Multiple;
    let label = if multiple {
        rust_i18n::t!("job.choose_files", locale = locale)
    } else {
        rust_i18n::t!("job.choose_file", locale = locale)
    };
    let accept = kind.file_rule().map(accept_list).unwrap_or_default();
    let mut button = Button::new(&label, "files_selected")
        .requires_file_picker(true)
        .multiple(multiple);
    if !accept.is_empty() {
        button = button.accept(&accept);
    }
    node(button)
}

fn file_listing(kind: HandlerKind, files: &[InputFile], locale: &str) -> Vec<Value> {
    if files.is_empty() {
        return Vec::new();
    }
    let removable = kind.file_mode() == FileMode::Multiple;
    let remove = rust_i18n::t!("job.remove", locale = locale);
    let summary = rust_i18n::t!("files.selected", locale = locale, count = files.len());
    let mut out = vec![node(Text::new(&summary).size(12.0).tone("muted"))];
    for (index, file) in files.iter().enumerate() {
        let line = format!(
            "{} ({})",
            file.name,
            crate::artifact::format_file_size(file.size())
        );
        let mut children = vec![node(Text::new(&line))];
        if removable {
            children.push(node(
                Button::new(&remove, "remove_file").bind("index", index.to_string()),
            ));
        }
        out.push(node(Card::new(children)));
    }
    out
}

fn url_input(url: &str, hint: &str) -> Value {
    node(
        TextInput::new("url_input")
            .text(url)
            .hint(hint)
            .single_line(true),
    )
}

fn language_select(bind_key: &str, label: &str, selected: Language) -> Value {
    let options = Language::ALL
        .iter()
        .map(|l| SelectOption {
            value: l.label(),
            label: l.label(),
        })
        .collect();
    node(Select::new(bind_key, options, selected.label()).label(label))
}

fn render_speech_controls(session: &ToolSession) -> Vec<Value> {
    let speech = &session.speech;
    let mut out = Vec::new();
    let speak_label = if speech.paused { "Resume" } else { "Speak" };
    out.push(node(
        Button::new(speak_label, "speech_speak").enabled(speech.can_speak(&session.inputs.text)),
    ));
    out.push(node(
        Button::new("Pause", "speech_pause").enabled(speech.speaking && !speech.paused),
    ));
    out.push(node(Button::new("Stop", "speech_stop").enabled(speech.speaking)));
    if let Some(err) = &speech.error {
        out.push(crate::ui::error_panel(&err.to_string(), err.kind()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    fn png_file() -> InputFile {
        let bytes = image_tools::blank_canvas(4, 4, image_tools::CanvasFormat::Png).unwrap();
        InputFile::new("shot.png", "image/png", bytes)
    }

    #[test]
    fn every_configured_key_resolves() {
        let reg = registry();
        for key in ToolKey::ALL {
            assert!(reg.contains(*key), "{} missing", key.as_str());
            assert_eq!(reg.resolve(*key).key, *key);
        }
    }

    #[test]
    fn generic_converters_are_placeholders() {
        let reg = registry();
        assert!(reg.resolve(ToolKey::CadConverter).is_placeholder());
        assert!(reg.resolve(ToolKey::VideoConverter).is_placeholder());
        assert_eq!(
            reg.resolve(ToolKey::PngToJpg).handler(),
            Some(&HandlerKind::Converter(&converters::PNG_TO_JPG))
        );
        assert_eq!(
            reg.resolve(ToolKey::YoutubeToShorts).handler(),
            Some(&HandlerKind::YouTubeShorts)
        );
    }

    #[test]
    fn jpg_rejected_by_png_tool_at_selection() {
        let mut session = ToolSession::mount(ToolKey::PngToJpg);
        let mut artifacts = ArtifactStore::new();
        let jpg = InputFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        accept_files(&mut session, vec![jpg], &mut artifacts);
        let notice = session.notice.as_ref().map(|n| n.to_string());
        assert_eq!(
            notice.as_deref(),
            Some("Unsupported file type. Please upload a .png file.")
        );
        let kind = session.handler.unwrap();
        assert!(matches!(
            validate(kind, &session.inputs),
            Err(HubError::Validation(_))
        ));
        assert_eq!(session.job.status(), &JobStatus::Idle);
    }

    #[test]
    fn single_file_tools_replace_and_multi_file_tools_append() {
        let mut artifacts = ArtifactStore::new();
        let mut single = ToolSession::mount(ToolKey::CompressPng);
        accept_files(&mut single, vec![png_file()], &mut artifacts);
        accept_files(&mut single, vec![png_file()], &mut artifacts);
        assert_eq!(single.inputs.files.len(), 1);
        assert!(single.notice.is_none());

        let mut multi = ToolSession::mount(ToolKey::CreateArchive);
        accept_files(&mut multi, vec![png_file()], &mut artifacts);
        accept_files(&mut multi, vec![png_file(), png_file()], &mut artifacts);
        assert_eq!(multi.inputs.files.len(), 3);
        assert!(remove_file(&mut multi, 1).is_ok());
        assert_eq!(
            remove_file(&mut multi, 9),
            Err("invalid_file_index:9".to_string())
        );
    }

    #[test]
    fn summarizer_loads_text_files() {
        let mut artifacts = ArtifactStore::new();
        let mut session = ToolSession::mount(ToolKey::Summarizer);
        let txt = InputFile::new("notes.txt", "text/plain", b"Some long notes".to_vec());
        accept_files(&mut session, vec![txt], &mut artifacts);
        assert_eq!(session.inputs.text, "Some long notes");

        let pdf = InputFile::new("notes.pdf", "application/pdf", b"%PDF".to_vec());
        accept_files(&mut session, vec![pdf], &mut artifacts);
        assert!(matches!(session.notice, Some(HubError::Validation(_))));
    }

    #[test]
    fn merge_filters_non_pdfs() {
        let mut artifacts = ArtifactStore::new();
        let mut session = ToolSession::mount(ToolKey::PdfMerge);
        let a = InputFile::new("a.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        accept_files(&mut session, vec![a, png_file()], &mut artifacts);
        assert_eq!(session.inputs.files.len(), 1);
        assert!(session.notice.is_some());
    }

    #[test]
    fn accept_list_includes_extensions() {
        let accept = accept_list(&archive::EXTRACT_RULE);
        assert!(accept.contains("application/zip"));
        assert!(accept.contains(".tgz"));
    }

    #[test]
    fn placeholder_renders_coming_soon() {
        let session = ToolSession::mount(ToolKey::FontConverter);
        let nodes = render_tool(&session, &ArtifactStore::new(), "en");
        let dump = serde_json::to_string(&nodes).unwrap();
        assert!(dump.contains("Coming Soon!"));
        assert!(!dump.contains("\"action\":\"start\""));
    }
}
