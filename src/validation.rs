use crate::error::HubError;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

/// A file handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Declared MIME type, or the sniffed one when the host sent none.
    pub fn effective_mime(&self) -> String {
        let declared = self.mime.trim();
        if !declared.is_empty() {
            return declared.to_ascii_lowercase();
        }
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Accepted inputs for a file-based tool.
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    /// Exact types, or `family/*` wildcards.
    pub mimes: &'static [&'static str],
    /// Extensions accepted regardless of the MIME type.
    pub extensions: &'static [&'static str],
    pub rejection: &'static str,
}

impl FileRule {
    pub fn accepts(&self, file: &InputFile) -> bool {
        let mime = file.effective_mime();
        let mime_ok = !mime.is_empty()
            && self.mimes.iter().any(|accepted| match accepted.strip_suffix("/*") {
                Some(family) => mime
                    .split_once('/')
                    .map(|(head, _)| head == family)
                    .unwrap_or(false),
                None => mime == *accepted,
            });
        if mime_ok {
            return true;
        }
        match file.extension() {
            Some(ext) => self.extensions.iter().any(|accepted| *accepted == ext),
            None => false,
        }
    }

    pub fn check(&self, file: &InputFile) -> Result<(), HubError> {
        if self.accepts(file) {
            Ok(())
        } else {
            Err(HubError::validation(self.rejection))
        }
    }
}

pub fn require_single_file<'a>(
    files: &'a [InputFile],
    rule: &FileRule,
    missing: &str,
) -> Result<&'a InputFile, HubError> {
    let file = files.first().ok_or_else(|| HubError::validation(missing))?;
    rule.check(file)?;
    Ok(file)
}

pub fn require_file_count(files: &[InputFile], min: usize, message: &str) -> Result<(), HubError> {
    if files.len() < min {
        return Err(HubError::validation(message));
    }
    Ok(())
}

pub fn require_text<'a>(text: &'a str, message: &str) -> Result<&'a str, HubError> {
    if text.trim().is_empty() {
        return Err(HubError::validation(message));
    }
    Ok(text)
}

/// Absolute URL with a scheme and host, as a browser `URL` constructor would accept.
pub fn require_url(raw: &str, message: &str) -> Result<Url, HubError> {
    let url = Url::parse(raw.trim()).map_err(|_| HubError::validation(message))?;
    if url.cannot_be_a_base() {
        return Err(HubError::validation(message));
    }
    Ok(url)
}

fn youtube_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$")
            .unwrap_or_else(|e| panic!("youtube pattern must compile: {e}"))
    })
}

pub fn is_youtube_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && youtube_pattern().is_match(trimmed)
}

pub fn is_spotify_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.contains("spotify.com")
}
