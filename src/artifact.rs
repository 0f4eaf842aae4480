use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Bytes produced by a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub filename: String,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            filename: filename.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Opaque reference handed to the host instead of the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(Uuid);

impl ArtifactHandle {
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(ArtifactHandle)
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live artifacts keyed by handle. Revoking drops the bytes.
#[derive(Default)]
pub struct ArtifactStore {
    items: HashMap<ArtifactHandle, Artifact>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: Artifact) -> ArtifactHandle {
        let handle = ArtifactHandle(Uuid::new_v4());
        self.items.insert(handle, artifact);
        handle
    }

    pub fn get(&self, handle: ArtifactHandle) -> Option<&Artifact> {
        self.items.get(&handle)
    }

    pub fn revoke(&mut self, handle: ArtifactHandle) -> bool {
        self.items.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: ArtifactHandle) -> bool {
        self.items.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Host-facing payload for a download.
    pub fn payload(&self, handle: ArtifactHandle) -> Result<Value, String> {
        let artifact = self
            .get(handle)
            .ok_or_else(|| format!("artifact_revoked:{handle}"))?;
        Ok(json!({
            "type": "Artifact",
            "handle": handle.to_string(),
            "filename": artifact.filename,
            "mime": artifact.mime,
            "size": artifact.size(),
            "data_base64": B64.encode(&artifact.bytes),
        }))
    }
}

/// Suggested download name: input stem + `suffix` + `.extension`, or `default` when
/// there is no usable input name.
pub fn output_filename(
    input_name: Option<&str>,
    suffix: &str,
    extension: &str,
    default: &str,
) -> String {
    let stem = input_name
        .map(str::trim)
        .map(|name| match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        })
        .filter(|stem| !stem.is_empty());

    match stem {
        Some(stem) => format!("{stem}{suffix}.{extension}"),
        None => default.to_string(),
    }
}

pub fn format_file_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_keeps_stem_and_swaps_extension() {
        assert_eq!(
            output_filename(Some("holiday.video.mp4"), "", "mp3", "converted.mp3"),
            "holiday.video.mp3"
        );
        assert_eq!(
            output_filename(Some("logo.png"), "-compressed", "png", "compressed.png"),
            "logo-compressed.png"
        );
    }

    #[test]
    fn filename_without_extension_uses_whole_name() {
        assert_eq!(output_filename(Some("README"), "", "pdf", "converted.pdf"), "README.pdf");
    }

    #[test]
    fn filename_defaults_without_input() {
        assert_eq!(output_filename(None, "", "pdf", "converted.pdf"), "converted.pdf");
        assert_eq!(output_filename(Some("  "), "", "pdf", "converted.pdf"), "converted.pdf");
    }

    #[test]
    fn revoked_handle_no_longer_resolves() {
        let mut store = ArtifactStore::new();
        let handle = store.insert(Artifact::new(vec![1, 2, 3], "audio/mpeg", "a.mp3"));
        assert!(store.payload(handle).is_ok());
        assert!(store.revoke(handle));
        assert!(!store.revoke(handle));
        assert!(store.is_empty());
        let err = store.payload(handle).unwrap_err();
        assert!(err.starts_with("artifact_revoked:"));
    }

    #[test]
    fn payload_carries_base64_bytes() {
        let mut store = ArtifactStore::new();
        let handle = store.insert(Artifact::new(b"abc".to_vec(), "text/plain", "a.txt"));
        let payload = store.payload(handle).unwrap();
        assert_eq!(payload["data_base64"], "YWJj");
        assert_eq!(payload["filename"], "a.txt");
        assert_eq!(ArtifactHandle::parse(payload["handle"].as_str().unwrap()), Some(handle));
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }
}
