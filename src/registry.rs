//! Tool catalogue and the key → handler binding table.
//!
//! Categories list tools for discoverability, so a key may appear more than once.
//! The binding table collapses duplicates: the first category that lists a key
//! provides its display name and home category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

macro_rules! tool_keys {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// Stable identifier of one tool.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ToolKey {
            $(#[serde(rename = $tag)] $variant),+
        }

        impl ToolKey {
            pub const ALL: &'static [ToolKey] = &[$(ToolKey::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(ToolKey::$variant => $tag),+
                }
            }

            pub fn from_key(key: &str) -> Option<ToolKey> {
                match key {
                    $($tag => Some(ToolKey::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

tool_keys! {
    Summarizer => "summarizer",
    SpeechToText => "speechToText",
    Translator => "translator",
    TextToSpeech => "textToSpeech",
    ArchiveConverter => "archiveConverter",
    AudioConverter => "audioConverter",
    CadConverter => "cadConverter",
    DocumentConverter => "documentConverter",
    EbookConverter => "ebookConverter",
    FontConverter => "fontConverter",
    ImageConverter => "imageConverter",
    PresentationConverter => "presentationConverter",
    SpreadsheetConverter => "spreadsheetConverter",
    VectorConverter => "vectorConverter",
    VideoConverter => "videoConverter",
    PngToJpg => "pngToJpg",
    WebpToPng => "webpToPng",
    Mp3ToMp4 => "mp3ToMp4",
    Mp4ToMp3 => "mp4ToMp3",
    WordToPdf => "wordToPdf",
    TextToPdf => "textToPdf",
    CompressPdf => "compressPDF",
    CompressPng => "compressPNG",
    CompressJpg => "compressJPG",
    PdfOcr => "pdfOCR",
    PdfMerge => "pdfMerge",
    WebsiteToPdf => "websiteToPdf",
    WebsiteToPng => "websiteToPng",
    WebsiteToJpg => "websiteToJpg",
    CreateArchive => "createArchive",
    ExtractArchive => "extractArchive",
    YoutubeToShorts => "youtubeToShorts",
    SpotifyDownloader => "spotifyDownloader",
}

/// Tool shown when the selected key has no binding.
pub const DEFAULT_TOOL: ToolKey = ToolKey::Summarizer;

pub const PLACEHOLDER_ICON: &str = "🔧";
pub const GENERIC_TOOL_NAME: &str = "Tool";

/// A navigation group.
#[derive(Debug, Clone)]
pub struct ToolCategory {
    pub label: &'static str,
    pub icon: &'static str,
    pub tools: &'static [(ToolKey, &'static str)],
}

pub static CATEGORIES: &[ToolCategory] = &[
    ToolCategory {
        label: "Online Media",
        icon: "🎬",
        tools: &[
            (ToolKey::YoutubeToShorts, "YouTube to Shorts"),
            (ToolKey::SpotifyDownloader, "Spotify Downloader"),
        ],
    },
    ToolCategory {
        label: "AI Tools",
        icon: "✨",
        tools: &[
            (ToolKey::Summarizer, "Text Summarizer"),
            (ToolKey::SpeechToText, "Speech-to-Text"),
            (ToolKey::Translator, "AI Translator"),
            (ToolKey::TextToSpeech, "Text-to-Speech"),
        ],
    },
    ToolCategory {
        label: "Converters",
        icon: "🔄",
        tools: &[
            (ToolKey::ImageConverter, "Image Converter"),
            (ToolKey::DocumentConverter, "Document Converter"),
            (ToolKey::VideoConverter, "Video Converter"),
            (ToolKey::AudioConverter, "Audio Converter"),
            (ToolKey::ArchiveConverter, "Archive Converter"),
            (ToolKey::EbookConverter, "Ebook Converter"),
            (ToolKey::CadConverter, "CAD Converter"),
            (ToolKey::FontConverter, "Font Converter"),
            (ToolKey::PresentationConverter, "Presentation Converter"),
            (ToolKey::SpreadsheetConverter, "Spreadsheet Converter"),
            (ToolKey::VectorConverter, "Vector Converter"),
            (ToolKey::PngToJpg, "PNG to JPG"),
            (ToolKey::WebpToPng, "WebP to PNG"),
            (ToolKey::WordToPdf, "Word to PDF"),
            (ToolKey::TextToPdf, "Text to PDF"),
            (ToolKey::Mp4ToMp3, "MP4 to MP3"),
            (ToolKey::Mp3ToMp4, "MP3 to MP4"),
        ],
    },
    ToolCategory {
        label: "File Optimization",
        icon: "⚙️",
        tools: &[
            (ToolKey::CompressPdf, "Compress PDF"),
            (ToolKey::CompressPng, "Compress PNG"),
            (ToolKey::CompressJpg, "Compress JPG"),
            (ToolKey::PdfOcr, "PDF OCR"),
        ],
    },
    ToolCategory {
        label: "PDF Tools",
        icon: "📄",
        tools: &[
            (ToolKey::PdfMerge, "Merge PDF"),
            (ToolKey::WordToPdf, "Word to PDF"),
            (ToolKey::TextToPdf, "Text to PDF"),
            (ToolKey::CompressPdf, "Compress PDF"),
            (ToolKey::PdfOcr, "PDF OCR"),
        ],
    },
    ToolCategory {
        label: "Web Tools",
        icon: "🌐",
        tools: &[
            (ToolKey::WebsiteToPdf, "Save Website as PDF"),
            (ToolKey::WebsiteToPng, "Website PNG Screenshot"),
            (ToolKey::WebsiteToJpg, "Website JPG Screenshot"),
        ],
    },
    ToolCategory {
        label: "Archive Tools",
        icon: "🗜️",
        tools: &[
            (ToolKey::CreateArchive, "Create Archive"),
            (ToolKey::ExtractArchive, "Extract Archive"),
        ],
    },
];

pub fn category_icon(label: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|c| c.label == label)
        .map(|c| c.icon)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget<H> {
    Implemented(H),
    Placeholder { name: String, icon: &'static str },
}

/// One resolved registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<H> {
    pub key: ToolKey,
    pub name: String,
    pub category: Option<&'static str>,
    pub target: BindingTarget<H>,
}

impl<H> Binding<H> {
    fn placeholder(key: ToolKey, name: &str, category: Option<&'static str>) -> Self {
        let name = if name.trim().is_empty() {
            GENERIC_TOOL_NAME.to_string()
        } else {
            name.to_string()
        };
        Self {
            key,
            name: name.clone(),
            category,
            target: BindingTarget::Placeholder {
                name,
                icon: PLACEHOLDER_ICON,
            },
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.target, BindingTarget::Placeholder { .. })
    }

    pub fn handler(&self) -> Option<&H> {
        match &self.target {
            BindingTarget::Implemented(handler) => Some(handler),
            BindingTarget::Placeholder { .. } => None,
        }
    }
}

pub struct ToolRegistry<H> {
    bindings: BTreeMap<ToolKey, Binding<H>>,
    default_key: ToolKey,
    fallback: Binding<H>,
}

impl<H> ToolRegistry<H> {
    /// Flatten every category and bind each distinct key once.
    pub fn build<F>(categories: &[ToolCategory], default_key: ToolKey, mut implemented: F) -> Self
    where
        F: FnMut(ToolKey) -> Option<H>,
    {
        let mut bindings: BTreeMap<ToolKey, Binding<H>> = BTreeMap::new();
        for category in categories {
            for (key, name) in category.tools {
                if bindings.contains_key(key) {
                    continue;
                }
                let binding = match implemented(*key) {
                    Some(handler) => Binding {
                        key: *key,
                        name: if name.trim().is_empty() {
                            GENERIC_TOOL_NAME.to_string()
                        } else {
                            name.to_string()
                        },
                        category: Some(category.label),
                        target: BindingTarget::Implemented(handler),
                    },
                    None => Binding::placeholder(*key, name, Some(category.label)),
                };
                bindings.insert(*key, binding);
            }
        }

        Self {
            bindings,
            default_key,
            fallback: Binding::placeholder(default_key, GENERIC_TOOL_NAME, None),
        }
    }

    /// Binding for `key`, falling back to the default tool rather than failing.
    pub fn resolve(&self, key: ToolKey) -> &Binding<H> {
        self.bindings
            .get(&key)
            .or_else(|| self.bindings.get(&self.default_key))
            .unwrap_or(&self.fallback)
    }

    pub fn contains(&self, key: ToolKey) -> bool {
        self.bindings.contains_key(&key)
    }

    pub fn default_key(&self) -> ToolKey {
        self.default_key
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<H>> {
        self.bindings.values()
    }
}
