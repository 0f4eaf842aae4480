//! Single-file converters and optimizers that share the timer-driven job shape:
//! pick one file, watch progress, sit through a countdown, download.

use crate::artifact::{output_filename, Artifact};
use crate::error::HubError;
use crate::features::image_tools;
use crate::job::{Deliverable, JobSpec, SimulatedWork};
use crate::registry::ToolKey;
use crate::validation::{require_single_file, FileRule, InputFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    PassThrough,
    PngToJpeg,
    WebpToPng,
    OptimizePng,
    OptimizeJpeg,
    RecognizeText,
}

#[derive(Debug)]
pub struct ConverterProfile {
    pub key: ToolKey,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: FileRule,
    pub missing_file: &'static str,
    pub work: SimulatedWork,
    pub transform: Transform,
    pub mime: &'static str,
    pub extension: &'static str,
    pub suffix: &'static str,
    pub default_name: &'static str,
    pub action_label: &'static str,
    pub busy_label: &'static str,
    pub success_label: &'static str,
    pub download_label: &'static str,
}

impl PartialEq for ConverterProfile {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ConverterProfile {}

const PDF_RULE: FileRule = FileRule {
    mimes: &["application/pdf"],
    extensions: &[],
    rejection: "Unsupported file type. Please upload a .pdf file.",
};

const PNG_RULE: FileRule = FileRule {
    mimes: &["image/png"],
    extensions: &[],
    rejection: "Unsupported file type. Please upload a .png file.",
};

pub static MP4_TO_MP3: ConverterProfile = ConverterProfile {
    key: ToolKey::Mp4ToMp3,
    title: "MP4 to MP3 Converter",
    description: "Extract audio from an MP4 video file.",
    rule: FileRule {
        mimes: &["video/mp4"],
        extensions: &[],
        rejection: "Unsupported file type. Please upload a .mp4 file.",
    },
    missing_file: "Please select an MP4 file to convert.",
    work: SimulatedWork::converter(250, 3000, 5),
    transform: Transform::PassThrough,
    mime: "audio/mpeg",
    extension: "mp3",
    suffix: "",
    default_name: "converted.mp3",
    action_label: "Convert to MP3",
    busy_label: "Extracting audio...",
    success_label: "Extraction Successful!",
    download_label: "Download MP3",
};

pub static MP3_TO_MP4: ConverterProfile = ConverterProfile {
    key: ToolKey::Mp3ToMp4,
    title: "MP3 to MP4 Converter",
    description: "Wrap an MP3 audio track into an MP4 video file.",
    rule: FileRule {
        mimes: &["audio/mpeg", "audio/mp3"],
        extensions: &["mp3"],
        rejection: "Unsupported file type. Please upload a .mp3 file.",
    },
    missing_file: "Please select an MP3 file to convert.",
    work: SimulatedWork::converter(250, 3000, 5),
    transform: Transform::PassThrough,
    mime: "video/mp4",
    extension: "mp4",
    suffix: "",
    default_name: "converted.mp4",
    action_label: "Convert to MP4",
    busy_label: "Converting...",
    success_label: "Conversion Successful!",
    download_label: "Download MP4",
};

pub static PNG_TO_JPG: ConverterProfile = ConverterProfile {
    key: ToolKey::PngToJpg,
    title: "PNG to JPG Converter",
    description: "Upload a PNG image to convert it into a JPG file.",
    rule: PNG_RULE,
    missing_file: "Please select a PNG image to convert.",
    work: SimulatedWork::converter(200, 2000, 5),
    transform: Transform::PngToJpeg,
    mime: "image/jpeg",
    extension: "jpg",
    suffix: "",
    default_name: "converted.jpg",
    action_label: "Convert to JPG",
    busy_label: "Converting...",
    success_label: "Conversion Successful!",
    download_label: "Download JPG",
};

pub static WEBP_TO_PNG: ConverterProfile = ConverterProfile {
    key: ToolKey::WebpToPng,
    title: "WebP to PNG Converter",
    description: "Upload a WebP image to convert it into a PNG file.",
    rule: FileRule {
        mimes: &["image/webp"],
        extensions: &["webp"],
        rejection: "Unsupported file type. Please upload a .webp file.",
    },
    missing_file: "Please select a WebP image to convert.",
    work: SimulatedWork::converter(200, 2000, 0).with_ceiling(100),
    transform: Transform::WebpToPng,
    mime: "image/png",
    extension: "png",
    suffix: "",
    default_name: "converted.png",
    action_label: "Convert to PNG",
    busy_label: "Converting...",
    success_label: "Conversion Successful!",
    download_label: "Download PNG",
};

pub static WORD_TO_PDF: ConverterProfile = ConverterProfile {
    key: ToolKey::WordToPdf,
    title: "Word to PDF Converter",
    description: "Upload a .doc or .docx file to convert it into a PDF document.",
    rule: FileRule {
        mimes: &[
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ],
        extensions: &["doc", "docx"],
        rejection: "Unsupported file type. Please upload a .doc or .docx file.",
    },
    missing_file: "Please select a Word document to convert.",
    work: SimulatedWork::converter(250, 3000, 5),
    transform: Transform::PassThrough,
    mime: "application/pdf",
    extension: "pdf",
    suffix: "",
    default_name: "converted.pdf",
    action_label: "Convert to PDF",
    busy_label: "Converting...",
    success_label: "Conversion Successful!",
    download_label: "Download PDF",
};

pub static COMPRESS_PDF: ConverterProfile = ConverterProfile {
    key: ToolKey::CompressPdf,
    title: "PDF Compressor",
    description: "Reduce the file size of your PDF documents.",
    rule: PDF_RULE,
    missing_file: "Please select a PDF file to compress.",
    work: SimulatedWork::converter(250, 3000, 5),
    transform: Transform::PassThrough,
    mime: "application/pdf",
    extension: "pdf",
    suffix: "-compressed",
    default_name: "compressed.pdf",
    action_label: "Compress PDF",
    busy_label: "Compressing...",
    success_label: "Compression Successful!",
    download_label: "Download Compressed PDF",
};

pub static COMPRESS_PNG: ConverterProfile = ConverterProfile {
    key: ToolKey::CompressPng,
    title: "PNG Compressor",
    description: "Reduce the file size of your PNG images.",
    rule: PNG_RULE,
    missing_file: "Please select a PNG image to compress.",
    work: SimulatedWork::converter(200, 2500, 5),
    transform: Transform::OptimizePng,
    mime: "image/png",
    extension: "png",
    suffix: "-compressed",
    default_name: "compressed.png",
    action_label: "Compress PNG",
    busy_label: "Compressing...",
    success_label: "Compression Successful!",
    download_label: "Download Compressed PNG",
};

pub static COMPRESS_JPG: ConverterProfile = ConverterProfile {
    key: ToolKey::CompressJpg,
    title: "JPG Compressor",
    description: "Reduce the file size of your JPG images.",
    rule: FileRule {
        mimes: &["image/jpeg"],
        extensions: &["jpg", "jpeg"],
        rejection: "Unsupported file type. Please upload a .jpg file.",
    },
    missing_file: "Please select a JPG image to compress.",
    work: SimulatedWork::converter(200, 2500, 5),
    transform: Transform::OptimizeJpeg,
    mime: "image/jpeg",
    extension: "jpg",
    suffix: "-compressed",
    default_name: "compressed.jpg",
    action_label: "Compress JPG",
    busy_label: "Compressing...",
    success_label: "Compression Successful!",
    download_label: "Download Compressed JPG",
};

pub static PDF_OCR: ConverterProfile = ConverterProfile {
    key: ToolKey::PdfOcr,
    title: "PDF OCR",
    description: "Extract text from scanned PDF documents.",
    rule: PDF_RULE,
    missing_file: "Please select a PDF file to process.",
    work: SimulatedWork::converter(250, 3000, 5),
    transform: Transform::RecognizeText,
    mime: "text/plain",
    extension: "txt",
    suffix: "",
    default_name: "recognized.txt",
    action_label: "Extract Text",
    busy_label: "Recognizing text...",
    success_label: "Text Extraction Successful!",
    download_label: "Download Text",
};

pub fn profile_for(key: ToolKey) -> Option<&'static ConverterProfile> {
    match key {
        ToolKey::Mp4ToMp3 => Some(&MP4_TO_MP3),
        ToolKey::Mp3ToMp4 => Some(&MP3_TO_MP4),
        ToolKey::PngToJpg => Some(&PNG_TO_JPG),
        ToolKey::WebpToPng => Some(&WEBP_TO_PNG),
        ToolKey::WordToPdf => Some(&WORD_TO_PDF),
        ToolKey::CompressPdf => Some(&COMPRESS_PDF),
        ToolKey::CompressPng => Some(&COMPRESS_PNG),
        ToolKey::CompressJpg => Some(&COMPRESS_JPG),
        ToolKey::PdfOcr => Some(&PDF_OCR),
        _ => None,
    }
}

pub fn validate(profile: &ConverterProfile, files: &[InputFile]) -> Result<(), HubError> {
    require_single_file(files, &profile.rule, profile.missing_file).map(|_| ())
}

pub fn build_job(profile: &'static ConverterProfile, files: &[InputFile]) -> Result<JobSpec, HubError> {
    let file = require_single_file(files, &profile.rule, profile.missing_file)?.clone();
    Ok(JobSpec::simulated(profile.work, move || {
        convert(profile, &file).map(Deliverable::Artifact)
    }))
}

pub fn convert(profile: &ConverterProfile, file: &InputFile) -> Result<Artifact, HubError> {
    let bytes = match profile.transform {
        Transform::PassThrough => file.bytes.clone(),
        Transform::PngToJpeg => image_tools::png_to_jpeg(&file.bytes).map_err(image_error)?,
        Transform::WebpToPng => image_tools::webp_to_png(&file.bytes).map_err(image_error)?,
        Transform::OptimizePng => smaller_of(image_tools::optimize_png(&file.bytes), &file.bytes)?,
        Transform::OptimizeJpeg => smaller_of(image_tools::optimize_jpeg(&file.bytes), &file.bytes)?,
        Transform::RecognizeText => recognized_text(file).into_bytes(),
    };
    let filename = output_filename(
        Some(file.name.as_str()),
        profile.suffix,
        profile.extension,
        profile.default_name,
    );
    Ok(Artifact::new(bytes, profile.mime, filename))
}

fn image_error(code: String) -> HubError {
    log::warn!("image conversion failed: {code}");
    if code.starts_with("image_decode_failed") {
        HubError::resource("Could not load the image file.")
    } else {
        HubError::resource("Could not process the image.")
    }
}

/// Re-encoding can grow an already tight file; keep the original then.
fn smaller_of(encoded: Result<Vec<u8>, String>, original: &[u8]) -> Result<Vec<u8>, HubError> {
    let encoded = encoded.map_err(image_error)?;
    if encoded.len() < original.len() {
        Ok(encoded)
    } else {
        Ok(original.to_vec())
    }
}

fn recognized_text(file: &InputFile) -> String {
    format!(
        "Recognized text from {}\n\n\
         This is a simulated OCR result. The document contained {} bytes.\n",
        file.name,
        file.size()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageEncoder;

    fn png_file(name: &str) -> InputFile {
        let mut buf = Vec::new();
        let pixels = vec![200u8; 4 * 4 * 3];
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(&pixels, 4, 4, image::ColorType::Rgb8)
            .unwrap();
        InputFile::new(name, "image/png", buf)
    }

    #[test]
    fn every_converter_profile_is_reachable() {
        for key in ToolKey::ALL {
            if let Some(profile) = profile_for(*key) {
                assert_eq!(profile.key, *key);
            }
        }
        assert!(profile_for(ToolKey::Summarizer).is_none());
    }

    #[test]
    fn jpeg_rejected_by_png_converter() {
        let jpg = InputFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]);
        let err = validate(&PNG_TO_JPG, &[jpg]).unwrap_err();
        assert_eq!(
            err,
            HubError::validation("Unsupported file type. Please upload a .png file.")
        );
    }

    #[test]
    fn missing_file_is_a_validation_error() {
        let err = validate(&MP4_TO_MP3, &[]).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn pass_through_keeps_bytes_and_renames() {
        let file = InputFile::new("clip.final.mp4", "video/mp4", vec![9, 8, 7]);
        let artifact = convert(&MP4_TO_MP3, &file).unwrap();
        assert_eq!(artifact.bytes, vec![9, 8, 7]);
        assert_eq!(artifact.mime, "audio/mpeg");
        assert_eq!(artifact.filename, "clip.final.mp3");
    }

    #[test]
    fn png_to_jpg_really_reencodes() {
        let artifact = convert(&PNG_TO_JPG, &png_file("logo.png")).unwrap();
        assert_eq!(artifact.filename, "logo.jpg");
        assert_eq!(&artifact.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn compressed_output_never_grows() {
        let file = png_file("icon.png");
        let artifact = convert(&COMPRESS_PNG, &file).unwrap();
        assert!(artifact.size() <= file.size());
        assert_eq!(artifact.filename, "icon-compressed.png");
    }

    #[test]
    fn broken_image_surfaces_resource_error() {
        let file = InputFile::new("bad.webp", "image/webp", vec![1, 2, 3]);
        let err = convert(&WEBP_TO_PNG, &file).unwrap_err();
        assert_eq!(err, HubError::resource("Could not load the image file."));
    }
}
