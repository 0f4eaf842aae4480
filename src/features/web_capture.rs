use crate::artifact::Artifact;
use crate::error::HubError;
use crate::features::image_tools::{blank_canvas, CanvasFormat};
use crate::features::pdf::lines_to_pdf;
use crate::job::{Deliverable, JobSpec, SimulatedWork};
use crate::validation::require_url;

pub const INVALID_URL: &str = "Please enter a valid URL (e.g., https://example.com)";
pub const CAPTURE_WORK: SimulatedWork = SimulatedWork::converter(250, 3000, 5);

const CANVAS_WIDTH: u32 = 1200;
const CANVAS_HEIGHT: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Pdf,
    Png,
    Jpg,
}

impl CaptureFormat {
    pub fn title(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "Save Website as PDF",
            CaptureFormat::Png => "Website PNG Screenshot",
            CaptureFormat::Jpg => "Website JPG Screenshot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "Enter a URL to save a webpage as a PDF document.",
            CaptureFormat::Png => "Enter a URL to capture a webpage and save it as a PNG image.",
            CaptureFormat::Jpg => "Enter a URL to capture a webpage and save it as a JPG image.",
        }
    }

    pub fn action_label(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "Save as PDF",
            CaptureFormat::Png | CaptureFormat::Jpg => "Capture Screenshot",
        }
    }

    pub fn download_label(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "Download PDF",
            CaptureFormat::Png => "Download PNG",
            CaptureFormat::Jpg => "Download JPG",
        }
    }

    fn filename(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "website.pdf",
            CaptureFormat::Png => "website-screenshot.png",
            CaptureFormat::Jpg => "website-screenshot.jpg",
        }
    }

    fn mime(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "application/pdf",
            CaptureFormat::Png => "image/png",
            CaptureFormat::Jpg => "image/jpeg",
        }
    }
}

pub fn validate(url: &str) -> Result<(), HubError> {
    require_url(url, INVALID_URL).map(|_| ())
}

pub fn capture(format: CaptureFormat, url: &str) -> Result<Artifact, HubError> {
    let bytes = match format {
        CaptureFormat::Pdf => lines_to_pdf(&[
            "Simulated capture of:".to_string(),
            url.to_string(),
        ]),
        CaptureFormat::Png => blank_canvas(CANVAS_WIDTH, CANVAS_HEIGHT, CanvasFormat::Png),
        CaptureFormat::Jpg => blank_canvas(CANVAS_WIDTH, CANVAS_HEIGHT, CanvasFormat::Jpeg),
    }
    .map_err(|code| {
        log::warn!("capture of {url} failed: {code}");
        HubError::resource("Could not render the capture.")
    })?;
    Ok(Artifact::new(bytes, format.mime(), format.filename()))
}

pub fn build_job(format: CaptureFormat, url: &str) -> Result<JobSpec, HubError> {
    let parsed = require_url(url, INVALID_URL)?;
    let url = parsed.to_string();
    Ok(JobSpec::simulated(CAPTURE_WORK, move || {
        capture(format, &url).map(Deliverable::Artifact)
    }))
}
