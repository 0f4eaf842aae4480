//! Simulated media fetchers. Both produce a list of downloadable items rather than
//! a single artifact.

use crate::error::HubError;
use crate::job::{Collection, CollectionItem, Deliverable, JobSpec, ProgressStep, SimulatedWork};
use crate::validation::{is_spotify_url, is_youtube_url};
use std::time::Duration;

pub const INVALID_YOUTUBE: &str = "Please enter a valid YouTube URL.";
pub const INVALID_SPOTIFY: &str = "Please enter a valid Spotify track or playlist URL.";

const SHORTS_COUNT: usize = 10;
const PLAYLIST_LENGTH: usize = 12;

pub const SHORTS_WORK: SimulatedWork = SimulatedWork {
    tick: Some(Duration::from_millis(200)),
    step: ProgressStep::Random { min: 1, max: 5 },
    ceiling: 95,
    duration: Duration::from_millis(4000),
    countdown_secs: 0,
    seed: None,
};

pub const SPOTIFY_WORK: SimulatedWork = SimulatedWork {
    tick: None,
    step: ProgressStep::Fixed(0),
    ceiling: 95,
    duration: Duration::from_millis(2500),
    countdown_secs: 0,
    seed: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Portrait,
    Landscape,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait => "portrait",
            AspectRatio::Landscape => "landscape",
        }
    }

    pub fn parse(raw: &str) -> Option<AspectRatio> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "portrait" | "9:16" => Some(AspectRatio::Portrait),
            "landscape" | "16:9" => Some(AspectRatio::Landscape),
            _ => None,
        }
    }

    fn thumbnail_height(self) -> u32 {
        match self {
            AspectRatio::Portrait => 711,
            AspectRatio::Landscape => 225,
        }
    }
}

pub fn validate_youtube(url: &str) -> Result<(), HubError> {
    if is_youtube_url(url) {
        Ok(())
    } else {
        Err(HubError::validation(INVALID_YOUTUBE))
    }
}

/// Ten one-minute clips.
pub fn shorts_for(url: &str, aspect: AspectRatio) -> Collection {
    let items = (0..SHORTS_COUNT)
        .map(|i| CollectionItem {
            title: format!("Short {}", i + 1),
            detail: format!("{:02}:00 - {:02}:00", i, i + 1),
            thumbnail_url: format!(
                "https://picsum.photos/seed/{}{}/400/{}",
                i,
                url.trim(),
                aspect.thumbnail_height()
            ),
            download_name: format!("short-{}.mp4", i + 1),
        })
        .collect();
    Collection {
        title: "Generated Shorts".into(),
        subtitle: Some(format!("{} clips, {}", SHORTS_COUNT, aspect.as_str())),
        bundle_name: None,
        items,
    }
}

pub fn build_shorts_job(url: &str, aspect: AspectRatio) -> Result<JobSpec, HubError> {
    validate_youtube(url)?;
    let url = url.trim().to_string();
    Ok(JobSpec::simulated(SHORTS_WORK, move || {
        Ok(Deliverable::Collection(shorts_for(&url, aspect)))
    }))
}

pub fn validate_spotify(url: &str) -> Result<(), HubError> {
    if is_spotify_url(url) {
        Ok(())
    } else {
        Err(HubError::validation(INVALID_SPOTIFY))
    }
}

pub fn spotify_result(url: &str) -> Collection {
    let url = url.trim();
    if url.contains("/playlist/") {
        let items = (0..PLAYLIST_LENGTH)
            .map(|i| {
                let title = format!("Awesome Song Title {}", i + 1);
                let artist = format!("Artist Name {}", i % 4 + 1);
                CollectionItem {
                    download_name: format!("{artist} - {title}.mp3"),
                    thumbnail_url: format!("https://picsum.photos/seed/{i}{url}/100/100"),
                    title,
                    detail: artist,
                }
            })
            .collect();
        Collection {
            title: "My Awesome Mix".into(),
            subtitle: Some("Cool User".into()),
            bundle_name: Some("My Awesome Mix.zip".into()),
            items,
        }
    } else {
        Collection {
            title: "A Really Cool Song".into(),
            subtitle: None,
            bundle_name: None,
            items: vec![CollectionItem {
                title: "A Really Cool Song".into(),
                detail: "Famous Artist".into(),
                thumbnail_url: format!("https://picsum.photos/seed/{url}/200/200"),
                download_name: "Famous Artist - A Really Cool Song.mp3".into(),
            }],
        }
    }
}

pub fn build_spotify_job(url: &str) -> Result<JobSpec, HubError> {
    validate_spotify(url)?;
    let url = url.to_string();
    Ok(JobSpec::simulated(SPOTIFY_WORK, move || {
        Ok(Deliverable::Collection(spotify_result(&url)))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorts_follow_aspect_ratio() {
        let portrait = shorts_for("https://youtu.be/abc", AspectRatio::Portrait);
        assert_eq!(portrait.items.len(), 10);
        assert_eq!(portrait.items[0].detail, "00:00 - 01:00");
        assert_eq!(portrait.items[9].download_name, "short-10.mp4");
        assert!(portrait.items[0].thumbnail_url.ends_with("/400/711"));

        let landscape = shorts_for("https://youtu.be/abc", AspectRatio::Landscape);
        assert!(landscape.items[3].thumbnail_url.ends_with("/400/225"));
    }

    #[test]
    fn invalid_youtube_url_rejected() {
        assert_eq!(
            validate_youtube("https://vimeo.com/1").unwrap_err().to_string(),
            INVALID_YOUTUBE
        );
    }

    #[test]
    fn playlist_yields_twelve_tracks() {
        let result = spotify_result("https://open.spotify.com/playlist/xyz");
        assert_eq!(result.items.len(), 12);
        assert_eq!(result.items[4].detail, "Artist Name 1");
        assert_eq!(result.bundle_name.as_deref(), Some("My Awesome Mix.zip"));
    }

    #[test]
    fn track_yields_single_item() {
        let result = spotify_result("https://open.spotify.com/track/abc");
        assert_eq!(result.items.len(), 1);
        assert_eq!(
            result.items[0].download_name,
            "Famous Artist - A Really Cool Song.mp3"
        );
    }

    #[test]
    fn aspect_ratio_parsing() {
        assert_eq!(AspectRatio::parse("Landscape"), Some(AspectRatio::Landscape));
        assert_eq!(AspectRatio::parse("9:16"), Some(AspectRatio::Portrait));
        assert_eq!(AspectRatio::parse("square"), None);
    }
}
