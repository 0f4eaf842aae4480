//! Speech synthesis is host-only; the core tracks playback flags and hands the host
//! one directive at a time.

use crate::error::HubError;
use crate::validation::require_text;

pub const SPEAK_EMPTY: &str = "Please enter some text to speak.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechDirective {
    Speak { text: String, voice: Option<String> },
    Resume,
    Pause,
    Stop,
}

impl SpeechDirective {
    pub fn name(&self) -> &'static str {
        match self {
            SpeechDirective::Speak { .. } => "speak",
            SpeechDirective::Resume => "resume",
            SpeechDirective::Pause => "pause",
            SpeechDirective::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechState {
    pub voices: Vec<String>,
    pub selected_voice: Option<String>,
    pub speaking: bool,
    pub paused: bool,
    pub error: Option<HubError>,
    pending: Option<SpeechDirective>,
}

impl SpeechState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `default_voice` is the one the host marks as default, if any.
    pub fn voices_loaded(&mut self, voices: Vec<String>, default_voice: Option<String>) {
        if voices.is_empty() {
            return;
        }
        let chosen = default_voice
            .filter(|v| voices.contains(v))
            .or_else(|| voices.first().cloned());
        self.voices = voices;
        self.selected_voice = chosen;
    }

    pub fn select_voice(&mut self, voice: &str) {
        if self.voices.iter().any(|v| v == voice) {
            self.selected_voice = Some(voice.to_string());
        }
    }

    pub fn speak(&mut self, text: &str) {
        if let Err(err) = require_text(text, SPEAK_EMPTY) {
            self.error = Some(err);
            return;
        }
        if self.speaking && !self.paused {
            return;
        }
        self.error = None;
        if self.paused {
            self.paused = false;
            self.pending = Some(SpeechDirective::Resume);
            return;
        }
        self.pending = Some(SpeechDirective::Speak {
            text: text.to_string(),
            voice: self.selected_voice.clone(),
        });
    }

    pub fn pause(&mut self) {
        if self.speaking && !self.paused {
            self.paused = true;
            self.pending = Some(SpeechDirective::Pause);
        }
    }

    pub fn stop(&mut self) {
        self.speaking = false;
        self.paused = false;
        self.pending = Some(SpeechDirective::Stop);
    }

    pub fn on_started(&mut self) {
        self.speaking = true;
    }

    pub fn on_paused(&mut self) {
        self.paused = true;
    }

    pub fn on_resumed(&mut self) {
        self.paused = false;
    }

    pub fn on_ended(&mut self) {
        self.speaking = false;
        self.paused = false;
    }

    pub fn on_error(&mut self, error: &str) {
        self.speaking = false;
        self.paused = false;
        self.error = Some(HubError::resource(format!(
            "An error occurred during speech synthesis: {error}"
        )));
    }

    pub fn pending(&self) -> Option<&SpeechDirective> {
        self.pending.as_ref()
    }

    /// Directives are delivered once.
    pub fn take_pending(&mut self) -> Option<SpeechDirective> {
        self.pending.take()
    }

    pub fn can_speak(&self, text: &str) -> bool {
        !text.trim().is_empty() && (!self.speaking || self.paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_voice_preferred_over_first() {
        let mut speech = SpeechState::new();
        speech.voices_loaded(vec!["A".into(), "B".into()], Some("B".into()));
        assert_eq!(speech.selected_voice.as_deref(), Some("B"));

        let mut speech = SpeechState::new();
        speech.voices_loaded(vec!["A".into(), "B".into()], None);
        assert_eq!(speech.selected_voice.as_deref(), Some("A"));
    }

    #[test]
    fn speak_then_pause_then_resume() {
        let mut speech = SpeechState::new();
        speech.speak("hello");
        assert_eq!(
            speech.take_pending(),
            Some(SpeechDirective::Speak {
                text: "hello".into(),
                voice: None
            })
        );
        assert!(speech.take_pending().is_none());

        speech.on_started();
        speech.speak("hello");
        assert!(speech.pending().is_none());

        speech.pause();
        assert_eq!(speech.take_pending(), Some(SpeechDirective::Pause));
        speech.speak("hello");
        assert_eq!(speech.take_pending(), Some(SpeechDirective::Resume));
        assert!(!speech.paused);
    }

    #[test]
    fn empty_text_sets_error() {
        let mut speech = SpeechState::new();
        speech.speak("   ");
        assert_eq!(speech.error, Some(HubError::validation(SPEAK_EMPTY)));
        assert!(speech.pending().is_none());
    }

    #[test]
    fn host_error_resets_flags() {
        let mut speech = SpeechState::new();
        speech.on_started();
        speech.on_error("synthesis-failed");
        assert!(!speech.speaking);
        assert_eq!(
            speech.error.as_ref().map(|e| e.to_string()),
            Some("An error occurred during speech synthesis: synthesis-failed".into())
        );
    }
}
