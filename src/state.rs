use crate::error::HubError;
use crate::features::ai_tools::Language;
use crate::features::auth::AuthState;
use crate::features::online_media::AspectRatio;
use crate::features::text_to_speech::SpeechState;
use crate::features::{registry, HandlerKind};
use crate::job::{JobOutput, JobSlot};
use crate::push::PushState;
use crate::registry::{category_icon, BindingTarget, ToolKey, DEFAULT_TOOL, PLACEHOLDER_ICON};
use crate::validation::InputFile;

/// Everything a handler reads from its form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInputs {
    pub files: Vec<InputFile>,
    pub text: String,
    pub url: String,
    pub source_lang: Language,
    pub target_lang: Language,
    pub aspect: AspectRatio,
}

impl Default for ToolInputs {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            text: String::new(),
            url: String::new(),
            source_lang: Language::English,
            target_lang: Language::Spanish,
            aspect: AspectRatio::Portrait,
        }
    }
}

/// The mounted handler. Replaced wholesale on every tool switch.
pub struct ToolSession {
    pub key: ToolKey,
    pub name: String,
    pub icon: &'static str,
    pub handler: Option<HandlerKind>,
    pub inputs: ToolInputs,
    pub job: JobSlot,
    pub notice: Option<HubError>,
    pub info: Option<String>,
    pub copied: bool,
    pub speech: SpeechState,
}

impl ToolSession {
    pub fn mount(key: ToolKey) -> Self {
        let binding = registry().resolve(key);
        let icon = match &binding.target {
            BindingTarget::Placeholder { icon, .. } => *icon,
            BindingTarget::Implemented(_) => binding
                .category
                .and_then(category_icon)
                .unwrap_or(PLACEHOLDER_ICON),
        };
        Self {
            key: binding.key,
            name: binding.name.clone(),
            icon,
            handler: binding.handler().copied(),
            inputs: ToolInputs::default(),
            job: JobSlot::new(),
            notice: None,
            info: None,
            copied: false,
            speech: SpeechState::new(),
        }
    }

    pub fn clear_messages(&mut self) {
        self.notice = None;
        self.info = None;
    }

    /// Text result of a finished AI job.
    pub fn output_text(&self) -> Option<&str> {
        match self.job.output() {
            Some(JobOutput::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

pub struct AppState {
    pub session: ToolSession,
    pub open_category: Option<&'static str>,
    pub dark_mode: bool,
    pub push: PushState,
    pub auth: AuthState,
    pub last_error: Option<String>,
    /// Shell-level failure shown above the tool, cleared by the next command.
    pub alert: Option<HubError>,
    pub locale: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: ToolSession::mount(DEFAULT_TOOL),
            open_category: None,
            dark_mode: false,
            push: PushState::new(),
            auth: AuthState::new(),
            last_error: None,
            alert: None,
            locale: "en".into(),
        }
    }

    pub fn selected(&self) -> ToolKey {
        self.session.key
    }

    pub fn toggle_category(&mut self, label: &'static str) {
        if self.open_category == Some(label) {
            self.open_category = None;
        } else {
            self.open_category = Some(label);
        }
    }

    pub fn reset_runtime(&mut self) {
        self.open_category = None;
        self.last_error = None;
        self.alert = None;
        self.auth.close();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
