use crate::ai::{GeminiService, TextService};
use crate::artifact::{ArtifactHandle, ArtifactStore};
use crate::config::HubConfig;
use crate::error::HubError;
use crate::features::ai_tools::Language;
use crate::features::navigation::{render_banner_ad, render_footer, render_header, render_navigation};
use crate::features::online_media::AspectRatio;
use crate::features::text_to_speech::SpeechDirective;
use crate::features::{self, Launch};
use crate::i18n::update_locale;
use crate::job::{settle, JobOutput, JobRunner, JobUpdate};
use crate::preferences::{read_flag, write_flag, JsonFileStore, PreferenceStore, DARK_MODE_KEY};
use crate::push::PushRequest;
use crate::registry::{ToolKey, CATEGORIES, DEFAULT_TOOL};
use crate::state::{AppState, ToolSession};
use crate::ui::{error_panel, node, Column, Directive};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;

/// File content delivered by the host picker.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(default)]
    pub mime: String,
    pub data_base64: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Command {
    pub action: String,
    pub tool: Option<String>,
    pub category: Option<String>,
    pub files: Option<Vec<FilePayload>>,
    pub index: Option<usize>,
    pub handle: Option<String>,
    pub error: Option<String>,
    pub bindings: Option<HashMap<String, String>>,
    pub voices: Option<Vec<String>>,
    pub default_voice: Option<String>,
    pub supported: Option<bool>,
    pub subscription: Option<Value>,
    pub locale: Option<String>,
}

#[derive(Debug)]
enum Action {
    Init,
    Poll,
    Reset,
    SelectTool(ToolKey),
    ToggleCategory(&'static str),
    FilesSelected(Vec<crate::validation::InputFile>),
    FileReadFailed(String),
    RemoveFile(usize),
    Start,
    CancelJob,
    ClearJob,
    SwapLanguages,
    CopyOutput,
    ClipboardFailed(String),
    ClipboardPaste(String),
    FetchArtifact(String),
    ToggleTheme,
    PushCapability(bool),
    PushSubscribe,
    PushResult(Result<(), String>),
    AuthOpen,
    AuthClose,
    AuthToggleMode,
    AuthSubmit { email: String, password: String },
    Logout,
    SetLocale(String),
    VoicesLoaded {
        voices: Vec<String>,
        default_voice: Option<String>,
    },
    SpeechSpeak,
    SpeechPause,
    SpeechStop,
    SpeechStarted,
    SpeechPaused,
    SpeechResumed,
    SpeechEnded,
    SpeechError(String),
}

fn parse_action(command: Command) -> Result<Action, String> {
    let Command {
        action,
        tool,
        category,
        files,
        index,
        handle,
        error,
        bindings,
        voices,
        default_voice,
        supported,
        subscription,
        locale,
    } = command;

    let bindings = bindings.unwrap_or_default();
    let binding = |key: &str| bindings.get(key).cloned();

    match action.as_str() {
        "init" => Ok(Action::Init),
        "poll" => Ok(Action::Poll),
        "reset" => Ok(Action::Reset),
        "select_tool" => {
            let raw = tool.or_else(|| binding("tool")).ok_or("missing_tool")?;
            let key = ToolKey::from_key(raw.trim()).unwrap_or_else(|| {
                log::debug!("unknown tool {raw}, using {}", DEFAULT_TOOL.as_str());
                DEFAULT_TOOL
            });
            Ok(Action::SelectTool(key))
        }
        "toggle_category" => {
            let raw = category
                .or_else(|| binding("category"))
                .ok_or("missing_category")?;
            CATEGORIES
                .iter()
                .find(|c| c.label == raw)
                .map(|c| Action::ToggleCategory(c.label))
                .ok_or_else(|| format!("unknown_category:{raw}"))
        }
        "files_selected" => {
            let files = files
                .unwrap_or_default()
                .into_iter()
                .map(decode_file)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Action::FilesSelected(files))
        }
        "file_read_failed" => Ok(Action::FileReadFailed(
            error.unwrap_or_else(|| "unknown".into()),
        )),
        "remove_file" => {
            let index = match index {
                Some(i) => i,
                None => binding("index")
                    .ok_or("missing_index")?
                    .parse::<usize>()
                    .map_err(|e| format!("invalid_index:{e}"))?,
            };
            Ok(Action::RemoveFile(index))
        }
        "start" => Ok(Action::Start),
        "cancel_job" => Ok(Action::CancelJob),
        "clear_job" => Ok(Action::ClearJob),
        "swap_languages" => Ok(Action::SwapLanguages),
        "copy_output" => Ok(Action::CopyOutput),
        "clipboard_failed" => Ok(Action::ClipboardFailed(
            error.unwrap_or_else(|| "unknown".into()),
        )),
        "clipboard_paste" => Ok(Action::ClipboardPaste(
            binding("clipboard").ok_or("missing_clipboard")?,
        )),
        "fetch_artifact" => Ok(Action::FetchArtifact(
            handle.or_else(|| binding("handle")).ok_or("missing_handle")?,
        )),
        "toggle_theme" => Ok(Action::ToggleTheme),
        "push_capability" => Ok(Action::PushCapability(supported.unwrap_or(false))),
        "push_subscribe" => Ok(Action::PushSubscribe),
        "push_result" => {
            let outcome = match (error, subscription) {
                (Some(err), _) => Err(err),
                (None, Some(_)) => Ok(()),
                (None, None) => Err("push_result_missing".into()),
            };
            Ok(Action::PushResult(outcome))
        }
        "auth_open" => Ok(Action::AuthOpen),
        "auth_close" => Ok(Action::AuthClose),
        "auth_toggle_mode" => Ok(Action::AuthToggleMode),
        "auth_submit" => Ok(Action::AuthSubmit {
            email: binding("email").unwrap_or_default(),
            password: binding("password").unwrap_or_default(),
        }),
        "logout" => Ok(Action::Logout),
        "set_locale" => Ok(Action::SetLocale(
            locale.or_else(|| binding("locale")).unwrap_or_default(),
        )),
        "voices_loaded" => Ok(Action::VoicesLoaded {
            voices: voices.unwrap_or_default(),
            default_voice,
        }),
        "speech_speak" => Ok(Action::SpeechSpeak),
        "speech_pause" => Ok(Action::SpeechPause),
        "speech_stop" => Ok(Action::SpeechStop),
        "speech_started" => Ok(Action::SpeechStarted),
        "speech_paused" => Ok(Action::SpeechPaused),
        "speech_resumed" => Ok(Action::SpeechResumed),
        "speech_ended" => Ok(Action::SpeechEnded),
        "speech_error" => Ok(Action::SpeechError(
            error.unwrap_or_else(|| "unknown".into()),
        )),
        other => Err(error.unwrap_or_else(|| format!("unknown_action:{other}"))),
    }
}

fn decode_file(payload: FilePayload) -> Result<crate::validation::InputFile, String> {
    let bytes = general_purpose::STANDARD
        .decode(payload.data_base64.as_bytes())
        .map_err(|e| format!("invalid_file_data:{}:{e}", payload.name))?;
    Ok(crate::validation::InputFile::new(payload.name, payload.mime, bytes))
}

/// Owns everything a host session needs: UI state, running jobs, artifacts and
/// the services jobs call out to.
pub struct Hub {
    state: AppState,
    runner: JobRunner,
    artifacts: ArtifactStore,
    text_service: Arc<dyn TextService>,
    preferences: Box<dyn PreferenceStore>,
}

impl Hub {
    pub fn new(
        runtime: Handle,
        text_service: Arc<dyn TextService>,
        preferences: Box<dyn PreferenceStore>,
    ) -> Self {
        let mut state = AppState::new();
        match read_flag(preferences.as_ref(), DARK_MODE_KEY) {
            Ok(Some(dark)) => state.dark_mode = dark,
            Ok(None) => {}
            Err(err) => log::warn!("could not read theme preference: {err}"),
        }
        Self {
            state,
            runner: JobRunner::new(runtime),
            artifacts: ArtifactStore::new(),
            text_service,
            preferences,
        }
    }

    pub fn from_config(runtime: Handle, config: &HubConfig) -> Self {
        let service = GeminiService::new(config.api_key.clone())
            .with_base_url(config.ai_base_url.clone())
            .with_model(config.ai_model.clone());
        if !service.is_configured() {
            log::warn!("no API key configured; AI tools will report it");
        }
        let store = JsonFileStore::new(config.preferences_path());
        Self::new(runtime, Arc::new(service), Box::new(store))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.preferences.as_ref()
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Value, String> {
        self.apply_job_events();

        let bindings = command.bindings.clone().unwrap_or_default();
        let action = match parse_action(command) {
            Ok(action) => action,
            Err(err) => {
                log::debug!("command rejected: {err}");
                self.state.last_error = Some(err);
                return Ok(self.render(Vec::new()));
            }
        };
        self.state.last_error = None;
        self.state.alert = None;
        self.apply_bindings(&bindings);

        let mut directives = Vec::new();
        match action {
            Action::Init | Action::Poll => {}
            Action::Reset => {
                self.unmount();
                self.state.session = ToolSession::mount(DEFAULT_TOOL);
                self.state.reset_runtime();
            }
            Action::SelectTool(key) => self.select_tool(key),
            Action::ToggleCategory(label) => self.state.toggle_category(label),
            Action::FilesSelected(files) => {
                let session = &mut self.state.session;
                session.copied = false;
                features::accept_files(session, files, &mut self.artifacts);
            }
            Action::FileReadFailed(err) => {
                log::warn!("host could not read the file: {err}");
                self.state.session.notice =
                    Some(HubError::resource("An error occurred while reading the file."));
            }
            Action::RemoveFile(index) => {
                if let Err(err) = features::remove_file(&mut self.state.session, index) {
                    self.state.last_error = Some(err);
                }
            }
            Action::Start => self.start(),
            Action::CancelJob => self.cancel_job(),
            Action::ClearJob => self.clear_job(),
            Action::SwapLanguages => self.swap_languages(),
            Action::CopyOutput => {
                let session = &mut self.state.session;
                if session.output_text().is_some() {
                    session.copied = true;
                }
            }
            Action::ClipboardFailed(err) => {
                log::warn!("clipboard write failed: {err}");
                let session = &mut self.state.session;
                session.copied = false;
                session.notice = Some(HubError::resource("Failed to copy text to the clipboard."));
            }
            Action::ClipboardPaste(text) => self.state.session.inputs.text = text,
            Action::FetchArtifact(raw) => {
                let handle =
                    ArtifactHandle::parse(&raw).ok_or_else(|| format!("invalid_handle:{raw}"))?;
                return self.artifacts.payload(handle);
            }
            Action::ToggleTheme => {
                self.state.dark_mode = !self.state.dark_mode;
                if let Err(err) =
                    write_flag(self.preferences.as_mut(), DARK_MODE_KEY, self.state.dark_mode)
                {
                    log::warn!("theme preference not saved: {err}");
                    self.state.alert =
                        Some(HubError::resource("Could not save your theme preference."));
                }
            }
            Action::PushCapability(supported) => self.state.push.set_supported(supported),
            Action::PushSubscribe => match self.state.push.request() {
                PushRequest::Subscribe => directives.push(node(Directive::new("push_subscribe"))),
                other => log::debug!("push subscribe skipped: {other:?}"),
            },
            Action::PushResult(outcome) => self.state.push.resolve(outcome),
            Action::AuthOpen => self.state.auth.open(),
            Action::AuthClose => self.state.auth.close(),
            Action::AuthToggleMode => self.state.auth.toggle_mode(),
            Action::AuthSubmit { email, password } => {
                self.state.auth.submit(&email, &password);
            }
            Action::Logout => self.state.auth.logout(),
            Action::SetLocale(locale) => update_locale(&mut self.state, &locale),
            Action::VoicesLoaded {
                voices,
                default_voice,
            } => self.state.session.speech.voices_loaded(voices, default_voice),
            Action::SpeechSpeak => {
                let session = &mut self.state.session;
                session.speech.speak(&session.inputs.text);
            }
            Action::SpeechPause => self.state.session.speech.pause(),
            Action::SpeechStop => self.state.session.speech.stop(),
            Action::SpeechStarted => self.state.session.speech.on_started(),
            Action::SpeechPaused => self.state.session.speech.on_paused(),
            Action::SpeechResumed => self.state.session.speech.on_resumed(),
            Action::SpeechEnded => self.state.session.speech.on_ended(),
            Action::SpeechError(err) => self.state.session.speech.on_error(&err),
        }

        if let Some(speech) = self.state.session.speech.take_pending() {
            let directive = match &speech {
                SpeechDirective::Speak { text, voice } => Directive::new(speech.name())
                    .text(text)
                    .voice(voice.as_deref()),
                _ => Directive::new(speech.name()),
            };
            directives.push(node(directive));
        }
        Ok(self.render(directives))
    }

    /// Folds queued task events into the mounted tool's job.
    pub fn apply_job_events(&mut self) {
        for event in self.runner.drain() {
            if let JobUpdate::Finished(Err(err)) = &event.update {
                log::warn!("job {} failed: {err}", event.job_id);
            }
            let session = &mut self.state.session;
            if let Some(deliverable) = session.job.apply(event) {
                settle(&mut session.job, deliverable, &mut self.artifacts);
                log::debug!("{} ready", session.key.as_str());
            }
        }
    }

    fn apply_bindings(&mut self, bindings: &HashMap<String, String>) {
        let session = &mut self.state.session;
        if let Some(text) = bindings.get("text_input") {
            session.inputs.text = text.clone();
        }
        if let Some(url) = bindings.get("url_input") {
            session.inputs.url = url.clone();
        }
        if let Some(lang) = bindings.get("source_lang").and_then(|l| Language::from_label(l)) {
            session.inputs.source_lang = lang;
        }
        if let Some(lang) = bindings.get("target_lang").and_then(|l| Language::from_label(l)) {
            session.inputs.target_lang = lang;
        }
        if let Some(aspect) = bindings.get("aspect_ratio").and_then(|a| AspectRatio::parse(a)) {
            session.inputs.aspect = aspect;
        }
        if let Some(voice) = bindings.get("speech_voice") {
            session.speech.select_voice(voice);
        }
    }

    fn select_tool(&mut self, key: ToolKey) {
        self.unmount();
        self.state.session = ToolSession::mount(key);
        self.state.open_category = None;
        log::info!("selected {}", self.state.session.key.as_str());
    }

    /// Stops the mounted job and revokes whatever it produced.
    fn unmount(&mut self) {
        let session = &mut self.state.session;
        if let Some(id) = session.job.cancel() {
            self.runner.discard(id);
        }
        if let Some(id) = session.job.clear(&mut self.artifacts) {
            self.runner.discard(id);
        }
    }

    fn start(&mut self) {
        let session = &mut self.state.session;
        let Some(kind) = session.handler else {
            log::debug!("start ignored on placeholder {}", session.key.as_str());
            return;
        };
        if !session.job.begin() {
            log::debug!("start ignored while {}", session.job.status().label());
            return;
        }
        session.clear_messages();
        session.copied = false;

        let launch = features::validate(kind, &session.inputs)
            .and_then(|()| features::build_job(kind, &session.inputs, &self.text_service));
        match launch {
            Ok(Launch::Job(spec)) => {
                let ticket = self.runner.launch(spec);
                log::debug!("{} running as job {}", session.key.as_str(), ticket.id());
                session.job.attach(ticket);
            }
            Ok(Launch::Speak) => {
                session.job.clear(&mut self.artifacts);
                session.speech.speak(&session.inputs.text);
            }
            Err(err) => session.job.fail(err),
        }
    }

    fn cancel_job(&mut self) {
        if let Some(id) = self.state.session.job.cancel() {
            let dropped = self.runner.discard(id);
            log::debug!("job {id} cancelled, {dropped} queued events dropped");
        }
    }

    fn clear_job(&mut self) {
        let session = &mut self.state.session;
        if let Some(id) = session.job.clear(&mut self.artifacts) {
            self.runner.discard(id);
        }
        session.inputs.files.clear();
        session.inputs.text.clear();
        session.inputs.url.clear();
        session.copied = false;
        session.clear_messages();
    }

    fn swap_languages(&mut self) {
        let session = &mut self.state.session;
        if session.job.status().is_busy() {
            return;
        }
        let inputs = &mut session.inputs;
        std::mem::swap(&mut inputs.source_lang, &mut inputs.target_lang);
        let Some(translated) = session.output_text().map(str::to_string) else {
            return;
        };
        let previous = std::mem::replace(&mut session.inputs.text, translated);
        session.job.clear(&mut self.artifacts);
        if !previous.trim().is_empty() {
            session.job.complete(JobOutput::Text(previous));
        }
        session.copied = false;
    }

    fn render(&self, directives: Vec<Value>) -> Value {
        let state = &self.state;
        let mut children = vec![render_header(state), render_navigation(state)];
        if let Some(err) = &state.last_error {
            children.push(error_panel(err, "command_error"));
        }
        if let Some(alert) = &state.alert {
            children.push(error_panel(&alert.to_string(), alert.kind()));
        }
        let body = features::render_tool(&state.session, &self.artifacts, &state.locale);
        children.push(node(
            Column::new(body)
                .padding(16)
                .content_description(state.session.key.as_str()),
        ));
        children.push(render_banner_ad(&state.locale));
        children.push(render_footer(&state.locale));
        children.extend(directives);
        let theme = if state.dark_mode { "dark" } else { "light" };
        node(Column::new(children).theme(theme))
    }
}

pub fn error_ui(message: &str) -> Value {
    json!({
        "type": "Column",
        "padding": 24,
        "children": [
            { "type": "Text", "text": "Error", "size": 18.0 },
            { "type": "Text", "text": message }
        ]
    })
}
