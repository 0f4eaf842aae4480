pub mod ai;
pub mod artifact;
pub mod config;
pub mod error;
pub mod features;
mod i18n;
pub mod job;
pub mod preferences;
pub mod push;
pub mod registry;
pub mod router;
pub mod state;
pub mod ui;
pub mod validation;

rust_i18n::i18n!("locales", fallback = "en");

pub use router::{error_ui, Command, Hub};

use config::HubConfig;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tokio::runtime::Runtime;

struct GlobalState {
    runtime: OnceLock<Runtime>,
    hub: OnceLock<Mutex<Hub>>,
}

impl GlobalState {
    const fn new() -> Self {
        Self {
            runtime: OnceLock::new(),
            hub: OnceLock::new(),
        }
    }

    fn runtime(&self) -> &Runtime {
        self.runtime.get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("toolhub-jobs")
                .enable_all()
                .build()
                .expect("failed to build job runtime")
        })
    }

    fn hub_lock(&self) -> MutexGuard<'_, Hub> {
        let hub = self.hub.get_or_init(|| {
            let config = HubConfig::from_env();
            log::info!("hub starting, data dir {}", config.data_dir.display());
            Mutex::new(Hub::from_config(self.runtime().handle().clone(), &config))
        });
        match hub.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("hub mutex poisoned, continuing");
                poisoned.into_inner()
            }
        }
    }
}

static STATE: GlobalState = GlobalState::new();

/// Single entry point for the host: one JSON command in, one JSON UI tree out.
pub fn dispatch(input: &str) -> String {
    let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let command: Command = serde_json::from_str(input).unwrap_or_else(|_| Command {
            action: "error".into(),
            error: Some("invalid_json".into()),
            ..Default::default()
        });
        STATE.hub_lock().handle_command(command)
    }));

    let json_value = match response {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => error_ui(&err),
        Err(_) => error_ui("panic"),
    };
    json_value.to_string()
}

/// C ABI wrapper around [`dispatch`]. Free the result with [`toolhub_free_string`].
///
/// # Safety
/// `input` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn toolhub_dispatch(input: *const c_char) -> *mut c_char {
    let input = if input.is_null() {
        "{}".to_string()
    } else {
        CStr::from_ptr(input).to_string_lossy().into_owned()
    };
    let output = dispatch(&input);
    CString::new(output)
        .or_else(|_| CString::new(error_ui("nul_in_output").to_string()))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// # Safety
/// `ptr` must come from [`toolhub_dispatch`] and not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn toolhub_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn call(input: &str) -> Value {
        serde_json::from_str(&dispatch(input)).expect("dispatch returns JSON")
    }

    #[test]
    fn invalid_json_renders_error() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        let ui = call("{not json");
        assert!(ui.to_string().contains("invalid_json"));
    }

    #[test]
    fn dispatch_selects_tools_through_the_global_hub() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        let ui = call(r#"{"action":"select_tool","tool":"pdfMerge"}"#);
        assert!(ui.to_string().contains("\"content_description\":\"pdfMerge\""));
        let ui = call(r#"{"action":"fetch_artifact","handle":"nope"}"#);
        assert_eq!(ui["children"][1]["text"], "invalid_handle:nope");
        call(r#"{"action":"reset"}"#);
    }

    #[test]
    fn c_abi_round_trip() {
        let _guard = TEST_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        let input = CString::new(r#"{"action":"init"}"#).unwrap();
        unsafe {
            let out = toolhub_dispatch(input.as_ptr());
            assert!(!out.is_null());
            let text = CStr::from_ptr(out).to_string_lossy().into_owned();
            assert!(text.starts_with('{'));
            toolhub_free_string(out);
        }
    }
}
