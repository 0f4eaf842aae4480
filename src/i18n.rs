use crate::state::AppState;

/// Languages with a locale file.
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "is"];

/// Switches the shell language. Renders pass `state.locale` explicitly; the
/// global locale only covers lookups that do not.
pub fn update_locale(state: &mut AppState, requested: &str) {
    let locale = normalize_locale(requested);
    if state.locale != locale {
        log::debug!("locale {} -> {locale}", state.locale);
    }
    state.locale = locale.to_string();
    rust_i18n::set_locale(locale);
}

/// Reduces a BCP-47 tag (`is-IS`, `en_GB`) to a supported language, else English.
pub fn normalize_locale(requested: &str) -> &'static str {
    let lower = requested.trim().to_ascii_lowercase().replace('_', "-");
    let lang = lower.split('-').next().unwrap_or_default();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| *supported == lang)
        .unwrap_or("en")
}
