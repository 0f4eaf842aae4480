//! Login / sign-up dialog. Any non-empty pair is accepted; there is no backend.

use crate::ui::{node, Button, Card, Column, Text, TextInput};
use serde_json::Value;

pub const MISSING_CREDENTIALS: &str = "Please enter both email and password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    SignUp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub open: bool,
    pub mode: AuthMode,
    pub email: String,
    pub user: Option<String>,
    pub error: Option<String>,
}

impl AuthState {
    pub const fn new() -> Self {
        Self {
            open: false,
            mode: AuthMode::Login,
            email: String::new(),
            user: None,
            error: None,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::Login,
        };
        self.error = None;
    }

    pub fn submit(&mut self, email: &str, password: &str) -> bool {
        let email = email.trim();
        self.email = email.to_string();
        if email.is_empty() || password.is_empty() {
            self.error = Some(MISSING_CREDENTIALS.into());
            return false;
        }
        log::debug!(
            "simulated {} accepted",
            if self.mode == AuthMode::Login { "login" } else { "sign up" }
        );
        self.user = Some(email.to_string());
        self.error = None;
        self.open = false;
        true
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.email.clear();
    }
}

pub fn render_auth_dialog(auth: &AuthState) -> Value {
    let (title, submit, switch) = match auth.mode {
        AuthMode::Login => ("Welcome Back", "Login", "Need an account? Sign Up"),
        AuthMode::SignUp => (
            "Create Account",
            "Sign Up",
            "Already have an account? Login",
        ),
    };
    let mut children = vec![
        node(
            Text::new("This is a simulated auth screen. Any valid email/password will work.")
                .size(12.0)
                .tone("muted"),
        ),
        node(TextInput::new("email").text(&auth.email).hint("Email").single_line(true)),
        node(TextInput::new("password").hint("Password").single_line(true)),
    ];
    if let Some(err) = &auth.error {
        children.push(node(Text::new(err).tone("error")));
    }
    children.push(node(Button::new(submit, "auth_submit")));
    children.push(node(Button::new(switch, "auth_toggle_mode")));
    children.push(node(Button::new("Close", "auth_close")));
    node(Card::new(vec![node(Column::new(children).padding(12))]).title(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_rejected() {
        let mut auth = AuthState::new();
        auth.open();
        assert!(!auth.submit("me@example.com", ""));
        assert_eq!(auth.error.as_deref(), Some(MISSING_CREDENTIALS));
        assert!(auth.open);
    }

    #[test]
    fn any_pair_logs_in_and_closes() {
        let mut auth = AuthState::new();
        auth.open();
        auth.toggle_mode();
        assert_eq!(auth.mode, AuthMode::SignUp);
        assert!(auth.submit(" me@example.com ", "pw"));
        assert_eq!(auth.user.as_deref(), Some("me@example.com"));
        assert!(!auth.open);
        auth.logout();
        assert!(auth.user.is_none());
    }
}
