//! Header bar and categorised tool menu.

use super::auth::render_auth_dialog;
use crate::registry::CATEGORIES;
use crate::state::AppState;
use crate::ui::{node, Button, Column, Section, Text};
use rust_i18n::t;
use serde_json::Value;

pub fn render_header(state: &AppState) -> Value {
    let locale = state.locale.as_str();
    let title = t!("app.title", locale = locale);
    let tagline = t!("app.tagline", locale = locale);
    let theme = if state.dark_mode {
        t!("app.theme_light", locale = locale)
    } else {
        t!("app.theme_dark", locale = locale)
    };
    let theme_icon = if state.dark_mode { "☀️" } else { "🌙" };

    let mut children = vec![
        node(Text::new(&title).size(22.0)),
        node(Text::new(&tagline).size(12.0).tone("muted")),
        node(
            Button::new(theme_icon, "toggle_theme")
                .id("toggle_theme")
                .content_description(&theme),
        ),
    ];

    if state.push.subscribed {
        let subscribed = t!("app.subscribed", locale = locale);
        children.push(node(Text::new(&subscribed).tone("success")));
    } else {
        let subscribe = t!("app.subscribe", locale = locale);
        children.push(node(
            Button::new("🔔", "push_subscribe")
                .id("push_subscribe")
                .enabled(state.push.supported && !state.push.pending)
                .content_description(&subscribe),
        ));
    }
    if let Some(err) = &state.push.last_error {
        children.push(node(Text::new(err).size(12.0).tone("error")));
    }

    match &state.auth.user {
        Some(email) => {
            let signed_in = t!("app.signed_in", locale = locale, email = email);
            let logout = t!("app.logout", locale = locale);
            children.push(node(Text::new(&signed_in).size(12.0)));
            children.push(node(Button::new(&logout, "logout")));
        }
        None => {
            let login = t!("app.login", locale = locale);
            children.push(node(Button::new(&login, "auth_open").id("auth_open")));
        }
    }

    let mut header = vec![node(Column::new(children).padding(8))];
    if state.auth.open {
        header.push(render_auth_dialog(&state.auth));
    }
    node(Column::new(header))
}

/// Muted placeholder where a banner ad would sit, under the tool body.
pub fn render_banner_ad(locale: &str) -> Value {
    let title = t!("app.ad_title", locale = locale);
    let body = t!("app.ad_body", locale = locale);
    node(
        Column::new(vec![
            node(Text::new(&title).size(16.0).tone("muted")),
            node(Text::new(&body).size(12.0).tone("muted")),
        ])
        .padding(16)
        .content_description("banner_ad"),
    )
}

pub fn render_footer(locale: &str) -> Value {
    let rights = t!("app.rights", locale = locale);
    let retention = t!("app.retention", locale = locale);
    node(
        Column::new(vec![
            node(Text::new(&rights).size(12.0).tone("muted")),
            node(Text::new(&retention).size(12.0).tone("muted")),
        ])
        .padding(16)
        .content_description("footer"),
    )
}

/// One section per category. Only the open one lists its tools; the one holding the
/// active tool is highlighted.
pub fn render_navigation(state: &AppState) -> Value {
    let selected = state.selected();
    let sections = CATEGORIES
        .iter()
        .map(|category| {
            let expanded = state.open_category == Some(category.label);
            let highlighted = category.tools.iter().any(|(key, _)| *key == selected);
            let mut children = vec![node(
                Button::new(category.label, "toggle_category").bind("category", category.label),
            )];
            if expanded {
                for (key, name) in category.tools {
                    let marker = if *key == selected { "• " } else { "" };
                    let label = format!("{marker}{name}");
                    children.push(node(
                        Button::new(&label, "select_tool").bind("tool", key.as_str()),
                    ));
                }
            }
            node(
                Section::new(children)
                    .title(category.label)
                    .icon(category.icon)
                    .expanded(expanded)
                    .highlighted(highlighted),
            )
        })
        .collect();
    node(Column::new(sections).content_description("tool_navigation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolKey;
    use crate::state::ToolSession;

    #[test]
    fn active_category_is_highlighted() {
        let mut state = AppState::new();
        state.session = ToolSession::mount(ToolKey::PdfMerge);
        state.toggle_category("PDF Tools");
        let nav = render_navigation(&state);
        let sections = nav["children"].as_array().unwrap();
        assert_eq!(sections.len(), CATEGORIES.len());
        let pdf = sections
            .iter()
            .find(|s| s["title"] == "PDF Tools")
            .unwrap();
        assert_eq!(pdf["highlighted"], true);
        assert_eq!(pdf["expanded"], true);
        let dump = serde_json::to_string(pdf).unwrap();
        assert!(dump.contains("\"tool\":\"pdfMerge\""));

        let ai = sections.iter().find(|s| s["title"] == "AI Tools").unwrap();
        assert_eq!(ai["highlighted"], false);
        assert_eq!(ai["children"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn banner_and_footer_are_localised() {
        let ad = render_banner_ad("en");
        assert_eq!(ad["content_description"], "banner_ad");
        assert_eq!(ad["children"][0]["text"], "Advertisement");

        let footer = render_footer("is");
        assert_eq!(footer["content_description"], "footer");
        assert_eq!(
            footer["children"][1]["text"],
            "Skrám er eytt sjálfkrafa eftir eina klukkustund til að tryggja öryggi þitt."
        );
    }

    #[test]
    fn header_reflects_theme_and_login() {
        let mut state = AppState::new();
        state.dark_mode = true;
        state.auth.user = Some("me@example.com".into());
        let dump = serde_json::to_string(&render_header(&state)).unwrap();
        assert!(dump.contains("Light mode"));
        assert!(dump.contains("Signed in as me@example.com"));
        assert!(!dump.contains("auth_open"));
    }
}
