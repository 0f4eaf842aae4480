use crate::ui::{heading, node, Card, Text};
use serde_json::Value;

pub fn render_coming_soon(name: &str, icon: &str) -> Vec<Value> {
    let mut children = heading(name, "This tool is currently under development.");
    let blurb = format!(
        "We're working hard to bring you the best {} experience. Check back soon for updates!",
        name.to_lowercase()
    );
    children.push(node(
        Card::new(vec![
            node(Text::new(icon).size(48.0)),
            node(Text::new("Coming Soon!").size(20.0)),
            node(Text::new(&blurb).tone("muted")),
        ])
        .title(name),
    ));
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_names_the_tool() {
        let nodes = render_coming_soon("CAD Converter", "🔧");
        let dump = serde_json::to_string(&nodes).unwrap();
        assert!(dump.contains("Coming Soon!"));
        assert!(dump.contains("best cad converter experience"));
        assert!(dump.contains("🔧"));
    }
}
