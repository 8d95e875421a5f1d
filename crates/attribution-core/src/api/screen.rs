//! Bootstrap data scraped from the attribution page.
//!
//! Sections and referents are rendered into the page by the server and are
//! not available from any JSON endpoint. Referent labels carry their running
//! count as `"<Name> (<count>)"`; they are parsed here once and handled as
//! numeric counts everywhere else.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Referent, Section};
use crate::utils::decode_entities;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionScreen {
    pub sections: Vec<Section>,
    pub referents: Vec<Referent>,
    pub csrf_token: Option<String>,
}

fn option_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<option[^>]*\bvalue="(\d+)"[^>]*>(.*?)</option>"#)
            .expect("option pattern")
    })
}

fn csrf_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"name="csrfmiddlewaretoken"\s+value="([^"]+)""#).expect("csrf pattern")
    })
}

/// Inner markup of the `<select id="...">` element, if present.
fn select_body<'a>(html: &'a str, select_id: &str) -> Option<&'a str> {
    let pattern = format!(
        r#"(?s)<select[^>]*\bid="{}"[^>]*>(.*?)</select>"#,
        regex::escape(select_id)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(html)?;
    caps.get(1).map(|m| m.as_str())
}

/// `(value, text)` pairs of a select, skipping the empty placeholder.
fn select_options(html: &str, select_id: &str) -> Vec<(i64, String)> {
    let Some(body) = select_body(html, select_id) else {
        return Vec::new();
    };
    option_pattern()
        .captures_iter(body)
        .filter_map(|caps| {
            let id = caps[1].parse().ok()?;
            Some((id, decode_entities(caps[2].trim())))
        })
        .collect()
}

impl AttributionScreen {
    pub fn parse(html: &str) -> Self {
        let sections = select_options(html, "section_select")
            .into_iter()
            .map(|(id, label)| Section { id, label })
            .collect();

        let referents = select_options(html, "referent_select")
            .into_iter()
            .map(|(id, label)| Referent::from_label(id, &label))
            .collect();

        let csrf_token = csrf_pattern()
            .captures(html)
            .map(|caps| caps[1].to_string());

        Self {
            sections,
            referents,
            csrf_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<form><input type="hidden" name="csrfmiddlewaretoken" value="Xk29aBc">
<select id="section_select" name="section">
  <option value="">-------</option>
  <option value="1">ASE</option>
  <option value="2" selected>ASSC &amp; EDE</option>
</select>
<select id="period_select"></select>
<select id="referent_select">
  <option value="">-------</option>
  <option value="3">Besson Claire (4)</option>
  <option value="8">Jacot Paul (0)</option>
</select>
</form>"#;

    #[test]
    fn test_parse_sections() {
        let screen = AttributionScreen::parse(PAGE);
        assert_eq!(
            screen.sections,
            vec![
                Section { id: 1, label: "ASE".to_string() },
                Section { id: 2, label: "ASSC & EDE".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_referents_and_token() {
        let screen = AttributionScreen::parse(PAGE);
        assert_eq!(screen.referents.len(), 2);
        assert_eq!(screen.referents[0], Referent::new(3, "Besson Claire", 4));
        assert_eq!(screen.referents[1].assigned_count, 0);
        assert_eq!(screen.csrf_token.as_deref(), Some("Xk29aBc"));
    }

    #[test]
    fn test_parse_page_without_selects() {
        let screen = AttributionScreen::parse("<html><body>Login required</body></html>");
        assert_eq!(screen, AttributionScreen::default());
    }
}
