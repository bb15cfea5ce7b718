//! Interpretation of assistant replies.
//!
//! A reply to a structured mitigation request should be a single JSON object
//! with a `categories` array. Anything that does not parse strictly as that
//! shape is shown as plain text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAdvice {
    pub name: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub physical: Vec<String>,
    #[serde(default)]
    pub biological: Vec<String>,
    #[serde(default)]
    pub chemical: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationAdvice {
    pub categories: Vec<CategoryAdvice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    StructuredAdvice(MitigationAdvice),
    PlainText(String),
}

impl AssistantReply {
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<MitigationAdvice>(text.trim()) {
            Ok(advice) => Self::StructuredAdvice(advice),
            Err(_) => Self::PlainText(text.to_string()),
        }
    }

    /// Text for display: rendered advice, or the plain reply with Markdown noise removed.
    pub fn render(&self) -> String {
        match self {
            Self::StructuredAdvice(advice) => advice.render(),
            Self::PlainText(text) => simplify_markdown(text),
        }
    }
}

impl CategoryAdvice {
    pub fn render(&self) -> String {
        let header = match self.count {
            Some(count) => format!("[{} ({})]", self.name, count),
            None => format!("[{}]", self.name),
        };
        format!(
            "{header}\nPhysical control\n{}\nBiological control\n{}\nChemical control\n{}\nOther advice\n{}",
            bullets(&self.physical),
            bullets(&self.biological),
            bullets(&self.chemical),
            bullets(&self.other),
        )
    }
}

impl MitigationAdvice {
    pub fn render(&self) -> String {
        self.categories
            .iter()
            .map(CategoryAdvice::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn bullets(points: &[String]) -> String {
    if points.is_empty() {
        return "• (no advice)".to_string();
    }
    points
        .iter()
        .map(|p| format!("• {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

struct MarkdownPatterns {
    table_row: Regex,
    rule: Regex,
    heading: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
    bullet: Regex,
    numbered: Regex,
    blank_runs: Regex,
}

fn patterns() -> &'static MarkdownPatterns {
    static PATTERNS: OnceLock<MarkdownPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkdownPatterns {
        table_row: Regex::new(r"(?m)^\s*\|.*\|\s*$").expect("valid regex"),
        rule: Regex::new(r"(?m)^(?:-{3,}|—+)\s*$").expect("valid regex"),
        heading: Regex::new(r"(?m)^\s*#{1,6}\s*").expect("valid regex"),
        bold: Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"),
        italic: Regex::new(r"\*(.*?)\*").expect("valid regex"),
        code: Regex::new(r"`([^`]*)`").expect("valid regex"),
        bullet: Regex::new(r"(?m)^\s*[-*+]\s+").expect("valid regex"),
        numbered: Regex::new(r"(?m)^\s*\d+\.[)\s]+").expect("valid regex"),
        blank_runs: Regex::new(r"\n{3,}").expect("valid regex"),
    })
}

/// Compress a Markdown-heavy reply into plain bullet text.
///
/// Drops table rows and horizontal rules, strips heading, emphasis and
/// inline-code markers, turns list prefixes into `• ` and collapses runs of
/// blank lines.
pub fn simplify_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let p = patterns();

    let s = text.replace("\r\n", "\n").replace('\r', "\n");
    let s = p.table_row.replace_all(&s, "");
    let s = p.rule.replace_all(&s, "");
    let s = p.heading.replace_all(&s, "");
    let s = p.bold.replace_all(&s, "$1");
    let s = p.italic.replace_all(&s, "$1");
    let s = p.code.replace_all(&s, "$1");
    let s = p.bullet.replace_all(&s, "• ");
    let s = p.numbered.replace_all(&s, "• ");
    let s = p.blank_runs.replace_all(&s, "\n\n");

    s.trim()
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_to_structured() {
        let text = r#"{"categories":[{"name":"aphid","count":3,"physical":["yellow sticky traps"],"biological":["ladybirds"],"chemical":[],"other":["remove weeds"]}]}"#;
        match AssistantReply::parse(text) {
            AssistantReply::StructuredAdvice(advice) => {
                assert_eq!(advice.categories.len(), 1);
                assert_eq!(advice.categories[0].count, Some(3));
                assert!(advice.categories[0].chemical.is_empty());
            }
            other => panic!("expected structured advice, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let reply = AssistantReply::parse(r#"{"categories":[{"name":"mite"}]}"#);
        let AssistantReply::StructuredAdvice(advice) = reply else {
            panic!("expected structured advice");
        };
        assert_eq!(advice.categories[0].count, None);
        assert!(advice.categories[0].physical.is_empty());
    }

    #[test]
    fn test_code_fenced_json_is_plain_text() {
        let text = "```json\n{\"categories\": []}\n```";
        assert_eq!(
            AssistantReply::parse(text),
            AssistantReply::PlainText(text.to_string())
        );
    }

    #[test]
    fn test_wrong_shape_is_plain_text() {
        assert!(matches!(
            AssistantReply::parse(r#"{"categories": "none"}"#),
            AssistantReply::PlainText(_)
        ));
        assert!(matches!(
            AssistantReply::parse(r#"{"advice": []}"#),
            AssistantReply::PlainText(_)
        ));
    }

    #[test]
    fn test_render_category() {
        let advice = CategoryAdvice {
            name: "aphid".into(),
            count: Some(3),
            physical: vec!["sticky traps".into(), "prune".into()],
            biological: vec![],
            chemical: vec!["imidacloprid".into()],
            other: vec![],
        };
        let rendered = advice.render();
        assert!(rendered.starts_with("[aphid (3)]\nPhysical control\n• sticky traps\n• prune"));
        assert!(rendered.contains("Biological control\n• (no advice)"));
        assert!(rendered.ends_with("Other advice\n• (no advice)"));
    }

    #[test]
    fn test_simplify_markdown() {
        let text = "## Treatment\r\n\r\n| a | b |\r\n---\r\n**Use** `neem` oil\r\n- spray weekly\r\n2. check leaves\r\n\r\n\r\n\r\nDone";
        assert_eq!(
            simplify_markdown(text),
            "Treatment\n\nUse neem oil\n• spray weekly\n• check leaves\n\nDone"
        );
    }

    #[test]
    fn test_simplify_empty() {
        assert_eq!(simplify_markdown(""), "");
    }
}
