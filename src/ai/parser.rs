use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•]|\d+[.)])\s+(.+)$").expect("valid bullet pattern")
});

/// Headers longer than this are treated as prose, not section titles.
const MAX_HEADER_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Insights,
    Recommendations,
    Risks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInsights {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_warnings: Vec<String>,
}

impl ParsedInsights {
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.recommendations.is_empty() && self.risk_warnings.is_empty()
    }

    fn push(&mut self, section: Section, line: String) {
        match section {
            Section::Insights => self.insights.push(line),
            Section::Recommendations => self.recommendations.push(line),
            Section::Risks => self.risk_warnings.push(line),
        }
    }
}

fn strip_markdown(line: &str) -> String {
    line.replace("**", "")
        .trim_start_matches('#')
        .trim()
        .to_string()
}

fn header_section(line: &str) -> Option<Section> {
    let text = strip_markdown(line);
    let text = text.trim_end_matches(':').trim();
    if text.is_empty() || text.chars().count() > MAX_HEADER_CHARS {
        return None;
    }
    let lower = text.to_lowercase();
    if lower.contains("recommend") || lower.contains("action") || lower.contains("suggestion") {
        Some(Section::Recommendations)
    } else if lower.contains("risk") || lower.contains("warning") {
        Some(Section::Risks)
    } else if lower.contains("insight") || lower.contains("finding") || lower.contains("observation") {
        Some(Section::Insights)
    } else {
        None
    }
}

/// Splits free-form model output into insight, recommendation and risk
/// lists. Lines before any header count as insights.
pub fn parse_response(text: &str) -> ParsedInsights {
    let mut parsed = ParsedInsights::default();
    let mut section = Section::Insights;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = BULLET.captures(line) {
            let item = strip_markdown(&caps[1]);
            if !item.is_empty() {
                parsed.push(section, item);
            }
            continue;
        }

        if let Some(next) = header_section(line) {
            section = next;
            continue;
        }

        let prose = strip_markdown(line);
        if !prose.is_empty() {
            parsed.push(section, prose);
        }
    }
    parsed
}
