//! Final answer assembly from LLM output, search snippets, and directory matches

use serde::{Deserialize, Serialize};

use crate::DoctorRecord;

/// Maximum characters of page content kept per search hit
pub const SNIPPET_CONTENT_LIMIT: usize = 500;

/// Heading placed above directory matches
pub const SPECIALISTS_HEADING: &str = "Recommended specialists:";

/// Appended when the search capability failed and the answer lacks retrieved context
pub const REDUCED_CONFIDENCE_NOTE: &str = "Note: live search was unavailable, so this answer relies on general medical knowledge only and may be less complete. Please confirm important details with a healthcare professional.";

/// Returned when neither the LLM nor any capability produced content
pub const APOLOGY: &str = "Sorry, I couldn't put together an answer right now. Please try again shortly, and contact a healthcare professional if your concern is urgent.";

/// A normalized web-search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl Snippet {
    /// Build a snippet, truncating `content` to [`SNIPPET_CONTENT_LIMIT`] characters.
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: &str) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: truncate_content(content),
        }
    }

    /// Markdown rendering handed to the LLM and used as fallback answer text
    pub fn render(&self) -> String {
        format!(
            "## Title\n{}\n\n## Content (truncated)\n{}\n\n## Source\n{}",
            self.title, self.content, self.url
        )
    }
}

fn truncate_content(content: &str) -> String {
    let trimmed = content.trim();
    match trimmed.char_indices().nth(SNIPPET_CONTENT_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Merge everything the dispatcher gathered into one user-facing answer.
///
/// Directory matches come first under [`SPECIALISTS_HEADING`], then the LLM
/// text. Without LLM text the raw snippets stand in for it. The result is
/// never empty.
pub fn compose_answer(
    llm_output: Option<&str>,
    snippets: &[Snippet],
    doctors: &[DoctorRecord],
    degraded: bool,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !doctors.is_empty() {
        let lines: Vec<String> = doctors
            .iter()
            .map(|doctor| format!("- {}", doctor.summary()))
            .collect();
        sections.push(format!("{}\n{}", SPECIALISTS_HEADING, lines.join("\n")));
    }

    let llm_text = llm_output.map(str::trim).filter(|text| !text.is_empty());
    match llm_text {
        Some(text) => sections.push(text.to_string()),
        None if !snippets.is_empty() => {
            let rendered: Vec<String> = snippets.iter().map(Snippet::render).collect();
            sections.push(format!(
                "Here is what I found:\n\n{}",
                rendered.join("\n\n")
            ));
        }
        None if doctors.is_empty() => sections.push(APOLOGY.to_string()),
        None => {}
    }

    // Rendered snippets already carry their own source lines.
    if llm_text.is_some() && !snippets.is_empty() {
        let sources: Vec<String> = snippets
            .iter()
            .map(|snippet| format!("- {} ({})", snippet.title, snippet.url))
            .collect();
        sections.push(format!("Sources:\n{}", sources.join("\n")));
    }

    if degraded {
        sections.push(REDUCED_CONFIDENCE_NOTE.to_string());
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lee() -> DoctorRecord {
        DoctorRecord::new("Dr. Lee", "Cardiology", "9-5", "Clinic A", "lee@x.com")
    }

    #[test]
    fn snippet_content_is_truncated_on_char_boundary() {
        let long = "é".repeat(SNIPPET_CONTENT_LIMIT + 20);
        let snippet = Snippet::new("t", "https://example.org", &long);
        assert!(snippet.content.ends_with("..."));
        assert_eq!(
            snippet.content.chars().count(),
            SNIPPET_CONTENT_LIMIT + "...".len()
        );

        let short = Snippet::new("t", "u", "  brief  ");
        assert_eq!(short.content, "brief");
    }

    #[test]
    fn specialists_section_comes_first() {
        let answer = compose_answer(Some("See a cardiologist soon."), &[], &[lee()], false);
        assert!(answer.starts_with(SPECIALISTS_HEADING));
        assert!(answer.contains("Dr. Lee (Cardiology)"));
        assert!(answer.ends_with("See a cardiologist soon."));
    }

    #[test]
    fn snippets_stand_in_for_missing_llm_text() {
        let snippet = Snippet::new("Diabetes", "https://example.org/d", "Thirst and fatigue.");
        let answer = compose_answer(None, std::slice::from_ref(&snippet), &[], false);
        assert!(answer.contains("Thirst and fatigue."));
        assert!(!answer.contains("Sources:"));
        assert_eq!(answer.matches("https://example.org/d").count(), 1);
    }

    #[test]
    fn sources_follow_llm_text() {
        let snippet = Snippet::new("Diabetes", "https://example.org/d", "Thirst and fatigue.");
        let answer = compose_answer(
            Some("Watch for thirst."),
            std::slice::from_ref(&snippet),
            &[],
            false,
        );
        assert_eq!(
            answer,
            "Watch for thirst.\n\nSources:\n- Diabetes (https://example.org/d)"
        );
    }

    #[test]
    fn blank_llm_text_with_nothing_retrieved_apologizes() {
        assert_eq!(compose_answer(Some("   "), &[], &[], false), APOLOGY);
        assert_eq!(compose_answer(None, &[], &[], false), APOLOGY);
    }

    #[test]
    fn doctors_alone_are_a_complete_answer() {
        let answer = compose_answer(None, &[], &[lee()], false);
        assert!(answer.starts_with(SPECIALISTS_HEADING));
        assert!(!answer.contains(APOLOGY));
    }

    #[test]
    fn degraded_answer_carries_note() {
        let answer = compose_answer(Some("Drink water."), &[], &[], true);
        assert!(answer.starts_with("Drink water."));
        assert!(answer.ends_with(REDUCED_CONFIDENCE_NOTE));
    }
}
