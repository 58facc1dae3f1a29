// Prompt templates for resume analysis. `{resume}` is replaced with the extracted text.

pub const SUMMARY_PROMPT: &str = "\
    Summarize this resume, highlighting the candidate's skills, education, and experience:\n\n\
    {resume}";

pub const GAPS_PROMPT: &str = "\
    Analyze this resume and highlight missing skills, certifications, and experiences \
    needed for better job opportunities:\n\n\
    {resume}";

pub const ROADMAP_PROMPT: &str = "\
    Based on this resume, suggest a future roadmap to improve this person's career prospects \
    (skills to learn, certifications needed, industry exposure):\n\n\
    {resume}";

pub const KEYWORDS_PROMPT: &str = "\
    Based on this resume summary, suggest the best job titles and keywords for searching jobs. \
    Give a comma-separated list only, no explanation.\n\n\
    Summary: {resume}";

/// Fills the `{resume}` placeholder of `template`.
pub fn render(template: &str, resume_text: &str) -> String {
    template.replace("{resume}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_placeholder() {
        let prompt = render(SUMMARY_PROMPT, "Jane Doe, Rust engineer");
        assert!(prompt.ends_with("Jane Doe, Rust engineer"));
        assert!(!prompt.contains("{resume}"));
    }

    #[test]
    fn test_every_template_has_placeholder() {
        for template in [SUMMARY_PROMPT, GAPS_PROMPT, ROADMAP_PROMPT, KEYWORDS_PROMPT] {
            assert!(template.contains("{resume}"));
        }
    }
}
