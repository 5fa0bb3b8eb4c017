// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting template helpers.

/// The only placeholder a prompt template may carry.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Placeholders the model tends to invent instead of `{question}`.
const ALIAS_PLACEHOLDERS: [&str; 3] = ["{problem}", "{statement}", "{prompt}"];

/// Connectivity check question.
pub const PING_PROMPT: &str = "What is 2+2?";

/// Substitutes every `{question}` in `template`. Other braces are left untouched.
pub fn fill_template(template: &str, question: &str) -> String {
    template.replace(QUESTION_PLACEHOLDER, question)
}

/// Normalizes a model-written template: alias placeholders become `{question}`,
/// double quotes are stripped, surrounding whitespace trimmed.
pub fn normalize_template(raw: &str) -> String {
    let mut template = raw.trim().to_string();
    for alias in ALIAS_PLACEHOLDERS {
        template = template.replace(alias, QUESTION_PLACEHOLDER);
    }
    template.replace('"', "").trim().to_string()
}

/// First `max_chars` characters of `text` (never splits a UTF-8 code point).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_every_placeholder() {
        let out = fill_template("Q: {question}\nAgain: {question}", "2+2?");
        assert_eq!(out, "Q: 2+2?\nAgain: 2+2?");
    }

    #[test]
    fn test_fill_template_leaves_other_braces() {
        let out = fill_template("Return {answer} for {question}", "x");
        assert_eq!(out, "Return {answer} for x");
    }

    #[test]
    fn test_normalize_template_rewrites_aliases_and_quotes() {
        let raw = "  \"Solve {problem} carefully. Check {statement} and {prompt}.\"  ";
        assert_eq!(
            normalize_template(raw),
            "Solve {question} carefully. Check {question} and {question}."
        );
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
