//! Domain-specific correctness heuristics.
//!
//! Pure functions, no LLM calls. Every check lowercases and trims both sides first.

use std::sync::OnceLock;

use regex::Regex;

use crate::datasets::Domain;

/// Relative tolerance for numeric answers, plus a small absolute slack.
const MATH_RELATIVE_TOLERANCE: f64 = 0.05;
const MATH_ABSOLUTE_SLACK: f64 = 0.1;
/// How many trailing numbers in a response are considered candidate answers.
const MATH_TRAILING_CANDIDATES: usize = 3;

const TRUE_WORDS: [&str; 3] = ["true", "yes", "correct"];
const FALSE_WORDS: [&str; 3] = ["false", "no", "incorrect"];

const FACT_TRUE_WORDS: [&str; 4] = ["true", "correct", "supported", "verified"];
const FACT_FALSE_WORDS: [&str; 4] = ["false", "incorrect", "contradicted", "wrong"];
const FACT_PARTIAL_WORDS: [&str; 4] = ["partial", "mixed", "some", "half"];

/// Python keywords (and soft keywords) that may legally sit next to an identifier.
const PYTHON_KEYWORDS: [&str; 38] = [
    "false", "none", "true", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "match", "case", "type",
];

/// Statements that open a block and need a `:`.
const COMPOUND_KEYWORDS: [&str; 11] = [
    "def", "class", "if", "elif", "else", "for", "while", "with", "try", "except", "finally",
];
/// Headers that are a single keyword before the `:`.
const BARE_HEADERS: [&str; 4] = ["else", "try", "finally", "except"];

/// Returns whether `response` answers `expected` for the given domain.
pub fn check_correctness(response: &str, expected: &str, domain: Domain) -> bool {
    let response = response.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();

    match domain {
        Domain::Math => check_math(&response, &expected),
        Domain::Reasoning => check_reasoning(&response, &expected),
        Domain::FactVerification => check_fact(&response, &expected),
        Domain::Code => check_code(&response),
    }
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+\.?\d*").expect("valid number regex"))
}

fn extract_numbers(text: &str) -> Vec<f64> {
    number_regex()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

fn check_math(response: &str, expected: &str) -> bool {
    // The final answer follows the last "=" when the reference shows its working.
    let expected_answer = match expected.rsplit_once('=') {
        Some((_, tail)) => tail.trim(),
        None => expected,
    };

    let Some(&expected_value) = extract_numbers(expected_answer).first() else {
        return false;
    };

    let response_values = extract_numbers(response);
    let start = response_values.len().saturating_sub(MATH_TRAILING_CANDIDATES);
    let tolerance = expected_value.abs() * MATH_RELATIVE_TOLERANCE + MATH_ABSOLUTE_SLACK;

    response_values[start..]
        .iter()
        .any(|v| (v - expected_value).abs() < tolerance)
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn check_reasoning(response: &str, expected: &str) -> bool {
    let expects_true = if contains_any(expected, &["true", "yes", "correct", "1"]) {
        true
    } else if contains_any(expected, &["false", "no", "0"]) {
        false
    } else {
        return false;
    };

    if expects_true {
        contains_any(response, &TRUE_WORDS)
    } else {
        contains_any(response, &FALSE_WORDS)
    }
}

#[derive(Debug, PartialEq)]
enum Verdict {
    True,
    False,
    Partial,
}

fn check_fact(response: &str, expected: &str) -> bool {
    let expected_verdict = if contains_any(
        expected,
        &["true", "correct", "supported", "verified", "4", "3"],
    ) {
        Verdict::True
    } else if contains_any(expected, &["false", "incorrect", "contradicted", "0", "1"]) {
        Verdict::False
    } else {
        Verdict::Partial
    };

    let has_true = contains_any(response, &FACT_TRUE_WORDS);
    let has_false = contains_any(response, &FACT_FALSE_WORDS);
    let has_partial = contains_any(response, &FACT_PARTIAL_WORDS);

    match expected_verdict {
        Verdict::True => has_true && !has_false,
        Verdict::False => has_false && !has_true,
        Verdict::Partial => has_partial || (!has_true && !has_false),
    }
}

fn check_code(response: &str) -> bool {
    looks_like_python(response) && (response.contains("def ") || response.contains("return"))
}

/// Lexical approximation of "this parses as Python".
///
/// Rejects: markdown fences, unterminated strings, unbalanced brackets, a `!`
/// outside `!=`, and two adjacent operands on one line (`here is`,
/// `3 apples`). Logical lines then go through `check_blocks`.
pub(crate) fn looks_like_python(source: &str) -> bool {
    if source.trim().is_empty() || source.contains('`') {
        return false;
    }

    let chars: Vec<char> = source.chars().collect();
    let mut stack: Vec<char> = Vec::new();
    // Source with comments dropped, strings collapsed to `0`, and lines
    // joined inside brackets and after `\`.
    let mut logical = String::with_capacity(source.len());
    let mut prev_operand = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                logical.push(' ');
                i += 2;
                continue;
            }
            '\n' => {
                logical.push(if stack.is_empty() { '\n' } else { ' ' });
                prev_operand = false;
            }
            '\'' | '"' => {
                let triple = i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c;
                match skip_string(&chars, i, c, triple) {
                    Some(next) => i = next,
                    None => return false,
                }
                logical.push('0');
                prev_operand = false;
                continue;
            }
            '(' | '[' | '{' => {
                stack.push(c);
                logical.push(c);
                prev_operand = false;
            }
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(open) {
                    return false;
                }
                logical.push(c);
                prev_operand = false;
            }
            '!' if chars.get(i + 1) != Some(&'=') => return false,
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                let numeric = chars[start].is_ascii_digit();
                while i < chars.len()
                    && (chars[i].is_alphanumeric()
                        || chars[i] == '_'
                        || (numeric && chars[i] == '.'))
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let is_keyword = PYTHON_KEYWORDS.contains(&word.as_str());
                if !is_keyword && prev_operand {
                    return false;
                }
                logical.push_str(&word);
                prev_operand = !is_keyword;
                continue;
            }
            c if c.is_whitespace() => logical.push(c),
            _ => {
                logical.push(c);
                prev_operand = false;
            }
        }
        i += 1;
    }

    stack.is_empty() && check_blocks(&logical)
}

/// Indentation rules over logical lines: a header ending in `:` must be
/// followed by a deeper line, other lines may not indent, and a dedent must
/// return to an enclosing level.
fn check_blocks(logical: &str) -> bool {
    let mut levels = vec![0usize];
    let mut expect_block = false;

    for line in logical.lines() {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let top = levels.last().copied().unwrap_or(0);

        if expect_block {
            if indent <= top {
                return false;
            }
            levels.push(indent);
        } else if indent > top {
            return false;
        } else {
            while levels.last().is_some_and(|&level| level > indent) {
                levels.pop();
            }
            if levels.last() != Some(&indent) {
                return false;
            }
        }

        expect_block = match classify_line(text) {
            Some(opens_block) => opens_block,
            None => return false,
        };
    }

    !expect_block
}

/// `Some(true)` opens a block, `Some(false)` is a simple or one-line
/// compound statement, `None` is not Python.
fn classify_line(text: &str) -> Option<bool> {
    if let Some(head) = text.strip_suffix(':') {
        let head = head.trim_end();
        let bare_word = !head.is_empty() && head.chars().all(|c| c.is_alphanumeric() || c == '_');
        return if bare_word && !BARE_HEADERS.contains(&head) {
            None
        } else {
            Some(true)
        };
    }

    let mut word = leading_word(text);
    if word == "async" {
        word = leading_word(text["async".len()..].trim_start());
    }
    if COMPOUND_KEYWORDS.contains(&word) && !has_top_level_colon(text) {
        return None;
    }
    Some(false)
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn has_top_level_colon(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

/// Returns the index just past the closing quote, or `None` if unterminated.
fn skip_string(chars: &[char], start: usize, quote: char, triple: bool) -> Option<usize> {
    let mut i = if triple { start + 3 } else { start + 1 };
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' if !triple => return None,
            c if c == quote => {
                if !triple {
                    return Some(i + 1);
                }
                if i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote {
                    return Some(i + 3);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_matches_number_after_last_equals() {
        let expected = "She has 3 + 4 = 7 apples, so 7 * 2 = 14";
        assert!(check_correctness("... so the answer is 14.", expected, Domain::Math));
        assert!(!check_correctness("The answer is 15.", expected, Domain::Math));
    }

    #[test]
    fn test_math_uses_only_last_three_numbers() {
        let expected = "#### 42";
        // 42 appears early but is followed by three other numbers
        let response = "42 was a guess. Actually 10, 20, 30.";
        assert!(!check_correctness(response, expected, Domain::Math));
        assert!(check_correctness("1 2 42", expected, Domain::Math));
    }

    #[test]
    fn test_math_tolerance_is_five_percent_plus_slack() {
        let expected = "#### 100";
        assert!(check_correctness("about 104.9", expected, Domain::Math));
        assert!(!check_correctness("about 105.2", expected, Domain::Math));
        // zero expected → slack only
        assert!(check_correctness("0.05", "= 0", Domain::Math));
    }

    #[test]
    fn test_math_without_expected_number_is_incorrect() {
        assert!(!check_correctness("12", "no number here", Domain::Math));
        assert!(!check_correctness("no number", "#### 12", Domain::Math));
    }

    #[test]
    fn test_reasoning_true_and_false_targets() {
        assert!(check_correctness("Yes, you return to start.", "Yes", Domain::Reasoning));
        assert!(check_correctness("The expression is False", "False", Domain::Reasoning));
        assert!(!check_correctness("It is true", "False", Domain::Reasoning));
        assert!(!check_correctness("true", "(A)", Domain::Reasoning));
    }

    #[test]
    fn test_fact_true_requires_no_false_keyword() {
        assert!(check_correctness("This is verified.", "true", Domain::FactVerification));
        assert!(!check_correctness(
            "Partly true but also false",
            "true",
            Domain::FactVerification
        ));
    }

    #[test]
    fn test_fact_false_category() {
        assert!(check_correctness("That claim is wrong.", "false", Domain::FactVerification));
        assert!(!check_correctness("Correct.", "false", Domain::FactVerification));
    }

    #[test]
    fn test_fact_partial_category() {
        assert!(check_correctness("mixed evidence", "unknown", Domain::FactVerification));
        assert!(check_correctness("cannot tell", "unknown", Domain::FactVerification));
        assert!(!check_correctness("it is wrong", "unknown", Domain::FactVerification));
    }

    #[test]
    fn test_code_accepts_plain_function() {
        let code = "def add(a, b):\n    # sum\n    return a + b\n";
        assert!(check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_code_accepts_docstrings_and_nested_brackets() {
        let code = "def f(xs):\n    \"\"\"Return the sum (of [xs]).\"\"\"\n    return sum([x for x in xs if x > 0])\n";
        assert!(check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_markdown_fences() {
        let code = "```python\ndef f():\n    return 1\n```";
        assert!(!check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_prose() {
        let text = "Here is the solution: def f(): return 1";
        assert!(!check_correctness(text, "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_unbalanced_brackets_and_strings() {
        assert!(!check_correctness("def f(:\n    return 1", "", Domain::Code));
        assert!(!check_correctness("def f():\n    return 'abc", "", Domain::Code));
    }

    #[test]
    fn test_code_requires_def_or_return() {
        assert!(!check_correctness("x = 1\ny = x + 2", "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_leading_label_line() {
        let text = "Solution:\ndef add(a, b):\n    return a + b";
        assert!(!check_correctness(text, "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_header_without_colon() {
        assert!(!check_correctness("def add(a, b)\n    return a + b", "", Domain::Code));
        assert!(!check_correctness("def f(x):\n    if x > 0\n        return x", "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_body_that_is_not_indented() {
        assert!(!check_correctness("def add(a, b):\nreturn a + b", "", Domain::Code));
        assert!(!check_correctness("def add(a, b):", "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_exclamation_outside_not_equal() {
        assert!(!check_correctness("Sure! def add(a, b): return a + b", "", Domain::Code));
        assert!(check_correctness("def f(a, b):\n    return a != b", "", Domain::Code));
    }

    #[test]
    fn test_code_accepts_one_line_and_nested_blocks() {
        assert!(check_correctness("def add(a, b): return a + b", "", Domain::Code));
        let code = "def sign(x):\n    if x > 0:\n        return 1\n    elif x < 0:\n        return -1\n    else:\n        return 0\n";
        assert!(check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_code_accepts_continuation_lines() {
        let code = "def total(xs):\n    return sum(\n        x for x in xs\n    ) + \\\n        0\n";
        assert!(check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_code_rejects_unexpected_and_unmatched_indent() {
        assert!(!check_correctness("x = 1\n    return x", "", Domain::Code));
        let code = "def f(x):\n        y = x\n    return y";
        assert!(!check_correctness(code, "", Domain::Code));
    }

    #[test]
    fn test_looks_like_python_handles_floats_and_keywords() {
        assert!(looks_like_python("x = 3.5 if y is not none else 0"));
        assert!(!looks_like_python("3 apples"));
    }
}
