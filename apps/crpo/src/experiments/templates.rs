// Hand-written prompt templates for the baseline strategies, and the
// question framing appended to CRPO-optimized prompts at evaluation time.

use crate::datasets::Domain;

/// Zero-shot chain-of-thought template, shared by every domain.
pub const ZERO_SHOT_TEMPLATE: &str = "Let's think step by step.\n\nQuestion: {question}\n\nAnswer:";

const FEW_SHOT_MATH: &str = r#"
Example 1:
Question: If a book costs $12 and you buy 3 books, how much do you spend?
Answer: Let's think step by step. One book costs $12. I buy 3 books. Total = 12 × 3 = $36.

Example 2:
Question: Sarah has 15 apples. She gives 4 to her friend. How many does she have left?
Answer: Let's think step by step. Sarah starts with 15 apples. She gives away 4. Left = 15 - 4 = 11 apples.

Example 3:
Question: A train travels 60 miles per hour for 2 hours. How far does it travel?
Answer: Let's think step by step. Speed = 60 mph, Time = 2 hours. Distance = Speed × Time = 60 × 2 = 120 miles.

Now solve:
Question: {question}
Answer:
"#;

const FEW_SHOT_REASONING: &str = r#"
Example 1:
Question: All dogs are animals. All animals breathe. Are all dogs breathing?
Answer: Let's think step by step. Given: All dogs are animals, and all animals breathe. Therefore, all dogs must be breathing. Answer: True.

Example 2:
Question: Some birds can fly. All flying creatures have wings. Can all birds fly?
Answer: Let's think step by step. Some birds can fly (but not all). We cannot conclude all birds can fly from this information. Answer: False.

Example 3:
Question: If all roses are flowers and some flowers are red, are all roses red?
Answer: Let's think step by step. We know all roses are flowers, but only some flowers are red. We cannot conclude all roses are red. Answer: False.

Now answer:
Question: {question}
Answer:
"#;

const FEW_SHOT_FACT: &str = r#"
Example 1:
Statement: Paris is the capital of France.
Answer: Let's think step by step. Paris is widely known and documented as the capital of France. This is confirmed by official records. Answer: True.

Example 2:
Statement: The moon is made of cheese.
Answer: Let's think step by step. The moon is a celestial body made of rock and dust, not cheese. This is a common misconception. Answer: False.

Example 3:
Statement: Water boils at 100 degrees Celsius at sea level.
Answer: Let's think step by step. Water does boil at approximately 100°C at sea level (standard atmospheric pressure). This is scientifically accurate. Answer: True.

Now answer:
Statement: {question}
Answer:
"#;

const FEW_SHOT_CODE: &str = r#"
Example 1:
Write a function that returns the sum of two numbers.
Answer:
def add(a, b):
    return a + b

Example 2:
Write a function that checks if a number is even.
Answer:
def is_even(n):
    return n % 2 == 0

Example 3:
Write a function that returns the factorial of a number.
Answer:
def factorial(n):
    if n <= 1:
        return 1
    return n * factorial(n - 1)

Now write code for:
{question}
Answer:
"#;

/// Three worked demonstrations followed by the `{question}` slot.
pub fn few_shot_template(domain: Domain) -> &'static str {
    match domain {
        Domain::Math => FEW_SHOT_MATH,
        Domain::Reasoning => FEW_SHOT_REASONING,
        Domain::FactVerification => FEW_SHOT_FACT,
        Domain::Code => FEW_SHOT_CODE,
    }
}

/// Question framing appended after a CRPO-optimized prompt.
pub fn crpo_question_suffix(domain: Domain) -> &'static str {
    match domain {
        Domain::Math | Domain::Reasoning => "\n\nQuestion: {question}\n\nAnswer:",
        Domain::FactVerification => "\n\nStatement: {question}\n\nAnswer:",
        Domain::Code => "\n\nProblem: {question}\n\nSolution:",
    }
}

/// Evaluation template for an optimized prompt in `domain`.
pub fn crpo_evaluation_template(optimized_prompt: &str, domain: Domain) -> String {
    format!("{optimized_prompt}{}", crpo_question_suffix(domain))
}

/// Task description given to the single-domain optimizer.
pub fn single_domain_task(domain: Domain) -> &'static str {
    match domain {
        Domain::Math => "Solve grade-school math word problems",
        Domain::Reasoning => "Solve logical reasoning and spatial navigation tasks",
        Domain::FactVerification => "Verify the truthfulness of statements",
        Domain::Code => "Generate correct Python code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::prompts::QUESTION_PLACEHOLDER;

    #[test]
    fn test_every_template_has_exactly_one_placeholder() {
        assert_eq!(ZERO_SHOT_TEMPLATE.matches(QUESTION_PLACEHOLDER).count(), 1);
        for domain in Domain::ALL {
            assert_eq!(
                few_shot_template(domain).matches(QUESTION_PLACEHOLDER).count(),
                1,
                "few-shot template for {domain}"
            );
        }
    }

    #[test]
    fn test_few_shot_fact_uses_statement_framing() {
        assert!(few_shot_template(Domain::FactVerification).contains("Statement: {question}"));
    }

    #[test]
    fn test_crpo_evaluation_template_appends_domain_suffix() {
        let t = crpo_evaluation_template("Think carefully about {question}.", Domain::Code);
        assert_eq!(
            t,
            "Think carefully about {question}.\n\nProblem: {question}\n\nSolution:"
        );
        assert!(crpo_evaluation_template("x", Domain::FactVerification).ends_with("Statement: {question}\n\nAnswer:"));
    }
}
