// All LLM prompt constants for the CRPO optimizers.
// Templates use `{name}` slots filled with `str::replace`. `{question}` is not
// a slot: it is the literal placeholder the model is told to emit.

/// Single-domain contrastive reasoning prompt.
/// Replace: {high_text}, {low_text}, {task}
pub const SINGLE_DOMAIN_REASONING_TEMPLATE: &str = r#"
You are a prompt optimization expert. Analyze these high vs low quality examples.

HIGH QUALITY EXAMPLES (Good responses):
{high_text}

LOW QUALITY EXAMPLES (Poor responses):
{low_text}

For this task: '{task}'

Question: What are the key properties that make prompts effective for this task?
Consider:
1. How should the prompt be structured?
2. What kind of reasoning should be encouraged?
3. What specific instructions lead to better responses?

Please provide 3-4 key insights about what makes prompts work better.
"#;

/// Single-domain template synthesis prompt.
/// Replace: {task}, then {reasoning}
pub const SINGLE_DOMAIN_GENERATION_TEMPLATE: &str = r#"
Based on the following insights about effective prompts:

{reasoning}

Generate an optimized prompt for this task:
Task: {task}

IMPORTANT REQUIREMENTS:
1. The prompt should be GENERIC and work for ANY example in this domain
2. Do NOT include specific concrete examples in the prompt template
3. Do NOT include hardcoded problem descriptions
4. Use ONLY the placeholder {question} - do not use {problem}, {statement}, etc.
5. Focus on process and methodology, not specific content
6. Be clear and specific about the reasoning approach, not the problem content

Output ONLY the optimized prompt template, no explanation.
Example: "Solve the following math problem step-by-step: {question}"
"#;

/// Cross-domain contrastive reasoning prompt.
/// Replace: {math_task}, {reasoning_task}, {fact_task}, {code_task}, then {examples_text}
pub const MULTI_DOMAIN_REASONING_TEMPLATE: &str = r#"
You are a prompt optimization expert specializing in cross-domain effectiveness.

Analyze these high vs low quality examples across MULTIPLE reasoning domains:

{examples_text}

These tasks span different domains:
- Mathematical reasoning: {math_task}
- Logical reasoning: {reasoning_task}
- Fact verification: {fact_task}
- Code generation: {code_task}

CRITICAL QUESTION: What prompt properties work well ACROSS ALL these diverse domains?

Consider:
1. What reasoning style is universal (math AND logic AND facts AND code)?
2. What structure helps in all domains?
3. What specific phrases or instructions generalize?
4. What should a robust prompt emphasize?
5. How can we balance specificity with generality?

Please provide 4-5 insights about GENERALIZABLE prompt properties that work across all domains.
"#;

/// Cross-domain template synthesis prompt.
/// Replace: {reasoning}
pub const MULTI_DOMAIN_GENERATION_TEMPLATE: &str = r#"
You are a prompt engineer creating a ROBUST prompt that works across diverse domains.

Based on these insights about universal prompt properties:

{reasoning}

Create ONE optimized prompt that:
1. Incorporates these cross-domain insights
2. Works well for mathematics AND logic AND facts AND code
3. Emphasizes principles that apply everywhere
4. Balances generalization with effectiveness
5. Uses ONLY the placeholder {question} - no specific examples
6. Encourages step-by-step thinking and clear reasoning
7. Is clear, specific, and encouraging

The prompt should be generic enough to work for ANY problem in ANY of these domains.

Output ONLY the optimized prompt template, no explanation.
"#;

/// Reference prompts are previewed at this many characters in single-domain reasoning.
pub const SINGLE_DOMAIN_PREVIEW_CHARS: usize = 100;
/// ... and at this many in cross-domain reasoning.
pub const MULTI_DOMAIN_PREVIEW_CHARS: usize = 60;
/// Examples of each tier shown to the model in single-domain reasoning.
pub const SINGLE_DOMAIN_SHOWN_EXAMPLES: usize = 3;
