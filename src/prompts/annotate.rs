//! The fixed instruction sent with every annotation request.

const INTRO: &str = "Analyze the text between the <text> tags.";
const STEPS_HEADER: &str = "For each word, in order of first appearance:";
const STEPS: &[&str] = &[
    "Convert the word to its root form (lemma).",
    "Identify the word's type (e.g. noun, verb, adjective).",
    "Classify the word into a relevant group (e.g. nature, action).",
];
const FORMAT: &str = "Return the result as a JSON array where each object has exactly these keys:\n- \"word\": the root form,\n- \"type\": the word's type,\n- \"group\": the word's group.";
const RULES: &[&str] = &[
    "Output the JSON array only. No markdown, no code fences, no commentary.",
    "Every value must be a non-empty string.",
    "If the text contains no words, return [].",
];

/// Embed `text` verbatim into the annotation instruction.
pub fn build_annotation_prompt(text: &str) -> String {
    let steps = STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\n<text>\n{text}\n</text>\n\n{steps_header}\n{steps}\n\n{format}\n\nRules:\n{rules}\n",
        intro = INTRO,
        text = text,
        steps_header = STEPS_HEADER,
        steps = steps,
        format = FORMAT,
        rules = rules
    )
}
