//! Prompt templates and response parsing for the LLM-backed oracle.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CardType, Stage};

// ============================================================================
// Prompts
// ============================================================================

/// Strict same-meaning check. The model must answer with a single YES or NO.
pub fn equivalence_prompt(correct_answer: &str, user_answer: &str) -> String {
    format!(
        r#"Determine whether the user's answer means exactly the same as the correct answer.

Correct Answer: {correct_answer}
User Answer: {user_answer}

If their meanings are not completely identical, respond NO.
Respond with one word only: YES or NO (uppercase)."#
    )
}

/// Coaching text for a graded answer.
pub fn feedback_prompt(answer: &str, user_answer: &str, is_correct: bool) -> String {
    if is_correct {
        format!(
            "The student answered correctly.\n\
             Correct answer: {answer}\n\
             Give a short word of praise."
        )
    } else {
        format!(
            "The student gave a wrong answer.\n\
             Correct answer: {answer}\n\
             Student answer: {user_answer}\n\
             Without stating the correct answer, give a hint in one or two sentences \
             that helps the student recall it. Reply in the language of the correct answer."
        )
    }
}

/// Stage-specific hint prompt, or `None` where no hint is given.
pub fn hint_prompt(concept: &str, answer: &str, stage: Stage, card_type: CardType) -> Option<String> {
    match (card_type, stage.get()) {
        (CardType::Word, 3) => Some(format!(
            "Give a short hint of one or two sentences that helps the student recall the word. \
             Do not reveal the word itself.\nAnswer: {answer}"
        )),
        (CardType::Word, 4) => Some(format!(
            "Give a specific hint of at most two sentences so the student can recall the word \
             with certainty. Do not reveal the word itself.\nAnswer: {answer}"
        )),
        (CardType::Concept, 2 | 3) => Some(format!(
            "Give a short hint of one or two sentences that helps the student recall the concept. \
             Do not reveal the definition.\nConcept: {concept}\nDefinition: {answer}"
        )),
        (CardType::Concept, 4) => Some(format!(
            "Give a specific hint of one or two sentences so the student can recall the concept \
             precisely. Do not reveal the definition.\nConcept: {concept}\nDefinition: {answer}"
        )),
        _ => None,
    }
}

pub fn related_concepts_prompt(concept: &str, k: usize) -> String {
    format!(
        "List {k} concepts closely related to the following concept, on a single line, \
         in the form 'concept1, concept2, ...'. Use the language of the concept.\n\
         Concept: {concept}"
    )
}

pub fn advanced_questions_prompt(concept: &str, n: usize) -> String {
    format!(
        "Write {n} advanced questions about the following concept, one question per line.\n\
         Concept: {concept}"
    )
}

pub fn concept_definition_prompt(concept: &str) -> String {
    format!(
        "Summarize the following concept concisely and accurately in one or two sentences, \
         in the language of the concept.\nConcept: {concept}"
    )
}

// ============================================================================
// Response parsing
// ============================================================================

static THINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").unwrap());

/// Drop `<think>` sections some local models emit and trim.
pub fn clean_response(raw: &str) -> String {
    THINK_RE.replace_all(raw, "").trim().to_string()
}

/// True only for a YES reply.
pub fn parse_yes_no(raw: &str) -> bool {
    let cleaned = clean_response(raw).to_uppercase();
    let first = cleaned
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric());
    first == "YES"
}

/// Split a generated list. Multi-line replies are split per line, single
/// lines on commas. Bullets and numbering are stripped.
pub fn parse_list(raw: &str) -> Vec<String> {
    let cleaned = clean_response(raw);
    let lines: Vec<&str> = cleaned.lines().filter(|l| !l.trim().is_empty()).collect();

    let items: Vec<&str> = if lines.len() > 1 {
        lines
    } else {
        cleaned.split(',').collect()
    };

    items
        .into_iter()
        .map(strip_marker)
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_marker(item: &str) -> String {
    LIST_MARKER_RE.replace(item, "").trim().to_string()
}
