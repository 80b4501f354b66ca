//! Deterministic post-formatting of the final answer text.
//!
//! Three passes, applied in order: casual-word replacement, list/heading
//! markup normalization, and word-budget enforcement for short questions.
//! Each pass is idempotent, so re-polishing an already polished answer is a
//! no-op.

use std::sync::LazyLock;

use regex::Regex;

/// Word budget applied when the question is shorter than
/// [`SHORT_QUESTION_CHARS`] characters.
const WORD_BUDGET: usize = 300;
/// Questions below this length get the capped, to-the-point treatment.
const SHORT_QUESTION_CHARS: usize = 50;
/// Sentence boundaries are only honored past 70% of the budget.
const SOFT_FLOOR: usize = WORD_BUDGET * 7 / 10;

const TRUNCATION_NOTICE: &str = "\n\n*(Answer shortened to fit the 300-word limit.)*";

/// Casual word or phrase → formal replacement. Whole-word, case-insensitive.
/// No replacement may itself contain a listed casual form, otherwise the
/// pass stops being idempotent.
const TONE_MAP: &[(&str, &str)] = &[
    ("gonna", "going to"),
    ("wanna", "want to"),
    ("gotta", "have to"),
    ("kinda", "somewhat"),
    ("sorta", "somewhat"),
    ("dunno", "do not know"),
    ("yeah", "yes"),
    ("yep", "yes"),
    ("nope", "no"),
    ("a lot of", "many"),
    ("lots of", "many"),
    ("pretty much", "largely"),
    ("basically", "fundamentally"),
    ("stuff", "material"),
];

static TONE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    TONE_MAP
        .iter()
        .map(|(casual, formal)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(casual));
            (Regex::new(&pattern).expect("static tone pattern"), *formal)
        })
        .collect()
});

/// Applies all formatting passes to a generated answer.
pub fn polish(answer: &str, question: &str) -> String {
    let toned = normalize_tone(answer);
    let listed = normalize_lists(&toned);
    enforce_word_budget(&listed, question)
}

/// Replaces casual words with formal synonyms (whole words only).
pub fn normalize_tone(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, formal) in TONE_PATTERNS.iter() {
        out = pattern.replace_all(&out, *formal).into_owned();
    }
    out
}

/// Coerces list markers into one markup form and puts a blank line after
/// each heading.
///
/// - `*`, `+`, and `•` bullets become `-` (indent preserved)
/// - `1)` numbering becomes `1.`
pub fn normalize_lists(text: &str) -> String {
    static BULLET: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\s*)[*+•]\s+").expect("static bullet pattern"));
    static NUMBERED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\s*)(\d+)\)\s+").expect("static number pattern"));
    static HEADING: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^#{1,6}\s").expect("static heading pattern"));

    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let mut fixed = BULLET.replace(line, "$1- ").into_owned();
        fixed = NUMBERED.replace(&fixed, "$1$2. ").into_owned();

        let is_heading = HEADING.is_match(&fixed);
        out.push(fixed);

        if is_heading {
            let next_nonblank = lines.get(i + 1).is_some_and(|l| !l.trim().is_empty());
            if next_nonblank {
                out.push(String::new());
            }
        }
    }

    let mut joined = out.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Caps the answer at [`WORD_BUDGET`] words when the question is short.
///
/// Prefers cutting at the last sentence boundary past [`SOFT_FLOOR`] words
/// (with a visible notice); otherwise hard-truncates at the budget and
/// appends an ellipsis. Long questions pass through untouched.
pub fn enforce_word_budget(answer: &str, question: &str) -> String {
    if question.chars().count() >= SHORT_QUESTION_CHARS {
        return answer.to_string();
    }

    let mut word_count = 0usize;
    let mut in_word = false;
    let mut word_start = 0usize;
    let mut budget_end: Option<usize> = None;
    let mut sentence_cut: Option<usize> = None;

    for (i, c) in answer.char_indices() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                word_count += 1;
                if word_count >= SOFT_FLOOR && ends_sentence(&answer[word_start..i]) {
                    sentence_cut = Some(i);
                }
                if word_count == WORD_BUDGET {
                    budget_end = Some(i);
                    break;
                }
            }
        } else if !in_word {
            in_word = true;
            word_start = i;
        }
    }
    if in_word && budget_end.is_none() {
        word_count += 1;
        if word_count == WORD_BUDGET {
            budget_end = Some(answer.len());
        }
    }

    let Some(hard_end) = budget_end else {
        // At or under budget already.
        return answer.to_string();
    };
    if answer[hard_end..].chars().all(char::is_whitespace) {
        // Exactly at budget, nothing to cut.
        return answer.to_string();
    }

    match sentence_cut {
        Some(cut) => {
            let mut capped = answer[..cut].trim_end().to_string();
            capped.push_str(TRUNCATION_NOTICE);
            capped
        }
        None => {
            let mut capped = answer[..hard_end].trim_end().to_string();
            capped.push('…');
            capped
        }
    }
}

/// True when the word closes a sentence, allowing trailing markdown or
/// quote characters after the punctuation.
fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')', ']', '*', '_'])
        .ends_with(['.', '!', '?'])
}
