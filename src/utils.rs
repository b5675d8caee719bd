//! Text normalization and phrase-probing helpers shared by the rubric evaluators.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:'\w+)*").expect("valid word pattern"));

/// Shortest vocabulary word that also matches its inflections.
const MIN_STEM_CHARS: usize = 4;

/// Split text into lowercase word tokens.
///
/// Word characters are `\w` plus inner apostrophes (`don't`).
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|token| token.as_str().to_lowercase())
        .collect()
}

/// Prefixes a token may start with to count as an inflection of `word`.
///
/// Words shorter than [`MIN_STEM_CHARS`] only match exactly. A trailing
/// `e` is dropped (`invite` → `inviting`) and a consonant-`y` ending also
/// accepts `i` (`apply` → `applied`).
fn stems(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < MIN_STEM_CHARS {
        return Vec::new();
    }
    let mut stems = vec![word.to_string()];
    let head: String = chars[..chars.len() - 1].iter().collect();
    match &chars[chars.len() - 2..] {
        [_, 'e'] => stems.push(head),
        [before, 'y'] if !"aeiou".contains(*before) => stems.push(format!("{head}i")),
        _ => {}
    }
    stems
}

/// How a vocabulary word is compared with a text token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordMatch {
    /// Token must equal the word.
    Exact,
    /// Token may also be an inflection of the word (`help` → `helpful`).
    Inflected,
}

#[derive(Clone, Debug)]
struct NeedleWord {
    word: String,
    stems: Vec<String>,
}

impl NeedleWord {
    fn new(word: String, mode: WordMatch) -> Self {
        let stems = match mode {
            WordMatch::Exact => Vec::new(),
            WordMatch::Inflected => stems(&word),
        };
        Self { word, stems }
    }

    fn matches(&self, token: &str) -> bool {
        token == self.word || self.stems.iter().any(|stem| token.starts_with(stem.as_str()))
    }
}

/// Whole-word phrase matcher over one message.
///
/// Phrases match on token boundaries only, so `hell` never matches `hello`.
/// Multi-word phrases must appear as consecutive tokens.
#[derive(Clone, Debug)]
pub struct TextMatcher {
    tokens: Vec<String>,
}

impl TextMatcher {
    /// Tokenize `text` once for repeated lookups.
    pub fn new(text: &str) -> Self {
        Self {
            tokens: word_tokens(text),
        }
    }

    /// Number of (possibly overlapping) occurrences of `phrase`.
    pub fn count_phrase(&self, phrase: &str, mode: WordMatch) -> usize {
        let needle: Vec<NeedleWord> = word_tokens(phrase)
            .into_iter()
            .map(|word| NeedleWord::new(word, mode))
            .collect();
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return 0;
        }
        self.tokens
            .windows(needle.len())
            .filter(|window| {
                window
                    .iter()
                    .zip(&needle)
                    .all(|(token, word)| word.matches(token))
            })
            .count()
    }

    /// True when `phrase` or an inflection of it occurs.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.count_phrase(phrase, WordMatch::Inflected) > 0
    }

    /// First phrase of `list` present in the text, inflections included.
    pub fn first_match<'a>(&self, list: &'a [Cow<'static, str>]) -> Option<&'a str> {
        list.iter()
            .map(|phrase| phrase.as_ref())
            .find(|phrase| self.contains_phrase(phrase))
    }

    /// Every phrase of `list` present in the text, in list order.
    pub fn matches<'a>(&self, list: &'a [Cow<'static, str>]) -> Vec<&'a str> {
        list.iter()
            .map(|phrase| phrase.as_ref())
            .filter(|phrase| self.contains_phrase(phrase))
            .collect()
    }
}

/// Share of characters that are uppercase letters.
pub fn uppercase_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|ch| ch.is_uppercase()).count();
    upper as f64 / total as f64
}

/// True when the text uses a standalone lowercase `i` and never `I`.
pub fn lowercase_pronoun_only(text: &str) -> bool {
    let mut lower = false;
    for word in text.split(|ch: char| !ch.is_alphanumeric()) {
        match word {
            "I" => return false,
            "i" => lower = true,
            _ => {}
        }
    }
    lower
}

/// True when the text opens with an uppercase letter and ends with `.`, `!`, or `?`.
pub fn is_sentence_formatted(text: &str) -> bool {
    let starts_upper = text.chars().next().is_some_and(char::is_uppercase);
    starts_upper && text.ends_with(['.', '!', '?'])
}
