//! Turning a section body into list items

use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+").expect("valid numbered-line regex"));

const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Splits a section body into list items
///
/// Tried in order, the first that yields anything wins:
/// 1. bullet-marked lines (`-`, `*`, `•`)
/// 2. numbered lines (`1.`, `2)`)
/// 3. sentences, when the body is longer than 50 characters and more than one
///    sentence is longer than 15 characters
/// 4. the whole body, when longer than 10 characters
pub fn extract_list_items(body: &str) -> Vec<String> {
    let body = body.trim();

    let bullets: Vec<String> = body
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(BULLET_MARKERS)?;
            // "*emphasis*" and "-5 mg" are not bullets
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            non_empty(rest)
        })
        .collect();
    if !bullets.is_empty() {
        return bullets;
    }

    let numbered: Vec<String> = body
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let found = NUMBERED_LINE.find(line)?;
            non_empty(&line[found.end()..])
        })
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    if body.chars().count() > 50 {
        let sentences: Vec<String> = split_sentences(body)
            .into_iter()
            .filter(|s| s.chars().count() > 15)
            .collect();
        if sentences.len() > 1 {
            return sentences;
        }
    }

    if body.chars().count() > 10 {
        vec![body.to_string()]
    } else {
        Vec::new()
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Splits after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            if let Some(sentence) = non_empty(&current) {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    if let Some(sentence) = non_empty(&current) {
        sentences.push(sentence);
    }

    sentences
}
