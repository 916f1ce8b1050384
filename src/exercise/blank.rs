use std::ops::Range;

/// Placeholder that replaces the target term in a prompt sentence.
pub const BLANK: &str = "______";

/// Used when an item carries no usable sample sentence.
pub const SENTENCE_FALLBACK: &str = "Sentence unavailable";

/// Appended when the term cannot be located in the sentence.
pub const FILL_IN_HINT: &str = " (Fill in: ______)";

/// Text before the first `.` or `(`, trimmed.
///
/// Sample sentences usually carry their translation in parentheses after the
/// first sentence, so everything from either marker on is dropped.
pub fn first_clause(sentence: &str) -> &str {
    let end = sentence
        .find(|c| c == '.' || c == '(')
        .unwrap_or(sentence.len());
    sentence[..end].trim()
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte span of the first case-insensitive occurrence of `needle`.
///
/// Every character of `needle` is matched literally.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }

    'outer: for (start, _) in haystack.char_indices() {
        let mut candidate = haystack[start..].char_indices();
        let mut end = start;
        for expected in needle.chars() {
            match candidate.next() {
                Some((offset, actual)) if chars_eq_ignore_case(actual, expected) => {
                    end = start + offset + actual.len_utf8();
                }
                _ => continue 'outer,
            }
        }
        return Some(start..end);
    }
    None
}

/// Builds the prompt shown for a multiple-choice item.
///
/// The first occurrence of `term` is replaced with [`BLANK`]; if the term is
/// not in the sentence the [`FILL_IN_HINT`] is appended instead.
pub fn blank_sentence(sentence: Option<&str>, term: &str) -> String {
    let clause = sentence.map(first_clause).filter(|c| !c.is_empty());

    match clause {
        Some(clause) if !term.trim().is_empty() => match find_ignore_case(clause, term) {
            Some(span) => format!("{}{}{}", &clause[..span.start], BLANK, &clause[span.end..]),
            None => format!("{clause}{FILL_IN_HINT}"),
        },
        _ => format!("{SENTENCE_FALLBACK}{FILL_IN_HINT}"),
    }
}
