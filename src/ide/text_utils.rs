//! Text manipulation utilities for working with source code.

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Find the boundaries of a word at the given position.
///
/// Returns `Some((start, end))` where `start` is the character index of the word start
/// and `end` is the character index after the last word character.
pub fn find_word_boundaries(chars: &[char], position: usize) -> Option<(usize, usize)> {
    if position >= chars.len() || !is_word_character(chars[position]) {
        return None;
    }

    let mut start = position;
    while start > 0 && is_word_character(chars[start - 1]) {
        start -= 1;
    }

    let mut end = position;
    while end < chars.len() && is_word_character(chars[end]) {
        end += 1;
    }

    Some((start, end))
}

/// Extract the word (identifier) at the cursor position in a line of text.
///
/// # Example
/// ```
/// use trilogy_ls::ide::text_utils::extract_word_at_cursor;
///
/// let line = "select user_id, name";
/// assert_eq!(extract_word_at_cursor(line, 9), Some("user_id".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 14), None); // comma
/// ```
pub fn extract_word_at_cursor(line: &str, position: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let (start, end) = find_word_boundaries(&chars, position)?;
    Some(chars[start..end].iter().collect())
}

/// The call a cursor sits inside, found by scanning backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCall {
    /// Name written before the parenthesis (may be empty).
    pub name: String,
    /// Commas between the parenthesis and the cursor.
    pub commas: usize,
}

/// Find the innermost unclosed `(` before the end of `before_cursor` and
/// the name written in front of it.
///
/// Commas are counted over all text after the parenthesis, including
/// commas of nested calls that have already closed.
///
/// # Example
/// ```
/// use trilogy_ls::ide::text_utils::find_open_call;
///
/// let call = find_open_call("select round(sum(x), ").unwrap();
/// assert_eq!(call.name, "round");
/// assert_eq!(call.commas, 1);
/// ```
pub fn find_open_call(before_cursor: &str) -> Option<OpenCall> {
    let chars: Vec<char> = before_cursor.chars().collect();
    let mut depth = 0usize;
    for i in (0..chars.len()).rev() {
        match chars[i] {
            ')' => depth += 1,
            '(' if depth > 0 => depth -= 1,
            '(' => {
                let mut start = i;
                while start > 0 && is_word_character(chars[start - 1]) {
                    start -= 1;
                }
                let name: String = chars[start..i].iter().collect();
                let commas = chars[i + 1..].iter().filter(|&&c| c == ',').count();
                return Some(OpenCall {
                    name: name.trim().to_string(),
                    commas,
                });
            }
            _ => {}
        }
    }
    None
}

/// The first `column` characters of line `line` (both 0-indexed).
pub fn text_before(text: &str, line: u32, column: u32) -> Option<String> {
    let line = text.split('\n').nth(line as usize)?;
    Some(line.chars().take(column as usize).collect())
}

/// Truncate to at most `limit` characters, marking the cut with `...`.
pub fn truncate_with_ellipsis(text: &str, limit: usize, keep: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(keep).collect();
        out.push_str("...");
        out
    }
}
