//! Bracket-balanced splitting of list and tuple literals.
//!
//! A single left-to-right pass keeps a stack of open `(`, `[` and `{`.
//! Commas seen while only the outer delimiter is open separate elements.
//! Quoted string literals are skipped so that commas and brackets inside
//! them never split an element. Input whose brackets do not balance, or whose
//! outer delimiter closes before the last byte, is rejected.

use crate::error::{HarnessError, Result};

/// Split `input` (which must be wrapped in `open`/`close`) into its trimmed
/// top-level segments. An empty body yields no segments.
pub fn split_top_level(input: &str, open: u8, close: u8) -> Result<Vec<&str>> {
    let bytes = input.as_bytes();
    if bytes.len() < 2 || bytes[0] != open || bytes[bytes.len() - 1] != close {
        return Err(HarnessError::mismatch(
            format!("{}...{}", open as char, close as char),
            input,
        ));
    }

    let last = bytes.len() - 1;
    let mut stack: Vec<u8> = Vec::new();
    let mut segments = Vec::new();
    let mut start = 1;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'(' | b'[' | b'{' => stack.push(b),
            b')' | b']' | b'}' => {
                let expected_open = matching_open(b);
                match stack.pop() {
                    Some(top) if top == expected_open => {}
                    _ => return Err(unbalanced(input, i)),
                }
                if stack.is_empty() && i != last {
                    return Err(unbalanced(input, i));
                }
            }
            b',' if stack.len() == 1 => {
                segments.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_string || !stack.is_empty() {
        return Err(unbalanced(input, bytes.len()));
    }

    let remainder = input[start..last].trim();
    if !remainder.is_empty() {
        segments.push(remainder);
    }
    Ok(segments)
}

/// Split a tuple segment on its first colon outside any nested bracket.
pub fn split_key_value(segment: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in segment.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                return Some((segment[..i].trim(), segment[i + 1..].trim()));
            }
            _ => {}
        }
    }
    None
}

fn matching_open(close: u8) -> u8 {
    match close {
        b')' => b'(',
        b']' => b'[',
        _ => b'{',
    }
}

fn unbalanced(input: &str, position: usize) -> HarnessError {
    HarnessError::UnbalancedStructure {
        input: input.to_string(),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_flat_list() {
        let parts = split_top_level("[u1, u2, u3]", b'[', b']').unwrap();
        assert_eq!(parts, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_split_empty_bodies() {
        assert!(split_top_level("[]", b'[', b']').unwrap().is_empty());
        assert!(split_top_level("[ ]", b'[', b']').unwrap().is_empty());
        assert!(split_top_level("{}", b'{', b'}').unwrap().is_empty());
    }

    #[test]
    fn test_nested_commas_stay_inside_elements() {
        let parts = split_top_level("[(ok u1), {a: 1, b: [2, 3]}, (list 4 5)]", b'[', b']').unwrap();
        assert_eq!(parts, vec!["(ok u1)", "{a: 1, b: [2, 3]}", "(list 4 5)"]);
    }

    #[test]
    fn test_commas_inside_strings_are_ignored() {
        let parts = split_top_level(r#"["a, b", u"c]", "d\"e,"]"#, b'[', b']').unwrap();
        assert_eq!(parts, vec![r#""a, b""#, r#"u"c]""#, r#""d\"e,""#]);
    }

    #[test]
    fn test_rejects_missing_delimiters() {
        let err = split_top_level("u1, u2", b'[', b']').unwrap_err();
        assert!(matches!(err, HarnessError::ParseMismatch { .. }));
    }

    #[test]
    fn test_rejects_extra_closer() {
        let err = split_top_level("[u1], [u2]", b'[', b']').unwrap_err();
        assert_eq!(
            err,
            HarnessError::UnbalancedStructure {
                input: "[u1], [u2]".to_string(),
                position: 3
            }
        );
    }

    #[test]
    fn test_rejects_mismatched_and_unclosed() {
        assert!(matches!(
            split_top_level("[(u1]", b'[', b']'),
            Err(HarnessError::UnbalancedStructure { .. })
        ));
        assert!(matches!(
            split_top_level("[{a: 1]", b'[', b']'),
            Err(HarnessError::UnbalancedStructure { .. })
        ));
        assert!(matches!(
            split_top_level("[\"open]", b'[', b']'),
            Err(HarnessError::UnbalancedStructure { .. })
        ));
    }

    #[test]
    fn test_split_key_value_uses_first_top_level_colon() {
        assert_eq!(split_key_value(" a: 1 "), Some(("a", "1")));
        assert_eq!(
            split_key_value("b: { c: 2 }"),
            Some(("b", "{ c: 2 }"))
        );
        assert_eq!(split_key_value("url: u\"https://x\""), Some(("url", "u\"https://x\"")));
        assert_eq!(split_key_value("no-colon"), None);
    }
}
