// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bracketed partition lists such as `[4, 2, 1, 1]`.

/// Why a list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// No bracketed list, or an entry that is not a positive `u32`.
    Malformed,
    /// The list has more than the allowed number of entries.
    TooLong { parts: usize },
}

/// Parse the first `[...]` list in `text` as positive integers.
///
/// Whitespace around entries is ignored. `[]` (or `[ ]`) yields an empty
/// vector. At most `max_parts` entries are collected; a longer list is
/// counted but not stored.
///
/// # Examples
///
/// ```
/// use partition_updater::parser::partition::{parse_list, ListError};
///
/// assert_eq!(parse_list("[ 1,  2 ,3]", 8), Ok(vec![1, 2, 3]));
/// assert_eq!(parse_list("Partitions achieving maximum: [2, 1, 1]", 8), Ok(vec![2, 1, 1]));
/// assert_eq!(parse_list("[2, x]", 8), Err(ListError::Malformed));
/// assert_eq!(parse_list("[1, 1, 1]", 2), Err(ListError::TooLong { parts: 3 }));
/// ```
pub fn parse_list(text: &str, max_parts: usize) -> Result<Vec<u32>, ListError> {
    let start = text.find('[').ok_or(ListError::Malformed)?;
    let length = text[start..].find(']').ok_or(ListError::Malformed)?;
    let content = text[start + 1..start + length].trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    for entry in content.split(',') {
        if parts.len() == max_parts {
            return Err(ListError::TooLong {
                parts: content.split(',').count(),
            });
        }
        let part = entry
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&part| part > 0)
            .ok_or(ListError::Malformed)?;
        parts.push(part);
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(text: &str) -> Option<Vec<u32>> {
        parse_list(text, usize::MAX).ok()
    }

    #[test]
    fn test_irregular_spacing() {
        assert_eq!(list("[ 1,  2 ,3]"), Some(vec![1, 2, 3]));
        assert_eq!(list("[\t5,3 ,\t1 ]"), Some(vec![5, 3, 1]));
    }

    #[test]
    fn test_order_is_preserved() {
        assert_eq!(list("[1, 2, 3, 4]"), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(list("[]"), Some(vec![]));
        assert_eq!(list("[  ]"), Some(vec![]));
    }

    #[test]
    fn test_missing_brackets() {
        assert_eq!(list("1, 2, 3"), None);
        assert_eq!(list("[1, 2, 3"), None);
        assert_eq!(list("1, 2]"), None);
    }

    #[test]
    fn test_bad_entries() {
        assert_eq!(list("[1,,2]"), None);
        assert_eq!(list("[1, 2,]"), None);
        assert_eq!(list("[1, 0]"), None);
        assert_eq!(list("[1, -2]"), None);
        assert_eq!(list("[1.5]"), None);
    }

    #[test]
    fn test_only_first_list_is_read() {
        assert_eq!(list("[3, 1] and [2, 2]"), Some(vec![3, 1]));
    }

    #[test]
    fn test_stops_at_part_limit() {
        let long = format!("[{}1]", "1, ".repeat(9999));
        assert_eq!(parse_list(&long, 4), Err(ListError::TooLong { parts: 10000 }));
        assert_eq!(parse_list("[2, 1, 1]", 3), Ok(vec![2, 1, 1]));
    }
}
