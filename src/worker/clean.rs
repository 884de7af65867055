// src/worker/clean.rs — Text normalization

use crate::core::types::Item;

/// Replace control characters (newlines included) with spaces, collapse
/// whitespace runs and trim.
pub fn clean_text(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill `cleaned_text` for every item. Order-preserving, never drops.
pub fn clean_items(mut items: Vec<Item>) -> Vec<Item> {
    for item in &mut items {
        item.cleaned_text = Some(clean_text(&item.raw_text));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_clean_text_strips_newlines_and_trims() {
        assert_eq!(clean_text("  hello\nworld \r\n"), "hello world");
    }

    #[test]
    fn test_clean_text_removes_control_chars() {
        assert_eq!(clean_text("a\u{0007}b\tc\u{0000}"), "a b c");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_clean_items_is_idempotent_and_order_preserving() {
        let items = vec![
            Item::new("1", " first\npost ", "u1", Utc::now()),
            Item::new("2", "second\t\tpost", "u2", Utc::now()),
            Item::new("3", "", "u3", Utc::now()),
        ];
        let once = clean_items(items);
        let twice = clean_items(once.clone());
        assert_eq!(once, twice);
        let ids: Vec<_> = once.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(once[0].cleaned_text.as_deref(), Some("first post"));
        assert_eq!(once[1].cleaned_text.as_deref(), Some("second post"));
        assert_eq!(once[2].cleaned_text.as_deref(), Some(""));
    }

    #[test]
    fn test_clean_text_of_clean_text_is_stable() {
        let once = clean_text("x \n\n y\u{001b}[0m z");
        assert_eq!(clean_text(&once), once);
    }
}
