//! Whitespace cleaning shared by stored note text and search queries.

/// Trims the input and collapses every internal whitespace run to one space.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans optional text, mapping blank input to `None`.
pub fn clean_optional(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(clean_text("  shopping \t list\n\nfor  monday "), "shopping list for monday");
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(clean_optional(Some("   \n")), None);
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some(" a  b ")), Some("a b".to_string()));
    }
}
