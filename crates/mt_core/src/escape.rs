/// Hexo treats `%` as the start of a template tag; emit it as an entity.
pub fn escape_percent(text: &str) -> String {
    text.replace('%', "&#x25;")
}

/// Escape a title so it cannot break the surrounding front matter line.
pub fn escape_title(title: &str) -> String {
    escape_percent(&title.replace(':', "&#x3a;"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_escapes_colon_and_percent() {
        assert_eq!(escape_title("Sale: 50% off"), "Sale&#x3a; 50&#x25; off");
    }

    #[test]
    fn percent_escape_leaves_other_text() {
        assert_eq!(escape_percent("{% raw %}"), "{&#x25; raw &#x25;}");
        assert_eq!(escape_percent("plain"), "plain");
    }
}
