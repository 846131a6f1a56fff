use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid link pattern `{pattern}`: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

/// Compiled, case-insensitive link pattern.
///
/// Matching is an unanchored search over the whole URL string, so `clip/`
/// matches `https://example.com/clip/42`. An empty pattern matches every link.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map(|regex| Self { regex })
            .map_err(|err| PatternError {
                pattern: source.to_string(),
                message: err.to_string(),
            })
    }

    pub fn test(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn matching_ignores_case() {
        let pattern = Pattern::compile("CLIP/").unwrap();
        assert!(pattern.test("https://example.com/clip/42"));
        assert!(!pattern.test("https://example.com/video/42"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let pattern = Pattern::compile("").unwrap();
        assert!(pattern.test("https://example.com/"));
    }

    #[test]
    fn match_is_searched_anywhere_in_the_url() {
        let pattern = Pattern::compile(r"\d{3}$").unwrap();
        assert!(pattern.test("https://example.com/item/123"));
        assert!(!pattern.test("https://example.com/item/12"));
    }

    #[test]
    fn invalid_pattern_reports_source() {
        let err = Pattern::compile("(unclosed").unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn patterns_compare_by_source() {
        assert_eq!(Pattern::compile("a+").unwrap(), Pattern::compile("a+").unwrap());
        assert_ne!(Pattern::compile("a+").unwrap(), Pattern::compile("a*").unwrap());
    }
}
