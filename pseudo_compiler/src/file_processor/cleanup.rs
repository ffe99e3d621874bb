//! Source cleanup applied before lexing
//!
//! Strips elision markers (`-el`, `-la`, `-unos`, ...) and `/* */` comments,
//! then normalizes whitespace. A line that opens a comment without closing
//! it is dropped entirely.

use regex::Regex;
use std::sync::OnceLock;

pub struct CleanupFilter {
    elision: Regex,
    block_comment: Regex,
    unterminated_comment: Regex,
    spaces: Regex,
    blank_lines: Regex,
}

static SHARED: OnceLock<Result<CleanupFilter, regex::Error>> = OnceLock::new();

impl CleanupFilter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            elision: Regex::new(r"-(el|la|los|las|al|a|lo|le|les|un|una|unos|unas)\b")?,
            block_comment: Regex::new(r"(?s)/\*.*?\*/")?,
            unterminated_comment: Regex::new(r"(?m)^.*?/\*.*$")?,
            spaces: Regex::new(r"[ \t]+")?,
            blank_lines: Regex::new(r"\n\s*\n+")?,
        })
    }

    /// Compiled once per process
    pub fn shared() -> Result<&'static CleanupFilter, regex::Error> {
        SHARED
            .get_or_init(CleanupFilter::new)
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn strip_comments(&self, text: &str) -> String {
        let text = self.elision.replace_all(text, "");
        let text = self.block_comment.replace_all(&text, "");
        self.unterminated_comment.replace_all(&text, "").into_owned()
    }

    pub fn apply(&self, text: &str) -> String {
        let text = self.strip_comments(text);
        let text = self.spaces.replace_all(&text, " ");
        let text = self.blank_lines.replace_all(&text, "\n");
        text.trim().to_string()
    }
}

/// Run the shared filter over `text`
pub fn clean_source(text: &str) -> Result<String, regex::Error> {
    Ok(CleanupFilter::shared()?.apply(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_comments_are_removed() {
        let cleaned = clean_source("El x Puntual; /* contador */\nx Dice 1;").unwrap();
        assert_eq!(cleaned, "El x Puntual; \nx Dice 1;");
    }

    #[test]
    fn test_multiline_comment() {
        let cleaned = clean_source("Para p {\n/* linea uno\nlinea dos */\n} Fin").unwrap();
        assert_eq!(cleaned, "Para p {\n} Fin");
    }

    #[test]
    fn test_unterminated_comment_drops_line() {
        let cleaned = clean_source("El x Puntual;\nx Dice 1; /* sin cierre\nSe_Escribe x;").unwrap();
        assert_eq!(cleaned, "El x Puntual;\nSe_Escribe x;");
    }

    #[test]
    fn test_elision_markers() {
        let cleaned = clean_source("El-el x Puntual;").unwrap();
        assert_eq!(cleaned, "El x Puntual;");
        // Longer words survive
        assert_eq!(clean_source("a -alto").unwrap(), "a -alto");
        // Negative numbers are not markers
        assert_eq!(clean_source("x Dice -5;").unwrap(), "x Dice -5;");
    }

    #[test]
    fn test_whitespace_normalization() {
        let cleaned = clean_source("  Para\t\tp   {\n\n\n   }  Fin  ").unwrap();
        assert_eq!(cleaned, "Para p {\n } Fin");
    }

    #[test]
    fn test_shared_filter_compiles() {
        assert!(CleanupFilter::shared().is_ok());
    }
}
