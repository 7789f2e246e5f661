/// A fetched page, as handed from a fetcher to the extractors.
///
/// Never mutated after creation.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub html: String,
    /// Visible body text as rendered by a browser, when available
    pub text: Option<String>,
}

impl RawPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    pub fn is_rendered(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_dropped() {
        let page = RawPage::new("https://pasito.fun/e/x", "<html></html>").with_text("  \n ");
        assert!(page.text.is_none());
        assert!(!page.is_rendered());
    }

    #[test]
    fn test_rendered_text_is_kept() {
        let page = RawPage::new("https://pasito.fun/e/x", "<html></html>").with_text("Hello");
        assert_eq!(page.text.as_deref(), Some("Hello"));
        assert!(page.is_rendered());
    }
}
