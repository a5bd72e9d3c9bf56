/// Rendered markup plus the data collected while rendering it.
///
/// Values are built bottom-up and combined with [`ParseResult::merge`]; a
/// sibling list folds into one value through `FromIterator`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseResult {
    /// Safe HTML fragment.
    pub text: String,
    /// `@name` and `/u/name` mentions, in document order, duplicates kept.
    pub mentions: Vec<String>,
    /// Link targets and bare URLs.
    pub urls: Vec<String>,
    /// Sources of `img` and `video` tags.
    pub images: Vec<String>,
}

impl ParseResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Appends `other` after `self`.
    pub fn merge(mut self, other: ParseResult) -> Self {
        self.extend(Some(other));
        self
    }

    /// Surrounds the rendered text, leaving the collections untouched.
    pub fn wrap(mut self, open: &str, close: &str) -> Self {
        self.text.insert_str(0, open);
        self.text.push_str(close);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }
}

impl Extend<ParseResult> for ParseResult {
    fn extend<I: IntoIterator<Item = ParseResult>>(&mut self, iter: I) {
        for other in iter {
            self.text.push_str(&other.text);
            self.mentions.extend(other.mentions);
            self.urls.extend(other.urls);
            self.images.extend(other.images);
        }
    }
}

impl FromIterator<ParseResult> for ParseResult {
    fn from_iter<I: IntoIterator<Item = ParseResult>>(iter: I) -> Self {
        let mut result = ParseResult::default();
        result.extend(iter);
        result
    }
}
