//! Keyword, required-term and page-count rules for accepting a document.

use serde::Serialize;

/// Documents longer than this are discarded.
pub const DEFAULT_MAX_PAGES: usize = 3;

/// Terms a CV is expected to contain when the user does not override them.
pub const DEFAULT_REQUIRED_TERMS: [&str; 3] = ["experience", "education", "skills"];

/// Immutable rule set a document must satisfy to be kept.
///
/// Keywords and terms are stored trimmed and lowercased; blank entries are
/// dropped so an empty list really is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    keywords: Vec<String>,
    required_terms: Vec<String>,
    max_pages: usize,
}

impl Criteria {
    pub fn new<K, T>(keywords: K, required_terms: T) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            keywords: normalize(keywords),
            required_terms: normalize(required_terms),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn required_terms(&self) -> &[String] {
        &self.required_terms
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Returns true when the document satisfies every rule.
    pub fn evaluate(&self, text: &str, page_count: usize) -> bool {
        self.evaluation(text, page_count).passed()
    }

    /// Evaluates each rule separately so a rejection can be explained.
    pub fn evaluation(&self, text: &str, page_count: usize) -> Evaluation {
        let text = text.to_lowercase();

        let keyword_match =
            self.keywords.is_empty() || self.keywords.iter().any(|k| text.contains(k.as_str()));

        let missing_terms = self
            .required_terms
            .iter()
            .filter(|term| !text.contains(term.as_str()))
            .cloned()
            .collect();

        Evaluation {
            keyword_match,
            page_count,
            max_pages: self.max_pages,
            missing_terms,
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), DEFAULT_REQUIRED_TERMS)
    }
}

fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Per-rule result of evaluating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub keyword_match: bool,
    pub page_count: usize,
    pub max_pages: usize,
    pub missing_terms: Vec<String>,
}

impl Evaluation {
    pub fn page_count_ok(&self) -> bool {
        self.page_count <= self.max_pages
    }

    pub fn passed(&self) -> bool {
        self.keyword_match && self.page_count_ok() && self.missing_terms.is_empty()
    }

    /// Human readable reason for a rejection, `None` if the document passed.
    pub fn rejection_reason(&self) -> Option<String> {
        let mut reasons = Vec::new();
        if !self.keyword_match {
            reasons.push("no keyword found".to_string());
        }
        if !self.page_count_ok() {
            reasons.push(format!(
                "{} pages exceeds limit of {}",
                self.page_count, self.max_pages
            ));
        }
        if !self.missing_terms.is_empty() {
            reasons.push(format!("missing terms: {}", self.missing_terms.join(", ")));
        }

        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}
