//! Stock-footage search terms.
//!
//! Terms are edited as one comma-joined string but carried as an ordered,
//! deduplicated list.  Deduplication is case-insensitive and keeps the first
//! spelling seen.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered set of English search keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TermsRepr", into = "String")]
pub struct VideoTerms(Vec<String>);

impl VideoTerms {
    /// Build from individual terms, trimming and dropping blanks and
    /// duplicates.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            if out.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                continue;
            }
            out.push(term.to_string());
        }
        Self(out)
    }

    /// Parse the comma-joined editing form (`"coffee, beans"`).
    pub fn parse(joined: &str) -> Self {
        Self::from_terms(joined.split(','))
    }

    /// The comma-joined editing form.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for VideoTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<VideoTerms> for String {
    fn from(terms: VideoTerms) -> Self {
        terms.joined()
    }
}

impl<'a> IntoIterator for &'a VideoTerms {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Task files may spell terms either as `"a, b"` or as `["a", "b"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TermsRepr {
    Joined(String),
    List(Vec<String>),
}

impl From<TermsRepr> for VideoTerms {
    fn from(repr: TermsRepr) -> Self {
        match repr {
            TermsRepr::Joined(s) => VideoTerms::parse(&s),
            TermsRepr::List(list) => VideoTerms::from_terms(list),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_blanks() {
        let terms = VideoTerms::parse(" coffee ,, ethiopia,  beans ,");
        assert_eq!(terms.as_slice(), ["coffee", "ethiopia", "beans"]);
    }

    #[test]
    fn duplicates_keep_first_spelling() {
        let terms = VideoTerms::parse("Coffee, beans, coffee, BEANS, cup");
        assert_eq!(terms.as_slice(), ["Coffee", "beans", "cup"]);
    }

    #[test]
    fn joined_uses_comma_space() {
        let terms = VideoTerms::from_terms(["coffee", "ethiopia", "beans"]);
        assert_eq!(terms.joined(), "coffee, ethiopia, beans");
        assert_eq!(terms.to_string(), "coffee, ethiopia, beans");
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(VideoTerms::parse("").is_empty());
        assert!(VideoTerms::parse(" , ,").is_empty());
    }

    #[test]
    fn deserializes_from_list_or_string() {
        #[derive(Deserialize)]
        struct Holder {
            terms: VideoTerms,
        }

        let a: Holder = toml::from_str(r#"terms = "a, b""#).unwrap();
        let b: Holder = toml::from_str(r#"terms = ["a", "b", "A"]"#).unwrap();
        assert_eq!(a.terms, b.terms);
        assert_eq!(a.terms.len(), 2);
    }
}
