//! Deny-list recognizer for known person names

use super::{char_result, EntityRecognizer, RecognizerResult};
use crate::entity::{EntityType, TextSpan};
use crate::text::CharIndex;
use crate::error::{Error, Result};
use regex::Regex;

/// Default confidence for deny-list hits
const DENY_LIST_SCORE: f64 = 0.85;

/// Matches a fixed list of terms as whole words, case-sensitively.
pub struct DenyListRecognizer {
    name: String,
    entities: Vec<EntityType>,
    regex: Option<Regex>,
    score: f64,
}

impl DenyListRecognizer {
    /// Recognizer emitting `entity_type` for every listed term.
    ///
    /// Longer terms win when terms share a prefix ("Ann Lee" over "Ann").
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        terms: &[String],
    ) -> Result<Self> {
        let name = name.into();
        let mut terms: Vec<&str> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        terms.dedup();

        let regex = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| bounded(t))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&format!("(?:{})", alternation)).map_err(|e| {
                Error::Pattern {
                    recognizer: name.clone(),
                    source: e,
                }
            })?;
            Some(regex)
        };

        Ok(Self {
            name,
            entities: vec![entity_type],
            regex,
            score: DENY_LIST_SCORE,
        })
    }

    /// Person-name recognizer for the configured names.
    pub fn person_names(names: &[String]) -> Result<Self> {
        Self::new("person_names", EntityType::Person, names)
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }
}

/// Escaped term with a word boundary on each side that starts or ends in
/// a word character.
fn bounded(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let boundary = |c: Option<char>| if c.is_some_and(is_word) { r"\b" } else { "" };
    format!(
        "{}{}{}",
        boundary(term.chars().next()),
        regex::escape(term),
        boundary(term.chars().last())
    )
}

impl EntityRecognizer for DenyListRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entities
    }

    fn analyze(
        &self,
        text: &str,
        entities: &[EntityType],
        _language: &str,
    ) -> Result<Vec<RecognizerResult>> {
        let Some(regex) = &self.regex else {
            return Ok(Vec::new());
        };
        if !entities.contains(&self.entities[0]) {
            return Ok(Vec::new());
        }

        let index = CharIndex::new(text);
        Ok(regex
            .find_iter(text)
            .filter_map(|m| {
                let span = TextSpan {
                    start: m.start(),
                    end: m.end(),
                };
                char_result(&index, &self.entities[0], span, self.score)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn spans(recognizer: &DenyListRecognizer, text: &str) -> Vec<String> {
        recognizer
            .analyze(text, &[EntityType::Person], "en")
            .unwrap()
            .into_iter()
            .map(|r| text.chars().skip(r.start).take(r.end - r.start).collect())
            .collect()
    }

    #[test]
    fn test_whole_word_match() {
        let recognizer = DenyListRecognizer::person_names(&names(&["John"])).unwrap();
        assert_eq!(spans(&recognizer, "Contact John at Johnson Ltd"), vec!["John"]);
    }

    #[test]
    fn test_case_sensitive() {
        let recognizer = DenyListRecognizer::person_names(&names(&["John"])).unwrap();
        assert!(spans(&recognizer, "mail john@example.com").is_empty());
    }

    #[test]
    fn test_longest_term_preferred() {
        let recognizer = DenyListRecognizer::person_names(&names(&["Ann", "Ann Lee"])).unwrap();
        assert_eq!(spans(&recognizer, "ask Ann Lee or Ann"), vec!["Ann Lee", "Ann"]);
    }

    #[test]
    fn test_special_characters_escaped() {
        let recognizer = DenyListRecognizer::person_names(&names(&["J. Doe"])).unwrap();
        assert_eq!(spans(&recognizer, "signed J. Doe"), vec!["J. Doe"]);
        assert!(spans(&recognizer, "signed JX Doe").is_empty());
    }

    #[test]
    fn test_empty_list() {
        let recognizer = DenyListRecognizer::person_names(&names(&["", "  "])).unwrap();
        assert!(recognizer.is_empty());
        assert!(spans(&recognizer, "John").is_empty());
    }

    #[test]
    fn test_score() {
        let recognizer = DenyListRecognizer::person_names(&names(&["John"]))
            .unwrap()
            .with_score(0.6);
        let results = recognizer.analyze("John", &[EntityType::Person], "en").unwrap();
        assert_eq!(results[0].score, 0.6);
    }

    #[test]
    fn test_term_ending_in_punctuation() {
        let recognizer =
            DenyListRecognizer::person_names(&names(&["Dr.", "J. Doe Jr."])).unwrap();
        assert_eq!(
            spans(&recognizer, "ask Dr. Rao or J. Doe Jr. today"),
            vec!["Dr.", "J. Doe Jr."]
        );
        assert!(spans(&recognizer, "ask ADr. Rao").is_empty());
    }

    #[test]
    fn test_character_offsets() {
        let recognizer = DenyListRecognizer::person_names(&names(&["Jürgen"])).unwrap();
        let results = recognizer
            .analyze("Grüße an Jürgen", &[EntityType::Person], "en")
            .unwrap();
        assert_eq!((results[0].start, results[0].end), (9, 15));
    }
}
