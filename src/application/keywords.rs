//! # Keyword Responses
//!
//! Matches free-text messages against the configured keyword table and picks a reply.
//! The table keeps the order of the config file, so the first listed keyword wins.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeywordResponse {
    Single(String),
    Choices(Vec<String>),
}

impl KeywordResponse {
    /// The reply itself, or one candidate chosen uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        match self {
            KeywordResponse::Single(reply) => Some(reply.as_str()),
            KeywordResponse::Choices(choices) => choices.choose(rng).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct KeywordTable {
    /// (lowercased keyword, response), in declaration order
    entries: Vec<(String, KeywordResponse)>,
}

impl TryFrom<Map<String, Value>> for KeywordTable {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut table = KeywordTable::default();
        for (keyword, value) in map {
            let response: KeywordResponse = serde_json::from_value(value).map_err(|_| {
                format!("response for `{keyword}` must be a string or a list of strings")
            })?;
            table.insert(&keyword, response)?;
        }
        Ok(table)
    }
}

impl KeywordTable {
    pub fn insert(&mut self, keyword: &str, response: KeywordResponse) -> Result<(), String> {
        let keyword = keyword.to_lowercase();
        if keyword.trim().is_empty() {
            return Err("keywords must not be empty".to_string());
        }
        if let KeywordResponse::Choices(choices) = &response {
            if choices.is_empty() {
                return Err(format!("keyword `{keyword}` has an empty response list"));
            }
        }
        self.entries.push((keyword, response));
        Ok(())
    }

    /// First entry whose keyword occurs in `body`, ignoring case.
    pub fn find(&self, body: &str) -> Option<(&str, &KeywordResponse)> {
        let body = body.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| body.contains(keyword.as_str()))
            .map(|(keyword, response)| (keyword.as_str(), response))
    }

    /// At most one reply for `body`, or `None` when no keyword matches.
    pub fn respond<R: Rng + ?Sized>(&self, body: &str, rng: &mut R) -> Option<String> {
        let (keyword, response) = self.find(body)?;
        tracing::debug!("Keyword `{}` matched", keyword);
        response.pick(rng).map(str::to_string)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn table(json: &str) -> KeywordTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_case_insensitive_substring() {
        let t = table(r#"{"hello": "hi there"}"#);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(t.respond("HELLO there", &mut rng).as_deref(), Some("hi there"));
        assert_eq!(t.respond("well, hElLo!", &mut rng).as_deref(), Some("hi there"));
        assert_eq!(t.respond("goodbye", &mut rng), None);
    }

    #[test]
    fn test_uppercase_keyword_matches() {
        let t = table(r#"{"Rust": "🦀"}"#);
        assert!(t.find("i love rust").is_some());
    }

    #[test]
    fn test_first_declared_keyword_wins() {
        let t = table(r#"{"zebra": "z", "apple": "a"}"#);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(t.respond("apple zebra", &mut rng).as_deref(), Some("z"));
    }

    #[test]
    fn test_every_candidate_eventually_chosen() {
        let t = table(r#"{"bye": ["one", "two", "three"]}"#);
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<String> = (0..200)
            .filter_map(|_| t.respond("bye", &mut rng))
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert!(serde_json::from_str::<KeywordTable>(r#"{"x": []}"#).is_err());
        assert!(serde_json::from_str::<KeywordTable>(r#"{"x": 5}"#).is_err());
        assert!(serde_json::from_str::<KeywordTable>(r#"{"": "y"}"#).is_err());
    }
}
