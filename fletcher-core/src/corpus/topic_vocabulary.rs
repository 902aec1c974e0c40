use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Topics of the financial news deployment, in matrix column order
pub const DEFAULT_TOPICS: [&str; 15] = [
    "Valuation",
    "IPO/SEO",
    "Recommendations",
    "Biotechnology",
    "Capital Markets",
    "Energy",
    "Management",
    "Earnings",
    "Federal Reserve",
    "Retail",
    "Technology",
    "Mergers & Acquisitions",
    "Debt Offerings",
    "Corporate Strategy",
    "Job Market",
];

/// Ordered topic names, one per topic matrix column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicVocabulary {
    topics: Vec<String>,
}

impl Default for TopicVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect())
    }
}

impl TopicVocabulary {
    pub fn new(topics: Vec<String>) -> Self {
        Self { topics }
    }

    /// Parse a JSON array of topic names
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Topic vocabulary must be a JSON array of strings")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read topic vocabulary {path:?}"))?;
        Self::from_json(&bytes)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.topics.get(index).map(String::as_str)
    }

    /// Names for a list of column indices; unknown indices are skipped
    pub fn names(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.name(i).map(str::to_string))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let vocabulary = TopicVocabulary::default();
        assert_eq!(vocabulary.len(), 15);
        assert_eq!(vocabulary.name(0), Some("Valuation"));
        assert_eq!(vocabulary.name(14), Some("Job Market"));
        assert_eq!(vocabulary.name(15), None);
    }

    #[test]
    fn test_names() {
        let vocabulary = TopicVocabulary::default();
        assert_eq!(
            vocabulary.names(&[7, 8, 0]),
            vec!["Earnings", "Federal Reserve", "Valuation"]
        );
    }

    #[test]
    fn test_from_json() -> Result<()> {
        let vocabulary = TopicVocabulary::from_json(br#"["Energy", "Retail", "Technology"]"#)?;
        assert_eq!(vocabulary.iter().collect::<Vec<_>>(), ["Energy", "Retail", "Technology"]);
        assert!(TopicVocabulary::from_json(br#"{"topics": []}"#).is_err());
        Ok(())
    }
}
