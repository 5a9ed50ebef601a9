//! The fixed catalog of candidate topics.

use crate::error::{AutocastError, Result};
use std::path::Path;

/// Built-in topics used when no pool file is configured.
const DEFAULT_TOPICS: &[&str] = &[
    "The Library of Alexandria and what was really lost",
    "How the Polynesians navigated the Pacific without instruments",
    "The Great Stink of London and the birth of modern sewers",
    "Tardigrades and the limits of survival",
    "The Antikythera mechanism",
    "The Tunguska event of 1908",
    "How the longitude problem was solved",
    "The Voynich manuscript",
    "The history of the printing press in Asia and Europe",
    "The Carrington Event and solar storms",
    "The lost colony of Roanoke",
    "How bees decide where to build a new hive",
    "The Dancing Plague of 1518",
    "The discovery of the Rosetta Stone and the decipherment of hieroglyphs",
    "The Svalbard Global Seed Vault",
    "The invention of zero",
    "The Silk Road as a network of ideas",
    "Why the Bronze Age collapsed",
    "The science of sleep and dreaming",
    "The mystery of the Nazca lines",
    "How the transatlantic telegraph cable was laid",
    "The Krakatoa eruption of 1883",
    "The history of timekeeping and the atomic clock",
    "Octopus intelligence",
    "The rise and fall of the Hanseatic League",
    "Göbekli Tepe and the origins of monumental architecture",
    "The Great Molasses Flood of 1919",
    "How the Dutch reclaimed land from the sea",
    "The discovery of penicillin",
    "The Mpemba effect and other physics puzzles",
];

/// An ordered, immutable sequence of topics indexed `0..N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPool {
    topics: Vec<String>,
}

impl TopicPool {
    /// Create a pool from topics. An empty pool is rejected.
    pub fn new(topics: Vec<String>) -> Result<Self> {
        if topics.is_empty() {
            return Err(AutocastError::Config("Topic pool is empty".to_string()));
        }
        Ok(Self { topics })
    }

    /// The compiled-in pool.
    pub fn builtin() -> Self {
        Self {
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Parse a pool from text: one topic per line, blank and `#` lines skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let topics = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self::new(topics)
    }

    /// Load a pool from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AutocastError::Config(format!("Cannot read topic pool {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load from `path` if given, otherwise the built-in pool.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.topics.get(index).map(String::as_str)
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let pool = TopicPool::parse("# history\nRome\n\n  Carthage  \n# science\nComets\n").unwrap();
        assert_eq!(pool.topics(), &["Rome", "Carthage", "Comets"]);
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(TopicPool::parse("# nothing here\n\n").is_err());
    }

    #[test]
    fn test_builtin_pool_has_unique_topics() {
        let pool = TopicPool::builtin();
        let unique: std::collections::HashSet<_> = pool.topics().iter().collect();
        assert_eq!(unique.len(), pool.len());
    }
}
