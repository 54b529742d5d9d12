//! Fuzzy matching for the search-all mode, built on nucleo.
//!
//! The plain filter (`/`) is a title substring match handled by the engine;
//! this module powers `Ctrl+/`, which fuzzy-matches across id, title,
//! labels, and description with multi-term AND semantics.

use crate::data::IssueRecord;
use nucleo::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

pub struct FuzzySearch {
    matcher: Matcher,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzySearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    fn match_term(&mut self, term: &str, haystack: &str) -> Option<u32> {
        if term.is_empty() || haystack.is_empty() {
            return if term.is_empty() { Some(0) } else { None };
        }
        let pattern = Pattern::parse(term, CaseMatching::Ignore, Normalization::Smart);
        let mut buf = Vec::new();
        let haystack = Utf32Str::new(haystack, &mut buf);
        pattern.score(haystack, &mut self.matcher)
    }

    /// Split the query on whitespace; every term must match somewhere in the
    /// haystack (AND semantics). Returns the summed score.
    pub fn multi_term_match(&mut self, query: &str, haystack: &str) -> Option<u32> {
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return Some(0);
        }
        let mut total = 0u32;
        for term in terms {
            total = total.saturating_add(self.match_term(term, haystack)?);
        }
        Some(total)
    }

    /// Match a record across its searchable fields, weighted: id beats
    /// title beats labels beats description. Returns the best score.
    pub fn search_record(&mut self, record: &IssueRecord, query: &str) -> Option<u32> {
        let mut best: Option<u32> = None;

        let mut consider = |score: Option<u32>, weight: u32| {
            if let Some(score) = score {
                let weighted = score.saturating_mul(weight);
                if best.map_or(true, |b| weighted > b) {
                    best = Some(weighted);
                }
            }
        };

        let id_score = self.multi_term_match(query, &record.id);
        consider(id_score, 10);
        let title_score = self.multi_term_match(query, &record.title);
        consider(title_score, 8);
        for label in &record.labels {
            let label_score = self.multi_term_match(query, label);
            consider(label_score, 4);
        }
        if let Some(desc) = &record.description {
            let desc_score = self.multi_term_match(query, desc);
            consider(desc_score, 2);
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Priority;
    use chrono::Utc;

    fn record(id: &str, title: &str, labels: &[&str]) -> IssueRecord {
        IssueRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            status: "open".to_string().into(),
            priority: Priority(2),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            relationships: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_multi_term_and_semantics() {
        let mut search = FuzzySearch::new();
        assert!(search.multi_term_match("tree view", "the tree view").is_some());
        assert!(search.multi_term_match("tree xyz", "the tree view").is_none());
    }

    #[test]
    fn test_matches_id_title_and_labels() {
        let mut search = FuzzySearch::new();
        let r = record("ab-12", "Fix login redirect", &["auth", "backend"]);
        assert!(search.search_record(&r, "ab-12").is_some());
        assert!(search.search_record(&r, "login").is_some());
        assert!(search.search_record(&r, "backend").is_some());
        assert!(search.search_record(&r, "frontend").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let mut search = FuzzySearch::new();
        let r = record("ab-1", "Redesign Settings Page", &[]);
        assert!(search.search_record(&r, "SETTINGS").is_some());
    }
}
