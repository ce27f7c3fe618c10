use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    // Keyed by opinion group id, kept in the order the groups were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_tallies_by_group: Option<IndexMap<String, VoteTally>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub agree_count: u64,
    pub disagree_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_count: Option<u64>,
    pub total_count: u64,
}

/// One parsed unit of a summary: filler text when `representative_comment_ids`
/// is `None`, a grounded claim otherwise (the list may be empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative_comment_ids: Option<Vec<String>>,
}

impl Comment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            vote_tallies_by_group: None,
        }
    }

    pub fn with_votes(mut self, tallies: IndexMap<String, VoteTally>) -> Self {
        self.vote_tallies_by_group = Some(tallies);
        self
    }

    // Sum of the group totals, None when the comment carries no vote data
    pub fn total_votes(&self) -> Option<u64> {
        self.vote_tallies_by_group
            .as_ref()
            .map(|groups| groups.values().map(|tally| tally.total_count).sum())
    }
}

impl VoteTally {
    pub fn new(agree_count: u64, disagree_count: u64, pass_count: Option<u64>) -> Self {
        Self {
            agree_count,
            disagree_count,
            pass_count,
            total_count: agree_count + disagree_count + pass_count.unwrap_or(0),
        }
    }

    pub fn pass_count_or_zero(&self) -> u64 {
        self.pass_count.unwrap_or(0)
    }

    pub fn agree_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.agree_count as f64 / self.total_count as f64
    }

    pub fn disagree_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.disagree_count as f64 / self.total_count as f64
    }

    // A group is divided against a comment when disagreement outweighs agreement
    pub fn is_divisive(&self) -> bool {
        self.disagree_count > self.agree_count
    }
}

impl Chunk {
    pub fn filler(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            representative_comment_ids: None,
        }
    }

    pub fn claim(text: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            text: text.into(),
            representative_comment_ids: Some(ids),
        }
    }

    pub fn is_claim(&self) -> bool {
        self.representative_comment_ids.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_total_includes_missing_pass_as_zero() {
        let tally = VoteTally::new(3, 2, None);
        assert_eq!(tally.total_count, 5);
        assert_eq!(tally.pass_count_or_zero(), 0);
        assert!(!tally.is_divisive());
    }

    #[test]
    fn rates_are_zero_without_votes() {
        let tally = VoteTally::default();
        assert_eq!(tally.agree_rate(), 0.0);
        assert_eq!(tally.disagree_rate(), 0.0);
    }

    #[test]
    fn comment_deserializes_from_camel_case() {
        let json = r#"{
            "id": "7",
            "text": "More parks",
            "voteTalliesByGroup": {
                "1": {"agreeCount": 1, "disagreeCount": 4, "totalCount": 5},
                "0": {"agreeCount": 10, "disagreeCount": 2, "passCount": 3, "totalCount": 15}
            }
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        let groups = comment.vote_tallies_by_group.as_ref().unwrap();

        // Insertion order survives deserialization
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "0"]);
        assert!(groups["1"].is_divisive());
        assert_eq!(comment.total_votes(), Some(20));
    }

    #[test]
    fn filler_and_empty_claim_are_distinct() {
        assert!(!Chunk::filler("x").is_claim());
        assert!(Chunk::claim("x", vec![]).is_claim());
    }
}
