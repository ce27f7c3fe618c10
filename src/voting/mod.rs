use crate::models::{Comment, VoteTally};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const AGREE: i8 = 1;
pub const PASS: i8 = 0;
pub const DISAGREE: i8 = -1;

// One row of a participant-by-comment vote matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantVotes {
    pub participant_id: String,
    // Participants that were never clustered have no group
    #[serde(default)]
    pub group_id: Option<u32>,
    pub votes: HashMap<String, i8>,
}

// comment id -> (group id -> tally)
pub type GroupTallies = HashMap<String, IndexMap<String, VoteTally>>;

/// Aggregates raw participant votes into per-group tallies for every comment.
///
/// Every group seen anywhere in the matrix gets an entry for every voted-on
/// comment, zero-filled, with groups ordered by ascending group id.
pub fn tally_by_group(participants: &[ParticipantVotes]) -> GroupTallies {
    // Collect the set of groups first so every comment lists them all
    let groups: BTreeSet<u32> = participants.iter().filter_map(|p| p.group_id).collect();

    // comment id -> group id -> (agree, disagree, pass)
    let mut counts: HashMap<String, HashMap<u32, (u64, u64, u64)>> = HashMap::new();
    let mut skipped = 0usize;

    for participant in participants {
        let Some(group_id) = participant.group_id else {
            skipped += 1;
            continue;
        };

        for (comment_id, value) in &participant.votes {
            let entry = counts
                .entry(comment_id.clone())
                .or_default()
                .entry(group_id)
                .or_insert((0, 0, 0));

            match *value {
                AGREE => entry.0 += 1,
                DISAGREE => entry.1 += 1,
                PASS => entry.2 += 1,
                other => warn!(
                    "Ignoring vote value {} from participant {} on comment {}",
                    other, participant.participant_id, comment_id
                ),
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} participant(s) without a group", skipped);
    }

    counts
        .into_iter()
        .map(|(comment_id, by_group)| {
            let tallies = groups
                .iter()
                .map(|group_id| {
                    let (agree, disagree, pass) =
                        by_group.get(group_id).copied().unwrap_or((0, 0, 0));
                    (group_id.to_string(), VoteTally::new(agree, disagree, Some(pass)))
                })
                .collect();
            (comment_id, tallies)
        })
        .collect()
}

/// Returns copies of `comments` carrying the tallies computed for them.
/// Comments nobody voted on keep whatever vote data they already had.
pub fn attach_vote_tallies(comments: &[Comment], tallies: &GroupTallies) -> Vec<Comment> {
    comments
        .iter()
        .map(|comment| match tallies.get(&comment.id) {
            Some(groups) => comment.clone().with_votes(groups.clone()),
            None => comment.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, group_id: Option<u32>, votes: &[(&str, i8)]) -> ParticipantVotes {
        ParticipantVotes {
            participant_id: id.to_string(),
            group_id,
            votes: votes.iter().map(|(c, v)| (c.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn counts_votes_per_group() {
        let participants = vec![
            participant("p1", Some(0), &[("1", AGREE), ("2", DISAGREE)]),
            participant("p2", Some(0), &[("1", AGREE), ("2", PASS)]),
            participant("p3", Some(1), &[("1", DISAGREE)]),
        ];

        let tallies = tally_by_group(&participants);

        let comment_1 = &tallies["1"];
        assert_eq!(comment_1["0"], VoteTally::new(2, 0, Some(0)));
        assert_eq!(comment_1["1"], VoteTally::new(0, 1, Some(0)));

        // Group 1 never voted on comment 2 but still gets a zeroed tally
        let comment_2 = &tallies["2"];
        assert_eq!(comment_2["0"], VoteTally::new(0, 1, Some(1)));
        assert_eq!(comment_2["1"], VoteTally::new(0, 0, Some(0)));
    }

    #[test]
    fn groups_are_ordered_numerically() {
        let participants = vec![
            participant("a", Some(10), &[("1", AGREE)]),
            participant("b", Some(2), &[("1", AGREE)]),
        ];

        let tallies = tally_by_group(&participants);
        let keys: Vec<&str> = tallies["1"].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2", "10"]);
    }

    #[test]
    fn ungrouped_participants_and_bad_values_are_ignored() {
        let participants = vec![
            participant("a", None, &[("1", AGREE)]),
            participant("b", Some(0), &[("1", 5), ("1b", AGREE)]),
        ];

        let tallies = tally_by_group(&participants);
        assert_eq!(tallies["1"]["0"].total_count, 0);
        assert_eq!(tallies["1b"]["0"].agree_count, 1);
    }

    #[test]
    fn attaches_tallies_without_touching_the_rest() {
        let comments = vec![Comment::new("1", "one"), Comment::new("9", "nine")];
        let participants = vec![participant("a", Some(0), &[("1", AGREE)])];

        let attached = attach_vote_tallies(&comments, &tally_by_group(&participants));

        assert_eq!(attached[0].total_votes(), Some(1));
        assert_eq!(attached[1].vote_tallies_by_group, None);
        assert_eq!(comments[0].vote_tallies_by_group, None);
    }
}
