// Prompt builders for the four grounding stages. Each is a pure function of
// its inputs; the marker grammar described here must match `annotation`.

use crate::citations::vote_tally_summary;
use crate::models::Comment;

pub const MAX_IDS_PER_CLAIM: usize = 5;

const MARKER_GRAMMAR: &str = "A claim is marked by wrapping it in double square brackets and \
following it immediately with a caret and a bracketed, comma-separated list of comment ids, \
like this: [[The claim text.]]^[12,40]. Punctuation that ends the claim goes inside the double \
brackets. A claim with no supporting comments keeps an empty list: [[The claim text.]]^[].";

const OUTPUT_RULES: &str = "Return only the full summary text with the markers applied. Keep \
all other text, headings, Markdown syntax and line breaks exactly as they are. Do not add any \
commentary before or after the summary.";

fn comments_section(comments: &[Comment]) -> String {
    let mut section = String::from("<comments>\n");
    for comment in comments {
        section.push_str(&format!("<comment id=\"{}\">\n{}\n", comment.id, comment.text.trim()));
        if comment.vote_tallies_by_group.is_some() {
            section.push_str(&format!("votes: {}\n", vote_tally_summary(comment)));
        }
        section.push_str("</comment>\n");
    }
    section.push_str("</comments>");
    section
}

pub fn identify_claims(summary: &str) -> String {
    format!(
        "You are reviewing a summary of public comments. Mark every substantive claim in the \
summary that should be backed by specific comments: statements about what participants said, \
wanted, agreed or disagreed on. Introductory and transitional sentences, headings and \
conclusions drawn only from other claims are not claims.\n\n\
{grammar}\n\n\
At this stage every list must be empty: use ^[] after every claim.\n\n\
{rules}\n\n\
<summary>\n{summary}\n</summary>",
        grammar = MARKER_GRAMMAR,
        rules = OUTPUT_RULES,
        summary = summary,
    )
}

pub fn assign_grounding(marked_summary: &str, comments: &[Comment]) -> String {
    format!(
        "You are grounding a summary of public comments in the comments themselves. The claims \
in the summary are already marked.\n\n\
{grammar}\n\n\
For each marked claim, add the ids of up to {max} comments that best substantiate it. Prefer \
comments that offer strong textual support or whose votes show a clear stance. Comments that \
most groups strongly disagree with are evidence too, just as much as comments most groups \
strongly agree with. Keep any ids already present; only add to the lists. Use only ids that \
appear in the comments below. Do not change the wording of any claim and do not add or remove \
claims.\n\n\
{rules}\n\n\
{comments}\n\n\
<summary>\n{summary}\n</summary>",
        grammar = MARKER_GRAMMAR,
        max = MAX_IDS_PER_CLAIM,
        rules = OUTPUT_RULES,
        comments = comments_section(comments),
        summary = marked_summary,
    )
}

pub fn verify_grounding(assigned_summary: &str, comments: &[Comment]) -> String {
    format!(
        "You are checking the citations in a grounded summary of public comments.\n\n\
{grammar}\n\n\
For each marked claim, read every cited comment in full, including its per-group vote \
breakdown, and remove the id of any comment that does not actually substantiate the claim. \
Pay particular attention to votes: a claim must not describe strong or widespread support if \
any opinion group's disagree count on a related comment is materially higher than its agree \
count. Remove ids that would misrepresent the votes that way. Never add new ids, never remove \
a claim's markers (leave an empty list if nothing remains), and do not change any wording.\n\n\
{rules}\n\n\
{comments}\n\n\
<summary>\n{summary}\n</summary>",
        grammar = MARKER_GRAMMAR,
        rules = OUTPUT_RULES,
        comments = comments_section(comments),
        summary = assigned_summary,
    )
}

pub fn finalize_grounding(verified_summary: &str) -> String {
    format!(
        "You are finishing a grounded summary of public comments.\n\n\
{grammar}\n\n\
Delete every claim whose list is empty (marked ^[]) together with its markers, and adjust the \
surrounding text only as much as needed so that what remains still reads naturally. Leave \
every claim that has at least one id exactly as it is, markers included.\n\n\
{rules}\n\n\
<summary>\n{summary}\n</summary>",
        grammar = MARKER_GRAMMAR,
        rules = OUTPUT_RULES,
        summary = verified_summary,
    )
}
