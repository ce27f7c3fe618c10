use crate::models::Chunk;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // [[claim text]]^[id1, id2]
    // Both groups are lazy so a claim may carry inert "[[...]]" text of its own;
    // only the full "]]^[" sequence closes it. Claim text may wrap onto new lines
    // but never crosses a blank line, so a stray "[[" stays inside its paragraph.
    static ref CLAIM_SPAN: Regex =
        Regex::new(r"\[\[((?:[^\n]|\n[^\n])*?\n?)\]\]\^\[(.*?)\]").unwrap();
}

/// Splits annotated text into filler and claim chunks, in document order.
///
/// Anything that does not match the full claim-span grammar (an unbalanced
/// bracket, a missing `^`) stays in the surrounding filler verbatim.
pub fn parse_chunks(annotated: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut last_end = 0;

    for caps in CLAIM_SPAN.captures_iter(annotated) {
        // Group 0 always participates in a match
        let Some(span) = caps.get(0) else { continue };

        if span.start() > last_end {
            chunks.push(Chunk::filler(&annotated[last_end..span.start()]));
        }

        let claim_text = caps.get(1).map_or("", |m| m.as_str());
        let ids = caps.get(2).map_or("", |m| m.as_str());
        chunks.push(Chunk::claim(claim_text, split_ids(ids)));

        last_end = span.end();
    }

    // Trailing filler, or the whole input when no claim matched
    if last_end < annotated.len() {
        chunks.push(Chunk::filler(&annotated[last_end..]));
    }

    chunks
}

// "id1, id2" -> ["id1", "id2"]; "" -> []. Order and duplicates are kept as written.
fn split_ids(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Writes a claim back out in marker form. Ids are joined with a bare comma,
/// so `^[1, 2]` comes back as `^[1,2]`.
pub fn format_claim(text: &str, ids: &[String]) -> String {
    format!("[[{}]]^[{}]", text, ids.join(","))
}

/// Counts well-formed claim spans without building chunks.
pub fn count_claims(annotated: &str) -> usize {
    CLAIM_SPAN.find_iter(annotated).count()
}

/// Every cited id in the text, in order of appearance, duplicates included.
pub fn cited_ids(annotated: &str) -> Vec<String> {
    CLAIM_SPAN
        .captures_iter(annotated)
        .flat_map(|caps| split_ids(caps.get(2).map_or("", |m| m.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn concat(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn text_without_claims_is_one_filler_chunk() {
        let input = "Just **prose**,\n  with [brackets] and [[half markers.";
        assert_eq!(parse_chunks(input), vec![Chunk::filler(input)]);
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(parse_chunks("").is_empty());
    }

    #[test]
    fn splits_filler_and_claims() {
        let chunks = parse_chunks("Intro. [[Parks are popular.]]^[1, 2] Outro.");
        assert_eq!(
            chunks,
            vec![
                Chunk::filler("Intro. "),
                Chunk::claim("Parks are popular.", vec!["1".into(), "2".into()]),
                Chunk::filler(" Outro."),
            ]
        );
    }

    #[test]
    fn adjacent_claims_have_no_filler_between() {
        let chunks = parse_chunks("[[A.]]^[1][[B.]]^[2]");
        assert_eq!(
            chunks,
            vec![
                Chunk::claim("A.", vec!["1".into()]),
                Chunk::claim("B.", vec!["2".into()]),
            ]
        );
        assert_eq!(concat(&chunks), "A.B.");
    }

    #[test]
    fn empty_id_list_is_still_a_claim() {
        let chunks = parse_chunks("[[Unsupported.]]^[]");
        assert_eq!(chunks, vec![Chunk::claim("Unsupported.", vec![])]);
    }

    #[test]
    fn nested_brackets_are_inert_content() {
        let chunks = parse_chunks("[[Grounded [[inception]] claim...]]^[id1]");
        assert_eq!(
            chunks,
            vec![Chunk::claim("Grounded [[inception]] claim...", vec!["id1".into()])]
        );
    }

    #[test]
    fn ids_are_not_deduplicated_or_sorted() {
        let chunks = parse_chunks("[[X]]^[ 3 ,1,3 ]");
        assert_eq!(
            chunks[0].representative_comment_ids,
            Some(vec!["3".into(), "1".into(), "3".into()])
        );
    }

    #[test]
    fn concatenation_preserves_markdown_and_whitespace() {
        let input = "## Topic\n\n* [[First point,]]^[1] and *more*\n* [[Second\npoint.]]^[2,3]\n\n";
        let chunks = parse_chunks(input);
        assert_eq!(
            concat(&chunks),
            "## Topic\n\n* First point, and *more*\n* Second\npoint.\n\n"
        );
    }

    #[test]
    fn malformed_markers_fall_through_to_filler() {
        let input = "Broken [[claim]][1] and [[another]]^ [2].";
        assert_eq!(parse_chunks(input), vec![Chunk::filler(input)]);
    }

    #[test]
    fn stray_open_marker_does_not_swallow_later_paragraphs() {
        let chunks = parse_chunks("Intro [[oops\n\n## Heading\n\nText [[Real.]]^[1]");
        assert_eq!(
            chunks,
            vec![
                Chunk::filler("Intro [[oops\n\n## Heading\n\nText "),
                Chunk::claim("Real.", vec!["1".into()]),
            ]
        );
    }

    #[test]
    fn claim_may_end_with_a_line_break() {
        let chunks = parse_chunks("[[Wrapped\nclaim\n]]^[1]");
        assert_eq!(chunks, vec![Chunk::claim("Wrapped\nclaim\n", vec!["1".into()])]);
    }

    #[test]
    fn counts_and_collects_ids() {
        let input = "[[a]]^[1,2] b [[c]]^[] d [[e]]^[2]";
        assert_eq!(count_claims(input), 3);
        assert_eq!(cited_ids(input), vec!["1", "2", "2"]);
    }

    #[test]
    fn format_claim_round_trips() {
        let ids = vec!["4".to_string(), "5".to_string()];
        let marker = format_claim("Claim.", &ids);
        assert_eq!(marker, "[[Claim.]]^[4,5]");
        assert_eq!(parse_chunks(&marker), vec![Chunk::claim("Claim.", ids)]);
    }
}
