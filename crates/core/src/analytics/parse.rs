use crate::domain::insight::{
    ActionableRecommendation, Priority, RecommendationCategory, SalesInsight,
};

const SECTION_MARKERS: [&str; 3] = ["SUMMARY:", "TRENDS:", "RECOMMENDATIONS:"];
const RECOMMENDATION_MARKER: &str = "RECOMMENDATION:";
const FALLBACK_SUMMARY_CHARS: usize = 500;
const FALLBACK_TRENDS: &str = "See summary for details";
const FALLBACK_RECOMMENDATIONS: &str = "See summary for recommendations";

/// Best-effort marker-scan over the model's free-text reply. This is not a
/// grammar: the reply is split on the literal SUMMARY:/TRENDS:/RECOMMENDATIONS:
/// markers, and a reply that does not follow the contract degrades to a
/// truncated-summary fallback. The function is total; it never fails the
/// surrounding request.
pub fn parse_insight_response(response: &str) -> SalesInsight {
    let fragments = split_on_markers(response, &SECTION_MARKERS);

    // Ignore any preamble the model emitted before the first marker.
    let sections: &[String] = match first_marker_offset(response, &SECTION_MARKERS) {
        Some(offset) if response[..offset].trim().is_empty() => &fragments,
        Some(_) => fragments.get(1..).unwrap_or(&[]),
        None => &[],
    };

    let (summary, trends, recommendations) = match sections {
        [summary, trends, recommendations, ..] => (
            summary.clone(),
            trends.clone(),
            recommendations.clone(),
        ),
        _ => (
            response.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
            FALLBACK_TRENDS.to_string(),
            FALLBACK_RECOMMENDATIONS.to_string(),
        ),
    };

    SalesInsight {
        summary,
        trends,
        recommendations,
        // Structured blocks are scanned over the full raw reply, independent
        // of whether the section headers were present.
        actionable_recommendations: parse_recommendations(response),
        generated_at: chrono::Utc::now(),
    }
}

/// Decomposes the repeated `RECOMMENDATION:` micro-format. Each block is a
/// run of `Field: value` lines; unrecognized lines are ignored, a block
/// without a title is dropped, and a missing priority defaults to Medium.
pub fn parse_recommendations(response: &str) -> Vec<ActionableRecommendation> {
    let mut out = Vec::new();

    // The first fragment is whatever precedes the first marker.
    for block in response.split(RECOMMENDATION_MARKER).skip(1) {
        let mut title: Option<String> = None;
        let mut description = String::new();
        let mut action = String::new();
        let mut category: Option<RecommendationCategory> = None;
        let mut priority: Option<Priority> = None;

        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(value) = field_value(line, "Title:") {
                title = Some(value.to_string());
            } else if let Some(value) = field_value(line, "Description:") {
                description = value.to_string();
            } else if let Some(value) = field_value(line, "Action:") {
                action = value.to_string();
            } else if let Some(value) = field_value(line, "Category:") {
                category = RecommendationCategory::parse(value);
            } else if let Some(value) = field_value(line, "Priority:") {
                priority = Priority::parse(value);
            }
        }

        let Some(title) = title.filter(|t| !t.is_empty()) else {
            continue;
        };

        out.push(ActionableRecommendation {
            title,
            description,
            action,
            category,
            priority: priority.unwrap_or_default(),
        });
    }

    out
}

/// Case-insensitive `Field:` prefix match; returns the trimmed remainder.
fn field_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

fn first_marker_offset(text: &str, markers: &[&str]) -> Option<usize> {
    markers.iter().filter_map(|m| text.find(m)).min()
}

/// Splits on any of the given literal markers, dropping blank fragments.
fn split_on_markers(text: &str, markers: &[&str]) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut rest = text;

    loop {
        let next = markers
            .iter()
            .filter_map(|m| rest.find(m).map(|pos| (pos, m.len())))
            .min();
        match next {
            Some((pos, len)) => {
                push_fragment(&mut fragments, &rest[..pos]);
                rest = &rest[pos + len..];
            }
            None => {
                push_fragment(&mut fragments, rest);
                return fragments;
            }
        }
    }
}

fn push_fragment(fragments: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with_blocks() -> String {
        [
            "SUMMARY:",
            "Revenue grew steadily over the period.",
            "",
            "TRENDS:",
            "Electronics outperformed every other category.",
            "",
            "RECOMMENDATIONS:",
            "RECOMMENDATION:",
            "Title: Bundle chargers with phones",
            "Description: Attach rate on accessories is low.",
            "Action: Add a bundle offer at checkout.",
            "Category: Upsell",
            "Priority: High",
            "RECOMMENDATION:",
            "title: Reprice slow movers",
            "description: Ten SKUs had zero sales.",
            "action: Cut prices 15% for two weeks.",
            "category: Pricing",
            "RECOMMENDATION:",
            "Title: Email lapsed customers",
            "Description: Repeat purchases dropped.",
            "Action: Send a win-back campaign.",
            "Category: Customer",
            "Priority: Low",
        ]
        .join("\n")
    }

    #[test]
    fn parses_three_sections() {
        let insight = parse_insight_response(&reply_with_blocks());
        assert_eq!(insight.summary, "Revenue grew steadily over the period.");
        assert_eq!(
            insight.trends,
            "Electronics outperformed every other category."
        );
        assert!(insight.recommendations.starts_with("RECOMMENDATION:"));
    }

    #[test]
    fn parses_three_well_formed_blocks() {
        let recs = parse_recommendations(&reply_with_blocks());
        assert_eq!(recs.len(), 3);

        assert_eq!(recs[0].title, "Bundle chargers with phones");
        assert_eq!(recs[0].category, Some(RecommendationCategory::Upsell));
        assert_eq!(recs[0].priority, Priority::High);

        // Second block omits Priority and uses lowercase field labels.
        assert_eq!(recs[1].title, "Reprice slow movers");
        assert_eq!(recs[1].category, Some(RecommendationCategory::Pricing));
        assert_eq!(recs[1].priority, Priority::Medium);

        assert_eq!(recs[2].priority, Priority::Low);
        assert_eq!(recs[2].action, "Send a win-back campaign.");
    }

    #[test]
    fn preamble_before_first_marker_is_ignored() {
        let reply = format!("Here is my analysis of the data.\n\n{}", reply_with_blocks());
        let insight = parse_insight_response(&reply);
        assert_eq!(insight.summary, "Revenue grew steadily over the period.");
    }

    #[test]
    fn reply_without_markers_falls_back_to_truncated_summary() {
        let reply = "x".repeat(650);
        let insight = parse_insight_response(&reply);
        assert_eq!(insight.summary.chars().count(), 500);
        assert_eq!(insight.trends, FALLBACK_TRENDS);
        assert_eq!(insight.recommendations, FALLBACK_RECOMMENDATIONS);
        assert!(insight.actionable_recommendations.is_empty());
    }

    #[test]
    fn short_reply_without_markers_is_kept_whole() {
        let insight = parse_insight_response("no structure here");
        assert_eq!(insight.summary, "no structure here");
        assert_eq!(insight.trends, FALLBACK_TRENDS);
    }

    #[test]
    fn partial_markers_fall_back() {
        let reply = "SUMMARY:\nOnly a summary was produced.";
        let insight = parse_insight_response(reply);
        assert_eq!(insight.trends, FALLBACK_TRENDS);
        assert!(insight.summary.starts_with("SUMMARY:"));
    }

    #[test]
    fn block_without_title_is_dropped_without_breaking_later_blocks() {
        let reply = [
            "RECOMMENDATION:",
            "Description: No title on this one.",
            "Action: Should be dropped.",
            "RECOMMENDATION:",
            "Title: Keep this one",
            "Priority: High",
        ]
        .join("\n");

        let recs = parse_recommendations(&reply);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Keep this one");
        assert_eq!(recs[0].priority, Priority::High);
    }

    #[test]
    fn unrecognized_lines_and_vocab_are_tolerated() {
        let reply = [
            "RECOMMENDATION:",
            "Title: Odd block",
            "Rationale: not a known field",
            "Category: Logistics",
            "Priority: Urgent",
        ]
        .join("\n");

        let recs = parse_recommendations(&reply);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, None);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert!(recs[0].description.is_empty());
    }

    #[test]
    fn no_recommendation_markers_yields_empty_list() {
        assert!(parse_recommendations("SUMMARY: fine\nTRENDS: fine").is_empty());
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let reply = "résumé ✨ not a marker — ß";
        let insight = parse_insight_response(reply);
        assert_eq!(insight.summary, reply);
    }
}
