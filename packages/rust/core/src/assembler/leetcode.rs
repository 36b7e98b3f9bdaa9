//! LeetCode profile document.

use footprint_leetcode::{ContestRanking, LeetCodeProfile, Submission};
use footprint_shared::{OutputDocument, Provenance, SourceType};

use super::{TextBlock, format_float, present_text};

const PROFILE_URL_BASE: &str = "https://leetcode.com/u";

/// The single LeetCode document: identity, solve counts, contests, badges,
/// recent submissions and the raw calendar, in that order.
pub fn render_leetcode_document(
    username: &str,
    profile: &LeetCodeProfile,
    submissions: &[Submission],
) -> OutputDocument {
    let user = profile.matched_user.as_ref();

    let mut block = TextBlock::new(format!("LeetCode Profile Summary for @{username}"));
    block.blank();
    block.line("Profile:");
    if let Some(info) = user.and_then(|u| u.profile.as_ref()) {
        if let Some(real_name) = present_text(&info.real_name) {
            block.attr("realName", real_name);
        }
        if let Some(ranking) = info.ranking {
            block.attr("ranking", ranking);
        }
    }

    block.blank();
    block.line("Solved / Submission Stats:");
    for row in user.map(|u| u.accepted_by_difficulty()).unwrap_or_default() {
        block.line(format!(
            "  - {}: solved={}, submissions={}",
            row.difficulty, row.count, row.submissions
        ));
    }

    if let Some(contest) = &profile.user_contest_ranking {
        block.blank();
        block.line("Contest Rankings:");
        for (key, value) in contest_attributes(contest) {
            block.attr(key, value);
        }
    }

    let badges: Vec<&str> = user
        .map(|u| u.badges.iter().filter_map(|b| present_text(&b.display_name)).collect())
        .unwrap_or_default();
    if !badges.is_empty() {
        block.blank();
        block.line("Badges:");
        for badge in badges {
            block.line(format!("  - {badge}"));
        }
    }

    block.blank();
    if submissions.is_empty() {
        block.line("Recent Accepted Submissions: none returned");
    } else {
        block.line(format!("Recent Accepted Submissions (last {}):", submissions.len()));
        for sub in submissions {
            block.line(format!(
                "  - [{}] {} ({})  →  {}",
                sub.date, sub.title, sub.lang, sub.url
            ));
        }
    }

    if let Some(calendar) = profile.submission_calendar() {
        block.blank();
        block.line("Submission calendar (raw JSON string):");
        block.line(calendar);
    }

    OutputDocument {
        body: block.finish(),
        metadata: Provenance::new(
            format!("{PROFILE_URL_BASE}/{username}/"),
            SourceType::LeetcodeProfile,
            username,
        ),
    }
}

fn contest_attributes(contest: &ContestRanking) -> Vec<(&'static str, String)> {
    [
        ("rating", contest.rating.map(format_float)),
        ("globalRanking", contest.global_ranking.map(|n| n.to_string())),
        (
            "attendedContestsCount",
            contest.attended_contests_count.map(|n| n.to_string()),
        ),
        ("topPercentage", contest.top_percentage.map(format_float)),
        ("totalParticipants", contest.total_participants.map(|n| n.to_string())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect()
}
