//! LeetCode fetchers, record types, and submission-calendar decoding.

mod calendar;
mod client;
pub mod records;

pub use calendar::parse_submission_calendar;
pub use client::LeetCodeClient;
pub use records::{
    Badge, ContestRanking, DifficultyCount, LeetCodeProfile, MatchedUser, ProfileInfo,
    RawSubmission, Submission, format_timestamp,
};
