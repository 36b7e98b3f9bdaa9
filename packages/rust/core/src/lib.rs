//! Pipeline orchestration and document assembly for footprint.
//!
//! Ties the GitHub and LeetCode fetchers to the assembler in end-to-end
//! runs (`run_github`, `run_leetcode`), and merges both sources into a
//! daily activity timeline.

pub mod activity;
pub mod assembler;
pub mod pipeline;
