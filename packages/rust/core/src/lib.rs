//! Ingestion orchestration for herodex.
//!
//! Ties the crawl-policy gate, page fetching, extraction and storage into the
//! four passes, plus the sequential full run and its daily schedule.

pub mod fetch;
pub mod passes;
pub mod schedule;

pub use fetch::{PageFetcher, character_page_url, roster_page_url};
pub use passes::{
    PassSummary, ProgressReporter, SilentProgress, run_ability_pass, run_lore_pass,
    run_news_pass, run_roster_pass,
};
pub use schedule::{next_run_after, parse_daily_at, run_all, run_daily, run_daily_until};
