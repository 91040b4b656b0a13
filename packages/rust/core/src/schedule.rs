//! Sequential full runs and the daily cadence.

use std::future::Future;

use chrono::{DateTime, Days, NaiveTime, Utc};
use herodex_shared::{HerodexError, Result, ScrapeConfig};
use herodex_storage::Storage;
use tracing::{error, info, instrument};

use crate::fetch::PageFetcher;
use crate::passes::{
    PassSummary, ProgressReporter, run_ability_pass, run_lore_pass, run_news_pass,
    run_roster_pass,
};

/// Parse a `HH:MM` daily start time.
pub fn parse_daily_at(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
        HerodexError::validation(format!("invalid daily time '{value}' (expected HH:MM): {e}"))
    })
}

/// The first instant strictly after `now` whose UTC time of day is `at`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        let tomorrow = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap_or(now.date_naive());
        tomorrow.and_time(at).and_utc()
    }
}

/// Run news, roster, lore and abilities in that order.
///
/// Stops at the first pass that fails outside its per-item boundary.
#[instrument(skip_all)]
pub async fn run_all(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<Vec<PassSummary>> {
    Ok(vec![
        run_news_pass(config, fetcher, storage, progress).await?,
        run_roster_pass(config, fetcher, storage, progress).await?,
        run_lore_pass(config, fetcher, storage, progress).await?,
        run_ability_pass(config, fetcher, storage, progress).await?,
    ])
}

/// Run [`run_all`] every day at `at` (UTC) until Ctrl-C.
pub async fn run_daily(
    config: &ScrapeConfig,
    storage: &Storage,
    at: NaiveTime,
    progress: &dyn ProgressReporter,
) -> Result<()> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_daily_until(config, storage, at, progress, ctrl_c).await
}

/// Daily loop stopped by `shutdown`.
///
/// A shutdown during the wait returns immediately; a shutdown during a run
/// lets that run finish first. Runs never overlap.
pub async fn run_daily_until(
    config: &ScrapeConfig,
    storage: &Storage,
    at: NaiveTime,
    progress: &dyn ProgressReporter,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let fetcher = PageFetcher::new(config)?;
    tokio::pin!(shutdown);

    loop {
        let now = Utc::now();
        let next = next_run_after(now, at);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next_run = %next.to_rfc3339(), "waiting for next scheduled run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => {
                info!("shutdown requested, scheduler stopping");
                return Ok(());
            }
        }

        let run = run_all(config, &fetcher, storage, progress);
        tokio::pin!(run);

        let stop = tokio::select! {
            result = &mut run => {
                log_run(result);
                false
            }
            _ = &mut shutdown => {
                info!("shutdown requested, finishing current run");
                log_run(run.await);
                true
            }
        };

        if stop {
            return Ok(());
        }
    }
}

fn log_run(result: Result<Vec<PassSummary>>) {
    match result {
        Ok(summaries) => {
            let errors: usize = summaries.iter().map(|s| s.errors.len()).sum();
            info!(passes = summaries.len(), errors, "scheduled run complete");
        }
        Err(e) => error!(error = %e, "scheduled run aborted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::SilentProgress;
    use chrono::TimeZone;
    use herodex_shared::AppConfig;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_hh_mm() {
        assert_eq!(parse_daily_at("04:00").unwrap(), at(4, 0));
        assert_eq!(parse_daily_at(" 23:59 ").unwrap(), at(23, 59));
        assert!(parse_daily_at("25:00").is_err());
        assert!(parse_daily_at("4am").is_err());
    }

    #[test]
    fn next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 2, 30, 0).unwrap();
        assert_eq!(
            next_run_after(now, at(4, 0)),
            Utc.with_ymd_and_hms(2026, 3, 1, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_run_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 4, 0, 0).unwrap();
        assert_eq!(
            next_run_after(now, at(4, 0)),
            Utc.with_ymd_and_hms(2027, 1, 1, 4, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn shutdown_before_first_run_returns() {
        let config = ScrapeConfig::try_from(&AppConfig::default()).unwrap();
        let path = std::env::temp_dir().join(format!("herodex_sched_{}.db", uuid::Uuid::now_v7()));
        let storage = Storage::open(&path).await.unwrap();

        run_daily_until(&config, &storage, at(4, 0), &SilentProgress, async {})
            .await
            .unwrap();
        assert!(storage.recent_scrape_runs(1).await.unwrap().is_empty());
    }
}
