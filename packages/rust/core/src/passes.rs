//! The four ingestion passes: news, roster, lore, abilities.
//!
//! Each pass walks its units of work (a news URL, the roster page, one
//! character) and isolates failures per unit: a policy denial skips the unit,
//! a fetch or write failure is recorded in the [`PassSummary`] and the pass
//! moves on. Only failures outside the per-unit boundary (listing characters)
//! end a pass early.
//!
//! Markup is parsed and extracted in synchronous helpers so no parsed
//! document lives across an await point.

use std::time::{Duration, Instant};

use chrono::Utc;
use herodex_extract::{
    AbilityExtraction, Document, LoreOutcome, NewsPage, extract_abilities, extract_lore,
    extract_news, extract_roster, extract_stats,
};
use herodex_shared::{
    CharacterIdentity, CharacterProfile, FeedType, HerodexError, NewsItem, PassKind, Result,
    ScrapeConfig,
};
use herodex_storage::Storage;
use tracing::{Span, debug, info, instrument, warn};
use url::Url;

use crate::fetch::{PageFetcher, character_page_url, roster_page_url};

// ---------------------------------------------------------------------------
// Summary & progress
// ---------------------------------------------------------------------------

/// Outcome counts of one pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub pass: PassKind,
    /// Units fully processed and written.
    pub processed: usize,
    /// Units skipped because the crawl policy disallowed them.
    pub skipped: usize,
    /// Failed units as `(item, message)`.
    pub errors: Vec<(String, String)>,
    pub duration: Duration,
}

impl PassSummary {
    fn new(pass: PassKind) -> Self {
        Self {
            pass,
            processed: 0,
            skipped: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Journal representation stored with the scrape run.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "pass": self.pass.as_str(),
            "processed": self.processed,
            "skipped": self.skipped,
            "errors": self.errors.len(),
            "duration_ms": self.duration.as_millis() as u64,
        })
    }
}

/// Progress callback for reporting pass status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a pass starts.
    fn phase(&self, name: &str);
    /// Called before each unit of work.
    fn item(&self, label: &str, current: usize, total: usize);
    /// Called when a pass completes.
    fn done(&self, summary: &PassSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item(&self, _label: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &PassSummary) {}
}

/// Bookkeeping shared by every pass: summary, timer and journal row.
struct PassRun {
    summary: PassSummary,
    started: Instant,
    run_id: Option<String>,
}

impl PassRun {
    async fn start(pass: PassKind, storage: &Storage, progress: &dyn ProgressReporter) -> Self {
        progress.phase(pass.as_str());
        info!(pass = %pass, "starting pass");

        // A journal write failure is logged and the pass runs anyway.
        let run_id = match storage.insert_scrape_run(pass).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(pass = %pass, error = %e, "failed to record scrape run");
                None
            }
        };

        Self {
            summary: PassSummary::new(pass),
            started: Instant::now(),
            run_id,
        }
    }

    fn record(&mut self, item: &str, result: Result<()>) {
        match result {
            Ok(()) => self.summary.processed += 1,
            Err(HerodexError::PolicyDenied { url }) => {
                info!(item, %url, "skipped: disallowed by crawl policy");
                self.summary.skipped += 1;
            }
            Err(e) => {
                warn!(item, error = %e, "item failed");
                self.summary.errors.push((item.to_string(), e.to_string()));
            }
        }
    }

    async fn finish(mut self, storage: &Storage, progress: &dyn ProgressReporter) -> PassSummary {
        self.summary.duration = self.started.elapsed();
        let summary = self.summary;

        if let Some(run_id) = &self.run_id {
            if let Err(e) = storage
                .finish_scrape_run(run_id, &summary.to_json().to_string())
                .await
            {
                warn!(%run_id, error = %e, "failed to finish scrape run");
            }
        }

        info!(
            pass = %summary.pass,
            processed = summary.processed,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            duration_ms = summary.duration.as_millis(),
            "pass complete"
        );
        progress.done(&summary);
        summary
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// Fetch every configured news URL and upsert one item per page.
#[instrument(skip_all, fields(sources = config.news.len()))]
pub async fn run_news_pass(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<PassSummary> {
    let mut run = PassRun::start(PassKind::News, storage, progress).await;
    let total = config.news.len();

    for (i, (url, feed_type)) in config.news.iter().enumerate() {
        progress.item(url.as_str(), i + 1, total);
        let result = news_item(config, fetcher, storage, url, *feed_type).await;
        run.record(url.as_str(), result);
    }

    Ok(run.finish(storage, progress).await)
}

#[instrument(skip_all, fields(url = %url, feed_type = %feed_type))]
async fn news_item(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    url: &Url,
    feed_type: FeedType,
) -> Result<()> {
    let html = fetcher.fetch(url).await?;
    let page = read_news(url, &html)?;

    let now = Utc::now();
    let item = NewsItem {
        title: page.title,
        content: page.content,
        url: url.to_string(),
        image_url: page.image_url,
        feed_type,
        published_at: now,
        created_at: now,
        updated_at: now,
        game_id: config.game_id.clone(),
    };
    storage.upsert_news_item(&item).await
}

fn read_news(url: &Url, html: &str) -> Result<NewsPage> {
    let doc = Document::parse(html);
    let page = extract_news(&doc, url)?;
    if page.content.is_none() {
        info!(field = "content", "news body not found");
    }
    Ok(page)
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Fetch the roster page and upsert every listed character identity.
#[instrument(skip_all)]
pub async fn run_roster_pass(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<PassSummary> {
    let mut run = PassRun::start(PassKind::Roster, storage, progress).await;
    let url = roster_page_url(config)?;

    let html = match fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(e) => {
            run.record(url.as_str(), Err(e));
            return Ok(run.finish(storage, progress).await);
        }
    };

    let roster = read_roster(&url, &html);
    let total = roster.len();
    for (i, identity) in roster.iter().enumerate() {
        progress.item(&identity.name, i + 1, total);
        let result = storage.upsert_character(identity).await;
        run.record(&identity.id, result);
    }

    Ok(run.finish(storage, progress).await)
}

fn read_roster(url: &Url, html: &str) -> Vec<CharacterIdentity> {
    let roster = extract_roster(&Document::parse(html), url);
    if roster.is_empty() {
        warn!(%url, field = "roster", "no characters found on roster page");
    }
    roster
}

// ---------------------------------------------------------------------------
// Lore
// ---------------------------------------------------------------------------

/// Write stats and lore for every stored character.
#[instrument(skip_all)]
pub async fn run_lore_pass(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<PassSummary> {
    let mut run = PassRun::start(PassKind::Lore, storage, progress).await;
    let characters = storage.list_characters().await?;
    let total = characters.len();

    for (i, record) in characters.iter().enumerate() {
        progress.item(&record.identity.name, i + 1, total);
        let result = lore_item(config, fetcher, storage, &record.identity).await;
        run.record(&record.identity.id, result);
    }

    Ok(run.finish(storage, progress).await)
}

#[instrument(skip_all, fields(character_id = %character.id, url = tracing::field::Empty))]
async fn lore_item(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    character: &CharacterIdentity,
) -> Result<()> {
    let url = character_page_url(config, &character.name)?;
    Span::current().record("url", tracing::field::display(&url));

    let html = fetcher.fetch(&url).await?;
    let profile = read_profile(&character.id, &html);
    storage.update_character_profile(&profile).await
}

fn read_profile(character_id: &str, html: &str) -> CharacterProfile {
    let doc = Document::parse(html);
    let stats = extract_stats(&doc);
    if stats.health.is_none() {
        info!(field = "health", "health unknown");
    }
    if stats.difficulty.is_none() {
        info!(field = "difficulty", "difficulty unknown");
    }

    let lore = match extract_lore(&doc) {
        LoreOutcome::Found(text) => Some(text),
        miss => {
            info!(field = "lore", reason = miss.reason(), "biography not found");
            None
        }
    };

    CharacterProfile {
        character_id: character_id.to_string(),
        stats,
        lore,
    }
}

// ---------------------------------------------------------------------------
// Abilities
// ---------------------------------------------------------------------------

/// Extract and upsert abilities for every stored character, one page at a
/// time with a fixed pause after each fetch.
#[instrument(skip_all, fields(delay_ms = config.ability_delay.as_millis() as u64))]
pub async fn run_ability_pass(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<PassSummary> {
    let mut run = PassRun::start(PassKind::Abilities, storage, progress).await;
    let characters = storage.list_characters().await?;
    let total = characters.len();

    for (i, record) in characters.iter().enumerate() {
        progress.item(&record.identity.name, i + 1, total);
        let result = ability_item(config, fetcher, storage, &record.identity).await;
        run.record(&record.identity.id, result);
    }

    Ok(run.finish(storage, progress).await)
}

#[instrument(skip_all, fields(character_id = %character.id, url = tracing::field::Empty))]
async fn ability_item(
    config: &ScrapeConfig,
    fetcher: &PageFetcher,
    storage: &Storage,
    character: &CharacterIdentity,
) -> Result<()> {
    let url = character_page_url(config, &character.name)?;
    Span::current().record("url", tracing::field::display(&url));

    let fetched = fetcher.fetch(&url).await;
    if !config.ability_delay.is_zero() {
        tokio::time::sleep(config.ability_delay).await;
    }

    let extraction = read_abilities(&fetched?);
    let complete: Vec<_> = extraction.abilities.iter().filter(|a| a.is_complete()).collect();
    storage.upsert_abilities(&character.id, &complete).await?;
    debug!(written = complete.len(), "abilities stored");
    Ok(())
}

fn read_abilities(html: &str) -> AbilityExtraction {
    let extraction = extract_abilities(&Document::parse(html));
    for ability in extraction.incomplete() {
        warn!(
            field = "abilities",
            layout = extraction.layout.as_str(),
            name = %ability.name,
            slot = %ability.slot,
            "ability missing name or slot, not stored"
        );
    }
    if extraction.abilities.is_empty() {
        info!(
            field = "abilities",
            layout = extraction.layout.as_str(),
            "no abilities found"
        );
    }
    extraction
}
