//! libSQL storage layer (local file mode).
//!
//! The [`Storage`] struct is the sink every ingestion pass writes into:
//! characters, their abilities, news items, and a journal of scrape runs.
//!
//! **Access rules:**
//! - Ingestion passes: read-write via [`Storage::open`]
//! - Inspection tooling: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use herodex_shared::{
    Ability, CharacterIdentity, CharacterProfile, CharacterStats, FeedType, HerodexError,
    NewsItem, PassKind, Result,
};
use indexmap::IndexMap;
use libsql::{Connection, Database, Row, params};
use uuid::Uuid;

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

/// A stored character: identity, profile fields and bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    pub identity: CharacterIdentity,
    pub stats: CharacterStats,
    pub lore: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One journal entry for an ingestion pass.
#[derive(Debug, Clone)]
pub struct ScrapeRun {
    pub id: String,
    pub pass: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub stats_json: Option<String>,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HerodexError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path`; every write is rejected.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        HerodexError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 before the first migration.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            Err(_) => 0,
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(HerodexError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Insert a character, or refresh `category` and `image_url` if it exists.
    ///
    /// The display name is fixed at first insert; profile columns are left alone.
    pub async fn upsert_character(&self, identity: &CharacterIdentity) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO characters (id, name, category, image_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                   category = excluded.category,
                   image_url = excluded.image_url,
                   updated_at = excluded.updated_at",
                params![
                    identity.id.as_str(),
                    identity.name.as_str(),
                    identity.category.as_str(),
                    identity.image_url.as_deref(),
                    now.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Overwrite a character's stats and lore. Unknown fields are stored as NULL.
    pub async fn update_character_profile(&self, profile: &CharacterProfile) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        let affected = self
            .conn
            .execute(
                "UPDATE characters
                 SET health = ?2, difficulty = ?3, lore = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    profile.character_id.as_str(),
                    profile.stats.health.map(i64::from),
                    profile.stats.difficulty.map(i64::from),
                    profile.lore.as_deref(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;

        if affected == 0 {
            return Err(HerodexError::Storage(format!(
                "no character with id '{}'",
                profile.character_id
            )));
        }
        Ok(())
    }

    pub async fn get_character(&self, id: &str) -> Result<Option<CharacterRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, category, image_url, health, difficulty, lore, created_at, updated_at
                 FROM characters WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_character(&row)?)),
            None => Ok(None),
        }
    }

    /// All characters, ordered by display name.
    pub async fn list_characters(&self) -> Result<Vec<CharacterRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, category, image_url, health, difficulty, lore, created_at, updated_at
                 FROM characters ORDER BY name",
                params![],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(row_to_character(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Abilities
    // -----------------------------------------------------------------------

    /// Insert or replace an ability keyed by `(character_id, name)`.
    pub async fn upsert_ability(&self, character_id: &str, ability: &Ability) -> Result<()> {
        self.check_writable()?;
        write_ability(&self.conn, character_id, ability).await
    }

    /// Upsert one page's abilities in a single transaction.
    ///
    /// Either every ability is written or none is.
    pub async fn upsert_abilities(&self, character_id: &str, abilities: &[&Ability]) -> Result<()> {
        self.check_writable()?;
        let tx = self.conn.transaction().await.map_err(db_err)?;

        for ability in abilities {
            if let Err(e) = write_ability(&tx, character_id, ability).await {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "ability rollback failed");
                }
                return Err(e);
            }
        }

        tx.commit().await.map_err(db_err)
    }

    /// Abilities of one character in first-seen order.
    pub async fn list_abilities(&self, character_id: &str) -> Result<Vec<Ability>> {
        let mut rows = self
            .conn
            .query(
                "SELECT name, type, description, stats_json
                 FROM abilities WHERE character_id = ?1 ORDER BY rowid",
                params![character_id],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(row_to_ability(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // News
    // -----------------------------------------------------------------------

    /// Insert a news item or update it in place, keyed by `url`.
    ///
    /// `created_at` and `published_at` keep their first-seen values.
    pub async fn upsert_news_item(&self, item: &NewsItem) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT INTO news_items (id, game_id, title, content, url, image_url, type, published_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(url) DO UPDATE SET
                   game_id = excluded.game_id,
                   title = excluded.title,
                   content = excluded.content,
                   image_url = excluded.image_url,
                   type = excluded.type,
                   updated_at = excluded.updated_at",
                params![
                    Uuid::now_v7().to_string(),
                    item.game_id.as_str(),
                    item.title.as_str(),
                    item.content.as_deref(),
                    item.url.as_str(),
                    item.image_url.as_deref(),
                    item.feed_type.as_str(),
                    item.published_at.to_rfc3339(),
                    item.created_at.to_rfc3339(),
                    item.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    pub async fn get_news_item(&self, url: &str) -> Result<Option<NewsItem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT title, content, url, image_url, type, published_at, created_at, updated_at, game_id
                 FROM news_items WHERE url = ?1",
                params![url],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_news_item(&row)?)),
            None => Ok(None),
        }
    }

    /// News items for a tenant, most recently published first.
    pub async fn list_news(&self, game_id: &str) -> Result<Vec<NewsItem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT title, content, url, image_url, type, published_at, created_at, updated_at, game_id
                 FROM news_items WHERE game_id = ?1 ORDER BY published_at DESC",
                params![game_id],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(row_to_news_item(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Scrape-run journal
    // -----------------------------------------------------------------------

    /// Record the start of a pass. Returns the run ID.
    pub async fn insert_scrape_run(&self, pass: PassKind) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO scrape_runs (id, pass, started_at) VALUES (?1, ?2, ?3)",
                params![id.as_str(), pass.as_str(), now.as_str()],
            )
            .await
            .map_err(db_err)?;
        Ok(id)
    }

    /// Mark a run finished and attach its summary.
    pub async fn finish_scrape_run(&self, run_id: &str, stats_json: &str) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE scrape_runs SET finished_at = ?1, stats_json = ?2 WHERE id = ?3",
                params![now.as_str(), stats_json, run_id],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Most recent runs first.
    pub async fn recent_scrape_runs(&self, limit: u32) -> Result<Vec<ScrapeRun>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, pass, started_at, finished_at, stats_json
                 FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
                params![limit],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(ScrapeRun {
                id: row.get::<String>(0).map_err(db_err)?,
                pass: row.get::<String>(1).map_err(db_err)?,
                started_at: parse_timestamp(&row.get::<String>(2).map_err(db_err)?)?,
                finished_at: row
                    .get::<String>(3)
                    .ok()
                    .map(|s| parse_timestamp(&s))
                    .transpose()?,
                stats_json: row.get::<String>(4).ok(),
            });
        }
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

async fn write_ability(conn: &Connection, character_id: &str, ability: &Ability) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let stats_json = serde_json::to_string(&ability.stats)
        .map_err(|e| HerodexError::Storage(format!("serialize ability stats: {e}")))?;

    conn.execute(
        "INSERT INTO abilities (id, character_id, name, type, description, stats_json, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(character_id, name) DO UPDATE SET
           type = excluded.type,
           description = excluded.description,
           stats_json = excluded.stats_json,
           updated_at = excluded.updated_at",
        params![
            Uuid::now_v7().to_string(),
            character_id,
            ability.name.as_str(),
            ability.slot.as_str(),
            ability.description.as_str(),
            stats_json,
            now.as_str(),
            now.as_str(),
        ],
    )
    .await
    .map_err(db_err)?;
    Ok(())
}

fn db_err(e: libsql::Error) -> HerodexError {
    HerodexError::Storage(e.to_string())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HerodexError::Storage(format!("invalid date '{s}': {e}")))
}

fn row_to_character(row: &Row) -> Result<CharacterRecord> {
    Ok(CharacterRecord {
        identity: CharacterIdentity {
            id: row.get::<String>(0).map_err(db_err)?,
            name: row.get::<String>(1).map_err(db_err)?,
            category: row.get::<String>(2).map_err(db_err)?,
            image_url: row.get::<String>(3).ok(),
        },
        stats: CharacterStats {
            health: row.get::<i64>(4).ok().and_then(|v| u32::try_from(v).ok()),
            difficulty: row.get::<i64>(5).ok().and_then(|v| u8::try_from(v).ok()),
        },
        lore: row.get::<String>(6).ok(),
        created_at: parse_timestamp(&row.get::<String>(7).map_err(db_err)?)?,
        updated_at: parse_timestamp(&row.get::<String>(8).map_err(db_err)?)?,
    })
}

fn row_to_ability(row: &Row) -> Result<Ability> {
    let stats_json: String = row.get(3).map_err(db_err)?;
    let stats: IndexMap<String, String> = serde_json::from_str(&stats_json)
        .map_err(|e| HerodexError::Storage(format!("invalid ability stats: {e}")))?;

    let mut ability = Ability::new(
        row.get::<String>(0).map_err(db_err)?,
        row.get::<String>(1).map_err(db_err)?,
    );
    ability.description = row.get::<String>(2).map_err(db_err)?;
    ability.stats = stats;
    Ok(ability)
}

fn row_to_news_item(row: &Row) -> Result<NewsItem> {
    let feed_type: FeedType = row
        .get::<String>(4)
        .map_err(db_err)?
        .parse()
        .map_err(|e: HerodexError| HerodexError::Storage(e.to_string()))?;

    Ok(NewsItem {
        title: row.get::<String>(0).map_err(db_err)?,
        content: row.get::<String>(1).ok(),
        url: row.get::<String>(2).map_err(db_err)?,
        image_url: row.get::<String>(3).ok(),
        feed_type,
        published_at: parse_timestamp(&row.get::<String>(5).map_err(db_err)?)?,
        created_at: parse_timestamp(&row.get::<String>(6).map_err(db_err)?)?,
        updated_at: parse_timestamp(&row.get::<String>(7).map_err(db_err)?)?,
        game_id: row.get::<String>(8).map_err(db_err)?,
    })
}
