// Database access layer (SQLite via sqlx).

pub mod import;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::connect::{BoutRecord, BoutSource, FighterId, FighterResolver, SourceError};
use crate::fighter::{daily_offset, FighterProfile, FighterRow};

const FIGHTER_COLUMNS: &str = "first_name, last_name, nickname, female, wins, losses, draws, \
                               height, weight, reach, stance, birth_date";

/// Row of the `bouts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Bout {
    pub id: i64,
    pub fighter0_first_name: String,
    pub fighter0_last_name: String,
    pub fighter1_first_name: String,
    pub fighter1_last_name: String,
    pub event: String,
    pub date: String,
    pub weight_class: String,
    pub method: String,
}

impl Bout {
    pub fn record(&self) -> BoutRecord {
        BoutRecord::new(
            FighterId::new(&self.fighter0_first_name, Some(&self.fighter0_last_name)),
            FighterId::new(&self.fighter1_first_name, Some(&self.fighter1_last_name)),
        )
    }
}

/// A bout to insert. Only the two fighters are required.
#[derive(Debug, Clone, Default)]
pub struct NewBout {
    pub fighter0: String,
    pub fighter1: String,
    pub event: String,
    pub date: String,
    pub weight_class: String,
    pub method: String,
}

/// Search hit, shaped for the frontend's autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FighterName {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

pub const SEARCH_LIMIT: i64 = 10;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        // Every connection to `sqlite::memory:` opens its own empty database,
        // so in-memory stores are pinned to one long-lived connection.
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fighters (
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL DEFAULT '',
                nickname TEXT,
                female INTEGER NOT NULL DEFAULT 0,
                wins INTEGER NOT NULL DEFAULT 0,
                losses INTEGER NOT NULL DEFAULT 0,
                draws INTEGER NOT NULL DEFAULT 0,
                height TEXT,
                weight TEXT,
                reach TEXT,
                stance TEXT,
                birth_date TEXT,
                PRIMARY KEY (first_name, last_name)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fighter0_first_name TEXT NOT NULL,
                fighter0_last_name TEXT NOT NULL DEFAULT '',
                fighter1_first_name TEXT NOT NULL,
                fighter1_last_name TEXT NOT NULL DEFAULT '',
                event TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL DEFAULT '',
                weight_class TEXT NOT NULL DEFAULT '',
                method TEXT NOT NULL DEFAULT ''
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Fighters ──────────────────────────────────────────────────────

    /// Insert or replace a fighter. Names are normalized before storage.
    pub async fn upsert_fighter(&self, profile: &FighterProfile) -> Result<(), sqlx::Error> {
        let id = profile.id();
        sqlx::query(
            "INSERT OR REPLACE INTO fighters \
             (first_name, last_name, nickname, female, wins, losses, draws, height, weight, reach, \
              stance, birth_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.first_name)
        .bind(&id.last_name)
        .bind(&profile.nickname)
        .bind(profile.female)
        .bind(profile.record.wins)
        .bind(profile.record.losses)
        .bind(profile.record.draws)
        .bind(&profile.height)
        .bind(&profile.weight)
        .bind(profile.reach.to_string())
        .bind(&profile.stance)
        .bind(profile.birth_day.map(|d| d.format("%Y-%m-%d").to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_fighter(&self, id: &FighterId) -> Result<Option<FighterProfile>, sqlx::Error> {
        let row = sqlx::query_as::<_, FighterRow>(&format!(
            "SELECT {FIGHTER_COLUMNS} FROM fighters WHERE first_name = ? AND last_name = ?"
        ))
        .bind(&id.first_name)
        .bind(&id.last_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FighterProfile::from))
    }

    pub async fn count_fighters(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM fighters")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn random_fighter(&self) -> Result<Option<FighterProfile>, sqlx::Error> {
        let row = sqlx::query_as::<_, FighterRow>(&format!(
            "SELECT {FIGHTER_COLUMNS} FROM fighters ORDER BY RANDOM() LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FighterProfile::from))
    }

    /// Fighter of the day for `date`: a fixed offset into the roster ordered
    /// by concatenated name.
    pub async fn daily_fighter(
        &self,
        date: chrono::NaiveDate,
    ) -> Result<Option<FighterProfile>, sqlx::Error> {
        let Some(offset) = daily_offset(date, self.count_fighters().await?) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, FighterRow>(&format!(
            "SELECT {FIGHTER_COLUMNS} FROM fighters \
             ORDER BY (first_name || last_name) LIMIT 1 OFFSET ?"
        ))
        .bind(offset)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FighterProfile::from))
    }

    /// Autocomplete search over first name, last name and nickname.
    ///
    /// A single term may match any of the three. With several terms the first
    /// must match the first name and the last the last name, or the whole
    /// query must match the nickname. Prefix matches on first name, then last
    /// name, then nickname rank ahead of plain substring matches.
    pub async fn search_fighters(&self, query: &str) -> Result<Vec<FighterName>, sqlx::Error> {
        let terms: Vec<&str> = query.split_whitespace().collect();
        let (Some(first), Some(last)) = (terms.first(), terms.last()) else {
            return Ok(Vec::new());
        };

        let (where_clause, contains, prefixes) = if terms.len() == 1 {
            (
                "(first_name LIKE ? OR last_name LIKE ? OR nickname LIKE ?)",
                vec![format!("%{first}%"), format!("%{first}%"), format!("%{first}%")],
                [format!("{first}%"), format!("{first}%"), format!("{first}%")],
            )
        } else {
            let whole = terms.join(" ");
            (
                "((first_name LIKE ? AND last_name LIKE ?) OR (nickname LIKE ?))",
                vec![format!("%{first}%"), format!("%{last}%"), format!("%{whole}%")],
                [format!("{first}%"), format!("{last}%"), format!("{whole}%")],
            )
        };

        let sql = format!(
            "SELECT first_name, last_name FROM fighters \
             WHERE {where_clause} \
             ORDER BY \
               CASE \
                 WHEN first_name LIKE ? THEN 1 \
                 WHEN last_name LIKE ? THEN 2 \
                 WHEN nickname LIKE ? THEN 3 \
                 ELSE 4 \
               END, \
               first_name, last_name \
             LIMIT ?"
        );

        let mut q = sqlx::query_as::<_, FighterName>(&sql);
        for p in contains.iter().chain(prefixes.iter()) {
            q = q.bind(p.as_str());
        }
        q.bind(SEARCH_LIMIT).fetch_all(&self.pool).await
    }

    // ── Bouts ─────────────────────────────────────────────────────────

    pub async fn add_bout(&self, bout: &NewBout) -> Result<Bout, sqlx::Error> {
        let a = FighterId::from_full_name(&bout.fighter0);
        let b = FighterId::from_full_name(&bout.fighter1);
        sqlx::query_as::<_, Bout>(
            "INSERT INTO bouts \
             (fighter0_first_name, fighter0_last_name, fighter1_first_name, fighter1_last_name, \
              event, date, weight_class, method) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, fighter0_first_name, fighter0_last_name, fighter1_first_name, \
                       fighter1_last_name, event, date, weight_class, method",
        )
        .bind(&a.first_name)
        .bind(&a.last_name)
        .bind(&b.first_name)
        .bind(&b.last_name)
        .bind(&bout.event)
        .bind(&bout.date)
        .bind(&bout.weight_class)
        .bind(&bout.method)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_bout_rows(&self) -> Result<Vec<Bout>, sqlx::Error> {
        sqlx::query_as::<_, Bout>(
            "SELECT id, fighter0_first_name, fighter0_last_name, fighter1_first_name, \
                    fighter1_last_name, event, date, weight_class, method \
             FROM bouts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl BoutSource for Database {
    async fn list_bouts(&self) -> Result<Vec<BoutRecord>, SourceError> {
        let rows = self.list_bout_rows().await?;
        Ok(rows.iter().map(Bout::record).collect())
    }
}

#[async_trait]
impl FighterResolver for Database {
    async fn resolve(&self, id: &FighterId) -> Result<Option<FighterProfile>, SourceError> {
        Ok(self.get_fighter(id).await?)
    }
}
