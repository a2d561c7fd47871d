//! SQLite-backed card store.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ErrorCode, MnemoError, MnemoResult};
use crate::traits::CardStore;
use crate::types::{Card, CardType, ReviewRecord, Stage};

const CARD_COLUMNS: &str = "card_id, concept, answer, card_type, stage, next_review, review_history";

/// Cards in a single table. Review history is a JSON column.
pub struct SqliteCardStore {
    conn: Mutex<Connection>,
}

impl SqliteCardStore {
    /// Open (or create) a database at the given path.
    pub fn new(path: impl AsRef<Path>) -> MnemoResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> MnemoResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> MnemoResult<()> {
        let conn = self.conn.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cards (
                card_id TEXT PRIMARY KEY,
                concept TEXT NOT NULL,
                answer TEXT NOT NULL,
                card_type TEXT NOT NULL,
                stage INTEGER NOT NULL,
                next_review TEXT NOT NULL,
                review_history TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_cards_next_review ON cards(next_review);
        "#,
        )?;
        Ok(())
    }

    // Fixed-width UTC so that text comparison in SQL matches time order.
    fn timestamp(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(value: &str) -> MnemoResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| MnemoError::Parse {
                message: format!("Invalid timestamp '{}': {}", value, e),
                code: ErrorCode::ParseInvalidTimestamp,
            })
    }

    fn row_to_card(row: &rusqlite::Row<'_>) -> MnemoResult<Card> {
        let id: String = row.get(0)?;
        let concept: String = row.get(1)?;
        let answer: String = row.get(2)?;
        let card_type: String = row.get(3)?;
        let stage: i64 = row.get(4)?;
        let next_review: String = row.get(5)?;
        let history: String = row.get(6)?;

        let stage = u8::try_from(stage)
            .ok()
            .and_then(|s| Stage::new(s).ok())
            .ok_or_else(|| MnemoError::parse(format!("Stored stage {} is out of range", stage)))?;
        let card_type = CardType::from_str(&card_type)
            .map_err(|_| MnemoError::parse(format!("Stored card type '{}' is unknown", card_type)))?;
        let history: Vec<ReviewRecord> = serde_json::from_str(&history)?;

        Ok(Card {
            id,
            concept,
            answer,
            card_type,
            stage,
            next_review: Self::parse_timestamp(&next_review)?,
            history,
        })
    }

    fn query_cards(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> MnemoResult<Vec<Card>> {
        let mut stmt = conn.prepare(sql)?;
        let results = stmt.query_map(params, |row| Ok(Self::row_to_card(row)))?;

        results
            .map(|r| r.map_err(MnemoError::from).and_then(|inner| inner))
            .collect()
    }
}

impl CardStore for SqliteCardStore {
    fn save_card(&self, card: &Card) -> MnemoResult<()> {
        let conn = self.conn.lock()?;
        let history = serde_json::to_string(&card.history)?;

        // Upsert keeps the original rowid, which is what preserves listing order.
        conn.execute(
            r#"INSERT INTO cards (card_id, concept, answer, card_type, stage, next_review, review_history)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(card_id) DO UPDATE SET
                 concept = excluded.concept,
                 answer = excluded.answer,
                 card_type = excluded.card_type,
                 stage = excluded.stage,
                 next_review = excluded.next_review,
                 review_history = excluded.review_history"#,
            params![
                card.id,
                card.concept,
                card.answer,
                card.card_type.as_ref(),
                card.stage.get(),
                Self::timestamp(&card.next_review),
                history,
            ],
        )?;
        Ok(())
    }

    fn get_card(&self, id: &str) -> MnemoResult<Option<Card>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cards WHERE card_id = ?1",
            CARD_COLUMNS
        ))?;

        stmt.query_row(params![id], |row| Ok(Self::row_to_card(row)))
            .optional()?
            .transpose()
    }

    fn get_all_cards(&self) -> MnemoResult<Vec<Card>> {
        let conn = self.conn.lock()?;
        Self::query_cards(
            &conn,
            &format!("SELECT {} FROM cards ORDER BY rowid", CARD_COLUMNS),
            [],
        )
    }

    fn update_card(&self, card: &Card) -> MnemoResult<()> {
        let conn = self.conn.lock()?;
        let history = serde_json::to_string(&card.history)?;

        conn.execute(
            r#"UPDATE cards SET
               concept = ?2, answer = ?3, card_type = ?4, stage = ?5,
               next_review = ?6, review_history = ?7
               WHERE card_id = ?1"#,
            params![
                card.id,
                card.concept,
                card.answer,
                card.card_type.as_ref(),
                card.stage.get(),
                Self::timestamp(&card.next_review),
                history,
            ],
        )?;
        Ok(())
    }

    fn delete_card(&self, id: &str) -> MnemoResult<bool> {
        let conn = self.conn.lock()?;
        let deleted = conn.execute("DELETE FROM cards WHERE card_id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn get_due_cards(&self, now: DateTime<Utc>) -> MnemoResult<Vec<Card>> {
        let conn = self.conn.lock()?;
        Self::query_cards(
            &conn,
            &format!(
                "SELECT {} FROM cards WHERE next_review <= ?1 ORDER BY rowid",
                CARD_COLUMNS
            ),
            params![Self::timestamp(&now)],
        )
    }

    fn count(&self) -> MnemoResult<usize> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
