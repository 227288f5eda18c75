use crate::model::{Alert, AlertCondition, AlertDraft, PriceQuote, StorageError, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use tracing::warn;

pub const THEME_KEY: &str = "theme";
pub const REFRESH_INTERVAL_KEY: &str = "refresh_interval_ms";

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Durable store for user-defined price alerts.
pub struct AlertStore {
    conn: Connection,
}

impl AlertStore {
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol_id TEXT NOT NULL,
                condition TEXT NOT NULL,
                threshold_price REAL NOT NULL,
                created_at TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Validates and persists a new alert. Validation failure blocks the
    /// write entirely; nothing partial ever reaches the table.
    pub fn add(&self, draft: &AlertDraft) -> Result<Alert, AlertError> {
        if draft.symbol_id.trim().is_empty() {
            return Err(ValidationError::MissingSymbol.into());
        }
        if !(draft.threshold_price > 0.0) || !draft.threshold_price.is_finite() {
            return Err(ValidationError::NonPositiveThreshold.into());
        }

        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO alerts (symbol_id, condition, threshold_price, created_at, active)
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![
                    &draft.symbol_id,
                    draft.condition.as_str(),
                    draft.threshold_price,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(StorageError::from)?;

        Ok(Alert {
            id: self.conn.last_insert_rowid(),
            symbol_id: draft.symbol_id.clone(),
            condition: draft.condition,
            threshold_price: draft.threshold_price,
            created_at,
            active: true,
        })
    }

    /// All alerts in creation order. Corrupted rows or a broken table read
    /// as empty; persistence problems never take the page down.
    pub fn list(&self) -> Vec<Alert> {
        let mut stmt = match self.conn.prepare(
            "SELECT id, symbol_id, condition, threshold_price, created_at, active
             FROM alerts ORDER BY id ASC",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!("Alert list unavailable: {}", e);
                return Vec::new();
            }
        };

        let rows = match stmt.query_map([], Self::map_alert) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Alert list query failed: {}", e);
                return Vec::new();
            }
        };

        let mut alerts = Vec::new();
        for row in rows {
            match row {
                Ok(alert) => alerts.push(alert),
                Err(e) => warn!("Skipping corrupted alert row: {}", e),
            }
        }
        alerts
    }

    /// Compares every active matching alert against the quote and returns
    /// the triggered ones. Triggered alerts are one-shot: they deactivate
    /// before this call returns, so the next qualifying quote stays silent.
    pub fn evaluate(&self, quote: &PriceQuote) -> Vec<Alert> {
        let Some(price) = quote.price_usd else {
            return Vec::new();
        };

        let triggered: Vec<Alert> = self
            .list()
            .into_iter()
            .filter(|alert| {
                alert.active
                    && alert.symbol_id == quote.symbol_id
                    && match alert.condition {
                        AlertCondition::Above => price >= alert.threshold_price,
                        AlertCondition::Below => price <= alert.threshold_price,
                    }
            })
            .collect();

        for alert in &triggered {
            if let Err(e) = self
                .conn
                .execute("UPDATE alerts SET active = 0 WHERE id = ?1", params![alert.id])
            {
                warn!("Failed to deactivate alert {}: {}", alert.id, e);
            }
        }

        triggered
            .into_iter()
            .map(|alert| Alert { active: false, ..alert })
            .collect()
    }

    fn map_alert(row: &Row) -> Result<Alert, rusqlite::Error> {
        let condition_str: String = row.get(2)?;
        let condition = AlertCondition::parse(&condition_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown condition '{}'", condition_str).into(),
            )
        })?;
        let created_at_str: String = row.get(4)?;
        let created_at: DateTime<Utc> = created_at_str.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Alert {
            id: row.get(0)?,
            symbol_id: row.get(1)?,
            condition,
            threshold_price: row.get(3)?,
            created_at,
            active: row.get::<_, i64>(5)? != 0,
        })
    }
}

/// Durable key-value settings (theme, refresh cadence), best-effort: a
/// missing or corrupted value reads as the caller's default.
pub struct SettingsStore {
    conn: Connection,
}

impl SettingsStore {
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> Option<String> {
        let result = self.conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!("Settings read for '{}' failed: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn theme(&self) -> String {
        self.get(THEME_KEY).unwrap_or_else(|| "light".to_string())
    }

    pub fn set_theme(&self, theme: &str) -> Result<(), StorageError> {
        self.set(THEME_KEY, theme)
    }

    pub fn refresh_interval_ms(&self, default: u64) -> u64 {
        self.get(REFRESH_INTERVAL_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    pub fn set_refresh_interval_ms(&self, interval_ms: u64) -> Result<(), StorageError> {
        self.set(REFRESH_INTERVAL_KEY, &interval_ms.to_string())
    }
}
