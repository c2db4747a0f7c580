// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile CRUD operations.
//!
//! Cycle dates are stored as `YYYY-MM-DD` text; timestamps as RFC 3339 text.

use chrono::NaiveDate;
use lunara_core::LunaraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ReminderTarget, UserProfile};

const DATE_FMT: &str = "%Y-%m-%d";

fn date_to_db(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

fn date_from_db(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok())
}

/// Insert a new profile or refresh the display name and last-seen timestamp
/// of an existing one. `first_seen` is stamped on insert and never changes.
pub async fn upsert_user(
    db: &Database,
    chat_id: &str,
    display_name: &str,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    let display_name = display_name.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (chat_id, display_name, first_seen, last_seen)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET
                     display_name = excluded.display_name,
                     last_seen = excluded.last_seen",
                params![chat_id, display_name, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user profile by chat id.
pub async fn get_user(db: &Database, chat_id: &str) -> Result<Option<UserProfile>, LunaraError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT chat_id, display_name, first_seen, last_seen, language,
                        last_period, next_period, wants_reminder
                 FROM users WHERE chat_id = ?1",
            )?;
            let result = stmt.query_row(params![chat_id], |row| {
                Ok(UserProfile {
                    chat_id: row.get(0)?,
                    display_name: row.get(1)?,
                    first_seen: row.get(2)?,
                    last_seen: row.get(3)?,
                    language: row.get(4)?,
                    last_period: date_from_db(row.get(5)?),
                    next_period: date_from_db(row.get(6)?),
                    wants_reminder: row.get(7)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the user's preferred display language.
pub async fn update_language(
    db: &Database,
    chat_id: &str,
    language: &str,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    let language = language.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET language = ?1 WHERE chat_id = ?2",
                params![language, chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the last recorded and predicted next cycle start dates.
pub async fn update_period(
    db: &Database,
    chat_id: &str,
    last: NaiveDate,
    next: NaiveDate,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    let last = date_to_db(last);
    let next = date_to_db(next);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET last_period = ?1, next_period = ?2 WHERE chat_id = ?3",
                params![last, next, chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist the reminder opt-in flag.
pub async fn update_reminder_flag(
    db: &Database,
    chat_id: &str,
    wants: bool,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET wants_reminder = ?1 WHERE chat_id = ?2",
                params![wants, chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all users with the reminder flag set and a non-null predicted next date.
pub async fn list_reminder_optins(db: &Database) -> Result<Vec<ReminderTarget>, LunaraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT chat_id, next_period, language FROM users
                 WHERE wants_reminder = 1 AND next_period IS NOT NULL",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?;
            let mut targets = Vec::new();
            for row in rows {
                let (chat_id, next, language) = row?;
                // A row whose date text fails to parse is skipped, not fatal.
                if let Some(next_period) = date_from_db(Some(next)) {
                    targets.push(ReminderTarget {
                        chat_id,
                        next_period,
                        language,
                    });
                }
            }
            Ok(targets)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let (db, _dir) = setup_db().await;

        upsert_user(&db, "chat-1", "Ada").await.unwrap();
        let user = get_user(&db, "chat-1").await.unwrap().unwrap();
        assert_eq!(user.chat_id, "chat-1");
        assert_eq!(user.display_name, "Ada");
        assert!(user.language.is_none());
        assert!(user.last_period.is_none());
        assert!(!user.wants_reminder);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, "nobody").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_preserves_first_seen_and_refreshes_last_seen() {
        let (db, _dir) = setup_db().await;

        upsert_user(&db, "chat-1", "Ada").await.unwrap();
        let first = get_user(&db, "chat-1").await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        upsert_user(&db, "chat-1", "Ada L.").await.unwrap();
        let second = get_user(&db, "chat-1").await.unwrap().unwrap();

        assert_eq!(second.first_seen, first.first_seen);
        assert_eq!(second.display_name, "Ada L.");
        assert!(second.last_seen > first.last_seen);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_period_round_trips_dates() {
        let (db, _dir) = setup_db().await;

        upsert_user(&db, "chat-1", "Ada").await.unwrap();
        update_period(&db, "chat-1", d(2025, 5, 12), d(2025, 6, 9))
            .await
            .unwrap();

        let user = get_user(&db, "chat-1").await.unwrap().unwrap();
        assert_eq!(user.last_period, Some(d(2025, 5, 12)));
        assert_eq!(user.next_period, Some(d(2025, 6, 9)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_language_and_reminder_flag() {
        let (db, _dir) = setup_db().await;

        upsert_user(&db, "chat-1", "Ada").await.unwrap();
        update_language(&db, "chat-1", "Hausa").await.unwrap();
        update_reminder_flag(&db, "chat-1", true).await.unwrap();

        let user = get_user(&db, "chat-1").await.unwrap().unwrap();
        assert_eq!(user.language.as_deref(), Some("Hausa"));
        assert!(user.wants_reminder);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reminder_optins_filters_flag_and_null_dates() {
        let (db, _dir) = setup_db().await;

        // Opted in with a date: included.
        upsert_user(&db, "in", "A").await.unwrap();
        update_period(&db, "in", d(2025, 5, 12), d(2025, 6, 9))
            .await
            .unwrap();
        update_reminder_flag(&db, "in", true).await.unwrap();

        // Opted in without a date: excluded.
        upsert_user(&db, "no-date", "B").await.unwrap();
        update_reminder_flag(&db, "no-date", true).await.unwrap();

        // Has a date but opted out: excluded.
        upsert_user(&db, "opt-out", "C").await.unwrap();
        update_period(&db, "opt-out", d(2025, 5, 1), d(2025, 5, 29))
            .await
            .unwrap();

        let targets = list_reminder_optins(&db).await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].chat_id, "in");
        assert_eq!(targets[0].next_period, d(2025, 6, 9));

        db.close().await.unwrap();
    }
}
