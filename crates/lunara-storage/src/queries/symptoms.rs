// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only symptom log operations.

use lunara_core::LunaraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::SymptomEntry;

/// Append one symptom entry, stamped with the current time.
pub async fn append_symptom(
    db: &Database,
    chat_id: &str,
    symptom: &str,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    let symptom = symptom.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO symptoms (chat_id, symptom, logged_at) VALUES (?1, ?2, ?3)",
                params![chat_id, symptom, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a user's symptom entries, most recent first.
///
/// The id tiebreak keeps ordering deterministic for entries logged within
/// the same timestamp granularity.
pub async fn list_symptoms(db: &Database, chat_id: &str) -> Result<Vec<SymptomEntry>, LunaraError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT chat_id, symptom, logged_at FROM symptoms
                 WHERE chat_id = ?1 ORDER BY logged_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![chat_id], |row| {
                Ok(SymptomEntry {
                    chat_id: row.get(0)?,
                    symptom: row.get(1)?,
                    logged_at: row.get(2)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
