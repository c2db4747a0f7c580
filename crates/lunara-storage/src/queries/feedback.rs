// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only feedback store operations.

use lunara_core::LunaraError;
use rusqlite::params;

use crate::database::Database;

/// Append one feedback entry: the categorical first answer ("1"/"2") and the
/// verbatim free-text second answer.
pub async fn append_feedback(
    db: &Database,
    chat_id: &str,
    response1: &str,
    response2: &str,
) -> Result<(), LunaraError> {
    let chat_id = chat_id.to_string();
    let response1 = response1.to_string();
    let response2 = response2.to_string();
    let now = chrono::Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO feedback (chat_id, response1, response2, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![chat_id, response1, response2, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
