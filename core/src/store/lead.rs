use super::CrmStore;
use crate::{error::CrmResult, model::Lead};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

impl CrmStore {
    // ── Lead ──────────────────────────────────────────────────────

    pub fn find_lead_by_external_id(&self, external_id: &str) -> CrmResult<Option<Lead>> {
        let lead = self
            .conn
            .query_row(
                "SELECT id, external_id, created_at FROM lead WHERE external_id = ?1",
                params![external_id],
                |row| {
                    Ok(Lead {
                        id: row.get(0)?,
                        external_id: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(lead)
    }

    /// Plain insert. Fails with a UNIQUE violation if the external id exists.
    pub fn create_lead(&self, external_id: &str) -> CrmResult<Lead> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO lead (external_id, created_at) VALUES (?1, ?2)",
            params![external_id, created_at],
        )?;
        Ok(Lead {
            id: self.conn.last_insert_rowid(),
            external_id: external_id.to_string(),
            created_at,
        })
    }

    pub fn list_leads(&self, skip: u64, limit: u64) -> CrmResult<Vec<Lead>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, external_id, created_at FROM lead ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], |row| {
            Ok(Lead {
                id: row.get(0)?,
                external_id: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn lead_count_for_external_id(&self, external_id: &str) -> CrmResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lead WHERE external_id = ?1",
            params![external_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
