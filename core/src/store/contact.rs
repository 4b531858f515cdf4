use super::CrmStore;
use crate::{
    error::CrmResult,
    model::{Contact, ContactResponse},
    types::{LeadId, OperatorId, SourceId},
};
use chrono::Utc;
use rusqlite::params;

impl CrmStore {
    // ── Contact ───────────────────────────────────────────────────

    pub fn create_contact(
        &self,
        lead_id: LeadId,
        source_id: SourceId,
        operator_id: Option<OperatorId>,
    ) -> CrmResult<Contact> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO contact (lead_id, source_id, operator_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![lead_id, source_id, operator_id, created_at],
        )?;
        Ok(Contact {
            id: self.conn.last_insert_rowid(),
            lead_id,
            source_id,
            operator_id,
            created_at,
        })
    }

    /// Contacts joined with their lead's external id, oldest first.
    pub fn list_contacts(&self, skip: u64, limit: u64) -> CrmResult<Vec<ContactResponse>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.lead_id, c.source_id, c.operator_id, c.created_at, l.external_id
             FROM contact c
             JOIN lead l ON l.id = c.lead_id
             ORDER BY c.id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], |row| {
            Ok(ContactResponse {
                id: row.get(0)?,
                lead_id: row.get(1)?,
                source_id: row.get(2)?,
                operator_id: row.get(3)?,
                created_at: row.get(4)?,
                lead_external_id: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn contact_count_for_operator(&self, operator_id: OperatorId) -> CrmResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contact WHERE operator_id = ?1",
            params![operator_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn unrouted_contact_count(&self) -> CrmResult<i64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contact WHERE operator_id IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
