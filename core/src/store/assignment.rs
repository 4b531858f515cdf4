use super::{operator_from_row, CrmStore};
use crate::{
    error::CrmResult,
    model::{Assignment, AssignmentSnapshot},
    types::{OperatorId, SourceId},
};
use rusqlite::params;

impl CrmStore {
    // ── Assignment (weight mapping) ───────────────────────────────

    pub fn insert_assignment(
        &self,
        operator_id: OperatorId,
        source_id: SourceId,
        weight: i64,
    ) -> CrmResult<Assignment> {
        self.conn.execute(
            "INSERT INTO operator_assignment (operator_id, source_id, weight) VALUES (?1, ?2, ?3)",
            params![operator_id, source_id, weight],
        )?;
        Ok(Assignment {
            id: self.conn.last_insert_rowid(),
            operator_id,
            source_id,
            weight,
        })
    }

    pub fn list_assignments(&self, skip: u64, limit: u64) -> CrmResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, operator_id, source_id, weight
             FROM operator_assignment ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], |row| {
            Ok(Assignment {
                id: row.get(0)?,
                operator_id: row.get(1)?,
                source_id: row.get(2)?,
                weight: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every weight mapping for `source_id`, each carrying its operator's
    /// live state. One query, no per-operator follow-up reads.
    pub fn list_assignments_for_source(
        &self,
        source_id: SourceId,
    ) -> CrmResult<Vec<AssignmentSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.source_id, a.weight,
                    o.id, o.name, o.is_active, o.max_load, o.current_load
             FROM operator_assignment a
             JOIN operator o ON o.id = a.operator_id
             WHERE a.source_id = ?1
             ORDER BY a.id ASC",
        )?;
        let rows = stmt.query_map(params![source_id], |row| {
            Ok(AssignmentSnapshot {
                assignment_id: row.get(0)?,
                source_id: row.get(1)?,
                weight: row.get(2)?,
                operator: operator_from_row(row, 3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
