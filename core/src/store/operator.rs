use super::{operator_from_row, CrmStore};
use crate::{error::CrmResult, model::Operator, types::OperatorId};
use rusqlite::{params, OptionalExtension};

impl CrmStore {
    // ── Operator ──────────────────────────────────────────────────

    pub fn insert_operator(&self, name: &str, is_active: bool, max_load: i64) -> CrmResult<Operator> {
        self.conn.execute(
            "INSERT INTO operator (name, is_active, max_load, current_load) VALUES (?1, ?2, ?3, 0)",
            params![name, if is_active { 1 } else { 0 }, max_load],
        )?;
        Ok(Operator {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            is_active,
            max_load,
            current_load: 0,
        })
    }

    pub fn get_operator(&self, operator_id: OperatorId) -> CrmResult<Option<Operator>> {
        let operator = self
            .conn
            .query_row(
                "SELECT id, name, is_active, max_load, current_load FROM operator WHERE id = ?1",
                params![operator_id],
                |row| operator_from_row(row, 0),
            )
            .optional()?;
        Ok(operator)
    }

    pub fn list_operators(&self, skip: u64, limit: u64) -> CrmResult<Vec<Operator>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, is_active, max_load, current_load
             FROM operator ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], |row| {
            operator_from_row(row, 0)
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Overwrite the caller-editable fields. `current_load` is left alone.
    /// Returns false when no operator has that id.
    pub fn update_operator(
        &self,
        operator_id: OperatorId,
        name: &str,
        is_active: bool,
        max_load: i64,
    ) -> CrmResult<bool> {
        let changed = self.conn.execute(
            "UPDATE operator SET name = ?1, is_active = ?2, max_load = ?3 WHERE id = ?4",
            params![name, if is_active { 1 } else { 0 }, max_load, operator_id],
        )?;
        Ok(changed == 1)
    }

    /// Take one unit of capacity from the operator, atomically.
    ///
    /// The capacity check and the increment are one statement, so two
    /// writers racing for the last slot cannot both win. Returns false when
    /// the operator is inactive, at its ceiling, or missing.
    pub fn increment_operator_load_if_under_capacity(
        &self,
        operator_id: OperatorId,
    ) -> CrmResult<bool> {
        let changed = self.conn.execute(
            "UPDATE operator SET current_load = current_load + 1
             WHERE id = ?1 AND is_active = 1 AND current_load < max_load",
            params![operator_id],
        )?;
        Ok(changed == 1)
    }

    /// Test and tooling helper: force an operator's load.
    pub fn set_operator_load(&self, operator_id: OperatorId, current_load: i64) -> CrmResult<()> {
        self.conn.execute(
            "UPDATE operator SET current_load = ?1 WHERE id = ?2",
            params![current_load, operator_id],
        )?;
        Ok(())
    }
}
