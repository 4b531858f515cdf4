use super::CrmStore;
use crate::{error::CrmResult, model::Source, types::SourceId};
use rusqlite::{params, OptionalExtension};

impl CrmStore {
    // ── Source ────────────────────────────────────────────────────

    pub fn insert_source(&self, name: &str) -> CrmResult<Source> {
        self.conn
            .execute("INSERT INTO source (name) VALUES (?1)", params![name])?;
        Ok(Source {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn get_source(&self, source_id: SourceId) -> CrmResult<Option<Source>> {
        let source = self
            .conn
            .query_row(
                "SELECT id, name FROM source WHERE id = ?1",
                params![source_id],
                |row| {
                    Ok(Source {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(source)
    }

    pub fn list_sources(&self, skip: u64, limit: u64) -> CrmResult<Vec<Source>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM source ORDER BY id ASC LIMIT ?1 OFFSET ?2")?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], |row| {
            Ok(Source {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
