// ==========================================
// Procurement Engine - generic SQL repository
// ==========================================
// One repository per entity, bound to the connection of the unit of work
// that created it. No business rules in here.
// ==========================================

use std::cell::Cell;
use std::marker::PhantomData;

use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mapping::{Criteria, TableMapping};

pub struct SqlRepository<'c, E> {
    conn: &'c Connection,
    scope_open: &'c Cell<bool>,
    _entity: PhantomData<fn() -> E>,
}

impl<'c, E: TableMapping> SqlRepository<'c, E> {
    pub(crate) fn new(conn: &'c Connection, scope_open: &'c Cell<bool>) -> Self {
        Self {
            conn,
            scope_open,
            _entity: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }

    /// Writes are only accepted while the owning scope is still open.
    fn ensure_writable(&self) -> RepositoryResult<()> {
        if self.scope_open.get() {
            Ok(())
        } else {
            Err(RepositoryError::DatabaseTransactionError(format!(
                "unit of work already closed, refusing to write {}",
                E::ENTITY
            )))
        }
    }

    /// Insert and assign the generated id to `entity`.
    pub fn add(&self, entity: &mut E) -> RepositoryResult<i64> {
        self.ensure_writable()?;

        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders
        );

        let values = entity.to_values()?;
        self.conn.execute(&sql, params_from_iter(values.iter()))?;

        let id = self.conn.last_insert_rowid();
        entity.set_id(id);
        Ok(id)
    }

    pub fn get(&self, id: i64) -> RepositoryResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1", Self::select_sql());
        let entity = self.conn.query_row(&sql, [id], E::from_row).optional()?;
        Ok(entity)
    }

    /// Like `get`, but a missing row is a NotFound error.
    pub fn require(&self, id: i64) -> RepositoryResult<E> {
        self.get(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: E::ENTITY.to_string(),
            id: id.to_string(),
        })
    }

    pub fn list(&self) -> RepositoryResult<Vec<E>> {
        self.find_by(&Criteria::new())
    }

    pub fn find_by(&self, criteria: &Criteria) -> RepositoryResult<Vec<E>> {
        let (where_sql, values) = criteria.to_sql::<E>()?;
        let sql = format!("{} WHERE {} ORDER BY id ASC", Self::select_sql(), where_sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), E::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// At most one match; more than one is AmbiguousResult.
    pub fn find_one_by(&self, criteria: &Criteria) -> RepositoryResult<Option<E>> {
        let mut rows = self.find_by(criteria)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(RepositoryError::AmbiguousResult {
                entity: E::ENTITY.to_string(),
                count,
            }),
        }
    }

    pub fn count_by(&self, criteria: &Criteria) -> RepositoryResult<i64> {
        let (where_sql, values) = criteria.to_sql::<E>()?;
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", E::TABLE, where_sql);
        let count = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count)
    }

    /// Write every column of `entity` back to its row.
    pub fn update(&self, entity: &E) -> RepositoryResult<()> {
        self.ensure_writable()?;

        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            E::TABLE,
            assignments,
            E::COLUMNS.len() + 1
        );

        let mut values = entity.to_values()?;
        values.push(rusqlite::types::Value::Integer(entity.id()));

        let affected = self.conn.execute(&sql, params_from_iter(values.iter()))?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: E::ENTITY.to_string(),
                id: entity.id().to_string(),
            });
        }
        Ok(())
    }

    /// Delete matching rows; empty criteria are refused.
    pub fn delete_by(&self, criteria: &Criteria) -> RepositoryResult<usize> {
        self.ensure_writable()?;
        if criteria.is_empty() {
            return Err(RepositoryError::ValidationError(format!(
                "refusing to delete every {} row",
                E::ENTITY
            )));
        }

        let (where_sql, values) = criteria.to_sql::<E>()?;
        let sql = format!("DELETE FROM {} WHERE {}", E::TABLE, where_sql);
        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(affected)
    }
}
