pub mod calibration;
pub mod catalog;
pub mod certificate;
pub mod delivery;
pub mod history;
pub mod intake;
pub mod reference;
pub mod schema;

use serde::Serialize;
use serde::de::DeserializeOwned;

use gaswork_core::{ServiceError, merge_patch, now_rfc3339};
use gaswork_sql::{SQLStore, Value};

pub use certificate::{CertificateRenderer, RenderedCertificate};

/// Workshop service — holds the storage backend and provides all
/// equipment-lifecycle and catalog-reconciliation logic.
pub struct WorkshopService {
    pub(crate) sql: Box<dyn SQLStore>,
    pub(crate) renderer: Option<Box<dyn CertificateRenderer>>,
}

impl WorkshopService {
    pub fn new(sql: Box<dyn SQLStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql, renderer: None })
    }

    /// Attach an external certificate renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn CertificateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ServiceError::AlreadyExists(msg)
            } else {
                ServiceError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows.first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, id)))?;
        let data = row.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql
            .exec(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), ServiceError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self.sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List records with exact-match filters, deserialized from `data`.
    ///
    /// `order_by` must name an indexed column; repeated identical queries
    /// return a stable ordering.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        order_by: &str,
    ) -> Result<Vec<T>, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY {}",
            table, where_sql, order_by,
        );

        self.query_records(&sql, &params)
    }

    /// Run an arbitrary `SELECT data ...` query and deserialize every row.
    pub(crate) fn query_records<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, ServiceError> {
        let rows = self.sql
            .query(sql, params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: T = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }
        Ok(items)
    }

    /// Count records with exact-match filters.
    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<i64, ServiceError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Apply a JSON merge-patch to a record, protecting immutable fields.
    pub(crate) fn apply_patch<T: Serialize + DeserializeOwned>(
        current: &T,
        patch: serde_json::Value,
    ) -> Result<T, ServiceError> {
        let mut json = serde_json::to_value(current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let now = now_rfc3339();

        let mut patch_filtered = patch;
        if let Some(obj) = patch_filtered.as_object_mut() {
            obj.remove("id");
            obj.remove("createAt");
            obj.insert("updateAt".into(), serde_json::json!(now));
        }

        merge_patch(&mut json, &patch_filtered);
        serde_json::from_value(json).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
