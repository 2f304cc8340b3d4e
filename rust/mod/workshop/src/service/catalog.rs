use gaswork_core::{ListParams, ListResult, ServiceError, now_rfc3339};
use gaswork_sql::Value;

use super::WorkshopService;
use crate::model::{ClientRef, MasterCatalogEntry, SensorDefault};

/// Input for direct catalog registration.
#[derive(Debug, Default)]
pub struct RegisterCatalogInput {
    pub serial_number: String,
    pub brand: String,
    pub model: String,
    pub current_client: Option<ClientRef>,
    pub default_sensors: Vec<SensorDefault>,
    pub general_observations: String,
}

/// Substring filters for catalog search. AND across supplied filters.
#[derive(Debug, Default)]
pub struct CatalogFilters {
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub client: Option<String>,
}

impl WorkshopService {
    /// Exact-match read by serial number.
    pub fn lookup_catalog(&self, serial: &str) -> Result<MasterCatalogEntry, ServiceError> {
        self.get_record("catalog_entries", serial)
    }

    /// Register a new master catalog entry. Serial numbers are unique.
    pub fn register_catalog(
        &self,
        input: RegisterCatalogInput,
    ) -> Result<MasterCatalogEntry, ServiceError> {
        if input.serial_number.trim().is_empty() {
            return Err(ServiceError::Validation("serial_number is required".into()));
        }
        if input.brand.trim().is_empty() || input.model.trim().is_empty() {
            return Err(ServiceError::Validation(format!(
                "brand and model are required for catalog entry '{}'",
                input.serial_number
            )));
        }

        let now = now_rfc3339();
        let entry = MasterCatalogEntry {
            serial_number: input.serial_number.clone(),
            brand: input.brand,
            model: input.model,
            current_client: input.current_client,
            default_sensors: input.default_sensors,
            general_observations: input.general_observations,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("catalog_entries", &entry.serial_number, &entry, &[
            ("serial_number", Value::Text(entry.serial_number.clone())),
            ("brand", Value::Text(entry.brand.clone())),
            ("model", Value::Text(entry.model.clone())),
            ("client_name", client_name_value(&entry.current_client)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ]).map_err(|e| match e {
            ServiceError::AlreadyExists(_) => ServiceError::AlreadyExists(format!(
                "catalog entry with serial '{}' already exists",
                entry.serial_number
            )),
            other => other,
        })?;

        Ok(entry)
    }

    /// Apply a JSON merge-patch to a catalog entry.
    ///
    /// `serial_number` is immutable: a patch attempting to change it is
    /// rejected rather than silently ignored.
    pub fn update_catalog(
        &self,
        serial: &str,
        patch: serde_json::Value,
    ) -> Result<MasterCatalogEntry, ServiceError> {
        let current: MasterCatalogEntry = self.lookup_catalog(serial)?;

        if let Some(requested) = patch.get("serialNumber").and_then(|v| v.as_str())
            && requested != current.serial_number
        {
            return Err(ServiceError::Validation(format!(
                "serial_number is immutable (catalog entry '{}')",
                current.serial_number
            )));
        }

        let updated: MasterCatalogEntry = Self::apply_patch(&current, patch)?;

        self.update_record("catalog_entries", serial, &updated, &[
            ("brand", Value::Text(updated.brand.clone())),
            ("model", Value::Text(updated.model.clone())),
            ("client_name", client_name_value(&updated.current_client)),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    /// Paginated catalog listing, ordered by serial number.
    pub fn list_catalog(
        &self,
        params: &ListParams,
    ) -> Result<ListResult<MasterCatalogEntry>, ServiceError> {
        let total = self.count_records("catalog_entries", &[])? as usize;
        let items = self.query_records(
            "SELECT data FROM catalog_entries ORDER BY serial_number LIMIT ?1 OFFSET ?2",
            &[
                Value::Integer(params.limit as i64),
                Value::Integer(params.offset as i64),
            ],
        )?;
        Ok(ListResult { items, total })
    }

    /// Case-insensitive substring search across catalog attributes.
    ///
    /// Ordered by serial number so repeated identical queries are stable.
    pub fn search_catalog(
        &self,
        filters: &CatalogFilters,
    ) -> Result<Vec<MasterCatalogEntry>, ServiceError> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let mut add = |col: &str, needle: &Option<String>, clauses: &mut Vec<String>, params: &mut Vec<Value>| {
            if let Some(n) = needle {
                let idx = params.len() + 1;
                clauses.push(format!("lower({}) LIKE '%' || lower(?{}) || '%'", col, idx));
                params.push(Value::Text(n.clone()));
            }
        };
        add("serial_number", &filters.serial, &mut clauses, &mut params);
        add("brand", &filters.brand, &mut clauses, &mut params);
        add("model", &filters.model, &mut clauses, &mut params);
        add("client_name", &filters.client, &mut clauses, &mut params);

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT data FROM catalog_entries{} ORDER BY serial_number",
            where_sql
        );
        self.query_records(&sql, &params)
    }

    /// Delete a catalog entry. Refused while any workshop entry (open or
    /// delivered) still references the serial.
    pub fn delete_catalog(&self, serial: &str) -> Result<(), ServiceError> {
        let _ = self.lookup_catalog(serial)?;

        let referencing = self.count_records(
            "workshop_entries",
            &[("serial_number", Value::Text(serial.to_string()))],
        )?;
        if referencing > 0 {
            return Err(ServiceError::InvalidState(format!(
                "catalog entry '{}' is referenced by {} workshop entr{}",
                serial,
                referencing,
                if referencing == 1 { "y" } else { "ies" }
            )));
        }

        self.delete_record("catalog_entries", serial)
    }
}

pub(crate) fn client_name_value(client: &Option<ClientRef>) -> Value {
    match client {
        Some(c) => Value::Text(c.name.clone()),
        None => Value::Null,
    }
}
