use gaswork_core::{ServiceError, new_id, now_rfc3339};
use gaswork_sql::Value;

use super::WorkshopService;
use crate::model::{Brand, Client, ModelRef, Technician};

// Plain reference-list CRUD. Name registries only — no state machine.

impl WorkshopService {
    pub fn list_brands(&self) -> Result<Vec<Brand>, ServiceError> {
        self.list_records("brands", &[], "name")
    }

    pub fn create_brand(&self, name: &str) -> Result<Brand, ServiceError> {
        let name = required_name(name, "brand")?;
        let brand = Brand { id: new_id(), name: name.clone() };
        self.insert_named("brands", &brand.id, &brand, &name)?;
        Ok(brand)
    }

    pub fn list_models(&self) -> Result<Vec<ModelRef>, ServiceError> {
        self.list_records("models", &[], "name")
    }

    pub fn create_model(&self, name: &str) -> Result<ModelRef, ServiceError> {
        let name = required_name(name, "model")?;
        let model = ModelRef { id: new_id(), name: name.clone() };
        self.insert_named("models", &model.id, &model, &name)?;
        Ok(model)
    }

    pub fn list_technicians(&self) -> Result<Vec<Technician>, ServiceError> {
        self.list_records("technicians", &[], "name")
    }

    pub fn create_technician(&self, name: &str) -> Result<Technician, ServiceError> {
        let name = required_name(name, "technician")?;
        let tech = Technician { id: new_id(), name: name.clone() };
        self.insert_named("technicians", &tech.id, &tech, &name)?;
        Ok(tech)
    }

    pub fn list_clients(&self) -> Result<Vec<Client>, ServiceError> {
        self.list_records("clients", &[], "name")
    }

    /// Clients are unique on tax_id, not name — companies share names,
    /// fiscal identifiers don't.
    pub fn create_client(&self, mut client: Client) -> Result<Client, ServiceError> {
        if client.name.trim().is_empty() || client.tax_id.trim().is_empty() {
            return Err(ServiceError::Validation(
                "client name and tax_id are required".into(),
            ));
        }
        client.id = new_id();
        self.insert_record("clients", &client.id.clone(), &client, &[
            ("name", Value::Text(client.name.clone())),
            ("tax_id", Value::Text(client.tax_id.clone())),
            ("create_at", Value::Text(now_rfc3339())),
        ]).map_err(|e| match e {
            ServiceError::AlreadyExists(_) => ServiceError::AlreadyExists(format!(
                "client with tax_id '{}' already exists",
                client.tax_id
            )),
            other => other,
        })?;
        Ok(client)
    }

    fn insert_named<T: serde::Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        name: &str,
    ) -> Result<(), ServiceError> {
        self.insert_record(table, id, record, &[
            ("name", Value::Text(name.to_string())),
            ("create_at", Value::Text(now_rfc3339())),
        ]).map_err(|e| match e {
            ServiceError::AlreadyExists(_) => ServiceError::AlreadyExists(format!(
                "{} '{}' already exists",
                table.trim_end_matches('s'),
                name
            )),
            other => other,
        })
    }
}

fn required_name(name: &str, what: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} name is required", what)));
    }
    Ok(trimmed.to_string())
}
