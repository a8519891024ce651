pub mod catalog;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ApiError;

/// In-progress edit buffer for one record. Exists only while a modal is
/// open; discarded on close or successful submit.
pub type Draft = Map<String, Value>;

/// One field of a resource schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub required: bool,
    pub default: Value,
}

impl FieldSpec {
    pub fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
            default: Value::String(String::new()),
        }
    }

    pub fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
            default: Value::String(String::new()),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

type DraftMapper = Arc<dyn Fn(&Value) -> Draft + Send + Sync>;
type PayloadMapper = Arc<dyn Fn(&Draft) -> Value + Send + Sync>;

/// Static per-resource configuration handed to the generic controller.
///
/// The field list is declarative; the default draft/payload mappers are
/// derived from it (copy listed fields, fall back to field defaults), so a
/// concrete admin page is a schema plus rendering. Resources with wire
/// shapes that differ from their edit shape override the mappers.
#[derive(Clone)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub endpoint: String,
    /// Identifier field name as the backend returns it (`id` or `_id`).
    pub id_field: &'static str,
    pub fields: Vec<FieldSpec>,
    to_draft: Option<DraftMapper>,
    to_payload: Option<PayloadMapper>,
}

impl ResourceDescriptor {
    pub fn new(
        name: &'static str,
        endpoint: &str,
        id_field: &'static str,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            name,
            endpoint: endpoint.to_string(),
            id_field,
            fields,
            to_draft: None,
            to_payload: None,
        }
    }

    pub fn with_to_draft<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Draft + Send + Sync + 'static,
    {
        self.to_draft = Some(Arc::new(f));
        self
    }

    pub fn with_to_payload<F>(mut self, f: F) -> Self
    where
        F: Fn(&Draft) -> Value + Send + Sync + 'static,
    {
        self.to_payload = Some(Arc::new(f));
        self
    }

    /// Fresh draft for the "add" flow, seeded from field defaults.
    pub fn empty_draft(&self) -> Draft {
        let mut draft = Draft::new();
        for field in &self.fields {
            draft.insert(field.key.to_string(), field.default.clone());
        }
        draft
    }

    /// Map a persisted record into draft shape for the "edit" flow.
    pub fn to_draft(&self, record: &Value) -> Draft {
        if let Some(mapper) = &self.to_draft {
            return mapper(record);
        }
        let mut draft = Draft::new();
        for field in &self.fields {
            let value = record.get(field.key).cloned().unwrap_or_else(|| field.default.clone());
            draft.insert(field.key.to_string(), value);
        }
        draft
    }

    /// Map a draft into the wire payload for POST/PUT.
    pub fn to_payload(&self, draft: &Draft) -> Value {
        if let Some(mapper) = &self.to_payload {
            return mapper(draft);
        }
        let mut payload = Map::new();
        for field in &self.fields {
            let value = draft.get(field.key).cloned().unwrap_or_else(|| field.default.clone());
            payload.insert(field.key.to_string(), value);
        }
        Value::Object(payload)
    }

    /// Client-side required-field check. Missing, null, and empty-string
    /// values all fail; this runs before any network call.
    pub fn validate(&self, draft: &Draft) -> Result<(), ApiError> {
        for field in self.fields.iter().filter(|f| f.required) {
            let empty = match draft.get(field.key) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(a)) => a.is_empty(),
                Some(_) => false,
            };
            if empty {
                return Err(ApiError::Validation(format!("{} is required", field.key)));
            }
        }
        Ok(())
    }

    /// Identifier of a persisted record, read through `id_field`. Numeric
    /// ids are stringified since they only ever appear in URL paths.
    pub fn record_id(&self, record: &Value) -> Option<String> {
        match record.get(self.id_field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn item_endpoint(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint, id)
    }
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("id_field", &self.id_field)
            .field("fields", &self.fields)
            .finish()
    }
}
