use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::confirm::ConfirmationGate;
use crate::dispatch::RequestDispatcher;
use crate::error::{ApiError, Result};
use crate::notify::Severity;
use crate::resource::{Draft, ResourceDescriptor};

/// Modal lifecycle. At most one modal is open per controller; the draft
/// lives inside the variant and dies with it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Adding(Draft),
    Editing(String, Draft),
}

impl ModalState {
    pub fn is_closed(&self) -> bool {
        matches!(self, ModalState::Closed)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            ModalState::Closed => None,
            ModalState::Adding(d) | ModalState::Editing(_, d) => Some(d),
        }
    }
}

/// Point-in-time snapshot for rendering.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub records: Vec<Value>,
    pub loading: bool,
    pub error: Option<String>,
    pub modal: ModalState,
    pub confirm_target: Option<String>,
}

struct Shared {
    records: Vec<Value>,
    error: Option<String>,
    modal: ModalState,
    confirm: ConfirmationGate<String>,
    /// Monotonic fetch generation; only the newest generation may apply
    /// its response, so a slow stale fetch cannot clobber fresher data.
    fetch_gen: u64,
    fetches_in_flight: u32,
}

/// Generic per-resource admin engine.
///
/// Parameterized by a [`ResourceDescriptor`]; owns the list/loading/error
/// state, the add/edit modal lifecycle, and the two-phase delete
/// confirmation, and orchestrates create/update/delete through the
/// dispatcher. The displayed list is only ever a reflection of the last
/// accepted GET: every successful mutation re-fetches rather than patching
/// locally. Cheap to clone; clones share state, so a fetch and a submit
/// may genuinely be in flight at the same time.
#[derive(Clone)]
pub struct ResourceController {
    descriptor: ResourceDescriptor,
    dispatcher: Arc<RequestDispatcher>,
    shared: Arc<Mutex<Shared>>,
}

impl ResourceController {
    pub fn new(descriptor: ResourceDescriptor, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            descriptor,
            dispatcher,
            shared: Arc::new(Mutex::new(Shared {
                records: Vec::new(),
                error: None,
                modal: ModalState::Closed,
                confirm: ConfirmationGate::new(),
                fetch_gen: 0,
                fetches_in_flight: 0,
            })),
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ControllerState {
        let s = self.shared.lock().unwrap();
        ControllerState {
            records: s.records.clone(),
            loading: s.fetches_in_flight > 0,
            error: s.error.clone(),
            modal: s.modal.clone(),
            confirm_target: s.confirm.target().cloned(),
        }
    }

    /// Fetch the collection. On success the records replace the cache and
    /// any previous error clears; on failure the error message is kept and
    /// the previous records stay visible. Loading always clears on
    /// completion. A response from a superseded fetch is discarded.
    pub async fn fetch_list(&self) -> Result<()> {
        let gen = {
            let mut s = self.shared.lock().unwrap();
            s.fetch_gen += 1;
            s.fetches_in_flight += 1;
            s.fetch_gen
        };

        let result = self.dispatcher.get(&self.descriptor.endpoint).await;

        let mut s = self.shared.lock().unwrap();
        s.fetches_in_flight -= 1;
        if gen != s.fetch_gen {
            tracing::debug!(resource = self.descriptor.name, "Discarding stale list response");
            return result.map(|_| ());
        }
        match result {
            Ok(value) => {
                s.records = normalize_records(value);
                s.error = None;
                Ok(())
            }
            Err(e) => {
                s.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Open the add modal with a fresh draft. Refused while another modal
    /// is open.
    pub fn open_add(&self) -> Result<()> {
        let mut s = self.shared.lock().unwrap();
        if !s.modal.is_closed() {
            return Err(ApiError::Validation("another editor is already open".into()));
        }
        s.modal = ModalState::Adding(self.descriptor.empty_draft());
        s.error = None;
        Ok(())
    }

    /// Open the edit modal for a persisted record, replacing any modal
    /// already open (an in-progress add is overwritten).
    pub fn open_edit(&self, record: &Value) -> Result<()> {
        let id = self.descriptor.record_id(record).ok_or_else(|| {
            ApiError::Validation(format!(
                "record has no {} field",
                self.descriptor.id_field
            ))
        })?;
        let mut s = self.shared.lock().unwrap();
        s.modal = ModalState::Editing(id, self.descriptor.to_draft(record));
        s.error = None;
        Ok(())
    }

    /// Close the modal, discarding the draft. No unsaved-changes warning.
    pub fn close_modal(&self) {
        self.shared.lock().unwrap().modal = ModalState::Closed;
    }

    /// Merge one field into the current draft. Only valid while a modal
    /// is open.
    pub fn update_draft_field(&self, key: &str, value: Value) -> Result<()> {
        let mut s = self.shared.lock().unwrap();
        match &mut s.modal {
            ModalState::Closed => Err(ApiError::Validation("no editor is open".into())),
            ModalState::Adding(draft) | ModalState::Editing(_, draft) => {
                draft.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Validate and persist the current draft. `Adding` issues a POST to
    /// the collection, `Editing` a PUT to the item endpoint. On success
    /// the modal closes and the list is re-fetched; on failure the modal
    /// stays open with the draft intact so the user can retry.
    pub async fn submit(&self) -> Result<()> {
        let (editing_id, draft) = {
            let s = self.shared.lock().unwrap();
            match &s.modal {
                ModalState::Closed => {
                    return Err(ApiError::Validation("no editor is open".into()))
                }
                ModalState::Adding(draft) => (None, draft.clone()),
                ModalState::Editing(id, draft) => (Some(id.clone()), draft.clone()),
            }
        };

        // Required-field check never reaches the network
        if let Err(e) = self.descriptor.validate(&draft) {
            let message = e.to_string();
            self.dispatcher.notifier().notify(&message, Severity::Error);
            self.shared.lock().unwrap().error = Some(message);
            return Err(e);
        }

        let payload = self.descriptor.to_payload(&draft);
        let result = match &editing_id {
            Some(id) => {
                self.dispatcher
                    .put(&self.descriptor.item_endpoint(id), &payload)
                    .await
            }
            None => self.dispatcher.post(&self.descriptor.endpoint, &payload).await,
        };

        match result {
            Ok(_) => {
                {
                    let mut s = self.shared.lock().unwrap();
                    s.modal = ModalState::Closed;
                    s.error = None;
                }
                self.dispatcher
                    .notifier()
                    .notify("Saved successfully", Severity::Success);
                // Read-after-write: the list only ever reflects a GET. A
                // re-fetch failure surfaces on its own; the save stands.
                if let Err(e) = self.fetch_list().await {
                    tracing::warn!(error = %e, "List refresh after save failed");
                }
                Ok(())
            }
            Err(e) => {
                // Dispatcher already notified globally; keep the local
                // error and the draft for retry
                self.shared.lock().unwrap().error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Stage a delete behind the confirmation gate. No network yet.
    pub fn request_delete(&self, id: &str) {
        self.shared.lock().unwrap().confirm.request(id.to_string());
    }

    pub fn cancel_delete(&self) {
        self.shared.lock().unwrap().confirm.cancel();
    }

    /// Perform the staged delete. The gate closes unconditionally, success
    /// or failure; there is no retry prompt.
    pub async fn confirm_delete(&self) -> Result<()> {
        let target = self.shared.lock().unwrap().confirm.take_confirmed();
        let Some(id) = target else {
            return Err(ApiError::Validation("no delete pending".into()));
        };

        match self
            .dispatcher
            .delete(&self.descriptor.item_endpoint(&id))
            .await
        {
            Ok(_) => {
                self.dispatcher
                    .notifier()
                    .notify("Deleted successfully", Severity::Success);
                // Same partial-failure contract as submit: the delete stands
                if let Err(e) = self.fetch_list().await {
                    tracing::warn!(error = %e, "List refresh after delete failed");
                }
                Ok(())
            }
            Err(e) => {
                self.shared.lock().unwrap().error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// The backend answers list requests either with a bare array or with an
/// object wrapping a `data` array; both normalize to the same records.
fn normalize_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("Unexpected list response shape, treating as empty");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}
