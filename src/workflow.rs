//! Save the table remotely and open the generated document.
//!
//! The pipeline is strictly sequential: build the payload, POST it, pull the
//! record id out of the reply, announce success, then GET the document link
//! and open it. At most one run is in flight per [`SaveWorkflow`].

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::export::{ExportPayload, RecordId, extract_record_id};
use crate::notify::{LinkOpener, Notification, Notifier};
use crate::remote::DocumentService;
use crate::row::Row;

pub const SAVED_MESSAGE: &str = "Saved";
pub const SAVED_DESCRIPTION: &str =
    "Table Saved Successfully and Ready to Download! Opening in New Tab.";
pub const ERROR_MESSAGE: &str = "Error";
pub const MISSING_ID_DESCRIPTION: &str = "Failed to extract ID from response";
pub const GENERIC_ERROR_DESCRIPTION: &str =
    "Failed to extract ID from Error posting data or fetching download link";

/// Why a save stopped before a record id was obtained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SaveFailure {
    Transport { detail: String },
    UnexpectedStatus { status: u16 },
    UnrecognizedResponse { body: String },
}

/// What happened to the document link after the record was created.
///
/// None of these are confirmed to the user beyond the success notification,
/// except a failed fetch, which raises the generic error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStep {
    Opened { link: String },
    OpenFailed { link: String, reason: String },
    FetchFailed { detail: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Another save is still running; nothing was sent.
    Busy,
    Failed(SaveFailure),
    Saved {
        record_id: RecordId,
        document: DocumentStep,
    },
}

impl SaveOutcome {
    pub fn is_busy(&self) -> bool {
        matches!(self, SaveOutcome::Busy)
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            SaveOutcome::Saved { record_id, .. } => Some(record_id),
            _ => None,
        }
    }
}

/// Holds the in-flight flag; dropping it re-enables saving.
struct SaveGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> SaveGuard<'a> {
    fn acquire(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SaveGuard { busy })
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

pub struct SaveWorkflow {
    service: Arc<dyn DocumentService>,
    busy: AtomicBool,
}

impl SaveWorkflow {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        SaveWorkflow {
            service,
            busy: AtomicBool::new(false),
        }
    }

    /// True while a save is running; the page shows the trigger disabled.
    pub fn is_saving(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run the whole save sequence on `rows`.
    pub async fn save(
        &self,
        rows: &[Row],
        notifier: &dyn Notifier,
        opener: &dyn LinkOpener,
    ) -> SaveOutcome {
        let Some(_guard) = SaveGuard::acquire(&self.busy) else {
            warn!("save requested while another save is in flight");
            return SaveOutcome::Busy;
        };

        let payload = ExportPayload::from_rows(rows);
        let record_id = match self.create(&payload).await {
            Ok(id) => id,
            Err(failure) => {
                let description = match &failure {
                    SaveFailure::UnrecognizedResponse { .. } => MISSING_ID_DESCRIPTION,
                    _ => GENERIC_ERROR_DESCRIPTION,
                };
                notifier.notify(Notification::error(ERROR_MESSAGE, description));
                return SaveOutcome::Failed(failure);
            }
        };

        notifier.notify(Notification::success(SAVED_MESSAGE, SAVED_DESCRIPTION));

        let document = self.open_document(&record_id, opener).await;
        if let DocumentStep::FetchFailed { .. } = &document {
            notifier.notify(Notification::error(ERROR_MESSAGE, GENERIC_ERROR_DESCRIPTION));
        }

        SaveOutcome::Saved {
            record_id,
            document,
        }
    }

    async fn create(&self, payload: &ExportPayload) -> Result<RecordId, SaveFailure> {
        let reply = match self.service.create_record(payload).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error posting data or fetching download link: {e}");
                return Err(SaveFailure::Transport {
                    detail: e.to_string(),
                });
            }
        };
        info!(status = reply.status, body = %reply.body, "create response");

        if !reply.is_ok() {
            error!(status = reply.status, "document service rejected the table");
            return Err(SaveFailure::UnexpectedStatus {
                status: reply.status,
            });
        }

        extract_record_id(&reply.body).ok_or_else(|| {
            error!(body = %reply.body, "Failed to extract ID from response");
            SaveFailure::UnrecognizedResponse { body: reply.body }
        })
    }

    async fn open_document(&self, id: &RecordId, opener: &dyn LinkOpener) -> DocumentStep {
        let reply = match self.service.fetch_document_link(id).await {
            Ok(reply) if reply.is_ok() => reply,
            Ok(reply) => {
                error!(%id, status = reply.status, "document link request rejected");
                return DocumentStep::FetchFailed {
                    detail: format!("unexpected status {}", reply.status),
                };
            }
            Err(e) => {
                error!(%id, "Error posting data or fetching download link: {e}");
                return DocumentStep::FetchFailed {
                    detail: e.to_string(),
                };
            }
        };

        let link = reply.body.trim().to_string();
        match opener.open(&link) {
            Ok(()) => {
                info!(%link, "Success and download link");
                DocumentStep::Opened { link }
            }
            Err(e) => {
                warn!("{e}");
                DocumentStep::OpenFailed {
                    reason: e.reason,
                    link,
                }
            }
        }
    }
}
