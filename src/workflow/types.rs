use arrayvec::ArrayString;
use dashmap::DashSet;
use std::sync::LazyLock;

use crate::database::schema::asset::AssetRef;
use crate::database::schema::request::{Request, RequestStatus, RequestType};

/// What a workflow operation did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(Ignored),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Why an event was dropped. None of these are errors: the caller may
/// simply have acted on a stale view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    UnknownRequest,
    InvalidTransition {
        state: RequestState,
        event: EventKind,
    },
    UploadInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Upload,
    Approve,
    Reject,
}

/// State of a request as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending(RequestType),
    Uploaded,
    Completed,
}

impl RequestState {
    pub fn of(request: &Request) -> Self {
        match request.status {
            RequestStatus::Pending => RequestState::Pending(request.request_type),
            RequestStatus::Uploaded => RequestState::Uploaded,
            RequestStatus::Completed => RequestState::Completed,
        }
    }
}

/// Subset of a board's requests shown in one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestView {
    /// Everything still on the board
    All,
    /// Awaiting an upload
    Pending,
    /// Uploaded and awaiting a decision
    Review,
}

impl RequestView {
    pub fn contains(&self, request: &Request) -> bool {
        match self {
            RequestView::All => true,
            RequestView::Pending => is_awaiting_upload(request),
            RequestView::Review => is_awaiting_review(request),
        }
    }
}

/// Requests awaiting an upload: the creator's queue.
pub fn is_awaiting_upload(request: &Request) -> bool {
    request.status == RequestStatus::Pending
}

/// Requests awaiting a decision: the approver's queue.
pub fn is_awaiting_review(request: &Request) -> bool {
    request.status == RequestStatus::Uploaded && request.approval_status.is_none()
}

/// Per-input failure of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    /// Position of the input in the submitted batch, 0-based
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub created: Vec<Request>,
    pub rejected: Vec<InputError>,
}

// ────────────────────────────────────────────────────────────────
// UploadGuard - Prevents concurrent uploads to the same request
// ────────────────────────────────────────────────────────────────

static IN_FLIGHT: LazyLock<DashSet<ArrayString<36>>> = LazyLock::new(DashSet::new);

#[derive(Debug)]
pub struct UploadGuard(ArrayString<36>);

impl Drop for UploadGuard {
    fn drop(&mut self) {
        IN_FLIGHT.remove(&self.0);
    }
}

pub fn try_acquire(request_id: impl AsRef<str>) -> Option<UploadGuard> {
    let id = ArrayString::from(request_id.as_ref()).ok()?;
    if IN_FLIGHT.insert(id) {
        Some(UploadGuard(id))
    } else {
        None
    }
}

/// Result of reading an upload ahead of attaching it.
#[derive(Debug)]
pub enum Staged {
    Ready(StagedUpload),
    Ignored(Ignored),
}

/// An asset read for one request, holding that request's upload claim.
#[derive(Debug)]
pub struct StagedUpload {
    pub(crate) id: String,
    pub(crate) asset: AssetRef,
    pub(crate) _guard: UploadGuard,
}

impl StagedUpload {
    pub fn request_id(&self) -> &str {
        &self.id
    }

    pub fn asset(&self) -> &AssetRef {
        &self.asset
    }
}
