//! Pure state transitions of a [`Request`].
//!
//! ```text
//! Pending(new|revision) --upload--> Uploaded --approve--> Completed
//!                                      |
//!                                      +--reject(feedback)--> Pending(revision)
//! ```
//!
//! Every other pair is an invalid transition and leaves the request untouched.

use chrono::{DateTime, Utc};

use super::types::{EventKind, Ignored, Outcome, RequestState};
use crate::config::RejectedAssetPolicy;
use crate::database::schema::asset::AssetRef;
use crate::database::schema::request::{
    ApprovalStatus, Request, RequestStatus, RequestType, RevisionEntry,
};

fn invalid(request: &Request, event: EventKind) -> Outcome {
    Outcome::Ignored(Ignored::InvalidTransition {
        state: RequestState::of(request),
        event,
    })
}

/// Attach `asset` as the current upload.
pub fn upload(request: &mut Request, asset: AssetRef, now: DateTime<Utc>) -> Outcome {
    if request.status != RequestStatus::Pending {
        return invalid(request, EventKind::Upload);
    }
    request.size = Some(asset.size);
    request.uploaded_asset = Some(asset);
    request.uploaded_at = Some(now);
    request.status = RequestStatus::Uploaded;
    request.approval_status = None;
    request.feedback = None;
    Outcome::Applied
}

/// Mark the request completed. The caller moves it to the archive.
pub fn approve(request: &mut Request, now: DateTime<Utc>) -> Outcome {
    if request.status != RequestStatus::Uploaded || request.uploaded_asset.is_none() {
        return invalid(request, EventKind::Approve);
    }
    request.status = RequestStatus::Completed;
    request.approval_status = Some(ApprovalStatus::Approved);
    request.reviewed_at = Some(now);
    request.approved_at = Some(now);
    Outcome::Applied
}

/// Send the request back to the creator.
///
/// The rejected asset goes into the revision history right away, so the
/// history grows by exactly one entry per rejection. `feedback` must already
/// be validated as non-blank.
pub fn reject(
    request: &mut Request,
    feedback: &str,
    policy: RejectedAssetPolicy,
    now: DateTime<Utc>,
) -> Outcome {
    if request.status != RequestStatus::Uploaded {
        return invalid(request, EventKind::Reject);
    }
    let asset = match policy {
        RejectedAssetPolicy::Clear => request.uploaded_asset.take(),
        RejectedAssetPolicy::Retain => request.uploaded_asset.clone(),
    };
    let Some(asset) = asset else {
        return invalid(request, EventKind::Reject);
    };

    request.revision_history.push(RevisionEntry {
        asset,
        uploaded_at: request.uploaded_at,
        feedback: feedback.to_string(),
    });
    if policy == RejectedAssetPolicy::Clear {
        request.size = None;
    }
    request.status = RequestStatus::Pending;
    request.approval_status = Some(ApprovalStatus::Rejected);
    request.request_type = RequestType::Revision;
    request.feedback = Some(feedback.to_string());
    request.reviewed_at = Some(now);
    Outcome::Applied
}
