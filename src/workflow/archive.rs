use chrono::{DateTime, Utc};

use crate::database::schema::asset::{AssetRecord, WorkflowHistory};
use crate::database::schema::request::{Request, RequestFields};
use crate::models::dto::row::format_length;

/// Build the asset record an approved request is handed off as.
///
/// Returns `None` if the request has no current asset.
pub fn to_archive_record(
    request: &Request,
    approver: &str,
    approved_at: DateTime<Utc>,
) -> Option<AssetRecord> {
    let source = request.uploaded_asset.clone()?;
    let kind = request.fields.kind();

    let description = match &request.fields {
        RequestFields::Image { description, .. } => description.clone(),
        RequestFields::Video {
            frame_chain,
            frame,
            slide,
            desired_length_secs,
            ..
        } => format!(
            "Frame Chain: {}\nFrame: {}\nSlide: {}\nDesired Length: {}",
            frame_chain,
            frame,
            slide,
            format_length(*desired_length_secs)
        ),
    };
    let duration_secs = match &request.fields {
        RequestFields::Video {
            desired_length_secs,
            ..
        } => Some(*desired_length_secs),
        RequestFields::Image { .. } => None,
    };

    Some(AssetRecord {
        id: request.id,
        kind,
        name: request.filename().to_string(),
        description,
        category: kind.default_category().to_string(),
        tags: Vec::new(),
        size: source.size,
        media_type: source.media_type.clone(),
        uploader: request.uploader.clone(),
        approver: Some(approver.to_string()),
        date: approved_at,
        source: Some(source),
        duration_secs,
        workflow_history: Some(WorkflowHistory {
            created_at: request.created_at,
            uploaded_at: request.uploaded_at,
            approved_at,
            revision_history: request.revision_history.clone(),
        }),
    })
}
