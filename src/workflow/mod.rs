//! Review boards: producers submit requests, creators upload assets,
//! approvers approve or send them back with feedback.

pub mod archive;
pub mod asset;
pub mod bulk_import;
pub mod ident;
pub mod transition;
pub mod types;

use chrono::Utc;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::errors::{WorkflowError, WorkflowResult};
use crate::config::{AppConfig, RejectedAssetPolicy};
use crate::database::schema::CollectionKey;
use crate::database::schema::asset::{AssetKind, AssetRef};
use crate::database::schema::request::{Request, RequestInput};
use crate::database::slot::SlotStorage;
use crate::database::store::{RecordStore, SaveOutcome};
use crate::library::AssetLibrary;
use crate::models::dto::{Page, RequestRow, TableQuery};
use types::{Ignored, InputError, Outcome, RequestView, Staged, StagedUpload, SubmitReport, try_acquire};

/// One workflow board (image or video) with the table approved requests go to.
pub struct WorkflowBoard {
    kind: AssetKind,
    requests: RecordStore<Request>,
    archive: AssetLibrary,
    uploader: String,
    approver_label: String,
    policy: RejectedAssetPolicy,
    inline_limit: u64,
    page_size: usize,
}

impl WorkflowBoard {
    /// Open the board for `kind`. Audio has no board.
    pub fn open(
        kind: AssetKind,
        slots: Arc<dyn SlotStorage>,
        config: &AppConfig,
    ) -> WorkflowResult<Self> {
        let key = match kind {
            AssetKind::Image => CollectionKey::ImageRequests,
            AssetKind::Video => CollectionKey::VideoRequests,
            AssetKind::Audio => {
                return Err(WorkflowError::Validation(
                    "There is no audio request board".to_string(),
                ));
            }
        };
        let requests = RecordStore::open(slots.clone(), key, config.slot_quota_bytes);
        let archive = AssetLibrary::open(kind, slots, config);
        info!("Opened {} board with {} requests", kind, requests.len());

        Ok(Self {
            kind,
            requests,
            archive,
            uploader: config.uploader.clone(),
            approver_label: config.approver_label.clone(),
            policy: config.rejected_asset_policy,
            inline_limit: config.inline_asset_limit,
            page_size: config.page_size,
        })
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn archive(&self) -> &AssetLibrary {
        &self.archive
    }

    pub fn archive_mut(&mut self) -> &mut AssetLibrary {
        &mut self.archive
    }

    pub fn is_degraded(&self) -> bool {
        self.requests.is_degraded()
    }

    /// Validate each input on its own and store the valid ones as new
    /// pending requests.
    pub fn submit(&mut self, inputs: Vec<RequestInput>) -> SubmitReport {
        let mut report = SubmitReport::default();
        let now = Utc::now();

        for (index, input) in inputs.into_iter().enumerate() {
            if input.kind() != self.kind {
                report.rejected.push(InputError {
                    index,
                    reason: format!("Not a {} request", self.kind),
                });
                continue;
            }
            match input.validate() {
                Ok(fields) => {
                    let request = Request::new(ident::generate_id(), fields, self.uploader.clone(), now);
                    report.created.push(request);
                }
                Err(e) => report.rejected.push(InputError {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        if !report.created.is_empty() {
            self.requests.extend(report.created.iter().cloned());
            self.requests.save();
        }
        if !report.rejected.is_empty() {
            warn!(
                "Dropped {} invalid {} request(s)",
                report.rejected.len(),
                self.kind
            );
        }
        info!("Submitted {} {} request(s)", report.created.len(), self.kind);
        report
    }

    /// Parse pasted spreadsheet text and submit what parsed.
    ///
    /// Returns the submit report together with the per-line parse errors.
    pub fn bulk_import(&mut self, text: &str) -> (SubmitReport, Vec<String>) {
        let import = bulk_import::parse(self.kind, text);
        for line in &import.errors {
            warn!("Bulk import: {line}");
        }
        (self.submit(import.inputs), import.errors)
    }

    /// Attach an already read asset to a pending request.
    pub fn upload(&mut self, id: &str, asset: AssetRef) -> Outcome {
        let Some(request) = self.requests.get_mut(id) else {
            return self.unknown(id, "upload");
        };
        let outcome = transition::upload(request, asset, Utc::now());
        self.finish(id, "upload", outcome)
    }

    /// Read the file at `path` and attach it to a pending request.
    ///
    /// A read failure is returned and leaves the request as it was.
    pub async fn upload_file(&mut self, id: &str, path: impl AsRef<Path>) -> WorkflowResult<Outcome> {
        match self.stage_upload(id, path.as_ref().to_path_buf()).await? {
            Staged::Ready(staged) => Ok(self.commit_upload(staged)),
            Staged::Ignored(reason) => Ok(Outcome::Ignored(reason)),
        }
    }

    /// Claim the request and read the file at `path` without holding the board.
    ///
    /// The claim is taken when this is called, not when the future is first
    /// polled. It is released when the returned [`StagedUpload`] is
    /// committed or dropped.
    pub fn stage_upload(
        &self,
        id: &str,
        path: PathBuf,
    ) -> impl Future<Output = WorkflowResult<Staged>> + use<> {
        let claim = match self.requests.get(id) {
            None => {
                self.unknown(id, "upload");
                Err(Ignored::UnknownRequest)
            }
            Some(_) => try_acquire(id).ok_or_else(|| {
                warn!(request_id = id; "Upload already in progress, ignored");
                Ignored::UploadInProgress
            }),
        };
        let id = id.to_string();
        let inline_limit = self.inline_limit;

        async move {
            let guard = match claim {
                Ok(guard) => guard,
                Err(reason) => return Ok(Staged::Ignored(reason)),
            };
            let asset = asset::read_asset(path, inline_limit).await?;
            Ok(Staged::Ready(StagedUpload {
                id,
                asset,
                _guard: guard,
            }))
        }
    }

    /// Attach a staged read to its request and release the claim.
    pub fn commit_upload(&mut self, staged: StagedUpload) -> Outcome {
        let StagedUpload { id, asset, _guard } = staged;
        self.upload(&id, asset)
    }

    /// Approve the current upload and move the request to the archive table.
    pub fn approve(&mut self, id: &str) -> Outcome {
        let now = Utc::now();
        let Some(request) = self.requests.get_mut(id) else {
            return self.unknown(id, "approve");
        };
        let outcome = transition::approve(request, now);
        if !outcome.is_applied() {
            return self.finish(id, "approve", outcome);
        }

        if let Some(request) = self.requests.remove(id) {
            match archive::to_archive_record(&request, &self.approver_label, now) {
                Some(record) => {
                    if self.archive.receive_archived(record) == SaveOutcome::InMemoryOnly {
                        // Keep the stored request so a restart does not lose the asset.
                        error!(request_id = id; "Archive was not persisted, keeping the stored request");
                        self.requests.degrade();
                    }
                }
                None => error!(request_id = id; "Approved request has no asset to archive"),
            }
        }
        self.requests.save();
        info!(request_id = id; "Approved {} request", self.kind);
        outcome
    }

    /// Send the request back with `feedback`, which must not be blank.
    pub fn reject(&mut self, id: &str, feedback: &str) -> WorkflowResult<Outcome> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(WorkflowError::EmptyFeedback);
        }
        let policy = self.policy;
        let Some(request) = self.requests.get_mut(id) else {
            return Ok(self.unknown(id, "reject"));
        };
        let outcome = transition::reject(request, feedback, policy, Utc::now());
        Ok(self.finish(id, "reject", outcome))
    }

    /// Remove requests from the board. Unknown ids are skipped.
    pub fn delete<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let removed = ids
            .iter()
            .filter(|id| self.requests.remove(id.as_ref()).is_some())
            .count();
        if removed > 0 {
            self.requests.save();
        }
        info!("Deleted {} of {} {} request(s)", removed, ids.len(), self.kind);
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Request> {
        self.requests.get(id)
    }

    pub fn requests(&self) -> &[Request] {
        self.requests.records()
    }

    /// Requests waiting for the creator.
    pub fn pending_requests(&self) -> Vec<&Request> {
        self.view(RequestView::Pending)
    }

    /// Requests waiting for the approver.
    pub fn review_requests(&self) -> Vec<&Request> {
        self.view(RequestView::Review)
    }

    pub fn view(&self, view: RequestView) -> Vec<&Request> {
        self.requests
            .records()
            .iter()
            .filter(|request| view.contains(request))
            .collect()
    }

    /// Search, sort and page one request list.
    pub fn query(&self, view: RequestView, query: &TableQuery) -> Page<RequestRow> {
        let mut query = query.clone();
        if query.page_size == 0 {
            query.page_size = self.page_size;
        }
        let requests: Vec<Request> = self.view(view).into_iter().cloned().collect();
        query.apply(&requests).map(RequestRow::from)
    }

    fn unknown(&self, id: &str, event: &str) -> Outcome {
        warn!(request_id = id; "{} for unknown {} request ignored", event, self.kind);
        Outcome::Ignored(Ignored::UnknownRequest)
    }

    fn finish(&mut self, id: &str, event: &str, outcome: Outcome) -> Outcome {
        match outcome {
            Outcome::Applied => {
                self.requests.save();
                info!(request_id = id; "Applied {} to {} request", event, self.kind);
            }
            Outcome::Ignored(reason) => {
                warn!(request_id = id; "Ignored {} on {} request: {:?}", event, self.kind, reason);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::request::{RequestStatus, RequestType};
    use crate::database::slot::MemorySlots;
    use arrayvec::ArrayString;

    fn board() -> WorkflowBoard {
        WorkflowBoard::open(
            AssetKind::Image,
            Arc::new(MemorySlots::new()),
            &AppConfig::default(),
        )
        .unwrap()
    }

    fn asset(name: &str) -> AssetRef {
        AssetRef {
            uri: format!("file:///tmp/{name}"),
            media_type: "image/jpeg".into(),
            size: 100,
            hash: ArrayString::from("abcd").unwrap(),
            inline: None,
        }
    }

    #[test]
    fn audio_has_no_board() {
        let result = WorkflowBoard::open(
            AssetKind::Audio,
            Arc::new(MemorySlots::new()),
            &AppConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn submit_reports_each_invalid_input() {
        let mut board = board();
        let report = board.submit(vec![
            RequestInput::image("banner.jpg", ""),
            RequestInput::image("  ", "no name"),
            RequestInput::video("c", "f", "s", "clip.mp4", "10"),
        ]);
        assert_eq!(report.created.len(), 1);
        assert_eq!(
            report.rejected.iter().map(|e| e.index).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let request = &board.requests()[0];
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.request_type, RequestType::New);
        assert_eq!(request.approval_status, None);
        assert!(request.revision_history.is_empty());
        assert_eq!(request.uploader, AppConfig::default().uploader);
    }

    #[test]
    fn blank_feedback_never_reaches_the_request() {
        let mut board = board();
        let id = board.submit(vec![RequestInput::image("a.jpg", "")]).created[0].id;
        board.upload(&id, asset("a.jpg"));
        assert!(matches!(
            board.reject(&id, "   "),
            Err(WorkflowError::EmptyFeedback)
        ));
        assert_eq!(board.get(&id).unwrap().status, RequestStatus::Uploaded);
        assert_eq!(board.review_requests().len(), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut board = board();
        let unknown = Outcome::Ignored(Ignored::UnknownRequest);
        assert_eq!(board.upload("nope", asset("x.jpg")), unknown);
        assert_eq!(board.approve("nope"), unknown);
        assert_eq!(board.reject("nope", "bad").unwrap(), unknown);
        assert_eq!(board.delete(&["nope"]), 0);
    }

    #[test]
    fn views_follow_status() {
        let mut board = board();
        let report = board.submit(vec![
            RequestInput::image("a.jpg", ""),
            RequestInput::image("b.jpg", ""),
        ]);
        let a = report.created[0].id;
        board.upload(&a, asset("a.jpg"));
        assert_eq!(board.pending_requests().len(), 1);
        assert_eq!(board.review_requests()[0].id, a);

        let page = board.query(RequestView::All, &TableQuery::default());
        assert_eq!(page.total, 2);
        assert_eq!(board.delete(&[a.as_str()]), 1);
        assert_eq!(board.requests().len(), 1);
    }

    #[tokio::test]
    async fn a_request_is_read_by_one_upload_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"first cut").unwrap();
        let mut board = board();
        let id = board.submit(vec![RequestInput::image("a.jpg", "")]).created[0].id;

        let (first, second) = tokio::join!(
            board.stage_upload(&id, path.clone()),
            board.stage_upload(&id, path.clone())
        );
        assert!(matches!(
            second.unwrap(),
            Staged::Ignored(Ignored::UploadInProgress)
        ));
        let Staged::Ready(staged) = first.unwrap() else {
            panic!("first upload should hold the claim");
        };
        assert_eq!(staged.request_id(), id.as_str());
        assert_eq!(staged.asset().size, 9);
        assert_eq!(board.get(&id).unwrap().status, RequestStatus::Pending);

        assert_eq!(board.commit_upload(staged), Outcome::Applied);
        assert_eq!(board.get(&id).unwrap().status, RequestStatus::Uploaded);

        // Claim is released by the commit; the request itself has moved on.
        let Staged::Ready(again) = board.stage_upload(&id, path).await.unwrap() else {
            panic!("claim should be free after commit");
        };
        assert!(matches!(
            board.commit_upload(again),
            Outcome::Ignored(Ignored::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn dropped_staged_upload_frees_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.jpg");
        std::fs::write(&path, b"bytes").unwrap();
        let mut board = board();
        let id = board.submit(vec![RequestInput::image("b.jpg", "")]).created[0].id;

        let staged = board.stage_upload(&id, path.clone()).await.unwrap();
        drop(staged);
        assert_eq!(board.get(&id).unwrap().status, RequestStatus::Pending);
        assert_eq!(board.upload_file(&id, &path).await.unwrap(), Outcome::Applied);

        let missing = board.stage_upload("nope", path).await.unwrap();
        assert!(matches!(missing, Staged::Ignored(Ignored::UnknownRequest)));
    }
}
