//! Routes user intents to the boards and tables.
//!
//! Roles only decide which actions a view offers; there is no
//! authentication behind them.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::errors::WorkflowResult;
use crate::config::AppConfig;
use crate::database::open_slots_or_memory;
use crate::database::schema::asset::{AssetKind, AssetRef};
use crate::database::schema::request::RequestInput;
use crate::database::slot::SlotStorage;
use crate::library::AssetLibrary;
use crate::workflow::WorkflowBoard;
use crate::workflow::types::{Outcome, RequestView, SubmitReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits, bulk imports and deletes requests
    Producer,
    /// Uploads assets for pending requests
    Creator,
    /// Approves or rejects uploads
    Approver,
}

impl Role {
    /// Request lists shown to this role.
    pub fn views(&self) -> &'static [RequestView] {
        match self {
            Role::Producer => &[RequestView::All],
            Role::Creator => &[RequestView::Pending],
            Role::Approver => &[RequestView::Review],
        }
    }

    pub fn permits(&self, command: &Command) -> bool {
        matches!(
            (self, command),
            (
                Role::Producer,
                Command::Submit { .. } | Command::BulkImport { .. } | Command::Delete { .. }
            ) | (
                Role::Creator,
                Command::Upload { .. } | Command::UploadFile { .. }
            ) | (
                Role::Approver,
                Command::Approve { .. } | Command::Reject { .. }
            )
        )
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Submit {
        board: AssetKind,
        inputs: Vec<RequestInput>,
    },
    BulkImport {
        board: AssetKind,
        text: String,
    },
    Upload {
        board: AssetKind,
        id: String,
        asset: AssetRef,
    },
    UploadFile {
        board: AssetKind,
        id: String,
        path: PathBuf,
    },
    Approve {
        board: AssetKind,
        id: String,
    },
    Reject {
        board: AssetKind,
        id: String,
        feedback: String,
    },
    Delete {
        board: AssetKind,
        ids: Vec<String>,
    },
}

impl Command {
    pub fn board(&self) -> AssetKind {
        match self {
            Command::Submit { board, .. }
            | Command::BulkImport { board, .. }
            | Command::Upload { board, .. }
            | Command::UploadFile { board, .. }
            | Command::Approve { board, .. }
            | Command::Reject { board, .. }
            | Command::Delete { board, .. } => *board,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Submit { .. } => "submit",
            Command::BulkImport { .. } => "bulk import",
            Command::Upload { .. } => "upload",
            Command::UploadFile { .. } => "upload file",
            Command::Approve { .. } => "approve",
            Command::Reject { .. } => "reject",
            Command::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Submitted(SubmitReport),
    Imported {
        report: SubmitReport,
        errors: Vec<String>,
    },
    Transition(Outcome),
    Deleted(usize),
    /// The role does not offer this action
    NotPermitted {
        role: Role,
        command: &'static str,
    },
    /// The asset kind has no review board
    NoBoard(AssetKind),
}

/// Owns both review boards and the audio table.
pub struct Dispatcher {
    image: WorkflowBoard,
    video: WorkflowBoard,
    audio: AssetLibrary,
}

impl Dispatcher {
    pub fn open(slots: Arc<dyn SlotStorage>, config: &AppConfig) -> WorkflowResult<Self> {
        Ok(Self {
            image: WorkflowBoard::open(AssetKind::Image, slots.clone(), config)?,
            video: WorkflowBoard::open(AssetKind::Video, slots.clone(), config)?,
            audio: AssetLibrary::open(AssetKind::Audio, slots, config),
        })
    }

    /// Open on the configured database, falling back to memory if it cannot
    /// be opened.
    pub fn from_config(config: &AppConfig) -> WorkflowResult<Self> {
        Self::open(open_slots_or_memory(config), config)
    }

    pub fn board(&self, kind: AssetKind) -> Option<&WorkflowBoard> {
        match kind {
            AssetKind::Image => Some(&self.image),
            AssetKind::Video => Some(&self.video),
            AssetKind::Audio => None,
        }
    }

    pub fn board_mut(&mut self, kind: AssetKind) -> Option<&mut WorkflowBoard> {
        match kind {
            AssetKind::Image => Some(&mut self.image),
            AssetKind::Video => Some(&mut self.video),
            AssetKind::Audio => None,
        }
    }

    /// The asset table for `kind`; image and video tables are the boards'
    /// archives.
    pub fn library(&self, kind: AssetKind) -> &AssetLibrary {
        match kind {
            AssetKind::Image => self.image.archive(),
            AssetKind::Video => self.video.archive(),
            AssetKind::Audio => &self.audio,
        }
    }

    pub fn library_mut(&mut self, kind: AssetKind) -> &mut AssetLibrary {
        match kind {
            AssetKind::Image => self.image.archive_mut(),
            AssetKind::Video => self.video.archive_mut(),
            AssetKind::Audio => &mut self.audio,
        }
    }

    pub async fn dispatch(&mut self, role: Role, command: Command) -> WorkflowResult<DispatchOutcome> {
        if !role.permits(&command) {
            warn!("{:?} may not {}", role, command.name());
            return Ok(DispatchOutcome::NotPermitted {
                role,
                command: command.name(),
            });
        }
        let kind = command.board();
        let Some(board) = self.board_mut(kind) else {
            warn!("No {} board for {}", kind, command.name());
            return Ok(DispatchOutcome::NoBoard(kind));
        };
        info!("{:?} requested {} on {} board", role, command.name(), kind);

        let outcome = match command {
            Command::Submit { inputs, .. } => DispatchOutcome::Submitted(board.submit(inputs)),
            Command::BulkImport { text, .. } => {
                let (report, errors) = board.bulk_import(&text);
                DispatchOutcome::Imported { report, errors }
            }
            Command::Upload { id, asset, .. } => DispatchOutcome::Transition(board.upload(&id, asset)),
            Command::UploadFile { id, path, .. } => {
                DispatchOutcome::Transition(board.upload_file(&id, &path).await?)
            }
            Command::Approve { id, .. } => DispatchOutcome::Transition(board.approve(&id)),
            Command::Reject { id, feedback, .. } => {
                DispatchOutcome::Transition(board.reject(&id, &feedback)?)
            }
            Command::Delete { ids, .. } => DispatchOutcome::Deleted(board.delete(&ids)),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::slot::MemorySlots;

    #[test]
    fn roles_offer_their_own_actions() {
        let approve = Command::Approve {
            board: AssetKind::Image,
            id: "x".into(),
        };
        assert!(Role::Approver.permits(&approve));
        assert!(!Role::Creator.permits(&approve));
        assert!(!Role::Producer.permits(&approve));
        assert_eq!(Role::Creator.views(), &[RequestView::Pending]);
    }

    #[tokio::test]
    async fn wrong_role_and_audio_board_are_reported() {
        let mut dispatcher =
            Dispatcher::open(Arc::new(MemorySlots::new()), &AppConfig::default()).unwrap();

        let outcome = dispatcher
            .dispatch(
                Role::Creator,
                Command::Submit {
                    board: AssetKind::Image,
                    inputs: vec![RequestInput::image("a.jpg", "")],
                },
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::NotPermitted {
                role: Role::Creator,
                command: "submit"
            }
        );
        assert!(dispatcher.board(AssetKind::Image).unwrap().requests().is_empty());

        let outcome = dispatcher
            .dispatch(
                Role::Producer,
                Command::BulkImport {
                    board: AssetKind::Audio,
                    text: "theme.mp3".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::NoBoard(AssetKind::Audio));
    }

    #[tokio::test]
    async fn producer_bulk_import_lands_on_the_board() {
        let mut dispatcher =
            Dispatcher::open(Arc::new(MemorySlots::new()), &AppConfig::default()).unwrap();
        let outcome = dispatcher
            .dispatch(
                Role::Producer,
                Command::BulkImport {
                    board: AssetKind::Video,
                    text: "c1 f1 s1 intro.mp4 0:45\nbroken line".into(),
                },
            )
            .await
            .unwrap();
        let DispatchOutcome::Imported { report, errors } = outcome else {
            panic!("unexpected outcome");
        };
        assert_eq!(report.created.len(), 1);
        assert_eq!(errors, vec!["Line 2: Expected 4-5 fields, got 2".to_string()]);
        assert_eq!(dispatcher.board(AssetKind::Video).unwrap().pending_requests().len(), 1);
    }
}
