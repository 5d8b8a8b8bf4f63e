//! Asset tables and review boards over local key-value slots.
//!
//! Producers submit requests, creators upload assets for them and approvers
//! approve or reject each upload. Approved requests move into the image or
//! video table; every table is searched, sorted and paged the same way.
//!
//! ```no_run
//! use asset_workflow::config::AppConfig;
//! use asset_workflow::dispatch::{Command, Dispatcher, Role};
//! use asset_workflow::database::schema::asset::AssetKind;
//! use asset_workflow::database::schema::request::RequestInput;
//!
//! # async fn run() -> asset_workflow::common::errors::WorkflowResult<()> {
//! let config = AppConfig::from_env();
//! asset_workflow::setup::initialize(&config)?;
//! let mut dispatcher = Dispatcher::from_config(&config)?;
//! dispatcher
//!     .dispatch(
//!         Role::Producer,
//!         Command::Submit {
//!             board: AssetKind::Image,
//!             inputs: vec![RequestInput::image("banner.jpg", "home banner")],
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod library;
pub mod models;
pub mod setup;
pub mod workflow;
