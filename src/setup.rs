//! Setup/initialization module - handles application startup tasks
//!
//! Includes:
//! - Folder structure initialization
//! - Logger initialization

use anstyle::{AnsiColor, Style};
use anyhow::{Context, Result};
use env_logger::{Builder, Env, WriteStyle};
use log::kv::Key;
use std::io::Write;

use crate::config::AppConfig;

const DIM: Style = AnsiColor::BrightBlack.on_default();
const DURATION: Style = AnsiColor::Cyan.on_default();

// ────────────────────────────────────────────────────────────────
// Folder Initialization
// ────────────────────────────────────────────────────────────────

/// Create the directory holding the redb file
pub fn initialize_folder(config: &AppConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────
// Logger Initialization
// ────────────────────────────────────────────────────────────────

fn format_duration(raw: String) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic()) {
        let (num, unit) = (&raw[..idx], &raw[idx..]);
        if let Ok(val) = num.parse::<f32>() {
            return format!("{:.2} {}", val, unit);
        }
    }
    raw
}

/// Initialize the global logger.
///
/// `RUST_LOG` wins over `config.log_level`. Calling this twice is harmless,
/// the second call keeps the first logger.
pub fn initialize_logger(config: &AppConfig) {
    let env = Env::default().default_filter_or(config.log_level.as_str());

    let result = Builder::from_env(env)
        .write_style(WriteStyle::Auto)
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level());

            let dur_raw = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format_duration(format!("{}", v)))
                .unwrap_or_default();

            let dur = if dur_raw.is_empty() {
                " ".repeat(10)
            } else {
                format!("{}{:>10}{:#}", DURATION, dur_raw, DURATION)
            };

            writeln!(
                buf,
                "{dim}{}{dim:#} {level_style}{}{level_style:#} {dim}{}{dim:#}",
                buf.timestamp(),
                record.level(),
                record.target(),
                dim = DIM,
            )?;

            let message = format!("{}", record.args());
            let subsequent_indent = " ".repeat(11);
            let mut lines = message.lines();

            if let Some(first_line) = lines.next() {
                writeln!(buf, "{} {}", dur, first_line)?;
            }
            for line in lines {
                writeln!(buf, "{}{}", subsequent_indent, line)?;
            }

            Ok(())
        })
        .filter(Some("redb"), log::LevelFilter::Warn)
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}

pub fn initialize(config: &AppConfig) -> Result<()> {
    initialize_logger(config);
    initialize_folder(config)
}
