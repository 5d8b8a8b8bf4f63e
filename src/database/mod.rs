pub mod schema;
pub mod slot;
pub mod store;

use log::{error, info};
use std::sync::Arc;

use crate::common::errors::WorkflowResult;
use crate::config::AppConfig;
use slot::{MemorySlots, RedbSlots, SlotStorage};

/// Open the slot database named by the config.
pub fn open_slots(config: &AppConfig) -> WorkflowResult<Arc<dyn SlotStorage>> {
    let slots = RedbSlots::open(&config.db_path)?;
    info!("Opened slot database {:?}", config.db_path);
    Ok(Arc::new(slots))
}

/// Like [`open_slots`], but a database that cannot be opened degrades to
/// process-local slots instead of failing.
pub fn open_slots_or_memory(config: &AppConfig) -> Arc<dyn SlotStorage> {
    match open_slots(config) {
        Ok(slots) => slots,
        Err(e) => {
            error!("{e}; continuing with in-memory storage for this session");
            Arc::new(MemorySlots::new())
        }
    }
}
