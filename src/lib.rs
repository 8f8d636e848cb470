pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::api::handlers::{AppState, SplitbookService, api_routes};
pub use crate::core::errors::{LedgerViewError, TransportError};
pub use crate::core::services::LedgerViewService;
pub use crate::infrastructure::cache::in_memory::InMemoryCache;
pub use crate::infrastructure::ledger::in_memory::InMemoryLedger;
pub use crate::infrastructure::logging::in_memory::InMemoryJournal;
pub use crate::infrastructure::push::in_memory::InMemoryPushChannel;

#[cfg(test)]
mod tests;
