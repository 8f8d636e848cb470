pub mod cache;
pub mod ledger;
pub mod logging;
pub mod push;
