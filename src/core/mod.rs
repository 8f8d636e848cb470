pub mod aggregator;
pub mod biller;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod router;
pub mod services;
pub mod store;
