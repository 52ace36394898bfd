pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::BlogDb;
pub use memory::InMemoryPostStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::PostStore;
