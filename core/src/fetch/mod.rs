pub mod coordinator;

pub use coordinator::{ColumnFetchCoordinator, FetchPlan};
