//! Search orchestration: generations, worker threads, merging.

pub mod coordinator;

pub use coordinator::{SearchCoordinator, SearchHandle};
