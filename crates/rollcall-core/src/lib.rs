pub mod batch;
pub mod domain;
pub mod error;

pub use batch::{build_payload, read_entries, BatchOptions, BuiltBatch, MembersPayload};
pub use domain::*;
pub use error::CoreError;
