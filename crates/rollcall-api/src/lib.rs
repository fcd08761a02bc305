pub mod error;
pub mod members;
pub mod sink;

pub use error::{ApiError, Result};
pub use members::{members_add_url, ClientOptions, GroupMeClient};
pub use sink::{AddOutcome, MemberSink};
