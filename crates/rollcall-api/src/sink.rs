use crate::Result;
use rollcall_core::MembersPayload;

/// Result of a `members/add` call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// 202: the API queued the additions. The id names the asynchronous
    /// result set, when the body carried one.
    Accepted { results_id: Option<String> },
    /// Any other non-error status. 4xx and 5xx come back as `ApiError::Http`.
    Rejected { status: u16, body: String },
}

pub trait MemberSink {
    fn sink_name(&self) -> &'static str;
    fn add_members(&self, payload: &MembersPayload) -> Result<AddOutcome>;
}
