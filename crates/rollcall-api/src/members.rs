use crate::sink::{AddOutcome, MemberSink};
use crate::{ApiError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use rollcall_core::{AccessToken, GroupId, MembersPayload};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_USER_AGENT: &str = "rollcall";

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// `None` keeps the HTTP client's default timeout.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroupMeClient {
    http: Client,
    url: Url,
}

impl GroupMeClient {
    pub fn new(
        base_url: &str,
        group_id: &GroupId,
        token: &AccessToken,
        options: ClientOptions,
    ) -> Result<Self> {
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Self::with_http_client(http, base_url, group_id, token)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        group_id: &GroupId,
        token: &AccessToken,
    ) -> Result<Self> {
        let url = members_add_url(base_url, group_id, token)?;
        Ok(Self { http, url })
    }
}

impl MemberSink for GroupMeClient {
    fn sink_name(&self) -> &'static str {
        "groupme"
    }

    fn add_members(&self, payload: &MembersPayload) -> Result<AddOutcome> {
        debug!(
            host = self.url.host_str().unwrap_or_default(),
            path = self.url.path(),
            members = payload.len(),
            "posting members/add"
        );

        // reqwest errors embed the request url, which carries the token.
        let response = self
            .http
            .post(self.url.clone())
            .json(payload)
            .send()
            .map_err(|err| ApiError::Http(err.without_url()))?;
        let status = response.status();
        debug!(status = status.as_u16(), "members/add responded");
        let body = response
            .error_for_status()
            .and_then(|response| response.text())
            .map_err(|err| ApiError::Http(err.without_url()))?;

        if status == StatusCode::ACCEPTED {
            return Ok(AddOutcome::Accepted {
                results_id: parse_results_id(&body),
            });
        }

        Ok(AddOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// `{base}/groups/{group_id}/members/add?token={token}`
pub fn members_add_url(base_url: &str, group_id: &GroupId, token: &AccessToken) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    match url.scheme() {
        "https" | "http" => {}
        other => return Err(ApiError::UnsupportedScheme(other.to_string())),
    }

    url.path_segments_mut()
        .map_err(|_| ApiError::CannotBeABase(base_url.to_string()))?
        .pop_if_empty()
        .extend(["groups", group_id.as_str(), "members", "add"]);
    url.query_pairs_mut().append_pair("token", token.expose());
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<AddResponse>,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    results_id: Option<String>,
}

fn parse_results_id(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    envelope
        .response?
        .results_id
        .filter(|id| !id.trim().is_empty())
}
