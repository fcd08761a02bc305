use crate::commands::{print_json, read_phone_file, resolve_normalizer, resolve_phone_file, Context};
use crate::error::CliError;
use anyhow::{Context as _, Result};
use clap::Args;
use rollcall_api::{AddOutcome, ClientOptions, GroupMeClient, MemberSink};
use rollcall_core::{build_payload, read_entries, BatchOptions, GroupId, MembersPayload};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Text file with one phone number per line (defaults to `phone_file` from the config)
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub group_id: Option<String>,
    /// Override the API base url
    #[arg(long)]
    pub api_base: Option<String>,
    /// Country code for numbers without a leading `+`
    #[arg(long)]
    pub country_code: Option<String>,
    /// Skip lines that are empty after trimming
    #[arg(long)]
    pub skip_blank: bool,
    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AddReport {
    Accepted {
        members: usize,
        results_id: Option<String>,
    },
    Rejected {
        members: usize,
        http_status: u16,
        body: String,
    },
    Error {
        members: usize,
        http_status: Option<u16>,
        message: String,
    },
    DryRun {
        members: usize,
        skipped_blank: usize,
        payload: MembersPayload,
    },
}

pub fn add_members(ctx: &Context<'_>, args: AddArgs) -> Result<()> {
    let normalizer = resolve_normalizer(ctx, args.country_code.as_deref())?;
    let path = resolve_phone_file(ctx, args.file)?;
    let contents = read_phone_file(&path)?;
    let options = BatchOptions {
        skip_blank_lines: args.skip_blank || ctx.config.skip_blank_lines,
    };
    let batch = build_payload(&normalizer, read_entries(&contents), options);
    debug!(
        path = %path.display(),
        members = batch.payload.len(),
        skipped_blank = batch.skipped_blank,
        "built members payload"
    );

    if args.dry_run {
        let report = AddReport::DryRun {
            members: batch.payload.len(),
            skipped_blank: batch.skipped_blank,
            payload: batch.payload,
        };
        return render(ctx, &report);
    }

    let group_id = resolve_group_id(ctx, args.group_id.as_deref())?;
    let token = ctx.config.access_token_or_placeholder();
    let base_url = args
        .api_base
        .as_deref()
        .unwrap_or(ctx.config.api.base_url.as_str());
    let client = GroupMeClient::new(
        base_url,
        &group_id,
        &token,
        ClientOptions {
            timeout: ctx.config.api.timeout_secs.map(Duration::from_secs),
            user_agent: ctx.config.api.user_agent.clone(),
        },
    )
    .with_context(|| "create api client")?;

    let report = submit(&client, &batch.payload);
    render(ctx, &report)
}

fn resolve_group_id(ctx: &Context<'_>, flag: Option<&str>) -> Result<GroupId> {
    if let Some(raw) = flag {
        return GroupId::new(raw).with_context(|| "parse --group-id");
    }
    ctx.config
        .group_id
        .clone()
        .ok_or_else(|| CliError::MissingGroupId.into())
}

// HTTP-level failures end up in the report, not in the error path. 4xx/5xx
// arrive as errors; other statuses besides 202 as rejections.
fn submit<S: MemberSink>(sink: &S, payload: &MembersPayload) -> AddReport {
    let members = payload.len();
    match sink.add_members(payload) {
        Ok(AddOutcome::Accepted { results_id }) => AddReport::Accepted {
            members,
            results_id,
        },
        Ok(AddOutcome::Rejected { status, body }) => AddReport::Rejected {
            members,
            http_status: status,
            body,
        },
        Err(err) => {
            debug!(sink = sink.sink_name(), error = %err, "members/add failed");
            AddReport::Error {
                members,
                http_status: err.status(),
                message: err.to_string(),
            }
        }
    }
}

fn render(ctx: &Context<'_>, report: &AddReport) -> Result<()> {
    if ctx.json {
        return print_json(report);
    }

    match report {
        AddReport::Accepted { results_id, .. } => {
            println!("Members added successfully!");
            if let Some(id) = results_id {
                println!("Results id: {}", id);
            }
        }
        AddReport::Rejected {
            http_status, body, ..
        } => println!("Failed to add members: {} - {}", http_status, body),
        AddReport::Error { message, .. } => println!("An error occurred: {}", message),
        AddReport::DryRun { payload, .. } => return print_json(payload),
    }
    Ok(())
}
