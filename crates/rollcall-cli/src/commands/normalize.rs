use crate::commands::{print_json, read_phone_file, resolve_normalizer, resolve_phone_file, Context};
use anyhow::Result;
use clap::Args;
use rollcall_core::{build_payload, read_entries, BatchOptions, PhoneNumber};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Text file with one phone number per line (defaults to `phone_file` from the config)
    pub file: Option<PathBuf>,
    /// Country code for numbers without a leading `+`
    #[arg(long)]
    pub country_code: Option<String>,
    /// Skip lines that are empty after trimming
    #[arg(long)]
    pub skip_blank: bool,
}

pub fn normalize_file(ctx: &Context<'_>, args: NormalizeArgs) -> Result<()> {
    let normalizer = resolve_normalizer(ctx, args.country_code.as_deref())?;
    let path = resolve_phone_file(ctx, args.file)?;
    let contents = read_phone_file(&path)?;
    let options = BatchOptions {
        skip_blank_lines: args.skip_blank || ctx.config.skip_blank_lines,
    };
    let batch = build_payload(&normalizer, read_entries(&contents), options);
    debug!(
        path = %path.display(),
        count = batch.payload.len(),
        skipped_blank = batch.skipped_blank,
        "normalized phone numbers"
    );

    let numbers: Vec<PhoneNumber> = batch
        .payload
        .members
        .into_iter()
        .map(|member| member.phone_number)
        .collect();

    if ctx.json {
        return print_json(&numbers);
    }

    for number in numbers {
        println!("{}", number);
    }
    Ok(())
}
