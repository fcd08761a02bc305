use anyhow::{Context as _, Result};
use rollcall_config::AppConfig;
use rollcall_core::Normalizer;
use serde::Serialize;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub mod add;
pub mod completions;
pub mod normalize;

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Command-line file wins over `phone_file` from the config.
pub fn resolve_phone_file(ctx: &Context<'_>, file: Option<PathBuf>) -> Result<PathBuf> {
    file.or_else(|| ctx.config.phone_file.clone())
        .ok_or_else(|| CliError::NoPhoneFile.into())
}

pub fn read_phone_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(CliError::PhoneFileNotFound(path.to_path_buf()).into())
        }
        Err(err) => {
            Err(err).with_context(|| format!("read phone number file {}", path.display()))
        }
    }
}

pub fn resolve_normalizer(ctx: &Context<'_>, country_code: Option<&str>) -> Result<Normalizer> {
    match country_code {
        Some(code) => Normalizer::with_country_code(code).with_context(|| "parse --country-code"),
        None => Ok(ctx.config.normalizer.clone()),
    }
}
