use anyhow::Error;
use rollcall_api::ApiError;
use rollcall_config::{ConfigError, GROUP_ID_ENV};
use rollcall_core::CoreError;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("no phone number file given: pass FILE or set phone_file in the config")]
    NoPhoneFile,
    #[error("phone number file not found: {}", .0.display())]
    PhoneFileNotFound(PathBuf),
    #[error(
        "group id is required: pass --group-id, set {} or group_id in the config",
        GROUP_ID_ENV
    )]
    MissingGroupId,
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::PhoneFileNotFound(_) => EXIT_NOT_FOUND,
            CliError::NoPhoneFile | CliError::MissingGroupId => EXIT_INVALID_INPUT,
        }
    }
}

pub fn report_error(err: &Error, verbose: bool) {
    let rendered = if verbose {
        format!("{err:#}")
    } else {
        err.to_string()
    };
    eprintln!("error: {rendered}");
}

/// First cause in the chain with a known mapping decides the exit code.
pub fn exit_code_for(err: &Error) -> ExitCode {
    let code = err
        .chain()
        .find_map(cause_exit_code)
        .unwrap_or(EXIT_FAILURE);
    ExitCode::from(code)
}

fn cause_exit_code(cause: &(dyn StdError + 'static)) -> Option<u8> {
    if let Some(err) = cause.downcast_ref::<CliError>() {
        return Some(err.exit_code());
    }
    if let Some(err) = cause.downcast_ref::<ConfigError>() {
        return Some(config_exit_code(err));
    }
    if let Some(err) = cause.downcast_ref::<ApiError>() {
        return Some(api_exit_code(err));
    }
    cause
        .downcast_ref::<CoreError>()
        .map(|_| EXIT_INVALID_INPUT)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::MissingConfigFile(_) => EXIT_NOT_FOUND,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidField { .. }
        | ConfigError::InvalidEnv { .. }
        | ConfigError::InvalidTimeout(_)
        | ConfigError::EmptyBaseUrl
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::Http(_) => EXIT_FAILURE,
        ApiError::Url(_) | ApiError::UnsupportedScheme(_) | ApiError::CannotBeABase(_) => {
            EXIT_INVALID_INPUT
        }
    }
}
