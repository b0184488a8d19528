//! Connection settings.
//!
//! Each field is taken from the module arguments first, then from the
//! `VMWARE_*` environment variables, then from an optional YAML profile
//! (`$VSR_PROFILE`, or `<config dir>/vsr/connection.yaml` when present).

use crate::error::AppError;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;
use vsr_vmware::types::VsphereConfig;

pub const PROFILE_ENV: &str = "VSR_PROFILE";
pub const HOST_ENV: &str = "VMWARE_HOST";
pub const USER_ENV: &str = "VMWARE_USER";
pub const PASSWORD_ENV: &str = "VMWARE_PASSWORD";
pub const PORT_ENV: &str = "VMWARE_PORT";
pub const VALIDATE_CERTS_ENV: &str = "VMWARE_VALIDATE_CERTS";

/// Argument keys (and aliases) that belong to the connection, not the module.
pub const CONNECTION_KEYS: &[&str] = &[
    "hostname",
    "username",
    "user",
    "admin",
    "password",
    "pass",
    "pwd",
    "port",
    "validate_certs",
    "timeout",
];

const DEFAULT_PORT: u16 = 443;
const DEFAULT_TIMEOUT: u64 = 30;

/// Connection fields as given in module arguments or a profile file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionArgs {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, alias = "user", alias = "admin")]
    pub username: Option<String>,
    #[serde(default, alias = "pass", alias = "pwd")]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, deserialize_with = "opt_bool_word")]
    pub validate_certs: Option<bool>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// `<config dir>/vsr/connection.yaml`
pub fn default_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vsr").join("connection.yaml"))
}

/// Read a profile file.
pub fn read_profile(path: &Path) -> Result<ConnectionArgs, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_yaml::from_str(&text)
        .map_err(|e| AppError::Config(format!("Invalid connection profile {}: {e}", path.display())))
}

/// Locate and read the profile. An explicit `$VSR_PROFILE` must exist; the
/// default location is optional.
pub fn load_profile<E>(env: &E) -> Result<Option<ConnectionArgs>, AppError>
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(path) = env(PROFILE_ENV).filter(|p| !p.is_empty()) {
        debug!(profile = %path, "using connection profile from {PROFILE_ENV}");
        return read_profile(Path::new(&path)).map(Some);
    }
    match default_profile_path() {
        Some(path) if path.is_file() => {
            debug!(profile = %path.display(), "using default connection profile");
            read_profile(&path).map(Some)
        }
        _ => Ok(None),
    }
}

fn missing(what: &str, var: &str, example: &str) -> AppError {
    AppError::Config(format!(
        "{what} parameter is missing. Please specify this parameter in task or \
         export environment variable like 'export {var}={example}'"
    ))
}

/// Boolean words in the Ansible sense: yes/no, on/off, 1/0, true/false.
pub fn bool_word(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Some(true),
        "0" | "false" | "no" | "off" | "n" | "f" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl BoolLike {
    fn into_bool<E: serde::de::Error>(self) -> Result<bool, E> {
        match self {
            BoolLike::Bool(b) => Ok(b),
            BoolLike::Int(1) => Ok(true),
            BoolLike::Int(0) => Ok(false),
            BoolLike::Int(n) => Err(E::custom(format!("expected a boolean, got {n}"))),
            BoolLike::Text(s) => bool_word(&s).ok_or_else(|| E::custom(format!("expected a boolean, got '{s}'"))),
        }
    }
}

/// `deserialize_with` for boolean options written as a bool or a boolean word.
pub fn bool_word_or_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    BoolLike::deserialize(d)?.into_bool()
}

/// Optional form of [`bool_word_or_bool`].
pub fn opt_bool_word<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BoolLike>::deserialize(d)?.map(BoolLike::into_bool).transpose()
}

fn parse_bool(var: &str, value: &str) -> Result<bool, AppError> {
    bool_word(value).ok_or_else(|| AppError::Config(format!("{var} must be a boolean, got '{value}'")))
}

/// Merge arguments, environment and profile into a client configuration.
pub fn resolve_connection<E>(
    args: ConnectionArgs,
    env: E,
    profile: Option<ConnectionArgs>,
) -> Result<VsphereConfig, AppError>
where
    E: Fn(&str) -> Option<String>,
{
    let profile = profile.unwrap_or_default();
    let env = |k: &str| env(k).filter(|v| !v.is_empty());

    let host = args
        .hostname
        .or_else(|| env(HOST_ENV))
        .or(profile.hostname)
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| missing("Hostname", HOST_ENV, "ESXI_HOSTNAME"))?;
    let username = args
        .username
        .or_else(|| env(USER_ENV))
        .or(profile.username)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| missing("Username", USER_ENV, "ESXI_USERNAME"))?;
    let password = args
        .password
        .or_else(|| env(PASSWORD_ENV).map(SecretString::new))
        .or(profile.password)
        .ok_or_else(|| missing("Password", PASSWORD_ENV, "ESXI_PASSWORD"))?;

    let env_port = env(PORT_ENV)
        .map(|p| {
            p.trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("{PORT_ENV} must be a port number, got '{p}'")))
        })
        .transpose()?;
    let port = args.port.or(env_port).or(profile.port).unwrap_or(DEFAULT_PORT);

    let env_validate = env(VALIDATE_CERTS_ENV)
        .map(|v| parse_bool(VALIDATE_CERTS_ENV, &v))
        .transpose()?;
    let validate_certs = args
        .validate_certs
        .or(env_validate)
        .or(profile.validate_certs)
        .unwrap_or(true);

    let timeout_secs = args.timeout.or(profile.timeout).unwrap_or(DEFAULT_TIMEOUT);

    Ok(VsphereConfig {
        host,
        port,
        username,
        password,
        insecure: !validate_certs,
        timeout_secs,
    })
}

/// Resolve against the real process environment.
pub fn resolve_from_environment(args: ConnectionArgs) -> Result<VsphereConfig, AppError> {
    let env = |k: &str| std::env::var(k).ok();
    let profile = load_profile(&env)?;
    resolve_connection(args, env, profile)
}
