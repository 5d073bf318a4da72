//! Where is the observer?
//!
//! A coordinate can come from several places. They are tried in order and
//! the first one configured wins:
//!
//! 1. `--near LAT,LNG`: explicit per-command override
//! 2. `CURBSIDE_LOCATION` env var
//! 3. `locate-command` in config: a shell command that prints `LAT,LNG`
//! 4. `location` in config
//!
//! With none of them there is no location, and asking for one fails with
//! [`LocationError::Unsupported`].

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::model::Coordinate;

/// Environment variable holding a fixed `"LAT,LNG"`.
pub const LOCATION_ENV: &str = "CURBSIDE_LOCATION";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error(
        "location is not available: pass --near LAT,LNG, set CURBSIDE_LOCATION, \
         or add `location` or `locate-command` to config.toml"
    )]
    Unsupported,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("locate command failed: {0}")]
    Command(String),

    #[error("could not read a coordinate from {origin}: {reason}")]
    Parse { origin: String, reason: String },
}

/// Anything that can report the observer's coordinate.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError>;
}

/// Always reports the same coordinate.
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Runs a shell command and parses its stdout.
pub struct CommandLocation {
    command: String,
}

impl CommandLocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for CommandLocation {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        debug!(command = %self.command, "running locate command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| LocationError::Command(format!("failed to run sh: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LocationError::Command(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_coordinate(stdout.trim(), "locate-command output")
    }
}

/// No source configured.
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Picks a provider from the resolution chain, reading `CURBSIDE_LOCATION`
/// from the environment.
pub fn resolve_provider(
    explicit: Option<Coordinate>,
    config: &Config,
) -> Result<Box<dyn LocationProvider>, LocationError> {
    resolve_provider_from(explicit, env::var(LOCATION_ENV).ok(), config)
}

fn resolve_provider_from(
    explicit: Option<Coordinate>,
    env_value: Option<String>,
    config: &Config,
) -> Result<Box<dyn LocationProvider>, LocationError> {
    // 1. Explicit --near.
    if let Some(coordinate) = explicit {
        return Ok(Box::new(FixedLocation(coordinate)));
    }

    // 2. CURBSIDE_LOCATION.
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        let coordinate = parse_coordinate(value.trim(), LOCATION_ENV)?;
        return Ok(Box::new(FixedLocation(coordinate)));
    }

    // 3. locate-command.
    if let Some(command) = config
        .locate_command
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        return Ok(Box::new(CommandLocation::new(command)));
    }

    // 4. location.
    if let Some(value) = config.location.as_deref() {
        let coordinate = parse_coordinate(value, "config location")?;
        return Ok(Box::new(FixedLocation(coordinate)));
    }

    Ok(Box::new(NoLocation))
}

/// Asks `provider` for a coordinate, giving up after `limit`.
pub async fn locate_within(
    provider: &dyn LocationProvider,
    limit: Duration,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(limit, provider.current_coordinate()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout(limit)),
    }
}

fn parse_coordinate(value: &str, origin: &str) -> Result<Coordinate, LocationError> {
    value.parse().map_err(|reason| LocationError::Parse {
        origin: origin.to_string(),
        reason,
    })
}
