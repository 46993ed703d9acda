//! Handing a destination to an external navigation app.

use std::io;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::coord::LatLng;

/// URI understood by Google Maps turn-by-turn navigation.
pub const DEFAULT_URI_TEMPLATE: &str = "google.navigation:q={lat},{lng}";

/// Program used to open the navigation URI.
pub const DEFAULT_NAVIGATOR_COMMAND: &str = "xdg-open";

/// Where the user wants to go.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub name: String,
    pub position: LatLng,
}

impl Destination {
    pub fn new(name: impl Into<String>, position: LatLng) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Errors handing off to the navigator.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("no navigation app available: {0}")]
    NavigatorUnavailable(String),

    #[error("failed to launch navigation: {0}")]
    LaunchFailed(String),
}

/// Starts turn-by-turn navigation somewhere else.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &Destination) -> Result<(), HandoffError>;
}

/// Fills `{lat}`, `{lng}` and `{name}` in a URI template.
pub fn render_uri(template: &str, destination: &Destination) -> String {
    template
        .replace("{lat}", &destination.position.latitude.to_string())
        .replace("{lng}", &destination.position.longitude.to_string())
        .replace("{name}", &destination.name.replace(' ', "+"))
}

/// Launches an external program with the rendered URI as its argument.
///
/// The program is started and left running; its exit status is not awaited.
#[derive(Debug, Clone)]
pub struct CommandNavigator {
    program: String,
    uri_template: String,
}

impl Default for CommandNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_NAVIGATOR_COMMAND, DEFAULT_URI_TEMPLATE)
    }
}

impl CommandNavigator {
    pub fn new(program: impl Into<String>, uri_template: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            uri_template: uri_template.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn uri_for(&self, destination: &Destination) -> String {
        render_uri(&self.uri_template, destination)
    }
}

impl Navigator for CommandNavigator {
    fn navigate(&self, destination: &Destination) -> Result<(), HandoffError> {
        if self.program.trim().is_empty() {
            return Err(HandoffError::NavigatorUnavailable(
                "no navigator command configured".to_string(),
            ));
        }

        let uri = self.uri_for(destination);
        debug!(program = %self.program, uri = %uri, "Launching navigator");

        Command::new(&self.program)
            .arg(&uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => HandoffError::NavigatorUnavailable(format!(
                    "'{}' not found",
                    self.program
                )),
                _ => HandoffError::LaunchFailed(format!("{}: {}", self.program, e)),
            })?;

        info!(destination = %destination.name, uri = %uri, "Navigation handed off");
        Ok(())
    }
}
