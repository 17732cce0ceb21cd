//! Service-state reconciliation
//!
//! A small state machine over `Unknown`, `Stopped` and `Running`. When the
//! status is unknown the probe and the branch are emitted as one shell
//! conditional, so checking and acting happen in a single round-trip on the
//! host. Once a status is known for the run, each action becomes its own
//! command.

use crate::error::{Error, Result};
use crate::snapshot::{ServiceStatus, ServiceStatuses};
use crate::types::{Observation, Outcome};
use serde::{Deserialize, Serialize};

const NAME_PLACEHOLDER: &str = "{name}";
const ACTION_PLACEHOLDER: &str = "{action}";

/// Renders `(service, action)` into a command, e.g. `systemctl {action} {name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandTemplate(String);

impl CommandTemplate {
    /// Parse a template; it must contain both `{name}` and `{action}`
    pub fn parse(template: &str) -> Result<Self> {
        for placeholder in [NAME_PLACEHOLDER, ACTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(Error::InvalidTemplate {
                    template: template.to_string(),
                    message: format!("missing {placeholder} placeholder"),
                });
            }
        }
        Ok(Self(template.to_string()))
    }

    /// Render the command for one action
    pub fn render(&self, name: &str, action: &str) -> String {
        self.0
            .replace(NAME_PLACEHOLDER, name)
            .replace(ACTION_PLACEHOLDER, action)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommandTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CommandTemplate> for String {
    fn from(template: CommandTemplate) -> Self {
        template.0
    }
}

/// Init systems with known command shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceManager {
    Systemd,
    SysVinit,
    OpenRc,
    Upstart,
    BsdInit,
}

impl ServiceManager {
    pub fn template(self) -> CommandTemplate {
        let template = match self {
            Self::Systemd => "systemctl {action} {name}",
            Self::SysVinit => "/etc/init.d/{name} {action}",
            Self::OpenRc => "rc-service {name} {action}",
            Self::Upstart => "initctl {action} {name}",
            Self::BsdInit => "/etc/rc.d/{name} {action}",
        };
        CommandTemplate(template.to_string())
    }

    /// Verb that exits zero when the service is running
    pub fn status_argument(self) -> &'static str {
        match self {
            Self::Systemd => "is-active",
            _ => DEFAULT_STATUS_ARGUMENT,
        }
    }
}

/// Default probe verb
pub const DEFAULT_STATUS_ARGUMENT: &str = "status";

/// What the operator wants from one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIntent {
    /// Desired running state; `None` leaves it alone
    pub running: Option<bool>,
    pub restarted: bool,
    pub reloaded: bool,
    /// Extra action run through the template regardless of state
    pub command: Option<String>,
    pub status_argument: String,
}

impl Default for ServiceIntent {
    fn default() -> Self {
        Self {
            running: None,
            restarted: false,
            reloaded: false,
            command: None,
            status_argument: DEFAULT_STATUS_ARGUMENT.to_string(),
        }
    }
}

impl ServiceIntent {
    pub fn running(mut self, running: bool) -> Self {
        self.running = Some(running);
        self
    }

    pub fn restarted(mut self, restarted: bool) -> Self {
        self.restarted = restarted;
        self
    }

    pub fn reloaded(mut self, reloaded: bool) -> Self {
        self.reloaded = reloaded;
        self
    }

    pub fn command(mut self, command: &str) -> Self {
        self.command = Some(command.to_string());
        self
    }

    pub fn status_argument(mut self, status_argument: &str) -> Self {
        self.status_argument = status_argument.to_string();
        self
    }
}

/// Compute the commands that move service `name` to `intent`
///
/// `statuses` is updated with the status the emitted commands leave behind.
pub fn control_service(
    name: &str,
    statuses: &mut ServiceStatuses,
    template: &CommandTemplate,
    intent: &ServiceIntent,
) -> Outcome {
    let mut outcome = Outcome::new();
    let status = statuses.get(name);

    match status {
        ServiceStatus::Unknown => {
            let action = |requested: bool, verb: &str| {
                if requested {
                    template.render(name, verb)
                } else {
                    "true".to_string()
                }
            };
            outcome.push_command(format!(
                "if ({status}); then ({stop}); ({restart}); ({reload}); else ({start}); fi",
                status = template.render(name, &intent.status_argument),
                stop = action(intent.running == Some(false), "stop"),
                restart = action(intent.restarted, "restart"),
                reload = action(intent.reloaded, "reload"),
                start = action(intent.running == Some(true), "start"),
            ));
            statuses.set(name, intent.running);
        }
        ServiceStatus::Stopped | ServiceStatus::Running => {
            let was_running = status.is_running();

            match (intent.running, was_running) {
                (Some(false), true) => {
                    outcome.push_command(template.render(name, "stop"));
                    statuses.set(name, Some(false));
                }
                (Some(false), false) => outcome.observe(Observation::ServiceStopped {
                    name: name.to_string(),
                }),
                (Some(true), false) => {
                    outcome.push_command(template.render(name, "start"));
                    statuses.set(name, Some(true));
                }
                (Some(true), true) => outcome.observe(Observation::ServiceRunning {
                    name: name.to_string(),
                }),
                (None, _) => {}
            }

            // Restart and reload only apply to a service that was already up
            if intent.restarted && was_running {
                outcome.push_command(template.render(name, "restart"));
            }
            if intent.reloaded && was_running {
                outcome.push_command(template.render(name, "reload"));
            }
        }
    }

    if let Some(command) = &intent.command {
        outcome.push_command(template.render(name, command));
    }

    log::debug!(
        "service {name}: {status:?} -> {:?}, {} command(s)",
        statuses.get(name),
        outcome.commands.len()
    );
    outcome
}
