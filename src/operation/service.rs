//! Service operation

use crate::config::ServiceConfig;
use anyhow::Result;
use declarative::service::DEFAULT_STATUS_ARGUMENT;
use declarative::{
    CommandTemplate, HostSession, Operation, Outcome, PlanContext, ServiceIntent, ServiceManager,
};

/// The desired state of one service
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub template: CommandTemplate,
    pub intent: ServiceIntent,
}

impl Service {
    /// An explicit template wins over the init system; systemd otherwise
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let (template, status_argument) = match &config.template {
            Some(template) => (CommandTemplate::parse(template)?, DEFAULT_STATUS_ARGUMENT),
            None => {
                let init = config.init.unwrap_or(ServiceManager::Systemd);
                (init.template(), init.status_argument())
            }
        };

        let mut intent = ServiceIntent::default()
            .restarted(config.restarted)
            .reloaded(config.reloaded)
            .status_argument(config.status_argument.as_deref().unwrap_or(status_argument));
        intent.running = config.running;
        intent.command.clone_from(&config.command);

        Ok(Self {
            name: config.name.clone(),
            template,
            intent,
        })
    }
}

impl Operation for Service {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        let mut actions = Vec::new();
        match self.intent.running {
            Some(true) => actions.push("running"),
            Some(false) => actions.push("stopped"),
            None => {}
        }
        if self.intent.restarted {
            actions.push("restarted");
        }
        if self.intent.reloaded {
            actions.push("reloaded");
        }
        if actions.is_empty() {
            format!("Control {}", self.name)
        } else {
            format!("Ensure {} {}", self.name, actions.join(", "))
        }
    }

    fn operation_type(&self) -> &'static str {
        "service"
    }

    fn reconcile(
        &self,
        session: &mut HostSession,
        _ctx: &PlanContext,
    ) -> declarative::Result<Outcome> {
        Ok(session.control_service(&self.name, &self.template, &self.intent))
    }
}
