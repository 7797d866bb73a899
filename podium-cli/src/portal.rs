//! Authenticated connection to the portal for one CLI invocation
//!
//! Credentials are never stored: every run logs in, resolves the session,
//! and logs out again when the command is done.

use crate::config::Config;
use anyhow::{bail, Result};
use dialoguer::{Input, Password};
use podium_core::{
    route, Dashboard, DeploymentOrchestrator, HttpApiClient, RouteDecision, Session,
    SessionResolver, VmLifecycleController, View,
};
use std::time::Duration;
use tracing::debug;

pub const PASSWORD_ENV: &str = "PODIUM_PASSWORD";

pub struct Portal {
    pub api: HttpApiClient,
    pub session: Session,
    pub username: String,
    orchestrator: DeploymentOrchestrator,
    lifecycle: VmLifecycleController,
}

impl Portal {
    pub async fn connect(config: &Config, server: &str, username: Option<String>) -> Result<Self> {
        let api = HttpApiClient::new(server, Duration::from_secs(config.timeout_secs))?;

        let username = match username.or_else(|| config.username.clone()) {
            Some(name) => name,
            None => Input::<String>::new()
                .with_prompt("Username")
                .interact_text()?,
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => Password::new().with_prompt("Password").interact()?,
        };

        let resolver = SessionResolver::new(&api);
        resolver.login(&username, &password).await?;
        let session = resolver.resolve().await;
        debug!(server = api.base_url(), state = ?session.state, "Connected");

        Ok(Self {
            api,
            session,
            username,
            orchestrator: DeploymentOrchestrator::new(config.delete_policy),
            lifecycle: VmLifecycleController::new(config.batch_policy),
        })
    }

    /// The view this session may see when asking for `requested`
    pub fn authorize(&self, requested: View) -> Result<View> {
        match route(requested, self.session.state) {
            RouteDecision::Render(view) => Ok(view),
            RouteDecision::RedirectTo(View::Login) | RouteDecision::Placeholder => {
                bail!("Access denied: the {} view is not available to {}", requested, self.username)
            }
            RouteDecision::RedirectTo(view) => Ok(view),
        }
    }

    /// The view this session lands on by default
    pub fn home(&self) -> Result<View> {
        self.authorize(View::User)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.orchestrator.clone(), self.lifecycle.clone())
    }

    pub async fn close(mut self) {
        SessionResolver::new(&self.api)
            .logout(&mut self.session)
            .await;
    }
}

/// Human-readable routing decision
pub fn describe(decision: RouteDecision) -> String {
    match decision {
        RouteDecision::Placeholder => "pending".to_string(),
        RouteDecision::Render(view) => format!("render {}", view),
        RouteDecision::RedirectTo(view) => format!("redirect to {}", view),
    }
}
