use anyhow::{Context, Result};
use serde_json::Value;
use std::process::ExitCode;
use tally_api::{ApiError, Client};
use tally_auth::{LoginEmailStore, SessionState, Settings};

use crate::cli::Cli;
use crate::commands::execute_command;
use crate::credentials::{self, Terminal};

pub struct App {
    cli: Cli,
    settings: Settings,
    email_store: LoginEmailStore,
    client: Client,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let settings = match &cli.config {
            Some(path) => Settings::from_path(&path.to_string_lossy()),
            None => Settings::new(),
        }
        .context("Failed to load settings")?;

        Self::with_parts(cli, settings, LoginEmailStore::new()?)
    }

    pub fn with_parts(cli: Cli, settings: Settings, email_store: LoginEmailStore) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
        let client = Client::new(&settings)?;

        Ok(Self {
            cli,
            settings,
            email_store,
            client,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Run the command and print its result, reporting failures on stderr
    pub async fn run(&self) -> ExitCode {
        match self.execute().await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to format output: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(err) => {
                match self.session_expired_notice(&err) {
                    Some(notice) => eprintln!("{}", notice),
                    None => eprintln!("Error: {:#}", err),
                }
                ExitCode::FAILURE
            }
        }
    }

    /// Log in, run the command, log out
    pub async fn execute(&self) -> Result<Value> {
        if self.cli.forget {
            self.email_store.forget()?;
            tracing::info!("Forgot remembered login email");
        }

        let credentials =
            credentials::resolve(&self.settings, &self.email_store, &mut Terminal)?;
        self.client.login(&credentials).await?;

        if self.cli.remember {
            self.email_store.remember(&credentials.email)?;
        }

        tracing::info!(command = ?self.cli.command, "Executing command");
        let result = execute_command(&self.client, self.cli.store, &self.cli.command).await;

        if self.client.session().has_token() {
            if let Err(e) = self.client.logout().await {
                tracing::warn!(error = %e, "Logout failed");
            }
        }

        result
    }

    /// Message sending the user back to log in, if `err` ended the session
    pub fn session_expired_notice(&self, err: &anyhow::Error) -> Option<String> {
        let expired = err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_session_expired);

        match self.client.session().state() {
            SessionState::Expired { login_path } => Some(format!(
                "Your session has expired. Please log in again ({}).",
                login_path
            )),
            _ if expired => Some("Your session has expired. Please log in again.".to_string()),
            _ => None,
        }
    }
}
