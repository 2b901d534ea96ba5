// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth token lifecycle for a single run.
//!
//! The token is obtained at most once per run and then reused. A token
//! supplied through configuration is used as-is.

use crate::config::Config;
use crate::error::AppError;
use crate::services::rwgps::RwgpsClient;

/// Placeholder token handed out in dry-run mode.
pub const DRY_RUN_TOKEN: &str = "DRY_RUN_TOKEN";

pub struct AuthSession {
    client: RwgpsClient,
    email: Option<String>,
    password: Option<String>,
    token: Option<String>,
    dry_run: bool,
}

impl AuthSession {
    pub fn new(
        client: RwgpsClient,
        email: Option<String>,
        password: Option<String>,
        token: Option<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            email,
            password,
            token: token.filter(|t| !t.is_empty()),
            dry_run,
        }
    }

    pub fn from_config(client: RwgpsClient, config: &Config) -> Self {
        Self::new(
            client,
            config.email.clone(),
            config.password.clone(),
            config.auth_token.clone(),
            config.dry_run,
        )
    }

    /// Return the session token, authenticating first if none is held yet.
    pub async fn ensure_authenticated(&mut self) -> Result<&str, AppError> {
        if self.token.is_none() {
            let token = self.obtain_token().await?;
            self.token = Some(token);
        }
        Ok(self.token.as_deref().unwrap_or_default())
    }

    /// Token currently held, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn obtain_token(&self) -> Result<String, AppError> {
        let (Some(email), Some(password)) = (self.email.as_deref(), self.password.as_deref())
        else {
            return Err(AppError::Configuration(
                "RWGPS_EMAIL and RWGPS_PASSWORD are required when RWGPS_AUTH_TOKEN is not set"
                    .to_string(),
            ));
        };

        if self.dry_run {
            tracing::info!(email, "[DRY-RUN] Would authenticate");
            return Ok(DRY_RUN_TOKEN.to_string());
        }

        tracing::info!(email, "Authenticating with RideWithGPS");
        let token = self.client.authenticate(email, password).await?;
        tracing::info!("Authenticated");
        Ok(token)
    }
}
