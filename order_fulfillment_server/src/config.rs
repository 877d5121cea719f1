use std::{env, time::Duration};

use log::*;
use ofg_common::Secret;

const DEFAULT_OFS_HOST: &str = "127.0.0.1";
const DEFAULT_OFS_PORT: u16 = 8360;
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub notifications: NotificationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OFS_HOST.to_string(),
            port: DEFAULT_OFS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            gateway: GatewayConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OFS_HOST").ok().unwrap_or_else(|| DEFAULT_OFS_HOST.into());
        let port = env::var("OFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OFS_PORT. {e} Using the default, {DEFAULT_OFS_PORT}, instead."
                    );
                    DEFAULT_OFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OFS_PORT);
        let database_url = env::var("OFS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ OFS_DATABASE_URL is not set. Please set it to the URL for the fulfillment database.");
            String::default()
        });
        let auth = AuthConfig::from_env_or_default();
        let gateway = GatewayConfig::from_env_or_default();
        let notifications = NotificationConfig::from_env_or_default();
        Self { host, port, database_url, auth, gateway, notifications }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
/// Verification side of the externally-minted bearer ID tokens. The server never issues tokens; it only checks them
/// against this key.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub verification_key: Secret<String>,
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let verification_key = env::var("OFS_AUTH_VERIFICATION_KEY").ok().unwrap_or_else(|| {
            warn!(
                "🪛️ OFS_AUTH_VERIFICATION_KEY is not set. Every bearer token will be rejected, so no seller \
                 operations will be possible."
            );
            String::default()
        });
        Self { verification_key: Secret::new(verification_key) }
    }
}

//-------------------------------------------------  GatewayConfig  ---------------------------------------------------
/// The payment gateway's shared HMAC secret. An empty secret makes signature verification fail closed.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    pub secret: Secret<String>,
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let secret = env::var("OFS_GATEWAY_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ OFS_GATEWAY_SECRET is not set. Payment confirmations cannot be verified and will all be \
                 rejected."
            );
            String::default()
        });
        Self { secret: Secret::new(secret) }
    }
}

//-------------------------------------------------  NotificationConfig  ----------------------------------------------
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// Base URL of the application that hosts the notification endpoints.
    pub base_url: String,
    /// Bound on every outbound notification request, so a slow transport cannot pin request-handling resources.
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_APP_BASE_URL.to_string(), timeout: DEFAULT_NOTIFICATION_TIMEOUT }
    }
}

impl NotificationConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = env::var("OFS_APP_BASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ OFS_APP_BASE_URL is not set. Using the default, {DEFAULT_APP_BASE_URL}.");
            DEFAULT_APP_BASE_URL.to_string()
        });
        let timeout = env::var("OFS_NOTIFICATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for OFS_NOTIFICATION_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT);
        Self { base_url, timeout }
    }
}
