//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::RouteConfig;

pub const DEFAULT_MQTT_PORT: u16 = 8883;

/// Bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MqttConfig {
    pub url: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive_secs: u64,
    /// Forces TLS on or off. Unset means TLS for `mqtts://`/`ssl://` URLs and port 8883.
    pub tls: Option<bool>,
    pub topics: TopicsConfig,
    pub status_request: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TopicsConfig {
    pub weight: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub poll_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub retry_delay_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            port: DEFAULT_MQTT_PORT,
            username: None,
            password: None,
            client_id: "balanca-bot".to_string(),
            keep_alive_secs: 30,
            tls: None,
            topics: TopicsConfig::default(),
            status_request: "Solicitação de status".to_string(),
        }
    }
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            weight: "balanca/peso".to_string(),
            status: "balanca/status".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            poll_timeout_secs: 30,
            request_timeout_secs: 20,
            retry_delay_secs: 5,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Override fields from `MQTT_URL`, `MQTT_PORT`, `MQTT_USER`, `MQTT_PASS`,
    /// `TELEGRAM_TOKEN` and `CHAT_ID`. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("MQTT_URL") {
            self.mqtt.url = url;
        }
        if let Some(port) = var("MQTT_PORT") {
            self.mqtt.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("MQTT_PORT: {}", port)))?;
        }
        if let Some(user) = var("MQTT_USER") {
            self.mqtt.username = Some(user);
        }
        if let Some(pass) = var("MQTT_PASS") {
            self.mqtt.password = Some(pass);
        }
        if let Some(token) = var("TELEGRAM_TOKEN") {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = var("CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }
        Ok(())
    }

    /// Command-line overrides. Empty values count as unset here too.
    pub fn apply_overrides(&mut self, token: Option<String>, chat_id: Option<String>) {
        if let Some(token) = non_empty(token) {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = non_empty(chat_id) {
            self.telegram.chat_id = Some(chat_id);
        }
    }

    /// Bot token, if one is set to something other than blanks
    pub fn telegram_token(&self) -> Option<String> {
        non_empty(self.telegram.token.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.url.trim().is_empty() {
            return Err(ConfigError::MissingField("mqtt.url (MQTT_URL)".to_string()));
        }
        if self.mqtt.port == 0 {
            return Err(ConfigError::InvalidValue("mqtt.port must be non-zero".to_string()));
        }
        if self.mqtt.topics.weight.is_empty() || self.mqtt.topics.status.is_empty() {
            return Err(ConfigError::MissingField("mqtt.topics".to_string()));
        }
        Ok(())
    }

    /// The slice of configuration the router works from
    pub fn routes(&self) -> RouteConfig {
        RouteConfig {
            chat_id: non_empty(self.telegram.chat_id.clone()),
            weight_topic: self.mqtt.topics.weight.clone(),
            status_topic: self.mqtt.topics.status.clone(),
            status_request: self.mqtt.status_request.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
