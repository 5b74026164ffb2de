use thiserror::Error;

use crate::types::Channel;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("${0} must be set")]
    Missing(&'static str),
    #[error("${name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for one fetch-render-store run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub channel: Channel,
    pub access_token: String,
    pub base_url: String,
    pub per_page: Option<u32>,
    pub storage_url: String,
}

/// Settings for the feed retrieval server.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub channel: Channel,
    pub api_bind: String,
    pub storage_url: String,
}

impl SyncSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel = Channel::new(required(&lookup, "QIITA_TEAM_NAME")?);
        let access_token = required(&lookup, "QIITA_ACCESS_TOKEN")?;
        let base_url = optional(&lookup, "QIITA_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| channel.base_url());
        let per_page = match optional(&lookup, "FEED_ITEM_NUM") {
            Some(value) => Some(parse_per_page(&value)?),
            None => None,
        };
        let (name, storage_url) = storage_url(&lookup)?;
        // A memory store dies with the worker process.
        if storage_url.starts_with("memory://") {
            return Err(ConfigError::Invalid {
                name,
                value: storage_url,
            });
        }

        Ok(Self {
            channel,
            access_token,
            base_url,
            per_page,
            storage_url,
        })
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel = Channel::new(required(&lookup, "QIITA_TEAM_NAME")?);
        let api_bind = match optional(&lookup, "FEED_API_BIND") {
            Some(bind) => bind,
            None => format!("0.0.0.0:{}", required(&lookup, "PORT")?),
        };
        let (_, storage_url) = storage_url(&lookup)?;

        Ok(Self {
            channel,
            api_bind,
            storage_url,
        })
    }
}

pub fn parse_per_page(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ConfigError::Invalid {
            name: "FEED_ITEM_NUM",
            value: value.to_string(),
        }),
    }
}

// Returns the variable the url was read from along with the url.
fn storage_url<F>(lookup: &F) -> Result<(&'static str, String), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    ["STORAGE_URL", "REDIS_URL"]
        .into_iter()
        .find_map(|name| optional(lookup, name).map(|url| (name, url)))
        .ok_or(ConfigError::Missing("STORAGE_URL"))
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

// Empty values count as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}
