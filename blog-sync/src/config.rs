use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Which wire shape the content gateway speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Rest,
    Rpc,
}

impl FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "rpc" => Ok(Self::Rpc),
            other => Err(anyhow::anyhow!(
                "Invalid transport '{other}'. Expected 'rest' or 'rpc'"
            )),
        }
    }
}

/// Whether reads and writes need an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub require_auth_for_reads: bool,
    pub require_auth_for_writes: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            require_auth_for_reads: false,
            require_auth_for_writes: true,
        }
    }
}

/// Client-side limits, mirroring the store's defaults. Lengths are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLimits {
    pub max_title_len: usize,
    pub max_content_len: usize,
    pub max_tags: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_title_len: 250,
            max_content_len: 2000,
            max_tags: 3,
        }
    }
}

const MAX_NOTICE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Origin of the content gateway, e.g. `http://localhost:8080`
    pub api_base_url: String,
    pub transport: Transport,
    pub access: AccessPolicy,
    pub limits: ContentLimits,
    /// How long an error or success notice stays visible
    pub notice_ttl_ms: u64,
    /// Posts requested per page by the REST transport
    pub page_size: usize,
    /// Re-fetch posts after tag registry changes (posts carry tag names)
    pub tag_changes_touch_posts: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            transport: Transport::Rest,
            access: AccessPolicy::default(),
            limits: ContentLimits::default(),
            notice_ttl_ms: 3000,
            page_size: 50,
            tag_changes_touch_posts: true,
        }
    }
}

impl SyncConfig {
    /// Load from the process environment, honouring a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            api_base_url: lookup("BLOG_API_BASE_URL").unwrap_or(defaults.api_base_url),
            transport: match lookup("BLOG_TRANSPORT") {
                Some(raw) => raw.parse()?,
                None => defaults.transport,
            },
            access: AccessPolicy {
                require_auth_for_reads: env_bool(
                    &lookup,
                    "BLOG_REQUIRE_AUTH_FOR_READS",
                    defaults.access.require_auth_for_reads,
                ),
                require_auth_for_writes: env_bool(
                    &lookup,
                    "BLOG_REQUIRE_AUTH_FOR_WRITES",
                    defaults.access.require_auth_for_writes,
                ),
            },
            limits: ContentLimits {
                max_title_len: env_parse(&lookup, "BLOG_MAX_TITLE_LEN", defaults.limits.max_title_len)?,
                max_content_len: env_parse(
                    &lookup,
                    "BLOG_MAX_CONTENT_LEN",
                    defaults.limits.max_content_len,
                )?,
                max_tags: env_parse(&lookup, "BLOG_MAX_TAGS", defaults.limits.max_tags)?,
            },
            notice_ttl_ms: env_parse(&lookup, "BLOG_NOTICE_TTL_MS", defaults.notice_ttl_ms)?,
            page_size: env_parse(&lookup, "BLOG_PAGE_SIZE", defaults.page_size)?,
            tag_changes_touch_posts: env_bool(
                &lookup,
                "BLOG_TAG_CHANGES_TOUCH_POSTS",
                defaults.tag_changes_touch_posts,
            ),
        };
        config.validate()
    }

    /// Load from a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).context("Failed to parse sync config TOML")?;
        config.validate()
    }

    pub fn notice_ttl(&self) -> chrono::Duration {
        // Capped at one day.
        chrono::Duration::milliseconds(self.notice_ttl_ms.min(MAX_NOTICE_TTL_MS) as i64)
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        Ok(self)
    }
}

fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        None => Ok(default),
    }
}

fn env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v != "0" && v.to_lowercase() != "false")
        .unwrap_or(default)
}
