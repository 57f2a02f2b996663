//! Configuration for the completion endpoint

use std::fmt;
use std::path::Path;
use std::time::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str
  = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_MODEL: &str = "meta/llama-3.3-70b-instruct";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const API_KEY_ENV: &str = "PROMPTOPT_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "NVIDIA_API_KEY";
pub const API_BASE_ENV: &str = "PROMPTOPT_API_BASE";
pub const MODEL_ENV: &str = "PROMPTOPT_MODEL";
pub const TIMEOUT_ENV: &str = "PROMPTOPT_TIMEOUT_SECS";

/// Gateway configuration, resolved once at startup
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig
{   /// API base URL, without the /chat/completions suffix
    #[serde(default = "default_api_base")]
    pub api_base: String
  , /// Credential; never serialized
    #[serde(default, skip_serializing)]
    pub api_key: String
  , /// Model identifier
    #[serde(default = "default_model")]
    pub model: String
  , /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
}

fn default_api_base() -> String
{   DEFAULT_API_BASE.to_string()
}

fn default_model() -> String
{   DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64
{   DEFAULT_TIMEOUT_SECS
}

impl GatewayConfig
{   pub fn new(api_key: impl Into<String>) -> Self
    {   GatewayConfig
        {   api_base: default_api_base()
          , api_key: api_key.into()
          , model: default_model()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }

    /// Build from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; lets tests avoid the real env
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
      where F: Fn(&str) -> Option<String>
    {   let api_key = lookup_key(&lookup)?;
        let mut config = GatewayConfig::new(api_key);
        if let Some(base) = non_empty(lookup(API_BASE_ENV))
        {   config.api_base = base;
        }
        if let Some(model) = non_empty(lookup(MODEL_ENV))
        {   config.model = model;
        }
        if let Some(raw) = non_empty(lookup(TIMEOUT_ENV))
        {   config.timeout_secs = raw.trim().parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(
                format!("{} is not a number: {}", TIMEOUT_ENV, raw)
              )
            })?;
        }
        debug!(
          "Loaded config from environment: base={} model={}",
          config.api_base, config.model
        );
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; a missing key is taken from the env
    pub fn from_json_file(path: &Path)
      -> Result<Self, crate::error::Error>
    {   let raw = std::fs::read_to_string(path)?;
        let mut config: GatewayConfig = serde_json::from_str(&raw)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        if config.api_key.trim().is_empty()
        {   config.api_key
              = lookup_key(&|name: &str| std::env::var(name).ok())?;
        }
        debug!("Loaded config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.api_key.trim().is_empty()
        {   return Err(crate::error::Error::MissingApiKey(
              API_KEY_ENV.to_string()
            ));
        }
        if self.api_base.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "api_base must not be empty".to_string()
            ));
        }
        if self.model.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model must not be empty".to_string()
            ));
        }
        if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be > 0".to_string()
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }

    /// Full chat-completion endpoint URL
    pub fn completions_url(&self) -> String
    {   format!(
          "{}/chat/completions",
          self.api_base.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for GatewayConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("GatewayConfig")
          .field("api_base", &self.api_base)
          .field("api_key", &"<redacted>")
          .field("model", &self.model)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String>
{   value.filter(|v| !v.trim().is_empty())
}

fn lookup_key<F>(lookup: &F) -> Result<String, crate::error::Error>
  where F: Fn(&str) -> Option<String>
{   non_empty(lookup(API_KEY_ENV))
      .or_else(|| non_empty(lookup(API_KEY_FALLBACK_ENV)))
      .ok_or_else(|| {
        crate::error::Error::MissingApiKey(format!(
          "set {} or {}",
          API_KEY_ENV, API_KEY_FALLBACK_ENV
        ))
      })
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn env_defaults_apply()
    {   let config = GatewayConfig::from_lookup(
          lookup_from(&[(API_KEY_ENV, "k")])
        ).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn fallback_key_and_overrides()
    {   let config = GatewayConfig::from_lookup(lookup_from(&[
          (API_KEY_FALLBACK_ENV, "nv")
        , (API_BASE_ENV, "http://localhost:8000/v1/")
        , (MODEL_ENV, "local-model")
        , (TIMEOUT_ENV, "5")
        ])).unwrap();
        assert_eq!(config.api_key, "nv");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
          config.completions_url()
        , "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn missing_key_is_an_error()
    {   let err = GatewayConfig::from_lookup(lookup_from(&[
          (API_KEY_ENV, "  ")
        ])).unwrap_err();
        assert!(matches!(err, crate::error::Error::MissingApiKey(_)));
    }

    #[test]
    fn bad_timeout_is_rejected()
    {   let err = GatewayConfig::from_lookup(lookup_from(&[
          (API_KEY_ENV, "k")
        , (TIMEOUT_ENV, "soon")
        ])).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfiguration(_)));

        let err = GatewayConfig::from_lookup(lookup_from(&[
          (API_KEY_ENV, "k")
        , (TIMEOUT_ENV, "0")
        ])).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfiguration(_)));
    }

    #[test]
    fn key_is_redacted_and_not_serialized()
    {   let config = GatewayConfig::new("secret-value");
        assert!(!format!("{:?}", config).contains("secret-value"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-value"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn json_file_with_key()
    {   let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptopt.json");
        std::fs::write(
          &path,
          r#"{"api_key": "file-key", "model": "m", "timeout_secs": 30}"#
        ).unwrap();
        let config = GatewayConfig::from_json_file(&path).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.model, "m");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout_secs, 30);
    }
}
