use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::{ClientError, Result};

#[derive(Debug)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub cookie_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_secs: u64 = try_load(&var, "VOTEIO_POLL_SECS", "5")?;
        if poll_secs == 0 {
            return Err(ClientError::Invalid("VOTEIO_POLL_SECS must be positive".into()));
        }

        Ok(Self {
            api_url: try_load(&var, "VOTEIO_API_URL", "http://localhost:5045")?,
            poll_interval: Duration::from_secs(poll_secs),
            cookie_path: try_load(&var, "VOTEIO_COOKIE_PATH", ".voteio/cookies.json")?,
        })
    }
}

fn try_load<T: FromStr>(var: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            ClientError::Invalid(format!("invalid {key}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:5045");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.cookie_path, PathBuf::from(".voteio/cookies.json"));
    }

    #[test]
    fn overrides_and_rejects_bad_intervals() {
        let config = load(&[
            ("VOTEIO_API_URL", "http://148.113.172.140:8080"),
            ("VOTEIO_POLL_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://148.113.172.140:8080");
        assert_eq!(config.poll_interval, Duration::from_secs(30));

        assert!(matches!(
            load(&[("VOTEIO_POLL_SECS", "0")]),
            Err(ClientError::Invalid(_))
        ));
        assert!(load(&[("VOTEIO_POLL_SECS", "soon")]).is_err());
    }
}
