use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";
pub const UPSTREAM_ENV: &str = "QUIZFORGE_UPSTREAM_URL";
pub const BIND_ENV: &str = "QUIZFORGE_BIND";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP服务监听地址
    pub bind: String,
    /// 工作台闲置多久后被清除
    pub session_ttl_secs: u64,
    /// 上传的PDF大小上限
    pub max_upload_bytes: usize,
    pub upstream: UpstreamConfig,
}

/// 出题服务，对应前端开发时的rewrite规则
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub generate_path: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1:8081".to_string(),
            session_ttl_secs: 60 * 60,
            max_upload_bytes: 10 * 1024 * 1024,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "http://localhost:5000".to_string(),
            generate_path: "/generate-questions".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// 读取配置文件，文件不存在时使用默认值，随后应用环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            Config::parse(&contents)?
        } else {
            log::info!("配置文件{}不存在，使用默认配置", path.display());
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(UPSTREAM_ENV) {
            self.upstream.base_url = url;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind = bind;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upstream.endpoint()?;
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid("session_ttl_secs"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes"));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl UpstreamConfig {
    /// 拼接出题接口地址，保留base_url中已有的路径前缀
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.generate_path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|source| ConfigError::InvalidUpstream { url: joined, source })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.upstream.endpoint().unwrap().as_str(),
            "http://localhost:5000/generate-questions"
        );
    }

    #[test]
    fn partial_upstream_section() {
        let config = Config::parse(
            r#"
            bind = "0.0.0.0:9000"

            [upstream]
            base_url = "https://soal.example.com/api/"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.upstream.timeout_secs, 120);
        assert_eq!(
            config.upstream.endpoint().unwrap().as_str(),
            "https://soal.example.com/api/generate-questions"
        );
    }

    #[test]
    fn env_overrides_upstream() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            UPSTREAM_ENV => Some("http://10.0.0.2:5000".to_string()),
            _ => None,
        });
        assert_eq!(config.upstream.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.bind, Config::default().bind);
    }

    #[test]
    fn rejects_invalid_upstream() {
        let mut config = Config::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUpstream { .. })));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(Config::parse("bind = "), Err(ConfigError::Parse(_))));
    }
}
