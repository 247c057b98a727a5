use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/speedfest.db?mode=rwc";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_static_dir() -> String { "frontend".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_auto_migrate() -> bool { true }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: default_auto_migrate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// `LOG_FORMAT=json` wins over the file setting.
    pub fn with_env_override(self) -> Self {
        match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => Self { format: LogFormat::Json },
            Some("compact") => Self { format: LogFormat::Compact },
            _ => self,
        }
    }
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise environment variables only.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// Only a missing file falls back to the environment; a file that fails
    /// to parse or validate is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => parse(&content).map_err(|e| anyhow!("{path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig {
                server: ServerConfig::from_env(),
                database: DatabaseConfig::from_env(),
                logging: LoggingConfig::default(),
            },
            Err(e) => return Err(anyhow!("cannot read {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.logging = self.logging.clone().with_env_override();
        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.worker_threads = Some(w);
        }
        cfg
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.static_dir.trim().is_empty() {
            self.static_dir = default_static_dir();
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.normalize_from_env();
        cfg
    }

    /// Fill the URL from `DATABASE_URL`, then from the built-in default.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            self.url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            static_dir = "ui/build"

            [database]
            url = "postgres://racing:pw@localhost/speedfest"
            max_connections = 20
            auto_migrate = false

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.static_dir, "ui/build");
        assert_eq!(cfg.database.max_connections, 20);
        assert_eq!(cfg.database.min_connections, 1);
        assert!(!cfg.database.auto_migrate);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(cfg.database.validate().is_ok());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.static_dir, "frontend");
        assert!(cfg.database.auto_migrate);
        assert_eq!(cfg.logging.format, LogFormat::Compact);
    }

    #[test]
    fn sqlite_urls_are_accepted() {
        let cfg = DatabaseConfig { url: DEFAULT_DATABASE_URL.into(), ..Default::default() };
        assert!(cfg.is_sqlite());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_scheme_and_bad_pool() {
        let cfg = DatabaseConfig { url: "mysql://localhost/db".into(), ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), min_connections: 0, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), min_connections: 5, max_connections: 2, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), acquire_timeout_secs: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    fn write_temp_config(tag: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("speedfest-config-{}-{tag}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        for (tag, content) in [
            ("scheme", "[database]\nurl = \"mysql://prod/db\"\n"),
            ("port", "[server]\nport = 0\n"),
            ("syntax", "[server\nport = 8080\n"),
        ] {
            let path = write_temp_config(tag, content);
            let res = AppConfig::load_or_env_from(path.to_str().unwrap());
            std::fs::remove_file(&path).unwrap();
            assert!(res.is_err(), "{tag} should be rejected");
        }
    }

    #[test]
    fn valid_config_file_is_used() {
        let path = write_temp_config("valid", "[database]\nurl = \"sqlite::memory:\"\n[server]\nport = 9100\n");
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.server.port, 9100);
    }

    #[test]
    fn missing_config_file_falls_back_to_env() {
        let missing = std::env::temp_dir().join(format!("speedfest-absent-{}.toml", std::process::id()));
        let cfg = AppConfig::load_or_env_from(missing.to_str().unwrap()).unwrap();
        assert!(!cfg.database.url.is_empty());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut server = ServerConfig { port: 0, ..Default::default() };
        assert!(server.normalize().is_err());
    }

    #[test]
    fn worker_threads_and_host_are_normalized() {
        let mut server = ServerConfig { host: " ".into(), worker_threads: Some(0), ..Default::default() };
        server.normalize().unwrap();
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.worker_threads, Some(4));
    }
}
