use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
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

/// Where content rows live: the hosted backend or JSON files on disk.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Remote,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,
    /// Public (anon) API key sent with every request
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Remote,
            url: String::new(),
            anon_key: String::new(),
            data_dir: default_data_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Only used in file mode; uploads are served from `/uploads`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            max_upload_bytes: default_max_upload_bytes(),
            upload_dir: default_upload_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Remote,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub provider: AuthProvider,
    #[serde(default)]
    pub admin_email: String,
    /// Argon2 PHC string, e.g. `$argon2id$v=19$...`
    #[serde(default)]
    pub admin_password_hash: String,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: AuthProvider::Remote,
            admin_email: String::new(),
            admin_password_hash: String::new(),
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_static_dir() -> String { "frontend".into() }
fn default_data_dir() -> String { "data/content".into() }
fn default_timeout() -> u64 { 10 }
fn default_bucket() -> String { "ib_images".into() }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }
fn default_upload_dir() -> String { "data/uploads".into() }
fn default_token_ttl_hours() -> i64 { 12 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), fall back to defaults when the file
    /// is missing, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::normalize_and_validate`] with an explicit variable lookup.
    pub fn normalize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.normalize(&lookup)?;
        self.backend.normalize_from_env(&lookup);
        self.auth.normalize_from_env(&lookup);
        self.backend.validate()?;
        self.storage.validate()?;
        self.auth.validate(self.backend.mode)?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn fill_if_blank<F>(slot: &mut String, key: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if slot.trim().is_empty() {
        if let Some(v) = lookup(key) {
            *slot = v;
        }
    }
}

impl ServerConfig {
    fn normalize<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = port
                .parse::<u16>()
                .map_err(|_| anyhow!("SERVER_PORT must be a port number, got {port:?}"))?;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl BackendConfig {
    pub fn normalize_from_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_if_blank(&mut self.url, "SUPABASE_URL", lookup);
        fill_if_blank(&mut self.anon_key, "SUPABASE_ANON_KEY", lookup);
        let trimmed = self.url.trim().trim_end_matches('/').to_string();
        self.url = trimmed;
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("backend.timeout_secs must be a positive number of seconds"));
        }
        match self.mode {
            BackendMode::Remote => {
                if self.url.is_empty() {
                    return Err(anyhow!("backend.url is empty; set it in config.toml or SUPABASE_URL"));
                }
                let lower = self.url.to_lowercase();
                if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                    return Err(anyhow!("backend.url must start with http:// or https://"));
                }
                if self.anon_key.trim().is_empty() {
                    return Err(anyhow!("backend.anon_key is empty; set it in config.toml or SUPABASE_ANON_KEY"));
                }
            }
            BackendMode::File => {
                if self.data_dir.trim().is_empty() {
                    return Err(anyhow!("backend.data_dir is required in file mode"));
                }
            }
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket must not be empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("storage.max_upload_bytes must be > 0"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_if_blank(&mut self.admin_email, "ADMIN_EMAIL", lookup);
        fill_if_blank(&mut self.admin_password_hash, "ADMIN_PASSWORD_HASH", lookup);
        fill_if_blank(&mut self.jwt_secret, "JWT_SECRET", lookup);
    }

    pub fn validate(&self, backend: BackendMode) -> Result<()> {
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be > 0"));
        }
        match self.provider {
            AuthProvider::Remote => {
                if backend == BackendMode::File {
                    return Err(anyhow!("auth.provider = \"remote\" requires backend.mode = \"remote\""));
                }
            }
            AuthProvider::Local => {
                if !self.admin_email.contains('@') {
                    return Err(anyhow!("auth.admin_email must be an email address"));
                }
                if !self.admin_password_hash.starts_with("$argon2") {
                    return Err(anyhow!("auth.admin_password_hash must be an argon2 PHC string"));
                }
                if self.jwt_secret.len() < 16 {
                    return Err(anyhow!("auth.jwt_secret must be at least 16 characters"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_full_file() -> Result<()> {
        let mut cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            static_dir = "dist"

            [backend]
            url = "https://demo.supabase.co/"
            anon_key = "anon"
            timeout_secs = 5

            [storage]
            bucket = "images"

            [auth]
            provider = "remote"
            "#,
        )?;
        cfg.normalize_with(env(&[]))?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.static_dir, "dist");
        assert_eq!(cfg.backend.url, "https://demo.supabase.co");
        assert_eq!(cfg.storage.bucket, "images");
        assert_eq!(cfg.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.server.worker_threads, Some(4));
        Ok(())
    }

    #[test]
    fn server_section_may_set_only_static_dir() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            static_dir = "dist"
            "#,
        )?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.static_dir, "dist");
        Ok(())
    }

    #[test]
    fn env_fills_missing_backend_credentials() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.normalize_with(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "k"),
            ("SERVER_PORT", "8181"),
        ]))?;
        assert_eq!(cfg.backend.url, "https://abc.supabase.co");
        assert_eq!(cfg.backend.anon_key, "k");
        assert_eq!(cfg.server.port, 8181);
        Ok(())
    }

    #[test]
    fn remote_mode_requires_url() {
        let mut cfg = AppConfig::default();
        let err = cfg.normalize_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }

    #[test]
    fn file_mode_with_local_auth_validates() -> Result<()> {
        let mut cfg = load_from_str(
            r#"
            [backend]
            mode = "file"

            [auth]
            provider = "local"
            admin_email = "admin@hls-engineering.de"
            admin_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$aGFzaA"
            jwt_secret = "0123456789abcdef0123"
            "#,
        )?;
        cfg.normalize_with(env(&[]))?;
        assert_eq!(cfg.backend.mode, BackendMode::File);
        assert_eq!(cfg.auth.provider, AuthProvider::Local);
        Ok(())
    }

    #[test]
    fn remote_auth_rejected_in_file_mode() {
        let mut cfg = load_from_str("[backend]\nmode = \"file\"\n").unwrap();
        let err = cfg.normalize_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("auth.provider"));
    }

    #[test]
    fn local_auth_requires_secret() {
        let mut cfg = load_from_str(
            "[backend]\nmode = \"file\"\n[auth]\nprovider = \"local\"\nadmin_email = \"a@b.de\"\nadmin_password_hash = \"$argon2id$x\"\njwt_secret = \"short\"\n",
        )
        .unwrap();
        let err = cfg.normalize_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }
}
