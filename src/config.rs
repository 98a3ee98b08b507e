use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Process configuration. Everything the original kept as literals — the
/// signing secret, the bootstrap admin, upload locations — is explicit
/// here and loadable from a TOML file with env-var overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Socket address the HTTP server binds.
    pub listen_addr: String,
    /// Root directory for the database and uploads tree.
    pub data_dir: String,
    /// Uploads root; defaults to `{data_dir}/uploads`.
    pub upload_dir: Option<String>,
    /// SQLite file; defaults to `{data_dir}/reelroom.db`.
    pub database_path: Option<String>,
    /// Base URL used when rewriting asset paths. When unset, the request's
    /// Host header is used.
    pub public_url: Option<String>,
    /// HS256 signing secret for admin tokens.
    pub jwt_secret: Option<String>,
    pub bootstrap_admin: BootstrapAdmin,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub username: String,
    /// When unset, a random password is generated and logged once at
    /// first startup.
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            data_dir: "~/.local/share/reelroom".to_string(),
            upload_dir: None,
            database_path: None,
            public_url: None,
            jwt_secret: None,
            bootstrap_admin: BootstrapAdmin::default(),
        }
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, or the platform config dir when none is
    /// given. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::from_env(Self::default())),
            },
        };
        let config = if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        Ok(Self::from_env(config))
    }

    fn from_env(mut config: Self) -> Self {
        if let Ok(secret) = std::env::var("REELROOM_SECRET") {
            if !secret.is_empty() {
                config.jwt_secret = Some(secret);
            }
        }
        if let Ok(addr) = std::env::var("REELROOM_LISTEN_ADDR") {
            if !addr.is_empty() {
                config.listen_addr = addr;
            }
        }
        if let Ok(dir) = std::env::var("REELROOM_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = dir;
            }
        }
        config
    }

    pub fn data_dir(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn upload_dir(&self) -> PathBuf {
        match &self.upload_dir {
            Some(dir) => expand(dir),
            None => self.data_dir().join("uploads"),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => expand(path),
            None => self.data_dir().join("reelroom.db"),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "reelroom")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.bootstrap_admin.username, "admin");
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn toml_fields_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
listen_addr = "127.0.0.1:8080"
data_dir = "/tmp/reelroom-test"
jwt_secret = "from-file"

[bootstrap_admin]
username = "root"
password = "laksh"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.jwt_secret.as_deref(), Some("from-file"));
        assert_eq!(config.bootstrap_admin.username, "root");
        assert_eq!(config.database_path(), Path::new("/tmp/reelroom-test/reelroom.db"));
        assert_eq!(config.upload_dir(), Path::new("/tmp/reelroom-test/uploads"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listne_addr = \"oops\"").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
