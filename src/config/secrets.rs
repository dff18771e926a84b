//! Secret file source
//!
//! Secrets are read from one file each, by default under `/run/secrets`.
//! The path of every secret can be changed with a `<NAME>_SECRETFILE`
//! environment variable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::config::defaults::{SECRETS_DIR, SECRET_FILE_SUFFIX};
use crate::config::error::{ConfigError, Result};
use crate::config::source::{EnvSource, SettingsSource};
use crate::config::{HttpProxy, Settings, Vpn};

/// Secret files configuration source
#[derive(Debug, Clone)]
pub struct SecretsSource {
    env: EnvSource,
    secrets_dir: PathBuf,
}

impl SecretsSource {
    /// Create a source reading path overrides from `env` and default
    /// files from `secrets_dir`
    pub fn new<P: Into<PathBuf>>(env: EnvSource, secrets_dir: P) -> Self {
        Self {
            env,
            secrets_dir: secrets_dir.into(),
        }
    }

    /// Source using the process environment and the default secrets directory
    pub fn from_process() -> Self {
        Self::new(EnvSource::from_process(), SECRETS_DIR)
    }

    /// Directory default secret files are read from
    pub fn secrets_dir(&self) -> &Path {
        &self.secrets_dir
    }

    /// Read a plain secret
    ///
    /// `name` is the variable the secret replaces, for example
    /// `HTTPPROXY_PASSWORD`; the path is read from `HTTPPROXY_PASSWORD_SECRETFILE`
    /// and defaults to `<secrets_dir>/httpproxy_password`.
    pub fn read_secret(&self, name: &str) -> Result<Option<String>> {
        let path_key = format!("{}{}", name, SECRET_FILE_SUFFIX);

        let (path, explicit) = match self.env.get(&path_key) {
            Some(path) => (PathBuf::from(path), true),
            None => (self.secrets_dir.join(name.to_lowercase()), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if explicit {
                    return Err(ConfigError::SecretFileNotFound { key: path_key, path });
                }
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::SecretFile { path, source: e }),
        };

        debug!("Read secret file {}", path.display());

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(content.to_string()))
    }

    /// Read a PEM encoded secret and keep only its base64 body
    pub fn read_pem_secret(&self, name: &str) -> Result<Option<String>> {
        let Some(content) = self.read_secret(name)? else {
            return Ok(None);
        };

        extract_pem(&content).map(Some).map_err(|reason| ConfigError::Pem {
            path: self.secret_path(name),
            reason,
        })
    }

    fn secret_path(&self, name: &str) -> PathBuf {
        self.env
            .get(&format!("{}{}", name, SECRET_FILE_SUFFIX))
            .map(PathBuf::from)
            .unwrap_or_else(|| self.secrets_dir.join(name.to_lowercase()))
    }
}

impl SettingsSource for SecretsSource {
    fn name(&self) -> &'static str {
        "secrets"
    }

    fn read(&self) -> Result<Settings> {
        debug!("Loading settings from secret files in {}", self.secrets_dir.display());

        Ok(Settings {
            http_proxy: HttpProxy {
                user: self.read_secret("HTTPPROXY_USER")?,
                password: self.read_secret("HTTPPROXY_PASSWORD")?,
                ..Default::default()
            },
            vpn: Vpn {
                user: self.read_secret("OPENVPN_USER")?,
                password: self.read_secret("OPENVPN_PASSWORD")?,
                client_crt: self.read_pem_secret("OPENVPN_CLIENTCRT")?,
                client_key: self.read_pem_secret("OPENVPN_CLIENTKEY")?,
            },
            ..Default::default()
        })
    }
}

/// Extract the base64 body of the first PEM block in `content`
///
/// Header lines such as `Proc-Type: 4,ENCRYPTED` are skipped and all
/// whitespace is removed from the body.
pub fn extract_pem(content: &str) -> std::result::Result<String, String> {
    let mut lines = content.lines().map(str::trim);

    let label = lines
        .by_ref()
        .find_map(|line| line.strip_prefix("-----BEGIN ")?.strip_suffix("-----"))
        .ok_or_else(|| "no PEM begin marker found".to_string())?;
    let end_marker = format!("-----END {}-----", label);

    let mut body = String::new();
    let mut ended = false;
    for line in lines {
        if line == end_marker {
            ended = true;
            break;
        }
        if line.contains(':') {
            continue;
        }
        body.extend(line.chars().filter(|c| !c.is_whitespace()));
    }

    if !ended {
        return Err(format!("no PEM end marker found for {}", label));
    }
    if body.is_empty() {
        return Err(format!("PEM block {} is empty", label));
    }

    STANDARD
        .decode(&body)
        .map_err(|e| format!("PEM block {} is not valid base64: {}", label, e))?;

    Ok(body)
}
