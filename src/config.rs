//! Configuration loading.

use std::path::PathBuf;

use serde::Deserialize;

fn default_bind() -> String {
    "0.0.0.0:6667".to_string()
}

fn default_network() -> String {
    "Test".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_channel() -> String {
    "#circuits".to_string()
}

fn default_true() -> bool {
    true
}

/// Server configuration, loaded from a TOML file and overridable from the
/// command line.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `<address>:<port>`; a bare address implies port 6667.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Verbose event logging.
    #[serde(default)]
    pub debug: bool,

    /// Network name announced in RPL_WELCOME.
    #[serde(default = "default_network")]
    pub network: String,

    /// Server host name used as the default message prefix.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path to the MOTD file. Absent or unreadable means ERR_NOMOTD.
    #[serde(default)]
    pub motd_path: Option<PathBuf>,

    /// Channel every client is joined to at signon.
    #[serde(default = "default_channel")]
    pub default_channel: String,

    /// Reverse-DNS lookups for connecting clients. Disabled, sessions keep
    /// their numeric address but still walk the same lookup states.
    #[serde(default = "default_true")]
    pub dns: bool,

    /// Operator credential records.
    #[serde(default, rename = "oline")]
    pub olines: Vec<Oline>,
}

/// An operator credential: a glob over user prefixes plus a name/password
/// pair for the OPER command.
#[derive(Debug, Clone, Deserialize)]
pub struct Oline {
    /// fnmatch-style pattern matched against `nick!user@host`.
    pub mask: String,
    pub name: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            bind: default_bind(),
            debug: false,
            network: default_network(),
            host: default_host(),
            motd_path: None,
            default_channel: default_channel(),
            dns: true,
            olines: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path, e))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path, e))?;
        Ok(config)
    }

    /// Split the bind string into address and port, defaulting the port
    /// to 6667 when none is given.
    pub fn bind_addr(&self) -> anyhow::Result<(String, u16)> {
        match self.bind.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid port in {}: {}", self.bind, e))?;
                Ok((host.to_string(), port))
            }
            None => Ok((self.bind.clone(), 6667)),
        }
    }

    /// The `read_motd()` capability: the file's text, or none.
    pub fn read_motd(&self) -> Option<String> {
        let path = self.motd_path.as_ref()?;
        std::fs::read_to_string(path).ok()
    }

    /// First O-line whose mask matches the given full prefix.
    pub fn oline_for(&self, prefix: &str) -> Option<&Oline> {
        self.olines
            .iter()
            .find(|o| minirc_proto::hostmask::matches(&o.mask, prefix))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;
        if !self.default_channel.starts_with('#') {
            anyhow::bail!(
                "default_channel must begin with '#': {}",
                self.default_channel
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_on_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bind, "0.0.0.0:6667");
        assert_eq!(config.network, "Test");
        assert_eq!(config.default_channel, "#circuits");
        assert!(config.dns);
        assert!(config.olines.is_empty());
    }

    #[test]
    fn parses_oline_blocks() {
        let config: Config = toml::from_str(
            r#"
            bind = "127.0.0.1:7000"
            debug = true

            [[oline]]
            mask = "*!alice@*"
            name = "alice"
            password = "secret"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.olines.len(), 1);
        assert!(config.oline_for("alice!alice@somewhere").is_some());
        assert!(config.oline_for("bob!bob@somewhere").is_none());
    }

    #[test]
    fn bare_address_defaults_port() {
        let config = Config {
            bind: "127.0.0.1".to_string(),
            ..Config::default()
        };
        assert_eq!(config.bind_addr().unwrap(), ("127.0.0.1".to_string(), 6667));
    }

    #[test]
    fn read_motd_missing_file_is_none() {
        let config = Config {
            motd_path: Some(PathBuf::from("/nonexistent/motd.txt")),
            ..Config::default()
        };
        assert!(config.read_motd().is_none());
    }

    #[test]
    fn read_motd_returns_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Welcome!").unwrap();
        let config = Config {
            motd_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        assert_eq!(config.read_motd().unwrap(), "Welcome!\n");
    }

    #[test]
    fn validate_rejects_bad_channel() {
        let config = Config {
            default_channel: "circuits".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
