//! Client configuration.
//!
//! Consolidates environment variable reads behind CLI overrides and
//! validates the result before connecting.

use std::env;

/// Default server address when neither `--server` nor `HOKM_SERVER` is
/// given.
pub const DEFAULT_SERVER: &str = "127.0.0.1:12345";

/// Complete client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server address, `host:port`.
    pub server: String,
    /// The local player's name.
    pub username: String,
    /// The room creator's name; addresses the room in every command.
    pub room: String,
}

impl ClientConfig {
    /// Load configuration, preferring CLI overrides, then environment
    /// variables (`HOKM_SERVER`, `HOKM_USERNAME`, `HOKM_ROOM`), then
    /// defaults. The username defaults to the OS login name; the room
    /// has no sensible default and is required.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is missing.
    pub fn from_env(
        server_override: Option<String>,
        username_override: Option<String>,
        room_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let server = server_override
            .or_else(|| env::var("HOKM_SERVER").ok())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let username = username_override
            .or_else(|| env::var("HOKM_USERNAME").ok())
            .unwrap_or_else(whoami::username);

        let room = room_override
            .or_else(|| env::var("HOKM_ROOM").ok())
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "HOKM_ROOM".to_string(),
                hint: "pass --room or set HOKM_ROOM to the room creator's name".to_string(),
            })?;

        Ok(Self {
            server,
            username,
            room,
        })
    }

    /// Validate configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let port = self.server.rsplit_once(':').map(|(_, port)| port);
        match port {
            Some(port) if port.parse::<u16>().is_ok() => {}
            _ => {
                return Err(ConfigError::Invalid {
                    var: "HOKM_SERVER".to_string(),
                    reason: format!("'{}' is not a host:port address", self.server),
                });
            }
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "HOKM_USERNAME".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.room.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "HOKM_ROOM".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server: &str, username: &str, room: &str) -> ClientConfig {
        ClientConfig {
            server: server.to_string(),
            username: username.to_string(),
            room: room.to_string(),
        }
    }

    #[test]
    fn overrides_win() {
        let config = ClientConfig::from_env(
            Some("example.org:2000".to_string()),
            Some("alice".to_string()),
            Some("bob".to_string()),
        )
        .unwrap();
        assert_eq!(config.server, "example.org:2000");
        assert_eq!(config.username, "alice");
        assert_eq!(config.room, "bob");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn room_is_required() {
        let err = ClientConfig::from_env(None, Some("alice".to_string()), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HOKM_ROOM"));
        assert!(msg.contains("--room"));
    }

    #[test]
    fn validation_rejects_bad_server() {
        let err = config("nonsense", "alice", "bob").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = config("host:notaport", "alice", "bob")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn validation_rejects_empty_names() {
        assert!(config("127.0.0.1:12345", " ", "bob").validate().is_err());
        assert!(config("127.0.0.1:12345", "alice", "").validate().is_err());
        assert!(
            config("127.0.0.1:12345", "alice", "bob")
                .validate()
                .is_ok()
        );
    }
}
