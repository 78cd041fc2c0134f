//! Command line and environment configuration.

use clap::Parser;

use crate::domain::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9090;

/// Hiroba chat gateway
#[derive(Debug, Clone, Parser)]
#[command(name = "hiroba-server", version, about)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "HIROBA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HIROBA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite URL for the message log (e.g. sqlite://hiroba.db); messages stay in memory when omitted
    #[arg(long, env = "HIROBA_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Number of messages replayed to a new connection
    #[arg(long, env = "HIROBA_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Maximum number of simultaneous connections
    #[arg(long, env = "HIROBA_MAX_PARTICIPANTS")]
    pub max_participants: Option<usize>,

    /// HS256 secret; when set, clients must connect with `?token=<jwt>`
    #[arg(long, env = "HIROBA_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Runtime configuration of the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub history_limit: usize,
    pub max_participants: Option<usize>,
    pub jwt_secret: Option<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_participants: None,
            jwt_secret: None,
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_url: args.database_url,
            history_limit: args.history_limit,
            max_participants: args.max_participants,
            jwt_secret: args.jwt_secret,
        }
    }
}
