use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Backend for a peer-to-peer book exchange marketplace.
#[derive(Parser, Debug, Clone)]
#[command(name = "bookswap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "BOOKSWAP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// User management commands.
    User {
        /// User subcommand action.
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Initialize database and create default config.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },

    /// Populate the database with demo users, books and an exchange.
    Seed,
}

/// User management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// Add a new user.
    Add {
        /// Display name.
        name: String,
        /// Email address.
        #[arg(short, long)]
        email: String,
        /// Password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
        /// User role (USER or ADMIN).
        #[arg(short, long, default_value = "USER")]
        role: String,
    },

    /// Delete a user.
    Del {
        /// Email of the user to delete.
        email: String,
    },

    /// List all users.
    List,
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Upload storage configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        8080,
    )
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/bookswap.db")
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens. Generated by `bookswap init`.
    /// When empty, the server falls back to an ephemeral secret and all
    /// tokens die with the process.
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in days. Also used as the cookie max-age; the two
    /// durations must stay equal.
    #[serde(default = "default_token_days")]
    pub token_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_days: default_token_days(),
        }
    }
}

fn default_token_days() -> u32 {
    7
}

/// Upload storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory for uploaded book cover images.
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("bookswap.toml"),
            dirs::config_dir()
                .map(|p| p.join("bookswap").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/bookswap/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content with a fresh signing secret.
    pub fn generate_default(jwt_secret: &str) -> String {
        format!(
            r#"# bookswap configuration

[server]
bind = "0.0.0.0:8080"

[database]
# path = "/var/lib/bookswap/bookswap.db"

[auth]
# Secret used to sign bearer tokens. Keep it private.
jwt_secret = "{}"
# Token lifetime in days (also the login cookie max-age)
token_days = 7

[uploads]
# dir = "/var/lib/bookswap/uploads"
"#,
            jwt_secret
        )
    }
}
