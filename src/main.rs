//! bookswap server entry point.

use bookswap::{
    auth::{AuthService, generate_secret},
    books::{BookService, NewBook},
    config::{Cli, Command, Config, UserCommand},
    db::{Database, Role},
    exchange::ExchangeService,
    server,
    token::TokenIssuer,
    wallet::WalletService,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::User { action }) => cmd_user(action, &config),
        Some(Command::Seed) => cmd_seed(&config),
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        None => {
            // Default: start server
            cmd_serve(config, None).await
        }
    }
}

/// Build the auth service for a configuration.
fn auth_service(db: Database, config: &Config) -> AuthService {
    let secret = if config.auth.jwt_secret.is_empty() {
        tracing::warn!(
            "No jwt_secret configured; using an ephemeral secret (tokens will not survive a restart). Run 'bookswap init' to generate one."
        );
        generate_secret()
    } else {
        config.auth.jwt_secret.clone()
    };

    AuthService::new(db, TokenIssuer::new(&secret, config.auth.token_days))
}

/// Initialize config and database.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config with a fresh signing secret
    std::fs::write(&config_path, Config::generate_default(&generate_secret()))?;
    println!("Created config file: {}", config_path.display());

    // Initialize database
    let config = Config::default();
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    println!("\nEdit config.toml to configure your server.");
    println!("Then run: bookswap user add <name> --email <email> --role ADMIN");
    println!("And: bookswap serve");

    Ok(())
}

/// User management commands.
fn cmd_user(action: UserCommand, config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;
    let auth = auth_service(db, config);

    match action {
        UserCommand::Add {
            name,
            email,
            password,
            role,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };
            let role: Role = role.parse()?;

            let user = auth.create_user(&name, &email, &password, role)?;
            println!(
                "Created user: {} <{}> (role: {}, id: {})",
                user.name,
                user.email,
                user.role.as_str(),
                user.id
            );
        }

        UserCommand::Del { email } => {
            if auth.delete_user(&email)? {
                println!("Deleted user: {}", email);
            } else {
                println!("User not found: {}", email);
            }
        }

        UserCommand::List => {
            let users = auth.list_users()?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!(
                    "{:<30} {:<20} {:<8} {:<36} CREATED",
                    "EMAIL", "NAME", "ROLE", "ID"
                );
                println!("{}", "-".repeat(112));
                for user in users {
                    let created = bookswap::db::timestamp_to_datetime(user.created_at)
                        .format("%Y-%m-%d %H:%M")
                        .to_string();
                    println!(
                        "{:<30} {:<20} {:<8} {:<36} {}",
                        user.email,
                        user.name,
                        user.role.as_str(),
                        user.id,
                        created
                    );
                }
            }
        }
    }

    Ok(())
}

/// Populate the database with demo data: two users with funded wallets, two
/// books and one pending exchange.
fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;
    let auth = auth_service(db.clone(), config);
    let books = BookService::new(db.clone());
    let wallets = WalletService::new(db.clone());
    let exchanges = ExchangeService::new(db);

    let angela = auth.create_user("Angela", "angela@example.com", "password123", Role::User)?;
    let carlos = auth.create_user("Carlos", "carlos@example.com", "password123", Role::User)?;

    let angela_wallet = wallets.create(&angela.id)?;
    let carlos_wallet = wallets.create(&carlos.id)?;
    wallets.deposit(&angela_wallet.id, 50.0, "Initial balance")?;
    wallets.deposit(&carlos_wallet.id, 30.0, "Initial balance")?;

    let book1 = books.create(NewBook {
        title: "1984".to_string(),
        author: "George Orwell".to_string(),
        isbn: Some("9780451524935".to_string()),
        description: Some("Dystopian classic about surveillance and control.".to_string()),
        condition: "GOOD".to_string(),
        location: "Tarragona".to_string(),
        price: 10.0,
        owner_id: angela.id.clone(),
        image_url: None,
    })?;

    let book2 = books.create(NewBook {
        title: "The Little Prince".to_string(),
        author: "Antoine de Saint-Exupéry".to_string(),
        isbn: Some("9780156012195".to_string()),
        description: Some("A philosophical tale for all ages.".to_string()),
        condition: "FAIR".to_string(),
        location: "Tarragona".to_string(),
        price: 10.0,
        owner_id: carlos.id.clone(),
        image_url: None,
    })?;

    exchanges.propose(&book2.id, &carlos.id, &angela.id)?;

    println!("Seed complete:");
    println!("- Users: {}, {}", angela.email, carlos.email);
    println!("- Books: {}, {}", book1.title, book2.title);
    println!(
        "- Pending exchange of '{}' between {} and {}",
        book2.title, carlos.name, angela.name
    );

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    // Override bind address if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookswap=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Open database
    let db = Database::open(&config.database.path)?;

    // Create auth service
    let auth = auth_service(db.clone(), &config);

    tracing::info!(
        bind = %config.server.bind,
        database = %config.database.path.display(),
        "Starting bookswap server"
    );

    // Create application state and router
    let state = server::AppState::new(config.clone(), db, auth);
    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Prompt for password input.
fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    Ok(password.trim().to_string())
}
