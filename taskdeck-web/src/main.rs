//! Taskdeck Web Server
//!
//! A session-based task management web application.

use clap::Parser;
use taskdeck_web::server::TaskdeckServerBuilder;
use taskdeck_web::{init_logging, WebConfig};

/// Taskdeck Web Server - session-based task management
#[derive(Parser)]
#[command(name = "taskdeck-web")]
#[command(about = "A task management web application")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL (falls back to in-memory stores when unset or unreachable)
    #[arg(long)]
    database_url: Option<String>,

    /// Username provisioned as administrator at startup
    #[arg(long)]
    admin_user: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Set up logging first
    std::env::set_var(
        "RUST_LOG",
        format!("taskdeck_web={},tower_http=debug", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Create web configuration, command line arguments win
    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;
    if args.database_url.is_some() {
        config.database_url = args.database_url;
    }
    if let Some(admin_user) = args.admin_user {
        config.admin_username = admin_user;
    }

    println!("🚀 Starting Taskdeck Web Server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🔧 Development mode: {}", config.dev_mode);

    if let Some(db_url) = &config.database_url {
        println!("🗄️  Database: {}", db_url);
    } else {
        println!("🗄️  No database configured; using in-memory demo stores");
    }

    if config.session_keys.len() == 1
        && config.session_keys[0] == WebConfig::default().session_keys[0]
    {
        println!("⚠️  Using the default session key; set TASKDECK_SESSION_KEYS in production.");
    }

    let mut builder = TaskdeckServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .admin_username(config.admin_username.clone());
    if let Some(db_url) = config.database_url.clone() {
        builder = builder.database_url(db_url);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server (this will block until shutdown)
    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        use clap::Parser;

        // Test default values
        let args = Args::parse_from(["taskdeck-web"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 3000);
        assert!(!args.dev);

        // Test custom values
        let args = Args::parse_from([
            "taskdeck-web",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--dev",
            "--admin-user",
            "root",
        ]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);
        assert!(args.dev);
        assert_eq!(args.admin_user.as_deref(), Some("root"));
    }
}
