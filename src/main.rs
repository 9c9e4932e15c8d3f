use std::net::SocketAddr;
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use gatekeep::config::{self, GateConfig, DEFAULT_HOST, DEFAULT_PORT};
use gatekeep::{build_router, AppState};

fn load_config(env_file: Option<&str>) -> GateConfig {
    config::load_env_file(env_file);
    match GateConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(%e, "Invalid configuration");
            eprintln!("{}: {}", yansi::Paint::red("Invalid configuration"), e);
            process::exit(1);
        }
    }
}

async fn start_server(config: GateConfig, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let state = AppState::new(config);
    tracing::info!(
        users = state.gate.credentials().len(),
        login_page = %state.config.login_page,
        csrf = state.config.csrf_protection,
        "Authentication gate configured"
    );
    let app = build_router(state);
    tracing::info!(%addr, "Starting gatekeep server");
    println!(
        "{} {}",
        yansi::Paint::new("Web server running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                yansi::Paint::new("Stop the process using this port, or pass a different --port value.").yellow()
            );
            process::exit(1);
        }
    }
}

fn print_config(config: &GateConfig) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table.set_header(vec!["Setting", "Value"]);
    for rec in &config.credentials {
        table.add_row(vec![
            "user".to_string(),
            format!("{} (password: {}, role: {})", rec.username, "*".repeat(rec.password.len()), rec.role),
        ]);
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(config) {
        for (k, v) in fields {
            let shown = match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            table.add_row(vec![k, shown]);
        }
    }
    println!("\n{table}\n");
}

#[derive(Parser)]
#[command(
    name = "gatekeep",
    author,
    version,
    about = "Form-login gate in front of a tiny hello service",
    long_about = r#"gatekeep serves GET /hello behind a form-login authentication gate.

Unauthenticated requests are redirected to the login page; static assets under
the exempt prefixes (/js/, /css/, /images/ by default) are served without a
session. Configuration comes from GATE_* environment variables or a .env file.

Examples:
  1) Run with the defaults:
      gatekeep serve --port 8080
  2) Check the effective configuration:
      gatekeep check-config --env-file .env
"#,
    after_help = "Use `gatekeep <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Validate and print the effective configuration
    #[command(about = "Validate and print the effective configuration.", long_about = "Load GATE_* variables (optionally from an env file), validate them and print the resulting gate configuration with passwords masked. Exits with status 1 when the configuration is invalid.")]
    CheckConfig {
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    match cli.command {
        None => {
            let config = load_config(None);
            start_server(config, DEFAULT_HOST, DEFAULT_PORT).await;
        }
        Some(Commands::Serve { host, port, env_file }) => {
            let config = load_config(env_file.as_deref());
            start_server(config, &host, port).await;
        }
        Some(Commands::CheckConfig { env_file }) => {
            let config = load_config(env_file.as_deref());
            print_config(&config);
            println!("{}", yansi::Paint::new("Configuration is valid").green());
        }
    }
}
