use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use outline_client::OutlineClient;
use outline_core::{OutlineConfig, Transport};

mod telemetry;

const CONFIG_FILE: &str = ".mcp-outline.toml";

#[derive(Parser)]
#[command(
    name = "mcp-outline",
    version,
    about = "MCP server for the Outline knowledge base",
    long_about = "Exposes an Outline workspace to LLM agents over the Model Context Protocol.\n\n\
                   Tools cover search, reading, importing, drafts, and document revision\n\
                   history with a short-lived revision cache.\n\n\
                   Examples:\n  \
                     mcp-outline                            Serve over stdio (default)\n  \
                     mcp-outline serve --transport http     Serve streamable HTTP on 127.0.0.1:3001\n  \
                     mcp-outline doctor                     Check API key and connectivity\n  \
                     mcp-outline init                       Write a default .mcp-outline.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .mcp-outline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server (the default when no command is given)
    #[command(long_about = "Run the MCP server.\n\n\
        The transport comes from --transport, then MCP_TRANSPORT, then the\n\
        config file, and defaults to stdio. HTTP transports serve /mcp on\n\
        the bind address.")]
    Serve {
        /// stdio, sse, or streamable-http (alias: http)
        #[arg(long)]
        transport: Option<Transport>,

        /// Listen address for HTTP transports
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Create a default .mcp-outline.toml configuration file
    #[command(long_about = "Create a default .mcp-outline.toml configuration file.\n\n\
        Generates a template with every available option.\n\
        Fails if .mcp-outline.toml already exists.")]
    Init,
    /// Check the API key, Outline connectivity, and server settings
    Doctor {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn load_config(path: Option<&Path>) -> Result<OutlineConfig> {
    let config = match path {
        Some(path) => OutlineConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                OutlineConfig::from_file(default_path)?
            } else {
                OutlineConfig::default()
            }
        }
    };
    Ok(config)
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self, use_color: bool) -> &'static str {
        match (self.status, use_color) {
            ("pass", true) => "\x1b[32m\u{2713}\x1b[0m",
            ("fail", true) => "\x1b[31m\u{2717}\x1b[0m",
            (_, true) => "\x1b[33m~\x1b[0m",
            ("pass", false) => "\u{2713}",
            ("fail", false) => "\u{2717}",
            (_, false) => "~",
        }
    }
}

async fn run_doctor(config: &OutlineConfig, json: bool) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    if Path::new(CONFIG_FILE).exists() {
        checks.push(CheckResult::pass("config_file", format!("{CONFIG_FILE} found")));
    } else {
        checks.push(CheckResult::info(
            "config_file",
            format!("{CONFIG_FILE} not found, using defaults and environment"),
        ));
    }

    checks.push(CheckResult::info("api_url", config.api.url.clone()));

    match OutlineClient::new(&config.api) {
        Ok(client) => {
            checks.push(CheckResult::pass("api_key", "configured"));
            match client.auth_info().await {
                Ok(auth) => {
                    let user = auth.user.name.as_deref().unwrap_or("unknown user");
                    let detail = match auth.team.and_then(|t| t.name) {
                        Some(team) => format!("authenticated as {user} ({team})"),
                        None => format!("authenticated as {user}"),
                    };
                    checks.push(CheckResult::pass("api_connection", detail));
                }
                Err(e) => checks.push(CheckResult::fail(
                    "api_connection",
                    e.to_string(),
                    "check OUTLINE_API_URL and that the token is still valid",
                )),
            }
        }
        Err(e) => checks.push(CheckResult::fail(
            "api_key",
            e.to_string(),
            "export OUTLINE_API_KEY=... or set [api] key in .mcp-outline.toml",
        )),
    }

    let transport = match config.server.transport {
        Transport::Stdio => "stdio".to_string(),
        other => format!("{other} on {}", config.server.bind),
    };
    checks.push(CheckResult::info("transport", transport));
    checks.push(CheckResult::info(
        "revision_cache",
        format!("ttl {}s", config.cache.ttl_secs),
    ));

    let version = env!("CARGO_PKG_VERSION");
    if json {
        let json = serde_json::json!({
            "version": version,
            "checks": checks,
        });
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        return Ok(());
    }

    let use_color = std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err();
    println!("mcp-outline v{version} - Environment Check\n");
    for check in &checks {
        let label = check.name.replace('_', " ");
        println!("  {} {label:<16} {}", check.symbol(use_color), check.detail);
        if let Some(hint) = &check.hint {
            println!("    hint: {hint}");
        }
    }

    let passed = checks.iter().filter(|c| c.status == "pass").count();
    let failed = checks.iter().filter(|c| c.status == "fail").count();
    let info = checks.iter().filter(|c| c.status == "info").count();
    println!("\n{passed} checks passed, {failed} failed, {info} info");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# mcp-outline configuration
# Environment variables OUTLINE_API_KEY, OUTLINE_API_URL and MCP_TRANSPORT
# override the values below; command-line flags override both.

[api]
# key = "ol_api_..."
url = "https://app.getoutline.com/api"
timeout_secs = 30

[cache]
# How long a fetched revision is reused before refetching
ttl_secs = 300

[analysis]
# Revision comparison: change share of the original size
minor_change_percent = 5.0
moderate_change_percent = 25.0
# History summary: mean hours between revisions
rapid_gap_hours = 1.0
active_gap_hours = 24.0

[server]
# stdio, sse, or streamable-http
transport = "stdio"
bind = "127.0.0.1:3001"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose, cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env();
    tracing::debug!(?config, "resolved configuration");

    let command = cli.command.unwrap_or(Command::Serve {
        transport: None,
        bind: None,
    });

    match command {
        Command::Serve { transport, bind } => {
            if let Some(transport) = transport {
                config.server.transport = transport;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            outline_mcp::server::run_server(&config).await?;
        }
        Command::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Command::Doctor { json } => {
            run_doctor(&config, json).await?;
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mcp-outline", &mut std::io::stdout());
        }
    }

    Ok(())
}
