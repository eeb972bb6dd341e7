//! codespace-pilot CLI
//!
//! Creates a GitHub Codespace, connects to it, and deletes it when the
//! session ends.

use clap::Parser;

use codespace_pilot::{delete_all, GhRegistry, SandboxRequest, SessionRunner, StatusLine};

/// Create and connect to a GitHub Codespace.
#[derive(Debug, Parser)]
#[command(name = "codespace-pilot", version, about)]
struct Cli {
    /// Delete all active codespaces and exit.
    #[arg(long)]
    delete_all: bool,

    /// Repository in `owner/repo` format.
    #[arg(required_unless_present = "delete_all")]
    repository: Option<String>,

    /// Branch name to use.
    #[arg(default_value = "main")]
    branch: String,

    /// Machine type.
    #[arg(default_value = "basicLinux32gb")]
    machine: String,

    /// Optional prompt (currently unused).
    prompt: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never fight the status line on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.delete_all {
        let registry = GhRegistry::new();
        let status = StatusLine::stdout();
        if let Err(e) = delete_all(&registry, &status) {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let repository = cli
        .repository
        .expect("clap enforces repository unless --delete-all");

    let mut request = SandboxRequest::new(repository, cli.branch, cli.machine);
    if let Some(prompt) = cli.prompt {
        request = request.with_prompt(prompt);
    }

    let runner = SessionRunner::with_defaults();
    let code = runner.run(&request).await;
    std::process::exit(code);
}
