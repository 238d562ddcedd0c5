//! pulse - terminal chat client for the Pulse fitness agent

mod commands;
mod config;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use commands::CommandResult;
use pulse_agent::{ChatSession, HttpTransport};
use pulse_sse::AgentClient;

/// pulse - chat with your fitness agent
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent endpoint (default: http://localhost:5001/agent)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Bearer token for the backend
    #[arg(long)]
    token: Option<String>,

    /// Seconds to wait for the agent to start responding
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Show the agent's thoughts
    #[arg(long)]
    show_thoughts: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pulse=debug,pulse_sse=debug,pulse_agent=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let endpoint = cfg.resolve_endpoint(args.endpoint);
    let token = cfg.resolve_token(args.token);
    let timeout = args.timeout_secs.or(cfg.timeout_secs).unwrap_or(30);
    let options = ui::RenderOptions {
        show_thoughts: args.show_thoughts || cfg.show_thoughts.unwrap_or(false),
    };

    let mut client = AgentClient::new(endpoint).with_timeout(Duration::from_secs(timeout));
    if let Some(token) = token {
        client = client.with_bearer_token(token);
    }
    client.stream_url()?;
    tracing::debug!(endpoint = client.endpoint(), "using agent endpoint");

    let transport = Arc::new(HttpTransport::new(client));
    let interrupts = ui::Interrupts::install();

    if let Some(command) = args.command {
        let session = ChatSession::new(transport);
        println!("pulse> {}", command);
        println!();
        ui::run_turn(&session, &command, &options, &interrupts).await;
        return Ok(());
    }

    run_interactive(transport, &options, &interrupts).await
}

async fn run_interactive(
    transport: Arc<HttpTransport>,
    options: &ui::RenderOptions,
    interrupts: &ui::Interrupts,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let mut session = ChatSession::new(transport.clone());

    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!("pulse ({})", transport.client().endpoint());
        eprintln!("Type /help for commands. Ctrl-C cancels a turn; /quit, Ctrl-D or Ctrl-C exits.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let line = input.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            continue;
        }

        let prompt = match commands::execute_command(line, &session) {
            None => line.to_string(),
            Some(CommandResult::Send(text)) => {
                println!("> {}", text);
                text
            }
            Some(CommandResult::Message(msg)) => {
                println!("{}", msg);
                continue;
            }
            Some(CommandResult::NewSession) => {
                session.cancel();
                session = ChatSession::new(transport.clone());
                println!("Started a new conversation.");
                continue;
            }
            Some(CommandResult::Exit) => break,
            Some(CommandResult::Unknown(cmd)) => {
                println!("Unknown command: /{}", cmd);
                println!("Type /help for available commands.");
                continue;
            }
        };

        ui::run_turn(&session, &prompt, options, interrupts).await;
        println!();
    }

    session.cancel();
    Ok(())
}
