use chatlink_cli::config::{self, IDENTITY_ENV};
use chatlink_cli::{render, repl};
use chatlink_gateway::{GatewayConfig, HttpChatGateway};
use chatlink_session::{Reconciliation, SessionController};
use clap::{Args, Parser, Subcommand};
use eyre::Result;

#[derive(Parser)]
#[command(name = "chatlink")]
#[command(about = "Chat with a remote AI assistant from the terminal", long_about = None)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SessionArgs {
    /// Identity (email) to chat as
    #[arg(long, global = true)]
    identity: Option<String>,

    /// Save the --identity value for later runs
    #[arg(long, global = true)]
    remember: bool,

    /// Override the stored service base URL
    #[arg(long, global = true, env = "CHATLINK_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Fetch and print the chat history
    History,
    /// Clear the chat history on the server
    Clear,
    /// Inspect or reset the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration (identity redacted)
    Show,
    /// Print the config file location
    Path,
    /// Delete the stored configuration
    Reset,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Build a controller from the stored config and the command-line overrides.
fn connect(args: &SessionArgs) -> Result<SessionController<HttpChatGateway>> {
    let mut stored = config::load_or_default()?;
    let env_identity = std::env::var(IDENTITY_ENV).ok();
    let identity =
        config::resolve_identity(args.identity.as_deref(), env_identity.as_deref(), &stored);

    if args.remember {
        let Some(flag) = args.identity.as_deref() else {
            return Err(eyre::eyre!("--remember requires --identity"));
        };
        stored.identity = Some(flag.trim().to_string());
        config::save_config(&stored)?;
    }

    let mut effective = stored;
    if let Some(url) = &args.base_url {
        effective.base_url = url.clone();
    }

    let gateway = HttpChatGateway::new(&GatewayConfig::from(&effective))?;
    let controller = SessionController::new(gateway);
    if let Some(identity) = identity {
        controller.set_identity(&identity);
    }
    Ok(controller)
}

fn require_identity(controller: &SessionController<HttpChatGateway>) -> Result<()> {
    if controller.identity().is_none() {
        return Err(eyre::eyre!(
            "no identity; pass --identity or set {IDENTITY_ENV}"
        ));
    }
    Ok(())
}

fn config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let path = config::config_path()?;
            if !config::has_config() {
                println!("No configuration saved at {}; using defaults.", path.display());
            }
            let info = config::config_info(&config::load_or_default()?, &path);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        ConfigAction::Path => println!("{}", config::config_path()?.display()),
        ConfigAction::Reset => {
            config::delete_config()?;
            println!("Configuration reset.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Config { action } => config_command(action)?,
        Commands::Chat => {
            let controller = connect(&cli.session)?;
            repl::run(&controller).await?;
        }
        Commands::History => {
            let controller = connect(&cli.session)?;
            require_identity(&controller)?;
            if let Reconciliation::KeptStale(e) = controller.refresh_history().await? {
                return Err(e.into());
            }
            println!("{}", render::format_history(controller.history().entries()));
        }
        Commands::Clear => {
            let controller = connect(&cli.session)?;
            require_identity(&controller)?;
            controller.clear_history().await?;
            println!("Chat history cleared.");
        }
    }

    Ok(())
}
