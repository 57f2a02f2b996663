use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use tokio::io::{AsyncReadExt, BufReader};

use promptopt::session::{render_report, run_form, FormEvent, Outcome, Session};
use promptopt::{CompletionGateway, GatewayConfig, HttpTransport, Mode};

#[derive(Parser, Debug)]
#[command(
  name = "promptopt",
  version,
  about = "Rewrite prompts through a chat-completion endpoint"
)]
struct Cli
{   /// general-optimize | meta-prompt | email-template-optimize
    #[arg(long, short, default_value = "general-optimize")]
    mode: Mode,

    /// Read the prompt from this file instead of stdin
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Save the output into this directory, named per mode
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Print the original prompt after the output
    #[arg(long)]
    compare: bool,

    /// JSON config file; the API key may come from the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the model identifier
    #[arg(long)]
    model: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Override the request timeout
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Keep reading prompts; end each with a line `/run`
    #[arg(long)]
    interactive: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<GatewayConfig, promptopt::Error>
{   let mut config = match &cli.config
    {   Some(path) => GatewayConfig::from_json_file(path)?
      , None => GatewayConfig::from_env()?
    };
    if let Some(model) = &cli.model
    {   config.model = model.clone();
    }
    if let Some(base) = &cli.api_base
    {   config.api_base = base.clone();
    }
    if let Some(secs) = cli.timeout_secs
    {   config.timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

/// Print an outcome; returns false on rejection or failure
fn show(outcome: &Outcome, cli: &Cli) -> bool
{   match outcome
    {   Outcome::Completed(completion) => {
          print!("{}", render_report(completion, cli.compare));
          if let Some(dir) = &cli.save_dir
          {   match completion.save_to(dir)
              {   Ok(path) => println!("\nSaved to {}", path.display())
                , Err(e) => {
                    eprintln!("Error: {}", e);
                    return false;
                  }
              }
          }
          true
        }
      , Outcome::Rejected(msg) => {
          eprintln!("{}", msg);
          false
        }
      , Outcome::Failed(msg) => {
          eprintln!("{}", msg);
          false
        }
    }
}

async fn run_once(session: &Session<HttpTransport>, cli: &Cli)
  -> Result<bool, promptopt::Error>
{   let text = match &cli.input
    {   Some(path) => tokio::fs::read_to_string(path).await?
      , None => {
          let mut buf = String::new();
          tokio::io::stdin().read_to_string(&mut buf).await?;
          buf
        }
    };
    let outcome = session.submit(cli.mode, &text).await;
    Ok(show(&outcome, cli))
}

async fn run_interactive(session: &Session<HttpTransport>, cli: &Cli)
  -> Result<bool, promptopt::Error>
{   eprintln!(
      "Mode: {}. Enter a prompt and finish with /run. \
       /mode <name> switches mode, /quit exits.",
      cli.mode.label()
    );
    let reader = BufReader::new(tokio::io::stdin());
    let summary = run_form(session, reader, cli.mode, |event| {
      match event
      {   FormEvent::ModeChanged(mode) => eprintln!("Mode: {}", mode.label())
        , FormEvent::Outcome(outcome) => {
            show(&outcome, cli);
          }
        , FormEvent::Notice(msg) => eprintln!("{}", msg)
      }
    }).await?;
    debug!(
      "Form ended: {} submitted, {} failed",
      summary.submitted, summary.failed
    );
    Ok(summary.failed == 0)
}

#[tokio::main]
async fn main() -> ExitCode
{   let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or(level)
    ).init();
    debug!("{:?}", cli);

    let gateway = match load_config(&cli)
      .and_then(CompletionGateway::from_config)
    {   Ok(gateway) => gateway
      , Err(e) => {
          error!("Startup failed: {}", e);
          eprintln!("Error: {}", e);
          return ExitCode::FAILURE;
        }
    };
    let session = Session::new(gateway);

    let result = if cli.interactive
    {   run_interactive(&session, &cli).await
    } else
    {   run_once(&session, &cli).await
    };

    match result
    {   Ok(true) => ExitCode::SUCCESS
      , Ok(false) => ExitCode::FAILURE
      , Err(e) => {
          eprintln!("Error: {}", e);
          ExitCode::FAILURE
        }
    }
}
