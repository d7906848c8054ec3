//! ELIZA script CLI
//!
//! Loads a script and its substitution tables, then chats on stdin/stdout.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use elizaos_eliza_script::logging::init_logging;
use elizaos_eliza_script::{console, ElizaScriptConfig, Responder, Session, TriggerSyntax};

#[derive(Parser)]
#[command(name = "eliza-script")]
#[command(author = "elizaOS")]
#[command(version)]
#[command(about = "Chat with a script-driven ELIZA", long_about = None)]
struct Cli {
    /// Script file (falls back to ELIZA_SCRIPT)
    script: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pre-substitution file
    #[arg(long)]
    pre: Option<PathBuf>,

    /// Post-substitution file
    #[arg(long)]
    post: Option<PathBuf>,

    /// Pause before each reply, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Seed for reproducible replies
    #[arg(long)]
    seed: Option<u64>,

    /// How triggers are interpreted: literal or pattern
    #[arg(long)]
    trigger_syntax: Option<TriggerSyntax>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ElizaScriptConfig> {
        let mut config = match &self.config {
            Some(path) => ElizaScriptConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ElizaScriptConfig::from_env()?,
        };
        if let Some(path) = self.script {
            config = config.with_script_path(path);
        }
        if let Some(path) = self.pre {
            config = config.with_pre_substitutions_path(path);
        }
        if let Some(path) = self.post {
            config = config.with_post_substitutions_path(path);
        }
        if let Some(ms) = self.delay_ms {
            config = config.with_response_delay_ms(ms);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(syntax) = self.trigger_syntax {
            config = config.with_trigger_syntax(syntax);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.into_config()?;
    let responder = Responder::from_config(&config).context("failed to load ELIZA script")?;
    let mut session = Session::with_optional_seed(Arc::new(responder), config.seed());

    let stdin = io::stdin();
    let stdout = io::stdout();
    console::run(
        &mut session,
        stdin.lock(),
        stdout.lock(),
        config.response_delay(),
    )?;
    Ok(())
}
