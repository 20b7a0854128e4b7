use agenda_rs::init_logging;
use agenda_rs::run_shell;
use agenda_rs_config::{AgendaConfig, LayeredConfigOptions, MemoryRecallMode};
use agenda_rs_core::{
    Assistant, AssistantSettings, LlmEmbedder, SessionRegistry, api_key_from_env, build_llm,
    build_memory_store,
};
use agenda_rs_memory::Embedder;
use agenda_rs_tools::SystemClock;
use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};

/// Command-line options for the Agenda chat shell.
#[derive(Parser)]
#[command(name = "agenda", version)]
struct Cli {
    /// User id the session and its memories belong to
    #[arg(long)]
    user: String,
    /// Extra agenda.json5 layer applied over the user and cwd layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Model name override
    #[arg(long)]
    model: Option<String>,
    /// Send a single message, print the reply, and exit
    #[arg(long)]
    message: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    info!(
        "starting agenda (config_set={}, model_set={}, one_shot={})",
        cli.config.is_some(),
        cli.model.is_some(),
        cli.message.is_some()
    );

    let cwd = std::env::current_dir().context("cwd")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered = AgendaConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    let api_key = api_key_from_env(&config.llm).context("missing model credential")?;
    let llm = build_llm(&config.llm, &api_key).context("failed to build model client")?;
    let embedder: Option<Arc<dyn Embedder>> = match config.memory.recall.mode {
        MemoryRecallMode::Text => None,
        _ => Some(Arc::new(LlmEmbedder::new(llm.clone()))),
    };
    let memory = build_memory_store(&config.memory, &cwd, embedder)
        .context("failed to open memory store")?;

    let assistant = Assistant::new(
        llm,
        memory,
        Arc::new(SystemClock),
        AssistantSettings::from_config(&config),
    );
    let registry = SessionRegistry::new(Arc::new(assistant));

    if let Some(message) = cli.message {
        let reply = registry
            .respond(&cli.user, &message)
            .await
            .context("turn failed")?;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{reply}\n").as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let stdin = BufReader::new(tokio::io::stdin());
    run_shell(&registry, &cli.user, stdin, tokio::io::stdout()).await
}
