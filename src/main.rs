use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use space_gateway::{HttpGateway, SpaceConfig};
use space_manager::ComponentManager;
use space_ops::SpaceOps;
use space_provider::FsComponentProvider;
use space_schema::{ComponentDescription, VersionMode};

/// Space - reconcile component descriptions against a Space deployment
#[derive(Parser)]
#[command(name = "space")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the configuration file (default: ~/.space/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Bring a component in line with its description
  Reconcile {
    /// Path to the component description (JSON)
    description: PathBuf,

    /// default, major, minor, patch or override
    #[arg(long, default_value = "default")]
    mode: VersionMode,

    /// Directory collection files are relative to (default: the description's directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,
  },

  /// Fetch a component by reverse id
  Get { reverse_id: String },

  /// Fetch a flow by id
  Flow { flow_id: String },

  /// Show the status of a run
  Status {
    run_id: String,

    /// Follow status updates until the run ends or Ctrl-C
    #[arg(long)]
    watch: bool,

    /// Seconds to wait for the next update (default: from configuration)
    #[arg(long)]
    timeout: Option<u64>,
  },

  /// Show the collections one member produced in a run
  Results { run_id: String, in_flow_id: String },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let Some(command) = cli.command else {
    println!("space - use --help to see available commands");
    return Ok(());
  };

  let config_path = match cli.config {
    Some(path) => path,
    None => SpaceConfig::default_path().context("could not determine home directory")?,
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, &config_path).await })
}

async fn run(command: Commands, config_path: &Path) -> Result<()> {
  let config = SpaceConfig::load(config_path)
    .await
    .with_context(|| format!("failed to load configuration: {}", config_path.display()))?;

  let gateway = HttpGateway::connect(&config)
    .await
    .context("failed to connect to space")?;
  let ops = SpaceOps::for_org(Arc::new(gateway), config.org.as_deref())
    .await
    .context("failed to resolve organization")?;
  if config.org.is_some() && ops.org().is_none() {
    warn!(org = ?config.org, "organization_not_found");
  }

  match command {
    Commands::Reconcile {
      description,
      mode,
      base_dir,
    } => {
      let desc = read_description(&description).await?;
      let base_dir = base_dir.or_else(|| description.parent().map(Path::to_path_buf));

      let manager = ComponentManager::new(ops)
        .with_provider(Arc::new(FsComponentProvider::new(components_dir(&config))))
        .with_host(config.host_id.clone())
        .with_base_dir(base_dir);

      let loaded = manager
        .reconcile(&desc, mode)
        .await
        .with_context(|| format!("failed to reconcile {}", desc.reverse_id))?;
      info!(
        reverse_id = %desc.reverse_id,
        version = loaded.version_name().unwrap_or_default(),
        "reconciled"
      );
      print_json(&loaded)
    }
    Commands::Get { reverse_id } => {
      let loaded = ops
        .get_parsed_component_by_reverse_id(&reverse_id)
        .await?
        .with_context(|| format!("component not found: {}", reverse_id))?;
      print_json(&loaded)
    }
    Commands::Flow { flow_id } => {
      let flow = ops
        .get_flow(&flow_id)
        .await?
        .with_context(|| format!("flow not found: {}", flow_id))?;
      print_json(&flow)
    }
    Commands::Status {
      run_id,
      watch,
      timeout,
    } => {
      if !watch {
        return print_json(&ops.get_run_status(&run_id).await?);
      }

      let cancel = CancellationToken::new();
      let on_interrupt = cancel.clone();
      tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
          on_interrupt.cancel();
        }
      });

      let timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
      let mut events = ops.subscribe_to_status(&run_id, timeout, &cancel).await?;
      while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&event?)?);
      }
      Ok(())
    }
    Commands::Results { run_id, in_flow_id } => {
      print_json(&ops.get_results(&run_id, &in_flow_id).await?)
    }
  }
}

async fn read_description(path: &Path) -> Result<ComponentDescription> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read description: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse description: {}", path.display()))
}

/// Local descriptions, from configuration or `~/.space/components`.
fn components_dir(config: &SpaceConfig) -> PathBuf {
  config.components_dir.clone().unwrap_or_else(|| {
    dirs::home_dir()
      .unwrap_or_default()
      .join(".space")
      .join("components")
  })
}

fn print_json(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
