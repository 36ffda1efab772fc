use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fidga_client::ApiClient;
use fidga_config::{AnalyticsToggle, DashboardConfig};
use fidga_dashboard::{
  AnalyticsTracker, ApiTestRunner, Dashboard, ErrorBoundary, ModuleKind, ProbeResult,
  ProbeStatus, render_creatives, render_module, render_probe, render_report,
};
use fidga_fetch::Orchestrator;
use fidga_template::{CreativeTemplates, Product, demo_products, generate_variations};

/// FIDGA - marketing intelligence dashboard for the terminal
#[derive(Parser)]
#[command(name = "fidga")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.fidga)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Backend base URL, overriding config.json and FIDGA_API_URL
  #[arg(long, global = true)]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Load a dashboard module and print its sections
  Dashboard {
    /// overview, analytics, market, campaigns, performance or content
    module: String,

    /// Print the module as JSON instead of text
    #[arg(long)]
    json: bool,
  },

  /// Probe every backend endpoint, one at a time
  TestApis {
    /// Only probe this category (e.g. "analytics", "market-intelligence")
    #[arg(long)]
    category: Option<String>,
  },

  /// Enable, disable or inspect analytics tracking
  Analytics {
    #[command(subcommand)]
    action: AnalyticsAction,
  },

  /// Print ad creative variations
  Creatives {
    /// JSON array of products (default: built-in demo products)
    #[arg(long)]
    products: Option<PathBuf>,

    /// JSON object with headline, description and cta template lists
    #[arg(long)]
    templates: Option<PathBuf>,
  },
}

#[derive(Subcommand)]
enum AnalyticsAction {
  Enable,
  Disable,
  Status,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".fidga"),
  };

  let Some(command) = cli.command else {
    println!("fidga - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, data_dir, cli.api_url).await })
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,fidga=info"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

async fn run(command: Commands, data_dir: PathBuf, api_url: Option<String>) -> Result<()> {
  match command {
    Commands::Dashboard { module, json } => show_dashboard(&module, json, &data_dir, api_url).await,
    Commands::TestApis { category } => test_apis(category.as_deref(), &data_dir, api_url).await,
    Commands::Analytics { action } => analytics(action, &data_dir).await,
    Commands::Creatives {
      products,
      templates,
    } => creatives(products, templates).await,
  }
}

async fn load_config(data_dir: &Path, api_url: Option<String>) -> Result<DashboardConfig> {
  let config = DashboardConfig::load_or_default(data_dir)
    .await
    .context("failed to load config")?
    .apply_env()
    .with_api_base_url(api_url);

  config.validate()?;
  Ok(config)
}

fn build_client(config: &DashboardConfig) -> Result<Arc<ApiClient>> {
  let client = ApiClient::with_timeout(&config.api_base_url, config.request_timeout())
    .context("failed to create API client")?;
  Ok(Arc::new(client))
}

async fn show_dashboard(
  module: &str,
  json: bool,
  data_dir: &Path,
  api_url: Option<String>,
) -> Result<()> {
  let kind: ModuleKind = module.parse()?;
  let config = load_config(data_dir, api_url).await?;
  let client = build_client(&config)?;

  let toggle = AnalyticsToggle::init(data_dir).await;
  let tracker = AnalyticsTracker::new(toggle.handle())
    .with_measurement_id(config.analytics_measurement_id.clone());
  let orchestrator = Orchestrator::new().with_timeout(config.request_timeout());
  let dashboard =
    Dashboard::with_orchestrator(client, orchestrator, toggle.handle()).with_tracker(tracker);

  let view = tokio::select! {
    view = dashboard.load(kind) => view,
    _ = tokio::signal::ctrl_c() => bail!("interrupted"),
  };

  if json {
    let output = serde_json::to_string_pretty(&view).context("failed to serialize module")?;
    println!("{}", output);
  } else {
    let rendered = ErrorBoundary.render(|| render_module(&view));
    println!("{}", rendered);
  }

  toggle
    .teardown()
    .await
    .context("failed to save analytics setting")?;
  Ok(())
}

async fn test_apis(category: Option<&str>, data_dir: &Path, api_url: Option<String>) -> Result<()> {
  let config = load_config(data_dir, api_url).await?;
  let client = build_client(&config)?;
  let runner = ApiTestRunner::new(client).with_pause(config.test_pause());

  // Progress goes to stderr; the final report is the only stdout output.
  let progress = |result: &ProbeResult| {
    if result.status != ProbeStatus::Running {
      eprintln!("{}", render_probe(result));
    }
  };

  let report = match category {
    Some(category) => runner.run_category(category, progress).await?,
    None => runner.run_all(progress).await,
  };

  print!("{}", render_report(&report));
  Ok(())
}

async fn analytics(action: AnalyticsAction, data_dir: &Path) -> Result<()> {
  let toggle = AnalyticsToggle::init(data_dir).await;

  match action {
    AnalyticsAction::Enable => toggle.set_enabled(true),
    AnalyticsAction::Disable => toggle.set_enabled(false),
    AnalyticsAction::Status => {}
  }

  println!(
    "analytics: {}",
    if toggle.is_enabled() {
      "enabled"
    } else {
      "disabled"
    }
  );

  toggle
    .teardown()
    .await
    .context("failed to save analytics setting")?;
  Ok(())
}

async fn creatives(products: Option<PathBuf>, templates: Option<PathBuf>) -> Result<()> {
  let products: Vec<Product> = match products {
    Some(path) => read_json(&path).await?,
    None => demo_products(),
  };
  let templates: CreativeTemplates = match templates {
    Some(path) => read_json(&path).await?,
    None => CreativeTemplates::default(),
  };

  let variations = generate_variations(&products, &templates);
  print!("{}", render_creatives(&variations));
  println!("\n{} variations", variations.len());
  Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read {}", path.display()))?;

  serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
