mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tokio_util::sync::CancellationToken;

use fg_av::ToolRegistry;
use fg_core::config::Config;
use fg_core::JobId;
use fg_pipeline::{JobRunner, ProgressSender, SCANNING_MESSAGE};

/// Tried in order when no `--config` is given.
const DEFAULT_CONFIG_PATHS: &[&str] = &["./fragforge.json", "~/.config/fragforge/config.json"];

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return Ok(Config::load(path)?);
    }

    for path_str in DEFAULT_CONFIG_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::info!("Using config file {}", path.display());
            return Ok(Config::load_or_default(Some(path)));
        }
    }

    Ok(Config::default())
}

async fn start_server(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting fragforge server");
    fg_server::start(config, CancellationToken::new()).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "fragforge=trace,fg_core=debug,fg_av=debug,fg_pipeline=debug,fg_server=debug,tower_http=debug".to_string()
        } else {
            "fragforge=info,fg_core=info,fg_av=info,fg_pipeline=info,fg_server=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Run { input } => run_dir(&input, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("fragforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_dir(input: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        let runner = JobRunner::new(tools, &config);
        let (progress, _rx) = ProgressSender::new(JobId::new(), SCANNING_MESSAGE);

        let summary = runner.run(input, &progress).await?;

        println!("Output: {}", summary.output_dir.display());
        println!(
            "Merged {} (already existed: {}, failed: {})",
            summary.tally(),
            summary.already_exists(),
            summary.failed()
        );
        Ok::<(), anyhow::Error>(())
    })
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = load_config(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = Config::load(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Output folder: {}", config.layout.output_folder);
    println!(
        "  Extensions: .{} descriptor, .{} fragments",
        config.layout.descriptor_extension, config.layout.fragment_extension
    );
    match config.tools.mux_timeout_secs {
        Some(secs) => println!("  Mux timeout: {secs}s"),
        None => println!("  Mux timeout: none"),
    }

    for warning in config.validate() {
        println!("  warning: {warning}");
    }

    Ok(())
}
