use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use melt_pp_codemod::{
    package_manager::{dependencies, PackageManager},
    update_config, Outcome,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "melt-ui", version, about = "Add MeltUI to your project")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Installs MeltUI in your SvelteKit project.
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Skip confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    /// The working directory.
    #[arg(short, long, default_value = ".")]
    cwd: PathBuf,

    /// Path to svelte.config.js, relative to the working directory.
    #[arg(long, default_value = "svelte.config.js")]
    config: PathBuf,

    /// Do not wire the preprocessor into svelte.config.js.
    #[arg(long)]
    no_preprocessor: bool,

    /// Do not run the package manager.
    #[arg(long)]
    skip_install: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("melt_pp_codemod=info,melt_ui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => init(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init(args: InitArgs) -> anyhow::Result<()> {
    let cwd = std::path::absolute(&args.cwd)
        .with_context(|| format!("could not resolve {}", args.cwd.display()))?;
    if !cwd.exists() {
        bail!("The path {} does not exist. Please try again.", cwd.display());
    }

    if !args.yes
        && !confirm(
            "Running this command will install dependencies and modify your existing svelte.config.js file. Proceed?",
        )?
    {
        return Ok(());
    }

    let with_preprocessor = !args.no_preprocessor;
    if with_preprocessor {
        let config_path = cwd.join(&args.config);
        if !config_path.is_file() {
            bail!("{} does not exist. Please enter a valid path.", config_path.display());
        }
        if let Outcome::AlreadyInstalled = update_svelte_config(&config_path)? {
            warn!("MeltUI looks to be already installed!");
            return Ok(());
        }
    }

    if !args.skip_install {
        let pm = PackageManager::detect(&cwd);
        pm.install_dev(&cwd, &dependencies(with_preprocessor))?;
    }

    info!("Success! MeltUI installation completed.");
    Ok(())
}

fn update_svelte_config(path: &Path) -> anyhow::Result<Outcome> {
    info!("Updating {}...", path.display());
    let outcome = update_config(path)?;
    if let Outcome::Installed { rewritten: 0 } = outcome {
        warn!("No `preprocess` option found; add `sequence([preprocessMeltUI()])` to it manually.");
    }
    Ok(outcome)
}

/// Yes/no prompt on stdin; an empty answer means yes.
fn confirm(message: &str) -> anyhow::Result<bool> {
    print!("{message} (Y/n) ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_answer(&answer))
}

fn parse_answer(answer: &str) -> bool {
    !matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no")
}
