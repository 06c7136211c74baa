use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use libreg_cfg::ConfigSet;
use libreg_core::{Engine, EngineConfig};
use libreg_types::LibraryName;
use tracing_subscriber::EnvFilter;

/// Prefix for environment variables that override configs, e.g. `LIBREG_STRICT_TOOLS`.
static ENV_PREFIX: &str = "LIBREG_";

/// Register libraries and apply their dependencies to a build environment.
#[derive(Debug, Parser)]
#[command(name = "libreg", version)]
struct Args {
    /// Directory containing the workspace manifest.
    #[arg(long, short, default_value = ".")]
    workspace: PathBuf,
    /// Override a config, e.g. `--set strict_tools=false`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply a library to a fresh build environment and print the result.
    Apply {
        library: LibraryName,
        #[command(flatten)]
        mode: DepsOnlyArgs,
    },
    /// Print the calls applying a library would make.
    Plan {
        library: LibraryName,
        #[command(flatten)]
        mode: DepsOnlyArgs,
    },
    /// Check whether a library can be applied.
    Check { library: LibraryName },
    /// Print every config and its current value.
    Configs,
}

/// Overrides for the `deps_only` config, the last flag given wins.
#[derive(Debug, Clone, Copy, clap::Args)]
struct DepsOnlyArgs {
    /// Only apply the dependencies, don't register the library itself.
    #[arg(long, overrides_with = "no_deps_only")]
    deps_only: bool,
    /// Register the library itself, even if the `deps_only` config is set.
    #[arg(long, overrides_with = "deps_only")]
    no_deps_only: bool,
}

impl DepsOnlyArgs {
    /// Resolve the mode, falling back to `default` when neither flag was given.
    fn resolve(self, default: bool) -> bool {
        match (self.deps_only, self.no_deps_only) {
            (true, _) => true,
            (_, true) => false,
            (false, false) => default,
        }
    }
}

fn main() -> Result<ExitCode, anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(!libreg_ore::env::is_truthy("NO_COLOR"))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let configs = {
        let mut builder = ConfigSet::builder();
        libreg_core::cfgs::all_cfgs(&mut builder);
        builder.build()
    };
    let from_env = configs.apply_env(ENV_PREFIX)?;
    tracing::debug!(from_env, "applied config overrides from the environment");
    for pair in &args.overrides {
        configs.try_update_pair(pair)?;
    }

    if let Command::Configs = args.command {
        print!("{configs}");
        return Ok(ExitCode::SUCCESS);
    }

    let engine = Engine::new(EngineConfig {
        workspace_dir: args.workspace,
        configs,
    })?;

    match args.command {
        Command::Apply { library, mode } => {
            let deps_only = mode.resolve(engine.deps_only());

            let spinner = ProgressBar::new_spinner().with_message(format!("applying {library}"));
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.blue} {msg}")?
                    .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
            );
            let result = engine.apply(&library, deps_only);
            spinner.finish_and_clear();

            print!("{}", result?);
        }
        Command::Plan { library, mode } => {
            let deps_only = mode.resolve(engine.deps_only());
            for call in engine.plan(&library, deps_only)? {
                println!("{call}");
            }
        }
        Command::Check { library } => {
            if !engine.check(&library) {
                println!("missing");
                return Ok(ExitCode::FAILURE);
            }
            println!("available");
        }
        Command::Configs => unreachable!("handled above"),
    }

    Ok(ExitCode::SUCCESS)
}
