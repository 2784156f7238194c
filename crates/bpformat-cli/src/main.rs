mod commands;
mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_FORMAT_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "bpformat",
    version,
    about = "Read and write buildpack lifecycle data-format files"
)]
struct Cli {
    /// Buildpack API the files were written for (default: $BPFORMAT_BUILDPACK_API or the latest supported).
    #[arg(long, global = true)]
    api: Option<String>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read or write a layer metadata file.
    Layer {
        #[command(subcommand)]
        command: LayerCommand,
    },
    /// Decode launch.toml and show the processes it contributes.
    Launch {
        /// Path to launch.toml.
        #[arg(default_value = "launch.toml")]
        path: PathBuf,
        /// Buildpack ID to attribute the processes to.
        #[arg(long, default_value = "")]
        buildpack_id: String,
    },
    /// Inspect build plans and buildpack plans.
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Decode store.toml.
    Store {
        /// Path to store.toml.
        #[arg(default_value = "store.toml")]
        path: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
enum LayerCommand {
    /// Decode a layer metadata file.
    Read {
        /// Path to the layer metadata TOML file.
        path: PathBuf,
    },
    /// Encode a layer metadata file in the layout of the selected API.
    Write {
        /// Path to the layer metadata TOML file.
        path: PathBuf,
        /// TOML file whose contents become the layer's metadata table.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Make the layer available at build time.
        #[arg(long, default_value_t = false)]
        build: bool,
        /// Export the layer into the launch image.
        #[arg(long, default_value_t = false)]
        launch: bool,
        /// Restore the layer from cache on the next build.
        #[arg(long, default_value_t = false)]
        cache: bool,
    },
}

#[derive(Debug, Subcommand)]
enum PlanCommand {
    /// Check where a build plan declares requirement versions.
    Check {
        /// Path to the build plan TOML file.
        path: PathBuf,
    },
    /// Project a buildpack plan onto BOM entries, dropping unmet entries.
    Bom {
        /// Path to the buildpack plan TOML file.
        path: PathBuf,
        /// build.toml whose `unmet` entries are removed first.
        #[arg(long)]
        build: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(config::LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let result = dispatch(cli.command, cli.api.as_deref(), json_output);

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to decode")
                || msg.starts_with("failed to encode")
                || msg.starts_with("invalid buildpack API")
            {
                EXIT_FORMAT_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn dispatch(command: Commands, api_flag: Option<&str>, json_output: bool) -> Result<u8, String> {
    let api = || config::resolve_api(api_flag);
    match command {
        Commands::Layer {
            command: LayerCommand::Read { path },
        } => commands::layer::read(&path, &api()?, json_output),
        Commands::Layer {
            command:
                LayerCommand::Write {
                    path,
                    data,
                    build,
                    launch,
                    cache,
                },
        } => commands::layer::write(
            &path,
            &api()?,
            data.as_deref(),
            commands::layer::Flags {
                build,
                launch,
                cache,
            },
            json_output,
        ),
        Commands::Launch { path, buildpack_id } => {
            commands::launch::run(&path, &api()?, &buildpack_id, json_output)
        }
        Commands::Plan {
            command: PlanCommand::Check { path },
        } => commands::plan::check(&path, &api()?, json_output),
        Commands::Plan {
            command: PlanCommand::Bom { path, build },
        } => commands::plan::bom(&path, build.as_deref(), json_output),
        Commands::Store { path } => commands::store::run(&path, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    }
}
