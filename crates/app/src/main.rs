use std::{path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use sekai_re_core::{extract_music, DumpBundleReader, ExtractConfig, VgmstreamDecoder};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let result = match cli.command {
        Some(Commands::ExtractMusic(args)) => run_extract_music(args),
        None => {
            let _ = Cli::command().print_help();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "extraction aborted");
            ExitCode::FAILURE
        }
    }
}

/// Layers the command line over the optional config file.
///
/// The command releases payloads unless the file or `--keep-payloads` says otherwise.
fn resolve_config(args: ExtractMusicArgs) -> sekai_re_core::Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractConfig::from_toml_path(path)?,
        None => ExtractConfig::default(),
    };
    config.input_root = args.input;
    config.output_root = args.output;
    if let Some(program) = args.decoder {
        config.decoder.program = program;
    }
    if let Some(name) = args.manifest_name {
        config.manifest_name = name;
    }
    if args.dry_run {
        config.export = false;
    }
    if args.keep_payloads {
        config.release_payloads = Some(false);
    }
    config.release_payloads.get_or_insert(true);

    Ok(config)
}

fn run_extract_music(args: ExtractMusicArgs) -> sekai_re_core::Result<()> {
    let config = resolve_config(args)?;

    tracing::info!(input = ?config.input_root, output = ?config.output_root, "extracting music");

    let decoder = VgmstreamDecoder::locate(&config.decoder.program)?;
    let summary = extract_music(&config, DumpBundleReader::new(), decoder)?;

    println!(
        "Extracted {} songs ({} files written, {} already present)",
        summary.musics.len(),
        summary.export.written,
        summary.export.skipped
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(
    name = "sekai-re",
    author,
    version,
    about = "Project Sekai reverse engineering suites",
    after_help = "Currently only used for unpacking music assets"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decrypt and extract music assets.
    #[command(name = "extract_music")]
    ExtractMusic(ExtractMusicArgs),
}

#[derive(clap::Args, Debug)]
struct ExtractMusicArgs {
    /// Root folder of the game assets.
    #[arg(long = "in", value_name = "DIR")]
    input: PathBuf,
    /// Root folder to save the assets.
    #[arg(long = "out", value_name = "DIR")]
    output: PathBuf,
    /// Optional TOML file with layout and decoder settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Decoder executable used to convert the audio streams.
    #[arg(long)]
    decoder: Option<PathBuf>,
    /// Value of the `name` field written to the manifest.
    #[arg(long)]
    manifest_name: Option<String>,
    /// Build the manifest without writing per-song files.
    #[arg(long)]
    dry_run: bool,
    /// Keep decoded payloads in memory for the whole run.
    #[arg(long)]
    keep_payloads: bool,
}
