use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sizeguard_core::prelude::*;
use sizeguard_core::CorpusFilter;
use sizeguard_transcode::ImageTranscoder;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit code for runs that could not complete
const FATAL_EXIT_CODE: i32 = 2;

fn cli() -> Command {
    Command::new("sizeguard")
        .version(sizeguard_core::VERSION)
        .about("File-size regression harness for the image transcoder")
        .arg(
            Arg::new("image")
                .value_name("IMAGE")
                .help("Only process the corpus image with this exact file name"),
        )
        .arg(
            Arg::new("update-fixtures")
                .long("update-fixtures")
                .action(ArgAction::SetTrue)
                .help("Rewrite the baseline snapshot from this run"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Harness directory relative paths resolve against"),
        )
        .arg(
            Arg::new("corpus-dir")
                .long("corpus-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Corpus directory [default: images]"),
        )
        .arg(
            Arg::new("fixtures")
                .long("fixtures")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Baseline snapshot [default: fixtures.json]"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory transcoded artifacts are written to [default: output]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (repeatable)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
}

/// Split out `--flags` the command does not define
///
/// Unknown long flags are tolerated and ignored rather than rejected.
/// Everything after a bare `--` is kept as is.
fn tolerated_args(
    cmd: &Command,
    args: impl IntoIterator<Item = String>,
) -> (Vec<String>, Vec<String>) {
    let known: Vec<&str> = cmd
        .get_arguments()
        .filter_map(Arg::get_long)
        .chain(["help", "version"])
        .collect();

    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut positional_only = false;
    for arg in args {
        let unknown = !positional_only
            && arg.strip_prefix("--").is_some_and(|flag| {
                let name = flag.split_once('=').map_or(flag, |(name, _)| name);
                !name.is_empty() && !known.contains(&name)
            });
        if arg == "--" {
            positional_only = true;
        }
        if unknown {
            ignored.push(arg);
        } else {
            kept.push(arg);
        }
    }
    (kept, ignored)
}

/// Merge the optional config file with command-line overrides
fn load_config(args: &ArgMatches) -> anyhow::Result<HarnessConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarnessConfig::new(),
    };

    if let Some(root) = args.get_one::<PathBuf>("root") {
        config = config.with_root(root);
    }
    if let Some(dir) = args.get_one::<PathBuf>("corpus-dir") {
        config = config.with_corpus_dir(dir);
    }
    if let Some(path) = args.get_one::<PathBuf>("fixtures") {
        config = config.with_fixtures_path(path);
    }
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        config = config.with_output_dir(dir);
    }
    if args.get_flag("update-fixtures") {
        config = config.with_update_fixtures(true);
    }

    let filter = CorpusFilter::from_arg(args.get_one::<String>("image").map(String::as_str));
    Ok(config.with_filter(filter))
}

fn init_tracing(verbosity: u8, json: bool) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: &ArgMatches) -> anyhow::Result<ExitStatus> {
    let config = load_config(args)?;
    tracing::info!(
        root = %config.root.display(),
        update_fixtures = config.update_fixtures,
        filter = ?config.filter,
        "starting run"
    );

    let coordinator = RunCoordinator::new(config, Arc::new(ImageTranscoder::new()));
    let outcome = coordinator
        .run(&mut ConsoleOutput::console())
        .await
        .context("harness run failed")?;

    if !outcome.artifacts.is_complete() {
        tracing::warn!(
            failed = outcome.artifacts.failures.len(),
            "some artifacts could not be written"
        );
    }
    Ok(outcome.status)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cmd = cli();
    let (args, ignored) = tolerated_args(&cmd, std::env::args());
    let matches = cmd.get_matches_from(args);
    init_tracing(
        matches.get_count("verbose"),
        matches.get_flag("log-json"),
    );
    if !ignored.is_empty() {
        tracing::warn!(?ignored, "ignoring unknown flags");
    }

    let code = match run(&matches).await {
        Ok(status) => status.code(),
        Err(err) => {
            tracing::error!(error = %err, "fatal");
            eprintln!("Error: {err:#}");
            FATAL_EXIT_CODE
        }
    };

    std::process::exit(code);
}
