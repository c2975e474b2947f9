use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use verbump::cli::{run_with_options, RunOptions};
use verbump::config::ConfigSource;
use verbump::domain::Mode;
use verbump::ui;

#[derive(clap::Parser)]
#[command(
    name = "verbump",
    about = "Bump pre-release versions, then commit, tag, push and publish",
    version
)]
struct Args {
    #[arg(value_enum, default_value_t = ModeArg::Bump, help = "What to do with the version")]
    mode: ModeArg,

    #[arg(short = 'm', long, help = "Commit message (default: dated 'version bump')")]
    comment: Option<String>,

    #[arg(long = "pre", alias = "tag", value_name = "TAG", help = "Pre-release tag for this run")]
    pre: Option<String>,

    #[arg(short, long, help = "Configuration file, or a directory containing one")]
    config: Option<PathBuf>,

    #[arg(long, help = "Do not publish, whatever the configuration says")]
    no_publish: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, help = "Show debug output")]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    #[value(help = "Advance the pre-release: x.y.z -> x.y.(z+1)-<tag>.1, -<tag>.n -> -<tag>.(n+1)")]
    Bump,
    #[value(help = "Strip the pre-release suffix and tag v<version>")]
    Release,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Bump => Mode::Advance,
            ModeArg::Release => Mode::Finalize,
        }
    }
}

fn main() {
    let code = match try_main() {
        Ok(code) => code,
        Err(err) => {
            ui::display_error(&format!("{:#}", err));
            1
        }
    };
    std::process::exit(code);
}

fn try_main() -> Result<i32> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            e.print()?;
            return Ok(code);
        }
    };

    init_logging(args.verbose);

    let source = args
        .config
        .map(ConfigSource::Path)
        .unwrap_or(ConfigSource::Discover);

    let options = RunOptions {
        mode: args.mode.into(),
        comment: args.comment,
        pre_release_tag: args.pre,
        publish: args.no_publish.then_some(false),
        dry_run: args.dry_run,
    };

    match run_with_options(source, &options) {
        Ok(report) => {
            ui::display_report(&report);
            Ok(report.exit_code())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            Ok(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
