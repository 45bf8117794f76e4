use std::process::ExitCode;

use clap::Parser;
use semver::Version;

use version_bump::boundary::{self, Disposition};
use version_bump::cli::{run_release_workflow, ReleaseContext, ReleaseWorkflowArgs};
use version_bump::config;
use version_bump::git::SystemGit;
use version_bump::store::{VersionFormat, VersionStore};
use version_bump::ui;

#[derive(clap::Parser)]
#[command(
    name = "version",
    about = "Read, bump, commit and tag the version stored in VERSION or version.ts"
)]
struct Args {
    #[arg(help = "One of: major, minor, patch, init, set, get")]
    action: Option<String>,

    #[arg(help = "Version for `set`, or the initial version for `init`")]
    params: Vec<String>,

    #[arg(long, conflicts_with = "txt", help = "Use version.ts (export const VERSION)")]
    ts: bool,

    #[arg(long, help = "Use the plain VERSION file")]
    txt: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Log every git command")]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(version) => {
            ui::display_version(&version);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match boundary::classify(err) {
            Disposition::Report {
                code,
                message,
                prefixed,
            } => {
                if prefixed {
                    ui::display_error(&message);
                } else {
                    ui::display_plain_error(&message);
                }
                Ok(ExitCode::from(code))
            }
            Disposition::Fatal(err) => Err(err.into()),
        },
    }
}

fn run(args: Args) -> version_bump::Result<Version> {
    let config = config::load_config(args.config.as_deref())?;
    let root = std::env::current_dir()?;

    let explicit = match (args.ts, args.txt) {
        (true, _) => Some(VersionFormat::Embedded),
        (_, true) => Some(VersionFormat::Plain),
        _ => None,
    };
    let format = VersionFormat::resolve(&root, explicit);
    log::debug!("using {} ({:?})", format.file_name(), format);

    let store = VersionStore::new(&root, format);
    let runner = SystemGit::new(&root, &config.git);
    let ctx = ReleaseContext {
        store: &store,
        runner: &runner,
        tag: &config.tag,
    };

    let workflow_args = ReleaseWorkflowArgs {
        action: args.action,
        params: args.params,
    };

    run_release_workflow(&workflow_args, &ctx)
}
