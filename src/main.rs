#[macro_use]
extern crate log;

mod logger;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use cmdflags::config::{register_demo_group, Config};
use cmdflags::describe;
use cmdflags::manager::{self, FlagGroupManager};
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use failure::{format_err, Error};
use structopt::StructOpt;

type Result<I> = std::result::Result<I, Error>;

#[derive(Debug, StructOpt)]
#[structopt(name = "cmdflags", about = "Parses and completes command flags.")]
struct Opt {
    /// Flag groups to load instead of the built-in `demo` group.
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config: Option<PathBuf>,
    /// off, error, warn, info, debug or trace.
    #[structopt(long = "log-level")]
    log_level: Option<log::LevelFilter>,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Parses arguments given after `--` and prints every flag's value.
    #[structopt(name = "parse")]
    Parse {
        group: String,
        #[structopt(last = true)]
        args: Vec<String>,
    },
    /// Prints what may follow the arguments given after `--`. The last
    /// argument is the word being typed; pass '' to complete a new word.
    #[structopt(name = "suggest")]
    Suggest {
        group: String,
        #[structopt(last = true)]
        args: Vec<String>,
    },
    /// Lists the registered groups and their flags.
    #[structopt(name = "groups")]
    Groups,
}

fn load_groups(manager: &FlagGroupManager, config: Option<&PathBuf>) -> Result<()> {
    match config {
        Some(path) => {
            info!("loading flag groups from {}", path.display());
            Config::load(path)?.register_all(manager)?;
        }
        None => register_demo_group(manager)?,
    }
    Ok(())
}

fn parse_command(manager: &FlagGroupManager, name: &str, args: &[String]) -> Result<()> {
    let group = manager
        .group_for(name)
        .ok_or_else(|| format_err!("no flag group named `{}'", name))?;
    let result = group.parse(args)?;
    for entry in result.iter() {
        println!("{} = {} ({})", entry.info.identifier, entry.value, entry.source);
    }
    Ok(())
}

fn groups_command(manager: &FlagGroupManager) {
    for name in manager.group_names() {
        println!("{}", name);
        if let Some(group) = manager.group_for(&name) {
            for flag in group.flags() {
                let aliases = if flag.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", flag.aliases.join(", "))
                };
                println!("    {}{}: {}, {}", flag.identifier, aliases, flag.name, flag.variant);
            }
        }
    }
}

fn run(opt: Opt) -> Result<()> {
    let manager = manager::global();
    load_groups(manager, opt.config.as_ref())?;

    match opt.command {
        Command::Parse { group, args } => parse_command(manager, &group, &args)?,
        Command::Suggest { group, args } => {
            for suggestion in manager.complete(&group, &args) {
                println!("{}", suggestion);
            }
        }
        Command::Groups => groups_command(manager),
    }
    Ok(())
}

/// Prints `err` and each of its causes on one line to stderr.
fn report(err: &Error) {
    let message = describe(err);
    error!("{}", message);
    if std::io::stderr().is_terminal() {
        eprintln!(
            "{}{}cmdflags:{} {}",
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Yellow),
            SetAttribute(Attribute::Reset),
            message
        );
    } else {
        eprintln!("cmdflags: {}", message);
    }
}

fn main() {
    let opt = Opt::from_args();
    if let Err(err) = logger::install_logger("cmdflags", opt.log_level) {
        report(&err.context("failed to set up logging").into());
    }

    trace!("opt: {:?}", opt);
    if let Err(err) = run(opt) {
        report(&err);
        process::exit(1);
    }
}
