//! Command-line parsing.

use std::path::PathBuf;

pub const USAGE: &str = "\
usage: irss [-v|--verbose] <command>

commands:
  run <name|file> [--dry-run] [--set NAME=VALUE]... [--max-steps N]
  list
  show <name|file> [--json]
  kinds
  mappings [file]
  girder [plugin] [--open]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cli {
    Run {
        target: String,
        dry_run: bool,
        vars: Vec<(String, String)>,
        max_steps: Option<usize>,
    },
    List,
    Show {
        target: String,
        json: bool,
    },
    Kinds,
    Mappings {
        file: Option<PathBuf>,
    },
    Girder {
        plugin: Option<PathBuf>,
        open: bool,
    },
    Help,
}

/// Parse everything after the program name.
pub fn parse(args: &[String]) -> Result<Cli, String> {
    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| *a != "-v" && *a != "--verbose")
        .collect();

    let Some((&command, rest)) = args.split_first() else {
        return Ok(Cli::Help);
    };

    match command {
        "run" => parse_run(rest),
        "list" => Ok(Cli::List),
        "show" => {
            let json = rest.contains(&"--json");
            let target = positional(rest).ok_or("show: missing macro name")?;
            Ok(Cli::Show { target, json })
        }
        "kinds" => Ok(Cli::Kinds),
        "mappings" => Ok(Cli::Mappings {
            file: positional(rest).map(PathBuf::from),
        }),
        "girder" => Ok(Cli::Girder {
            plugin: positional(rest).map(PathBuf::from),
            open: rest.contains(&"--open"),
        }),
        "help" | "-h" | "--help" => Ok(Cli::Help),
        other => Err(format!("unknown command \"{}\"", other)),
    }
}

fn positional(args: &[&str]) -> Option<String> {
    args.iter().find(|a| !a.starts_with("--")).map(|a| a.to_string())
}

fn parse_run(args: &[&str]) -> Result<Cli, String> {
    let mut target = None;
    let mut dry_run = false;
    let mut vars = Vec::new();
    let mut max_steps = None;

    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        match arg {
            "--dry-run" => dry_run = true,
            "--set" => {
                let pair = iter.next().ok_or("--set needs NAME=VALUE")?;
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("--set {}: expected NAME=VALUE", pair))?;
                vars.push((name.to_string(), value.to_string()));
            }
            "--max-steps" => {
                let n = iter.next().ok_or("--max-steps needs a number")?;
                max_steps = Some(n.parse().map_err(|_| format!("--max-steps {}: not a number", n))?);
            }
            flag if flag.starts_with("--") => return Err(format!("run: unknown option {}", flag)),
            name if target.is_none() => target = Some(name.to_string()),
            extra => return Err(format!("run: unexpected argument \"{}\"", extra)),
        }
    }

    Ok(Cli::Run {
        target: target.ok_or("run: missing macro name")?,
        dry_run,
        vars,
        max_steps,
    })
}
