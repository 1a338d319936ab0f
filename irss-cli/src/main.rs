mod args;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use irss_core::config::Config;
use irss_core::girder::{GirderPlugin, VariableListHost};
use irss_core::host::{DryRunHost, Host, SystemHost};
use irss_core::mappings::MultiMappings;
use irss_core::persistence::read_macro;
use irss_core::processor::{commands_by_category, Processor};
use irss_core::{paths, MacroLibrary};
use irss_types::{Macro, VariableList};

use args::Cli;

type CliResult = Result<(), Box<dyn Error>>;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = paths::log_file();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path).unwrap_or_else(|_| {
        File::create(std::env::temp_dir().join("irss.log")).expect("Cannot create log file")
    });

    WriteLogger::init(log_level, simplelog::Config::default(), log_file)
        .expect("Failed to initialize logger");

    log::info!("irss starting (log level: {:?})", log_level);
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let verbose = argv.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let cli = match args::parse(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("irss: {}\n\n{}", e, args::USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli, &Config::load()) {
        log::error!("{}", e);
        eprintln!("irss: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> CliResult {
    let library = MacroLibrary::new(config.macro_folder());
    match cli {
        Cli::Run { target, dry_run, vars, max_steps } => {
            run_macro(&library, config, &target, dry_run, &vars, max_steps)
        }
        Cli::List => {
            log::debug!(target: "cli", "listing {}", library.folder().display());
            for name in library.list()? {
                println!("{}", name);
            }
            Ok(())
        }
        Cli::Show { target, json } => show_macro(&library, &target, json),
        Cli::Kinds => {
            for (category, kinds) in commands_by_category() {
                println!("{}", category);
                for kind in kinds {
                    println!("  {:<22} {}", kind.xml_tag(), kind.parameter_names().join(", "));
                }
            }
            Ok(())
        }
        Cli::Mappings { file } => {
            let file = file.unwrap_or_else(|| config.mappings_file());
            let mappings = MultiMappings::load(&file);
            println!("{} (version {})", file.display(), mappings.version());
            for name in mappings.iter() {
                println!("  {}", name);
            }
            Ok(())
        }
        Cli::Girder { plugin, open } => {
            let plugin = plugin
                .or_else(|| config.girder_plugin().map(Path::to_path_buf))
                .ok_or("no girder plugin given and none configured")?;
            inspect_girder(&plugin, open)
        }
        Cli::Help => {
            println!("{}", args::USAGE);
            Ok(())
        }
    }
}

/// A name from the library, or a path to a macro file.
fn resolve_macro(library: &MacroLibrary, target: &str) -> Result<Macro, Box<dyn Error>> {
    let path = PathBuf::from(target);
    if path.is_file() {
        return Ok(read_macro(&path)?);
    }
    Ok(library.load(target)?)
}

fn run_macro(
    library: &MacroLibrary,
    config: &Config,
    target: &str,
    dry_run: bool,
    assignments: &[(String, String)],
    max_steps: Option<usize>,
) -> CliResult {
    let mac = resolve_macro(library, target)?;
    for (index, label) in mac.unresolved_gotos() {
        eprintln!("warning: step {} jumps to missing label \"{}\"", index, label);
    }

    let mut processor = Processor::from_config(config);
    if let Some(n) = max_steps {
        processor = processor.with_max_steps(n);
    }

    let mut vars = VariableList::new();
    for (name, value) in assignments {
        vars.set(name, value.as_str());
    }

    let mut dry_host = DryRunHost::new();
    let mut system_host = SystemHost::new();
    let host: &mut dyn Host = if dry_run { &mut dry_host } else { &mut system_host };

    let summary = processor.run(&mac, &mut vars, host)?;

    if dry_run {
        for effect in &dry_host.applied {
            println!("{}", serde_json::to_string(effect)?);
        }
    }
    println!(
        "{}: {} steps, {} effects, {} skipped",
        mac.name, summary.steps, summary.effects, summary.skipped
    );
    for (name, value) in vars.iter() {
        println!("  {} = {}", name, value);
    }
    Ok(())
}

fn show_macro(library: &MacroLibrary, target: &str, json: bool) -> CliResult {
    let mac = resolve_macro(library, target)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&mac)?);
        return Ok(());
    }
    println!("{}", mac.name);
    for (i, cmd) in mac.iter().enumerate() {
        println!("{:>4}  {:<20} {}", i, cmd.category(), cmd.display_text());
    }
    Ok(())
}

fn inspect_girder(path: &Path, open: bool) -> CliResult {
    let mut plugin = GirderPlugin::load(path)?;
    println!("name:          {}", plugin.name());
    println!("version:       {}", plugin.version());
    println!("description:   {}", plugin.description());
    println!("devices:       {}", plugin.device_count());
    println!("requested API: {}", plugin.requested_api());
    println!("configurable:  {}", plugin.can_configure());

    if open {
        let vars = Arc::new(Mutex::new(VariableList::new()));
        plugin.set_host(Box::new(VariableListHost::new(Arc::clone(&vars))));
        let opened = plugin.open()?;
        println!("open:          {}", opened);
        if opened {
            println!("start:         {}", plugin.start()?);
            if plugin.state() == irss_core::girder::PluginState::Started {
                println!("stop:          {}", plugin.stop()?);
            }
            println!("close:         {}", plugin.close()?);
        }
    }
    Ok(())
}
