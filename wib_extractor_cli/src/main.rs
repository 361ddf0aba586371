//! # wib_extractor_cli
//!
//! Part of the wib_extractor crate family.
//!
//! Command line interface to extract a trigger record from a DAQ raw file.
//!
//! ## Use
//!
//! ```bash
//! wib_extractor_cli new -p config.yml     # write a template config
//! wib_extractor_cli list -p config.yml    # list the datasets of the raw file
//! wib_extractor_cli -p config.yml         # extract the configured trigger record
//! ```
//!
//! `-t/--trigger` overrides the trigger number of the config, `-v/--verbose` enables
//! debug logging. Logs are also written to `./wib_extractor.log`.
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libwib_extractor::config::Config;
use libwib_extractor::daq_decoder::{DaqDecoder, FragmentSource};
use libwib_extractor::process::process;
use libwib_extractor::selector::select_fragment_datasets;

fn setup_logging(verbose: bool) -> Result<(), spdlog::Error> {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(PathBuf::from("./wib_extractor.log"))
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()?,
    );
    let level = if verbose {
        spdlog::LevelFilter::MoreSevereEqual(spdlog::Level::Debug)
    } else {
        spdlog::LevelFilter::MoreSevereEqual(spdlog::Level::Info)
    };
    let logger = Arc::new(
        spdlog::Logger::builder()
            .sinks(spdlog::default_logger().sinks().to_owned())
            .sink(file_sink)
            .level_filter(level)
            .flush_level_filter(spdlog::LevelFilter::All)
            .build()?,
    );
    spdlog::set_default_logger(logger);
    Ok(())
}

fn make_template_config(config_path: &Path) {
    spdlog::info!(
        "Making a template config at {}...",
        config_path.to_string_lossy()
    );
    match Config::default().write_config_file(config_path) {
        Ok(()) => spdlog::info!("Done."),
        Err(e) => spdlog::error!("{e}"),
    }
}

fn list_datasets(config: &Config) {
    let decoder = match DaqDecoder::new(&config.raw_file, config.max_trigger_records) {
        Ok(d) => d,
        Err(e) => {
            spdlog::error!("{e}");
            return;
        }
    };
    spdlog::info!("Trigger records: {:?}", decoder.get_trigger_numbers());
    let datasets = decoder.get_datasets();
    let selected = select_fragment_datasets(datasets, config.trigger_number);
    for path in datasets.iter() {
        let marker = if selected.contains(path) { "*" } else { " " };
        println!("{marker} {path}");
    }
    spdlog::info!(
        "{} datasets, {} selected for trigger record {}",
        datasets.len(),
        selected.len(),
        config.trigger_number
    );
}

fn main() {
    // Create a cli
    let matches = Command::new("wib_extractor_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(Command::new("list").about("List the datasets in the configured raw file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .global(true)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("trigger")
                .short('t')
                .long("trigger")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Trigger record number, overrides the configuration"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .get_matches();

    // Initialize feedback
    if let Err(e) = setup_logging(matches.get_flag("verbose")) {
        eprintln!("Could not create logging: {e}");
        return;
    }

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            spdlog::error!("A configuration path is required (-p/--path)");
            return;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        make_template_config(&config_path);
        return;
    }

    // Load our config
    spdlog::info!("Loading config from {}...", config_path.to_string_lossy());
    let mut config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            spdlog::error!("{e}");
            return;
        }
    };
    if let Some(trigger) = matches.get_one::<u64>("trigger") {
        config.trigger_number = *trigger;
    }
    spdlog::info!("Config successfully loaded.");
    spdlog::info!("Raw File: {}", config.raw_file.to_string_lossy());
    spdlog::info!("Trigger Record: {}", config.trigger_number);
    spdlog::info!("Max Trigger Records: {}", config.max_trigger_records);
    spdlog::info!("Geometry: {}", config.geometry);
    if let Some(map_path) = &config.channel_map_path {
        spdlog::info!("Channel Map Path: {}", map_path.to_string_lossy());
    }

    if let Some(("list", _)) = matches.subcommand() {
        list_datasets(&config);
        return;
    }

    match process(&config) {
        Ok(table) => {
            println!("{table}");
            spdlog::info!("Successfully extracted trigger record {}!", config.trigger_number);
        }
        Err(e) => spdlog::error!("Extraction failed with error: {e}"),
    }
}
