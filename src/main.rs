// ABOUTME: Entry point for the berth CLI application.
// ABOUTME: Loads state, applies command-line overrides and prints translated parameters.

mod cli;

use berth::api;
use berth::config::{StateFile, merge_maps, yaml_to_json};
use berth::error::{Error, Result};
use berth::translate::{
    Container, Network, RawInput, SkipTranslate, TranslateOptions, translate_input,
};
use clap::Parser;
use cli::{Cli, Commands, TranslateArgs};
use serde_json::Value;
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let rendered = match cli.command {
        Commands::Container { args } => {
            let (input, options) = gather(&args, |state| &state.container)?;
            let output = translate_input(Container, input, &options)?;
            if args.bollard {
                serde_json::to_string_pretty(&api::container_config(&output)?)?
            } else {
                serde_json::to_string_pretty(&output)?
            }
        }
        Commands::Network { name, args } => {
            let (input, options) = gather(&args, |state| &state.network)?;
            let output = translate_input(Network, input, &options)?;
            if args.bollard {
                let name = name.ok_or_else(|| {
                    Error::InvalidArgument("--bollard requires --name for networks".to_string())
                })?;
                serde_json::to_string_pretty(&api::network_request(&name, &output)?)?
            } else {
                serde_json::to_string_pretty(&output)?
            }
        }
    };
    println!("{rendered}");
    Ok(())
}

/// Combine state-file fields with command-line fields and options.
fn gather(
    args: &TranslateArgs,
    section: impl Fn(&StateFile) -> &RawInput,
) -> Result<(RawInput, TranslateOptions)> {
    let state = load_state(args)?;
    let mut input = section(&state).clone();
    merge_maps(&mut input, parse_fields(&args.fields)?);

    let mut options = state.translate_options();
    if args.no_validate_ip {
        options.validate_ip_addrs = false;
    }
    if args.ignore_collisions {
        options.ignore_collisions = true;
    }
    if args.skip_all {
        options.skip_translate = SkipTranslate::All;
    } else if let Some(names) = &args.skip_translate {
        options.skip_translate = SkipTranslate::parse(names);
    }
    if let Some(version) = &args.api_version {
        let version = version
            .parse()
            .map_err(|e| Error::InvalidArgument(format!("{e}")))?;
        options = options.api_version(version);
    }

    debug!(fields = input.len(), ?options, "gathered input");
    Ok((input, options))
}

fn load_state(args: &TranslateArgs) -> Result<StateFile> {
    let state = match &args.file {
        Some(path) => StateFile::load(path)?,
        None => {
            let cwd = env::current_dir()?;
            match StateFile::discover(&cwd) {
                Ok(state) => state,
                Err(Error::ConfigNotFound(_)) if args.profile.is_none() => StateFile::default(),
                Err(e) => return Err(e),
            }
        }
    };

    match &args.profile {
        Some(profile) => state.for_profile(profile),
        None => Ok(state),
    }
}

/// Parse `key=value` arguments; values are YAML, or the literal text if that fails.
fn parse_fields(fields: &[String]) -> Result<RawInput> {
    let mut input = RawInput::new();
    for field in fields {
        let (key, value) = field.split_once('=').ok_or_else(|| {
            Error::InvalidArgument(format!("'{field}' is not a key=value pair"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidArgument(format!("'{field}' has an empty key")));
        }
        input.insert(key.to_string(), parse_value(value));
    }
    Ok(input)
}

fn parse_value(value: &str) -> Value {
    if value.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(value) {
        Ok(yaml) => yaml_to_json(yaml),
        Err(_) => Value::String(value.to_string()),
    }
}
