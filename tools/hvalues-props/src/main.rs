// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use anyhow::Context;
use clap::{Parser, Subcommand};
use hvalues::FlatMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hvalues-props")]
#[command(about = "Inspect and normalize flat properties files")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of a properties file
    Show {
        /// Input properties file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only keys starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,
    },

    /// Print the value of one key
    Get {
        /// Input properties file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Key to look up
        key: String,
    },

    /// Rewrite a properties file with canonical separators and escapes
    Normalize {
        /// Input properties file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only keys starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Remove the prefix from the written keys
        #[arg(long)]
        strip: bool,

        /// Sort keys instead of keeping file order
        #[arg(long)]
        sort: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::Show { input, prefix } => cmd_show(&input, &prefix),
        Commands::Get { input, key } => cmd_get(&input, &key),
        Commands::Normalize {
            input,
            output,
            prefix,
            strip,
            sort,
        } => cmd_normalize(&input, output.as_deref(), &prefix, strip, sort),
    }
}

fn read(input: &Path) -> anyhow::Result<FlatMap> {
    hvalues_properties::read_file(input)
        .with_context(|| format!("failed to read {}", input.display()))
}

fn select(store: &FlatMap, prefix: &str, strip: bool) -> FlatMap {
    if strip {
        store.strip_prefix(prefix)
    } else {
        store.iter().filter(|(k, _)| k.starts_with(prefix)).collect()
    }
}

fn sorted(store: &FlatMap) -> FlatMap {
    let mut entries: Vec<(&str, &str)> = store.iter().collect();
    entries.sort_unstable_by_key(|(k, _)| *k);
    entries.into_iter().collect()
}

fn cmd_show(input: &Path, prefix: &str) -> anyhow::Result<()> {
    let store = read(input)?;
    let selected = select(&store, prefix, false);
    let width = selected.keys().map(str::len).max().unwrap_or(0);
    for (key, value) in selected.iter() {
        println!("{:<width$} = {}", key, value, width = width);
    }
    log::info!(
        "[props] {} of {} entries under '{}'",
        selected.len(),
        store.len(),
        prefix
    );
    Ok(())
}

fn cmd_get(input: &Path, key: &str) -> anyhow::Result<()> {
    let store = read(input)?;
    let value = store
        .get(key)
        .with_context(|| format!("key '{}' not found in {}", key, input.display()))?;
    println!("{}", value);
    Ok(())
}

fn cmd_normalize(
    input: &Path,
    output: Option<&Path>,
    prefix: &str,
    strip: bool,
    sort: bool,
) -> anyhow::Result<()> {
    let store = read(input)?;
    let selected = select(&store, prefix, strip);
    let selected = if sort { sorted(&selected) } else { selected };

    match output {
        Some(path) => {
            hvalues_properties::write_file(path, &selected, None)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!(
                "[props] wrote {} entries to {}",
                selected.len(),
                path.display()
            );
        }
        None => hvalues_properties::format::write(&selected, None, io::stdout().lock())?,
    }
    Ok(())
}
