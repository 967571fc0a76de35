use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inifile::{Ini, ReadOptions, WriteOptions};

#[derive(Debug, Parser)]
#[command(version, about = "Read and update INI files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every section and its properties.
    Show {
        path: PathBuf,
        /// Also print sections without properties.
        #[arg(long)]
        keep_empty: bool,
    },
    /// Set a single property, creating the section if needed.
    Set {
        path: PathBuf,
        section: String,
        key: String,
        value: String,
        /// Write `key = value` instead of `key=value`.
        #[arg(long)]
        space: bool,
        /// Keep a copy of the previous contents next to the file.
        #[arg(long)]
        backup: bool,
        /// Create the file if it does not exist.
        #[arg(long)]
        create: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Show { path, keep_empty } => {
            let sections = Ini::open(&path)
                .read_with(ReadOptions {
                    ignore_empty_sections: !keep_empty,
                })
                .with_context(|| format!("failed to read {}", path.display()))?;

            let mut names = sections.keys().collect::<Vec<_>>();
            names.sort();

            for name in names {
                println!("[{name}]");

                let mut properties = sections[name].iter().collect::<Vec<_>>();
                properties.sort();

                for (key, value) in properties {
                    println!("{key} = \"{value}\"");
                }

                println!();
            }
        }
        Command::Set {
            path,
            section,
            key,
            value,
            space,
            backup,
            create,
        } => {
            let ini = if create {
                Ini::open_or_create(&path)?
            } else {
                Ini::open(&path)
            };

            ini.with_write_options(WriteOptions {
                add_space: space,
                keep_backup: backup,
            })
            .write_property(&section, &key, &value)
            .with_context(|| format!("failed to update {}", path.display()))?;
        }
    }

    Ok(())
}
