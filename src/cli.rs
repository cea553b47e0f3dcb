use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::markers::Pep508Environment;
use crate::{metadata, requires_for_build_sdist, requires_for_build_wheel};

#[derive(Parser)]
#[command(about = "Statically analyzes a pyproject-style build backend without running its build scripts")]
pub enum Cli {
    /// Prints the packages required to build an sdist, one per line
    RequiresForBuildSdist {
        /// Directory containing pyproject.toml/setup.cfg/setup.py
        path: PathBuf,
        #[clap(flatten)]
        markers: MarkerArgs,
    },
    /// Prints the packages required to build a wheel, one per line
    RequiresForBuildWheel {
        /// Directory containing pyproject.toml/setup.cfg/setup.py
        path: PathBuf,
        #[clap(flatten)]
        markers: MarkerArgs,
    },
    /// Prints the full metadata record as JSON
    Metadata {
        /// Directory containing pyproject.toml/setup.cfg/setup.py
        path: PathBuf,
    },
}

#[derive(clap::Args)]
pub struct MarkerArgs {
    /// Override a PEP 508 environment marker, e.g. `--marker sys_platform=win32`
    #[clap(long = "marker", value_parser = parse_marker_override)]
    markers: Vec<(String, String)>,
}

impl MarkerArgs {
    fn environment(&self) -> Pep508Environment {
        let overrides: BTreeMap<String, String> = self.markers.iter().cloned().collect();
        Pep508Environment::new(&overrides)
    }
}

fn parse_marker_override(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli {
        Cli::RequiresForBuildSdist { path, markers } => {
            let env = markers.environment();
            let requires = requires_for_build_sdist(&path, Some(&env))
                .with_context(|| format!("failed to analyze {}", path.display()))?;
            for requirement in requires {
                println!("{requirement}");
            }
        }
        Cli::RequiresForBuildWheel { path, markers } => {
            let env = markers.environment();
            let requires = requires_for_build_wheel(&path, Some(&env))
                .with_context(|| format!("failed to analyze {}", path.display()))?;
            for requirement in requires {
                println!("{requirement}");
            }
        }
        Cli::Metadata { path } => {
            let record = metadata(&path).with_context(|| format!("failed to analyze {}", path.display()))?;
            let json = serde_json::to_string_pretty(&record.as_dict())
                .context("failed to serialize metadata record")?;
            println!("{json}");
        }
    }
    Ok(())
}
