// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod inspect;
pub mod run;
mod synthetic;

use anyhow::Context;
use runtime::{ModelSignature, RuntimeConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the configuration and either the given signature or one built
/// from the configured tags.
pub(crate) fn load(
    config: &Path,
    signature: Option<&Path>,
) -> anyhow::Result<(RuntimeConfig, ModelSignature)> {
    let config = RuntimeConfig::from_file(config)
        .with_context(|| format!("loading config '{}'", config.display()))?;
    let signature = match signature {
        Some(path) => ModelSignature::from_file(path)
            .with_context(|| format!("loading signature '{}'", path.display()))?,
        None => {
            let bindings = config.recurrent_bindings()?;
            let tags = config
                .inputs
                .iter()
                .chain(&config.outputs)
                .chain(bindings.iter().flat_map(|b| [&b.feed, &b.fetch]))
                .cloned();
            ModelSignature::from_tags(config.name.clone(), tags)
        }
    };
    Ok((config, signature))
}

/// Parses `"2,3"` into `[2, 3]`.
pub(crate) fn parse_dims(dims: &str) -> anyhow::Result<Vec<usize>> {
    dims.split(',')
        .map(|d| {
            d.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid dimension '{d}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("2,3").unwrap(), vec![2, 3]);
        assert_eq!(parse_dims(" 4 ").unwrap(), vec![4]);
        assert!(parse_dims("2,x").is_err());
    }
}
