// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `stream-infer inspect` command: validate a configuration and print the
//! resolved port layout.

use runtime::StreamEngine;
use std::path::PathBuf;

pub async fn execute(config: PathBuf, signature: Option<PathBuf>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           stream-infer · Config Inspector            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let (config, signature) = super::load(&config, signature.as_deref())?;
    let engine = StreamEngine::new(config.clone(), &signature)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Engine:          {}", config.name);
    println!("  Model:           {}", signature.name);
    println!("  Batch size:      {}", config.batch_size);
    println!("  Batch dimension: {}", if config.add_batch_dim { "synthetic" } else { "none" });
    println!("  Missing inputs:  {:?}", config.missing_input);
    println!("  Throttle:        {}", config.throttle_limit());
    println!();

    // ── Ports ──────────────────────────────────────────────────
    println!("  {:<4} {:<24} {:<10} {}", "Dir", "Tag", "Role", "Tensor");
    println!("  {}", "-".repeat(64));
    let recurrent = engine.recurrent();
    for tag in &config.inputs {
        let role = if recurrent.is_feed(tag) { "feed" } else { "data" };
        println!(
            "  {:<4} {:<24} {:<10} {}",
            "in",
            tag.as_str(),
            role,
            signature.tensor_name(tag).unwrap_or("-"),
        );
    }
    for tag in engine.requested_outputs() {
        let role = if config.outputs.contains(tag) { "emitted" } else { "fetch" };
        println!(
            "  {:<4} {:<24} {:<10} {}",
            "out",
            tag.as_str(),
            role,
            signature.tensor_name(tag).unwrap_or("-"),
        );
    }
    println!();

    if !recurrent.is_empty() {
        println!("  Recurrent bindings:");
        for binding in recurrent.bindings() {
            println!("   {binding}");
        }
        println!();
    }

    println!("  Configuration is valid.");
    Ok(())
}
