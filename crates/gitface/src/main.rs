// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitface: browse git history as structured commit records
//!
//! Logs go to stderr so stdout carries only command output.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use gitface::config::Config;
use gitface::handlers;
use gitface_git::GitRepo;
use tracing::debug;

fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let root = config.repository_path();
    debug!(repository = %root.display(), "Opening repository");
    let repo = GitRepo::with_options(&root, config.repo_options())
        .with_context(|| format!("Failed to open repository at {}", root.display()))?;

    let command = config.command_or_default();
    let output = handlers::run(&repo, &command).context("Command failed")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to flush output")?;
    Ok(())
}
