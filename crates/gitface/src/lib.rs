// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitface library
//!
//! Command-line configuration and subcommand handlers, exported for use in
//! integration tests.

pub mod config;
pub mod handlers;
