// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   deploy, auth, detect, config (options)
//! ```

pub mod auth;
pub mod config;
pub mod deploy;
pub mod detect;
