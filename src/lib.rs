// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          deploy / auth / detect
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, env, --set        |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!              deploy      scaffold   github
//!           orchestrator  runtime ->  REST client
//!           fetch / gate  smithery.   repos, git
//!           materialize   yaml        data API
//!           publish           |
//!                 |           |
//!                 +-----+-----+
//!                       v
//!                 net (tarball download)
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod deploy;
pub mod error;
pub mod github;
pub mod logging;
pub mod net;
pub mod scaffold;
pub mod utility;
