// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod analyze;
pub mod config;
pub mod serve;

pub use analyze::AnalyzeArgs;
pub use config::ConfigCommand;
