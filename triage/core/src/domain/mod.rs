// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides mod functionality for the system.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements mod

pub mod case;
pub mod clinical;
pub mod config;
pub mod document;
pub mod model;
pub mod notify;
pub mod report;
pub mod similarity;
