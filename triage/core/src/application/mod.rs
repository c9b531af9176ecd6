// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod clock;
pub mod intake;
pub mod learning;
pub mod monitor;
pub mod policy;
pub mod scheduler;

// Re-export the service types for convenience
pub use intake::{IntakeError, TriagePipeline, TriageReport};
pub use learning::{CaseSummary, LearningEntry, LearningStore, Outcome, PatternStats};
pub use monitor::{CaseMonitor, CaseReport, MonitorError};
pub use policy::FollowUpPolicyEngine;
pub use scheduler::MonitorScheduler;
