// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 nightbuild contributors

//! Pipeline sequencing and state
//!
//! The controller owns the stage order and the failure-handling rules;
//! state, events, and capability checks are its supporting types.

pub mod capability;
mod controller;
mod events;
mod state;

pub use capability::Capability;
pub use controller::{PipelineController, RunOutcome};
pub use events::{EventLog, Outcome, StageEvent};
pub use state::{PipelineState, RunDate, StageKind};
