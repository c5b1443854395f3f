//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application hosting the overlay, plus the per-frame orchestration that
//! turns a presentation target into acquired, recorded and presented frames.

mod app;
mod ctx;
mod orchestrator;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SetupCtx, WindowCtx};
pub use orchestrator::{FrameError, FrameOrchestrator, FrameOutcome, PresentTarget, SkipReason};
