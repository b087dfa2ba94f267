//! Allocation Guidance
//!
//! The deterministic core of the research pipeline. Subagents and synthesis
//! produce prose; this module alone decides the weekly action bias and
//! allocation percentage. The pipeline is:
//!
//! ```text
//! SignalSnapshot
//!     │
//!     ├── classify_structure ──┐
//!     ├── classify_momentum ───┼── decide_bias ── data-completeness
//!     └── support_breached ────┘                  downgrade
//!                                                     │
//!                     why / invalidation / next-check bullets
//!                                                     │
//!                                        AllocationGuidance ── markdown
//! ```

pub mod bias;
pub mod classify;
pub mod engine;
pub mod rationale;
pub mod signals;

pub use bias::{decide_bias, ActionBias};
pub use classify::{
    classify_momentum, classify_structure, support_breached, MomentumState, StructureState,
};
pub use engine::{derive_guidance, render_guidance, AllocationGuidance};
pub use rationale::{
    format_usd, invalidation_bullets, next_check_bullets, why_bullets, MAX_INVALIDATION_BULLETS,
    MAX_NEXT_CHECK_BULLETS, MAX_WHY_BULLETS,
};
pub use signals::{SignalSnapshot, VolumeStatus};
