//! Montage Export - deterministic timeline rendering
//!
//! Compiles a Project + Media Registry + output configuration into a
//! declarative composition program — a blank/silent base layer spanning
//! the full project duration, with every clip composited as a
//! time-windowed overlay or mix contribution — and drives one external
//! FFmpeg process to materialize it, with pre/post-flight validation,
//! progress parsing, and cancellation.
//!
//! The program is a typed filter IR ([`filter::FilterGraph`]) validated
//! before serialization, so synthesis is unit-testable without an encoder.

pub mod filter;
pub mod plan;
pub mod preflight;
pub mod progress;
pub mod renderer;
pub mod settings;

pub use filter::{FilterChain, FilterGraph, FilterOp};
pub use plan::{synthesize, ExportPlan, PlanInput};
pub use progress::{ExportProgress, ProgressParser};
pub use renderer::{CancelHandle, ExportEvent, ExportJob, ExportRenderer};
pub use settings::{ExportSettings, ResolutionClass};
