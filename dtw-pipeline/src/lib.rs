//! The per-year DTW processing pipeline.
//!
//! Two stages run per year: surface generation (observations to an
//! interpolated raster, persisted and archived) and zonal statistics
//! (raster aggregated over parcel zones into the cumulative table, with
//! CSV export and join-back). The driver expands the configured year set
//! and runs the stages sequentially per year.
//!
//! Destructive replacement of any named artifact goes through one shared
//! [`confirm::OverwriteDecision`] policy; the only automatically retried
//! failure is the workspace schema-lock class, bounded by
//! [`retry::with_schema_lock_retry`].

pub mod confirm;
pub mod driver;
pub mod error;
pub mod retry;
pub mod surface;
pub mod zonal;

pub use confirm::{AlwaysApprove, AlwaysDeny, OverwriteDecision, PromptDecision};
pub use driver::{DriverError, PipelineRunner, RunSummary};
pub use error::{PipelineError, Stage};
pub use surface::{generate_surface, SurfaceOutcome};
pub use zonal::{aggregate_zone_statistics, SkipReason, ZonalOutcome};
