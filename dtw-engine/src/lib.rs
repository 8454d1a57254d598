//! Interpolation and zonal-aggregation engines.
//!
//! Both engines are trait seams so the pipeline can run against any
//! implementation. The bundled implementations are deliberately simple
//! and deterministic: an inverse-distance-weighted surface interpolator
//! standing in for the geostatistical engine, and a cell-center zonal
//! aggregator.

pub mod interpolate;
pub mod zonal;

pub use interpolate::{IdwInterpolator, SurfaceInterpolator};
pub use zonal::{CellCenterAggregator, ZonalAggregator};

use thiserror::Error;

/// Errors raised by the engines.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no observation points to interpolate")]
    EmptyPointSet,
    #[error("degenerate extent: {0}")]
    DegenerateExtent(String),
}
