//! Privacy mask application across the camera fleet.
//!
//! The [`MaskApplier`] trait is the seam between the decision engine
//! and the per-camera HTTP calls; the production implementation lives
//! in [`http`].

pub mod http;

pub use http::HttpMaskApplier;

use crate::inventory::Camera;
use async_trait::async_trait;

/// Outcome of applying one mask state to one camera.
#[derive(Debug, Clone)]
pub struct CameraResult {
    pub camera: Camera,
    pub ok: bool,
    /// Failure description when `ok` is false.
    pub detail: Option<String>,
}

/// Applies a mask state to a camera set, best effort.
///
/// A failing camera or region never aborts the fan-out; every camera
/// in the input appears in the output exactly once.
#[async_trait]
pub trait MaskApplier: Send + Sync {
    async fn apply(&self, cameras: &[Camera], masked: bool) -> Vec<CameraResult>;
}
