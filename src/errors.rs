//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`SpecterError`] covers the failure modes that can reach
//! the host application:
//! - GPU initialization failures
//! - Missing rendering surface at mount time
//! - Configuration parsing and validation
//! - External scene asset failures
//!
//! Pool exhaustion, unresolved animation targets and lifecycle misuse are
//! not errors; those paths degrade to no-ops.
//!
//! # Usage
//!
//! ```rust,ignore
//! use specter::errors::Result;
//!
//! fn load() -> Result<SceneConfig> {
//!     SceneConfig::from_json_str(r#"{ "follow_speed": 0.1 }"#)
//! }
//! ```

use thiserror::Error;

/// The main error type for the Specter engine.
#[derive(Error, Debug)]
pub enum SpecterError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// The host has no rendering surface to attach to.
    #[error("No rendering surface available: {0}")]
    SurfaceUnavailable(String),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration value is outside its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The supplied scene asset contains nothing to display.
    #[error("Model appears to be empty or corrupted")]
    AssetEmpty,

    /// The model failed to load. The model slot is terminal after this.
    #[error("Failed to load 3D model: {0}")]
    AssetFailed(String),

    /// The viewport was torn down before the call.
    #[error("Viewport is no longer mounted")]
    Unmounted,

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image encoding error.
    #[error("Image error: {0}")]
    ImageError(String),
}

impl From<image::ImageError> for SpecterError {
    fn from(err: image::ImageError) -> Self {
        SpecterError::ImageError(err.to_string())
    }
}

/// Alias for `Result<T, SpecterError>`.
pub type Result<T> = std::result::Result<T, SpecterError>;
