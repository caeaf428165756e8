/// Convenience result type used across chartreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Animation speed, frame count, or other job parameters cannot be satisfied.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The chart kind cannot be drawn from the selected column types.
    #[error("incompatible chart spec: {0}")]
    IncompatibleChartSpec(String),

    /// A single frame could not be drawn.
    #[error("frame {index} failed to render: {reason}")]
    FrameRenderFailure {
        /// Index of the descriptor that triggered the failure.
        index: u64,
        /// Human-readable cause.
        reason: String,
    },

    /// The branding overlay could not be composited (non-fatal).
    #[error("branding apply failure: {0}")]
    BrandingApplyFailure(String),

    /// Narration audio could not be produced (non-fatal).
    #[error("narration synthesis failure: {0}")]
    NarrationSynthesisFailure(String),

    /// The external encoder failed or the output could not be committed.
    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    /// The job was cancelled by the caller.
    #[error("job cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable, data-free classification of a [`ReelError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ReelError::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`ReelError::IncompatibleChartSpec`].
    IncompatibleChartSpec,
    /// See [`ReelError::FrameRenderFailure`].
    FrameRenderFailure,
    /// See [`ReelError::BrandingApplyFailure`].
    BrandingApplyFailure,
    /// See [`ReelError::NarrationSynthesisFailure`].
    NarrationSynthesisFailure,
    /// See [`ReelError::EncodingFailure`].
    EncodingFailure,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    /// Build a [`ReelError::InvalidConfiguration`] value.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`ReelError::IncompatibleChartSpec`] value.
    pub fn incompatible_chart(msg: impl Into<String>) -> Self {
        Self::IncompatibleChartSpec(msg.into())
    }

    /// Build a [`ReelError::FrameRenderFailure`] value.
    pub fn frame_render(index: u64, reason: impl Into<String>) -> Self {
        Self::FrameRenderFailure {
            index,
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::BrandingApplyFailure`] value.
    pub fn branding(msg: impl Into<String>) -> Self {
        Self::BrandingApplyFailure(msg.into())
    }

    /// Build a [`ReelError::NarrationSynthesisFailure`] value.
    pub fn narration(msg: impl Into<String>) -> Self {
        Self::NarrationSynthesisFailure(msg.into())
    }

    /// Build a [`ReelError::EncodingFailure`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingFailure(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Self::IncompatibleChartSpec(_) => ErrorKind::IncompatibleChartSpec,
            Self::FrameRenderFailure { .. } => ErrorKind::FrameRenderFailure,
            Self::BrandingApplyFailure(_) => ErrorKind::BrandingApplyFailure,
            Self::NarrationSynthesisFailure(_) => ErrorKind::NarrationSynthesisFailure,
            Self::EncodingFailure(_) => ErrorKind::EncodingFailure,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
