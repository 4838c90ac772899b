//! Error kinds surfaced to the host.

use std::fmt;
use std::path::PathBuf;

/// Failure to fetch or decode a model asset
#[derive(Debug)]
pub enum LoadError {
    /// The asset file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The bytes are not a valid glTF / GLB document.
    Gltf(gltf::Error),
    /// The document parsed but its contents are unusable.
    InvalidAsset(String),
    /// The load was cancelled before it completed.
    Cancelled,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "could not read {}: {source}", path.display()),
            Self::Gltf(e) => write!(f, "could not parse model: {e}"),
            Self::InvalidAsset(msg) => write!(f, "invalid model: {msg}"),
            Self::Cancelled => write!(f, "load cancelled"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Gltf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf::Error> for LoadError {
    fn from(e: gltf::Error) -> Self {
        Self::Gltf(e)
    }
}

/// Errors produced by the viewer
#[derive(Debug)]
pub enum ViewerError {
    /// Asset missing or corrupt.
    Load(LoadError),
    /// The model's bounds have zero or non-finite extent.
    DegenerateGeometry { max_dimension: f32 },
    /// Window or render surface initialization failed.
    Setup(String),
    /// Configuration file unreadable or out of range.
    Config(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "{e}"),
            Self::DegenerateGeometry { max_dimension } => {
                write!(f, "model has degenerate geometry (largest extent {max_dimension})")
            }
            Self::Setup(msg) => write!(f, "setup failed: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for ViewerError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_message_mentions_extent() {
        let e = ViewerError::DegenerateGeometry { max_dimension: 0.0 };
        assert!(e.to_string().contains("degenerate"));
    }

    #[test]
    fn test_load_error_converts() {
        let e: ViewerError = LoadError::InvalidAsset("no scene".into()).into();
        assert!(matches!(e, ViewerError::Load(LoadError::InvalidAsset(_))));
        assert_eq!(e.to_string(), "invalid model: no scene");
    }

    #[test]
    fn test_io_error_has_source() {
        let e = LoadError::Io {
            path: PathBuf::from("Boy.glb"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("Boy.glb"));
    }
}
