/// Load / display status shown in the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerStatus {
    /// Load requested, nothing received yet
    Loading,
    /// Bytes arriving; percentage when the total size is known
    Progress(Option<u32>),
    Ready,
    Failed(String),
}

impl ViewerStatus {
    pub fn overlay_text(&self) -> Option<String> {
        match self {
            Self::Loading | Self::Progress(None) => Some("Loading 3D Model...".to_string()),
            Self::Progress(Some(percent)) => Some(format!("Loading... {percent}%")),
            Self::Ready => None,
            Self::Failed(message) => Some(format!("Error: {message}")),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}
