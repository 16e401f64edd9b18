/// A resolved playable reference: a file path or stream URL the daemon can
/// play directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub file: String,
}

impl Track {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}
