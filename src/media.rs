// Shared media types: categories, pick tokens, selections, playback state
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::MediaError;

/// Supported audio file extensions for the picker filter
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "aac", "opus", "wma"];

/// Supported video file extensions for the picker filter
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "webm", "mkv", "mov", "avi", "ogv"];

/// Which picker flow a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickKind {
    AudioPick,
    VideoPick,
}

impl PickKind {
    pub fn mime_filter(self) -> &'static str {
        match self {
            PickKind::AudioPick => "audio/*",
            PickKind::VideoPick => "video/*",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            PickKind::AudioPick => AUDIO_EXTENSIONS,
            PickKind::VideoPick => VIDEO_EXTENSIONS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PickKind::AudioPick => "Audio",
            PickKind::VideoPick => "Video",
        }
    }
}

/// Observable record of the picker flow currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPickType {
    #[default]
    None,
    Audio,
    Video,
}

impl From<PickKind> for PendingPickType {
    fn from(kind: PickKind) -> Self {
        match kind {
            PickKind::AudioPick => PendingPickType::Audio,
            PickKind::VideoPick => PendingPickType::Video,
        }
    }
}

/// Token issued for every pick press and carried through the async flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PickRequest {
    pub kind: PickKind,
    pub ticket: u64,
}

/// What the picker handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(MediaSelection),
    Cancelled,
}

impl PickOutcome {
    pub fn into_selection(self) -> Result<MediaSelection, MediaError> {
        match self {
            PickOutcome::Selected(selection) => Ok(selection),
            PickOutcome::Cancelled => Err(MediaError::SelectionCancelled),
        }
    }
}

/// Opaque reference to a user-selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSelection {
    Path(PathBuf),
    Uri(String),
}

impl MediaSelection {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaSelection::Path(path) => Some(path),
            MediaSelection::Uri(_) => None,
        }
    }

    /// Short name suitable for display next to the controls
    pub fn display_name(&self) -> String {
        match self {
            MediaSelection::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
            MediaSelection::Uri(uri) => uri
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or(uri)
                .to_string(),
        }
    }
}

impl fmt::Display for MediaSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSelection::Path(path) => write!(f, "{}", path.display()),
            MediaSelection::Uri(uri) => f.write_str(uri),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_per_kind() {
        assert_eq!(PickKind::AudioPick.mime_filter(), "audio/*");
        assert_eq!(PickKind::VideoPick.mime_filter(), "video/*");
        assert!(PickKind::AudioPick.extensions().contains(&"flac"));
        assert!(PickKind::VideoPick.extensions().contains(&"webm"));
    }

    #[test]
    fn test_display_name() {
        let path = MediaSelection::Path(PathBuf::from("/music/song.mp3"));
        assert_eq!(path.display_name(), "song.mp3");

        let uri = MediaSelection::Uri("content://media/external/audio/42".to_string());
        assert_eq!(uri.display_name(), "42");
        assert!(uri.as_path().is_none());
    }

    #[test]
    fn test_cancelled_outcome_has_no_selection() {
        let picked = PickOutcome::Selected(MediaSelection::Path(PathBuf::from("/music/a.mp3")));
        assert!(picked.into_selection().is_ok());
        assert!(matches!(PickOutcome::Cancelled.into_selection(), Err(MediaError::SelectionCancelled)));
    }
}
