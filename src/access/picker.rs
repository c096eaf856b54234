// File selection through the system document picker
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, FilePath};

use crate::media::{MediaSelection, PickKind, PickOutcome, PickRequest};
use crate::state::AppState;

/// Filter handed to the picker for one media category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerFilter {
    pub name: &'static str,
    pub mime: &'static str,
    pub extensions: &'static [&'static str],
}

impl PickerFilter {
    pub fn for_kind(kind: PickKind) -> Self {
        Self {
            name: kind.label(),
            mime: kind.mime_filter(),
            extensions: kind.extensions(),
        }
    }
}

/// Opens a picker; the outcome comes back later through the app state
pub trait DocumentPicker: Send + Sync {
    fn open(&self, request: PickRequest);
}

/// Native open-file dialog
pub struct DialogPicker {
    app: AppHandle,
}

impl DialogPicker {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DocumentPicker for DialogPicker {
    fn open(&self, request: PickRequest) {
        let filter = PickerFilter::for_kind(request.kind);
        tracing::debug!(ticket = request.ticket, mime = filter.mime, "opening picker");

        let app = self.app.clone();
        self.app
            .dialog()
            .file()
            .set_title(format!("Pick {} file", filter.name.to_lowercase()))
            .add_filter(filter.name, filter.extensions)
            .pick_file(move |file| {
                let outcome = match file {
                    Some(file) => PickOutcome::Selected(selection_from(file)),
                    None => PickOutcome::Cancelled,
                };
                app.state::<AppState>().on_pick_result(request, outcome);
            });
    }
}

fn selection_from(file: FilePath) -> MediaSelection {
    match file {
        FilePath::Path(path) => MediaSelection::Path(path),
        FilePath::Url(url) if url.scheme() == "file" => match url.to_file_path() {
            Ok(path) => MediaSelection::Path(path),
            Err(()) => MediaSelection::Uri(url.to_string()),
        },
        FilePath::Url(url) => MediaSelection::Uri(url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_kind() {
        let audio = PickerFilter::for_kind(PickKind::AudioPick);
        assert_eq!(audio.mime, "audio/*");
        assert!(audio.extensions.contains(&"mp3"));
        assert!(!audio.extensions.contains(&"mp4"));

        let video = PickerFilter::for_kind(PickKind::VideoPick);
        assert_eq!(video.name, "Video");
        assert!(video.extensions.contains(&"mp4"));
    }

    #[test]
    fn test_file_url_becomes_path() {
        let path = std::env::temp_dir().join("clip.mp4");
        let url = tauri::Url::from_file_path(&path).expect("absolute path");
        assert_eq!(selection_from(FilePath::Url(url)), MediaSelection::Path(path));

        let content = tauri::Url::parse("content://media/external/video/7").expect("url");
        assert!(matches!(selection_from(FilePath::Url(content)), MediaSelection::Uri(_)));
    }
}
