// Runtime consent requests
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use super::permission::PermissionRequest;
use crate::state::AppState;

/// Asks the user for permissions; the answer comes back through the app state
pub trait PermissionBackend: Send + Sync {
    fn request(&self, request: PermissionRequest);
}

/// Allow/Deny message dialog standing in for the platform permission prompt
pub struct DialogConsent {
    app: AppHandle,
}

impl DialogConsent {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl PermissionBackend for DialogConsent {
    fn request(&self, request: PermissionRequest) {
        let wanted: Vec<&str> = request.permissions.iter().map(|p| p.description()).collect();
        let message = format!("Allow this app to {}?", wanted.join(" and "));

        let app = self.app.clone();
        self.app
            .dialog()
            .message(message)
            .title("Permission")
            .kind(MessageDialogKind::Info)
            .buttons(MessageDialogButtons::OkCancelCustom("Allow".into(), "Deny".into()))
            .show(move |allowed| {
                let grants = vec![allowed; request.permissions.len()];
                app.state::<AppState>().on_permission_result(request, grants);
            });
    }
}
