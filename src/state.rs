// Application state management
use parking_lot::Mutex;
use tauri::{AppHandle, Emitter};

use crate::access::{DocumentPicker, PermissionBackend, PermissionRequest};
use crate::media::{PickKind, PickOutcome, PickRequest};
use crate::screen::{Screen, ScreenAction, ScreenSnapshot};
use crate::video::SurfaceReport;

pub struct AppState {
    screen: Mutex<Screen>,
    picker: Box<dyn DocumentPicker>,
    consent: Box<dyn PermissionBackend>,
    app: AppHandle,
}

impl AppState {
    pub fn new(
        screen: Screen,
        picker: Box<dyn DocumentPicker>,
        consent: Box<dyn PermissionBackend>,
        app: AppHandle,
    ) -> Self {
        Self {
            screen: Mutex::new(screen),
            picker,
            consent,
            app,
        }
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        self.screen.lock().snapshot()
    }

    pub fn press_pick(&self, kind: PickKind) {
        let action = self.screen.lock().press_pick(kind);
        self.publish();
        self.perform(action);
    }

    /// Answer from the consent prompt
    pub fn on_permission_result(&self, request: PermissionRequest, grants: Vec<bool>) {
        let action = self.screen.lock().on_permission_result(request, &grants);
        self.publish();
        self.perform(action);
    }

    /// Answer from the document picker
    pub fn on_pick_result(&self, request: PickRequest, outcome: PickOutcome) {
        self.update(|screen| screen.on_pick_result(request, outcome));
    }

    pub fn toggle_audio(&self) {
        self.update(Screen::toggle_audio);
    }

    pub fn stop_audio(&self) {
        self.update(Screen::stop_audio);
    }

    pub fn toggle_video(&self) {
        self.update(Screen::toggle_video);
    }

    pub fn stop_video(&self) {
        self.update(Screen::stop_video);
    }

    pub fn on_surface_report(&self, report: SurfaceReport) {
        self.update(|screen| screen.on_surface_report(report));
    }

    pub fn teardown(&self) {
        self.screen.lock().teardown();
    }

    fn update(&self, f: impl FnOnce(&mut Screen)) {
        f(&mut *self.screen.lock());
        self.publish();
    }

    // Dialogs are opened without the screen lock held; their callbacks take it again
    fn perform(&self, action: ScreenAction) {
        match action {
            ScreenAction::Nothing => {}
            ScreenAction::RequestPermission(request) => self.consent.request(request),
            ScreenAction::LaunchPicker(request) => self.picker.open(request),
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.app.emit("screen-state", &snapshot) {
            tracing::warn!("failed to emit screen state: {e}");
        }
    }
}
