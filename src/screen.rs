// Screen controller
// Routes button presses and async platform results to the two players.
// Every pick carries its own `PickRequest`, so results are routed by the
// token they arrive with rather than by a shared flag.

use serde::Serialize;

use crate::access::{Access, PermissionGate, PermissionRequest};
use crate::audio::{AudioController, AudioView};
use crate::media::{PendingPickType, PickKind, PickOutcome, PickRequest};
use crate::notice::{Notice, Notifier};
use crate::video::{SurfaceReport, VideoController, VideoView};

/// Platform work the caller must start after an event was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAction {
    Nothing,
    RequestPermission(PermissionRequest),
    LaunchPicker(PickRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenSnapshot {
    pub pending_pick: PendingPickType,
    pub audio: AudioView,
    pub video: VideoView,
}

pub struct Screen {
    gate: PermissionGate,
    audio: AudioController,
    video: VideoController,
    notifier: Box<dyn Notifier>,
    pending: Option<PickRequest>,
    next_ticket: u64,
    destroyed: bool,
}

impl Screen {
    pub fn new(
        gate: PermissionGate,
        audio: AudioController,
        video: VideoController,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            gate,
            audio,
            video,
            notifier,
            pending: None,
            next_ticket: 0,
            destroyed: false,
        }
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            pending_pick: self.pending.map(|p| p.kind.into()).unwrap_or_default(),
            audio: self.audio.view(),
            video: self.video.view(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn press_pick(&mut self, kind: PickKind) -> ScreenAction {
        if self.destroyed {
            return ScreenAction::Nothing;
        }

        self.next_ticket += 1;
        let request = PickRequest { kind, ticket: self.next_ticket };
        self.pending = Some(request);
        tracing::debug!(?kind, ticket = request.ticket, "pick pressed");

        match self.gate.ensure_access(request) {
            Access::Granted => ScreenAction::LaunchPicker(request),
            Access::Requested(permission) => ScreenAction::RequestPermission(permission),
        }
    }

    pub fn on_permission_result(&mut self, request: PermissionRequest, grants: &[bool]) -> ScreenAction {
        if !self.accepts(request.pick) {
            return ScreenAction::Nothing;
        }

        match self.gate.on_result(&request, grants) {
            Ok(()) => ScreenAction::LaunchPicker(request.pick),
            Err(e) => {
                tracing::info!(ticket = request.pick.ticket, "{e}");
                self.pending = None;
                self.notifier.notify(Notice::PermissionRequired);
                ScreenAction::Nothing
            }
        }
    }

    pub fn on_pick_result(&mut self, request: PickRequest, outcome: PickOutcome) {
        if !self.accepts(request) {
            return;
        }
        self.pending = None;

        let selection = match outcome.into_selection() {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!(ticket = request.ticket, "{e}");
                return;
            }
        };

        match request.kind {
            PickKind::AudioPick => self.audio.load(selection, self.notifier.as_ref()),
            PickKind::VideoPick => self.video.load(selection),
        }
    }

    pub fn toggle_audio(&mut self) {
        if !self.destroyed {
            self.audio.toggle_play_pause(self.notifier.as_ref());
        }
    }

    pub fn stop_audio(&mut self) {
        if !self.destroyed {
            self.audio.stop();
        }
    }

    pub fn toggle_video(&mut self) {
        if !self.destroyed {
            self.video.toggle_play_pause(self.notifier.as_ref());
        }
    }

    pub fn stop_video(&mut self) {
        if !self.destroyed {
            self.video.stop();
        }
    }

    pub fn on_surface_report(&mut self, report: SurfaceReport) {
        if !self.destroyed {
            self.video.on_surface_report(report, self.notifier.as_ref());
        }
    }

    pub fn teardown(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.pending = None;
        self.audio.teardown();
        self.video.teardown();
        tracing::info!("screen torn down");
    }

    /// Late results for a destroyed screen or a superseded pick are dropped
    fn accepts(&self, request: PickRequest) -> bool {
        if self.is_destroyed() {
            tracing::debug!(ticket = request.ticket, "result arrived after teardown");
            return false;
        }
        if self.pending != Some(request) {
            tracing::debug!(ticket = request.ticket, "result for superseded pick");
            return false;
        }
        true
    }
}
