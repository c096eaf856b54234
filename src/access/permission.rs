// Runtime permission gate
// Decides which read permission a pick needs and whether it is already held

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::MediaError;
use crate::media::{PickKind, PickRequest};
use crate::settings::{AccessPolicyMode, AppSettings};

/// First Android API level with per-category media permissions
pub const FINE_GRAINED_MIN_API: u32 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaPermission {
    ReadMediaAudio,
    ReadMediaVideo,
    ReadExternalStorage,
}

impl MediaPermission {
    pub fn description(self) -> &'static str {
        match self {
            MediaPermission::ReadMediaAudio => "read audio files",
            MediaPermission::ReadMediaVideo => "read video files",
            MediaPermission::ReadExternalStorage => "read files from shared storage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformVersion {
    Desktop,
    Android { api_level: u32 },
}

impl PlatformVersion {
    #[cfg(not(target_os = "android"))]
    pub fn current() -> Self {
        PlatformVersion::Desktop
    }

    #[cfg(target_os = "android")]
    pub fn current() -> Self {
        let api_level = std::process::Command::new("getprop")
            .arg("ro.build.version.sdk")
            .output()
            .ok()
            .and_then(|out| String::from_utf8(out.stdout).ok())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);
        PlatformVersion::Android { api_level }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    FineGrained,
    Coarse,
}

impl AccessPolicy {
    pub fn resolve(mode: AccessPolicyMode, platform: PlatformVersion) -> Self {
        match mode {
            AccessPolicyMode::FineGrained => AccessPolicy::FineGrained,
            AccessPolicyMode::Coarse => AccessPolicy::Coarse,
            AccessPolicyMode::Auto => match platform {
                PlatformVersion::Desktop => AccessPolicy::FineGrained,
                PlatformVersion::Android { api_level } if api_level >= FINE_GRAINED_MIN_API => {
                    AccessPolicy::FineGrained
                }
                PlatformVersion::Android { .. } => AccessPolicy::Coarse,
            },
        }
    }

    pub fn permission_for(self, kind: PickKind) -> MediaPermission {
        match (self, kind) {
            (AccessPolicy::FineGrained, PickKind::AudioPick) => MediaPermission::ReadMediaAudio,
            (AccessPolicy::FineGrained, PickKind::VideoPick) => MediaPermission::ReadMediaVideo,
            (AccessPolicy::Coarse, _) => MediaPermission::ReadExternalStorage,
        }
    }
}

/// Where grants are looked up and recorded
pub trait PermissionStore: Send {
    fn is_granted(&self, permission: MediaPermission) -> bool;
    fn record_grant(&mut self, permission: MediaPermission);
}

/// In-memory grants, optionally written back to the settings file
pub struct ConsentStore {
    require_consent: bool,
    granted: HashSet<MediaPermission>,
    persist: Option<(PathBuf, AppSettings)>,
}

impl ConsentStore {
    pub fn new(require_consent: bool, granted: impl IntoIterator<Item = MediaPermission>) -> Self {
        Self {
            require_consent,
            granted: granted.into_iter().collect(),
            persist: None,
        }
    }

    pub fn from_settings(settings: &AppSettings, app_dir: PathBuf) -> Self {
        let mut store = Self::new(
            settings.access.require_consent,
            settings.access.granted.iter().copied(),
        );
        if settings.access.remember_grants {
            store.persist = Some((app_dir, settings.clone()));
        }
        store
    }
}

impl PermissionStore for ConsentStore {
    fn is_granted(&self, permission: MediaPermission) -> bool {
        !self.require_consent || self.granted.contains(&permission)
    }

    fn record_grant(&mut self, permission: MediaPermission) {
        if !self.granted.insert(permission) {
            return;
        }
        if let Some((app_dir, settings)) = self.persist.as_mut() {
            settings.access.granted.push(permission);
            if let Err(e) = settings.save(app_dir) {
                tracing::warn!("failed to remember grant: {e}");
            }
        }
    }
}

/// An outstanding consent request, tagged with the pick it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub pick: PickRequest,
    pub permissions: Vec<MediaPermission>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Requested(PermissionRequest),
}

pub struct PermissionGate {
    policy: AccessPolicy,
    store: Box<dyn PermissionStore>,
}

impl PermissionGate {
    pub fn new(policy: AccessPolicy, store: Box<dyn PermissionStore>) -> Self {
        Self { policy, store }
    }

    pub fn ensure_access(&self, pick: PickRequest) -> Access {
        let permission = self.policy.permission_for(pick.kind);
        if self.store.is_granted(permission) {
            Access::Granted
        } else {
            tracing::debug!(?permission, ticket = pick.ticket, "requesting permission");
            Access::Requested(PermissionRequest {
                pick,
                permissions: vec![permission],
            })
        }
    }

    /// Apply the platform's answer; only the first requested permission counts
    pub fn on_result(&mut self, request: &PermissionRequest, grants: &[bool]) -> Result<(), MediaError> {
        match (request.permissions.first(), grants.first()) {
            (Some(&permission), Some(true)) => {
                self.store.record_grant(permission);
                Ok(())
            }
            (permission, _) => Err(MediaError::PermissionDenied(
                permission
                    .map(|p| p.description().to_string())
                    .unwrap_or_else(|| "media files".to_string()),
            )),
        }
    }
}
