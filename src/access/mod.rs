// Media access: runtime permissions and the document picker

pub mod consent;
pub mod permission;
pub mod picker;

pub use consent::{DialogConsent, PermissionBackend};
pub use permission::{Access, PermissionGate, PermissionRequest};
pub use picker::{DialogPicker, DocumentPicker};
