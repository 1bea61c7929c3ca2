//! Application Layer
//!
//! Per-request stores holding UI-facing state and the last error message.

pub mod access;
pub mod admin_dashboard;
pub mod certificate_store;
pub mod enrollment_store;
pub mod load_state;
pub mod settings_store;

pub use access::{require_admin, require_user};
pub use admin_dashboard::{AdminDashboard, AdminState};
pub use certificate_store::{CertificateState, CertificateStore};
pub use enrollment_store::{EnrollmentState, EnrollmentStore};
pub use load_state::LoadState;
pub use settings_store::{SettingsForm, SettingsStore};
