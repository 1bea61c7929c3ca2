//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod context;
pub mod login;
pub mod navigation;
pub mod restore_session;
pub mod second_factor;
pub mod session_recorder;
pub mod sign_in;
pub mod sign_out;
pub mod verify_otp;

// Re-exports
pub use config::AuthConfig;
pub use context::AuthContext;
pub use login::CompleteLoginUseCase;
pub use navigation::login_redirect;
pub use restore_session::RestoreSessionUseCase;
pub use second_factor::{OtpCoordinator, VerifyOtpInput};
pub use session_recorder::{SessionRecorder, SessionView};
pub use sign_in::{ClientFingerprint, SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use verify_otp::VerifyOtpUseCase;
