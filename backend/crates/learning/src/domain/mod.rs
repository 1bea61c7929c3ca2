//! Domain Layer
//!
//! Learning records, repository traits and pure helpers.

pub mod entity;
pub mod repository;
pub mod services;

pub use entity::{
    certificate::Certificate,
    course::{Course, CourseDraft},
    enrollment::{Enrollment, EnrollmentStatus, NewEnrollment},
    instructor::Instructor,
};
pub use repository::{
    CertificateRepository, CourseRepository, EnrollmentExpansion, EnrollmentRepository,
    MemberDirectory,
};
