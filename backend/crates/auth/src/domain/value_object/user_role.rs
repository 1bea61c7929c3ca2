use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum UserRole {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Student => "student",
            Instructor => "instructor",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Unknown or empty codes fall back to `Student`
    #[inline]
    pub fn from_code(code: &str) -> Self {
        use UserRole::*;
        match code.trim().to_ascii_lowercase().as_str() {
            "student" | "" => Student,
            "instructor" => Instructor,
            "admin" => Admin,
            other => {
                tracing::warn!(code = %other, "Unknown user role, treating as student");
                Student
            }
        }
    }
}

impl From<String> for UserRole {
    fn from(code: String) -> Self {
        UserRole::from_code(&code)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
