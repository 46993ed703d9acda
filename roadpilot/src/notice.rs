//! User-visible notices.

use std::fmt;

/// A condition the user should be told about once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Location access has not been granted, so no speed or limit is shown.
    LocationPermissionMissing,
    /// No navigation app is available to hand the route to.
    NavigatorUnavailable,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::LocationPermissionMissing => {
                "Location permission is missing; waiting for a position fix"
            }
            Notice::NavigatorUnavailable => "No navigation app is available",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
