//! Map-load result types.

use std::fmt;

/// Result code returned by the map server's load-map operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadStatus(pub u8);

impl LoadStatus {
    pub const SUCCESS: LoadStatus = LoadStatus(0);
    pub const MAP_DOES_NOT_EXIST: LoadStatus = LoadStatus(1);
    pub const INVALID_MAP_DATA: LoadStatus = LoadStatus(2);
    pub const INVALID_MAP_METADATA: LoadStatus = LoadStatus(3);
    pub const UNDEFINED_FAILURE: LoadStatus = LoadStatus(255);

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Short description of a known code.
    pub fn describe(self) -> &'static str {
        match self {
            Self::SUCCESS => "success",
            Self::MAP_DOES_NOT_EXIST => "map does not exist",
            Self::INVALID_MAP_DATA => "invalid map data",
            Self::INVALID_MAP_METADATA => "invalid map metadata",
            Self::UNDEFINED_FAILURE => "undefined failure",
            _ => "unknown result code",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}

/// Terminal outcome of one map-load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// The map server loaded the map.
    Success,
    /// The map server rejected the load with a result code.
    Failure(LoadStatus),
    /// The call did not complete normally (connection lost, bad response).
    TransportError(String),
}

impl LoadResult {
    /// Interpret a raw result code from the map server.
    pub fn from_status(status: LoadStatus) -> Self {
        if status.is_success() {
            LoadResult::Success
        } else {
            LoadResult::Failure(status)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoadResult::Success)
    }
}

impl fmt::Display for LoadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadResult::Success => write!(f, "map loaded"),
            LoadResult::Failure(status) => write!(f, "map server rejected load: {}", status),
            LoadResult::TransportError(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        assert_eq!(LoadResult::from_status(LoadStatus(0)), LoadResult::Success);
    }

    #[test]
    fn test_nonzero_is_failure_with_code() {
        let result = LoadResult::from_status(LoadStatus(2));
        assert_eq!(result, LoadResult::Failure(LoadStatus::INVALID_MAP_DATA));
        assert!(!result.is_success());
    }

    #[test]
    fn test_display_includes_code() {
        let result = LoadResult::Failure(LoadStatus(2));
        assert!(result.to_string().contains("2 (invalid map data)"));
        assert_eq!(LoadStatus(42).describe(), "unknown result code");
    }
}
