//! Operating system family checks used when picking a scan technique

/// Operating system families the scanner distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
    Other,
}

impl Platform {
    /// Map a `std::env::consts::OS` identifier onto a family
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::Darwin,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// The platform this binary is running on
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }

    /// Raw-socket scanning is only wired up for Linux and macOS
    pub fn is_supported(&self) -> bool {
        matches!(self, Platform::Linux | Platform::Darwin)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_linux() -> bool {
    Platform::current() == Platform::Linux
}

pub fn is_darwin() -> bool {
    Platform::current() == Platform::Darwin
}

pub fn is_windows() -> bool {
    Platform::current() == Platform::Windows
}

pub fn is_supported() -> bool {
    Platform::current().is_supported()
}
