//! Host CPU architecture.

/// CPU architecture of a macOS host.
///
/// Casks key their variants by a short manifest tag (`arm` / `intel`), while
/// download URLs usually spell the architecture the way the vendor builds it
/// (`arm64` / `x86_64`). `Arch` knows both spellings.
///
/// # Example
///
/// ```
/// use cask_schema::Arch;
///
/// let current = Arch::current();
/// println!("Running on: {} (tag {})", current, current.cask_tag());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// ARM64 architecture (Apple Silicon: M1, M2, M3, etc.)
    #[default]
    Arm64,
    /// `x86_64` architecture (Intel Macs)
    X86_64,
}

impl Arch {
    /// Get the current architecture
    pub fn current() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Self::Arm64
        }
        #[cfg(not(target_arch = "aarch64"))]
        {
            Self::X86_64
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
        }
    }

    /// Manifest tag used to key variants (`arm` / `intel`).
    ///
    /// Distinct from [`as_str()`](Self::as_str), which is the value usually
    /// substituted into download URLs.
    pub fn cask_tag(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm",
            Self::X86_64 => "intel",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm" | "arm64" | "aarch64" | "arm64-macos" => Ok(Self::Arm64),
            "intel" | "x86_64" | "amd64" | "x86_64-macos" => Ok(Self::X86_64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
