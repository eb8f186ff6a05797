// Platform detection and shared-library file naming

/// Target a shared library is named for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Host platform, in Rust's `target_os`/`target_arch` spelling
    pub fn detect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Parse `os-arch` (e.g. "linux-x86_64") or a bare OS name.
    ///
    /// Only the OS affects naming; a bare OS keeps the host architecture.
    pub fn from_target(target: &str) -> Self {
        match target.split_once('-') {
            Some((os, arch)) => Self {
                os: os.to_string(),
                arch: arch.to_string(),
            },
            None => Self {
                os: target.to_string(),
                arch: std::env::consts::ARCH.to_string(),
            },
        }
    }

    pub fn to_target_string(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }

    pub fn shared_lib_style(&self) -> SharedLibStyle {
        SharedLibStyle::for_os(&self.os)
    }
}

/// Prefix and suffix wrapped around a shared-library base name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedLibStyle {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl SharedLibStyle {
    /// ELF convention: `lib<name>.so`
    pub const ELF: Self = Self {
        prefix: "lib",
        suffix: ".so",
    };
    pub const MACHO: Self = Self {
        prefix: "lib",
        suffix: ".dylib",
    };
    pub const PE: Self = Self {
        prefix: "",
        suffix: ".dll",
    };

    /// Naming used when no platform is specified
    pub fn reference() -> Self {
        Self::ELF
    }

    /// Every OS other than macOS and Windows uses ELF naming
    pub fn for_os(os: &str) -> Self {
        match os {
            "macos" | "darwin" | "ios" => Self::MACHO,
            "windows" => Self::PE,
            _ => Self::ELF,
        }
    }

    /// Wrap a base name into a file name
    pub fn file_name(&self, base: &str) -> String {
        format!("{}{}{}", self.prefix, base, self.suffix)
    }
}

impl Default for SharedLibStyle {
    fn default() -> Self {
        Self::reference()
    }
}
