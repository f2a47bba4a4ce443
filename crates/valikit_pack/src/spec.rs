//! Intake specification models and top-level error types.

use std::fmt;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Which of the three CI artifacts an archive name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumArtifactKind {
    /// Main OS image archive (`vali-<version>-<arch>.zip`).
    Os,
    /// SDK archive (`vali-sdk-<version>-<arch>.zip`).
    Sdk,
    /// DDK archive (`vali-ddk-<version>-<arch>.zip`).
    Ddk,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Version triple and architecture tag parsed from an artifact filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArtifactVersion {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component.
    pub patch: u32,
    /// Architecture tag (e.g. `amd64`, `i386`).
    pub arch: String,
}

impl fmt::Display for SpecArtifactVersion {
    /// Dotted version triple without the architecture tag, as passed to the
    /// packager.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Destination directories for unpacked artifacts.
#[derive(Debug, Clone)]
pub struct SpecIntakeOptions {
    /// Where the SDK archive is unpacked (`VALI_SDK_PATH`).
    pub path_dir_sdk: PathBuf,
    /// Where the DDK archive is unpacked (`VALI_DDK_PATH`).
    pub path_dir_ddk: PathBuf,
    /// Userspace application tree consumed by the packager
    /// (`VALI_APPLICATION_PATH`).
    pub path_dir_app: PathBuf,
}

impl SpecIntakeOptions {
    /// Environment variable naming the SDK destination.
    pub const ENV_SDK_PATH: &'static str = "VALI_SDK_PATH";
    /// Environment variable naming the DDK destination.
    pub const ENV_DDK_PATH: &'static str = "VALI_DDK_PATH";
    /// Environment variable naming the application tree.
    pub const ENV_APPLICATION_PATH: &'static str = "VALI_APPLICATION_PATH";

    /// Read the three required `VALI_*` variables from the process
    /// environment. A missing variable is a configuration error and no work
    /// is performed.
    pub fn from_env() -> Result<Self, IntakeError> {
        Self::_from_lookup(|key| std::env::var(key).ok())
    }

    fn _from_lookup<F>(lookup: F) -> Result<Self, IntakeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read_dir_var = |key: &'static str| -> Result<PathBuf, IntakeError> {
            match lookup(key) {
                Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
                _ => Err(IntakeError::MissingEnvironment(key)),
            }
        };

        Ok(Self {
            path_dir_sdk: read_dir_var(Self::ENV_SDK_PATH)?,
            path_dir_ddk: read_dir_var(Self::ENV_DDK_PATH)?,
            path_dir_app: read_dir_var(Self::ENV_APPLICATION_PATH)?,
        })
    }
}

/// "Whole run failed" errors. A failure here aborts the remaining intake;
/// only destination pre-clean is best-effort.
#[derive(Debug)]
pub enum IntakeError {
    /// A required `VALI_*` environment variable is unset or empty.
    MissingEnvironment(&'static str),
    /// Internal artifact-name pattern failed to compile.
    InvalidPattern(String),
    /// Archive directory could not be enumerated.
    ArchiveDirUnreadable {
        /// Directory that could not be read.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// Extracting one archive failed.
    ExtractFailed {
        /// Archive that failed to extract.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// Deleting a consumed archive failed.
    RemoveFailed {
        /// Archive that could not be removed.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// No main OS archive was found, so no version can be derived.
    MissingOsArtifact,
    /// The packager process could not be spawned.
    PackagerSpawnFailed {
        /// Underlying IO error text.
        message: String,
    },
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEnvironment(key) => {
                write!(f, "{key} must be defined for intake to run")
            }
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::ArchiveDirUnreadable { path, message } => {
                write!(
                    f,
                    "Failed to read archive directory {}: {message}",
                    path.display()
                )
            }
            Self::ExtractFailed { path, message } => {
                write!(f, "Failed to extract {}: {message}", path.display())
            }
            Self::RemoveFailed { path, message } => {
                write!(f, "Failed to remove {}: {message}", path.display())
            }
            Self::MissingOsArtifact => {
                write!(f, "No main OS archive found; cannot derive a version")
            }
            Self::PackagerSpawnFailed { message } => {
                write!(f, "Failed to spawn packager: {message}")
            }
        }
    }
}

impl std::error::Error for IntakeError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
