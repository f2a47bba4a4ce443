//! `valikit_pack` v1:
//! CI artifact intake for the Vali release pipeline.
//!
//! Takes the zip archives a CI run drops into a directory (main OS image,
//! SDK, DDK), unpacks the SDK/DDK into their configured locations, derives
//! the release version from the main archive's filename and hands it to the
//! downstream makefile packager.
//!
//! Architecture:
//! - `intake` : archive scan/unpack orchestration and packager invocation
//! - `spec`   : options/enums/errors
//! - `report` : run-time report model
//! - `util`   : artifact name parsing and shared helpers

pub mod intake;
pub mod report;
pub mod spec;
mod util;

pub use intake::{intake_artifacts, invoke_packager};
pub use report::{ReportIntake, ReportIntakeBuilder};
pub use spec::{EnumArtifactKind, IntakeError, SpecArtifactVersion, SpecIntakeOptions};
