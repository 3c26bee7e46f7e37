//! Constants used throughout the Kedai core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Environment variable selecting the CMS data directory.
pub const DATA_DIR_ENV: &str = "KEDAI_DATA_DIR";

/// Default directory for CMS data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "cms_data";

/// Directory name for class registration records.
pub const REGISTRATIONS_DIR_NAME: &str = "registrations";

/// Filename for registration JSON files.
pub const REGISTRATION_JSON_FILENAME: &str = "registration.json";
