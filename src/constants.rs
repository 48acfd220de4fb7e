//! # Constants
//!
//! Physical constants used when converting stored marker data, and the
//! names that make up the ASCOT5 HDF5 file layout.

// ============================================================================
// PHYSICAL CONSTANTS
// ============================================================================

/// Elementary charge (C)
pub const E_CHARGE: f64 = 1.602_176_634e-19;

/// Atomic mass unit (kg)
pub const AMU: f64 = 1.660_539_066_60e-27;

/// Degrees to radians
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

// ============================================================================
// FILE LAYOUT
// ============================================================================

/// Options master group
pub const OPTIONS_GROUP: &str = "options";

/// Options instance prefix (`options/opt-<qid>`)
pub const OPTIONS_PREFIX: &str = "opt";

/// Magnetic field master group
pub const BFIELD_GROUP: &str = "bfield";

/// Marker master group
pub const MARKERS_GROUP: &str = "markers";

/// Attribute holding an instance creation date
pub const ATTR_DATE: &str = "date";

/// Attribute holding an instance description
pub const ATTR_DESCRIPTION: &str = "description";

/// Attribute on a master group naming the active instance
pub const ATTR_ACTIVE: &str = "active";

/// Attribute on a master group naming the active input type
pub const ATTR_TYPE: &str = "type";

/// Description given to instances created without one
pub const DEFAULT_DESCRIPTION: &str = "No description.";

/// Timestamp format of the `date` attribute
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Number of decimal digits in a qid
pub const QID_DIGITS: usize = 10;

/// Exclusive upper bound of qid values (10^QID_DIGITS)
pub const QID_MAX: u64 = 10_000_000_000;
