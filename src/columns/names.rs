//! Canonical (lower-case) column names recognized in PIN headers.

/// Native scan number; the primary spectrum identifier
pub const SCAN_NUMBER: &str = "scannr";
/// Target/decoy label
pub const LABEL: &str = "label";
/// Per-PSM identifier
pub const PSM_ID: &str = "specid";
/// Peptide sequence
pub const PEPTIDE: &str = "peptide";
/// Tab-joined protein list, always the last PIN column
pub const PROTEINS: &str = "proteins";
/// MS data file name
pub const FILE_NAME: &str = "filename";
/// Theoretical monoisotopic peptide mass
pub const CALCULATED_MASS: &str = "calcmass";
/// Measured neutral precursor mass
pub const EXPERIMENTAL_MASS: &str = "expmass";
/// Retention time in seconds
pub const RETENTION_TIME: &str = "ret_time";
/// Precursor charge state
pub const CHARGE: &str = "charge";
