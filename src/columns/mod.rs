//! # Column Classification
//!
//! Maps the column names of a PSM table to semantic roles once, at ingestion
//! time. Every later stage addresses columns by the names resolved here and
//! never re-inspects the table header.
//!
//! ## Recognized Columns
//!
//! | Role | Canonical name | Feature? |
//! |------|----------------|----------|
//! | SpectrumIdentifier | `scannr` | No |
//! | Label | `label` | No |
//! | PsmId | `specid` | No |
//! | Peptide | `peptide` | No |
//! | Proteins | `proteins` | No |
//! | FileName | `filename` | No |
//! | CalculatedMass | `calcmass` | No |
//! | ExperimentalMass | `expmass` | No |
//! | RetentionTime | `ret_time` | No |
//! | Charge | `charge` | Only without one-hot `charge*` siblings |
//!
//! Names are compared case-insensitively. Everything left over is a feature.
//!
//! ## Example
//!
//! ```rust
//! use pinfold::columns::{ColumnGroups, ColumnOverrides};
//!
//! let header = ["SpecId", "Label", "ScanNr", "score", "deltCn", "Peptide", "Proteins"];
//! let groups = ColumnGroups::infer(&header, &ColumnOverrides::default())?;
//!
//! assert_eq!(groups.target_column(), "Label");
//! assert_eq!(groups.spectrum_columns(), ["ScanNr"]);
//! assert_eq!(groups.feature_columns(), ["score", "deltCn"]);
//! # Ok::<(), pinfold::columns::SchemaError>(())
//! ```

mod classify;
mod error;
pub mod names;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

pub use error::SchemaError;

/// Semantic role of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Scan number; part of the spectrum key
    SpectrumIdentifier,
    /// Target/decoy label
    Label,
    /// Model input
    Feature,
    /// MS data file name; part of the spectrum key
    FileName,
    /// Theoretical peptide mass
    CalculatedMass,
    /// Measured precursor mass; part of the spectrum key
    ExperimentalMass,
    /// Retention time; part of the spectrum key
    RetentionTime,
    /// Charge state (non-feature only when one-hot charge columns exist)
    Charge,
    /// PSM identifier
    PsmId,
    /// Peptide sequence
    Peptide,
    /// Protein list
    Proteins,
    /// Explicitly excluded, or dropped during feature screening
    Ignored,
}

impl ColumnRole {
    /// Whether columns of this role make up the composable spectrum key
    pub fn is_spectrum_key(self) -> bool {
        matches!(
            self,
            Self::SpectrumIdentifier | Self::FileName | Self::ExperimentalMass | Self::RetentionTime
        )
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpectrumIdentifier => "spectrum identifier",
            Self::Label => "label",
            Self::Feature => "feature",
            Self::FileName => "file name",
            Self::CalculatedMass => "calculated mass",
            Self::ExperimentalMass => "experimental mass",
            Self::RetentionTime => "retention time",
            Self::Charge => "charge",
            Self::PsmId => "PSM id",
            Self::Peptide => "peptide",
            Self::Proteins => "proteins",
            Self::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// Explicit column names that take precedence over the canonical names
///
/// Deserializes directly from the `[columns]` section of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnOverrides {
    /// MS data file name column
    pub filename: Option<String>,
    /// Calculated mass column
    pub calcmass: Option<String>,
    /// Experimental mass column
    pub expmass: Option<String>,
    /// Retention time column
    pub ret_time: Option<String>,
    /// Charge column
    pub charge: Option<String>,
    /// Columns to exclude from every role
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Optional single-column slots resolved during classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnSlots {
    pub filename: Option<String>,
    pub calcmass: Option<String>,
    pub expmass: Option<String>,
    pub ret_time: Option<String>,
    pub charge: Option<String>,
    pub psm_id: Option<String>,
    pub peptide: Option<String>,
    pub proteins: Option<String>,
}

/// Role assignment for every column of a table
///
/// Each column carries exactly one role. `feature_columns`, `spectrum_columns`
/// and `target_column` are derived from the roles and keep table order.
/// Only the feature list may change after inference, through
/// [`ColumnGroups::update_feature_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroups {
    columns: Vec<String>,
    roles: Vec<ColumnRole>,
    feature_columns: Vec<String>,
    spectrum_columns: Vec<String>,
    target_column: String,
    slots: ColumnSlots,
}

impl ColumnGroups {
    /// All column names in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Role of a column, if the table has it
    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.roles[i])
    }

    /// Model input columns, in table order
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Columns forming the spectrum key: file name, scan, retention time, experimental mass
    pub fn spectrum_columns(&self) -> &[String] {
        &self.spectrum_columns
    }

    /// The label column
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Spectrum key columns followed by the label column
    pub fn identity_columns(&self) -> Vec<String> {
        let mut columns = self.spectrum_columns.clone();
        columns.push(self.target_column.clone());
        columns
    }

    /// File name column
    pub fn filename_column(&self) -> Option<&str> {
        self.slots.filename.as_deref()
    }

    /// Calculated mass column
    pub fn calcmass_column(&self) -> Option<&str> {
        self.slots.calcmass.as_deref()
    }

    /// Experimental mass column
    pub fn expmass_column(&self) -> Option<&str> {
        self.slots.expmass.as_deref()
    }

    /// Retention time column
    pub fn rt_column(&self) -> Option<&str> {
        self.slots.ret_time.as_deref()
    }

    /// Charge column. May also be a feature, see [`ColumnRole::Charge`].
    pub fn charge_column(&self) -> Option<&str> {
        self.slots.charge.as_deref()
    }

    /// PSM identifier column
    pub fn psm_id_column(&self) -> Option<&str> {
        self.slots.psm_id.as_deref()
    }

    /// Peptide column
    pub fn peptide_column(&self) -> Option<&str> {
        self.slots.peptide.as_deref()
    }

    /// Protein list column
    pub fn protein_column(&self) -> Option<&str> {
        self.slots.proteins.as_deref()
    }

    /// One `  (i)\tname` line per feature, numbered from zero
    pub fn feature_listing(&self) -> Vec<String> {
        self.feature_columns
            .iter()
            .enumerate()
            .map(|(i, feature)| format!("  ({i})\t{feature}"))
            .collect()
    }

    /// Replace the feature list with a subset of the current features.
    ///
    /// Features that are not kept become [`ColumnRole::Ignored`]. Table order
    /// is preserved regardless of the order of `keep`.
    pub fn update_feature_columns<S: AsRef<str>>(&mut self, keep: &[S]) -> Result<(), SchemaError> {
        let mut kept = HashSet::with_capacity(keep.len());
        for name in keep {
            let name = name.as_ref();
            if !self.feature_columns.iter().any(|f| f == name) {
                return Err(SchemaError::UnknownColumn(name.to_string()));
            }
            kept.insert(name);
        }

        for (column, role) in self.columns.iter().zip(self.roles.iter_mut()) {
            if *role == ColumnRole::Feature && !kept.contains(column.as_str()) {
                *role = ColumnRole::Ignored;
            }
        }
        self.feature_columns
            .retain(|column| kept.contains(column.as_str()));

        Ok(())
    }
}

impl fmt::Display for ColumnGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target_column: {}", self.target_column)?;
        writeln!(f, "spectrum_columns: {:?}", self.spectrum_columns)?;
        writeln!(f, "feature_columns: {:?}", self.feature_columns)?;
        let slots = [
            ("psm_id_column", &self.slots.psm_id),
            ("peptide_column", &self.slots.peptide),
            ("protein_column", &self.slots.proteins),
            ("filename_column", &self.slots.filename),
            ("calcmass_column", &self.slots.calcmass),
            ("expmass_column", &self.slots.expmass),
            ("rt_column", &self.slots.ret_time),
            ("charge_column", &self.slots.charge),
        ];
        for (label, value) in slots {
            writeln!(f, "{label}: {}", value.as_deref().unwrap_or("-"))?;
        }
        Ok(())
    }
}
