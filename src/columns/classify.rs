use super::names;
use super::{ColumnGroups, ColumnOverrides, ColumnRole, ColumnSlots, SchemaError};

/// Role claims over a header, one slot per column.
struct Claims<'a> {
    columns: &'a [String],
    roles: Vec<Option<ColumnRole>>,
}

impl<'a> Claims<'a> {
    fn new(columns: &'a [String]) -> Self {
        Self {
            columns,
            roles: vec![None; columns.len()],
        }
    }

    fn claim(&mut self, index: usize, role: ColumnRole) -> Result<String, SchemaError> {
        if let Some(first) = self.roles[index] {
            return Err(SchemaError::ConflictingRoles {
                column: self.columns[index].clone(),
                first,
                second: role,
            });
        }
        self.roles[index] = Some(role);
        Ok(self.columns[index].clone())
    }

    fn claim_optional(
        &mut self,
        index: Option<usize>,
        role: ColumnRole,
    ) -> Result<Option<String>, SchemaError> {
        index.map(|i| self.claim(i, role)).transpose()
    }
}

/// First column whose lower-cased name equals `canonical`.
fn find_canonical(columns: &[String], canonical: &str) -> Option<usize> {
    columns.iter().position(|c| c.to_lowercase() == canonical)
}

/// Resolve an optional slot: an override wins, otherwise the canonical name.
///
/// Overrides match exactly first and fall back to a case-insensitive match.
fn resolve_slot(
    columns: &[String],
    override_name: Option<&str>,
    canonical: &str,
    role: ColumnRole,
) -> Result<Option<usize>, SchemaError> {
    match override_name {
        Some(name) => columns
            .iter()
            .position(|c| c == name)
            .or_else(|| find_canonical(columns, &name.to_lowercase()))
            .map(Some)
            .ok_or_else(|| SchemaError::OverrideNotFound {
                role,
                column: name.to_string(),
            }),
        None => Ok(find_canonical(columns, canonical)),
    }
}

impl ColumnGroups {
    /// Classify the columns of a table header.
    ///
    /// Fails with [`SchemaError`] if the header has no scan number column,
    /// no label column (or more than one), or no feature columns.
    pub fn infer<S: AsRef<str>>(
        columns: &[S],
        overrides: &ColumnOverrides,
    ) -> Result<Self, SchemaError> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let mut claims = Claims::new(&columns);

        let labels: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.to_lowercase() == names::LABEL)
            .map(|(i, _)| i)
            .collect();
        let target_column = match labels.as_slice() {
            [] => return Err(SchemaError::MissingRole(ColumnRole::Label)),
            [index] => claims.claim(*index, ColumnRole::Label)?,
            many => {
                return Err(SchemaError::DuplicateLabel(
                    many.iter().map(|&i| columns[i].clone()).collect(),
                ))
            }
        };

        let scan_index = find_canonical(&columns, names::SCAN_NUMBER)
            .ok_or(SchemaError::MissingRole(ColumnRole::SpectrumIdentifier))?;
        let scan = claims.claim(scan_index, ColumnRole::SpectrumIdentifier)?;

        let psm_id = claims.claim_optional(
            find_canonical(&columns, names::PSM_ID),
            ColumnRole::PsmId,
        )?;
        let peptide = claims.claim_optional(
            find_canonical(&columns, names::PEPTIDE),
            ColumnRole::Peptide,
        )?;
        let proteins = claims.claim_optional(
            find_canonical(&columns, names::PROTEINS),
            ColumnRole::Proteins,
        )?;

        let filename = resolve_slot(
            &columns,
            overrides.filename.as_deref(),
            names::FILE_NAME,
            ColumnRole::FileName,
        )?;
        let filename = claims.claim_optional(filename, ColumnRole::FileName)?;

        let calcmass = resolve_slot(
            &columns,
            overrides.calcmass.as_deref(),
            names::CALCULATED_MASS,
            ColumnRole::CalculatedMass,
        )?;
        let calcmass = claims.claim_optional(calcmass, ColumnRole::CalculatedMass)?;

        let expmass = resolve_slot(
            &columns,
            overrides.expmass.as_deref(),
            names::EXPERIMENTAL_MASS,
            ColumnRole::ExperimentalMass,
        )?;
        let expmass = claims.claim_optional(expmass, ColumnRole::ExperimentalMass)?;

        let ret_time = resolve_slot(
            &columns,
            overrides.ret_time.as_deref(),
            names::RETENTION_TIME,
            ColumnRole::RetentionTime,
        )?;
        let ret_time = claims.claim_optional(ret_time, ColumnRole::RetentionTime)?;

        // The charge column only leaves the features when one-hot charge
        // columns carry the same information.
        let charge_index = resolve_slot(
            &columns,
            overrides.charge.as_deref(),
            names::CHARGE,
            ColumnRole::Charge,
        )?;
        let charge = match charge_index {
            Some(index) => {
                let has_one_hot = columns
                    .iter()
                    .enumerate()
                    .any(|(i, c)| i != index && c.to_lowercase().starts_with(names::CHARGE));
                if has_one_hot {
                    Some(claims.claim(index, ColumnRole::Charge)?)
                } else {
                    Some(columns[index].clone())
                }
            }
            None => None,
        };

        for name in &overrides.ignore {
            let index = columns.iter().position(|c| c == name).ok_or_else(|| {
                SchemaError::OverrideNotFound {
                    role: ColumnRole::Ignored,
                    column: name.clone(),
                }
            })?;
            claims.claim(index, ColumnRole::Ignored)?;
        }

        let roles: Vec<ColumnRole> = claims
            .roles
            .into_iter()
            .map(|role| role.unwrap_or(ColumnRole::Feature))
            .collect();

        let feature_columns: Vec<String> = columns
            .iter()
            .zip(&roles)
            .filter(|(_, role)| **role == ColumnRole::Feature)
            .map(|(c, _)| c.clone())
            .collect();
        if feature_columns.is_empty() {
            return Err(SchemaError::MissingRole(ColumnRole::Feature));
        }

        let spectrum_columns: Vec<String> = [filename.clone(), Some(scan), ret_time.clone(), expmass.clone()]
            .into_iter()
            .flatten()
            .collect();

        Ok(Self {
            columns,
            roles,
            feature_columns,
            spectrum_columns,
            target_column,
            slots: ColumnSlots {
                filename,
                calcmass,
                expmass,
                ret_time,
                charge,
                psm_id,
                peptide,
                proteins,
            },
        })
    }
}
