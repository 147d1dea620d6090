use std::io::Read;

use super::FoldError;

/// Row indices per fold per dataset
///
/// Index lists are sorted and free of duplicates. Folds may share rows, as
/// cross-validation training sets do; [`require_disjoint`] checks the
/// stricter layout where they must not. The union of a dataset's lists need
/// not cover every row.
///
/// [`require_disjoint`]: FoldIndexAssignment::require_disjoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoldIndexAssignment {
    folds: Vec<Vec<Vec<u64>>>,
    num_datasets: usize,
}

impl FoldIndexAssignment {
    /// Validate a fold → dataset → row-index structure.
    pub fn new(mut folds: Vec<Vec<Vec<u64>>>) -> Result<Self, FoldError> {
        let num_datasets = folds.first().map_or(0, Vec::len);
        for (fold, datasets) in folds.iter_mut().enumerate() {
            if datasets.len() != num_datasets {
                return Err(FoldError::RaggedAssignment {
                    fold,
                    expected: num_datasets,
                    found: datasets.len(),
                });
            }
            for indices in datasets.iter_mut() {
                indices.sort_unstable();
                indices.dedup();
            }
        }

        Ok(Self {
            folds,
            num_datasets,
        })
    }

    /// Fail if any row of a dataset is listed by two folds
    pub fn require_disjoint(&self) -> Result<(), FoldError> {
        for dataset in 0..self.num_datasets {
            let mut owners: Vec<(u64, usize)> = self
                .folds
                .iter()
                .enumerate()
                .flat_map(|(fold, datasets)| datasets[dataset].iter().map(move |&i| (i, fold)))
                .collect();
            owners.sort_unstable();
            if let Some(pair) = owners.windows(2).find(|pair| pair[0].0 == pair[1].0) {
                return Err(FoldError::OverlappingFolds {
                    dataset,
                    first: pair[0].1,
                    second: pair[1].1,
                    index: pair[0].0,
                });
            }
        }
        Ok(())
    }

    /// Load `[[[row, ...], ...], ...]` (fold → dataset → rows) from JSON
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, FoldError> {
        let folds: Vec<Vec<Vec<u64>>> = serde_json::from_reader(reader)?;
        Self::new(folds)
    }

    /// Number of folds
    pub fn num_folds(&self) -> usize {
        self.folds.len()
    }

    /// Number of datasets each fold lists
    pub fn num_datasets(&self) -> usize {
        self.num_datasets
    }

    /// Sorted row indices of `dataset` assigned to `fold`
    pub fn indices(&self, fold: usize, dataset: usize) -> &[u64] {
        &self.folds[fold][dataset]
    }

    /// Total number of assigned rows in `fold`
    pub fn fold_len(&self, fold: usize) -> usize {
        self.folds[fold].iter().map(Vec::len).sum()
    }
}

impl TryFrom<Vec<Vec<Vec<u64>>>> for FoldIndexAssignment {
    type Error = FoldError;

    fn try_from(folds: Vec<Vec<Vec<u64>>>) -> Result<Self, Self::Error> {
        Self::new(folds)
    }
}
