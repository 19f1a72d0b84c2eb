use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::generator;
use crate::row::{Row, RowKey, RowPatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("no row with key {0}")]
    UnknownRow(RowKey),
}

/// The authoritative table for the current page view.
///
/// Rows keep their generation order and their keys for the lifetime of the
/// grid. The only mutation is [`Grid::apply_edit`], which replaces one row.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn generate() -> Self {
        Grid {
            rows: generator::generate_table(),
        }
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Grid {
            rows: generator::generate_rows(rng),
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Grid { rows }
    }

    /// Throw the current table away and start from fresh rows.
    pub fn regenerate(&mut self) {
        self.rows = generator::generate_table();
        debug!(rows = self.rows.len(), "table regenerated");
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| &row.key == key)
    }

    /// Copy of the table as it is right now, for export.
    pub fn snapshot(&self) -> Vec<Row> {
        self.rows.clone()
    }

    /// Replace the row matching `key` with its merge with `patch`.
    pub fn apply_edit(&mut self, key: &RowKey, patch: &RowPatch) -> Result<&Row, GridError> {
        let Some(index) = self.rows.iter().position(|row| &row.key == key) else {
            warn!(%key, "edit for unknown row ignored");
            return Err(GridError::UnknownRow(key.clone()));
        };

        let merged = self.rows[index].merged(patch);
        self.rows[index] = merged;
        debug!(%key, "row updated");
        Ok(&self.rows[index])
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SUBSTANCES;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded_grid() -> Grid {
        Grid::generate_with(&mut StdRng::seed_from_u64(99))
    }

    #[test]
    fn edit_changes_only_patched_fields_of_one_row() {
        let mut grid = seeded_grid();
        let before = grid.snapshot();
        let key = RowKey::from("4");

        let patch = RowPatch {
            year: Some("2030".to_string()),
            range: Some("0.00–9.00".to_string()),
            ..RowPatch::default()
        };
        let updated = grid.apply_edit(&key, &patch).unwrap().clone();

        assert_eq!(updated.year, "2030");
        assert_eq!(updated.range, "0.00–9.00");
        let original = &before[4];
        assert_eq!(updated.unit, original.unit);
        assert_eq!(updated.mcl, original.mcl);
        assert_eq!(updated.mclg, original.mclg);
        assert_eq!(updated.amount_detected, original.amount_detected);
        assert_eq!(updated.violation, original.violation);
        assert_eq!(updated.substance, original.substance);

        for (index, row) in grid.rows().iter().enumerate() {
            if index != 4 {
                assert_eq!(row, &before[index]);
            }
        }
    }

    #[test]
    fn keys_and_order_survive_many_edits() {
        let mut grid = seeded_grid();
        for round in 0..20 {
            for index in 0..grid.len() {
                let key = RowKey::from_index(index);
                let patch = RowPatch::single(crate::row::Column::Mcl, format!("{round}.00"))
                    .unwrap();
                grid.apply_edit(&key, &patch).unwrap();
            }
        }

        assert_eq!(grid.len(), SUBSTANCES.len());
        for (index, row) in grid.rows().iter().enumerate() {
            assert_eq!(row.key, RowKey::from_index(index));
            assert_eq!(row.substance, SUBSTANCES[index]);
            assert_eq!(row.mcl, "19.00");
        }
    }

    #[test]
    fn unknown_key_is_reported_and_leaves_table_alone() {
        let mut grid = seeded_grid();
        let before = grid.snapshot();
        let patch = RowPatch::single(crate::row::Column::Year, "2022").unwrap();

        let err = grid.apply_edit(&RowKey::from("99"), &patch).unwrap_err();
        assert_eq!(err, GridError::UnknownRow(RowKey::from("99")));
        assert_eq!(grid.rows(), before.as_slice());
    }

    #[test]
    fn regenerate_keeps_the_shape() {
        let mut grid = seeded_grid();
        grid.regenerate();
        assert_eq!(grid.len(), SUBSTANCES.len());
        assert!(grid.get(&RowKey::from("12")).is_some());
        assert!(grid.get(&RowKey::from("13")).is_none());
    }
}
