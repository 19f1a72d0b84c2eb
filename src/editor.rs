use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::grid::{Grid, GridError};
use crate::row::{Column, Row, RowKey, RowPatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("column {0} is not editable")]
    NotEditable(Column),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// What ended an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitTrigger {
    Enter,
    Blur,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    Display,
    Editing { draft: String, focused: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The cell was not being edited; nothing happened.
    Idle,
    /// The draft was written to the grid and the cell is back in display mode.
    Applied(Row),
}

/// Display/edit state machine for one editable cell.
#[derive(Clone, Debug)]
pub struct CellEditor {
    key: RowKey,
    column: Column,
    state: EditState,
    error: Option<EditError>,
}

impl CellEditor {
    pub fn new(key: RowKey, column: Column) -> Result<Self, EditError> {
        if !column.is_editable() {
            return Err(EditError::NotEditable(column));
        }
        Ok(CellEditor {
            key,
            column,
            state: EditState::Display,
            error: None,
        })
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Display => None,
        }
    }

    /// Validation message currently shown under the field, if any.
    pub fn error(&self) -> Option<&EditError> {
        self.error.as_ref()
    }

    /// Pointer activation. Seeds the draft from the grid and focuses the field.
    ///
    /// Activating a cell that is already being edited keeps the current draft.
    pub fn activate(&mut self, grid: &Grid) -> Result<&str, EditError> {
        if let EditState::Editing { focused, .. } = &mut self.state {
            *focused = true;
        } else {
            let row = grid
                .get(&self.key)
                .ok_or_else(|| GridError::UnknownRow(self.key.clone()))?;
            self.state = EditState::Editing {
                draft: row.value(self.column).to_string(),
                focused: true,
            };
            self.error = None;
            debug!(key = %self.key, column = %self.column, "editing started");
        }
        Ok(self.draft().unwrap_or_default())
    }

    /// Replace the draft with what the user typed.
    pub fn input(&mut self, value: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.state {
            *draft = value.into();
            self.error = None;
        }
    }

    /// Confirm the edit (enter) or leave the field (blur).
    ///
    /// An empty draft keeps the cell in editing mode and records a
    /// required-value message. Otherwise the value is applied to `grid`.
    pub fn commit(
        &mut self,
        trigger: CommitTrigger,
        grid: &mut Grid,
    ) -> Result<CommitOutcome, EditError> {
        let EditState::Editing { draft, focused } = &mut self.state else {
            return Ok(CommitOutcome::Idle);
        };
        if trigger == CommitTrigger::Blur {
            *focused = false;
        }

        if draft.is_empty() {
            let err = EditError::Required(self.column.title());
            warn!(key = %self.key, column = %self.column, ?trigger, "save failed: {err}");
            self.error = Some(err.clone());
            return Err(err);
        }

        let Some(patch) = RowPatch::single(self.column, draft.clone()) else {
            return Err(EditError::NotEditable(self.column));
        };
        let row = grid.apply_edit(&self.key, &patch)?.clone();

        self.state = EditState::Display;
        self.error = None;
        debug!(key = %self.key, column = %self.column, ?trigger, "edit committed");
        Ok(CommitOutcome::Applied(row))
    }

    /// Abandon the edit without touching the grid.
    pub fn cancel(&mut self) {
        self.state = EditState::Display;
        self.error = None;
    }
}
