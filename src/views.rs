//! Page views: every page load owns its own table, editors and save state.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::editor::CellEditor;
use crate::grid::Grid;
use crate::remote::DocumentService;
use crate::row::{Column, Row, RowKey};
use crate::workflow::SaveWorkflow;

/// Views kept alive at once; opening one more drops the oldest.
pub const MAX_VIEWS: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub String);

impl ViewId {
    pub fn new() -> Self {
        ViewId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        ViewId(value.to_string())
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The table one page works on.
///
/// Lock order is grid, then editors.
pub struct PageView {
    grid: Mutex<Grid>,
    editors: Mutex<HashMap<(RowKey, Column), CellEditor>>,
    workflow: SaveWorkflow,
}

impl PageView {
    pub fn new(grid: Grid, service: Arc<dyn DocumentService>) -> Self {
        PageView {
            grid: Mutex::new(grid),
            editors: Mutex::new(HashMap::new()),
            workflow: SaveWorkflow::new(service),
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        lock(&self.grid).snapshot()
    }

    pub fn grid(&self) -> MutexGuard<'_, Grid> {
        lock(&self.grid)
    }

    pub fn editors(&self) -> MutexGuard<'_, HashMap<(RowKey, Column), CellEditor>> {
        lock(&self.editors)
    }

    pub fn workflow(&self) -> &SaveWorkflow {
        &self.workflow
    }
}

/// Open views by id, oldest first.
pub struct ViewRegistry {
    views: HashMap<ViewId, Arc<PageView>>,
    order: VecDeque<ViewId>,
    capacity: usize,
}

impl ViewRegistry {
    pub fn new(capacity: usize) -> Self {
        ViewRegistry {
            views: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&mut self, view: PageView) -> ViewId {
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.views.remove(&oldest);
                info!(view = %oldest, "view evicted");
            }
        }

        let id = ViewId::new();
        self.views.insert(id.clone(), Arc::new(view));
        self.order.push_back(id.clone());
        id
    }

    pub fn get(&self, id: &ViewId) -> Option<Arc<PageView>> {
        self.views.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(MAX_VIEWS)
    }
}
