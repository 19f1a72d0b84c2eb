/*!
# Water Quality Report

A browser page that shows a water-quality table, lets the user edit it
inline, and sends the finished table to a remote document service.

## Overview

Each page load opens a view with its own table: one row per monitored
substance with randomized measurements. Every column except the substance name can be
edited in place. Saving posts the whole table to the document service,
reads back the record id, fetches the link of the generated document and
opens it in a new tab.

## Architecture

### Frontend Layer
- **Technologies**: HTML, JavaScript
- Renders the table, forwards clicks, enter and blur events to the server,
  shows notifications and opens the document link.

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Grid Model - Authoritative table, edited one row at a time by key
  - Cell Editors - Display/edit state machine per editable cell
  - Save Workflow - POST the table, extract the record id, GET the document link
  - Views - Per page load table, editors and save guard

### Remote Document Service
- `POST <base>/WaterInfolist` stores the table and answers `Record Created : <id>`
- `GET <base>/getpdfoutput?id=<id>` answers with the document link

## Modules

- **row**: Row, column and patch types
- **generator**: Synthetic table generation
- **grid**: Table state and the apply-edit operation
- **editor**: Per-cell editing state machine
- **export**: Request payload and record id extraction
- **remote**: Document service trait and HTTP client
- **notify**: Notification and link-opening capabilities
- **workflow**: The save sequence and its re-entrancy guard
- **views**: Page views keyed by id
- **config**: Settings from defaults, `waterinfo.toml` and environment
- **app**: Routing and handlers (feature `web`)

## REST API Endpoints

- `GET /` - Opens a view with a freshly generated table and serves the page
- `GET /api/views/:view/table` - Columns and rows
- `POST /api/views/:view/cell/activate` - Start editing a cell
- `POST /api/views/:view/cell/commit` - Confirm an edit (enter or blur)
- `POST /api/views/:view/cell/cancel` - Abandon an edit
- `POST /api/views/:view/save` - Run the save workflow, streamed as server-sent events
*/

pub mod config;
pub mod editor;
pub mod export;
pub mod generator;
pub mod grid;
pub mod notify;
pub mod remote;
pub mod row;
pub mod views;
pub mod workflow;

#[cfg(feature = "web")]
pub mod app;

/// Re-export everything from these modules to make it easier to use
pub use editor::*;
pub use export::*;
pub use generator::*;
pub use grid::*;
pub use notify::*;
pub use remote::*;
pub use row::*;
pub use views::*;
pub use workflow::*;
