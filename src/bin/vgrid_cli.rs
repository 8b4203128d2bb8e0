//! CLI tool for vgrid - lays out a grid description and outputs JSON
//!
//! Reads a JSON grid description (config, columns, rows, viewport, scroll
//! and an optional list of inputs to replay) and prints the resolved
//! column widths, visible range, selection state and produced effects.
//!
//! Usage:
//!   vgrid_cli <grid.json>              # Output JSON to stdout
//!   vgrid_cli <grid.json> -o out.json  # Output JSON to file

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use vgrid::editor::{CellValues, CommitArgs, Effect, Input};
use vgrid::grid::ScrollRequest;
use vgrid::grouping::FlatRows;
use vgrid::layout::{HeaderSpan, ViewportRange};
use vgrid::{Column, ColumnDef, FlatRow, Grid, GridConfig, GridDelegate, RowKey, SelectionState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Description {
    #[serde(default)]
    config: GridConfig,
    columns: Vec<ColumnDef>,
    #[serde(default)]
    row_count: usize,
    /// Explicit keys; overrides `rowCount`
    #[serde(default)]
    row_keys: Option<Vec<String>>,
    /// Measured row heights by key
    #[serde(default)]
    measured: HashMap<String, f32>,
    #[serde(default)]
    viewport: Option<Size>,
    #[serde(default)]
    scroll: Option<Scroll>,
    #[serde(default)]
    inputs: Vec<Input>,
}

#[derive(Deserialize)]
struct Size {
    width: f32,
    height: f32,
}

#[derive(Deserialize)]
struct Scroll {
    #[serde(default)]
    top: f32,
    #[serde(default)]
    left: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    widths: Vec<f32>,
    total_width: f32,
    total_height: f32,
    frozen_start_width: f32,
    frozen_end_width: f32,
    header_spans: Vec<HeaderSpan>,
    range: ViewportRange,
    state: SelectionState,
    effects: Vec<Effect>,
    scroll_request: Option<ScrollRequest>,
}

/// Accepts every change and shows cells as `row:column`.
struct Echo;

impl CellValues for Echo {
    fn cell_text(&self, row: &FlatRow, column: &Column) -> String {
        format!("{}:{}", row.key, column.key)
    }
}

impl GridDelegate for Echo {
    fn commit(&mut self, _args: &CommitArgs) -> vgrid::Result<()> {
        Ok(())
    }
}

fn run(description: Description) -> vgrid::Result<Report> {
    let keys: Vec<RowKey> = match description.row_keys {
        Some(keys) => keys.into_iter().map(RowKey::from).collect(),
        None => (0..description.row_count).map(RowKey::from).collect(),
    };
    let rows = FlatRows::from_rows(&keys, Clone::clone);
    let mut grid = Grid::new(description.config, &description.columns, rows, Echo)?;

    if let Some(size) = description.viewport {
        grid.resize(size.width, size.height);
    }
    let measured: Vec<(RowKey, f32)> = description
        .measured
        .into_iter()
        .map(|(k, h)| (RowKey::from(k), h))
        .collect();
    grid.measure_rows(measured.iter().map(|(k, h)| (k, *h)));
    if let Some(scroll) = description.scroll {
        grid.scroll(scroll.top, scroll.left);
    }

    let mut effects = Vec::new();
    for input in &description.inputs {
        effects.extend(grid.dispatch(input));
    }
    let scroll_request = grid.take_scroll_request();

    let snapshot = grid.snapshot();
    let layout = &snapshot.column_layout;
    Ok(Report {
        widths: layout.widths().to_vec(),
        total_width: layout.total_width(),
        total_height: snapshot.geometry.total_height(),
        frozen_start_width: layout.frozen_start_width(),
        frozen_end_width: layout.frozen_end_width(),
        header_spans: snapshot.columns.header_spans(),
        range: snapshot.range,
        state: snapshot.state.clone(),
        effects,
        scroll_request,
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: vgrid_cli <grid.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let text = match fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let description: Description = match serde_json::from_str(&text) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error parsing grid description: {}", e);
            std::process::exit(1);
        }
    };

    let report = match run(description) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error building grid: {}", e);
            std::process::exit(1);
        }
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&report) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
