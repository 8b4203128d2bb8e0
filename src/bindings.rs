//! JavaScript surface.
//!
//! [`GridView`] wraps a [`Grid`] whose delegate forwards to a plain object
//! of JS callbacks:
//!
//! | callback            | arguments                       | required |
//! |---------------------|---------------------------------|----------|
//! | `cellText`          | `(row, columnKey) -> string`    | yes      |
//! | `editValue`         | `(row, columnKey) -> string`    | no       |
//! | `isEditable`        | `(row, columnKey) -> boolean`   | no       |
//! | `isRowSelectable`   | `(rowKey) -> boolean`           | no       |
//! | `colSpan`           | `(args) -> number`              | no       |
//! | `commit`            | `(args)`                        | no       |
//! | `fill`              | `(args)`                        | no       |
//! | `paste`             | `(args)`                        | no       |
//! | `sortChanged`       | `(sortColumns)`                 | no       |
//! | `expansionChanged`  | `(expansion) -> FlatRow[]?`     | no       |
//!
//! A callback refuses a change by throwing or returning `false`.

use js_sys::{Function, Object, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::GridConfig;
use crate::editor::{CellValues, CommitArgs, FillArgs, Input, Key, Modifiers, PasteArgs};
use crate::error::{GridError, Result};
use crate::grid::{CellRect, CellState, Grid, GridDelegate, GridStateSnapshot};
use crate::grouping::{Expansion, FlatRows};
use crate::layout::ColSpanArgs;
use crate::types::{Column, ColumnDef, FlatRow, Position, RowKey, SortColumn};

fn to_js<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue) -> std::result::Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("Deserialization error: {e}")))
}

/// Delegate backed by a JS callbacks object.
struct JsDelegate {
    callbacks: Object,
}

impl JsDelegate {
    fn callback(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.callbacks, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn cell_call(&self, name: &str, row: &FlatRow, column: &Column) -> Option<JsValue> {
        let callback = self.callback(name)?;
        let row = to_js(row).ok()?;
        callback
            .call2(&JsValue::NULL, &row, &JsValue::from_str(&column.key))
            .ok()
    }

    /// Invoke a change callback; a missing callback refuses the change.
    fn change(&self, name: &str, args: &impl Serialize) -> Result<()> {
        let callback = self
            .callback(name)
            .ok_or_else(|| GridError::CommitRejected(format!("no {name} callback")))?;
        let args = to_js(args)?;
        let verdict = callback.call1(&JsValue::NULL, &args)?;
        if verdict.as_bool() == Some(false) {
            return Err(GridError::CommitRejected(format!("{name} refused")));
        }
        Ok(())
    }
}

impl CellValues for JsDelegate {
    fn cell_text(&self, row: &FlatRow, column: &Column) -> String {
        self.cell_call("cellText", row, column)
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn edit_value(&self, row: &FlatRow, column: &Column) -> String {
        match self.cell_call("editValue", row, column).and_then(|v| v.as_string()) {
            Some(value) => value,
            None => self.cell_text(row, column),
        }
    }

    fn is_editable(&self, row: &FlatRow, column: &Column) -> bool {
        match self.cell_call("isEditable", row, column).and_then(|v| v.as_bool()) {
            Some(editable) => editable,
            None => row.is_data() && column.editable,
        }
    }

    fn is_row_selectable(&self, key: &RowKey) -> bool {
        self.callback("isRowSelectable")
            .and_then(|callback| callback.call1(&JsValue::NULL, &JsValue::from_str(key.as_str())).ok())
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    fn col_span(&self, args: &ColSpanArgs<'_>) -> usize {
        let Some(callback) = self.callback("colSpan") else {
            return 1;
        };
        to_js(args)
            .ok()
            .and_then(|args| callback.call1(&JsValue::NULL, &args).ok())
            .and_then(|v| from_js::<usize>(v).ok())
            .map_or(1, |span| span.max(1))
    }
}

impl GridDelegate for JsDelegate {
    fn commit(&mut self, args: &CommitArgs) -> Result<()> {
        self.change("commit", args)
    }

    fn fill(&mut self, args: &FillArgs) -> Result<()> {
        self.change("fill", args)
    }

    fn paste(&mut self, args: &PasteArgs) -> Result<()> {
        self.change("paste", args)
    }

    fn sort_changed(&mut self, sort: &[SortColumn]) -> Result<()> {
        if self.callback("sortChanged").is_none() {
            return Ok(());
        }
        self.change("sortChanged", &sort)
    }

    fn reflatten(&mut self, expansion: &Expansion) -> Option<FlatRows> {
        let callback = self.callback("expansionChanged")?;
        let rows = callback.call1(&JsValue::NULL, &to_js(expansion).ok()?).ok()?;
        if rows.is_undefined() || rows.is_null() {
            return None;
        }
        let rows: Vec<FlatRow> = from_js(rows).ok()?;
        Some(FlatRows::new(rows))
    }
}

/// One materialized cell as handed to JS.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsCell<'a> {
    position: Position,
    row_key: &'a RowKey,
    column_key: &'a str,
    col_span: usize,
    state: CellState,
    rect: CellRect,
}

/// Grid controller for the browser.
#[wasm_bindgen]
pub struct GridView {
    grid: Grid<JsDelegate>,
}

#[wasm_bindgen]
impl GridView {
    /// Create a grid over ungrouped rows identified by `row_keys`.
    ///
    /// `config` may be `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        columns: JsValue,
        row_keys: JsValue,
        callbacks: Object,
    ) -> std::result::Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            from_js(config)?
        };
        let columns: Vec<ColumnDef> = from_js(columns)?;
        let keys: Vec<String> = from_js(row_keys)?;
        let rows = FlatRows::from_rows(&keys, |k| RowKey::new(k.as_str()));
        let grid = Grid::new(config, &columns, rows, JsDelegate { callbacks })?;
        Ok(GridView { grid })
    }

    /// Feed one input object (`{ type: "pointerDown", cell: {row, col} }` ...).
    /// Returns the produced effects.
    #[wasm_bindgen]
    pub fn dispatch(&mut self, input: JsValue) -> std::result::Result<JsValue, JsValue> {
        let input: Input = from_js(input)?;
        to_js(&self.grid.dispatch(&input))
    }

    /// Feed a DOM `keydown`. Unknown keys produce no effects.
    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> std::result::Result<JsValue, JsValue> {
        let Some(key) = Key::from_name(key) else {
            return Ok(js_sys::Array::new().into());
        };
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        to_js(&self.grid.dispatch(&Input::key_with(key, modifiers)))
    }

    /// The host scrolled. Returns the new visible range.
    #[wasm_bindgen]
    pub fn scroll(&mut self, scroll_top: f32, scroll_left: f32) -> std::result::Result<JsValue, JsValue> {
        let range = self.grid.scroll(scroll_top, scroll_left);
        to_js(&range)
    }

    /// The container changed size. Returns the new visible range.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: f32, height: f32) -> std::result::Result<JsValue, JsValue> {
        let range = self.grid.resize(width, height);
        to_js(&range)
    }

    /// Pending `{top?, left?}` scroll, or `null`.
    #[wasm_bindgen(js_name = "takeScrollRequest")]
    pub fn take_scroll_request(&mut self) -> std::result::Result<JsValue, JsValue> {
        match self.grid.take_scroll_request() {
            Some(request) => to_js(&request),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = "measureRow")]
    pub fn measure_row(&mut self, key: &str, height: f32) -> bool {
        self.grid.measure_row(&RowKey::from(key), height)
    }

    /// Measured widths of auto columns as `{ [columnKey]: px }`.
    #[wasm_bindgen(js_name = "measureColumns")]
    pub fn measure_columns(&mut self, widths: JsValue) -> std::result::Result<(), JsValue> {
        let widths: std::collections::HashMap<String, f32> = from_js(widths)?;
        self.grid
            .measure_columns(widths.iter().map(|(k, &w)| (k.as_str(), w)));
        Ok(())
    }

    #[wasm_bindgen(js_name = "visibleRange")]
    pub fn visible_range(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.grid.visible_range())
    }

    /// Every cell to render: keys, span, state flags and rectangle.
    #[wasm_bindgen(js_name = "visibleCells")]
    pub fn visible_cells(&self) -> std::result::Result<JsValue, JsValue> {
        let snapshot = self.grid.snapshot();
        let mut cells = Vec::new();
        snapshot.for_each_spanned_cell(self.grid.delegate(), |cell| {
            cells.push(JsCell {
                position: cell.position,
                row_key: &cell.row.key,
                column_key: &cell.column.key,
                col_span: cell.col_span,
                state: cell.state,
                rect: cell.rect,
            });
        });
        to_js(&cells)
    }

    /// Header cells per level, group rows first.
    #[wasm_bindgen(js_name = "headerSpans")]
    pub fn header_spans(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.grid.snapshot().columns.header_spans())
    }

    #[wasm_bindgen(js_name = "columnWidths")]
    pub fn column_widths(&self) -> Vec<f32> {
        self.grid.snapshot().column_layout.widths().to_vec()
    }

    #[wasm_bindgen(js_name = "totalHeight")]
    pub fn total_height(&self) -> f32 {
        self.grid.snapshot().geometry.total_height()
    }

    /// Focus, selection and edit mode.
    #[wasm_bindgen]
    pub fn state(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(self.grid.state())
    }

    /// Keys of the selected rows, sorted.
    #[wasm_bindgen(js_name = "selectedRows")]
    pub fn selected_rows(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(self.grid.selected_rows())
    }

    /// State of the header select-all checkbox.
    #[wasm_bindgen(js_name = "allRowsSelected")]
    pub fn all_rows_selected(&self) -> bool {
        self.grid.all_rows_selected()
    }

    /// Replace the row sequence with pre-flattened rows.
    #[wasm_bindgen(js_name = "setRows")]
    pub fn set_rows(
        &mut self,
        rows: JsValue,
        pinned_top: usize,
        pinned_bottom: usize,
    ) -> std::result::Result<JsValue, JsValue> {
        let rows: Vec<FlatRow> = from_js(rows)?;
        let rows = FlatRows::new(rows).with_pinned(pinned_top, pinned_bottom);
        to_js(&self.grid.set_rows(rows))
    }

    #[wasm_bindgen(js_name = "setColumns")]
    pub fn set_columns(&mut self, columns: JsValue) -> std::result::Result<(), JsValue> {
        let columns: Vec<ColumnDef> = from_js(columns)?;
        self.grid.set_columns(&columns)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "headerClick")]
    pub fn header_click(&mut self, column_key: &str, multi: bool) -> bool {
        self.grid.header_click(column_key, multi)
    }

    #[wasm_bindgen(js_name = "resizeColumn")]
    pub fn resize_column(&mut self, column_key: &str, width: f32) -> bool {
        self.grid.resize_column(column_key, width)
    }

    #[wasm_bindgen(js_name = "reorderColumns")]
    pub fn reorder_columns(&mut self, source: &str, target: &str) -> bool {
        self.grid.reorder_columns(source, target)
    }

    #[wasm_bindgen(js_name = "toggleGroup")]
    pub fn toggle_group(&mut self, key: &str) -> bool {
        self.grid.toggle_group(&RowKey::from(key))
    }

    /// Persistable state as a JSON string.
    #[wasm_bindgen(js_name = "saveState")]
    pub fn save_state(&self) -> std::result::Result<String, JsValue> {
        Ok(self.grid.save_state().to_json()?)
    }

    #[wasm_bindgen(js_name = "restoreState")]
    pub fn restore_state(&mut self, json: &str) -> std::result::Result<(), JsValue> {
        let saved = GridStateSnapshot::from_json(json)?;
        self.grid.restore_state(&saved);
        Ok(())
    }
}
