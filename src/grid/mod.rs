//! The grid controller.
//!
//! [`Grid`] owns the current [`GridSnapshot`] and turns inputs into new
//! snapshots. A snapshot is never mutated once published; every operation
//! builds a successor (sharing unchanged parts through `Arc`) and swaps it
//! in, so a reader holding the previous snapshot always sees a consistent
//! view.

mod scroll;
mod state;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

pub use scroll::{CellRect, CellState, ScrollRequest, VisibleCell};
pub use state::{CellKey, GridStateSnapshot};

use crate::config::GridConfig;
use crate::editor::{CellValues, CommitArgs, Effect, FillArgs, Input, NavContext, PasteArgs};
use crate::error::{GridError, Result};
use crate::grouping::{Expansion, FlatRows};
use crate::layout::{
    resize_column, ColumnLayout, ColumnSet, ColumnSizing, Overscan, ResizeLimits, RowGeometry, Viewport,
    ViewportCalculator, ViewportRange,
};
use crate::sort::SortState;
use crate::types::{ColumnDef, EditPhase, Mode, Position, RowKey, Selection, SelectionState, SortColumn};

/// Host callbacks. Each may refuse a change by returning an error, in which
/// case the grid keeps its prior state.
pub trait GridDelegate: CellValues {
    /// Persist an edited value.
    fn commit(&mut self, args: &CommitArgs) -> Result<()>;

    /// Apply a drag-fill.
    fn fill(&mut self, _args: &FillArgs) -> Result<()> {
        Err(GridError::CommitRejected("fill is not supported".to_string()))
    }

    /// Apply pasted values.
    fn paste(&mut self, _args: &PasteArgs) -> Result<()> {
        Err(GridError::CommitRejected("paste is not supported".to_string()))
    }

    /// The sort order changed; the host re-sorts and calls `set_rows`.
    fn sort_changed(&mut self, _sort: &[SortColumn]) -> Result<()> {
        Ok(())
    }

    /// Expansion changed; return the re-flattened rows, if the host groups.
    fn reflatten(&mut self, _expansion: &Expansion) -> Option<FlatRows> {
        None
    }
}

/// Immutable view of the whole grid at one instant.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    pub config: Arc<GridConfig>,
    pub rows: Arc<FlatRows>,
    pub columns: Arc<ColumnSet>,
    pub sizing: Arc<ColumnSizing>,
    pub column_layout: Arc<ColumnLayout>,
    pub geometry: Arc<RowGeometry>,
    pub expansion: Arc<Expansion>,
    pub sort: SortState,
    pub state: SelectionState,
    /// Full grid viewport including header and pinned rows
    pub viewport: Viewport,
    pub range: ViewportRange,
}

impl GridSnapshot {
    /// Height taken by header rows and pinned summary rows.
    pub fn chrome_height(&self) -> f32 {
        let headers = self.columns.header_row_count() as f32 * self.config.header_row_height;
        let pinned = (self.rows.top().len() + self.rows.bottom().len()) as f32 * self.config.summary_row_height;
        headers + pinned
    }

    /// The scrollable body: full viewport minus header and pinned rows.
    pub fn body_viewport(&self) -> Viewport {
        self.viewport.shrink_height(self.chrome_height())
    }

    pub fn body_height(&self) -> f32 {
        self.body_viewport().height
    }

    fn clamp_scroll(&mut self) {
        let mut body = self.body_viewport();
        body.clamp_scroll(self.column_layout.total_width(), self.geometry.total_height());
        self.viewport.scroll_top = body.scroll_top;
        self.viewport.scroll_left = body.scroll_left;
    }

    fn overscan(&self) -> Overscan {
        Overscan {
            rows: self.config.overscan_rows,
            cols: self.config.overscan_cols,
        }
    }

    fn nav_context<'a>(&'a self, values: &'a dyn CellValues) -> NavContext<'a> {
        NavContext {
            rows: &self.rows,
            columns: &self.columns,
            values,
            config: &self.config,
            geometry: &self.geometry,
            body_height: self.body_height(),
        }
    }
}

/// The grid controller.
pub struct Grid<D> {
    delegate: D,
    current: Arc<GridSnapshot>,
    previous: Option<Arc<GridSnapshot>>,
    calculator: ViewportCalculator,
    pending_scroll: Option<ScrollRequest>,
}

impl<D: GridDelegate> Grid<D> {
    /// Build a grid over `rows` with the given column declarations.
    pub fn new(config: GridConfig, columns: &[ColumnDef], rows: FlatRows, delegate: D) -> Result<Self> {
        config.validate()?;
        let columns = ColumnSet::new(columns)?;
        let viewport = Viewport::default();
        let sizing = ColumnSizing::default();
        let column_layout = ColumnLayout::resolve(&columns, viewport.width, &sizing, config.min_column_width);
        let geometry = RowGeometry::for_mode(config.row_height, rows.keys());

        let snapshot = GridSnapshot {
            config: Arc::new(config),
            rows: Arc::new(rows),
            columns: Arc::new(columns),
            sizing: Arc::new(sizing),
            column_layout: Arc::new(column_layout),
            geometry: Arc::new(geometry),
            expansion: Arc::new(Expansion::default()),
            sort: SortState::default(),
            state: SelectionState::default(),
            viewport,
            range: ViewportRange::default(),
        };
        let mut grid = Self {
            delegate,
            current: Arc::new(snapshot.clone()),
            previous: None,
            calculator: ViewportCalculator::new(),
            pending_scroll: None,
        };
        grid.publish(snapshot);
        grid.previous = None;
        Ok(grid)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<GridSnapshot> {
        Arc::clone(&self.current)
    }

    /// The snapshot replaced by the last change.
    pub fn previous(&self) -> Option<Arc<GridSnapshot>> {
        self.previous.as_ref().map(Arc::clone)
    }

    pub fn state(&self) -> &SelectionState {
        &self.current.state
    }

    /// Keys of the selected rows.
    pub fn selected_rows(&self) -> &BTreeSet<RowKey> {
        &self.current.state.selected_rows
    }

    /// Whether every selectable data row is selected.
    pub fn all_rows_selected(&self) -> bool {
        let selected = &self.current.state.selected_rows;
        let mut selectable = self
            .current
            .rows
            .all_data_keys()
            .into_iter()
            .filter(|key| self.delegate.is_row_selectable(key))
            .peekable();
        selectable.peek().is_some() && selectable.all(|key| selected.contains(&key))
    }

    pub fn visible_range(&self) -> ViewportRange {
        self.current.range
    }

    pub fn config(&self) -> &GridConfig {
        &self.current.config
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Recompute derived geometry and the viewport range, then swap in.
    fn publish(&mut self, mut next: GridSnapshot) {
        if next.geometry.is_stale() {
            Arc::make_mut(&mut next.geometry).rebuild();
        }
        next.clamp_scroll();
        let body = next.body_viewport();
        next.range = self
            .calculator
            .compute(&next.geometry, &next.column_layout, &body, next.overscan());
        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        self.previous = Some(previous);
    }

    fn successor(&self) -> GridSnapshot {
        GridSnapshot::clone(&self.current)
    }

    fn relayout_columns(next: &mut GridSnapshot) {
        next.column_layout = Arc::new(ColumnLayout::resolve(
            &next.columns,
            next.viewport.width,
            &next.sizing,
            next.config.min_column_width,
        ));
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Feed one input through the state machine and perform its effects.
    ///
    /// Returns every effect produced, including those of commit verdicts,
    /// so the host can act on clipboard and edit notifications.
    pub fn dispatch(&mut self, input: &Input) -> Vec<Effect> {
        let (state, effects) = {
            let snap = &self.current;
            let ctx = snap.nav_context(&self.delegate);
            snap.state.transition(input, &ctx)
        };
        let mut next = self.successor();
        next.state = state;
        self.publish(next);

        let mut all = Vec::with_capacity(effects.len());
        for effect in effects {
            let mut follow_up = Vec::new();
            self.perform(&effect, &mut follow_up);
            all.push(effect);
            all.append(&mut follow_up);
        }
        all
    }

    fn perform(&mut self, effect: &Effect, follow_up: &mut Vec<Effect>) {
        match effect {
            Effect::Reveal { position } => self.request_reveal(*position),
            Effect::Commit(args) => {
                let verdict = self.delegate.commit(args);
                if let Err(err) = &verdict {
                    warn!(%err, row = %args.row_key, column = %args.column_key, "commit rejected");
                }
                let pending = self
                    .current
                    .state
                    .editing()
                    .is_some_and(|s| s.phase == EditPhase::PendingCommit);
                if pending {
                    let input = Input::CommitResolved {
                        error: verdict.err().map(|e| e.to_string()),
                    };
                    follow_up.extend(self.dispatch(&input));
                }
            }
            Effect::Fill(args) => {
                if let Err(err) = self.delegate.fill(args) {
                    warn!(%err, range = ?args.range, "fill rejected");
                    let mut next = self.successor();
                    next.state.focus = Some(args.source);
                    next.state.selection = Some(Selection::collapsed(args.source));
                    self.publish(next);
                }
            }
            Effect::Paste(args) => {
                if let Err(err) = self.delegate.paste(args) {
                    warn!(%err, range = ?args.range, "paste rejected");
                }
            }
            Effect::ToggleGroup { key } => {
                self.toggle_group(key);
            }
            Effect::EditStarted { .. }
            | Effect::EditEnded { .. }
            | Effect::Copy { .. }
            | Effect::RowSelectionChanged { .. } => {}
        }
    }

    /// Queue a scroll that reveals `position`. A newer request replaces an
    /// older one that the host has not applied yet.
    pub fn request_reveal(&mut self, position: Position) {
        if let Some(request) = self.current.reveal(position) {
            debug!(?position, ?request, "scroll requested");
            self.pending_scroll = Some(request);
        }
    }

    /// Take the pending scroll request, if any.
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// The host scrolled.
    pub fn scroll(&mut self, scroll_top: f32, scroll_left: f32) -> ViewportRange {
        let mut next = self.successor();
        next.viewport.scroll_top = scroll_top;
        next.viewport.scroll_left = scroll_left;
        self.publish(next);
        self.current.range
    }

    /// The host container changed size.
    pub fn resize(&mut self, width: f32, height: f32) -> ViewportRange {
        let mut next = self.successor();
        next.viewport.resize(width, height);
        Self::relayout_columns(&mut next);
        self.publish(next);
        self.current.range
    }

    /// Report a measured row height.
    pub fn measure_row(&mut self, key: &RowKey, height: f32) -> bool {
        self.measure_rows(std::iter::once((key, height)))
    }

    /// Report a batch of measured heights; one table rebuild covers all.
    pub fn measure_rows<'a>(&mut self, measured: impl IntoIterator<Item = (&'a RowKey, f32)>) -> bool {
        let mut next = self.successor();
        let geometry = Arc::make_mut(&mut next.geometry);
        let mut changed = false;
        for (key, height) in measured {
            changed |= geometry.measure(key, height);
        }
        if changed {
            self.publish(next);
        }
        changed
    }

    /// Measured content widths of auto-sized columns.
    pub fn measure_columns<'a>(&mut self, measured: impl IntoIterator<Item = (&'a str, f32)>) {
        let mut next = self.successor();
        let sizing = Arc::make_mut(&mut next.sizing);
        for (key, width) in measured {
            if width.is_finite() && width >= 0.0 {
                sizing.measured.insert(key.to_string(), width);
            }
        }
        Self::relayout_columns(&mut next);
        self.publish(next);
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Replace the flat row sequence.
    ///
    /// Focus, selection and an active edit follow their rows by key. Cells
    /// whose row disappeared lose focus, and an edit on a removed row is
    /// cancelled. Measured heights persist by key.
    pub fn set_rows(&mut self, rows: FlatRows) -> Vec<Effect> {
        let mut next = self.successor();
        let old_rows = Arc::clone(&next.rows);
        let remap = |p: Position| -> Option<Position> {
            let key = &old_rows.get(p.row)?.key;
            rows.position(key).map(|row| Position::new(row, p.col))
        };

        let mut effects = Vec::new();
        let mut state = next.state.clone();
        state.focus = state.focus.and_then(remap);
        state.selection = state.selection.and_then(|s| {
            Some(Selection {
                anchor: remap(s.anchor)?,
                head: remap(s.head)?,
            })
        });
        state.mode = match std::mem::take(&mut state.mode) {
            Mode::Editing(mut session) => match remap(session.position) {
                Some(position) => {
                    session.position = position;
                    Mode::Editing(session)
                }
                None => {
                    debug!(position = ?session.position, "row removed while editing, edit cancelled");
                    effects.push(Effect::EditEnded {
                        position: session.position,
                        committed: false,
                    });
                    Mode::Idle
                }
            },
            Mode::DragFilling(_) | Mode::Idle => Mode::Idle,
        };

        Arc::make_mut(&mut next.geometry).relayout(rows.keys());
        next.state = state;
        next.rows = Arc::new(rows);
        self.publish(next);
        effects
    }

    /// Replace the column declarations, keeping width overrides and focus by key.
    pub fn set_columns(&mut self, defs: &[ColumnDef]) -> Result<()> {
        let columns = ColumnSet::new(defs)?;
        let mut next = self.successor();
        Self::replace_columns(&mut next, columns);
        self.publish(next);
        Ok(())
    }

    fn replace_columns(next: &mut GridSnapshot, columns: ColumnSet) {
        let old = Arc::clone(&next.columns);
        let remap = |p: Position| -> Option<Position> {
            let key = &old.column(p.col)?.key;
            columns.index_of(key).map(|col| Position::new(p.row, col))
        };
        let mut state = next.state.clone();
        state.focus = state.focus.and_then(remap);
        state.selection = state.selection.and_then(|s| {
            Some(Selection {
                anchor: remap(s.anchor)?,
                head: remap(s.head)?,
            })
        });
        state.mode = match std::mem::take(&mut state.mode) {
            Mode::Editing(mut session) => match remap(session.position) {
                Some(position) => {
                    session.position = position;
                    Mode::Editing(session)
                }
                None => Mode::Idle,
            },
            Mode::DragFilling(_) | Mode::Idle => Mode::Idle,
        };
        let sizing = Arc::make_mut(&mut next.sizing);
        sizing.overrides.retain(|key, _| columns.index_of(key).is_some());
        next.state = state;
        next.columns = Arc::new(columns);
        Self::relayout_columns(next);
    }

    /// Resize a column. A rejected resize leaves everything unchanged.
    pub fn resize_column(&mut self, key: &str, width: f32) -> bool {
        let snap = &self.current;
        let limits = ResizeLimits {
            available: snap.viewport.width,
            default_min: snap.config.min_column_width,
            push: snap.config.push_resize,
        };
        match resize_column(&snap.columns, &snap.column_layout, &snap.sizing, key, width, limits) {
            Ok(sizing) => {
                let mut next = self.successor();
                next.sizing = Arc::new(sizing);
                Self::relayout_columns(&mut next);
                self.publish(next);
                true
            }
            Err(err) => {
                warn!(%err, key, width, "column resize rejected");
                false
            }
        }
    }

    /// Move column `source` to `target`'s position. Rejected moves are no-ops.
    pub fn reorder_columns(&mut self, source: &str, target: &str) -> bool {
        match self.current.columns.reorder(source, target) {
            Ok(columns) => {
                let mut next = self.successor();
                Self::replace_columns(&mut next, columns);
                self.publish(next);
                true
            }
            Err(err) => {
                warn!(%err, source, target, "column reorder rejected");
                false
            }
        }
    }

    /// Header click: cycle the column's sort. The delegate may veto.
    pub fn header_click(&mut self, column_key: &str, multi: bool) -> bool {
        let Some(column) = self
            .current
            .columns
            .index_of(column_key)
            .and_then(|i| self.current.columns.column(i))
        else {
            return false;
        };
        let Some(sort) = self.current.sort.toggled(column, multi) else {
            return false;
        };
        if let Err(err) = self.delegate.sort_changed(sort.columns()) {
            warn!(%err, column_key, "sort change rejected");
            return false;
        }
        let mut next = self.successor();
        next.sort = sort;
        self.publish(next);
        true
    }

    /// Expand or collapse a group or tree row.
    ///
    /// `key` is a group id, a group header's row key or the key of a tree row
    /// with children. Returns false for any other key.
    pub fn toggle_group(&mut self, key: &RowKey) -> bool {
        let rows = &self.current.rows;
        let (id, currently_expanded) = if let Some(group) = rows.group(key) {
            (group.id.clone(), group.expanded)
        } else {
            match rows.position(key).and_then(|index| rows.get(index)) {
                Some(row) if row.is_group() || row.has_children => (row.expansion_key().clone(), row.expanded),
                _ => {
                    warn!(%key, "toggle ignored: not an expandable row");
                    return false;
                }
            }
        };
        let mut expansion = Expansion::clone(&self.current.expansion);
        expansion.toggle(&id, currently_expanded);
        self.apply_expansion(expansion);
        true
    }

    fn apply_expansion(&mut self, expansion: Expansion) {
        let rows = self.delegate.reflatten(&expansion);
        let mut next = self.successor();
        next.expansion = Arc::new(expansion);
        self.publish(next);
        if let Some(rows) = rows {
            self.set_rows(rows);
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Capture the host-persistable state.
    pub fn save_state(&self) -> GridStateSnapshot {
        GridStateSnapshot::capture(&self.current)
    }

    /// Restore a saved state. Parts that no longer apply (unknown rows or
    /// columns, a column order that splits a group) are skipped.
    pub fn restore_state(&mut self, saved: &GridStateSnapshot) {
        if saved.expansion != *self.current.expansion {
            self.apply_expansion(saved.expansion.clone());
        }

        let mut next = self.successor();
        if !saved.column_order.is_empty() {
            match next.columns.with_order(&saved.column_order) {
                Ok(columns) => Self::replace_columns(&mut next, columns),
                Err(err) => warn!(%err, "saved column order ignored"),
            }
        }
        let sizing = Arc::make_mut(&mut next.sizing);
        sizing.overrides = saved
            .column_widths
            .iter()
            .filter(|(key, _)| next.columns.index_of(key).is_some())
            .map(|(key, &width)| (key.clone(), width))
            .collect();
        Self::relayout_columns(&mut next);
        next.sort = SortState::new(saved.sort.clone());
        next.state = saved.resolve_state(&next.rows, &next.columns);
        next.viewport.scroll_top = saved.scroll_top;
        next.viewport.scroll_left = saved.scroll_left;
        self.publish(next);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::editor::Key;
    use crate::types::{Column, FlatRow};

    struct Values;

    impl CellValues for Values {
        fn cell_text(&self, row: &FlatRow, column: &Column) -> String {
            format!("{}:{}", row.key, column.key)
        }
    }

    impl GridDelegate for Values {
        fn commit(&mut self, _args: &CommitArgs) -> Result<()> {
            Ok(())
        }
    }

    fn grid(rows: usize) -> Grid<Values> {
        let keys: Vec<usize> = (0..rows).collect();
        let columns: [ColumnDef; 2] = [Column::new("a").fixed(100.0).into(), Column::new("b").fixed(100.0).into()];
        let mut grid = Grid::new(
            GridConfig::default(),
            &columns,
            FlatRows::from_rows(&keys, |&k| RowKey::from(k)),
            Values,
        )
        .unwrap();
        grid.resize(200.0, 35.0 * 11.0);
        grid
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let mut grid = grid(100);
        let before = grid.snapshot();
        grid.dispatch(&Input::click(3, 1));
        assert_eq!(before.state.focus, None);
        assert_eq!(grid.state().focus, Some(Position::new(3, 1)));
        assert_eq!(grid.previous().unwrap().state.focus, None);
    }

    #[test]
    fn test_keyboard_navigation_requests_scroll() {
        let mut grid = grid(100);
        grid.dispatch(&Input::click(0, 0));
        grid.take_scroll_request();
        for _ in 0..10 {
            grid.dispatch(&Input::key(Key::ArrowDown));
        }
        // Body shows 10 rows below one header row; row 10 needs a scroll
        let request = grid.take_scroll_request().unwrap();
        assert_eq!(request.top, Some(35.0));
        assert_eq!(request.left, None);
        assert!(grid.take_scroll_request().is_none());

        let range = grid.scroll(35.0, 0.0);
        assert!(range.contains_row(10));
    }

    #[test]
    fn test_set_rows_cancels_edit_on_removed_row() {
        let mut grid = grid(5);
        grid.dispatch(&Input::click(2, 0));
        grid.dispatch(&Input::key(Key::F2));
        assert!(grid.state().editing().is_some());

        let keys = [0usize, 1, 3, 4];
        let effects = grid.set_rows(FlatRows::from_rows(&keys, |&k| RowKey::from(k)));
        assert!(grid.state().editing().is_none());
        assert_eq!(grid.state().focus, None);
        assert!(matches!(effects[0], Effect::EditEnded { committed: false, .. }));
    }

    #[test]
    fn test_set_rows_follows_focus_by_key() {
        let mut grid = grid(5);
        grid.dispatch(&Input::click(3, 1));
        let keys = [4usize, 3, 2, 1, 0];
        grid.set_rows(FlatRows::from_rows(&keys, |&k| RowKey::from(k)));
        assert_eq!(grid.state().focus, Some(Position::new(1, 1)));
    }
}
