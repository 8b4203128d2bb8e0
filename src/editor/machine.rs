//! The transition function.

use tracing::debug;

use super::navigation::{next_position, Motion};
use super::{fill_range, Effect, FillArgs, Input, Key, Modifiers, NavContext};
use crate::clipboard;
use crate::config::EnterCommitMove;
use crate::types::{
    AfterCommit, CellRange, DragFill, EditPhase, EditSession, Mode, Position, Selection, SelectionState,
};

impl SelectionState {
    /// Apply one input, returning the successor state and the effects the
    /// caller must perform. `self` is never modified.
    pub fn transition(&self, input: &Input, ctx: &NavContext<'_>) -> (Self, Vec<Effect>) {
        let mut next = self.clone();
        next.clamp_to(ctx.row_count(), ctx.col_count());
        let mut effects = Vec::new();

        match input {
            Input::SelectRow { row, selected, shift } => {
                next.select_row(*row, *selected, *shift, ctx, &mut effects);
            }
            Input::SelectAllRows { selected } => next.select_all_rows(*selected, ctx, &mut effects),
            _ => match std::mem::take(&mut next.mode) {
                Mode::Idle => next.on_idle(input, ctx, &mut effects),
                Mode::Editing(session) => next.on_editing(session, input, ctx, &mut effects),
                Mode::DragFilling(fill) => next.on_drag_filling(fill, input, ctx, &mut effects),
            },
        }

        if next != *self {
            debug!(?input, focus = ?next.focus, mode = ?next.mode, "selection state changed");
        }
        (next, effects)
    }

    /// Drop coordinates outside `[0, rows) x [0, cols)`.
    pub(crate) fn clamp_to(&mut self, rows: usize, cols: usize) {
        self.focus = self.focus.and_then(|p| p.clamp(rows, cols));
        self.selection = self.selection.and_then(|s| {
            Some(Selection {
                anchor: s.anchor.clamp(rows, cols)?,
                head: s.head.clamp(rows, cols)?,
            })
        });
        let out_of_bounds = |p: Position| p.row >= rows || p.col >= cols;
        let stale = match &self.mode {
            Mode::Idle => false,
            Mode::Editing(session) => out_of_bounds(session.position),
            Mode::DragFilling(fill) => out_of_bounds(fill.source),
        };
        if stale {
            self.mode = Mode::Idle;
        }
    }

    fn move_focus(&mut self, target: Position, effects: &mut Vec<Effect>) {
        self.focus = Some(target);
        self.selection = Some(Selection::collapsed(target));
        effects.push(Effect::Reveal { position: target });
    }

    // ------------------------------------------------------------------
    // Idle
    // ------------------------------------------------------------------

    fn on_idle(&mut self, input: &Input, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        match input {
            Input::KeyDown { key, modifiers } => self.idle_key(*key, *modifiers, ctx, effects),
            Input::PointerDown { cell, modifiers } => {
                self.idle_pointer_down(*cell, *modifiers, ctx, effects);
            }
            Input::FillHandleDown => {
                let Some(source) = self.focus else {
                    return;
                };
                if self.selection.is_some() && ctx.is_editable(source) {
                    self.mode = Mode::DragFilling(DragFill {
                        source,
                        target: source,
                        range: CellRange::single(source),
                    });
                }
            }
            Input::Paste { text } => self.paste(text, ctx, effects),
            _ => {}
        }
    }

    fn idle_key(&mut self, key: Key, modifiers: Modifiers, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        let Some(focus) = self.focus else {
            // First navigation key focuses the first reachable cell
            if Motion::from_key(key, modifiers, ctx.config.direction).is_some() {
                let origin = Position::new(0, 0);
                if origin.clamp(ctx.row_count(), ctx.col_count()).is_some() {
                    let first = if ctx.is_selectable(0) {
                        origin
                    } else {
                        next_position(origin, Motion::RowStart, ctx)
                    };
                    self.move_focus(first, effects);
                }
            }
            return;
        };

        if modifiers.primary() {
            match key {
                Key::Char('a' | 'A') => {
                    self.select_all(ctx);
                    return;
                }
                Key::Char('c' | 'C') => {
                    self.copy(focus, ctx, effects);
                    return;
                }
                _ => {}
            }
        }

        if let Some(row) = ctx.rows.get(focus.row) {
            if row.is_group() && matches!(key, Key::Enter | Key::F2) {
                effects.push(Effect::ToggleGroup {
                    key: row.expansion_key().clone(),
                });
                return;
            }
            let at_row_start = (0..focus.col).all(|col| !ctx.is_selectable(col));
            let plain = !modifiers.shift && !modifiers.primary();
            if row.has_children && at_row_start && plain {
                let motion = Motion::from_key(key, modifiers, ctx.config.direction);
                let toggles = matches!(
                    (motion, row.expanded),
                    (Some(Motion::Forward), false) | (Some(Motion::Back), true)
                );
                if toggles {
                    effects.push(Effect::ToggleGroup {
                        key: row.expansion_key().clone(),
                    });
                    return;
                }
            }
        }

        let editable = ctx.is_editable(focus);
        match key {
            Key::Enter | Key::F2 if editable => self.start_edit(focus, None, ctx, effects),
            Key::Enter => {
                let target = next_position(focus, Motion::Down, ctx);
                if target != focus {
                    self.move_focus(target, effects);
                }
            }
            Key::Char(c) if editable && !modifiers.primary() && !modifiers.alt => {
                self.start_edit(focus, Some(c.to_string()), ctx, effects);
            }
            Key::Delete | Key::Backspace if editable => {
                let old = ctx.edit_value(focus);
                if let Some(args) = ctx.commit_args(focus, old, String::new()) {
                    effects.push(Effect::Commit(args));
                }
            }
            Key::Escape => {
                self.selection = Some(Selection::collapsed(focus));
            }
            _ => self.navigate(focus, key, modifiers, ctx, effects),
        }
    }

    fn navigate(
        &mut self,
        focus: Position,
        key: Key,
        modifiers: Modifiers,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(motion) = Motion::from_key(key, modifiers, ctx.config.direction) else {
            return;
        };
        let target = next_position(focus, motion, ctx);
        if modifiers.shift && motion.extends_with_shift() {
            let anchor = self.selection.map_or(focus, |s| s.anchor);
            self.focus = Some(target);
            self.selection = Some(Selection { anchor, head: target });
            if target != focus {
                effects.push(Effect::Reveal { position: target });
            }
        } else if target != focus {
            self.move_focus(target, effects);
        } else {
            self.selection = Some(Selection::collapsed(focus));
        }
    }

    fn idle_pointer_down(
        &mut self,
        cell: Position,
        modifiers: Modifiers,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(cell) = cell.clamp(ctx.row_count(), ctx.col_count()) else {
            return;
        };
        if !ctx.is_selectable(cell.col) {
            return;
        }
        let cell = ctx.cell_start(cell);
        if modifiers.shift {
            let anchor = self
                .selection
                .map(|s| s.anchor)
                .or(self.focus)
                .unwrap_or(cell);
            self.focus = Some(cell);
            self.selection = Some(Selection { anchor, head: cell });
            effects.push(Effect::Reveal { position: cell });
        } else {
            self.move_focus(cell, effects);
        }
    }

    fn select_all(&mut self, ctx: &NavContext<'_>) {
        let rows = ctx.row_count();
        let cols = ctx.col_count();
        if rows == 0 || cols == 0 {
            return;
        }
        self.selection = Some(Selection {
            anchor: Position::new(0, 0),
            head: Position::new(rows - 1, cols - 1),
        });
    }

    fn copy(&self, focus: Position, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        let range = self.selected_range().unwrap_or(CellRange::single(focus));
        let text = clipboard::to_tsv(range, |p| ctx.cell_text(p));
        effects.push(Effect::Copy { range, text });
    }

    fn paste(&self, text: &str, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        let Some(origin) = self
            .selected_range()
            .map(|r| Position::new(r.start_row, r.start_col))
            .or(self.focus)
        else {
            return;
        };
        let values = clipboard::parse_tsv(text);
        if let Some(args) = clipboard::paste_target(origin, values, ctx.row_count(), ctx.col_count()) {
            effects.push(Effect::Paste(args));
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn start_edit(
        &mut self,
        position: Position,
        draft: Option<String>,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let original = ctx.edit_value(position);
        let draft = draft.unwrap_or_else(|| original.clone());
        self.selection = Some(Selection::collapsed(position));
        self.mode = Mode::Editing(EditSession {
            position,
            original,
            draft,
            phase: EditPhase::Drafting,
            after_commit: AfterCommit::Stay,
        });
        effects.push(Effect::EditStarted { position });
    }

    fn on_editing(
        &mut self,
        mut session: EditSession,
        input: &Input,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        if session.phase == EditPhase::PendingCommit {
            if let Input::CommitResolved { error } = input {
                match error {
                    None => self.finish_edit(&session, true, ctx, effects),
                    Some(reason) => {
                        debug!(%reason, position = ?session.position, "commit rejected, keeping draft");
                        session.phase = EditPhase::Rejected;
                        self.mode = Mode::Editing(session);
                    }
                }
            } else {
                self.mode = Mode::Editing(session);
            }
            return;
        }

        match input {
            Input::DraftChanged { value } => {
                session.draft.clone_from(value);
                session.phase = EditPhase::Drafting;
                self.mode = Mode::Editing(session);
            }
            Input::KeyDown { key: Key::Escape, .. } => {
                effects.push(Effect::EditEnded {
                    position: session.position,
                    committed: false,
                });
            }
            Input::KeyDown {
                key: Key::Enter,
                ..
            } => {
                let after = match ctx.config.enter_commit {
                    EnterCommitMove::Stay => AfterCommit::Stay,
                    EnterCommitMove::Down => AfterCommit::Down,
                };
                self.request_commit(session, after, ctx, effects);
            }
            Input::KeyDown {
                key: Key::Tab,
                modifiers,
            } => {
                let after = if modifiers.shift {
                    AfterCommit::Previous
                } else {
                    AfterCommit::Next
                };
                self.request_commit(session, after, ctx, effects);
            }
            Input::Blur => self.request_commit(session, AfterCommit::Stay, ctx, effects),
            Input::PointerDown { cell, .. } => {
                match cell.clamp(ctx.row_count(), ctx.col_count()).map(|c| ctx.cell_start(c)) {
                    Some(cell) if cell != session.position => {
                        self.request_commit(session, AfterCommit::Focus(cell), ctx, effects);
                    }
                    _ => self.mode = Mode::Editing(session),
                }
            }
            _ => self.mode = Mode::Editing(session),
        }
    }

    /// Hand the draft to the commit callback; the verdict arrives as
    /// [`Input::CommitResolved`]. An unchanged draft ends the edit directly.
    fn request_commit(
        &mut self,
        mut session: EditSession,
        after: AfterCommit,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        session.after_commit = after;
        if session.draft == session.original {
            self.finish_edit(&session, false, ctx, effects);
            return;
        }
        let Some(args) = ctx.commit_args(session.position, session.original.clone(), session.draft.clone())
        else {
            effects.push(Effect::EditEnded {
                position: session.position,
                committed: false,
            });
            return;
        };
        session.phase = EditPhase::PendingCommit;
        self.mode = Mode::Editing(session);
        effects.push(Effect::Commit(args));
    }

    fn finish_edit(
        &mut self,
        session: &EditSession,
        committed: bool,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let position = session.position;
        self.mode = Mode::Idle;
        effects.push(Effect::EditEnded { position, committed });
        let target = match session.after_commit {
            AfterCommit::Stay => position,
            AfterCommit::Down => next_position(position, Motion::Down, ctx),
            AfterCommit::Next => next_position(position, Motion::Next, ctx),
            AfterCommit::Previous => next_position(position, Motion::Previous, ctx),
            AfterCommit::Focus(p) => p.clamp(ctx.row_count(), ctx.col_count()).unwrap_or(position),
        };
        if target != position {
            self.move_focus(target, effects);
        }
    }

    // ------------------------------------------------------------------
    // Drag-fill
    // ------------------------------------------------------------------

    fn on_drag_filling(&mut self, mut fill: DragFill, input: &Input, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        match input {
            Input::PointerMove { cell } => {
                if let Some(cell) = cell.clamp(ctx.row_count(), ctx.col_count()) {
                    fill.target = cell;
                    fill.range = fill_range(fill.source, cell, ctx.config.fill_axis);
                }
                self.mode = Mode::DragFilling(fill);
            }
            Input::PointerUp => {
                if fill.range == CellRange::single(fill.source) {
                    return;
                }
                let head = if fill.range.start_row == fill.source.row && fill.range.start_col == fill.source.col {
                    Position::new(fill.range.end_row, fill.range.end_col)
                } else {
                    Position::new(fill.range.start_row, fill.range.start_col)
                };
                self.selection = Some(Selection {
                    anchor: fill.source,
                    head,
                });
                effects.push(Effect::Fill(FillArgs {
                    source: fill.source,
                    source_value: ctx.edit_value(fill.source),
                    range: fill.range,
                }));
            }
            Input::KeyDown { key: Key::Escape, .. } => {}
            _ => self.mode = Mode::DragFilling(fill),
        }
    }
}
