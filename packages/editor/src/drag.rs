//! # Drag Engine
//!
//! Moves the focused blocks with the pointer and snaps them to alignment
//! lines taken from the unfocused blocks and the container.
//!
//! ## Gesture
//!
//! ```text
//! press ──► armed ──first move──► dragging ──release──► idle
//!             │                    (emits start)        (emits end)
//!             └──────────release (pure click, no signal)──────┘
//! ```
//!
//! Alignment candidates are computed once on press: ten per reference block
//! (five per axis), expressed as the top/left the pressed block would need.
//! Each move tests the candidates in reference order and takes the first one
//! within tolerance on each axis. All focused blocks move by the same delta.

use std::iter;

use layoutpad_common::Rect;
use tracing::{debug, trace};

use crate::document::DocumentHandle;
use crate::events::DragSignals;
use crate::selection::FocusPartition;
use crate::DEFAULT_SNAP_TOLERANCE;

/// Pointer position and modifier state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    pub shift: bool,
}

impl PointerInput {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, shift: false }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// One alignment hypothesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkLine {
    /// Top (or left) the dragged block must have to align
    pub position: f64,

    /// Where the guide line is drawn
    pub display_position: f64,
}

impl MarkLine {
    pub fn new(position: f64, display_position: f64) -> Self {
        Self {
            position,
            display_position,
        }
    }
}

/// Candidates for one drag, horizontal lines snap `top`, vertical lines `left`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkLines {
    pub horizontal: Vec<MarkLine>,
    pub vertical: Vec<MarkLine>,
}

impl MarkLines {
    /// Candidates for a dragged block of `width` x `height` against each reference
    pub fn compute(width: f64, height: f64, references: impl IntoIterator<Item = Rect>) -> Self {
        let mut lines = MarkLines::default();

        for reference in references {
            let (t, h) = (reference.top, reference.height);
            lines.horizontal.extend([
                // top to top
                MarkLine::new(t, t),
                // bottom to bottom
                MarkLine::new(t + h - height, t + h),
                // centre to centre
                MarkLine::new(t + h / 2.0 - height / 2.0, t + h / 2.0),
                // bottom to top
                MarkLine::new(t - height, t),
                // top to bottom
                MarkLine::new(t + h, t + h),
            ]);

            let (l, w) = (reference.left, reference.width);
            lines.vertical.extend([
                MarkLine::new(l, l),
                MarkLine::new(l + w - width, l + w),
                MarkLine::new(l + w / 2.0 - width / 2.0, l + w / 2.0),
                MarkLine::new(l - width, l),
                MarkLine::new(l + w, l + w),
            ]);
        }

        lines
    }

    /// First horizontal candidate strictly within `tolerance` of `top`
    pub fn snap_top(&self, top: f64, tolerance: f64) -> Option<&MarkLine> {
        first_within(&self.horizontal, top, tolerance)
    }

    /// First vertical candidate strictly within `tolerance` of `left`
    pub fn snap_left(&self, left: f64, tolerance: f64) -> Option<&MarkLine> {
        first_within(&self.vertical, left, tolerance)
    }
}

fn first_within(lines: &[MarkLine], target: f64, tolerance: f64) -> Option<&MarkLine> {
    lines
        .iter()
        .find(|line| (line.position - target).abs() < tolerance)
}

/// Guide lines to render for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveMarks {
    /// Y of the horizontal guide
    pub horizontal: Option<f64>,

    /// X of the vertical guide
    pub vertical: Option<f64>,
}

#[derive(Debug)]
struct DragSession {
    start_x: f64,
    start_y: f64,
    start_top: f64,
    start_left: f64,

    /// (index, top, left) of every focused block at press time
    start_positions: Vec<(usize, f64, f64)>,

    lines: MarkLines,
    dragging: bool,
}

#[derive(Debug)]
pub struct DragEngine {
    signals: DragSignals,
    tolerance: f64,
    session: Option<DragSession>,
    marks: ActiveMarks,
}

impl DragEngine {
    pub fn new(signals: DragSignals) -> Self {
        Self::with_tolerance(signals, DEFAULT_SNAP_TOLERANCE)
    }

    pub fn with_tolerance(signals: DragSignals, tolerance: f64) -> Self {
        Self {
            signals,
            tolerance,
            session: None,
            marks: ActiveMarks::default(),
        }
    }

    /// Pointer-down on `blocks[index]`.
    ///
    /// Only a focused block arms a drag; anything else is a no-op. Returns
    /// whether a drag was armed.
    pub fn press(&mut self, doc: &DocumentHandle, index: usize, pointer: PointerInput) -> bool {
        self.marks = ActiveMarks::default();
        self.session = doc.read(|model| {
            let pressed = model.blocks.get(index).filter(|block| block.focus)?;
            let partition = FocusPartition::of(&model.blocks);

            let start_positions = partition
                .focused
                .iter()
                .map(|&i| (i, model.blocks[i].top, model.blocks[i].left))
                .collect();
            let references = partition
                .unfocused
                .iter()
                .map(|&i| model.blocks[i].bounds())
                .chain(iter::once(model.container.bounds()));

            Some(DragSession {
                start_x: pointer.x,
                start_y: pointer.y,
                start_top: pressed.top,
                start_left: pressed.left,
                start_positions,
                lines: MarkLines::compute(pressed.width, pressed.height, references),
                dragging: false,
            })
        });
        self.session.is_some()
    }

    /// Pointer move. Returns whether any block moved.
    pub fn on_move(&mut self, doc: &DocumentHandle, pointer: PointerInput) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if !session.dragging {
            session.dragging = true;
            debug!(blocks = session.start_positions.len(), "drag started");
            self.signals.start.emit();
        }

        let (mut move_x, mut move_y) = (pointer.x, pointer.y);
        if pointer.shift {
            // lock to the dominant axis
            if (move_x - session.start_x).abs() > (move_y - session.start_y).abs() {
                move_y = session.start_y;
            } else {
                move_x = session.start_x;
            }
        }

        let current_top = session.start_top + move_y - session.start_y;
        let current_left = session.start_left + move_x - session.start_x;
        let mut marks = ActiveMarks::default();

        if let Some(line) = session.lines.snap_top(current_top, self.tolerance) {
            move_y = line.position + session.start_y - session.start_top;
            marks.horizontal = Some(line.display_position);
        }
        if let Some(line) = session.lines.snap_left(current_left, self.tolerance) {
            move_x = line.position + session.start_x - session.start_left;
            marks.vertical = Some(line.display_position);
        }

        let dx = move_x - session.start_x;
        let dy = move_y - session.start_y;
        trace!(dx, dy, ?marks, "drag frame");

        let positions = &session.start_positions;
        doc.update(|model| {
            for &(index, top, left) in positions {
                if let Some(block) = model.blocks.get_mut(index) {
                    block.top = top + dy;
                    block.left = left + dx;
                }
            }
        });
        self.marks = marks;
        true
    }

    /// Pointer-up. Emits the end signal only if the pointer moved.
    pub fn release(&mut self) -> bool {
        self.marks = ActiveMarks::default();
        match self.session.take() {
            Some(session) if session.dragging => {
                debug!("drag finished");
                self.signals.end.emit();
                true
            }
            _ => false,
        }
    }

    /// Guide lines for the current frame
    pub fn marks(&self) -> ActiveMarks {
        self.marks
    }

    /// Candidates of the armed drag
    pub fn mark_lines(&self) -> Option<&MarkLines> {
        self.session.as_ref().map(|session| &session.lines)
    }

    pub fn is_armed(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.dragging)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
