//! Drag gesture interpreter.
//!
//! Turns raw pointer/drag events into move intents without knowing anything
//! about rendering. A UI layer feeds [`DragEvent`]s in and acts on the
//! [`GestureOutput`]s that come back.
//!
//! ```text
//! Idle --down--> Pressed --move > threshold--> Dragging <--over--> Hovering
//!                   |                              |                  |
//!                   +--up (click)--> Idle          +------drop--------+--> Idle
//! ```

use crate::board::{BoardState, MoveIntent};
use serde::{Deserialize, Serialize};

/// Pointer travel (in px) required before a press turns into a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

/// Raw events from the gesture source. Ids are resolved against the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    /// Pointer pressed on a task.
    PointerDown { task_id: String, x: f64, y: f64 },
    /// Pointer moved.
    PointerMove { x: f64, y: f64 },
    /// Pointer is over something (or nothing).
    DragOver { over_id: Option<String> },
    /// Pointer released.
    Drop { over_id: Option<String> },
    /// Drag aborted by the source (e.g. Escape).
    Cancel,
}

/// What a hovered or dropped-on id refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// The empty area of a column.
    Column { column_id: String },
    /// A task, at its current position in its column.
    Task {
        task_id: String,
        column_id: String,
        index: usize,
    },
}

impl DropTarget {
    pub fn column_id(&self) -> &str {
        match self {
            DropTarget::Column { column_id } | DropTarget::Task { column_id, .. } => column_id,
        }
    }
}

/// Resolve an id against the board. Column ids win over task ids.
pub fn resolve_target(state: &BoardState, id: &str) -> Option<DropTarget> {
    if let Some(column) = state.column(id) {
        return Some(DropTarget::Column {
            column_id: column.column.id.clone(),
        });
    }
    state.position_of(id).map(|pos| DropTarget::Task {
        task_id: id.to_string(),
        column_id: pos.column_id,
        index: pos.index,
    })
}

/// Interpreter state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    /// Pressed on a task but not yet past the activation distance.
    Pressed { task_id: String, origin: (f64, f64) },
    Dragging { task_id: String },
    Hovering { task_id: String, over: DropTarget },
}

/// Why a drag ended without a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CancelReason {
    /// Released over nothing.
    NoTarget,
    /// Released over an id that is neither a column nor a task.
    InvalidTarget(String),
    /// The gesture source aborted the drag.
    Aborted,
}

/// Result of feeding one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureOutput {
    /// Nothing to do.
    Nothing,
    /// A press crossed the activation distance; `task_id` is now active.
    Started { task_id: String },
    /// Live same-column reorder for feedback. Apply locally, never persist.
    Provisional { intent: MoveIntent },
    /// The drop. Apply and persist.
    Final { intent: MoveIntent },
    /// Dropped onto itself. No state change and no persistence.
    NoOp { task_id: String },
    /// Drag ended without a move. Any live preview should be discarded.
    Cancelled {
        task_id: String,
        reason: CancelReason,
    },
}

/// The gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    phase: DragPhase,
    activation_distance: f64,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl GestureInterpreter {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            phase: DragPhase::Idle,
            activation_distance,
        }
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// The task being dragged, once the drag is active.
    pub fn active_task(&self) -> Option<&str> {
        match &self.phase {
            DragPhase::Dragging { task_id } | DragPhase::Hovering { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// Reset to `Idle`, dropping any in-progress gesture.
    pub fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Feed one event. `state` is the board as currently displayed,
    /// including any live preview already applied.
    pub fn handle(&mut self, event: DragEvent, state: &BoardState) -> GestureOutput {
        match event {
            DragEvent::PointerDown { task_id, x, y } => self.on_pointer_down(task_id, x, y, state),
            DragEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            DragEvent::DragOver { over_id } => self.on_drag_over(over_id, state),
            DragEvent::Drop { over_id } => self.on_drop(over_id, state),
            DragEvent::Cancel => self.on_cancel(),
        }
    }

    fn on_pointer_down(&mut self, task_id: String, x: f64, y: f64, state: &BoardState) -> GestureOutput {
        if self.phase != DragPhase::Idle || state.task(&task_id).is_none() {
            return GestureOutput::Nothing;
        }
        self.phase = DragPhase::Pressed {
            task_id,
            origin: (x, y),
        };
        GestureOutput::Nothing
    }

    fn on_pointer_move(&mut self, x: f64, y: f64) -> GestureOutput {
        let DragPhase::Pressed { task_id, origin } = &self.phase else {
            return GestureOutput::Nothing;
        };
        let distance = (x - origin.0).hypot(y - origin.1);
        if distance <= self.activation_distance {
            return GestureOutput::Nothing;
        }
        let task_id = task_id.clone();
        tracing::debug!(task_id = %task_id, "Drag started");
        self.phase = DragPhase::Dragging {
            task_id: task_id.clone(),
        };
        GestureOutput::Started { task_id }
    }

    fn on_drag_over(&mut self, over_id: Option<String>, state: &BoardState) -> GestureOutput {
        let Some(task_id) = self.active_task().map(str::to_string) else {
            return GestureOutput::Nothing;
        };
        let over = over_id.and_then(|id| resolve_target(state, &id));
        let Some(over) = over else {
            self.phase = DragPhase::Dragging { task_id };
            return GestureOutput::Nothing;
        };
        self.phase = DragPhase::Hovering {
            task_id: task_id.clone(),
            over: over.clone(),
        };

        // Live feedback only for task-over-task within one column.
        let DropTarget::Task {
            task_id: over_task,
            column_id,
            index,
        } = over
        else {
            return GestureOutput::Nothing;
        };
        if over_task == task_id {
            return GestureOutput::Nothing;
        }
        match state.position_of(&task_id) {
            Some(pos) if pos.column_id == column_id && pos.index != index => {
                GestureOutput::Provisional {
                    intent: MoveIntent::new(task_id, column_id, index),
                }
            }
            _ => GestureOutput::Nothing,
        }
    }

    fn on_drop(&mut self, over_id: Option<String>, state: &BoardState) -> GestureOutput {
        let phase = std::mem::replace(&mut self.phase, DragPhase::Idle);
        let task_id = match phase {
            DragPhase::Dragging { task_id } | DragPhase::Hovering { task_id, .. } => task_id,
            // Released before the activation distance: a click.
            DragPhase::Pressed { .. } | DragPhase::Idle => return GestureOutput::Nothing,
        };

        let Some(over_id) = over_id else {
            return GestureOutput::Cancelled {
                task_id,
                reason: CancelReason::NoTarget,
            };
        };
        if over_id == task_id {
            return GestureOutput::NoOp { task_id };
        }

        let intent = match resolve_target(state, &over_id) {
            Some(DropTarget::Column { column_id }) => {
                // Empty-area drop appends. When the task already lives in this
                // column it is removed first, so the end is len - 1.
                let len = state.column(&column_id).map_or(0, |c| c.tasks.len());
                let end = match state.position_of(&task_id) {
                    Some(pos) if pos.column_id == column_id => len.saturating_sub(1),
                    _ => len,
                };
                MoveIntent::new(task_id, column_id, end)
            }
            Some(DropTarget::Task {
                column_id, index, ..
            }) => MoveIntent::new(task_id, column_id, index),
            None => {
                return GestureOutput::Cancelled {
                    task_id,
                    reason: CancelReason::InvalidTarget(over_id),
                };
            }
        };
        tracing::debug!(
            task_id = %intent.task_id,
            column_id = %intent.column_id,
            index = intent.index,
            "Drop resolved"
        );
        GestureOutput::Final { intent }
    }

    fn on_cancel(&mut self) -> GestureOutput {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Dragging { task_id } | DragPhase::Hovering { task_id, .. } => {
                GestureOutput::Cancelled {
                    task_id,
                    reason: CancelReason::Aborted,
                }
            }
            _ => GestureOutput::Nothing,
        }
    }
}
