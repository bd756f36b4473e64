use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::editor::history::History;
use crate::model::activity::ActivityGrid;
use crate::model::annotations::CommentStore;
use crate::model::config::{EditorConfig, PendingPolicy};
use crate::model::links::VisitLinkStore;
use crate::model::timeline::{Level, Timeline};
use crate::ops::drop_rules::{DropPosition, can_drop};
use crate::ops::timeline_ops::{self, EmptiedContainer, IdGen, MoveRequest, Side};

/// The item captured at drag start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub level: Level,
    pub id: String,
}

/// Caller's answer to an empty-container decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyResolution {
    /// The empty container persists
    Keep,
    /// The container is removed (undoable; skipped if it is no longer empty)
    Delete,
}

/// Top-level state container for one editing session.
///
/// Owns the current tree, the side tables, the undo history, and the drag
/// state, and dispatches the editing events. The tree operations themselves
/// stay pure (input tree in, output tree out); this is the only place a
/// "current" value gets swapped, so every failure leaves the last valid
/// state in place and is observable only as "nothing happened".
pub struct Editor {
    config: EditorConfig,
    timeline: Timeline,
    /// Activity rows and cell occurrence entries
    pub grid: ActivityGrid,
    /// Cell comments, keyed by (activity, day)
    pub comments: CommentStore,
    /// Linked-visit groups over day ids
    pub links: VisitLinkStore,
    history: History,
    ids: IdGen,
    drag: Option<DragState>,
    pending: VecDeque<EmptiedContainer>,
}

impl Editor {
    pub fn new(timeline: Timeline, config: EditorConfig) -> Self {
        let history = History::new(config.history.capacity);
        let ids = IdGen::seeded_from(&timeline);
        Editor {
            config,
            timeline,
            grid: ActivityGrid::new(),
            comments: CommentStore::new(),
            links: VisitLinkStore::new(),
            history,
            ids,
            drag: None,
            pending: VecDeque::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    /// Label of the action the next undo would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.history.last_label()
    }

    /// The oldest unresolved empty-container decision, if any
    pub fn pending_decision(&self) -> Option<&EmptiedContainer> {
        self.pending.front()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    // -----------------------------------------------------------------------
    // Drag lifecycle
    // -----------------------------------------------------------------------

    /// Capture the dragged item. Rejected when the node does not exist.
    pub fn begin_drag(&mut self, level: Level, id: &str) -> bool {
        if timeline_ops::find_path(&self.timeline, level, id).is_none() {
            return false;
        }
        self.drag = Some(DragState {
            level,
            id: id.to_string(),
        });
        true
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Drag-over predicate the presentation layer calls continuously to
    /// style drop zones. Pure: consults the compatibility table and the
    /// self-drop rule, touches nothing.
    pub fn validate_drop(
        &self,
        target_level: Level,
        target_id: &str,
        position: DropPosition,
    ) -> bool {
        match &self.drag {
            Some(drag) => {
                drag.id != target_id && can_drop(drag.level, target_level, position)
            }
            None => false,
        }
    }

    /// Drop the dragged item on a target. True when the tree changed.
    ///
    /// The move runs against the current tree without touching it; the
    /// pre-mutation snapshot is pushed only once the move is known good, so
    /// rejected drops (self-drop, invalid combination, stale ids) leave the
    /// history untouched.
    pub fn drop_on(
        &mut self,
        target_level: Level,
        target_id: &str,
        position: DropPosition,
    ) -> bool {
        let drag = match self.drag.take() {
            Some(d) => d,
            None => return false,
        };
        let request = MoveRequest {
            item_level: drag.level,
            item_id: drag.id,
            target_level,
            target_id: target_id.to_string(),
            position,
        };
        let outcome = match timeline_ops::move_item(
            &self.timeline,
            &request,
            self.config.drag.inside_position,
        ) {
            Ok(outcome) => outcome,
            Err(_) => return false,
        };

        let label = match timeline_ops::node_name(&self.timeline, request.item_level, &request.item_id) {
            Some(name) => format!("move {} \"{}\"", request.item_level, name),
            None => format!("move {}", request.item_level),
        };
        self.history.snapshot(&self.timeline, label);
        self.timeline = outcome.timeline;
        if let Some(emptied) = outcome.emptied {
            self.push_decision(emptied);
        }
        true
    }

    fn push_decision(&mut self, emptied: EmptiedContainer) {
        match self.config.decisions.policy {
            PendingPolicy::Overwrite => {
                self.pending.clear();
                self.pending.push_back(emptied);
            }
            PendingPolicy::Queue => self.pending.push_back(emptied),
        }
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Restore the most recent snapshot. False when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.timeline = snapshot.tree;
                // The restored tree predates the moves that raised any
                // pending decisions, so they no longer describe it.
                self.pending.clear();
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Add / delete
    // -----------------------------------------------------------------------

    /// Insert a new default-named sibling next to an anchor node.
    /// Returns the new node's id, or None when the anchor is gone.
    pub fn add_sibling(&mut self, level: Level, anchor_id: &str, side: Side) -> Option<String> {
        let label = self.config.label_for(level).to_string();
        let outcome =
            timeline_ops::add_sibling(&self.timeline, level, anchor_id, side, &label, &mut self.ids)
                .ok()?;
        self.history
            .snapshot(&self.timeline, format!("add {}", level));
        self.timeline = outcome.timeline;
        Some(outcome.new_id)
    }

    /// Append a new default-named child to a container; this is how the
    /// first child enters an empty container.
    pub fn add_child(&mut self, parent_level: Level, parent_id: &str) -> Option<String> {
        let child_level = parent_level.child()?;
        let label = self.config.label_for(child_level).to_string();
        let outcome =
            timeline_ops::add_child(&self.timeline, parent_level, parent_id, &label, &mut self.ids)
                .ok()?;
        self.history
            .snapshot(&self.timeline, format!("add {}", child_level));
        self.timeline = outcome.timeline;
        Some(outcome.new_id)
    }

    /// Remove a node and its subtree, pruning side-table entries for every
    /// day leaf that went with it. False when the id is gone already.
    pub fn delete_item(&mut self, level: Level, id: &str) -> bool {
        let outcome = match timeline_ops::delete_item(&self.timeline, level, id) {
            Ok(outcome) => outcome,
            Err(_) => return false,
        };
        let label = match timeline_ops::node_name(&self.timeline, level, id) {
            Some(name) => format!("delete {} \"{}\"", level, name),
            None => format!("delete {}", level),
        };
        self.history.snapshot(&self.timeline, label);
        self.timeline = outcome.timeline;
        self.prune_side_tables(&outcome.removed_day_ids);
        // Decisions about containers that just left the tree are dead
        self.pending
            .retain(|d| timeline_ops::find_path(&self.timeline, d.level, &d.id).is_some());
        true
    }

    fn prune_side_tables(&mut self, removed_day_ids: &[String]) {
        if removed_day_ids.is_empty() {
            return;
        }
        self.grid.prune_days(removed_day_ids);
        self.comments.prune_days(removed_day_ids);
        self.links.prune_days(removed_day_ids);
    }

    // -----------------------------------------------------------------------
    // Empty-container decisions
    // -----------------------------------------------------------------------

    /// Resolve the oldest pending decision, returning it when one existed.
    ///
    /// `Delete` only applies while the container is still empty; later
    /// mutations may have repopulated or removed it, in which case the
    /// decision is consumed without touching the tree.
    pub fn resolve_empty_decision(
        &mut self,
        resolution: EmptyResolution,
    ) -> Option<EmptiedContainer> {
        let decision = self.pending.pop_front()?;
        if resolution == EmptyResolution::Delete
            && timeline_ops::child_count(&self.timeline, decision.level, &decision.id) == Some(0)
            && let Ok(outcome) =
                timeline_ops::delete_item(&self.timeline, decision.level, &decision.id)
        {
            self.history.snapshot(
                &self.timeline,
                format!("delete empty {} \"{}\"", decision.level, decision.name),
            );
            self.timeline = outcome.timeline;
            self.prune_side_tables(&outcome.removed_day_ids);
        }
        Some(decision)
    }
}
