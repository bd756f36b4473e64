use serde::{Deserialize, Serialize};

use crate::model::config::InsidePosition;
use crate::model::timeline::{Cycle, Day, Level, Period, Timeline, Week};
use crate::ops::drop_rules::{DropPosition, can_drop};

/// Error type for timeline operations
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("{level} not found: {id}")]
    NotFound { level: Level, id: String },
    #[error("cannot drop {dragged} {position} {target}")]
    InvalidDrop {
        dragged: Level,
        target: Level,
        position: DropPosition,
    },
    #[error("cannot drop an item onto itself")]
    SelfDrop,
    #[error("a {0} cannot contain children")]
    LeafParent(Level),
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Structural address of a node: indices at each ancestor level.
/// `cycle`/`week`/`day` are filled down to the node's own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePath {
    pub period: usize,
    pub cycle: Option<usize>,
    pub week: Option<usize>,
    pub day: Option<usize>,
}

impl NodePath {
    /// The level this path addresses
    pub fn level(&self) -> Level {
        if self.day.is_some() {
            Level::Day
        } else if self.week.is_some() {
            Level::Week
        } else if self.cycle.is_some() {
            Level::Cycle
        } else {
            Level::Period
        }
    }
}

/// Locate a node of the given level by id. Depth-first, first match wins
/// (ids are unique, so the first match is the only one). `None` is a no-op
/// guard for callers, never a fatal condition.
pub fn find_path(timeline: &Timeline, level: Level, id: &str) -> Option<NodePath> {
    for (pi, period) in timeline.periods.iter().enumerate() {
        if level == Level::Period {
            if period.id == id {
                return Some(NodePath {
                    period: pi,
                    cycle: None,
                    week: None,
                    day: None,
                });
            }
            continue;
        }
        for (ci, cycle) in period.cycles.iter().enumerate() {
            if level == Level::Cycle {
                if cycle.id == id {
                    return Some(NodePath {
                        period: pi,
                        cycle: Some(ci),
                        week: None,
                        day: None,
                    });
                }
                continue;
            }
            for (wi, week) in cycle.weeks.iter().enumerate() {
                if level == Level::Week {
                    if week.id == id {
                        return Some(NodePath {
                            period: pi,
                            cycle: Some(ci),
                            week: Some(wi),
                            day: None,
                        });
                    }
                    continue;
                }
                for (di, day) in week.days.iter().enumerate() {
                    if day.id == id {
                        return Some(NodePath {
                            period: pi,
                            cycle: Some(ci),
                            week: Some(wi),
                            day: Some(di),
                        });
                    }
                }
            }
        }
    }
    None
}

/// Display name of a node, when it exists at the given level
pub fn node_name<'a>(timeline: &'a Timeline, level: Level, id: &str) -> Option<&'a str> {
    let path = find_path(timeline, level, id)?;
    let period = timeline.periods.get(path.period)?;
    match level {
        Level::Period => Some(period.name.as_str()),
        Level::Cycle => period.cycles.get(path.cycle?).map(|c| c.name.as_str()),
        Level::Week => period
            .cycles
            .get(path.cycle?)
            .and_then(|c| c.weeks.get(path.week?))
            .map(|w| w.name.as_str()),
        Level::Day => period
            .cycles
            .get(path.cycle?)
            .and_then(|c| c.weeks.get(path.week?))
            .and_then(|w| w.days.get(path.day?))
            .map(|d| d.name.as_str()),
    }
}

/// Child count of a container node; `None` when the id is absent or a day
pub fn child_count(timeline: &Timeline, level: Level, id: &str) -> Option<usize> {
    let path = find_path(timeline, level, id)?;
    match level {
        Level::Period => timeline.periods.get(path.period).map(|p| p.cycles.len()),
        Level::Cycle => timeline
            .periods
            .get(path.period)
            .and_then(|p| p.cycles.get(path.cycle?))
            .map(|c| c.weeks.len()),
        Level::Week => timeline
            .periods
            .get(path.period)
            .and_then(|p| p.cycles.get(path.cycle?))
            .and_then(|c| c.weeks.get(path.week?))
            .map(|w| w.days.len()),
        Level::Day => None,
    }
}

// ---------------------------------------------------------------------------
// Id and name generation
// ---------------------------------------------------------------------------

/// Monotonic node id generator. Ids are never reused, including across undo:
/// the counter only moves forward even when the tree is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGen {
    next: u64,
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { next: 1 }
    }

    /// Seed the counter above the highest `-N` suffix in a loaded tree, so
    /// fresh ids never collide with existing ones.
    pub fn seeded_from(timeline: &Timeline) -> Self {
        let mut max = 0u64;
        let mut scan = |id: &str| {
            if let Some((_, suffix)) = id.rsplit_once('-')
                && let Ok(n) = suffix.parse::<u64>()
                && n > max
            {
                max = n;
            }
        };
        for period in &timeline.periods {
            scan(&period.id);
            for cycle in &period.cycles {
                scan(&cycle.id);
                for week in &cycle.weeks {
                    scan(&week.id);
                    for day in &week.days {
                        scan(&day.id);
                    }
                }
            }
        }
        IdGen { next: max + 1 }
    }

    pub fn next_id(&mut self, level: Level) -> String {
        let id = format!("{}-{}", level, self.next);
        self.next += 1;
        id
    }
}

/// Pick "<label> <n>" where n is one above the highest numeric suffix among
/// sibling names with the same label. Non-matching names are ignored.
fn next_default_name<'a>(names: impl Iterator<Item = &'a str>, label: &str) -> String {
    let mut max = 0usize;
    let prefix = format!("{} ", label);
    for name in names {
        if let Some(rest) = name.strip_prefix(&prefix)
            && let Ok(n) = rest.trim().parse::<usize>()
            && n > max
        {
            max = n;
        }
    }
    format!("{} {}", label, max + 1)
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A structural drag-and-drop relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub item_level: Level,
    pub item_id: String,
    pub target_level: Level,
    pub target_id: String,
    pub position: DropPosition,
}

/// A container left empty by a move, pending a keep/delete decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptiedContainer {
    pub id: String,
    pub name: String,
    pub level: Level,
}

/// Result of a successful move
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub timeline: Timeline,
    /// The source parent, when the move left it childless
    pub emptied: Option<EmptiedContainer>,
}

/// A node detached from the tree, carrying its whole subtree unchanged
#[derive(Debug, Clone)]
enum Detached {
    Period(Period),
    Cycle(Cycle),
    Week(Week),
    Day(Day),
}

impl Detached {
    fn day_ids(&self) -> Vec<String> {
        match self {
            Detached::Period(period) => period
                .cycles
                .iter()
                .flat_map(|c| c.weeks.iter())
                .flat_map(|w| w.days.iter())
                .map(|d| d.id.clone())
                .collect(),
            Detached::Cycle(cycle) => cycle
                .weeks
                .iter()
                .flat_map(|w| w.days.iter())
                .map(|d| d.id.clone())
                .collect(),
            Detached::Week(week) => week.days.iter().map(|d| d.id.clone()).collect(),
            Detached::Day(day) => vec![day.id.clone()],
        }
    }
}

/// Relocate a node (with its whole subtree) relative to a target.
///
/// The input tree is never mutated; on success a new tree is returned, so
/// captured history snapshots stay valid. All guards run before any surgery:
/// self-drop, the drop compatibility table, and existence of both endpoints.
/// After the item is detached the target is re-resolved by id against the
/// mutated tree, since sibling indices shift when the removal precedes the
/// insertion point.
pub fn move_item(
    timeline: &Timeline,
    request: &MoveRequest,
    inside_position: InsidePosition,
) -> Result<MoveOutcome, TimelineError> {
    if request.item_id == request.target_id {
        return Err(TimelineError::SelfDrop);
    }
    if !can_drop(request.item_level, request.target_level, request.position) {
        return Err(TimelineError::InvalidDrop {
            dragged: request.item_level,
            target: request.target_level,
            position: request.position,
        });
    }
    let source_path = match find_path(timeline, request.item_level, &request.item_id) {
        Some(p) => p,
        None => {
            return Err(TimelineError::NotFound {
                level: request.item_level,
                id: request.item_id.clone(),
            });
        }
    };
    // The compatibility table only admits same-level or parent-level targets,
    // so a valid target can never sit inside the moved subtree. It can still
    // be absent altogether, which must abort before the tree is touched.
    if find_path(timeline, request.target_level, &request.target_id).is_none() {
        return Err(TimelineError::NotFound {
            level: request.target_level,
            id: request.target_id.clone(),
        });
    }

    let mut next = timeline.clone();
    let (node, source_parent) = match detach(&mut next, source_path) {
        Some(found) => found,
        None => {
            return Err(TimelineError::NotFound {
                level: request.item_level,
                id: request.item_id.clone(),
            });
        }
    };
    if !insert(
        &mut next,
        node,
        request.target_level,
        &request.target_id,
        request.position,
        inside_position,
    ) {
        return Err(TimelineError::NotFound {
            level: request.target_level,
            id: request.target_id.clone(),
        });
    }

    // Emptiness is judged against the final tree: a reorder within the same
    // parent puts the node straight back, and must not report it empty.
    let emptied = source_parent.filter(|parent| {
        child_count(&next, parent.level, &parent.id) == Some(0)
    });
    Ok(MoveOutcome {
        timeline: next,
        emptied,
    })
}

/// Remove the node at `path`, returning it together with the identity of its
/// parent container (None for periods, which have no parent).
fn detach(timeline: &mut Timeline, path: NodePath) -> Option<(Detached, Option<EmptiedContainer>)> {
    match path.level() {
        Level::Period => {
            if path.period >= timeline.periods.len() {
                return None;
            }
            Some((Detached::Period(timeline.periods.remove(path.period)), None))
        }
        Level::Cycle => {
            let period = timeline.periods.get_mut(path.period)?;
            let ci = path.cycle?;
            if ci >= period.cycles.len() {
                return None;
            }
            let parent = EmptiedContainer {
                id: period.id.clone(),
                name: period.name.clone(),
                level: Level::Period,
            };
            Some((Detached::Cycle(period.cycles.remove(ci)), Some(parent)))
        }
        Level::Week => {
            let cycle = timeline
                .periods
                .get_mut(path.period)?
                .cycles
                .get_mut(path.cycle?)?;
            let wi = path.week?;
            if wi >= cycle.weeks.len() {
                return None;
            }
            let parent = EmptiedContainer {
                id: cycle.id.clone(),
                name: cycle.name.clone(),
                level: Level::Cycle,
            };
            Some((Detached::Week(cycle.weeks.remove(wi)), Some(parent)))
        }
        Level::Day => {
            let week = timeline
                .periods
                .get_mut(path.period)?
                .cycles
                .get_mut(path.cycle?)?
                .weeks
                .get_mut(path.week?)?;
            let di = path.day?;
            if di >= week.days.len() {
                return None;
            }
            let parent = EmptiedContainer {
                id: week.id.clone(),
                name: week.name.clone(),
                level: Level::Week,
            };
            Some((Detached::Day(week.days.remove(di)), Some(parent)))
        }
    }
}

/// Insert a detached node relative to the target, resolving the target by id
/// in the current (post-removal) tree. Returns false when the target is gone
/// or the node/target levels do not line up.
fn insert(
    timeline: &mut Timeline,
    node: Detached,
    target_level: Level,
    target_id: &str,
    position: DropPosition,
    inside_position: InsidePosition,
) -> bool {
    match position {
        DropPosition::Before | DropPosition::After => {
            insert_beside(timeline, node, target_level, target_id, position)
        }
        DropPosition::Inside => insert_inside(timeline, node, target_level, target_id, inside_position),
    }
}

fn insert_beside(
    timeline: &mut Timeline,
    node: Detached,
    target_level: Level,
    target_id: &str,
    position: DropPosition,
) -> bool {
    let path = match find_path(timeline, target_level, target_id) {
        Some(p) => p,
        None => return false,
    };
    let offset = if position == DropPosition::After { 1 } else { 0 };
    match node {
        Detached::Period(period) => {
            let idx = (path.period + offset).min(timeline.periods.len());
            timeline.periods.insert(idx, period);
            true
        }
        Detached::Cycle(cycle) => {
            let (parent, ci) = match (timeline.periods.get_mut(path.period), path.cycle) {
                (Some(p), Some(ci)) => (p, ci),
                _ => return false,
            };
            let idx = (ci + offset).min(parent.cycles.len());
            parent.cycles.insert(idx, cycle);
            true
        }
        Detached::Week(week) => {
            let parent = match path
                .cycle
                .and_then(|ci| timeline.periods.get_mut(path.period)?.cycles.get_mut(ci))
            {
                Some(c) => c,
                None => return false,
            };
            let wi = match path.week {
                Some(wi) => wi,
                None => return false,
            };
            let idx = (wi + offset).min(parent.weeks.len());
            parent.weeks.insert(idx, week);
            true
        }
        Detached::Day(day) => {
            let parent = match path.cycle.zip(path.week).and_then(|(ci, wi)| {
                timeline
                    .periods
                    .get_mut(path.period)?
                    .cycles
                    .get_mut(ci)?
                    .weeks
                    .get_mut(wi)
            }) {
                Some(w) => w,
                None => return false,
            };
            let di = match path.day {
                Some(di) => di,
                None => return false,
            };
            let idx = (di + offset).min(parent.days.len());
            parent.days.insert(idx, day);
            true
        }
    }
}

fn insert_inside(
    timeline: &mut Timeline,
    node: Detached,
    target_level: Level,
    target_id: &str,
    inside_position: InsidePosition,
) -> bool {
    let path = match find_path(timeline, target_level, target_id) {
        Some(p) => p,
        None => return false,
    };
    match node {
        Detached::Cycle(cycle) => {
            let period = match timeline.periods.get_mut(path.period) {
                Some(p) => p,
                None => return false,
            };
            match inside_position {
                InsidePosition::Prepend => period.cycles.insert(0, cycle),
                InsidePosition::Append => period.cycles.push(cycle),
            }
            true
        }
        Detached::Week(week) => {
            let cycle = match path
                .cycle
                .and_then(|ci| timeline.periods.get_mut(path.period)?.cycles.get_mut(ci))
            {
                Some(c) => c,
                None => return false,
            };
            match inside_position {
                InsidePosition::Prepend => cycle.weeks.insert(0, week),
                InsidePosition::Append => cycle.weeks.push(week),
            }
            true
        }
        Detached::Day(day) => {
            let week = match path.cycle.zip(path.week).and_then(|(ci, wi)| {
                timeline
                    .periods
                    .get_mut(path.period)?
                    .cycles
                    .get_mut(ci)?
                    .weeks
                    .get_mut(wi)
            }) {
                Some(w) => w,
                None => return false,
            };
            match inside_position {
                InsidePosition::Prepend => week.days.insert(0, day),
                InsidePosition::Append => week.days.push(day),
            }
            true
        }
        // Periods have no parent container to be dropped inside of
        Detached::Period(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// Which side of the anchor a new sibling lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

/// Result of a successful add
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub timeline: Timeline,
    pub new_id: String,
}

/// Insert a new default-named node next to `anchor_id` at the same level.
/// `label` seeds the default name ("Cycle 3" when the highest "Cycle N" is 2).
pub fn add_sibling(
    timeline: &Timeline,
    level: Level,
    anchor_id: &str,
    side: Side,
    label: &str,
    ids: &mut IdGen,
) -> Result<AddOutcome, TimelineError> {
    let path = match find_path(timeline, level, anchor_id) {
        Some(p) => p,
        None => {
            return Err(TimelineError::NotFound {
                level,
                id: anchor_id.to_string(),
            });
        }
    };
    let new_id = ids.next_id(level);
    let offset = if side == Side::After { 1 } else { 0 };
    let mut next = timeline.clone();
    match level {
        Level::Period => {
            let name = next_default_name(next.periods.iter().map(|p| p.name.as_str()), label);
            let idx = (path.period + offset).min(next.periods.len());
            next.periods.insert(idx, Period::new(new_id.clone(), name));
        }
        Level::Cycle => {
            let period = match next.periods.get_mut(path.period) {
                Some(p) => p,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let ci = match path.cycle {
                Some(ci) => ci,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let name = next_default_name(period.cycles.iter().map(|c| c.name.as_str()), label);
            let idx = (ci + offset).min(period.cycles.len());
            period.cycles.insert(idx, Cycle::new(new_id.clone(), name));
        }
        Level::Week => {
            let cycle = match path
                .cycle
                .and_then(|ci| next.periods.get_mut(path.period)?.cycles.get_mut(ci))
            {
                Some(c) => c,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let wi = match path.week {
                Some(wi) => wi,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let name = next_default_name(cycle.weeks.iter().map(|w| w.name.as_str()), label);
            let idx = (wi + offset).min(cycle.weeks.len());
            cycle.weeks.insert(idx, Week::new(new_id.clone(), name));
        }
        Level::Day => {
            let week = match path.cycle.zip(path.week).and_then(|(ci, wi)| {
                next.periods
                    .get_mut(path.period)?
                    .cycles
                    .get_mut(ci)?
                    .weeks
                    .get_mut(wi)
            }) {
                Some(w) => w,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let di = match path.day {
                Some(di) => di,
                None => {
                    return Err(TimelineError::NotFound {
                        level,
                        id: anchor_id.to_string(),
                    });
                }
            };
            let name = next_default_name(week.days.iter().map(|d| d.name.as_str()), label);
            let idx = (di + offset).min(week.days.len());
            week.days.insert(idx, Day::new(new_id.clone(), name));
        }
    }
    Ok(AddOutcome {
        timeline: next,
        new_id,
    })
}

/// Append a new default-named child to a container. This is how the first
/// child enters an empty container, where no sibling anchor exists.
pub fn add_child(
    timeline: &Timeline,
    parent_level: Level,
    parent_id: &str,
    label: &str,
    ids: &mut IdGen,
) -> Result<AddOutcome, TimelineError> {
    let child_level = match parent_level.child() {
        Some(l) => l,
        None => return Err(TimelineError::LeafParent(parent_level)),
    };
    let path = match find_path(timeline, parent_level, parent_id) {
        Some(p) => p,
        None => {
            return Err(TimelineError::NotFound {
                level: parent_level,
                id: parent_id.to_string(),
            });
        }
    };
    let new_id = ids.next_id(child_level);
    let mut next = timeline.clone();
    match parent_level {
        Level::Period => {
            let period = match next.periods.get_mut(path.period) {
                Some(p) => p,
                None => {
                    return Err(TimelineError::NotFound {
                        level: parent_level,
                        id: parent_id.to_string(),
                    });
                }
            };
            let name = next_default_name(period.cycles.iter().map(|c| c.name.as_str()), label);
            period.cycles.push(Cycle::new(new_id.clone(), name));
        }
        Level::Cycle => {
            let cycle = match path
                .cycle
                .and_then(|ci| next.periods.get_mut(path.period)?.cycles.get_mut(ci))
            {
                Some(c) => c,
                None => {
                    return Err(TimelineError::NotFound {
                        level: parent_level,
                        id: parent_id.to_string(),
                    });
                }
            };
            let name = next_default_name(cycle.weeks.iter().map(|w| w.name.as_str()), label);
            cycle.weeks.push(Week::new(new_id.clone(), name));
        }
        Level::Week => {
            let week = match path.cycle.zip(path.week).and_then(|(ci, wi)| {
                next.periods
                    .get_mut(path.period)?
                    .cycles
                    .get_mut(ci)?
                    .weeks
                    .get_mut(wi)
            }) {
                Some(w) => w,
                None => {
                    return Err(TimelineError::NotFound {
                        level: parent_level,
                        id: parent_id.to_string(),
                    });
                }
            };
            let name = next_default_name(week.days.iter().map(|d| d.name.as_str()), label);
            week.days.push(Day::new(new_id.clone(), name));
        }
        Level::Day => return Err(TimelineError::LeafParent(parent_level)),
    }
    Ok(AddOutcome {
        timeline: next,
        new_id,
    })
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Result of a successful delete
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub timeline: Timeline,
    /// Ids of all day leaves removed with the subtree, for side-table pruning
    pub removed_day_ids: Vec<String>,
}

/// Remove a node and its whole subtree
pub fn delete_item(
    timeline: &Timeline,
    level: Level,
    id: &str,
) -> Result<DeleteOutcome, TimelineError> {
    let path = match find_path(timeline, level, id) {
        Some(p) => p,
        None => {
            return Err(TimelineError::NotFound {
                level,
                id: id.to_string(),
            });
        }
    };
    let mut next = timeline.clone();
    let (node, _) = match detach(&mut next, path) {
        Some(found) => found,
        None => {
            return Err(TimelineError::NotFound {
                level,
                id: id.to_string(),
            });
        }
    };
    Ok(DeleteOutcome {
        timeline: next,
        removed_day_ids: node.day_ids(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
