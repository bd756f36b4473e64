pub mod drop_rules;
pub mod timeline_ops;

pub use drop_rules::{DropPosition, can_drop};
pub use timeline_ops::{
    AddOutcome, DeleteOutcome, EmptiedContainer, IdGen, MoveOutcome, MoveRequest, NodePath, Side,
    TimelineError, add_child, add_sibling, child_count, delete_item, find_path, move_item,
    node_name,
};
