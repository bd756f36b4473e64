use pretty_assertions::assert_eq;

use soagrid::editor::{Editor, EmptyResolution};
use soagrid::model::activity::CellEntry;
use soagrid::model::config::EditorConfig;
use soagrid::model::timeline::{Cycle, Day, Level, Period, Timeline, Week};
use soagrid::ops::{DropPosition, Side, child_count, find_path};

/// P1{C1{W1{D1,D2}}}
fn small_timeline() -> Timeline {
    let mut w1 = Week::new("w1", "Week 1");
    w1.days.push(Day::new("d1", "Day 1"));
    w1.days.push(Day::new("d2", "Day 2"));
    let mut c1 = Cycle::new("c1", "Cycle 1");
    c1.weeks.push(w1);
    let mut p1 = Period::new("p1", "Period 1");
    p1.cycles.push(c1);
    Timeline { periods: vec![p1] }
}

/// P1{C1{W1{D1}}, C2{W2{D2}}}
fn two_cycle_timeline() -> Timeline {
    let mut w1 = Week::new("w1", "Week 1");
    w1.days.push(Day::new("d1", "Day 1"));
    let mut c1 = Cycle::new("c1", "Cycle 1");
    c1.weeks.push(w1);
    let mut w2 = Week::new("w2", "Week 2");
    w2.days.push(Day::new("d2", "Day 2"));
    let mut c2 = Cycle::new("c2", "Cycle 2");
    c2.weeks.push(w2);
    let mut p1 = Period::new("p1", "Period 1");
    p1.cycles.push(c1);
    p1.cycles.push(c2);
    Timeline { periods: vec![p1] }
}

/// P1{C1{W1{X1..X16}}, C2{W2{Y1}}} — enough distinct days to exercise the
/// history window
fn wide_timeline() -> Timeline {
    let mut w1 = Week::new("w1", "Week 1");
    for i in 1..=16 {
        w1.days.push(Day::new(format!("x{}", i), format!("Day {}", i)));
    }
    let mut c1 = Cycle::new("c1", "Cycle 1");
    c1.weeks.push(w1);
    let mut w2 = Week::new("w2", "Week 2");
    w2.days.push(Day::new("y1", "Day A"));
    let mut c2 = Cycle::new("c2", "Cycle 2");
    c2.weeks.push(w2);
    let mut p1 = Period::new("p1", "Period 1");
    p1.cycles.push(c1);
    p1.cycles.push(c2);
    Timeline { periods: vec![p1] }
}

fn drag_drop(
    editor: &mut Editor,
    level: Level,
    id: &str,
    target_level: Level,
    target_id: &str,
    position: DropPosition,
) -> bool {
    assert!(editor.begin_drag(level, id), "drag source {} missing", id);
    editor.drop_on(target_level, target_id, position)
}

#[test]
fn adjacent_reorder_changes_nothing_and_duplicates_nothing() {
    let mut editor = Editor::new(small_timeline(), EditorConfig::default());
    assert!(drag_drop(
        &mut editor,
        Level::Day,
        "d2",
        Level::Day,
        "d1",
        DropPosition::After
    ));
    assert_eq!(editor.timeline().day_ids(), vec!["d1", "d2"]);
    assert_eq!(editor.timeline().total_day_count(), 2);
    assert!(editor.pending_decision().is_none());
}

#[test]
fn only_week_move_then_delete_choice_removes_the_cycle() {
    let mut editor = Editor::new(two_cycle_timeline(), EditorConfig::default());
    assert!(drag_drop(
        &mut editor,
        Level::Week,
        "w1",
        Level::Week,
        "w2",
        DropPosition::After
    ));

    let decision = editor.pending_decision().expect("c1 should be reported");
    assert_eq!(decision.id, "c1");
    assert_eq!(decision.level, Level::Cycle);

    editor.resolve_empty_decision(EmptyResolution::Delete);
    let cycle_ids: Vec<&str> = editor.timeline().periods[0]
        .cycles
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(cycle_ids, vec!["c2"]);
    let week_ids: Vec<&str> = editor.timeline().periods[0].cycles[0]
        .weeks
        .iter()
        .map(|w| w.id.as_str())
        .collect();
    assert_eq!(week_ids, vec!["w2", "w1"]);
}

#[test]
fn day_count_is_conserved_across_a_session() {
    let mut editor = Editor::new(wide_timeline(), EditorConfig::default());
    let total = editor.timeline().total_day_count();

    assert!(drag_drop(
        &mut editor,
        Level::Day,
        "x3",
        Level::Week,
        "w2",
        DropPosition::Inside
    ));
    assert_eq!(editor.timeline().total_day_count(), total);

    assert!(drag_drop(
        &mut editor,
        Level::Week,
        "w2",
        Level::Week,
        "w1",
        DropPosition::Before
    ));
    assert_eq!(editor.timeline().total_day_count(), total);

    assert!(drag_drop(
        &mut editor,
        Level::Cycle,
        "c1",
        Level::Cycle,
        "c2",
        DropPosition::After
    ));
    assert_eq!(editor.timeline().total_day_count(), total);
}

#[test]
fn move_then_undo_restores_the_exact_tree() {
    let mut editor = Editor::new(wide_timeline(), EditorConfig::default());
    let before = editor.timeline().clone();

    assert!(drag_drop(
        &mut editor,
        Level::Cycle,
        "c2",
        Level::Cycle,
        "c1",
        DropPosition::Before
    ));
    assert_ne!(editor.timeline(), &before);

    assert!(editor.undo());
    assert_eq!(editor.timeline(), &before);
}

#[test]
fn history_window_holds_the_last_ten_moves() {
    let mut editor = Editor::new(wide_timeline(), EditorConfig::default());
    assert!(!editor.can_undo());

    for i in 1..=15 {
        let id = format!("x{}", i);
        assert!(drag_drop(
            &mut editor,
            Level::Day,
            &id,
            Level::Week,
            "w2",
            DropPosition::Inside
        ));
    }
    assert_eq!(editor.history_depth(), 10);

    for _ in 0..10 {
        assert!(editor.undo());
    }
    assert!(!editor.undo(), "the window is exhausted after ten undos");

    // Ten undos land ten moves back: five days already sat in w2, not zero
    assert_eq!(child_count(editor.timeline(), Level::Week, "w1"), Some(11));
    assert_eq!(child_count(editor.timeline(), Level::Week, "w2"), Some(6));
    assert_ne!(editor.timeline(), &wide_timeline());
}

#[test]
fn undo_walks_a_session_back_in_order() {
    let mut editor = Editor::new(wide_timeline(), EditorConfig::default());
    let pristine = editor.timeline().clone();

    drag_drop(
        &mut editor,
        Level::Day,
        "x1",
        Level::Day,
        "y1",
        DropPosition::Before,
    );
    drag_drop(
        &mut editor,
        Level::Day,
        "x2",
        Level::Day,
        "y1",
        DropPosition::After,
    );
    drag_drop(
        &mut editor,
        Level::Week,
        "w2",
        Level::Cycle,
        "c1",
        DropPosition::Inside,
    );
    assert_eq!(editor.history_depth(), 3);

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.timeline(), &pristine);
    assert!(!editor.undo());
}

#[test]
fn drag_over_validation_styles_zones_without_mutating() {
    let mut editor = Editor::new(two_cycle_timeline(), EditorConfig::default());
    assert!(editor.begin_drag(Level::Week, "w1"));

    // The presentation layer polls these while hovering
    assert!(editor.validate_drop(Level::Week, "w2", DropPosition::Before));
    assert!(editor.validate_drop(Level::Cycle, "c2", DropPosition::Inside));
    assert!(!editor.validate_drop(Level::Week, "w1", DropPosition::After));
    assert!(!editor.validate_drop(Level::Period, "p1", DropPosition::Inside));
    assert!(!editor.validate_drop(Level::Day, "d2", DropPosition::After));

    // Hovering never mutates
    assert_eq!(editor.timeline(), &two_cycle_timeline());
    assert_eq!(editor.history_depth(), 0);
}

#[test]
fn full_session_with_side_tables() {
    let mut editor = Editor::new(two_cycle_timeline(), EditorConfig::default());

    let vitals = editor.grid.add_activity("Vital Signs");
    let labs = editor.grid.add_activity("Hematology");
    editor.grid.set_cell(&vitals, "d1", CellEntry::occurring());
    editor.grid.set_cell(&labs, "d2", CellEntry::occurring());
    editor.comments.set(&vitals, "d1", "fasting");
    editor
        .links
        .create("screening pair", &["d1".to_string(), "d2".to_string()])
        .unwrap();

    // Structural moves leave the side tables alone
    assert!(drag_drop(
        &mut editor,
        Level::Day,
        "d1",
        Level::Day,
        "d2",
        DropPosition::After
    ));
    assert!(editor.grid.cell(&vitals, "d1").is_some());
    assert_eq!(editor.comments.get(&vitals, "d1"), Some("fasting"));
    assert!(editor.links.are_linked("d1", "d2"));

    // The vacated week is pending a decision; keep it, then refill it
    let decision = editor.pending_decision().expect("w1 was emptied");
    assert_eq!(decision.id, "w1");
    editor.resolve_empty_decision(EmptyResolution::Keep);
    let added = editor.add_child(Level::Week, "w1").expect("w1 still exists");
    assert!(find_path(editor.timeline(), Level::Day, &added).is_some());

    // Deleting a day prunes its column everywhere
    assert!(editor.delete_item(Level::Day, "d1"));
    assert!(editor.grid.cell(&vitals, "d1").is_none());
    assert_eq!(editor.comments.get(&vitals, "d1"), None);
    assert!(!editor.links.are_linked("d1", "d2"));
    assert!(editor.grid.cell(&labs, "d2").is_some());

    // The activity rows themselves never moved
    assert_eq!(editor.grid.activities.len(), 2);
}

#[test]
fn add_sibling_before_and_after_anchor() {
    let mut editor = Editor::new(small_timeline(), EditorConfig::default());
    let after = editor.add_sibling(Level::Day, "d1", Side::After).unwrap();
    let before = editor.add_sibling(Level::Day, "d1", Side::Before).unwrap();
    let ids = editor.timeline().day_ids();
    assert_eq!(ids, vec![before.clone(), "d1".to_string(), after, "d2".to_string()]);
    assert_eq!(editor.timeline().visit_number(&before), Some(1));
    assert_eq!(editor.history_depth(), 2);
}
