#![allow(clippy::unwrap_used)]

use tracing_subscriber::EnvFilter;
use wirenet::history::{Command, EditCommand, UndoStack};
use wirenet::math::{OrientationMode, Point, Vector};
use wirenet::net::{Entity, NetStore, SegmentData, SegmentId};
use wirenet::{EngineConfig, Schematic};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
}

fn snapshot(doc: &Schematic) -> Vec<(SegmentId, SegmentData)> {
    doc.store()
        .segments()
        .map(|(id, s)| (id, s.clone()))
        .collect()
}

fn draw(doc: &mut Schematic, a: Point, b: Point) -> Vec<SegmentId> {
    doc.draw_wire(a, b, 0, OrientationMode::Orthogonal).unwrap()
}

/// Appends its value to a log.
struct Append(u32);

impl Command for Append {
    type Target = Vec<u32>;

    fn undo(&self, log: &mut Vec<u32>) {
        log.pop();
    }

    fn redo(&self, log: &mut Vec<u32>) {
        log.push(self.0);
    }

    fn text(&self) -> String {
        format!("append {}", self.0)
    }
}

fn push(stack: &mut UndoStack<Append>, log: &mut Vec<u32>, value: u32) {
    let cmd = Append(value);
    cmd.redo(log);
    stack.push(cmd);
}

#[test]
fn undo_then_redo_restores_the_session() {
    init_tracing();
    let mut doc = Schematic::default();
    draw(&mut doc, p(0, 0), p(40, 0));
    draw(&mut doc, p(20, 0), p(20, 30));
    let ids = doc.store().segment_ids();
    doc.rename_segment(ids[0], "clk").unwrap();
    let vertical = draw(&mut doc, p(60, 0), p(60, 40))[0];
    doc.move_segment(vertical, Vector::new(10, 0)).unwrap();

    let steps = doc.history().len();
    assert_eq!(steps, 5);
    let before = snapshot(&doc);

    for _ in 0..steps {
        assert!(doc.undo());
    }
    assert!(doc.store().segment_ids().is_empty());
    assert!(!doc.undo());

    for _ in 0..steps {
        assert!(doc.redo());
    }
    assert!(!doc.redo());
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn macro_of_three_undoes_in_one_step() {
    let mut log = Vec::new();
    let mut stack = UndoStack::default();
    push(&mut stack, &mut log, 1);
    stack.begin_macro("three").unwrap();
    for v in [2, 3, 4] {
        push(&mut stack, &mut log, v);
    }
    stack.end_macro().unwrap();

    assert_eq!(stack.len(), 2);
    assert!(stack.undo(&mut log));
    assert_eq!(log, vec![1]);
    assert!(stack.redo(&mut log));
    assert_eq!(log, vec![1, 2, 3, 4]);
}

#[test]
fn new_edit_discards_the_undone_future() {
    init_tracing();
    let mut doc = Schematic::default();
    draw(&mut doc, p(0, 0), p(40, 0));
    draw(&mut doc, p(0, 20), p(40, 20));
    assert!(doc.undo());
    assert!(doc.history().can_redo());
    draw(&mut doc, p(0, 40), p(40, 40));
    assert!(!doc.history().can_redo());
    assert_eq!(doc.history().len(), 2);
}

#[test]
fn history_keeps_only_the_newest_entries() {
    let mut log = Vec::new();
    let mut stack = UndoStack::new(99);
    for v in 0..120 {
        push(&mut stack, &mut log, v);
    }
    assert_eq!(stack.len(), 99);
    while stack.undo(&mut log) {}
    assert_eq!(log.len(), 21);
}

#[test]
fn configured_depth_bounds_the_document_history() {
    let mut doc = Schematic::new(EngineConfig::default().with_history_depth(2));
    for y in [0, 20, 40] {
        draw(&mut doc, p(0, y), p(40, y));
    }
    assert_eq!(doc.history().len(), 2);
    assert!(doc.undo());
    assert!(doc.undo());
    assert!(!doc.undo());
    assert_eq!(doc.store().segment_ids().len(), 1);
}

#[test]
fn removed_command_is_forgotten_not_reverted() {
    let mut log = Vec::new();
    let mut stack = UndoStack::default();
    push(&mut stack, &mut log, 1);
    push(&mut stack, &mut log, 2);
    assert_eq!(stack.remove_last_command().map(|c| c.0), Some(2));
    assert_eq!(log, vec![1, 2]);
    assert!(stack.undo(&mut log));
    assert_eq!(log, vec![1]);
    assert!(!stack.can_undo());
}

#[test]
fn failed_edit_leaves_drawing_and_history_untouched() {
    init_tracing();
    let mut doc = Schematic::default();
    let id = draw(&mut doc, p(0, 0), p(40, 0))[0];
    let before = snapshot(&doc);

    assert!(doc.rename_segment(id, "net<0:>").is_err());
    doc.rename_segment(id, "keep").unwrap();
    assert!(doc.clear_segment_name(id).is_err());

    assert_eq!(doc.history().len(), 2);
    assert!(doc.undo());
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn undo_on_purged_entities_does_nothing() {
    let mut store = NetStore::new();
    let mut stack = UndoStack::default();
    let id = store.add_segment(SegmentData::new(p(0, 0), p(10, 0)).unwrap());
    stack.push(EditCommand::Add(Entity::Segment(id)));
    store.purge(Entity::Segment(id));

    assert!(stack.undo(&mut store));
    assert!(stack.redo(&mut store));
    assert!(store.segment_ids().is_empty());
    assert!(!store.exists(Entity::Segment(id)));
}

#[test]
fn deleting_and_restoring_keeps_the_id() {
    init_tracing();
    let mut doc = Schematic::default();
    let id = draw(&mut doc, p(0, 0), p(40, 0))[0];
    doc.delete_segment(id).unwrap();
    assert!(doc.net_name(id).is_none());
    assert!(doc.delete_segment(id).is_err());
    assert!(doc.undo());
    assert_eq!(doc.net_name(id), Some("net0"));
}
