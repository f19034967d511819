use waferview::canvas::PixelBuffer;
use waferview::components::history::HistoryManager;

fn solid(value: u8) -> PixelBuffer {
    PixelBuffer::new(8, 6, [value, value, value, 255])
}

#[test]
fn undo_redo_inverse_law() {
    let mut history = HistoryManager::default();
    let states: Vec<PixelBuffer> = (0..5).map(|i| solid(i * 10)).collect();

    // Simulate five committed mutations: each checkpoint records the
    // snapshot being replaced.
    let mut current = states[0].clone();
    for next in &states[1..] {
        history.checkpoint(current.clone(), "edit");
        current = next.clone();
    }
    assert_eq!(history.undo_count(), 4);

    for _ in 0..4 {
        assert!(history.undo(&mut current).is_some());
    }
    assert_eq!(current, states[0], "N undos must restore the initial state exactly");
    assert!(!history.can_undo());

    for _ in 0..4 {
        assert!(history.redo(&mut current).is_some());
    }
    assert_eq!(current, states[4], "N redos must restore the final state exactly");
    assert!(!history.can_redo());
}

#[test]
fn undo_on_empty_stack_is_a_noop() {
    let mut history = HistoryManager::default();
    let mut current = solid(42);
    assert!(history.undo(&mut current).is_none());
    assert_eq!(current, solid(42));
    assert!(history.redo(&mut current).is_none());
    assert_eq!(current, solid(42));
}

#[test]
fn checkpoint_clears_redo() {
    let mut history = HistoryManager::default();
    let mut current = solid(0);

    history.checkpoint(current.clone(), "first");
    current = solid(1);
    history.checkpoint(current.clone(), "second");
    current = solid(2);

    history.undo(&mut current).unwrap();
    assert!(history.can_redo());

    // A fresh edit after an undo invalidates the redo branch.
    history.checkpoint(current.clone(), "branch");
    current = solid(3);
    assert!(!history.can_redo());
    assert!(history.redo(&mut current).is_none());
    assert_eq!(current, solid(3));
}

#[test]
fn descriptions_track_the_stacks() {
    let mut history = HistoryManager::default();
    let mut current = solid(0);

    history.checkpoint(current.clone(), "Grayscale");
    current = solid(1);
    history.checkpoint(current.clone(), "Cut");
    current = solid(2);

    assert_eq!(history.undo_description(), Some("Cut"));
    assert_eq!(history.undo_history(), vec!["Cut", "Grayscale"]);

    history.undo(&mut current).unwrap();
    assert_eq!(history.redo_description(), Some("Cut"));
    assert_eq!(history.undo_description(), Some("Grayscale"));
}

#[test]
fn depth_cap_prunes_oldest_first() {
    let mut history = HistoryManager::new(3);
    let mut current = solid(0);
    for i in 1..=6 {
        history.checkpoint(current.clone(), format!("edit {}", i));
        current = solid(i * 10);
    }
    assert_eq!(history.undo_count(), 3);
    // Only the three most recent snapshots survive.
    assert_eq!(history.undo_history(), vec!["edit 6", "edit 5", "edit 4"]);
}

#[test]
fn clear_empties_both_stacks() {
    let mut history = HistoryManager::default();
    let mut current = solid(0);
    history.checkpoint(current.clone(), "edit");
    current = solid(1);
    history.undo(&mut current).unwrap();
    assert!(history.can_redo());

    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.memory_usage(), 0);
}
