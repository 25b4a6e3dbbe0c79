//! Composite laws and snapshot behavior through the public tree API.

use behavior_tree::builder::{action, cooldown, inverter, repeater, retry, selector, sequence};
use behavior_tree::{BehaviorNode, BehaviorTree, Status, TreeError, TreeSnapshot};

#[derive(Default)]
struct Log {
    visited: Vec<&'static str>,
}

fn step(name: &'static str, status: Status) -> BehaviorNode<Log> {
    action(name, move |log: &mut Log| {
        log.visited.push(name);
        status
    })
}

#[test]
fn selector_stops_at_first_success() {
    let mut tree = BehaviorTree::new(
        "selector",
        selector(
            "root",
            vec![
                step("a", Status::Failure),
                step("b", Status::Success),
                step("c", Status::Success),
            ],
        ),
    );
    let mut log = Log::default();

    assert_eq!(tree.update(&mut log, 0), Status::Success);
    assert_eq!(log.visited, ["a", "b"]);
}

#[test]
fn sequence_stops_at_first_failure() {
    let mut tree = BehaviorTree::new(
        "sequence",
        sequence(
            "root",
            vec![
                step("a", Status::Success),
                step("b", Status::Failure),
                step("c", Status::Success),
            ],
        ),
    );
    let mut log = Log::default();

    assert_eq!(tree.update(&mut log, 0), Status::Failure);
    assert_eq!(log.visited, ["a", "b"]);
}

#[test]
fn inverter_twice_is_identity() {
    for status in [Status::Success, Status::Failure, Status::Running] {
        let mut tree = BehaviorTree::new(
            "double",
            inverter("outer", inverter("inner", step("x", status))),
        );
        assert_eq!(tree.update(&mut Log::default(), 0), status);
    }
}

#[test]
fn retry_and_repeater_bounds() {
    let mut log = Log::default();
    let mut tree = BehaviorTree::new("retry", retry("retry", 2, step("fail", Status::Failure)));
    assert_eq!(tree.update(&mut log, 0), Status::Failure);
    assert_eq!(log.visited.len(), 3);

    let mut log = Log::default();
    let mut tree = BehaviorTree::new("repeat", repeater("repeat", 4, step("ok", Status::Success)));
    assert_eq!(tree.update(&mut log, 0), Status::Success);
    assert_eq!(log.visited.len(), 4);
}

#[test]
fn builder_requires_root() {
    let result = BehaviorTree::<Log>::builder("empty").max_iterations(10).build();
    assert!(matches!(result, Err(TreeError::MissingRoot(name)) if name == "empty"));
}

fn cooled() -> BehaviorTree<Log> {
    BehaviorTree::new("cooled", cooldown("cd", 1_000, step("act", Status::Success)))
}

#[test]
fn snapshot_carries_decorator_state_through_json() {
    let mut tree = cooled();
    let mut log = Log::default();
    tree.update(&mut log, 0);
    tree.abort();

    let json = serde_json::to_string(&tree.snapshot()).unwrap();
    let snapshot: TreeSnapshot = serde_json::from_str(&json).unwrap();

    let mut restored = cooled();
    restored.restore(snapshot).unwrap();
    assert_eq!(restored.snapshot(), tree.snapshot());
    assert!(restored.is_aborted());

    // Abort consumes one update; the cooldown stamp from t=0 still holds at t=500.
    assert_eq!(restored.update(&mut log, 400), Status::Failure);
    assert_eq!(restored.update(&mut log, 500), Status::Failure);
    assert_eq!(restored.update(&mut log, 1_000), Status::Success);
    assert_eq!(log.visited, ["act", "act"]);
    assert_eq!(restored.stats().execution_count, 4);
}

#[test]
fn snapshot_from_other_shape_is_rejected() {
    let mut donor = BehaviorTree::new(
        "donor",
        sequence("root", vec![step("a", Status::Success), step("b", Status::Success)]),
    );
    donor.update(&mut Log::default(), 0);

    let mut tree = cooled();
    let before = tree.snapshot();
    assert!(matches!(
        tree.restore(donor.snapshot()),
        Err(TreeError::ShapeMismatch { .. })
    ));
    assert_eq!(tree.snapshot(), before);
}
