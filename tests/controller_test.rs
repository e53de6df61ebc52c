//! Tests for DemoController state transitions

use std::sync::Arc;

use rstest::{fixture, rstest};

use forestviz::application::{
    DemoController, DemoOptions, DemoState, Direction, Rejected, TickOutcome,
};
use forestviz::domain::{ForestBuilder, NodeId};
use forestviz::infrastructure::traits::{BuildCounterSalt, FixedSalt};
use forestviz::render::RenderAdapter;
use forestviz::util::testing;

fn controller_with(initial_leaves: usize, auto_max_leaves: usize) -> DemoController {
    testing::init_test_setup();
    DemoController::new(
        ForestBuilder::default(),
        Arc::new(FixedSalt(0)),
        DemoOptions {
            initial_leaves,
            auto_max_leaves,
        },
    )
}

#[fixture]
fn controller() -> DemoController {
    controller_with(4, 8)
}

#[rstest]
fn given_new_controller_when_inspecting_then_idle_with_initial_forest(
    controller: DemoController,
) {
    assert_eq!(controller.state(), DemoState::Idle);
    assert_eq!(controller.leaf_count(), 4);
    assert_eq!(controller.forest().leaf_count(), 4);
    assert_eq!(controller.selected(), None);
}

// ============================================================
// add / remove
// ============================================================

#[rstest]
fn given_idle_when_adding_then_busy_until_finished(mut controller: DemoController) {
    assert_eq!(controller.add_leaf(), Ok(5));
    assert_eq!(controller.state(), DemoState::Busy(Direction::Growing));
    assert_eq!(controller.forest().leaf_count(), 5);
    assert_eq!(controller.forest().root_count(), 2);

    controller.finish_transition().unwrap();
    assert_eq!(controller.state(), DemoState::Idle);
    assert_eq!(controller.add_leaf(), Ok(6));
}

#[test]
fn given_three_leaves_when_adding_then_two_roots_merge_into_one() {
    let mut controller = controller_with(3, 8);
    assert_eq!(controller.forest().root_count(), 2);

    assert_eq!(controller.add_leaf(), Ok(4));

    assert_eq!(controller.leaf_count(), 4);
    assert_eq!(controller.forest().root_count(), 1);
}

#[rstest]
fn given_busy_when_any_guarded_call_then_rejected_without_change(
    mut controller: DemoController,
) {
    controller.remove_leaf().unwrap();
    let before = controller.snapshot();
    let busy = Rejected::NotIdle(DemoState::Busy(Direction::Shrinking));

    assert_eq!(controller.add_leaf(), Err(busy.clone()));
    assert_eq!(controller.remove_leaf(), Err(busy.clone()));
    assert_eq!(controller.reset(), Err(busy.clone()));
    assert_eq!(controller.start_auto_sequence(), Err(busy));

    let after = controller.snapshot();
    assert_eq!(after.leaf_count, before.leaf_count);
    assert_eq!(after.revision, before.revision);
    assert!(Arc::ptr_eq(&after.forest, &before.forest));
}

#[test]
fn given_single_leaf_when_removing_then_rejected_at_minimum() {
    let mut controller = controller_with(1, 8);

    assert_eq!(controller.remove_leaf(), Err(Rejected::AtMinimum));
    assert_eq!(controller.state(), DemoState::Idle);
    assert_eq!(controller.leaf_count(), 1);
}

#[test]
fn given_two_leaves_when_removing_then_one_leaf_left() {
    let mut controller = controller_with(2, 8);

    assert_eq!(controller.remove_leaf(), Ok(1));
    assert_eq!(controller.state(), DemoState::Busy(Direction::Shrinking));
    assert_eq!(controller.forest().len(), 1);
}

#[rstest]
fn given_each_build_when_rebuilding_then_new_forest_instance(mut controller: DemoController) {
    let before = Arc::clone(controller.forest());
    controller.add_leaf().unwrap();
    assert!(!Arc::ptr_eq(&before, controller.forest()));
}

#[test]
fn given_counter_salt_when_rebuilding_then_fresh_fingerprints() {
    let mut controller = DemoController::new(
        ForestBuilder::default(),
        Arc::new(BuildCounterSalt::starting_at(100)),
        DemoOptions::default(),
    );
    let before = controller.forest().node(&NodeId::Leaf(0)).unwrap().fingerprint.clone();

    controller.add_leaf().unwrap();

    assert_eq!(controller.forest().salt(), 101);
    let after = &controller.forest().node(&NodeId::Leaf(0)).unwrap().fingerprint;
    assert_ne!(&before, after);
}

// ============================================================
// reset
// ============================================================

#[rstest]
fn given_selection_when_resetting_then_empty_and_cleared(mut controller: DemoController) {
    controller.select_node(Some(NodeId::Leaf(1))).unwrap();

    controller.reset().unwrap();

    assert_eq!(controller.leaf_count(), 0);
    assert!(controller.forest().is_empty());
    assert_eq!(controller.selected(), None);
    assert_eq!(controller.state(), DemoState::Idle);
}

#[test]
fn given_empty_forest_when_adding_then_single_leaf_root() {
    let mut controller = controller_with(0, 8);

    controller.add_leaf().unwrap();

    let leaf = controller.forest().node(&NodeId::Leaf(0)).unwrap();
    assert!(leaf.is_root && leaf.is_leaf);
}

// ============================================================
// auto-sequence
// ============================================================

#[rstest]
fn given_auto_sequence_when_ticking_then_counts_up_and_finishes(mut controller: DemoController) {
    let run = controller.start_auto_sequence().unwrap();
    assert_eq!(controller.state(), DemoState::AutoSequencing);

    let outcomes: Vec<TickOutcome> = (0..7).map(|_| controller.auto_tick(run).unwrap()).collect();

    for (i, outcome) in outcomes.iter().take(6).enumerate() {
        assert_eq!(*outcome, TickOutcome::Continue { leaf_count: i + 2 });
    }
    assert_eq!(outcomes[6], TickOutcome::Finished { leaf_count: 8 });
    assert_eq!(controller.state(), DemoState::Idle);
    assert_eq!(controller.auto_tick(run), Err(Rejected::StaleTick));
    assert_eq!(controller.leaf_count(), 8);
}

#[rstest]
fn given_idle_forest_when_starting_auto_sequence_then_one_leaf_built_at_once(
    mut controller: DemoController,
) {
    let before = controller.snapshot();

    controller.start_auto_sequence().unwrap();

    let after = controller.snapshot();
    assert_eq!(after.state, DemoState::AutoSequencing);
    assert_eq!(after.leaf_count, 1);
    assert_eq!(after.forest.leaf_count(), 1);
    assert!(!Arc::ptr_eq(&after.forest, &before.forest));
    assert!(after.revision > before.revision);
}

#[rstest]
fn given_stopped_sequence_when_pending_tick_arrives_then_dropped(
    mut controller: DemoController,
) {
    let run = controller.start_auto_sequence().unwrap();
    controller.auto_tick(run).unwrap();
    controller.auto_tick(run).unwrap();

    controller.stop_auto_sequence().unwrap();

    assert_eq!(controller.auto_tick(run), Err(Rejected::StaleTick));
    assert_eq!(controller.leaf_count(), 3);
    assert_eq!(controller.forest().leaf_count(), 3);
    assert_eq!(controller.state(), DemoState::Idle);
}

#[rstest]
fn given_restarted_sequence_when_old_token_ticks_then_stale(mut controller: DemoController) {
    let first = controller.start_auto_sequence().unwrap();
    controller.stop_auto_sequence().unwrap();
    let second = controller.start_auto_sequence().unwrap();

    assert_ne!(first, second);
    assert_eq!(controller.auto_tick(first), Err(Rejected::StaleTick));
    assert_eq!(
        controller.auto_tick(second),
        Ok(TickOutcome::Continue { leaf_count: 2 })
    );
}

#[rstest]
fn given_auto_sequencing_when_manual_calls_then_rejected(mut controller: DemoController) {
    controller.start_auto_sequence().unwrap();
    let running = Rejected::NotIdle(DemoState::AutoSequencing);

    assert_eq!(controller.add_leaf(), Err(running.clone()));
    assert_eq!(controller.remove_leaf(), Err(running.clone()));
    assert_eq!(controller.start_auto_sequence().map(|_| ()), Err(running));
}

#[rstest]
fn given_idle_when_stopping_then_rejected(mut controller: DemoController) {
    assert_eq!(
        controller.stop_auto_sequence(),
        Err(Rejected::NotAutoSequencing)
    );
}

#[test]
fn given_bound_of_one_when_starting_then_finished_at_once() {
    let mut controller = controller_with(4, 1);
    let run = controller.start_auto_sequence().unwrap();

    assert_eq!(controller.state(), DemoState::Idle);
    assert_eq!(controller.leaf_count(), 1);
    assert_eq!(controller.auto_tick(run), Err(Rejected::StaleTick));
}

// ============================================================
// selection
// ============================================================

#[rstest]
fn given_unknown_node_when_selecting_then_rejected_and_kept(mut controller: DemoController) {
    controller.select_node(Some(NodeId::Leaf(0))).unwrap();

    assert_eq!(
        controller.select_node(Some(NodeId::Internal(99))),
        Err(Rejected::UnknownNode(NodeId::Internal(99)))
    );
    assert_eq!(controller.selected(), Some(NodeId::Leaf(0)));
}

#[rstest]
fn given_auto_sequencing_when_selecting_then_allowed(mut controller: DemoController) {
    let run = controller.start_auto_sequence().unwrap();
    controller.auto_tick(run).unwrap();

    assert_eq!(controller.select_node(Some(NodeId::Leaf(0))), Ok(()));
    assert_eq!(controller.select_node(None), Ok(()));
    assert_eq!(controller.selected(), None);
}

#[rstest]
fn given_selected_node_removed_by_rebuild_when_detailing_then_none(
    mut controller: DemoController,
) {
    controller.select_node(Some(NodeId::Internal(2))).unwrap();

    controller.remove_leaf().unwrap();

    // selection is kept, it simply resolves to nothing in the new forest
    assert_eq!(controller.selected(), Some(NodeId::Internal(2)));
    let adapter = RenderAdapter::new(controller.forest(), controller.selected());
    assert_eq!(adapter.details(), None);
}
