//! ステップ実行の統合テスト

mod common;

use common::{next_event, session, start, sync, MAIN};
use kanshi_core::{Breakpoint, DebugEvent, Location, StepDirection, StepState};
use kanshi_target::mock::MockFrame;

#[test]
fn test_step_without_suspended_thread_is_unavailable() {
    let (mock, debugger, rx) = session();
    assert!(!debugger.step_over().unwrap());

    mock.add_thread(MAIN, vec![MockFrame::new("Main", "quorum.Main", 1)]);
    start(&mock, &debugger, &rx);
    debugger.resume().unwrap();
    assert!(!debugger.step_into().unwrap());
    assert!(mock.live_step_requests(MAIN).is_empty());
}

#[test]
fn test_second_step_replaces_pending_step() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, vec![MockFrame::new("Main", "quorum.Main", 1)]);
    start(&mock, &debugger, &rx);

    assert!(debugger.step_over().unwrap());
    // 再開されたので、次のステップのために停止させる
    debugger.pause().unwrap();
    assert!(debugger.step_into().unwrap());

    let live = mock.live_step_requests(MAIN);
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].direction, StepDirection::Into);
    assert_eq!(debugger.step_state(MAIN), StepState::Pending(StepDirection::Into));
}

#[test]
fn test_step_completion_emits_step_event() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, vec![MockFrame::new("Main", "quorum.Main", 1)]);
    start(&mock, &debugger, &rx);

    assert!(debugger.step_out().unwrap());
    let resumes = mock.resume_count();
    assert!(resumes >= 1);

    let location = Location::new("quorum.Main", "Main", 2);
    assert!(mock.complete_step(MAIN, location.clone()));
    assert_eq!(next_event(&rx), DebugEvent::Step(location));
    assert_eq!(debugger.step_state(MAIN), StepState::Idle);
    assert!(mock.live_step_requests(MAIN).is_empty());
}

#[test]
fn test_step_request_uses_configured_exclusions() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, vec![MockFrame::new("Main", "quorum.Main", 1)]);
    start(&mock, &debugger, &rx);

    debugger.step_over().unwrap();
    let live = mock.live_step_requests(MAIN);
    assert_eq!(live[0].exclusions, debugger.config().step_exclusions);
    assert!(live[0].exclusions.iter().any(|p| p == "sun.*"));
}

#[test]
fn test_run_forward_to_line_fires_once() {
    let (mock, debugger, rx) = session();
    let unit = mock.define_unit("quorum.Main", &[(12, "Main")]);
    start(&mock, &debugger, &rx);
    mock.load_unit(&unit);
    sync(&mock, &rx);

    debugger.run_forward_to_line("quorum.Main", 12).unwrap();
    let live = mock.live_line_requests();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].hit_count, Some(1));

    assert!(mock.hit_line("quorum.Main", 12, MAIN));
    assert_eq!(
        next_event(&rx),
        DebugEvent::BreakpointHit(Location::new("quorum.Main", "Main", 12))
    );
    assert!(!mock.hit_line("quorum.Main", 12, MAIN));
    assert!(sync(&mock, &rx).is_empty());
}

#[test]
fn test_run_forward_keeps_existing_breakpoint() {
    let (mock, debugger, rx) = session();
    let unit = mock.define_unit("quorum.Main", &[(12, "Main")]);
    start(&mock, &debugger, &rx);
    mock.load_unit(&unit);
    sync(&mock, &rx);

    debugger.add_breakpoint(Breakpoint::new("quorum.Main", 12));
    debugger.run_forward_to_line("quorum.Main", 12).unwrap();

    assert_eq!(debugger.breakpoints(), vec![Breakpoint::new("quorum.Main", 12)]);
    let live = mock.live_line_requests();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].hit_count, None);

    let hit = DebugEvent::BreakpointHit(Location::new("quorum.Main", "Main", 12));
    assert!(mock.hit_line("quorum.Main", 12, MAIN));
    assert_eq!(next_event(&rx), hit);
    assert!(mock.hit_line("quorum.Main", 12, MAIN));
    assert_eq!(next_event(&rx), hit);
}

#[test]
fn test_run_forward_before_load_defers() {
    let (mock, debugger, rx) = session();
    let unit = mock.define_unit("quorum.Later", &[(3, "Run")]);
    start(&mock, &debugger, &rx);

    debugger.run_forward_to_line("quorum.Later", 3).unwrap();
    assert_eq!(
        debugger.breakpoints(),
        vec![Breakpoint::new("quorum.Later", 3).with_hit_count(1)]
    );
    assert!(mock.live_line_requests().is_empty());

    mock.load_unit(&unit);
    sync(&mock, &rx);
    assert_eq!(mock.live_line_requests().len(), 1);
}

#[test]
fn test_replay_operations_are_no_ops() {
    let (mock, debugger, rx) = session();
    mock.add_thread(MAIN, vec![MockFrame::new("Main", "quorum.Main", 1)]);
    start(&mock, &debugger, &rx);
    let (suspends, resumes) = (mock.suspend_count(), mock.resume_count());

    assert!(!debugger.supports_replay());
    debugger.step_back_into();
    debugger.step_back_over();
    debugger.run_back_to_line("quorum.Main", 1);
    debugger.backward();

    assert_eq!(mock.suspend_count(), suspends);
    assert_eq!(mock.resume_count(), resumes);
    assert_eq!(mock.request_count(), 2);
    assert_eq!(debugger.step_state(MAIN), StepState::Idle);

    debugger.forward().unwrap();
    assert_eq!(mock.resume_count(), resumes + 1);
}
