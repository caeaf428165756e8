use super::*;

#[test]
fn lifecycle_happy_path() {
    let c = JobControl::new();
    assert_eq!(c.state(), JobState::Queued);
    assert!(c.transition(JobState::Rendering));
    assert!(c.transition(JobState::Assembling));
    assert!(c.transition(JobState::Completed));
    assert!(c.state().is_terminal());
}

#[test]
fn terminal_states_are_permanent() {
    for terminal in [JobState::Completed, JobState::Failed, JobState::Cancelled] {
        for next in [
            JobState::Queued,
            JobState::Rendering,
            JobState::Assembling,
            JobState::Completed,
            JobState::Failed,
            JobState::Cancelled,
        ] {
            assert!(!terminal.can_transition_to(next), "{terminal:?} -> {next:?}");
        }
    }
}

#[test]
fn skipping_states_is_rejected() {
    let c = JobControl::new();
    assert!(!c.transition(JobState::Assembling));
    assert!(!c.transition(JobState::Completed));
    assert_eq!(c.state(), JobState::Queued);

    assert!(c.transition(JobState::Rendering));
    assert!(!c.transition(JobState::Queued));
    assert!(c.transition(JobState::Cancelled));
    assert!(!c.transition(JobState::Failed));
    assert_eq!(c.state(), JobState::Cancelled);
}

#[test]
fn any_pre_terminal_state_can_fail_or_cancel() {
    for from in [JobState::Queued, JobState::Rendering, JobState::Assembling] {
        assert!(from.can_transition_to(JobState::Failed));
        assert!(from.can_transition_to(JobState::Cancelled));
    }
}

#[test]
fn progress_is_shared_between_clones() {
    let c = JobControl::new();
    let observer = c.clone();
    c.counters().start(4);
    c.counters().advance();
    c.counters().advance();
    assert_eq!(
        observer.progress(),
        Progress {
            completed: 2,
            total: 4
        }
    );
    assert!((observer.progress().fraction() - 0.5).abs() < 1e-12);

    observer.cancel();
    assert!(c.is_cancelled());
    assert!(c.cancel_token().is_cancelled());
}

#[test]
fn option_validation() {
    assert!(RenderJobOpts::default().validate().is_ok());
    let bad_threads = RenderJobOpts {
        threads: Some(0),
        ..RenderJobOpts::default()
    };
    assert!(bad_threads.validate().is_err());
    let bad_fraction = RenderJobOpts {
        max_failed_fraction: 1.5,
        ..RenderJobOpts::default()
    };
    assert!(bad_fraction.validate().is_err());
    let nan_fraction = RenderJobOpts {
        max_failed_fraction: f64::NAN,
        ..RenderJobOpts::default()
    };
    assert!(nan_fraction.validate().is_err());
    let odd_canvas = RenderJobOpts {
        canvas: Some(Canvas {
            width: 101,
            height: 100,
        }),
        ..RenderJobOpts::default()
    };
    assert!(odd_canvas.validate().is_err());
}

#[test]
fn outcome_reports_its_state() {
    assert_eq!(JobOutcome::Cancelled.state(), JobState::Cancelled);
    let failed = JobOutcome::Failed {
        error: ReelError::encoding("x"),
    };
    assert_eq!(failed.state(), JobState::Failed);
    assert!(failed.warnings().is_empty());
}

#[test]
fn warnings_serialize_with_kind_tags() {
    let w = JobWarning {
        kind: WarningKind::SubstitutedFrames { indices: vec![3] },
        message: "1 of 10".to_owned(),
    };
    let v = serde_json::to_value(&w).unwrap();
    assert_eq!(v["kind"]["kind"], "substituted_frames");
    assert_eq!(v["kind"]["indices"][0], 3);
}
