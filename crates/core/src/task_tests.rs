use super::*;
use chrono::Utc;

#[yare::parameterized(
    surface = { "surface", Phase::Surface },
    reflect = { "reflect", Phase::Reflect },
    revisit = { "revisit", Phase::Revisit },
    verify = { "verify", Phase::Verify },
    unknown_coerces_to_surface = { "bogus", Phase::Surface },
)]
fn phase_coerce_normalizes(raw: &str, expected: Phase) {
    assert_eq!(Phase::coerce(raw), expected);
}

#[test]
fn phase_chain_terminates_at_verify() {
    assert_eq!(Phase::Surface.next(), Some(Phase::Reflect));
    assert_eq!(Phase::Reflect.next(), Some(Phase::Revisit));
    assert_eq!(Phase::Revisit.next(), Some(Phase::Verify));
    assert_eq!(Phase::Verify.next(), None);
}

#[yare::parameterized(
    in_progress_underscore = { "in_progress", TaskStatus::InProgress },
    complete = { "complete", TaskStatus::Done },
    error = { "error", TaskStatus::Failed },
    unknown = { "what", TaskStatus::Pending },
)]
fn status_coerce_normalizes_aliases(raw: &str, expected: TaskStatus) {
    assert_eq!(TaskStatus::coerce(raw), expected);
}

#[test]
fn eligible_for_pop_requires_pending_or_failed_and_unlocked() {
    let now = Utc::now();
    let mut task = PipelineTask::new_surface(TaskId::new("t1"), "n".into(), "src".into(), now);
    assert!(task.eligible_for_pop(now));

    task.locked_until = Some(now + chrono::Duration::minutes(5));
    assert!(!task.eligible_for_pop(now));

    task.locked_until = Some(now - chrono::Duration::minutes(1));
    assert!(task.eligible_for_pop(now));

    task.status = TaskStatus::Done;
    task.locked_until = None;
    assert!(!task.eligible_for_pop(now));
}

#[test]
fn follow_up_id_is_deterministic() {
    let now = Utc::now();
    let task = PipelineTask::new_surface(TaskId::new("t1"), "n".into(), "src".into(), now);
    assert_eq!(task.follow_up_id(Phase::Reflect).as_str(), "t1-reflect");
}

#[test]
fn queue_file_round_trips_through_json() {
    let now = Utc::now();
    let mut qf = QueueFile::empty(now);
    qf.tasks
        .push(PipelineTask::new_surface(TaskId::new("t1"), "n".into(), "src".into(), now));
    let raw = serde_json::to_string(&qf).unwrap();
    let back: QueueFile = serde_json::from_str(&raw).unwrap();
    assert_eq!(back.tasks.len(), 1);
    assert_eq!(back.version, 1);
}
