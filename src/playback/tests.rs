use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::*;

const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Loaded(PathBuf),
    Played(PathBuf),
    Paused(PathBuf),
    Stopped(PathBuf),
    Unloaded(PathBuf),
}

/// Shared view into a `RecordingEngine` living on the worker thread.
#[derive(Default)]
struct Probe {
    events: Vec<Event>,
    live: usize,
    max_live: usize,
    reporters: Vec<(PathBuf, StatusReporter)>,
    fail_loads: HashSet<PathBuf>,
    failing_unloads: usize,
    load_delay: Duration,
}

type SharedProbe = Arc<Mutex<Probe>>;

struct RecordingEngine {
    probe: SharedProbe,
}

struct RecordingHandle {
    path: PathBuf,
    probe: SharedProbe,
    unloaded: bool,
}

impl AudioEngine for RecordingEngine {
    fn load(
        &mut self,
        source: &AudioSource,
        reporter: StatusReporter,
    ) -> Result<Box<dyn EngineHandle>, PlaybackError> {
        let delay = self.probe.lock().unwrap().load_delay;
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let path = source.path().to_path_buf();
        let mut probe = self.probe.lock().unwrap();
        if probe.fail_loads.contains(&path) {
            return Err(PlaybackError::Decode(format!("{} is corrupt", path.display())));
        }
        probe.live += 1;
        probe.max_live = probe.max_live.max(probe.live);
        probe.events.push(Event::Loaded(path.clone()));
        probe.reporters.push((path.clone(), reporter));

        Ok(Box::new(RecordingHandle {
            path,
            probe: self.probe.clone(),
            unloaded: false,
        }))
    }
}

impl EngineHandle for RecordingHandle {
    fn play(&mut self) {
        let event = Event::Played(self.path.clone());
        self.probe.lock().unwrap().events.push(event);
    }

    fn pause(&mut self) {
        let event = Event::Paused(self.path.clone());
        self.probe.lock().unwrap().events.push(event);
    }

    fn stop(&mut self) {
        let event = Event::Stopped(self.path.clone());
        self.probe.lock().unwrap().events.push(event);
    }

    fn unload(&mut self) -> Result<(), PlaybackError> {
        let mut probe = self.probe.lock().unwrap();
        if probe.failing_unloads > 0 {
            probe.failing_unloads -= 1;
            return Err(PlaybackError::Release("device busy".into()));
        }
        if !self.unloaded {
            self.unloaded = true;
            probe.live -= 1;
            probe.events.push(Event::Unloaded(self.path.clone()));
        }
        Ok(())
    }
}

impl Drop for RecordingHandle {
    fn drop(&mut self) {
        // A handle dropped without a successful unload still frees its slot.
        if !self.unloaded {
            self.probe.lock().unwrap().live -= 1;
        }
    }
}

fn session() -> (PlaybackSession, SharedProbe) {
    let probe = SharedProbe::default();
    let for_engine = probe.clone();
    let session = PlaybackSession::spawn(move || Ok(RecordingEngine { probe: for_engine }))
        .expect("recording engine never fails to start");
    (session, probe)
}

fn src(name: &str) -> AudioSource {
    AudioSource::from_path(format!("/themes/{name}.mp3"))
}

fn path(name: &str) -> PathBuf {
    src(name).path().to_path_buf()
}

fn reporter_for(probe: &SharedProbe, name: &str) -> StatusReporter {
    let probe = probe.lock().unwrap();
    probe
        .reporters
        .iter()
        .rev()
        .find(|(p, _)| *p == path(name))
        .map(|(_, r)| r.clone())
        .expect("track was loaded")
}

/// Wait until a subscriber sees a status matching `pred`.
fn wait_for(sub: &Subscription, pred: impl Fn(&PlaybackStatus) -> bool) -> PlaybackStatus {
    loop {
        let status = sub.recv_timeout(WAIT).expect("status update in time");
        if pred(&status) {
            return status;
        }
    }
}

#[test]
fn play_from_idle_starts_playing() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();

    let status = session.status();
    assert_eq!(status.active_track_id.as_deref(), Some("t1"));
    assert_eq!(status.state, SessionState::Playing);
    assert!(status.is_playing);
    assert_eq!(
        probe.lock().unwrap().events,
        vec![Event::Loaded(path("a")), Event::Played(path("a"))]
    );
}

#[test]
fn switching_tracks_releases_the_old_handle_before_loading_the_new_one() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    session.play("t2", src("b")).wait().unwrap();

    let status = session.status();
    assert_eq!(status.active_track_id.as_deref(), Some("t2"));
    assert_eq!(status.state, SessionState::Playing);

    let probe = probe.lock().unwrap();
    assert_eq!(
        probe.events,
        vec![
            Event::Loaded(path("a")),
            Event::Played(path("a")),
            Event::Stopped(path("a")),
            Event::Unloaded(path("a")),
            Event::Loaded(path("b")),
            Event::Played(path("b")),
        ]
    );
    assert_eq!(probe.max_live, 1);
    assert_eq!(probe.live, 1);
}

#[test]
fn paused_handle_is_unloaded_without_stopping_when_switching() {
    let (session, probe) = session();
    session.toggle("t1", src("a")).wait().unwrap();
    session.toggle("t1", src("a")).wait().unwrap();
    session.toggle("t2", src("b")).wait().unwrap();

    let probe = probe.lock().unwrap();
    let a_events: Vec<&Event> = probe
        .events
        .iter()
        .filter(|e| matches!(e, Event::Stopped(p) | Event::Unloaded(p) if *p == path("a")))
        .collect();
    assert_eq!(a_events, vec![&Event::Unloaded(path("a"))]);
}

#[test]
fn toggle_twice_on_the_same_track_restores_playing_state() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    assert!(session.status().is_playing);

    session.toggle("t1", src("a")).wait().unwrap();
    let paused = session.status();
    assert_eq!(paused.state, SessionState::Paused);
    assert!(!paused.is_playing);
    assert_eq!(paused.active_track_id.as_deref(), Some("t1"));

    session.toggle("t1", src("a")).wait().unwrap();
    let resumed = session.status();
    assert_eq!(resumed.state, SessionState::Playing);
    assert!(resumed.is_playing);

    // Pause/resume keeps the same handle.
    let loads = probe
        .lock()
        .unwrap()
        .events
        .iter()
        .filter(|e| matches!(e, Event::Loaded(_)))
        .count();
    assert_eq!(loads, 1);
}

#[test]
fn toggle_on_another_track_switches() {
    let (session, _probe) = session();
    session.toggle("t1", src("a")).wait().unwrap();
    session.toggle("t2", src("b")).wait().unwrap();

    let status = session.status();
    assert_eq!(status.active_track_id.as_deref(), Some("t2"));
    assert!(status.is_playing);
}

#[test]
fn stop_on_idle_session_is_a_no_op() {
    let (session, probe) = session();
    let sub = session.subscribe();
    assert_eq!(sub.try_recv(), Some(PlaybackStatus::idle()));

    session.stop();
    session.stop();

    assert_eq!(session.status(), PlaybackStatus::idle());
    assert!(sub.try_recv().is_none());
    assert!(probe.lock().unwrap().events.is_empty());
}

#[test]
fn stop_releases_the_handle_and_resets_status() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    session.stop();

    assert_eq!(session.status(), PlaybackStatus::idle());
    let probe = probe.lock().unwrap();
    assert_eq!(probe.live, 0);
    assert_eq!(probe.events.last(), Some(&Event::Unloaded(path("a"))));
}

#[test]
fn load_failure_returns_to_idle_and_reports_to_caller() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    probe.lock().unwrap().fail_loads.insert(path("broken"));

    let err = session.play("t2", src("broken")).wait().unwrap_err();
    assert!(err.to_string().contains("corrupt"));
    let cause = std::error::Error::source(&err)
        .and_then(|e| e.downcast_ref::<PlaybackError>())
        .expect("engine error is kept as the source");
    assert!(matches!(cause, PlaybackError::Decode(msg) if msg.contains("corrupt")));
    match err {
        PlaybackError::Load { track_id, .. } => assert_eq!(track_id, "t2"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(session.status(), PlaybackStatus::idle());
    assert_eq!(probe.lock().unwrap().live, 0);

    // The session keeps working afterwards.
    session.play("t3", src("c")).wait().unwrap();
    assert_eq!(session.status().active_track_id.as_deref(), Some("t3"));
}

#[test]
fn empty_track_id_is_rejected_without_touching_the_engine() {
    let (session, probe) = session();
    let err = session.play("", src("a")).wait().unwrap_err();
    assert!(matches!(err, PlaybackError::EmptyTrackId));
    assert!(probe.lock().unwrap().events.is_empty());
}

#[test]
fn natural_completion_releases_handle_and_resets_status() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    let sub = session.subscribe();

    let reporter = reporter_for(&probe, "a");
    assert!(reporter.report(EngineStatus {
        position: Duration::from_secs(600),
        duration: Some(Duration::from_secs(600)),
        did_just_finish: true,
    }));

    let status = wait_for(&sub, |s| s.active_track_id.is_none());
    assert_eq!(status, PlaybackStatus::idle());
    assert_eq!(probe.lock().unwrap().live, 0);

    // A late subscriber immediately sees the empty status.
    let late = session.subscribe();
    assert_eq!(late.try_recv(), Some(PlaybackStatus::idle()));
}

#[test]
fn position_reports_update_status() {
    let (session, probe) = session();
    let sub = session.subscribe();
    session.play("t1", src("a")).wait().unwrap();

    reporter_for(&probe, "a").report(EngineStatus {
        position: Duration::from_millis(1500),
        duration: Some(Duration::from_secs(90)),
        did_just_finish: false,
    });

    let status = wait_for(&sub, |s| s.position_ms > 0);
    assert_eq!(status.position_ms, 1500);
    assert_eq!(status.duration_ms, Some(90_000));
    assert!(status.is_playing);
}

#[test]
fn reports_from_a_released_handle_are_ignored() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    let stale = reporter_for(&probe, "a");
    session.play("t2", src("b")).wait().unwrap();

    stale.report(EngineStatus {
        position: Duration::from_secs(42),
        duration: Some(Duration::from_secs(60)),
        did_just_finish: true,
    });
    // Commands are handled in order, so the stale report has been seen
    // once this toggle completes.
    session.toggle("t2", src("b")).wait().unwrap();

    let status = session.status();
    assert_eq!(status.active_track_id.as_deref(), Some("t2"));
    assert_eq!(status.position_ms, 0);
    assert_eq!(probe.lock().unwrap().live, 1);
}

#[test]
fn reports_after_stop_are_ignored() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    let reporter = reporter_for(&probe, "a");
    session.stop();

    reporter.report(EngineStatus {
        position: Duration::from_secs(5),
        duration: None,
        did_just_finish: false,
    });
    session.stop();

    assert_eq!(session.status(), PlaybackStatus::idle());
}

#[test]
fn two_subscribers_see_identical_snapshots() {
    let (session, _probe) = session();
    let list = session.subscribe();
    let detail = session.subscribe();

    session.toggle("t1", src("a")).wait().unwrap();

    let from_list = wait_for(&list, |s| s.is_playing);
    let from_detail = wait_for(&detail, |s| s.is_playing);
    assert_eq!(from_list, from_detail);
    assert_eq!(from_list.active_track_id.as_deref(), Some("t1"));
}

#[test]
fn loading_state_is_published_before_playing() {
    let (session, _probe) = session();
    let sub = session.subscribe();
    session.play("t1", src("a")).wait().unwrap();

    let mut states = Vec::new();
    while let Some(status) = sub.try_recv() {
        states.push(status.state);
    }
    assert_eq!(
        states,
        vec![SessionState::Idle, SessionState::Loading, SessionState::Playing]
    );
}

#[test]
fn unsubscribe_is_safe_after_stop_and_after_drop() {
    let (session, _probe) = session();
    let a = session.subscribe();
    let b = session.subscribe();
    assert_eq!(session.subscriber_count(), 2);

    session.play("t1", src("a")).wait().unwrap();
    session.stop();
    a.unsubscribe();
    assert_eq!(session.subscriber_count(), 1);

    drop(session);
    assert!(b.latest().is_some());
    b.unsubscribe();
}

#[test]
fn unload_failure_is_retried_once_then_swallowed() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();

    probe.lock().unwrap().failing_unloads = 1;
    session.stop();
    assert_eq!(probe.lock().unwrap().live, 0);

    session.play("t2", src("b")).wait().unwrap();
    probe.lock().unwrap().failing_unloads = 2;
    session.stop();
    assert_eq!(session.status(), PlaybackStatus::idle());
    assert_eq!(probe.lock().unwrap().live, 0);
}

#[test]
fn overlapping_requests_never_produce_two_live_handles() {
    let (session, probe) = session();
    probe.lock().unwrap().load_delay = Duration::from_millis(20);
    let session = Arc::new(session);

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let session = session.clone();
            thread::spawn(move || {
                for round in 0..5 {
                    let id = format!("t{}", (i + round) % 3);
                    let _ = session.toggle(id, src(&format!("s{i}"))).wait();
                    if round % 2 == 1 {
                        session.stop();
                    }
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let probe = probe.lock().unwrap();
    assert_eq!(probe.max_live, 1);
    assert!(probe.live <= 1);
}

#[test]
fn second_play_waits_for_pending_load() {
    let (session, probe) = session();
    probe.lock().unwrap().load_delay = Duration::from_millis(50);

    let first = session.play("t1", src("a"));
    let second = session.play("t2", src("b"));
    assert!(first.poll().is_none());

    second.wait().unwrap();
    first.wait().unwrap();

    assert_eq!(session.status().active_track_id.as_deref(), Some("t2"));
    let probe = probe.lock().unwrap();
    assert_eq!(probe.max_live, 1);
    assert_eq!(
        probe.events,
        vec![
            Event::Loaded(path("a")),
            Event::Played(path("a")),
            Event::Stopped(path("a")),
            Event::Unloaded(path("a")),
            Event::Loaded(path("b")),
            Event::Played(path("b")),
        ]
    );
}

#[test]
fn dropping_the_session_releases_the_handle() {
    let (session, probe) = session();
    session.play("t1", src("a")).wait().unwrap();
    session.shutdown();

    assert_eq!(probe.lock().unwrap().live, 0);
}

#[test]
fn engine_start_failure_is_reported() {
    let err = PlaybackSession::spawn(|| -> Result<RecordingEngine, PlaybackError> {
        Err(PlaybackError::Output("no device".into()))
    })
    .unwrap_err();
    assert!(matches!(err, PlaybackError::Output(_)));
}
