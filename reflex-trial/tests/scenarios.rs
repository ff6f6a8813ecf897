use rand::SeedableRng;
use rand::rngs::StdRng;
use reflex_core::{NewScore, PlayerSession, Transition, TrialState};
use reflex_timing::{Clock, DeadlineQueue, DelayPolicy, ManualClock};
use reflex_trial::{CueTicket, ScoreSink, TrialConfig, TrialController};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<NewScore>>>);

impl ScoreSink for Recorder {
    fn submit(&self, score: NewScore) {
        self.0.borrow_mut().push(score);
    }
}

type Controller =
    TrialController<ManualClock, DeadlineQueue<ManualClock, CueTicket>, StdRng, Recorder>;

fn setup(policy: DelayPolicy, seed: u64) -> (Controller, ManualClock, Recorder) {
    let clock = ManualClock::starting_at(0);
    let sink = Recorder::default();
    let controller = TrialController::new(
        TrialConfig::with_delay(policy),
        clock.clone(),
        DeadlineQueue::new(clock.clone()),
        StdRng::seed_from_u64(seed),
        sink.clone(),
    );
    (controller, clock, sink)
}

fn player() -> PlayerSession {
    PlayerSession::register("Grace", None).unwrap()
}

#[test]
fn cue_at_2500_click_at_2700_scores_200() {
    let (mut c, clock, sink) = setup(DelayPolicy::fixed(2500), 1);
    let p = player();

    assert_eq!(
        c.initiate(&p),
        Transition::Armed {
            delay: std::time::Duration::from_millis(2500)
        }
    );
    clock.set(2499);
    assert!(c.update().is_empty());
    assert_eq!(c.state(), TrialState::Armed);

    clock.set(2500);
    assert_eq!(c.update(), vec![Transition::CueShown { cue_at: 2500 }]);
    assert_eq!(c.state(), TrialState::Reacting);
    assert_eq!(c.current_trial().timestamps.cue_at, Some(2500));
    assert_eq!(c.pending_cues(), 0);

    clock.set(2700);
    assert_eq!(c.react_or_miss(), Transition::Scored { score: 200 });
    assert_eq!(c.state(), TrialState::Success);
    assert_eq!(c.score(), Some(200));

    let saved = sink.0.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].score_ms, 200);
    assert_eq!(saved[0].player_name, "Grace");
    assert_eq!(saved[0].player_email, None);
}

#[test]
fn click_before_cue_is_penalized_without_persisting() {
    let (mut c, clock, sink) = setup(DelayPolicy::fixed(2000), 1);
    c.initiate(&player());

    clock.set(1000);
    assert_eq!(c.react_or_miss(), Transition::Penalized);
    assert_eq!(c.state(), TrialState::Penalty);
    assert_eq!(c.score(), None);
    assert_eq!(c.pending_cues(), 0);

    // the cancelled cue must not fire later
    clock.set(5000);
    assert!(c.update().is_empty());
    assert_eq!(c.state(), TrialState::Penalty);
    assert!(sink.0.borrow().is_empty());
}

#[test]
fn second_initiate_is_ignored() {
    let (mut c, clock, _) = setup(DelayPolicy::default(), 42);
    let p = player();

    let first = c.initiate(&p);
    let handle = c.current_trial().pending;
    let delay = c.current_trial().delay;
    assert!(matches!(first, Transition::Armed { .. }));

    clock.set(10);
    assert_eq!(c.initiate(&p), Transition::Ignored);
    assert_eq!(c.pending_cues(), 1);
    assert_eq!(c.current_trial().pending, handle);
    assert_eq!(c.current_trial().delay, delay);
    assert_eq!(c.current_trial().timestamps.armed_at, Some(0));
    assert_eq!(c.current_trial().epoch, 1);
}

#[test]
fn initiate_while_reacting_is_ignored() {
    let (mut c, clock, _) = setup(DelayPolicy::fixed(1000), 3);
    let p = player();
    c.initiate(&p);
    clock.set(1000);
    c.update();
    assert_eq!(c.initiate(&p), Transition::Ignored);
    assert_eq!(c.state(), TrialState::Reacting);
    assert_eq!(c.pending_cues(), 0);
}

#[test]
fn stale_cue_from_abandoned_trial_cannot_touch_new_trial() {
    let (mut c, clock, _) = setup(DelayPolicy::fixed(3000), 5);
    let p = player();

    c.initiate(&p);
    let old = CueTicket {
        epoch: c.current_trial().epoch,
    };
    clock.set(100);
    c.react_or_miss();
    c.acknowledge();
    c.initiate(&p);
    assert_eq!(c.state(), TrialState::Armed);

    // a late firing tagged with the first trial
    clock.set(3000);
    assert_eq!(c.on_cue_fired(old), Transition::Ignored);
    assert_eq!(c.state(), TrialState::Armed);
    assert_eq!(c.current_trial().timestamps.cue_at, None);

    clock.set(3100);
    assert_eq!(c.update(), vec![Transition::CueShown { cue_at: 3100 }]);
}

#[test]
fn late_firing_after_resolution_is_ignored() {
    let (mut c, clock, _) = setup(DelayPolicy::fixed(1000), 5);
    c.initiate(&player());
    let ticket = CueTicket {
        epoch: c.current_trial().epoch,
    };
    clock.set(1000);
    c.update();
    clock.set(1250);
    c.react_or_miss();
    assert_eq!(c.on_cue_fired(ticket), Transition::Ignored);
    assert_eq!(c.state(), TrialState::Success);
    assert_eq!(c.score(), Some(250));
}

#[test]
fn pending_task_exists_exactly_while_armed() {
    let (mut c, clock, _) = setup(DelayPolicy::default(), 9);
    let p = player();
    for round in 0..50u64 {
        assert_eq!(c.state(), TrialState::Idle);
        assert_eq!(c.pending_cues(), 0);
        c.initiate(&p);
        assert_eq!(c.pending_cues(), 1);
        if round % 2 == 0 {
            clock.advance(500);
            c.react_or_miss();
        } else {
            clock.advance(4000);
            c.update();
            assert_eq!(c.pending_cues(), 0);
            clock.advance(150);
            c.react_or_miss();
        }
        assert_eq!(c.pending_cues(), 0);
        c.acknowledge();
    }
}

#[test]
fn seeded_trials_respect_delay_and_score_bounds() {
    let (mut c, clock, sink) = setup(DelayPolicy::default(), 0xC0FFEE);
    let p = player();
    for i in 0..200u64 {
        c.initiate(&p);
        let armed_at = clock.now();
        // step in 1 ms ticks until the cue shows
        while c.state() == TrialState::Armed {
            clock.advance(1);
            c.update();
        }
        let cue_at = c.current_trial().timestamps.cue_at.unwrap();
        let waited = cue_at - armed_at;
        assert!((1000..4000).contains(&waited), "waited {waited}");

        clock.advance(120 + i);
        let Transition::Scored { score } = c.react_or_miss() else {
            panic!("expected a score");
        };
        assert_eq!(score, 120 + i);
        c.acknowledge();
    }
    assert_eq!(sink.0.borrow().len(), 200);
}
