use super::config::TrialConfig;
use super::submit::ScoreSink;
use super::trial::{CueTicket, Trial, TrialTimestamps};
use log::{debug, info};
use rand::Rng;
use reflex_core::{Millis, NewScore, PlayerSession, Transition, TrialInput, TrialState};
use reflex_timing::{Clock, Scheduler, compute_score};

/// Drives one trial at a time: Idle -> Armed -> Reacting -> Success, or
/// Armed -> Penalty on a premature click.
///
/// Single-threaded: every input and every cue firing runs to completion
/// before the next one is handled.
pub struct TrialController<C, S, R, K>
where
    C: Clock,
    S: Scheduler<Payload = CueTicket>,
    R: Rng,
    K: ScoreSink,
{
    pub config: TrialConfig,
    pub clock: C,
    pub scheduler: S,
    pub rng: R,
    pub sink: K,
    pub trial: Trial,
    pub completed: usize,
}

impl<C, S, R, K> TrialController<C, S, R, K>
where
    C: Clock,
    S: Scheduler<Payload = CueTicket>,
    R: Rng,
    K: ScoreSink,
{
    pub fn new(config: TrialConfig, clock: C, scheduler: S, rng: R, sink: K) -> Self {
        Self {
            config,
            clock,
            scheduler,
            rng,
            sink,
            trial: Trial::default(),
            completed: 0,
        }
    }

    pub fn handle_input(&mut self, input: TrialInput, player: &PlayerSession) -> Transition {
        match input {
            TrialInput::Initiate => self.initiate(player),
            TrialInput::ReactOrMiss => self.react_or_miss(),
            TrialInput::Acknowledge => self.acknowledge(),
        }
    }

    /// The single ambiguous click: its meaning depends on the current state.
    pub fn click(&mut self, player: &PlayerSession) -> Transition {
        let input = self.trial.state.click_input();
        self.handle_input(input, player)
    }

    pub fn initiate(&mut self, player: &PlayerSession) -> Transition {
        if self.trial.state != TrialState::Idle {
            debug!("Initiate ignored in {:?}", self.trial.state);
            return Transition::Ignored;
        }
        // Idle never owns a task, but never leave two behind either.
        self.cancel_pending();

        let epoch = self.trial.epoch + 1;
        let delay = self.config.delay.draw(&mut self.rng);
        let now = self.clock.now();
        let handle = self.scheduler.after(delay, CueTicket { epoch });

        self.trial = Trial {
            epoch,
            state: TrialState::Armed,
            player: Some(player.clone()),
            delay: Some(delay),
            timestamps: TrialTimestamps {
                armed_at: Some(now),
                ..Default::default()
            },
            pending: Some(handle),
            score: None,
        };
        info!(
            "Trial {} armed at {} ms for '{}', cue in {} ms",
            epoch,
            now,
            player.name,
            delay.as_millis()
        );
        Transition::Armed { delay }
    }

    pub fn react_or_miss(&mut self) -> Transition {
        match self.trial.state {
            TrialState::Armed => self.penalize(),
            TrialState::Reacting => self.react(),
            state => {
                debug!("Click ignored in {:?}", state);
                Transition::Ignored
            }
        }
    }

    pub fn acknowledge(&mut self) -> Transition {
        match self.trial.state {
            TrialState::Penalty => {
                self.reset();
                Transition::Reset
            }
            TrialState::Success => {
                let score = self.trial.score.unwrap_or_default();
                self.reset();
                Transition::Summary { score }
            }
            state => {
                debug!("Acknowledge ignored in {:?}", state);
                Transition::Ignored
            }
        }
    }

    /// Delivers cue firings that have come due. Stale ones are dropped.
    pub fn update(&mut self) -> Vec<Transition> {
        let due = self.scheduler.poll_due();
        let mut transitions = Vec::new();
        for ticket in due {
            let t = self.on_cue_fired(ticket);
            if !t.is_ignored() {
                transitions.push(t);
            }
        }
        transitions
    }

    /// A delayed-cue task fired. Only the task of the current armed trial counts.
    pub fn on_cue_fired(&mut self, ticket: CueTicket) -> Transition {
        if !self.trial.accepts(ticket) {
            debug!(
                "Discarding stale cue for trial {} (current {} in {:?})",
                ticket.epoch, self.trial.epoch, self.trial.state
            );
            return Transition::Ignored;
        }
        let now = self.clock.now();
        self.trial.pending = None;
        self.trial.timestamps.cue_at = Some(now);
        self.trial.state = TrialState::Reacting;
        info!("Cue shown for trial {} at {} ms", self.trial.epoch, now);
        Transition::CueShown { cue_at: now }
    }

    fn penalize(&mut self) -> Transition {
        self.cancel_pending();
        self.trial.timestamps.reacted_at = Some(self.clock.now());
        self.trial.state = TrialState::Penalty;
        self.completed += 1;
        info!("Trial {} penalized: clicked before the cue", self.trial.epoch);
        Transition::Penalized
    }

    fn react(&mut self) -> Transition {
        let Some(cue_at) = self.trial.timestamps.cue_at else {
            debug!("Reacting without a cue timestamp; ignoring click");
            return Transition::Ignored;
        };
        self.cancel_pending();
        let now = self.clock.now();
        let score = compute_score(cue_at, now);

        self.trial.timestamps.reacted_at = Some(now);
        self.trial.score = Some(score);
        self.trial.state = TrialState::Success;
        self.completed += 1;
        info!("Trial {} scored {} ms", self.trial.epoch, score);

        if let Some(player) = &self.trial.player {
            self.sink.submit(NewScore::for_player(score, player));
        }
        Transition::Scored { score }
    }

    fn reset(&mut self) {
        self.cancel_pending();
        self.trial = Trial {
            epoch: self.trial.epoch,
            ..Default::default()
        };
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.trial.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    pub fn state(&self) -> TrialState {
        self.trial.state
    }

    /// Defined only in `Success`.
    pub fn score(&self) -> Option<Millis> {
        match self.trial.state {
            TrialState::Success => self.trial.score,
            _ => None,
        }
    }

    pub fn cue_visible(&self) -> bool {
        self.trial.state == TrialState::Reacting
    }

    pub fn pending_cues(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn current_trial(&self) -> &Trial {
        &self.trial
    }
}
