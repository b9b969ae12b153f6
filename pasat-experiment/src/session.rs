use crate::arbiter::InputArbiter;
use crate::config::{COUNTDOWN_TICK_MS, DrillConfig};
use crate::event::{
    DrillEvent, EndReason, SessionReport, TrialResolution, accuracy_percent,
    average_response_time, longest_correct_run,
};
use crate::latch::ResolutionLatch;
use crate::ledger::TrialLedger;
use crate::scoring::score;
use crate::staircase::Staircase;
use pasat_core::{Candidate, Millis, Trial, TrialId, TrialOutcome, TrialState};
use pasat_timing::{TimerId, TimerQueue};

/// Scheduled wakeups. Each carries the session it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    Present { session: u64 },
    PlaybackSettled { session: u64, trial_id: TrialId },
    Deadline { session: u64, trial_id: TrialId },
    CountdownTick { session: u64 },
}

impl Wake {
    pub(crate) fn session(&self) -> u64 {
        match *self {
            Wake::Present { session }
            | Wake::PlaybackSettled { session, .. }
            | Wake::Deadline { session, .. }
            | Wake::CountdownTick { session } => session,
        }
    }
}

/// The trial currently presenting or awaiting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub trial_id: TrialId,
    pub scoreable: bool,
    pub state: TrialState,
    pub(crate) settle_timer: Option<TimerId>,
}

/// State of one running session.
///
/// Created on start and dropped on end, which takes every pending timer
/// with it.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: u64,
    pub(crate) ledger: TrialLedger,
    pub(crate) staircase: Staircase,
    pub(crate) arbiter: InputArbiter,
    pub(crate) latch: ResolutionLatch,
    pub(crate) timers: TimerQueue<Wake>,
    pub(crate) in_flight: Option<InFlight>,
    presentation_pending: bool,
    remaining_seconds: u64,
    total_attempts: u32,
    total_correct: u32,
    started_at: Millis,
}

impl Session {
    pub(crate) fn new(id: u64, config: &DrillConfig, now: Millis) -> Self {
        let staircase = if config.manual_mode {
            Staircase::manual(config.initial_isi_ms)
        } else {
            Staircase::adaptive(config.starting_isi(), config.min_isi_ms, config.max_isi_ms)
        };
        let mut session = Self {
            id,
            ledger: TrialLedger::new(config.nback_distance),
            staircase,
            arbiter: InputArbiter::new(config.input_mode, config.debounce_ms),
            latch: ResolutionLatch::default(),
            timers: TimerQueue::new(),
            in_flight: None,
            presentation_pending: false,
            remaining_seconds: config.session_duration_seconds,
            total_attempts: 0,
            total_correct: 0,
            started_at: now,
        };
        session
            .timers
            .schedule(now + COUNTDOWN_TICK_MS, Wake::CountdownTick { session: id });
        session.schedule_presentation(now + config.lead_in_ms);
        session
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn trials(&self) -> &[Trial] {
        self.ledger.trials()
    }

    pub fn staircase(&self) -> &Staircase {
        &self.staircase
    }

    pub fn arbiter(&self) -> &InputArbiter {
        &self.arbiter
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn totals(&self) -> (u32, u32) {
        (self.total_attempts, self.total_correct)
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    pub(crate) fn next_deadline(&mut self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Queues the next presentation unless one is already queued
    pub(crate) fn schedule_presentation(&mut self, at: Millis) {
        if self.presentation_pending {
            return;
        }
        self.presentation_pending = true;
        self.timers.schedule(at, Wake::Present { session: self.id });
    }

    pub(crate) fn take_presentation(&mut self) {
        self.presentation_pending = false;
    }

    /// Returns true when the countdown has run out
    pub(crate) fn tick(&mut self, at: Millis) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return true;
        }
        self.timers.schedule(
            at + COUNTDOWN_TICK_MS,
            Wake::CountdownTick { session: self.id },
        );
        false
    }

    pub(crate) fn countdown_elapsed(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Scoreable trial still in flight without an outcome
    pub(crate) fn unresolved_in_flight(&self) -> Option<TrialId> {
        let flight = self.in_flight?;
        let trial = self.ledger.get(flight.trial_id)?;
        (flight.scoreable && !trial.is_resolved()).then_some(flight.trial_id)
    }

    pub(crate) fn is_superseded(&self, trial_id: TrialId) -> bool {
        self.ledger.latest().map(|t| t.trial_id) != Some(trial_id)
    }

    /// Playback of `trial_id` is over: open its answer window, or for an
    /// unscoreable trial go straight to the next presentation.
    pub(crate) fn settle_playback(
        &mut self,
        trial_id: TrialId,
        now: Millis,
        events: &mut Vec<DrillEvent>,
    ) {
        let Some(flight) = self.in_flight.as_mut() else {
            return;
        };
        if flight.trial_id != trial_id || flight.state != TrialState::Presenting {
            return;
        }
        if let Some(timer) = flight.settle_timer.take() {
            self.timers.cancel(timer);
        }

        let isi = self.staircase.current_isi();
        let expected = self.ledger.get(trial_id).and_then(|t| t.expected_answer);
        match expected {
            Some(expected) => {
                let deadline = now + isi;
                flight.state = TrialState::WindowOpen { deadline };
                self.arbiter.open_window(trial_id, expected);
                self.timers.schedule(
                    deadline,
                    Wake::Deadline {
                        session: self.id,
                        trial_id,
                    },
                );
                tracing::debug!(trial_id, deadline, "answer window open");
                events.push(DrillEvent::WindowOpened { trial_id, deadline });
            }
            None => {
                self.in_flight = None;
                self.schedule_presentation(now + isi);
            }
        }
    }

    /// Claims the latch for `trial_id`, reads the arbiter's candidate once
    /// and scores it. Returns `None` when another trigger got there first.
    pub(crate) fn claim_and_score(
        &mut self,
        trial_id: TrialId,
        now: Millis,
        events: &mut Vec<DrillEvent>,
    ) -> Option<TrialOutcome> {
        if let Err(lost) = self.latch.try_claim(trial_id) {
            tracing::debug!(%lost, "resolution trigger lost the race");
            return None;
        }
        let candidate = self.arbiter.close_window();
        let outcome = match self.ledger.get(trial_id) {
            Some(trial) => score(trial, candidate.as_ref()),
            None => TrialOutcome::Missed,
        };
        let user_answer = candidate.as_ref().and_then(Candidate::value);
        self.record_outcome(trial_id, user_answer, outcome, now, events)
    }

    /// Marks a trial missed without reading any input
    pub(crate) fn settle_missed(
        &mut self,
        trial_id: TrialId,
        now: Millis,
        events: &mut Vec<DrillEvent>,
    ) -> Option<TrialOutcome> {
        if self.latch.armed_for() == Some(trial_id) && self.latch.try_claim(trial_id).is_err() {
            return None;
        }
        if self.arbiter.awaiting() == Some(trial_id) {
            self.arbiter.close_window();
        }
        self.record_outcome(trial_id, None, TrialOutcome::Missed, now, events)
    }

    fn record_outcome(
        &mut self,
        trial_id: TrialId,
        user_answer: Option<u32>,
        outcome: TrialOutcome,
        now: Millis,
        events: &mut Vec<DrillEvent>,
    ) -> Option<TrialOutcome> {
        if let Some(flight) = self.in_flight.as_mut().filter(|f| f.trial_id == trial_id) {
            flight.state = TrialState::Resolved;
        }
        let trial = match self.ledger.resolve(trial_id, user_answer, outcome, now) {
            Ok(trial) => trial,
            Err(err) => {
                tracing::warn!(%err, "trial not resolved");
                return None;
            }
        };
        let resolution = TrialResolution {
            trial_id,
            outcome,
            user_answer,
            response_time_ms: trial.response_time_ms,
            isi: trial.isi_at_presentation,
        };

        self.total_attempts += 1;
        if outcome.is_correct() {
            self.total_correct += 1;
        }
        let before = self.staircase.current_isi();
        let after = self.staircase.on_resolved(outcome);

        tracing::debug!(trial_id, ?outcome, ?user_answer, "trial resolved");
        events.push(DrillEvent::TrialResolved(resolution));
        if before != after {
            tracing::info!(from = before, to = after, "ISI adjusted");
            events.push(DrillEvent::IsiChanged {
                from: before,
                to: after,
            });
        }
        Some(outcome)
    }

    pub(crate) fn into_report(self, reason: EndReason, config: &DrillConfig) -> SessionReport {
        let lowest_isi_ms = self.staircase.lowest_isi_reached();
        let manual_mode = self.staircase.is_manual();
        let trials = self.ledger.into_trials();
        SessionReport {
            reason,
            nback_distance: config.nback_distance,
            manual_mode,
            session_duration_seconds: config.session_duration_seconds,
            total_attempts: self.total_attempts,
            total_correct: self.total_correct,
            accuracy_percent: accuracy_percent(self.total_correct, self.total_attempts),
            lowest_isi_ms,
            average_response_time_ms: average_response_time(&trials),
            longest_correct_run: longest_correct_run(&trials),
            trials,
        }
    }
}
