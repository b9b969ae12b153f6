use crate::arbiter::{InputEvent, Verdict};
use crate::audio::{AudioPlayer, Playback, PlaybackTicket};
use crate::config::DrillConfig;
use crate::error::DrillError;
use crate::event::{DrillEvent, EndReason};
use crate::generator::DigitGenerator;
use crate::session::{InFlight, Session, Wake};
use pasat_core::{Millis, SessionPhase, TrialId, TrialOutcome, TrialState};
use pasat_timing::Timer;
use rand::Rng;

/// Timer-driven control loop of the drill.
///
/// Polled like a frame loop: `update` fires every wakeup that is due on the
/// timer's clock, `handle_input` feeds the input arbiter and
/// `playback_finished` reports audio completions. Each returns the events
/// it produced. Everything runs on the caller's thread.
pub struct TrialScheduler<T, R, A>
where
    T: Timer,
    R: Rng,
    A: AudioPlayer,
{
    pub config: DrillConfig,
    pub timer: T,
    pub rng: R,
    pub audio: A,
    generator: DigitGenerator,
    phase: SessionPhase,
    session: Option<Session>,
    sessions_started: u64,
}

impl<T, R, A> TrialScheduler<T, R, A>
where
    T: Timer,
    R: Rng,
    A: AudioPlayer,
{
    pub fn new(config: DrillConfig, timer: T, rng: R, audio: A) -> Result<Self, DrillError> {
        config.validate()?;
        Ok(Self {
            config,
            timer,
            rng,
            audio,
            generator: DigitGenerator::default(),
            phase: SessionPhase::Idle,
            session: None,
            sessions_started: 0,
        })
    }

    pub fn with_generator(mut self, generator: DigitGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Earliest pending wakeup, for drivers that sleep between polls
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.session.as_mut().and_then(Session::next_deadline)
    }

    pub fn start(&mut self) -> Result<Vec<DrillEvent>, DrillError> {
        if self.phase.is_active() {
            return Err(DrillError::AlreadyActive);
        }
        self.config.validate()?;
        self.audio.stop_all();
        self.sessions_started += 1;
        let now = self.timer.now();
        let session = Session::new(self.sessions_started, &self.config, now);
        let isi = session.staircase().current_isi();
        tracing::info!(
            session = session.id(),
            nback = self.config.nback_distance,
            isi,
            manual = self.config.manual_mode,
            "session started"
        );
        let started = DrillEvent::SessionStarted {
            session: session.id(),
            isi,
        };
        self.session = Some(session);
        self.phase = SessionPhase::Active;
        Ok(vec![started])
    }

    pub fn stop(&mut self) -> Result<Vec<DrillEvent>, DrillError> {
        if !self.phase.is_active() {
            return Err(DrillError::NotActive);
        }
        let mut events = Vec::new();
        self.end(EndReason::Stopped, &mut events);
        Ok(events)
    }

    pub fn update(&mut self) -> Vec<DrillEvent> {
        let now = self.timer.now();
        let mut events = Vec::new();
        loop {
            let Some(session) = self.session.as_mut() else {
                break;
            };
            let Some((at, wake)) = session.timers.pop_due(now) else {
                break;
            };
            if wake.session() != session.id() {
                continue;
            }
            match wake {
                Wake::Present { .. } => self.present(now, &mut events),
                Wake::PlaybackSettled { trial_id, .. } => {
                    session.settle_playback(trial_id, now, &mut events)
                }
                Wake::Deadline { trial_id, .. } => self.deadline(trial_id, now, &mut events),
                Wake::CountdownTick { .. } => {
                    let elapsed = session.tick(at);
                    events.push(DrillEvent::CountdownTick {
                        remaining_seconds: session.remaining_seconds(),
                    });
                    if elapsed {
                        self.end(EndReason::Elapsed, &mut events);
                    }
                }
            }
        }
        events
    }

    pub fn handle_input(&mut self, input: InputEvent) -> Vec<DrillEvent> {
        let now = self.timer.now();
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut().filter(|_| self.phase.allows_input()) else {
            events.push(DrillEvent::InputVerdict(Verdict::Ignore));
            return events;
        };

        let awaiting = session.arbiter.awaiting();
        let verdict = session.arbiter.offer(input, now, &session.latch);
        tracing::debug!(?verdict, ?awaiting, "input classified");
        events.push(DrillEvent::InputVerdict(verdict.clone()));

        if let (Verdict::Commit(_), Some(trial_id)) = (verdict, awaiting) {
            if let Some(outcome) = session.claim_and_score(trial_id, now, &mut events) {
                self.after_resolution(outcome, now, &mut events);
            }
        }
        events
    }

    /// Completion signal for a playback started with `ticket`
    pub fn playback_finished(&mut self, ticket: PlaybackTicket) -> Vec<DrillEvent> {
        let now = self.timer.now();
        let mut events = Vec::new();
        match self.session.as_mut() {
            Some(session) if session.id() == ticket.session => {
                session.settle_playback(ticket.trial_id, now, &mut events)
            }
            _ => tracing::debug!(?ticket, "stale playback completion ignored"),
        }
        events
    }

    fn present(&mut self, now: Millis, events: &mut Vec<DrillEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.take_presentation();
        if session.in_flight().is_some_and(|f| f.state == TrialState::Presenting) {
            tracing::warn!("presentation requested while another is playing");
            return;
        }

        // the previous trial resolves before the next digit is drawn
        if let Some(stale) = session.unresolved_in_flight() {
            tracing::warn!(trial_id = stale, "trial superseded before resolution");
            if let Some(outcome) = session.settle_missed(stale, now, events) {
                self.after_outcome(outcome);
            }
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let digit = self.generator.next(&mut self.rng, session.ledger.history());
        let isi = session.staircase.current_isi();
        let trial = session.ledger.record_presentation(digit, now, isi);
        let trial_id = trial.trial_id;
        let scoreable = trial.is_scoreable();

        session.latch.arm(trial_id);
        session.arbiter.on_presentation(now);
        events.push(DrillEvent::Presented {
            trial_id,
            digit,
            scoreable,
        });

        let ticket = PlaybackTicket {
            session: session.id(),
            trial_id,
        };
        let settle_at = match self.audio.play(digit, ticket) {
            Ok(Playback::Finished) => now,
            Ok(Playback::Pending) => now + self.config.playback_timeout_ms(),
            Err(err) => {
                tracing::warn!(%err, trial_id, "playback failed, continuing without audio");
                now + self.config.playback_retry_delay_ms
            }
        };
        let settle_timer = session.timers.schedule(
            settle_at,
            Wake::PlaybackSettled {
                session: session.id(),
                trial_id,
            },
        );
        session.in_flight = Some(InFlight {
            trial_id,
            scoreable,
            state: TrialState::Presenting,
            settle_timer: Some(settle_timer),
        });
    }

    fn deadline(&mut self, trial_id: TrialId, now: Millis, events: &mut Vec<DrillEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let resolved = session
            .ledger
            .get(trial_id)
            .is_none_or(|t| t.is_resolved());
        if resolved {
            return;
        }

        let outcome = if session.is_superseded(trial_id) {
            // too late to trust whatever input is pending
            session.settle_missed(trial_id, now, events)
        } else {
            session.claim_and_score(trial_id, now, events)
        };
        if let Some(outcome) = outcome {
            self.after_resolution(outcome, now, events);
        }
    }

    fn after_outcome(&mut self, outcome: TrialOutcome) {
        if self.config.error_beep && !outcome.is_correct() {
            self.audio.error_beep();
        }
    }

    /// Schedules the next presentation at the post-resolution ISI, or ends
    /// the session when its time is up.
    fn after_resolution(&mut self, outcome: TrialOutcome, now: Millis, events: &mut Vec<DrillEvent>) {
        self.after_outcome(outcome);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.countdown_elapsed() {
            self.end(EndReason::Elapsed, events);
            return;
        }
        let isi = session.staircase.current_isi();
        session.schedule_presentation(now + isi);
    }

    fn end(&mut self, reason: EndReason, events: &mut Vec<DrillEvent>) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.timers.cancel_all();
        self.audio.stop_all();
        self.phase = SessionPhase::Ended;

        let report = session.into_report(reason, &self.config);
        tracing::info!(
            ?reason,
            attempts = report.total_attempts,
            correct = report.total_correct,
            lowest_isi = report.lowest_isi_ms,
            "session ended"
        );
        events.push(DrillEvent::SessionEnded(Box::new(report)));
    }
}
