use crate::voice::TerminalVoice;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Print, Stylize},
    terminal,
};
use pasat_core::{InputMode, TrialOutcome};
use pasat_experiment::{
    DrillConfig, DrillEvent, InputEvent, SessionReport, TrialScheduler, Verdict,
};
use pasat_timing::{HighPrecisionTimer, Timer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt::Display;
use std::fs;
use std::io::{Stdout, Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

/// Longest the loop blocks on the keyboard before re-checking the clock
const IDLE_POLL: Duration = Duration::from_millis(50);
/// Waits shorter than this are slept precisely instead of polled
const SPIN_THRESHOLD: Duration = Duration::from_millis(2);

pub struct App {
    drill: TrialScheduler<HighPrecisionTimer, StdRng, TerminalVoice>,
    out: Stdout,
    buffer: String,
    results: PathBuf,
    should_exit: bool,
}

impl App {
    pub fn new(config: DrillConfig, results: PathBuf) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let drill = TrialScheduler::new(config, HighPrecisionTimer::new(), rng, TerminalVoice::new())
            .context("failed to set up the drill")?;

        Ok(Self {
            drill,
            out: stdout(),
            buffer: String::new(),
            results,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        terminal::enable_raw_mode().context("failed to enter raw mode")?;
        let result = self.event_loop();
        let restored = terminal::disable_raw_mode().context("failed to leave raw mode");
        result.and(restored)
    }

    fn event_loop(&mut self) -> Result<()> {
        let config = &self.drill.config;
        let intro = format!(
            "=== PACED SERIAL ADDITION ===\r\nAdd each digit to the one heard {} back. \
             Interval {} ms, {} min, {} input.\r\n",
            config.nback_distance,
            config.starting_isi(),
            config.session_duration_seconds / 60,
            match config.input_mode {
                InputMode::Keystroke => "type the sum",
                InputMode::Selection => "type the sum and press Enter for",
            },
        );
        self.line(intro)?;
        self.line("Press SPACE to start or ESC to exit.")?;
        self.out.flush()?;

        if !self.wait_for_start()? {
            return Ok(());
        }
        let events = self.drill.start()?;
        self.show(events)?;

        loop {
            let events = self.drill.update();
            self.show(events)?;
            if self.should_exit || self.drill.phase().is_finished() {
                break;
            }
            if let Some(Event::Key(key)) = self.wait()? {
                self.on_key(key)?;
            }
        }
        Ok(())
    }

    fn wait_for_start(&mut self) -> Result<bool> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char(' ') => return Ok(true),
                    KeyCode::Esc => return Ok(false),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(false);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Blocks until a key arrives or the next wakeup is due
    fn wait(&mut self) -> Result<Option<Event>> {
        let now = self.drill.timer.now();
        let remaining = self
            .drill
            .next_deadline()
            .map_or(IDLE_POLL, |at| Duration::from_millis(at.saturating_sub(now)))
            .min(IDLE_POLL);

        if remaining < SPIN_THRESHOLD {
            self.drill.timer.sleep(remaining);
            return Ok(None);
        }
        if event::poll(remaining)? {
            return Ok(Some(event::read()?));
        }
        Ok(None)
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            return self.stop();
        }

        let mode = self.drill.config.input_mode;
        let input = match (mode, key.code) {
            (_, KeyCode::Char(c)) if c.is_ascii_digit() => {
                self.buffer.push(c);
                (mode == InputMode::Keystroke).then(|| InputEvent::Buffer(self.buffer.clone()))
            }
            (_, KeyCode::Backspace) => {
                self.buffer.pop();
                (mode == InputMode::Keystroke).then(|| InputEvent::Buffer(self.buffer.clone()))
            }
            (InputMode::Selection, KeyCode::Enter) => {
                let selected = self.buffer.parse().ok();
                self.buffer.clear();
                selected.map(InputEvent::Select)
            }
            _ => None,
        };
        self.echo()?;

        if let Some(input) = input {
            let events = self.drill.handle_input(input);
            self.show(events)?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.drill.phase().is_active() {
            let events = self.drill.stop()?;
            self.show(events)?;
        }
        self.should_exit = true;
        Ok(())
    }

    fn show(&mut self, events: Vec<DrillEvent>) -> Result<()> {
        for event in events {
            match event {
                DrillEvent::SessionStarted { session, isi } => {
                    tracing::info!(session, isi, "drill running");
                }
                DrillEvent::Presented { .. } => self.buffer.clear(),
                DrillEvent::WindowOpened { .. } => self.echo()?,
                DrillEvent::InputVerdict(Verdict::Rejected) => {
                    self.buffer.clear();
                    self.echo()?;
                }
                DrillEvent::InputVerdict(Verdict::Flagged(value)) => {
                    self.line(format!("  {value}?"))?;
                }
                DrillEvent::InputVerdict(_) => {}
                DrillEvent::TrialResolved(resolution) => {
                    let mark = match resolution.outcome {
                        TrialOutcome::Correct => "correct".green(),
                        TrialOutcome::Incorrect => "wrong".red(),
                        TrialOutcome::Missed => "missed".yellow(),
                        TrialOutcome::Unresolved => "-".stylize(),
                    };
                    self.line(format!("\r  {mark}"))?;
                }
                DrillEvent::IsiChanged { to, .. } => {
                    self.line(format!("  interval now {to} ms").dim())?;
                }
                DrillEvent::CountdownTick { remaining_seconds } => {
                    if remaining_seconds > 0 && remaining_seconds % 60 == 0 {
                        self.line(format!("  {} min left", remaining_seconds / 60).dim())?;
                    }
                }
                DrillEvent::SessionEnded(report) => {
                    self.summarize(&report)?;
                    self.save(&report)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn echo(&mut self) -> Result<()> {
        queue!(
            self.out,
            Print("\r"),
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(format!("  > {}", self.buffer))
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn summarize(&mut self, report: &SessionReport) -> Result<()> {
        self.line("")?;
        self.line(format!("Session ended ({:?})", report.reason).bold())?;
        self.line(format!(
            "  correct {} / {} ({}%)",
            report.total_correct, report.total_attempts, report.accuracy_percent
        ))?;
        self.line(format!("  fastest interval {} ms", report.lowest_isi_ms))?;
        self.line(format!(
            "  average response {} ms, longest correct run {}",
            report.average_response_time_ms, report.longest_correct_run
        ))?;
        Ok(())
    }

    fn save(&mut self, report: &SessionReport) -> Result<()> {
        let json = report.to_json_pretty().context("failed to encode results")?;
        fs::write(&self.results, json)
            .with_context(|| format!("failed to write results to {}", self.results.display()))?;
        tracing::info!(path = %self.results.display(), "results saved");
        self.line(format!("  results saved to {}", self.results.display()))
    }

    fn line(&mut self, text: impl Display) -> Result<()> {
        queue!(self.out, Print(text), Print("\r\n"))?;
        Ok(())
    }
}
