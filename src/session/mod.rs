//! Quiz session state machine
//!
//! One `Session` per active game. Transitions are plain methods applied one at a
//! time by the owner; each returns a `SessionEvent` describing what changed.
//!
//! Phases:
//! - `AwaitingAnswer` → `Answered` via `submit_answer`
//! - `Answered { correct: true }` → `AwaitingAnswer` / `GameOver` via `advance`
//! - `AwaitingAnswer` → `TimedOut` via `timeout` (or a tick that hits zero)
//!
//! `Answered { correct: false }`, `TimedOut` and `GameOver` end active play.

mod lifeline;
mod timer;

pub use lifeline::Grant;
pub use timer::Countdown;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{QuizError, QuizResult};
use crate::types::{Lifeline, Perks, Question, Run, VoucherCode};

/// Streak points needed to win back 50:50
pub const FIFTY_RESTORE_STREAK: u32 = 25;
/// Streak points needed to win back Call-a-Friend
pub const CALL_RESTORE_STREAK: u32 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    AwaitingAnswer { index: usize },
    Answered { index: usize, correct: bool },
    TimedOut { index: usize },
    GameOver { final_score: u32 },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingAnswer { .. } => write!(f, "awaiting an answer"),
            Phase::Answered { .. } => write!(f, "showing the answer"),
            Phase::TimedOut { .. } => write!(f, "timed out"),
            Phase::GameOver { .. } => write!(f, "game over"),
        }
    }
}

/// Countdown settings
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub question_time: Duration,
    pub early_reveal_at: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            question_time: Duration::from_secs(30),
            early_reveal_at: Duration::from_secs(10),
        }
    }
}

/// What a transition did
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    QuestionStarted {
        index: usize,
    },
    AnswerResolved {
        correct: bool,
        points: u32,
        correct_answer: String,
        restored: Vec<Lifeline>,
    },
    FiftyUsed {
        options: Vec<String>,
        streak_broken: bool,
    },
    FriendCalled {
        hint: String,
    },
    Tick {
        seconds_left: u32,
        revealed_answer: Option<String>,
    },
    TimedOut {
        final_score: u32,
    },
    GameOver {
        final_score: u32,
    },
}

/// Snapshot of the current question as presented to the player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionView {
    /// 1-based question number
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub difficulty: String,
    pub options: Vec<String>,
    pub score: u32,
    pub streak_score: u32,
    pub streak_active: bool,
    pub seconds_left: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Session {
    run: Run,
    index: usize,
    score: u32,
    streak_score: u32,
    streak_active: bool,
    fifty_used: bool,
    call_used: bool,
    answered: bool,
    perks: Perks,
    voucher_code: Option<VoucherCode>,
    phase: Phase,
    /// Option order shown for the current question (may be reduced by 50:50)
    presented: Vec<String>,
    timing: Timing,
    countdown: Countdown,
    rng: StdRng,
}

impl Session {
    /// Start a new game over `run`
    pub fn start(run: Run, perks: Perks, voucher_code: Option<VoucherCode>, timing: Timing) -> Self {
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::start_with_rng(run, perks, voucher_code, timing, rng)
    }

    /// Start with an explicit random source (deterministic option order)
    pub fn start_with_rng(
        run: Run,
        perks: Perks,
        voucher_code: Option<VoucherCode>,
        timing: Timing,
        rng: StdRng,
    ) -> Self {
        let now = Instant::now();
        let mut session = Self {
            run,
            index: 0,
            score: 0,
            streak_score: 0,
            streak_active: false,
            fifty_used: false,
            call_used: false,
            answered: false,
            perks,
            voucher_code,
            phase: Phase::GameOver { final_score: 0 },
            presented: Vec::new(),
            timing,
            countdown: Countdown::new(timing.question_time, now),
            rng,
        };

        if !session.run.is_empty() {
            session.begin_question(0, now);
        }
        session
    }

    fn begin_question(&mut self, index: usize, now: Instant) {
        self.index = index;
        self.presented = self.run[index].options.clone();
        self.presented.shuffle(&mut self.rng);
        self.answered = false;
        self.countdown.reset(now);
        self.phase = Phase::AwaitingAnswer { index };
    }

    fn invalid(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            action,
            phase: self.phase.to_string(),
        }
    }

    /// Resolve the player's answer for the current question
    pub fn submit_answer(&mut self, selected: Option<&str>) -> QuizResult<SessionEvent> {
        let Phase::AwaitingAnswer { index } = self.phase else {
            return Err(self.invalid("submit an answer"));
        };
        let selected = selected.ok_or(QuizError::NoSelection)?;

        let question = &self.run[index];
        let correct = question.is_correct(selected);
        let correct_answer = question.answer.clone();
        let points = question.difficulty.points();
        let mut restored = Vec::new();

        if correct {
            self.score += points;
            if self.streak_active {
                self.streak_score += points;
            } else if self.fifty_used && self.call_used {
                self.streak_active = true;
                self.streak_score = 0;
            }

            if self.fifty_used && self.streak_score >= FIFTY_RESTORE_STREAK {
                self.fifty_used = false;
                restored.push(Lifeline::Fifty);
            }
            if self.call_used && self.streak_score >= CALL_RESTORE_STREAK {
                self.call_used = false;
                restored.push(Lifeline::Call);
            }

            if !self.fifty_used && !self.call_used {
                self.streak_active = false;
                self.streak_score = 0;
            }
        } else {
            self.streak_score = 0;
            self.streak_active = false;
        }

        self.answered = true;
        self.phase = Phase::Answered { index, correct };

        Ok(SessionEvent::AnswerResolved {
            correct,
            points: if correct { points } else { 0 },
            correct_answer,
            restored,
        })
    }

    /// Move past a correctly answered question
    pub fn advance(&mut self) -> QuizResult<SessionEvent> {
        let Phase::Answered {
            index,
            correct: true,
        } = self.phase
        else {
            return Err(self.invalid("move to the next question"));
        };

        let next = index + 1;
        if next >= self.run.len() {
            self.index = next;
            self.phase = Phase::GameOver {
                final_score: self.score,
            };
            return Ok(SessionEvent::GameOver {
                final_score: self.score,
            });
        }

        self.begin_question(next, Instant::now());
        Ok(SessionEvent::QuestionStarted { index: next })
    }

    /// Countdown tick. Returns `None` when the timer is paused or disabled.
    pub fn tick(&mut self, now: Instant) -> Option<SessionEvent> {
        if self.perks.disable_timer
            || self.answered
            || !matches!(self.phase, Phase::AwaitingAnswer { .. })
        {
            self.countdown.touch(now);
            return None;
        }

        self.countdown.advance(now);
        if self.countdown.is_expired() {
            return self.timeout();
        }

        let revealed_answer = (self.perks.early_reveal
            && self.countdown.remaining() <= self.timing.early_reveal_at.as_secs_f64())
        .then(|| self.run[self.index].answer.clone());

        Some(SessionEvent::Tick {
            seconds_left: self.countdown.display_seconds(),
            revealed_answer,
        })
    }

    /// Time ran out on the current question. No-op once answered or with the timer disabled.
    pub fn timeout(&mut self) -> Option<SessionEvent> {
        let Phase::AwaitingAnswer { index } = self.phase else {
            return None;
        };
        if self.answered || self.perks.disable_timer {
            return None;
        }

        self.streak_score = 0;
        self.streak_active = false;
        self.phase = Phase::TimedOut { index };
        Some(SessionEvent::TimedOut {
            final_score: self.score,
        })
    }

    /// Snapshot of the current question, if one is being played
    pub fn view(&self) -> Option<QuestionView> {
        let question = self.current_question()?;
        Some(QuestionView {
            number: self.index + 1,
            total: self.run.len(),
            text: question.text.clone(),
            difficulty: question.difficulty.label().to_string(),
            options: self.presented.clone(),
            score: self.score,
            streak_score: self.streak_score,
            streak_active: self.streak_active,
            seconds_left: (!self.perks.disable_timer).then(|| self.countdown.display_seconds()),
        })
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::AwaitingAnswer { index }
            | Phase::Answered { index, .. }
            | Phase::TimedOut { index } => self.run.get(index),
            Phase::GameOver { .. } => None,
        }
    }

    /// True once no further question can be played
    pub fn is_over(&self) -> bool {
        matches!(
            self.phase,
            Phase::Answered { correct: false, .. } | Phase::TimedOut { .. } | Phase::GameOver { .. }
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn run_len(&self) -> usize {
        self.run.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak_score(&self) -> u32 {
        self.streak_score
    }

    pub fn streak_active(&self) -> bool {
        self.streak_active
    }

    pub fn fifty_used(&self) -> bool {
        self.fifty_used
    }

    pub fn call_used(&self) -> bool {
        self.call_used
    }

    pub fn answered(&self) -> bool {
        self.answered
    }

    pub fn perks(&self) -> Perks {
        self.perks
    }

    pub fn voucher_code(&self) -> Option<&str> {
        self.voucher_code.as_deref()
    }

    pub fn presented_options(&self) -> &[String] {
        &self.presented
    }

    pub fn seconds_left(&self) -> u32 {
        self.countdown.display_seconds()
    }
}
