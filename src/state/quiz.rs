use super::AppState;
use crate::error::{QuizError, QuizResult};
use crate::run::build_run;
use crate::session::{Grant, Phase, QuestionView, Session, SessionEvent};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Play screen state pushed to the client after every transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaySnapshot {
    /// None once the run is over
    pub question: Option<QuestionView>,
    pub lifelines: LifelineAvailability,
    pub phase: Phase,
    pub score: u32,
    pub is_over: bool,
}

impl AppState {
    /// Build a run for the player's theme and start a session over it
    pub async fn start_run(&self, player_id: &PlayerId, mode: GameMode) -> QuizResult<SessionEvent> {
        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.ensure_in_lobby("start a run")?;

        let spec = mode.run_spec(ctx.theme.clone());
        let run = build_run(&self.bank, &spec, &mut rand::rng());
        let total = run.len();

        let session = Session::start(run, ctx.perks, ctx.voucher_code.clone(), self.timing());
        let event = match session.phase() {
            Phase::GameOver { final_score } => SessionEvent::GameOver { final_score },
            _ => SessionEvent::QuestionStarted { index: 0 },
        };
        ctx.session = Some(session);

        tracing::info!(
            "Player {} started a {:?} run of {} question(s) (theme={:?}, perks={:?})",
            player_id,
            mode,
            total,
            ctx.theme,
            ctx.perks
        );
        Ok(event)
    }

    pub async fn submit_answer(
        &self,
        player_id: &PlayerId,
        selected: Option<&str>,
    ) -> QuizResult<SessionEvent> {
        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.session_mut()?.submit_answer(selected)
    }

    pub async fn next_question(&self, player_id: &PlayerId) -> QuizResult<SessionEvent> {
        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.session_mut()?.advance()
    }

    /// Use a lifeline, spending the attached voucher when nothing else grants it.
    ///
    /// The player map is not locked while the voucher file is touched.
    pub async fn use_lifeline(
        &self,
        player_id: &PlayerId,
        lifeline: Lifeline,
    ) -> QuizResult<SessionEvent> {
        let code = {
            let mut players = self.players.write().await;
            let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
            let session = ctx.session_mut()?;
            session.ensure_lifeline_applicable(lifeline)?;

            if let Some(grant) = session.lifeline_grant(lifeline, None) {
                return self.apply_lifeline(player_id, session, lifeline, grant);
            }
            session
                .voucher_code()
                .map(str::to_string)
                .ok_or(QuizError::LifelineUnavailable(lifeline))?
        };

        if !self.vouchers.try_consume(&code, lifeline.into()).await? {
            return Err(QuizError::LifelineUnavailable(lifeline));
        }

        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        let session = ctx.session_mut()?;
        if let Err(err) = session.ensure_lifeline_applicable(lifeline) {
            tracing::warn!(
                "Player {} spent voucher {} but the question moved on",
                player_id,
                code
            );
            return Err(err);
        }
        self.apply_lifeline(player_id, session, lifeline, Grant::Voucher)
    }

    fn apply_lifeline(
        &self,
        player_id: &PlayerId,
        session: &mut Session,
        lifeline: Lifeline,
        grant: Grant,
    ) -> QuizResult<SessionEvent> {
        tracing::info!("Player {} used {} ({:?})", player_id, lifeline, grant);
        match lifeline {
            Lifeline::Fifty => session.use_fifty(grant),
            Lifeline::Call => session.use_call(grant, &self.templates),
        }
    }

    /// Advance the player's countdown. `Ok(None)` when there is nothing to report.
    pub async fn tick(&self, player_id: &PlayerId, now: Instant) -> QuizResult<Option<SessionEvent>> {
        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        Ok(ctx.session.as_mut().and_then(|session| session.tick(now)))
    }

    /// Current play screen, or None between runs
    pub async fn snapshot(&self, player_id: &PlayerId) -> QuizResult<Option<PlaySnapshot>> {
        let (session, voucher_code) = {
            let players = self.players.read().await;
            let ctx = players.get(player_id).ok_or(QuizError::PlayerNotFound)?;
            match &ctx.session {
                Some(session) => (
                    session.clone(),
                    session.voucher_code().map(str::to_string),
                ),
                None => return Ok(None),
            }
        };

        let voucher = match voucher_code {
            Some(code) => self.vouchers.lookup(&code).await?,
            None => None,
        };

        Ok(Some(PlaySnapshot {
            question: session.view(),
            lifelines: session.lifeline_availability(voucher.as_ref()),
            phase: session.phase(),
            score: session.score(),
            is_over: session.is_over(),
        }))
    }

    /// Leave the finished run and go back to mode selection.
    ///
    /// A finished run of a registered player without an attached voucher is
    /// recorded on the leaderboard. Perks and the voucher code are cleared.
    /// Returns whether a new best score was written.
    pub async fn play_again(&self, player_id: &PlayerId) -> QuizResult<bool> {
        let entry = {
            let players = self.players.read().await;
            let ctx = players.get(player_id).ok_or(QuizError::PlayerNotFound)?;
            match (&ctx.session, &ctx.theme) {
                (Some(session), _) if !session.is_over() => {
                    tracing::info!("Player {} abandoned a run, nothing recorded", player_id);
                    None
                }
                (Some(session), Some(theme))
                    if !ctx.is_anonymous()
                        && ctx.voucher_code.is_none()
                        && session.voucher_code().is_none() =>
                {
                    Some((theme.clone(), ctx.nickname.clone(), ctx.pin.clone(), session.score()))
                }
                _ => None,
            }
        };

        let recorded = match entry {
            Some((theme, nickname, pin, score)) => {
                self.leaderboard
                    .record_if_higher(&theme, &nickname, &pin, score)
                    .await?
            }
            None => false,
        };

        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.session = None;
        ctx.perks = Perks::default();
        ctx.voucher_code = None;
        Ok(recorded)
    }
}
