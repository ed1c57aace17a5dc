use super::{AppState, PlayerContext};
use crate::error::{QuizError, QuizResult};
use crate::store::KEY_SEPARATOR;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// What the lobby screens show for a player between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbyView {
    pub player_id: PlayerId,
    pub theme: Option<ThemeName>,
    /// None when playing anonymously
    pub nickname: Option<String>,
    pub perks: Perks,
    pub voucher_code: Option<VoucherCode>,
}

impl From<&PlayerContext> for LobbyView {
    fn from(ctx: &PlayerContext) -> Self {
        Self {
            player_id: ctx.id.clone(),
            theme: ctx.theme.clone(),
            nickname: (!ctx.is_anonymous()).then(|| ctx.nickname.clone()),
            perks: ctx.perks,
            voucher_code: ctx.voucher_code.clone(),
        }
    }
}

impl AppState {
    /// Create a fresh player context
    pub async fn create_player(&self) -> PlayerId {
        let id = ulid::Ulid::new().to_string();
        self.players
            .write()
            .await
            .insert(id.clone(), PlayerContext::new(id.clone()));
        tracing::debug!("Player {} connected", id);
        id
    }

    /// Drop a player context. An unfinished run is abandoned without being recorded.
    pub async fn remove_player(&self, player_id: &PlayerId) {
        if let Some(ctx) = self.players.write().await.remove(player_id) {
            if ctx.session.is_some() {
                tracing::info!("Player {} left mid-run, nothing recorded", player_id);
            }
        }
    }

    pub async fn lobby(&self, player_id: &PlayerId) -> QuizResult<LobbyView> {
        let players = self.players.read().await;
        let ctx = players.get(player_id).ok_or(QuizError::PlayerNotFound)?;
        Ok(LobbyView::from(ctx))
    }

    /// Pick the theme for upcoming runs
    pub async fn select_theme(&self, player_id: &PlayerId, theme: &str) -> QuizResult<LobbyView> {
        if !self.bank.has_theme(theme) {
            return Err(QuizError::UnknownTheme(theme.to_string()));
        }

        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.ensure_in_lobby("change theme")?;
        ctx.theme = Some(theme.to_string());
        Ok(LobbyView::from(&*ctx))
    }

    /// Register a nickname and PIN for the leaderboard. Both are required and
    /// neither may contain the leaderboard key separator.
    pub async fn register(
        &self,
        player_id: &PlayerId,
        nickname: &str,
        pin: &str,
    ) -> QuizResult<LobbyView> {
        let nickname = nickname.trim();
        let pin = pin.trim();
        if nickname.is_empty() || pin.is_empty() {
            return Err(QuizError::MissingCredentials);
        }
        if nickname.contains(KEY_SEPARATOR) || pin.contains(KEY_SEPARATOR) {
            return Err(QuizError::InvalidCredentials);
        }

        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.ensure_in_lobby("register")?;
        ctx.nickname = nickname.to_string();
        ctx.pin = pin.to_string();
        tracing::info!("Player {} registered as {}", player_id, nickname);
        Ok(LobbyView::from(&*ctx))
    }

    /// Play without a leaderboard identity
    pub async fn skip_registration(&self, player_id: &PlayerId) -> QuizResult<LobbyView> {
        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.ensure_in_lobby("skip registration")?;
        ctx.nickname.clear();
        ctx.pin.clear();
        Ok(LobbyView::from(&*ctx))
    }
}
