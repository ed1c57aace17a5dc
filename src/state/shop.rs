use super::AppState;
use crate::error::{QuizError, QuizResult};
use crate::types::*;

impl AppState {
    /// Redeem a shop code for the next run.
    ///
    /// Perk codes are consumed immediately and switch the perk on. Lifeline codes
    /// are attached to the player and consumed when the lifeline is used. Either
    /// way the run no longer counts for the leaderboard. The player map is not
    /// locked while the voucher file is read and written.
    pub async fn redeem(&self, player_id: &PlayerId, code: &str) -> QuizResult<Redemption> {
        {
            let players = self.players.read().await;
            let ctx = players.get(player_id).ok_or(QuizError::PlayerNotFound)?;
            ctx.ensure_in_lobby("redeem a code")?;
        }

        let redemption = self.vouchers.redeem(code).await?;
        let code = code.trim().to_uppercase();

        let mut players = self.players.write().await;
        let ctx = players.get_mut(player_id).ok_or(QuizError::PlayerNotFound)?;
        ctx.ensure_in_lobby("redeem a code")?;
        match redemption {
            Redemption::Perk(perk) => {
                ctx.perks.grant(perk);
                // Keep an attached lifeline code; a perk code is already spent.
                if ctx.voucher_code.is_none() {
                    ctx.voucher_code = Some(code);
                }
            }
            Redemption::Lifeline(_) => ctx.voucher_code = Some(code),
        }

        tracing::info!("Player {} redeemed {}", player_id, redemption);
        Ok(redemption)
    }
}
