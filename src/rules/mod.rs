//! Match rules: the turn gate and every request handler.
//!
//! Handlers take a draft `MatchState`, the acting side and an [`Outbox`].
//! They either succeed, leaving their mutations and notifications in the
//! draft and outbox, or return an [`ActionError`] and the engine throws
//! both away.
//!
//! - `movement`: move validation and budget
//! - `abilities`: primary and special use
//! - `cards`: resource cards
//! - `turn`: handoff between sides and automatic turn end
//! - `seating`: participants, seats and the lock
//! - `engine`: [`Match`], which ties the above to drafts, seats and replay

pub mod abilities;
pub mod cards;
pub mod engine;
pub mod movement;
pub mod seating;
pub mod turn;

pub use abilities::{use_ability, Aim};
pub use cards::{play_card, reveal_card, CardArgs};
pub use engine::Match;
pub use movement::{apply_move, move_budget, validate_move};
pub use seating::{Participant, Seating};
pub use turn::{end_turn, maybe_end_turn, turn_usage};

use crate::core::{MatchState, Side};
use crate::error::{ActionError, ActionResult};
use crate::events::{GameOver, Notification, Outbox};

/// End the match in `winner`'s favour. Later calls are no-ops.
pub fn declare_winner(state: &mut MatchState, winner: Side, out: &mut Outbox) {
    if state.winner.is_some() {
        return;
    }
    state.winner = Some(winner);
    tracing::info!(room = %state.room, %winner, "game over");
    out.broadcast(Notification::GameOver(GameOver { winner }));
}

/// Pay the cost-table price of `key` from `side`'s pool.
pub(crate) fn charge(state: &mut MatchState, side: Side, key: &str) -> ActionResult<()> {
    let cost = state.config.costs.cost(key);
    state
        .energy
        .pay(side, cost)
        .map_err(|short| ActionError::InsufficientEnergy { card: key.to_string(), have: short.have, required: short.required })
}
