//! Per-turn-pair scoring and round resolution.

use crate::core::{MatchState, Side};
use crate::events::{Notification, Outbox, RoundWon};
use crate::rules::declare_winner;

/// Award control points for the turn pair that just finished.
///
/// Returns the round winner, if the pass ended a round.
pub fn score_turn_pair(state: &mut MatchState, out: &mut Outbox) -> Option<Side> {
    let rules = state.config.rules.control.clone();
    let control = state.control.as_mut()?;

    for token in state.tokens.values() {
        let points = control.points_at(token.tile, &rules);
        control.progress[token.owner] += points;
        control.tally[token.owner] += points;
    }

    let p1 = control.progress[Side::Player1];
    let p2 = control.progress[Side::Player2];
    let winner = match (p1 >= rules.round_target, p2 >= rules.round_target) {
        (false, false) => return None,
        (true, false) => Side::Player1,
        (false, true) => Side::Player2,
        // both crossed in the same pass: higher progress, ties to player 2
        (true, true) if p1 > p2 => Side::Player1,
        (true, true) => Side::Player2,
    };

    control.scores[winner] += 1;
    control.round += 1;
    control.progress = Default::default();
    control.mirror(&state.board);

    let scores = control.scores.clone();
    let round = control.round;
    tracing::info!(room = %state.room, %winner, round, "control round won");
    out.broadcast(Notification::RoundWon(RoundWon { winner, scores: scores.clone(), round }));

    if scores[winner] >= rules.rounds_to_win {
        declare_winner(state, winner, out);
    }
    Some(winner)
}
