//! Challenges against played cards.
//!
//! ## Sequence
//!
//! 1. Only challengeable card types (configurable) can be challenged.
//! 2. Captured monsters' `on_challenge` steps fire; any of them may deny
//!    the challenge outright.
//! 3. The policy picks a challenger among the opponents holding a
//!    `challenge` card, then decides whether it actually challenges.
//! 4. `protect.challenge` blocks a challenge that was decided on.
//! 5. The challenger discards its challenge card and both sides roll in
//!    `Maximize` mode, challenger first. A strictly higher challenger
//!    total cancels the play.

use crate::cards::{CardId, CardType, Trigger};
use crate::conditions::{keys, EvalContext};
use crate::core::{GameRng, GameState, PlayerId};
use crate::effects::{EffectDispatcher, PlayerCandidate, PlayerChoice};
use crate::rolls::{RollRequest, RollResolver};

use super::engine::RulesEngine;

impl RulesEngine {
    /// Offer a challenge against `card`, just played by `player`.
    ///
    /// Returns `true` when the play is cancelled.
    pub fn maybe_challenge(
        &self,
        state: &mut GameState,
        player: PlayerId,
        card: CardId,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> bool {
        let catalogue = self.catalogue();
        if !self.config().is_challengeable(catalogue.card_type(card).as_str()) {
            return false;
        }

        let mut ctx = EvalContext::for_actor(player)
            .with(keys::CHALLENGE_TARGET, catalogue.card_value(card))
            .with(keys::CHALLENGE_DENIED, false);
        let cancelled = self.run_challenge(state, player, card, &mut ctx, rng, log);
        EffectDispatcher::flush_warnings(&mut ctx, player, log);
        cancelled
    }

    fn run_challenge(
        &self,
        state: &mut GameState,
        player: PlayerId,
        card: CardId,
        ctx: &mut EvalContext,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> bool {
        let catalogue = self.catalogue();
        for owner in PlayerId::all(state.player_count()) {
            let monsters: Vec<CardId> =
                state.player(owner).captured_monsters.iter().copied().collect();
            for monster in monsters {
                EffectDispatcher::run_steps(
                    self,
                    catalogue.monster_steps(monster),
                    &[Trigger::OnChallenge],
                    state,
                    owner,
                    ctx,
                    rng,
                    log,
                );
            }
        }
        if ctx.flag(keys::CHALLENGE_DENIED) {
            log.push("[Challenge] DENIED by effect".to_string());
            return false;
        }

        let holders: Vec<(PlayerCandidate, CardId)> = player
            .others(state.player_count())
            .filter_map(|other| {
                let hand = &state.player(other).hand;
                let challenge = hand
                    .iter()
                    .copied()
                    .find(|&c| catalogue.card_type(c) == CardType::Challenge)?;
                let candidate = PlayerCandidate {
                    player: other,
                    hand_size: hand.len(),
                };
                Some((candidate, challenge))
            })
            .collect();
        let candidates: Vec<PlayerCandidate> = holders.iter().map(|(c, _)| *c).collect();
        let Some(challenger) =
            self.policy()
                .choose_player(PlayerChoice::Challenger, &candidates, rng)
        else {
            return false;
        };
        let Some(&(_, challenge_card)) = holders.iter().find(|(c, _)| c.player == challenger)
        else {
            return false;
        };
        if !self.policy().should_challenge(challenger, rng) {
            return false;
        }
        if ctx.flag(keys::PROTECT_CHALLENGE) {
            log.push("[Challenge] BLOCKED by protection".to_string());
            return false;
        }

        state.player_mut(challenger).remove_from_hand(challenge_card);
        state.discard_pile.push_back(challenge_card);
        log.push(format!(
            "[{challenger}] CHALLENGE played {} ({}) to challenge {} ({}) by {player}",
            challenge_card.raw(),
            catalogue.card_name(challenge_card),
            card.raw(),
            catalogue.card_name(card)
        ));

        let attack = RollResolver::resolve(
            self,
            state,
            &RollRequest::maximize(challenger, "challenge:challenger"),
            rng,
            log,
        );
        let defence = RollResolver::resolve(
            self,
            state,
            &RollRequest::maximize(player, "challenge:played"),
            rng,
            log,
        );
        log.push(format!(
            "[Challenge] {challenger} rolls {} vs {player} rolls {}",
            attack.total, defence.total
        ));
        tracing::debug!(
            challenger = %challenger,
            player = %player,
            attack = attack.total,
            defence = defence.total,
            "challenge rolled"
        );

        if attack.total > defence.total {
            log.push("[Challenge] SUCCESS: play cancelled".to_string());
            true
        } else {
            log.push("[Challenge] FAIL: play continues".to_string());
            false
        }
    }
}
