//! Turn boundaries and win conditions.

use crate::cards::{CardId, Trigger};
use crate::conditions::EvalContext;
use crate::core::{GameRng, GameState, PlayerId};
use crate::effects::EffectDispatcher;

use super::engine::{GameResult, RulesEngine, WinReason};

impl RulesEngine {
    /// Start turn `turn` (1-based). Seats take turns in order.
    ///
    /// Expired standing modifiers are dropped for every player. The active
    /// player's actions per turn are reset, its captured monsters' `passive`
    /// steps run (they may change the reset value), and then its action
    /// points are refilled and its activations cleared.
    pub fn begin_turn(
        &self,
        state: &mut GameState,
        turn: u32,
        rng: &mut GameRng,
        log: &mut Vec<String>,
    ) -> PlayerId {
        let seats = state.player_count().max(1);
        let index = usize::try_from(turn.saturating_sub(1)).unwrap_or(0) % seats;
        let active = PlayerId::all(seats).nth(index).unwrap_or(PlayerId::new(0));

        state.turn = turn;
        state.active_player = active;
        state.expire_roll_modifiers(turn);
        state.player_mut(active).actions_per_turn = self.config().actions_per_turn;
        log.push(format!("[TURN {turn}] {active} to act"));
        tracing::debug!(turn, active = %active, "turn started");

        let monsters: Vec<CardId> = state.player(active).captured_monsters.iter().copied().collect();
        let mut ctx = EvalContext::for_actor(active);
        for monster in monsters {
            EffectDispatcher::run_steps(
                self,
                self.catalogue().monster_steps(monster),
                &[Trigger::Passive],
                state,
                active,
                &mut ctx,
                rng,
                log,
            );
        }
        EffectDispatcher::flush_warnings(&mut ctx, active, log);

        let board = state.player_mut(active);
        board.action_points = board.actions_per_turn;
        board.activated_heroes.clear();
        active
    }

    /// The first player, in seat order, who has won.
    ///
    /// A player wins by capturing `monsters_to_win` monsters, or when its
    /// party classes (party leader included) cover every hero and party
    /// leader class in the catalogue.
    #[must_use]
    pub fn check_winner(&self, state: &GameState) -> Option<GameResult> {
        let required = self.catalogue().hero_classes();
        state.players.iter().find_map(|(player, board)| {
            let captured = board.captured_monsters.len();
            if captured >= self.config().monsters_to_win {
                return Some(GameResult {
                    winner: player,
                    reason: WinReason::Monsters(captured),
                });
            }
            let classes = board.party_classes(self.catalogue());
            (!required.is_empty() && required.is_subset(&classes)).then(|| GameResult {
                winner: player,
                reason: WinReason::PartyClasses(classes.into_iter().collect()),
            })
        })
    }
}
