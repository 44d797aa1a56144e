// One-shot team assignment for a full lobby.

use super::state::TeamId;
use rand::Rng;
use rand::seq::SliceRandom;

/// Slot `i` is pre-assigned team `i / players_per_team`; the sequence is then
/// shuffled uniformly (Fisher-Yates) and returned in slot order.
pub fn assign_teams<R: Rng + ?Sized>(
    slots: usize,
    players_per_team: u32,
    rng: &mut R,
) -> Vec<TeamId> {
    let per_team = players_per_team.max(1) as usize;
    let mut teams: Vec<TeamId> = (0..slots).map(|i| (i / per_team) as TeamId).collect();
    teams.shuffle(rng);
    teams
}
