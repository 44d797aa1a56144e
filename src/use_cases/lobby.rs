// Lobby roster: who is connected and which team they were dealt.

use super::types::PlayerId;
use crate::domain::TeamId;
use crate::domain::teams::assign_teams;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Unset until the lobby fills and teams are dealt.
    pub team: Option<TeamId>,
}

/// Errors returned by lobby operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyError {
    /// Every slot is taken.
    Full,
}

#[derive(Debug)]
pub struct Lobby {
    capacity: usize,
    players: Vec<Player>,
    next_id: PlayerId,
}

impl Lobby {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            players: Vec::new(),
            next_id: 0,
        }
    }

    /// Adds a player and returns its id. Ids count up in join order and are
    /// never handed out twice.
    pub fn join(&mut self) -> Result<PlayerId, LobbyError> {
        if self.is_full() {
            return Err(LobbyError::Full);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.players.push(Player { id, team: None });
        Ok(id)
    }

    /// Removes a player; returns false if the id was not present.
    pub fn leave(&mut self, player_id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        self.players.len() != before
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Connected players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Deals teams to the current roster, in join order.
    pub fn assign_teams<R: Rng + ?Sized>(&mut self, players_per_team: u32, rng: &mut R) {
        let teams = assign_teams(self.players.len(), players_per_team, rng);
        for (player, team) in self.players.iter_mut().zip(teams) {
            player.team = Some(team);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ids_are_sequential_in_join_order() {
        let mut lobby = Lobby::new(3);
        assert_eq!(lobby.join(), Ok(0));
        assert_eq!(lobby.join(), Ok(1));
        assert_eq!(lobby.join(), Ok(2));
        let ids: Vec<PlayerId> = lobby.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn join_beyond_capacity_is_rejected_and_not_tracked() {
        let mut lobby = Lobby::new(2);
        lobby.join().unwrap();
        lobby.join().unwrap();
        assert!(lobby.is_full());
        assert_eq!(lobby.join(), Err(LobbyError::Full));
        assert_eq!(lobby.players().len(), 2);
    }

    #[test]
    fn leave_frees_a_slot_without_reusing_ids() {
        let mut lobby = Lobby::new(2);
        let a = lobby.join().unwrap();
        lobby.join().unwrap();

        assert!(lobby.leave(a));
        assert!(!lobby.leave(a));
        assert!(!lobby.contains(a));
        assert_eq!(lobby.join(), Ok(2));
    }

    #[test]
    fn teams_start_unassigned_and_are_dealt_in_join_order() {
        let mut lobby = Lobby::new(4);
        for _ in 0..4 {
            lobby.join().unwrap();
        }
        assert!(lobby.players().iter().all(|p| p.team.is_none()));

        lobby.assign_teams(1, &mut StdRng::seed_from_u64(11));

        let expected = assign_teams(4, 1, &mut StdRng::seed_from_u64(11));
        let dealt: Vec<TeamId> = lobby.players().iter().filter_map(|p| p.team).collect();
        assert_eq!(dealt, expected);
    }
}
