//! Player roster: seats at the table that survive across games

use std::collections::BTreeSet;
use std::fmt;

/// Avatar glyphs handed out by seat
const AVATARS: [&str; 10] = ["🦊", "🐼", "🐸", "🦉", "🐙", "🦁", "🐢", "🐝", "🦄", "🐳"];

/// Stable seat identifier, fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

/// Core role, exactly one per player per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Civilian,
    Undercover,
    MrWhite,
}

impl Role {
    /// Undercover and Mr. White share the infiltrator win condition.
    pub fn is_infiltrator(&self) -> bool {
        matches!(self, Role::Undercover | Role::MrWhite)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Civilian => "Civilian",
            Role::Undercover => "Undercover",
            Role::MrWhite => "Mr. White",
        }
    }
}

/// Optional per-game tags layered on top of the core role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecialRole {
    Goddess,
    Lover,
    Revenger,
    Ghost,
    FalafelVendor,
}

impl SpecialRole {
    pub fn label(&self) -> &'static str {
        match self {
            SpecialRole::Goddess => "Goddess of Justice",
            SpecialRole::Lover => "Lover",
            SpecialRole::Revenger => "Revenger",
            SpecialRole::Ghost => "Ghost",
            SpecialRole::FalafelVendor => "Falafel Vendor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalafelEffect {
    Protect,
    Sabotage,
}

/// A falafel handed out by the vendor for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Falafel {
    pub holder: PlayerId,
    pub effect: FalafelEffect,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: &'static str,
    pub role: Role,
    /// `None` only for Mr. White
    pub word: Option<String>,
    pub is_alive: bool,
    pub has_given_clue: bool,
    pub special_roles: BTreeSet<SpecialRole>,
    pub lover: Option<PlayerId>,
    /// Eliminated but still allowed to speak and vote
    pub is_ghost: bool,
    pub falafel: Option<Falafel>,
    /// Cumulative across every game of the session
    pub points: u32,
}

impl Player {
    pub fn new(seat: usize) -> Self {
        Self {
            id: PlayerId(seat),
            name: default_name(seat),
            avatar: AVATARS[seat % AVATARS.len()],
            role: Role::Civilian,
            word: None,
            is_alive: true,
            has_given_clue: false,
            special_roles: BTreeSet::new(),
            lover: None,
            is_ghost: false,
            falafel: None,
            points: 0,
        }
    }

    pub fn has_special(&self, role: SpecialRole) -> bool {
        self.special_roles.contains(&role)
    }

    /// Alive and not a ghost: takes part in the speaking order.
    pub fn is_active(&self) -> bool {
        self.is_alive && !self.is_ghost
    }

    /// Unused falafel effect, if any.
    pub fn unused_falafel(&self) -> Option<FalafelEffect> {
        self.falafel.filter(|f| !f.used).map(|f| f.effect)
    }

    /// Clear everything that belongs to a single game. Name and points stay.
    pub fn reset_for_game(&mut self) {
        self.role = Role::Civilian;
        self.word = None;
        self.is_alive = true;
        self.has_given_clue = false;
        self.special_roles.clear();
        self.lover = None;
        self.is_ghost = false;
        self.falafel = None;
    }
}

/// Name shown for a seat when nobody typed one.
pub fn default_name(seat: usize) -> String {
    format!("Player {}", seat + 1)
}

/// All seats at the table, indexed by `PlayerId`.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(size: usize) -> Self {
        Self {
            players: (0..size).map(Player::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.0)
    }

    /// Lookup that treats an unknown id as engine misuse.
    pub fn player(&self, id: PlayerId) -> &Player {
        self.get(id)
            .unwrap_or_else(|| panic!("{} is not seated in a roster of {}", id, self.len()))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        let len = self.len();
        self.get_mut(id)
            .unwrap_or_else(|| panic!("{} is not seated in a roster of {}", id, len))
    }

    /// Players alive and not ghosts, in seat order.
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    pub fn ghost_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_ghost)
            .map(|p| p.id)
            .collect()
    }

    /// First player carrying the given tag.
    pub fn find_special(&self, role: SpecialRole) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.has_special(role))
            .map(|p| p.id)
    }

    /// Apply display names by seat; blank entries keep the default name.
    pub fn set_names(&mut self, names: &[String]) {
        for player in &mut self.players {
            let name = names
                .get(player.id.0)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty());
            player.name = match name {
                Some(n) => n.to_string(),
                None => default_name(player.id.0),
            };
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn reset_for_game(&mut self) {
        for player in &mut self.players {
            player.reset_for_game();
        }
    }

    pub fn clear_clues(&mut self) {
        for player in &mut self.players {
            player.has_given_clue = false;
        }
    }

    pub fn clear_falafels(&mut self) {
        for player in &mut self.players {
            player.falafel = None;
        }
    }

    /// Panics if any lover link is not symmetric.
    pub fn assert_lovers_symmetric(&self) {
        for player in &self.players {
            if let Some(partner) = player.lover {
                assert_ne!(partner, player.id, "{} is paired with themselves", player.id);
                assert_eq!(
                    self.player(partner).lover,
                    Some(player.id),
                    "lover link {} -> {} has no reverse pointer",
                    player.id,
                    partner
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_roster_has_default_names() {
        let roster = Roster::new(4);
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.player(PlayerId(0)).name, "Player 1");
        assert_eq!(roster.player(PlayerId(3)).name, "Player 4");
        assert!(roster.players().iter().all(|p| p.is_alive && p.points == 0));
    }

    #[test]
    fn test_set_names_falls_back_for_blank_entries() {
        let mut roster = Roster::new(3);
        roster.set_names(&["  Asha ".to_string(), "".to_string()]);
        assert_eq!(roster.names(), vec!["Asha", "Player 2", "Player 3"]);
    }

    #[test]
    fn test_reset_keeps_name_and_points() {
        let mut roster = Roster::new(2);
        roster.set_names(&["Ravi".to_string(), "Meera".to_string()]);
        {
            let p = roster.player_mut(PlayerId(0));
            p.points = 5;
            p.role = Role::MrWhite;
            p.is_alive = false;
            p.is_ghost = true;
            p.special_roles.insert(SpecialRole::Ghost);
            p.lover = Some(PlayerId(1));
        }
        roster.reset_for_game();
        let p = roster.player(PlayerId(0));
        assert_eq!(p.name, "Ravi");
        assert_eq!(p.points, 5);
        assert_eq!(p.role, Role::Civilian);
        assert!(p.is_alive && !p.is_ghost);
        assert!(p.special_roles.is_empty());
        assert_eq!(p.lover, None);
    }

    #[test]
    fn test_active_excludes_dead_and_ghosts() {
        let mut roster = Roster::new(4);
        roster.player_mut(PlayerId(1)).is_alive = false;
        {
            let ghost = roster.player_mut(PlayerId(2));
            ghost.is_alive = false;
            ghost.is_ghost = true;
        }
        assert_eq!(roster.active_ids(), vec![PlayerId(0), PlayerId(3)]);
        assert_eq!(roster.ghost_ids(), vec![PlayerId(2)]);
    }

    #[test]
    fn test_unused_falafel() {
        let mut player = Player::new(0);
        assert_eq!(player.unused_falafel(), None);
        player.falafel = Some(Falafel {
            holder: player.id,
            effect: FalafelEffect::Protect,
            used: false,
        });
        assert_eq!(player.unused_falafel(), Some(FalafelEffect::Protect));
        player.falafel.as_mut().unwrap().used = true;
        assert_eq!(player.unused_falafel(), None);
    }

    #[test]
    #[should_panic(expected = "no reverse pointer")]
    fn test_asymmetric_lovers_panics() {
        let mut roster = Roster::new(3);
        roster.player_mut(PlayerId(0)).lover = Some(PlayerId(1));
        roster.assert_lovers_symmetric();
    }

    #[test]
    fn test_role_infiltrators() {
        assert!(!Role::Civilian.is_infiltrator());
        assert!(Role::Undercover.is_infiltrator());
        assert!(Role::MrWhite.is_infiltrator());
    }
}
