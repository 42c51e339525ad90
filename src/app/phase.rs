//! Session phases
//!
//! Forward path:
//! - Home, Setup, PlayerNames
//! - RoleAssignment (each player views their card privately)
//! - RoundStart (only with Mr. Meme or the falafel vendor in play)
//! - Discussion, Voting, then Revenger / MrWhiteGuess when a chain calls for them
//! - RoleReveal, looping back to the next round
//! - Victory, Points, then another game or Home

use crate::game::player::PlayerId;
use crate::game::scoring::{PointAward, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Home,
    Setup,
    PlayerNames,
    /// `cursor` indexes the reveal order for this game
    RoleAssignment { cursor: usize },
    RoundStart,
    Discussion,
    /// `protected` is the last target saved by a falafel this vote
    Voting { protected: Option<PlayerId> },
    Revenger { revenger: PlayerId },
    MrWhiteGuess { guesser: PlayerId },
    RoleReveal,
    Victory { winner: Winner },
    Points { winner: Winner, awards: Vec<PointAward> },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Home => "home",
            Phase::Setup => "setup",
            Phase::PlayerNames => "player-names",
            Phase::RoleAssignment { .. } => "role-assignment",
            Phase::RoundStart => "round-start",
            Phase::Discussion => "discussion",
            Phase::Voting { .. } => "voting",
            Phase::Revenger { .. } => "revenger",
            Phase::MrWhiteGuess { .. } => "mrwhite-guess",
            Phase::RoleReveal => "role-reveal",
            Phase::Victory { .. } => "victory",
            Phase::Points { .. } => "points",
        }
    }
}
