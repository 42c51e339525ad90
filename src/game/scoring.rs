//! Victory detection and per-game point awards

use super::player::{PlayerId, Role, Roster};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Civilians,
    Infiltrators,
}

impl Winner {
    pub fn label(&self) -> &'static str {
        match self {
            Winner::Civilians => "Civilians",
            Winner::Infiltrators => "Infiltrators",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Living players by side. Ghosts count as dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub civilians: usize,
    pub infiltrators: usize,
}

impl Tally {
    pub fn of(roster: &Roster) -> Self {
        let mut tally = Tally::default();
        for player in roster.players().iter().filter(|p| p.is_alive) {
            if player.role.is_infiltrator() {
                tally.infiltrators += 1;
            } else {
                tally.civilians += 1;
            }
        }
        tally
    }
}

/// Win check, run once every chain and guess has settled.
pub fn check_victory(roster: &Roster) -> Option<Winner> {
    let tally = Tally::of(roster);
    if tally.infiltrators == 0 && tally.civilians > 0 {
        Some(Winner::Civilians)
    } else if tally.civilians == 1 && tally.infiltrators > 0 {
        Some(Winner::Infiltrators)
    } else {
        None
    }
}

/// Decide a game that can no longer progress.
///
/// Only reached when [`check_victory`] found no winner but a chain wiped out
/// every living civilian, or everyone at once. Infiltrators still standing
/// take the game; a table with no infiltrators left goes to the civilians,
/// and [`award_points`] hands out nothing for it.
pub fn stalemate_winner(roster: &Roster) -> Option<Winner> {
    let tally = Tally::of(roster);
    match (tally.civilians, tally.infiltrators) {
        (0, 0) => Some(Winner::Civilians),
        (0, _) => Some(Winner::Infiltrators),
        _ => None,
    }
}

/// Points one player earned for the finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointAward {
    pub player: PlayerId,
    pub role: Role,
    pub earned: u32,
    /// Cumulative total after this award
    pub total: u32,
}

fn points_for(role: Role, winner: Winner, alive: bool, guessed_correctly: bool) -> u32 {
    match (role, winner) {
        (Role::Civilian, Winner::Civilians) => 1,
        (Role::Undercover, Winner::Infiltrators) => 2,
        (Role::MrWhite, Winner::Infiltrators) if alive => 3,
        (Role::MrWhite, _) if !alive && guessed_correctly => 3,
        _ => 0,
    }
}

/// Add this game's points onto every player's running total.
///
/// `correct_guessers` holds the Mr. Whites whose guess matched. Ghosts score
/// by role like everyone else. A civilian win over an empty table scores
/// nothing. Callers must award at most once per game.
pub fn award_points(
    roster: &mut Roster,
    winner: Winner,
    correct_guessers: &BTreeSet<PlayerId>,
) -> Vec<PointAward> {
    let wiped_out = winner == Winner::Civilians && Tally::of(roster) == Tally::default();
    let mut awards = Vec::with_capacity(roster.len());
    for player in roster.players_mut() {
        let earned = if wiped_out {
            0
        } else {
            points_for(
                player.role,
                winner,
                player.is_alive,
                correct_guessers.contains(&player.id),
            )
        };
        player.points += earned;
        awards.push(PointAward {
            player: player.id,
            role: player.role,
            earned,
            total: player.points,
        });
    }

    tracing::info!(
        "{} won; {} points handed out",
        winner,
        awards.iter().map(|a| a.earned).sum::<u32>()
    );
    awards
}
