//! Game setup: role counts, difficulty and special-role toggles
//!
//! Validation happens here, before any session state is touched. Every
//! blocking problem is reported, nothing is clamped.

use super::words::Difficulty;
use thiserror::Error;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 20;

/// Optional roles, each with its own minimum table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialToggle {
    Goddess,
    Lovers,
    Meme,
    Revenger,
    Ghost,
    FalafelVendor,
}

impl SpecialToggle {
    pub fn all() -> &'static [SpecialToggle] {
        &[
            SpecialToggle::Goddess,
            SpecialToggle::Lovers,
            SpecialToggle::Meme,
            SpecialToggle::Revenger,
            SpecialToggle::Ghost,
            SpecialToggle::FalafelVendor,
        ]
    }

    pub fn min_players(&self) -> usize {
        match self {
            SpecialToggle::Goddess => 3,
            SpecialToggle::Lovers => 5,
            SpecialToggle::Meme => 3,
            SpecialToggle::Revenger => 5,
            SpecialToggle::Ghost => 3,
            SpecialToggle::FalafelVendor => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpecialToggle::Goddess => "Goddess of Justice",
            SpecialToggle::Lovers => "Lovers",
            SpecialToggle::Meme => "Mr. Meme",
            SpecialToggle::Revenger => "Revenger",
            SpecialToggle::Ghost => "Ghost",
            SpecialToggle::FalafelVendor => "Falafel Vendor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialRoleConfig {
    pub goddess: bool,
    pub lovers: bool,
    pub meme: bool,
    pub revenger: bool,
    pub ghost: bool,
    pub falafel_vendor: bool,
}

impl SpecialRoleConfig {
    pub fn is_enabled(&self, toggle: SpecialToggle) -> bool {
        match toggle {
            SpecialToggle::Goddess => self.goddess,
            SpecialToggle::Lovers => self.lovers,
            SpecialToggle::Meme => self.meme,
            SpecialToggle::Revenger => self.revenger,
            SpecialToggle::Ghost => self.ghost,
            SpecialToggle::FalafelVendor => self.falafel_vendor,
        }
    }

    pub fn set(&mut self, toggle: SpecialToggle, enabled: bool) {
        let slot = match toggle {
            SpecialToggle::Goddess => &mut self.goddess,
            SpecialToggle::Lovers => &mut self.lovers,
            SpecialToggle::Meme => &mut self.meme,
            SpecialToggle::Revenger => &mut self.revenger,
            SpecialToggle::Ghost => &mut self.ghost,
            SpecialToggle::FalafelVendor => &mut self.falafel_vendor,
        };
        *slot = enabled;
    }

    /// Enabled and allowed at this table size.
    pub fn is_active(&self, toggle: SpecialToggle, players: usize) -> bool {
        self.is_enabled(toggle) && players >= toggle.min_players()
    }

    /// Whether rounds open with the round-start announcements.
    pub fn has_round_start(&self) -> bool {
        self.meme || self.falafel_vendor
    }
}

/// Everything chosen on the setup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub players: usize,
    pub undercover: usize,
    pub mr_white: usize,
    pub difficulty: Difficulty,
    pub specials: SpecialRoleConfig,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            players: 5,
            undercover: 1,
            mr_white: 1,
            difficulty: Difficulty::Medium,
            specials: SpecialRoleConfig::default(),
        }
    }
}

/// A reason the setup cannot start a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupIssue {
    #[error("need between {min} and {max} players, got {found}")]
    PlayerCount { found: usize, min: usize, max: usize },

    #[error("need at least one infiltrator")]
    NoInfiltrators,

    #[error("{undercover} undercover + {mr_white} Mr. White leaves no civilian among {players} players")]
    NoCivilians {
        players: usize,
        undercover: usize,
        mr_white: usize,
    },

    #[error("{role} needs at least {min} players")]
    SpecialRoleGate { role: &'static str, min: usize },
}

impl GameSetup {
    pub fn civilians(&self) -> usize {
        self.players
            .saturating_sub(self.undercover)
            .saturating_sub(self.mr_white)
    }

    /// Collect every blocking reason. Empty means the setup is playable.
    pub fn validate(&self) -> Vec<SetupIssue> {
        let mut issues = Vec::new();

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            issues.push(SetupIssue::PlayerCount {
                found: self.players,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        if self.undercover + self.mr_white == 0 {
            issues.push(SetupIssue::NoInfiltrators);
        }

        if self.undercover + self.mr_white >= self.players {
            issues.push(SetupIssue::NoCivilians {
                players: self.players,
                undercover: self.undercover,
                mr_white: self.mr_white,
            });
        }

        for toggle in SpecialToggle::all() {
            if self.specials.is_enabled(*toggle) && self.players < toggle.min_players() {
                issues.push(SetupIssue::SpecialRoleGate {
                    role: toggle.label(),
                    min: toggle.min_players(),
                });
            }
        }

        issues
    }
}
