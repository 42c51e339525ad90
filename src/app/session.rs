//! The game session: one owned value holding the roster and every piece of
//! per-game state, advanced only through the operations below.
//!
//! Every operation checks the current [`Phase`] first and refuses with
//! [`SessionError::WrongPhase`] instead of half-applying anything. Chains of
//! eliminations are settled by the resolver before an operation returns, so
//! the session never exposes a partially resolved elimination.

use super::phase::Phase;
use crate::game::assignment::{assign_core_roles, assign_special_roles, RoleCounts};
use crate::game::player::{Falafel, FalafelEffect, PlayerId, Roster, SpecialRole};
use crate::game::random::{coin, pick};
use crate::game::resolver::{self, ChainReport, Elimination};
use crate::game::scoring::{self, PointAward, Winner};
use crate::game::setup::{GameSetup, SetupIssue, SpecialToggle};
use crate::game::turns;
use crate::game::words::{normalize, PairSource, WordPair, WordSource};
use crate::storage::NameHistory;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("{0} cannot be chosen")]
    InvalidTarget(PlayerId),

    #[error("setup is not playable: {}", join_issues(.0))]
    InvalidSetup(Vec<SetupIssue>),

    #[error(transparent)]
    Guess(#[from] GuessError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("type a word before guessing")]
    Empty,
}

fn join_issues(issues: &[SetupIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Wrong,
}

pub struct Session {
    phase: Phase,
    setup: GameSetup,
    roster: Roster,
    rng: StdRng,
    words: WordSource,
    history: Option<Box<dyn NameHistory>>,

    game_number: u32,
    round: u32,
    word_pair: Option<WordPair>,
    pair_source: Option<PairSource>,
    fallback_notice: bool,
    reveal_start: usize,
    turn_order: Option<Vec<PlayerId>>,

    /// Primary target of the last elimination this round
    eliminated: Option<PlayerId>,
    /// Chains resolved since voting opened, shown on the role reveal
    chains: Vec<ChainReport>,
    /// Everyone eliminated since voting opened, in order
    pending_eliminations: Vec<PlayerId>,
    /// Mr. Whites waiting for their guess step
    pending_guesses: VecDeque<PlayerId>,
    correct_guessers: BTreeSet<PlayerId>,

    falafel_vendor: Option<PlayerId>,
    mr_meme: Option<PlayerId>,

    winner: Option<Winner>,
    awards: Option<Vec<PointAward>>,
}

impl Session {
    pub fn new(words: WordSource, history: Option<Box<dyn NameHistory>>) -> Self {
        Self::with_rng(words, history, StdRng::from_os_rng())
    }

    /// Deterministic session for a fixed seed.
    pub fn with_seed(words: WordSource, history: Option<Box<dyn NameHistory>>, seed: u64) -> Self {
        Self::with_rng(words, history, StdRng::seed_from_u64(seed))
    }

    fn with_rng(words: WordSource, history: Option<Box<dyn NameHistory>>, rng: StdRng) -> Self {
        Self {
            phase: Phase::Home,
            setup: GameSetup::default(),
            roster: Roster::default(),
            rng,
            words,
            history,
            game_number: 0,
            round: 0,
            word_pair: None,
            pair_source: None,
            fallback_notice: false,
            reveal_start: 0,
            turn_order: None,
            eliminated: None,
            chains: Vec::new(),
            pending_eliminations: Vec::new(),
            pending_guesses: VecDeque::new(),
            correct_guessers: BTreeSet::new(),
            falafel_vendor: None,
            mr_meme: None,
            winner: None,
            awards: None,
        }
    }

    /// Setup values the setup form starts from.
    pub fn with_default_setup(mut self, setup: GameSetup) -> Self {
        self.setup = setup;
        self
    }

    // Read access

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn word_pair(&self) -> Option<&WordPair> {
        self.word_pair.as_ref()
    }

    pub fn pair_source(&self) -> Option<PairSource> {
        self.pair_source
    }

    pub fn reveal_start(&self) -> usize {
        self.reveal_start
    }

    pub fn eliminated(&self) -> Option<PlayerId> {
        self.eliminated
    }

    pub fn chains(&self) -> &[ChainReport] {
        &self.chains
    }

    pub fn pending_eliminations(&self) -> &[PlayerId] {
        &self.pending_eliminations
    }

    pub fn correct_guessers(&self) -> &BTreeSet<PlayerId> {
        &self.correct_guessers
    }

    pub fn falafel_vendor(&self) -> Option<PlayerId> {
        self.falafel_vendor
    }

    pub fn mr_meme(&self) -> Option<PlayerId> {
        self.mr_meme
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// This round's speaking order, empty before discussion opens.
    pub fn turn_order(&self) -> &[PlayerId] {
        self.turn_order.as_deref().unwrap_or(&[])
    }

    /// Card-viewing order for the current game.
    pub fn reveal_order(&self) -> Vec<PlayerId> {
        turns::reveal_order(self.roster.len(), self.reveal_start)
    }

    /// Player whose card is up during role assignment.
    pub fn current_reveal(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::RoleAssignment { cursor } => self.reveal_order().get(cursor).copied(),
            _ => None,
        }
    }

    /// The goddess, if one is in play. Her vote counts even once she is out.
    pub fn goddess(&self) -> Option<PlayerId> {
        self.roster.find_special(SpecialRole::Goddess)
    }

    /// Eliminated players who still vote.
    pub fn ghost_voters(&self) -> Vec<PlayerId> {
        self.roster.ghost_ids()
    }

    /// True when the vendor is still in the game and can hand out a falafel.
    pub fn vendor_can_give(&self) -> bool {
        self.falafel_vendor
            .is_some_and(|v| self.roster.player(v).is_active())
    }

    pub fn all_clues_given(&self) -> bool {
        self.turn_order()
            .iter()
            .all(|id| self.roster.player(*id).has_given_clue)
    }

    /// Returns true once, the first time a draw fell back to the offline
    /// word table after a live generator failed.
    pub fn take_fallback_notice(&mut self) -> bool {
        std::mem::take(&mut self.fallback_notice)
    }

    // Home, setup, names

    pub fn begin_setup(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Home), "open setup")?;
        self.transition(Phase::Setup);
        Ok(())
    }

    /// Validate and fix the setup for this session, then seat the players.
    pub fn configure(&mut self, setup: GameSetup) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Setup), "configure a game")?;

        let issues = setup.validate();
        if !issues.is_empty() {
            tracing::debug!("setup refused: {}", join_issues(&issues));
            return Err(SessionError::InvalidSetup(issues));
        }

        self.roster = Roster::new(setup.players);
        if let Some(history) = &self.history {
            self.roster.set_names(&history.load());
        }
        self.setup = setup;
        self.transition(Phase::PlayerNames);
        Ok(())
    }

    /// Seat names in order (blank keeps the default) and deal the first game.
    pub fn confirm_names(&mut self, names: &[String]) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::PlayerNames), "confirm names")?;

        self.roster.set_names(names);
        if let Some(history) = &self.history {
            history.save(&self.roster.names());
        }
        self.start_game();
        Ok(())
    }

    fn start_game(&mut self) {
        self.game_number += 1;
        self.roster.reset_for_game();
        self.reveal_start = turns::reveal_start(self.game_number, self.roster.len());

        let draw = self.words.draw(self.setup.difficulty, &mut self.rng);
        if draw.fallback_notice {
            self.fallback_notice = true;
        }

        let counts = RoleCounts {
            undercover: self.setup.undercover,
            mr_white: self.setup.mr_white,
        };
        assign_core_roles(&mut self.roster, counts, &draw.pair, &mut self.rng);
        let specials = assign_special_roles(&mut self.roster, &self.setup.specials, &mut self.rng);

        self.falafel_vendor = specials.falafel_vendor;
        self.word_pair = Some(draw.pair);
        self.pair_source = Some(draw.source);
        self.round = 1;
        self.turn_order = None;
        self.eliminated = None;
        self.chains.clear();
        self.pending_eliminations.clear();
        self.pending_guesses.clear();
        self.correct_guessers.clear();
        self.mr_meme = None;
        self.winner = None;
        self.awards = None;

        tracing::info!(
            "game {} dealt to {} players ({:?} pair)",
            self.game_number,
            self.roster.len(),
            draw.source
        );
        self.transition(Phase::RoleAssignment { cursor: 0 });
    }

    /// The current player has seen their card; pass the device on.
    pub fn advance_reveal(&mut self) -> Result<(), SessionError> {
        let Phase::RoleAssignment { cursor } = self.phase else {
            return Err(self.wrong_phase("advance the role reveal"));
        };

        let next = cursor + 1;
        if next >= self.roster.len() {
            self.enter_round();
        } else {
            self.phase = Phase::RoleAssignment { cursor: next };
        }
        Ok(())
    }

    // Rounds

    fn enter_round(&mut self) {
        self.roster.clear_clues();
        self.roster.clear_falafels();
        self.turn_order = None;
        self.eliminated = None;
        self.chains.clear();
        self.pending_eliminations.clear();

        let players = self.roster.len();
        self.mr_meme = if self.setup.specials.is_active(SpecialToggle::Meme, players) {
            pick(&self.roster.active_ids(), &mut self.rng)
        } else {
            None
        };
        if let Some(meme) = self.mr_meme {
            tracing::debug!("round {}: {} is Mr. Meme", self.round, meme);
        }

        if self.setup.specials.has_round_start() {
            self.transition(Phase::RoundStart);
        } else {
            self.open_discussion();
        }
    }

    /// The vendor hands a falafel to `recipient`, or to nobody. Discussion
    /// opens either way. The effect stays hidden until the holder is voted.
    pub fn give_falafel(
        &mut self,
        recipient: Option<PlayerId>,
    ) -> Result<Option<FalafelEffect>, SessionError> {
        self.require(matches!(self.phase, Phase::RoundStart), "hand out a falafel")?;

        let Some(recipient) = recipient else {
            tracing::debug!("falafel vendor skipped this round");
            self.open_discussion();
            return Ok(None);
        };

        let vendor = match self.falafel_vendor {
            Some(v) if self.vendor_can_give() => v,
            _ => return Err(SessionError::InvalidTarget(recipient)),
        };
        let eligible = self.roster.get(recipient).is_some_and(|p| p.is_active());
        if recipient == vendor || !eligible {
            return Err(SessionError::InvalidTarget(recipient));
        }

        let effect = if coin(&mut self.rng) {
            FalafelEffect::Protect
        } else {
            FalafelEffect::Sabotage
        };
        self.roster.player_mut(recipient).falafel = Some(Falafel {
            holder: recipient,
            effect,
            used: false,
        });
        tracing::debug!("{} handed a falafel to {}", vendor, recipient);

        self.open_discussion();
        Ok(Some(effect))
    }

    /// Leave the round-start announcements without handing out a falafel.
    pub fn begin_discussion(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::RoundStart), "start discussion")?;
        self.open_discussion();
        Ok(())
    }

    fn open_discussion(&mut self) {
        if self.turn_order.is_none() {
            self.turn_order = Some(turns::round_order(&self.roster, &mut self.rng));
        }
        self.transition(Phase::Discussion);
    }

    pub fn mark_clue(&mut self, player: PlayerId) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Discussion), "record a clue")?;
        if !self.turn_order().contains(&player) {
            return Err(SessionError::InvalidTarget(player));
        }
        self.roster.player_mut(player).has_given_clue = true;
        Ok(())
    }

    pub fn begin_voting(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Discussion), "start voting")?;
        self.transition(Phase::Voting { protected: None });
        Ok(())
    }

    // Eliminations

    /// Apply the table's vote against `target`.
    ///
    /// A falafel-protected target stays in and the vote must pick someone
    /// else; the session stays in [`Phase::Voting`] with `protected` set.
    pub fn eliminate(&mut self, target: PlayerId) -> Result<Elimination, SessionError> {
        let Phase::Voting { protected } = self.phase else {
            return Err(self.wrong_phase("eliminate a player"));
        };
        self.expect_living(target)?;
        if protected == Some(target) {
            return Err(SessionError::InvalidTarget(target));
        }

        let outcome = resolver::eliminate(&mut self.roster, target);
        match &outcome {
            Elimination::Protected { target } => {
                self.phase = Phase::Voting {
                    protected: Some(*target),
                };
            }
            Elimination::Resolved(report) => {
                self.eliminated = Some(report.primary);
                self.settle(report.clone());
            }
        }
        Ok(outcome)
    }

    /// End the vote with nobody eliminated and move to the next round.
    pub fn skip_elimination(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Voting { .. }), "skip the vote")?;
        tracing::info!("round {} ended with no elimination", self.round);
        self.round += 1;
        self.enter_round();
        Ok(())
    }

    /// The fallen revenger takes `target` down with them.
    pub fn revenge(&mut self, target: PlayerId) -> Result<ChainReport, SessionError> {
        let Phase::Revenger { revenger } = self.phase else {
            return Err(self.wrong_phase("take revenge"));
        };
        if target == revenger {
            return Err(SessionError::InvalidTarget(target));
        }
        self.expect_living(target)?;

        let report = resolver::take_revenge(&mut self.roster, revenger, target);
        self.settle(report.clone());
        Ok(report)
    }

    pub fn skip_revenge(&mut self) -> Result<(), SessionError> {
        let Phase::Revenger { revenger } = self.phase else {
            return Err(self.wrong_phase("skip revenge"));
        };
        tracing::info!("{} declined to take revenge", revenger);
        self.next_pending_step();
        Ok(())
    }

    /// Record a resolved chain and route to whatever it calls for.
    fn settle(&mut self, report: ChainReport) {
        self.pending_eliminations
            .extend(report.eliminated.iter().copied());
        if let Some(guesser) = report.mr_white_guess {
            self.pending_guesses.push_back(guesser);
        }
        let revenger = report.revenger;
        self.chains.push(report);

        match revenger {
            Some(revenger) => self.transition(Phase::Revenger { revenger }),
            None => self.next_pending_step(),
        }
    }

    fn next_pending_step(&mut self) {
        match self.pending_guesses.pop_front() {
            Some(guesser) => self.transition(Phase::MrWhiteGuess { guesser }),
            None => self.transition(Phase::RoleReveal),
        }
    }

    /// Mr. White's one attempt at the civilian word.
    ///
    /// An empty guess is refused and does not use up the attempt.
    pub fn submit_guess(&mut self, guess: &str) -> Result<GuessOutcome, SessionError> {
        let Phase::MrWhiteGuess { guesser } = self.phase else {
            return Err(self.wrong_phase("guess the word"));
        };
        let guess = normalize(guess);
        if guess.is_empty() {
            return Err(GuessError::Empty.into());
        }

        let correct = self
            .word_pair
            .as_ref()
            .is_some_and(|pair| normalize(&pair.civilian) == guess);

        if correct {
            tracing::info!("{} guessed the civilian word", guesser);
            self.correct_guessers.insert(guesser);
            self.pending_guesses.clear();
            self.finish(Winner::Infiltrators);
            Ok(GuessOutcome::Correct)
        } else {
            tracing::info!("{} guessed wrong", guesser);
            self.next_pending_step();
            Ok(GuessOutcome::Wrong)
        }
    }

    /// Mr. White passes on the guess; counts as wrong.
    pub fn skip_guess(&mut self) -> Result<(), SessionError> {
        let Phase::MrWhiteGuess { guesser } = self.phase else {
            return Err(self.wrong_phase("skip the guess"));
        };
        tracing::info!("{} skipped the guess", guesser);
        self.next_pending_step();
        Ok(())
    }

    /// Roles of the eliminated players were shown; check for a winner and
    /// otherwise start the next round.
    ///
    /// A chain can leave no civilian alive without tripping the win check.
    /// The next round would have nobody to play against, so the game is
    /// decided by [`scoring::stalemate_winner`] instead.
    pub fn continue_after_reveal(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::RoleReveal), "continue")?;

        let winner = scoring::check_victory(&self.roster)
            .or_else(|| scoring::stalemate_winner(&self.roster));
        match winner {
            Some(winner) => self.finish(winner),
            None => {
                self.round += 1;
                self.enter_round();
            }
        }
        Ok(())
    }

    fn finish(&mut self, winner: Winner) {
        tracing::info!("game {} won by {}", self.game_number, winner);
        self.winner = Some(winner);
        self.transition(Phase::Victory { winner });
    }

    // End of game

    /// Award this game's points (once) and show the table.
    pub fn show_points(&mut self) -> Result<(), SessionError> {
        let Phase::Victory { winner } = self.phase else {
            return Err(self.wrong_phase("show points"));
        };

        let awards = match &self.awards {
            Some(awards) => awards.clone(),
            None => {
                let awards =
                    scoring::award_points(&mut self.roster, winner, &self.correct_guessers);
                self.awards = Some(awards.clone());
                awards
            }
        };
        self.transition(Phase::Points { winner, awards });
        Ok(())
    }

    /// Same table, same names and points, fresh words and roles.
    pub fn play_again(&mut self) -> Result<(), SessionError> {
        self.require(matches!(self.phase, Phase::Points { .. }), "play again")?;
        self.start_game();
        Ok(())
    }

    /// Drop the roster and every point. Allowed from any phase.
    pub fn return_home(&mut self) {
        tracing::info!("session reset after {} games", self.game_number);
        self.roster = Roster::default();
        self.game_number = 0;
        self.round = 0;
        self.word_pair = None;
        self.pair_source = None;
        self.reveal_start = 0;
        self.turn_order = None;
        self.eliminated = None;
        self.chains.clear();
        self.pending_eliminations.clear();
        self.pending_guesses.clear();
        self.correct_guessers.clear();
        self.falafel_vendor = None;
        self.mr_meme = None;
        self.winner = None;
        self.awards = None;
        self.transition(Phase::Home);
    }

    // Helpers

    fn transition(&mut self, next: Phase) {
        tracing::debug!("phase {} -> {}", self.phase.name(), next.name());
        self.phase = next;
    }

    fn wrong_phase(&self, action: &'static str) -> SessionError {
        SessionError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    fn require(&self, allowed: bool, action: &'static str) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(self.wrong_phase(action))
        }
    }

    fn expect_living(&self, target: PlayerId) -> Result<(), SessionError> {
        match self.roster.get(target) {
            Some(p) if p.is_alive => Ok(()),
            _ => Err(SessionError::InvalidTarget(target)),
        }
    }
}
