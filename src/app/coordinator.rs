//! Screen-level UI state on top of the session
//!
//! Holds only what the terminal needs between key presses: the highlighted
//! row, text being typed, the setup form, and a feedback line. Every game
//! mutation goes through [`Session`].

use super::phase::Phase;
use super::session::{GuessOutcome, Session, SessionError};
use crate::game::player::PlayerId;
use crate::game::resolver::Elimination;
use crate::game::setup::{GameSetup, SpecialToggle, MAX_PLAYERS, MIN_PLAYERS};
use crossterm::event::KeyCode;

/// Longest name accepted on the names screen
const MAX_NAME_LEN: usize = 16;
const MAX_GUESS_LEN: usize = 32;

/// Menu option on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    NewGame,
    Quit,
}

impl MenuOption {
    pub fn all() -> &'static [MenuOption] {
        &[MenuOption::NewGame, MenuOption::Quit]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::NewGame => "New Game",
            MenuOption::Quit => "Quit",
        }
    }
}

/// One row of the setup form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Players,
    Undercover,
    MrWhite,
    Difficulty,
    Special(SpecialToggle),
    Start,
}

impl SetupField {
    pub fn all() -> Vec<SetupField> {
        let mut fields = vec![
            SetupField::Players,
            SetupField::Undercover,
            SetupField::MrWhite,
            SetupField::Difficulty,
        ];
        fields.extend(SpecialToggle::all().iter().copied().map(SetupField::Special));
        fields.push(SetupField::Start);
        fields
    }
}

/// Main application coordinator
pub struct AppCoordinator {
    pub session: Session,
    pub should_quit: bool,
    /// Highlighted row on list screens
    pub selected: usize,
    /// Setup form being edited
    pub form: GameSetup,
    /// Name entries, one per seat
    pub names: Vec<String>,
    /// Free text (Mr. White's guess)
    pub input: String,
    /// The current player's card is face up
    pub card_visible: bool,
    /// Last message for the players
    pub feedback: String,
}

impl AppCoordinator {
    pub fn new(session: Session) -> Self {
        let form = session.setup().clone();
        Self {
            session,
            should_quit: false,
            selected: 0,
            form,
            names: Vec::new(),
            input: String::new(),
            card_visible: false,
            feedback: String::new(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Players that can be picked on the current screen.
    pub fn candidates(&self) -> Vec<PlayerId> {
        let roster = self.session.roster();
        match self.session.phase() {
            Phase::RoundStart => match self.session.falafel_vendor() {
                Some(vendor) if self.session.vendor_can_give() => roster
                    .active_ids()
                    .into_iter()
                    .filter(|id| *id != vendor)
                    .collect(),
                _ => Vec::new(),
            },
            Phase::Discussion => self.session.turn_order().to_vec(),
            Phase::Voting { .. } => self.session.turn_order().to_vec(),
            Phase::Revenger { revenger } => roster
                .active_ids()
                .into_iter()
                .filter(|id| id != revenger)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Rows on the current list screen, for cursor bounds.
    fn row_count(&self) -> usize {
        match self.session.phase() {
            Phase::Home => MenuOption::all().len(),
            Phase::Setup => SetupField::all().len(),
            Phase::PlayerNames => self.names.len(),
            // Falafel list ends with a "nobody" row
            Phase::RoundStart if self.session.vendor_can_give() => self.candidates().len() + 1,
            _ => self.candidates().len(),
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        if code == KeyCode::Esc {
            self.on_escape();
            return;
        }

        match code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            _ => {}
        }

        let result = match self.session.phase().clone() {
            Phase::Home => self.home_key(code),
            Phase::Setup => self.setup_key(code),
            Phase::PlayerNames => self.names_key(code),
            Phase::RoleAssignment { .. } => self.reveal_key(code),
            Phase::RoundStart => self.round_start_key(code),
            Phase::Discussion => self.discussion_key(code),
            Phase::Voting { .. } => self.voting_key(code),
            Phase::Revenger { .. } => self.revenger_key(code),
            Phase::MrWhiteGuess { .. } => self.guess_key(code),
            Phase::RoleReveal => self.simple_key(code, Session::continue_after_reveal),
            Phase::Victory { .. } => self.simple_key(code, Session::show_points),
            Phase::Points { .. } => self.simple_key(code, Session::play_again),
        };

        if let Err(e) = result {
            self.feedback = e.to_string();
        }
    }

    /// Esc leaves any game for home; on the home screen it quits.
    fn on_escape(&mut self) {
        if matches!(self.session.phase(), Phase::Home) {
            self.quit();
        } else {
            self.session.return_home();
            self.reset_view();
        }
    }

    fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn move_down(&mut self) {
        if self.selected + 1 < self.row_count() {
            self.selected += 1;
        }
    }

    fn reset_view(&mut self) {
        self.selected = 0;
        self.input.clear();
        self.card_visible = false;
    }

    fn home_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        if code != KeyCode::Enter {
            return Ok(());
        }
        match MenuOption::all().get(self.selected) {
            Some(MenuOption::NewGame) => {
                self.session.begin_setup()?;
                self.form = self.session.setup().clone();
                self.feedback.clear();
                self.reset_view();
            }
            Some(MenuOption::Quit) => self.quit(),
            None => {}
        }
        Ok(())
    }

    fn setup_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        let fields = SetupField::all();
        let Some(field) = fields.get(self.selected).copied() else {
            return Ok(());
        };

        match code {
            KeyCode::Left => self.adjust(field, false),
            KeyCode::Right => self.adjust(field, true),
            KeyCode::Char(' ') => {
                if let SetupField::Special(toggle) = field {
                    let on = self.form.specials.is_enabled(toggle);
                    self.form.specials.set(toggle, !on);
                }
            }
            KeyCode::Enter if field == SetupField::Start => {
                self.session.configure(self.form.clone())?;
                self.names = self.session.roster().names();
                self.feedback.clear();
                self.reset_view();
            }
            _ => {}
        }
        Ok(())
    }

    /// Step a setup value. Counts are not clamped against each other; the
    /// session reports every conflict when the game is started.
    fn adjust(&mut self, field: SetupField, up: bool) {
        let step = |value: usize, max: usize| -> usize {
            if up {
                (value + 1).min(max)
            } else {
                value.saturating_sub(1)
            }
        };
        match field {
            SetupField::Players => {
                self.form.players = step(self.form.players, MAX_PLAYERS).max(MIN_PLAYERS)
            }
            SetupField::Undercover => {
                self.form.undercover = step(self.form.undercover, MAX_PLAYERS)
            }
            SetupField::MrWhite => self.form.mr_white = step(self.form.mr_white, MAX_PLAYERS),
            SetupField::Difficulty => {
                self.form.difficulty = if up {
                    self.form.difficulty.next()
                } else {
                    self.form.difficulty.previous()
                }
            }
            SetupField::Special(toggle) => self.form.specials.set(toggle, up),
            SetupField::Start => {}
        }
    }

    fn names_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(name) = self.names.get_mut(self.selected) {
                    if name.chars().count() < MAX_NAME_LEN {
                        name.push(c);
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(name) = self.names.get_mut(self.selected) {
                    name.pop();
                }
            }
            KeyCode::Tab => self.move_down(),
            KeyCode::Enter => {
                self.session.confirm_names(&self.names)?;
                self.names = self.session.roster().names();
                self.reset_view();
                if self.session.take_fallback_notice() {
                    self.feedback = "Word generator unavailable, using the built-in word list".to_string();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn reveal_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Char(' ') => self.card_visible = !self.card_visible,
            KeyCode::Enter if self.card_visible => {
                self.session.advance_reveal()?;
                self.card_visible = false;
                self.selected = 0;
            }
            _ => {}
        }
        Ok(())
    }

    fn round_start_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        if code != KeyCode::Enter {
            return Ok(());
        }
        if self.session.vendor_can_give() {
            let recipient = self.candidates().get(self.selected).copied();
            self.session.give_falafel(recipient)?;
        } else {
            self.session.begin_discussion()?;
        }
        self.feedback.clear();
        self.selected = 0;
        Ok(())
    }

    fn discussion_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.candidates().get(self.selected).copied() {
                    self.session.mark_clue(id)?;
                    self.move_down();
                }
            }
            KeyCode::Char('v') => {
                self.session.begin_voting()?;
                self.feedback.clear();
                self.selected = 0;
            }
            _ => {}
        }
        Ok(())
    }

    fn voting_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Enter => {
                let Some(target) = self.candidates().get(self.selected).copied() else {
                    return Ok(());
                };
                let outcome = self.session.eliminate(target)?;
                self.feedback = self.describe(&outcome);
                self.reset_view();
            }
            KeyCode::Char('s') => {
                self.session.skip_elimination()?;
                self.feedback = "Nobody was eliminated this round".to_string();
                self.reset_view();
            }
            _ => {}
        }
        Ok(())
    }

    fn describe(&self, outcome: &Elimination) -> String {
        let name = |id: PlayerId| self.session.roster().player(id).name.clone();
        match outcome {
            Elimination::Protected { target } => {
                format!("{} was saved by a falafel! Vote for someone else.", name(*target))
            }
            Elimination::Resolved(report) => {
                let mut text = format!("{} is out.", name(report.primary));
                if report.sabotaged {
                    text.push_str(" Their falafel was sabotaged.");
                }
                for partner in report.chained() {
                    text.push_str(&format!(" {} dies of heartbreak.", name(*partner)));
                }
                for ghost in &report.new_ghosts {
                    text.push_str(&format!(" {} returns as a ghost.", name(*ghost)));
                }
                text
            }
        }
    }

    fn revenger_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Enter => {
                let Some(target) = self.candidates().get(self.selected).copied() else {
                    return Ok(());
                };
                let report = self.session.revenge(target)?;
                self.feedback = self.describe(&Elimination::Resolved(report));
                self.reset_view();
            }
            KeyCode::Char('s') => {
                self.session.skip_revenge()?;
                self.reset_view();
            }
            _ => {}
        }
        Ok(())
    }

    fn guess_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Char(c) if !c.is_control() => {
                if self.input.chars().count() < MAX_GUESS_LEN {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Tab => {
                self.session.skip_guess()?;
                self.feedback = "Mr. White passed on the guess".to_string();
                self.reset_view();
            }
            KeyCode::Enter => {
                let outcome = self.session.submit_guess(&self.input)?;
                self.feedback = match outcome {
                    GuessOutcome::Correct => "Mr. White found the word!".to_string(),
                    GuessOutcome::Wrong => "Wrong guess".to_string(),
                };
                self.reset_view();
            }
            _ => {}
        }
        Ok(())
    }

    fn simple_key(
        &mut self,
        code: KeyCode,
        action: fn(&mut Session) -> Result<(), SessionError>,
    ) -> Result<(), SessionError> {
        if code == KeyCode::Enter {
            action(&mut self.session)?;
            self.feedback.clear();
            self.reset_view();
        }
        Ok(())
    }
}
