//! UI rendering using ratatui
//!
//! One screen per session phase:
//! - Home and Setup
//! - PlayerNames
//! - RoleAssignment (private card view)
//! - RoundStart, Discussion, Voting
//! - Revenger and MrWhiteGuess
//! - RoleReveal, Victory, Points

use crate::app::{AppCoordinator, MenuOption, Phase, SetupField};
use crate::game::player::{Player, PlayerId, Role, SpecialRole};
use crate::game::scoring::{PointAward, Winner};
use crate::game::setup::GameSetup;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Render the screen for the current phase
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match coordinator.session.phase() {
        Phase::Home => render_home(frame, coordinator.selected),
        Phase::Setup => render_setup(frame, coordinator),
        Phase::PlayerNames => render_names(frame, coordinator),
        Phase::RoleAssignment { cursor } => render_role_card(frame, coordinator, *cursor),
        Phase::RoundStart => render_round_start(frame, coordinator),
        Phase::Discussion => render_discussion(frame, coordinator),
        Phase::Voting { protected } => render_voting(frame, coordinator, *protected),
        Phase::Revenger { revenger } => render_revenger(frame, coordinator, *revenger),
        Phase::MrWhiteGuess { guesser } => render_guess(frame, coordinator, *guesser),
        Phase::RoleReveal => render_role_reveal(frame, coordinator),
        Phase::Victory { winner } => render_victory(frame, coordinator, *winner),
        Phase::Points { awards, .. } => render_points(frame, coordinator, awards),
    }
}

/// Header, body, feedback line, footer
fn screen_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Body
            Constraint::Length(2), // Feedback
            Constraint::Length(1), // Footer
        ])
        .margin(1)
        .split(area)
}

fn render_header(frame: &mut Frame, area: Rect, title: &str, color: Color) {
    let header = Paragraph::new(title.to_string())
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: &str) {
    let widget = Paragraph::new(feedback.to_string())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, area: Rect, keys: &str) {
    let footer = Paragraph::new(keys.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

/// Selectable list with a `> ` marker on the highlighted row
fn selectable_list<'a>(rows: Vec<String>, selected: usize, title: &'a str) -> List<'a> {
    let items: Vec<ListItem> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, row)).style(style)
        })
        .collect();

    List::new(items).block(Block::default().borders(Borders::ALL).title(title))
}

fn player_label(player: &Player) -> String {
    format!("{} {}", player.avatar, player.name)
}

fn render_home(frame: &mut Frame, selected: usize) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo
            Constraint::Length(2), // Tagline
            Constraint::Min(4),    // Menu options
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = r#"
 _   _ _  _ ___  ___ ___  ___ _____   _____ ___
| | | | \| |   \| __| _ \/ __/ _ \ \ / / __| _ \
| |_| | .` | |) | _||   / (_| (_) \ V /| _||   /
 \___/|_|\_|___/|___|_|_\\___\___/ \_/ |___|_|_\
"#;
    let logo_widget = Paragraph::new(logo)
        .style(Style::default().fg(Color::Magenta).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo_widget, layout[0]);

    let tagline = Paragraph::new("One device. One secret word. Who is faking it?")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(tagline, layout[1]);

    let rows = MenuOption::all()
        .iter()
        .map(|opt| opt.label().to_string())
        .collect();
    frame.render_widget(selectable_list(rows, selected, ""), layout[2]);

    render_footer(frame, layout[3], "↑↓ Navigate  Enter Select  Esc Quit");
}

fn setup_row(form: &GameSetup, field: SetupField) -> String {
    let on_off = |on: bool| if on { "[x]" } else { "[ ]" };
    match field {
        SetupField::Players => format!("Players       < {} >", form.players),
        SetupField::Undercover => format!("Undercover    < {} >", form.undercover),
        SetupField::MrWhite => format!("Mr. White     < {} >", form.mr_white),
        SetupField::Difficulty => format!("Difficulty    < {} >", form.difficulty),
        SetupField::Special(toggle) => format!(
            "{} {} (min {})",
            on_off(form.specials.is_enabled(toggle)),
            toggle.label(),
            toggle.min_players()
        ),
        SetupField::Start => "Start game".to_string(),
    }
}

fn render_setup(frame: &mut Frame, coordinator: &AppCoordinator) {
    let layout = screen_layout(frame.area());
    render_header(frame, layout[0], "Game Setup", Color::Cyan);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(layout[1]);

    let form = &coordinator.form;
    let rows = SetupField::all()
        .into_iter()
        .map(|field| setup_row(form, field))
        .collect();
    frame.render_widget(selectable_list(rows, coordinator.selected, "Settings"), body[0]);

    // Live validation
    let issues = form.validate();
    let (text, color) = if issues.is_empty() {
        (format!("{} civilians. Ready to play.", form.civilians()), Color::Green)
    } else {
        (
            issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            Color::Red,
        )
    };
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(color)), body[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(
        frame,
        layout[3],
        "↑↓ Field  ←→ Change  Space Toggle  Enter Start  Esc Home",
    );
}

fn render_names(frame: &mut Frame, coordinator: &AppCoordinator) {
    let layout = screen_layout(frame.area());
    render_header(frame, layout[0], "Who is playing?", Color::Cyan);

    let rows = coordinator
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cursor = if i == coordinator.selected { "_" } else { "" };
            format!("Seat {:>2}: {}{}", i + 1, name, cursor)
        })
        .collect();
    frame.render_widget(selectable_list(rows, coordinator.selected, "Names"), layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "Type to edit  ↑↓/Tab Seat  Enter Deal roles  Esc Home");
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::Civilian => "Find and eliminate the infiltrators!",
        Role::Undercover => "Blend in and survive!",
        Role::MrWhite => "You have no word. Listen carefully and adapt!",
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::Civilian => Color::Blue,
        Role::Undercover => Color::Red,
        Role::MrWhite => Color::Gray,
    }
}

/// Lines describing a player's special tags, for their private card
fn special_lines(coordinator: &AppCoordinator, player: &Player) -> Vec<Line<'static>> {
    let roster = coordinator.session.roster();
    player
        .special_roles
        .iter()
        .map(|special| {
            let text = match special {
                SpecialRole::Lover => {
                    let partner = player
                        .lover
                        .map(|id| roster.player(id).name.clone())
                        .unwrap_or_default();
                    format!("Lover: you live and die with {}", partner)
                }
                SpecialRole::Goddess => {
                    "Goddess of Justice: your vote breaks ties".to_string()
                }
                SpecialRole::Revenger => {
                    "Revenger: take someone with you when you fall".to_string()
                }
                SpecialRole::Ghost => "Ghost: you keep voting after elimination".to_string(),
                SpecialRole::FalafelVendor => {
                    "Falafel Vendor: hand out one falafel each round".to_string()
                }
            };
            Line::from(text).style(Style::default().fg(Color::Magenta))
        })
        .collect()
}

fn render_role_card(frame: &mut Frame, coordinator: &AppCoordinator, cursor: usize) {
    let layout = screen_layout(frame.area());
    let session = &coordinator.session;
    let total = session.roster().len();
    render_header(
        frame,
        layout[0],
        &format!("Role cards ({} of {})", cursor + 1, total),
        Color::Cyan,
    );

    let Some(player) = session.current_reveal().map(|id| session.roster().player(id)) else {
        return;
    };

    let mut lines = vec![
        Line::from(player_label(player)).style(Style::default().bold()),
        Line::from(""),
    ];
    if coordinator.card_visible {
        lines.push(
            Line::from(player.role.label()).style(Style::default().fg(role_color(player.role)).bold()),
        );
        lines.push(Line::from(role_description(player.role)));
        lines.push(Line::from(""));
        match &player.word {
            Some(word) => lines.push(
                Line::from(format!("Your word: {}", word)).style(Style::default().fg(Color::Yellow).bold()),
            ),
            None => lines.push(Line::from("No word for you.").style(Style::default().fg(Color::Gray))),
        }
        lines.push(Line::from(""));
        lines.extend(special_lines(coordinator, player));
    } else {
        lines.push(Line::from("Make sure no one else is looking!"));
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(card, layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    let keys = if coordinator.card_visible {
        "Space Hide  Enter Next player  Esc Home"
    } else {
        "Space Show my card  Esc Home"
    };
    render_footer(frame, layout[3], keys);
}

fn render_round_start(frame: &mut Frame, coordinator: &AppCoordinator) {
    let layout = screen_layout(frame.area());
    let session = &coordinator.session;
    let roster = session.roster();
    render_header(frame, layout[0], &format!("Round {}", session.round()), Color::Cyan);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(layout[1]);

    let meme = match session.mr_meme() {
        Some(id) => format!(
            "{} is Mr. Meme this round: gestures only, no words!",
            roster.player(id).name
        ),
        None => String::new(),
    };
    frame.render_widget(
        Paragraph::new(meme).style(Style::default().fg(Color::Magenta)).alignment(Alignment::Center),
        body[0],
    );

    let keys = match session.falafel_vendor() {
        Some(vendor) if session.vendor_can_give() => {
            let mut rows: Vec<String> = coordinator
                .candidates()
                .iter()
                .map(|id| player_label(roster.player(*id)))
                .collect();
            rows.push("Nobody this round".to_string());
            let title = format!("{}, who gets your falafel?", roster.player(vendor).name);
            frame.render_widget(selectable_list(rows, coordinator.selected, &title), body[1]);
            "↑↓ Choose  Enter Give  Esc Home"
        }
        _ => "Enter Start discussion  Esc Home",
    };

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], keys);
}

fn render_discussion(frame: &mut Frame, coordinator: &AppCoordinator) {
    let layout = screen_layout(frame.area());
    let session = &coordinator.session;
    let roster = session.roster();
    render_header(
        frame,
        layout[0],
        &format!("Round {}: give your clues", session.round()),
        Color::Cyan,
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(layout[1]);

    let rows = session
        .turn_order()
        .iter()
        .map(|id| {
            let player = roster.player(*id);
            let done = if player.has_given_clue { "✓" } else { " " };
            let meme = if session.mr_meme() == Some(*id) { " (Mr. Meme)" } else { "" };
            format!("{} {}{}", done, player_label(player), meme)
        })
        .collect();
    frame.render_widget(selectable_list(rows, coordinator.selected, "Speaking order"), body[0]);

    render_side_panel(frame, body[1], coordinator);

    render_feedback(frame, layout[2], &coordinator.feedback);
    let footer = if session.all_clues_given() {
        "Everyone has spoken  v Vote  Esc Home"
    } else {
        "↑↓ Player  Enter Clue given  v Vote  Esc Home"
    };
    render_footer(frame, layout[3], footer);
}

/// Goddess reminder and ghost voters
fn render_side_panel(frame: &mut Frame, area: Rect, coordinator: &AppCoordinator) {
    let session = &coordinator.session;
    let roster = session.roster();
    let mut lines = Vec::new();

    if let Some(goddess) = session.goddess() {
        lines.push(Line::from("Goddess of Justice").style(Style::default().fg(Color::Yellow).bold()));
        lines.push(Line::from(format!(
            "{}'s vote counts double on a tie, even once out. She cannot break a tie in her own favour.",
            roster.player(goddess).name
        )));
        lines.push(Line::from(""));
    }

    let ghosts = session.ghost_voters();
    if !ghosts.is_empty() {
        lines.push(Line::from("Ghost voters").style(Style::default().fg(Color::Gray).bold()));
        for id in ghosts {
            lines.push(Line::from(format!("👻 {}", roster.player(id).name)));
        }
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Table"));
    frame.render_widget(panel, area);
}

fn render_voting(frame: &mut Frame, coordinator: &AppCoordinator, protected: Option<PlayerId>) {
    let layout = screen_layout(frame.area());
    let session = &coordinator.session;
    let roster = session.roster();
    render_header(frame, layout[0], "Vote: who is out?", Color::Red);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(layout[1]);

    let rows = coordinator
        .candidates()
        .iter()
        .map(|id| {
            let shield = if protected == Some(*id) { " 🥙 saved" } else { "" };
            format!("{}{}", player_label(roster.player(*id)), shield)
        })
        .collect();
    frame.render_widget(selectable_list(rows, coordinator.selected, "Candidates"), body[0]);
    render_side_panel(frame, body[1], coordinator);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "↑↓ Player  Enter Eliminate  s No elimination  Esc Home");
}

fn render_revenger(frame: &mut Frame, coordinator: &AppCoordinator, revenger: PlayerId) {
    let layout = screen_layout(frame.area());
    let roster = coordinator.session.roster();
    render_header(
        frame,
        layout[0],
        &format!("{} is the Revenger!", roster.player(revenger).name),
        Color::Red,
    );

    let rows = coordinator
        .candidates()
        .iter()
        .map(|id| player_label(roster.player(*id)))
        .collect();
    frame.render_widget(
        selectable_list(rows, coordinator.selected, "Who do you take with you?"),
        layout[1],
    );

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "↑↓ Player  Enter Take revenge  s Spare everyone  Esc Home");
}

fn render_guess(frame: &mut Frame, coordinator: &AppCoordinator, guesser: PlayerId) {
    let layout = screen_layout(frame.area());
    let roster = coordinator.session.roster();
    render_header(
        frame,
        layout[0],
        &format!("{} was Mr. White!", roster.player(guesser).name),
        Color::Gray,
    );

    let lines = vec![
        Line::from("One chance: guess the civilians' word."),
        Line::from("Get it right and the infiltrators win."),
        Line::from(""),
        Line::from(format!("> {}_", coordinator.input)).style(Style::default().fg(Color::Cyan).bold()),
    ];
    let prompt = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(prompt, layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "Type your guess  Enter Submit  Tab Skip  Esc Home");
}

fn render_role_reveal(frame: &mut Frame, coordinator: &AppCoordinator) {
    let layout = screen_layout(frame.area());
    let roster = coordinator.session.roster();
    let title = match coordinator.session.eliminated() {
        Some(id) => format!("Roles revealed, {} was voted out", roster.player(id).name),
        None => "Roles revealed".to_string(),
    };
    render_header(frame, layout[0], &title, Color::Cyan);

    let items: Vec<ListItem> = coordinator
        .session
        .pending_eliminations()
        .iter()
        .map(|id| {
            let player = roster.player(*id);
            let ghost = if player.is_ghost { " (ghost)" } else { "" };
            ListItem::new(format!(
                "  {} was {}{}",
                player_label(player),
                player.role.label(),
                ghost
            ))
            .style(Style::default().fg(role_color(player.role)))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Eliminated"));
    frame.render_widget(list, layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "Enter Continue  Esc Home");
}

fn render_victory(frame: &mut Frame, coordinator: &AppCoordinator, winner: Winner) {
    let layout = screen_layout(frame.area());
    let session = &coordinator.session;
    let (title, color) = match winner {
        Winner::Civilians => ("Civilians Victory! The infiltrators have been exposed!", Color::Blue),
        Winner::Infiltrators => ("Infiltrators Victory!", Color::Red),
    };
    render_header(frame, layout[0], title, color);

    let mut lines = Vec::new();
    if let Some(pair) = session.word_pair() {
        lines.push(Line::from(format!("Civilian word: {}", pair.civilian)));
        lines.push(Line::from(format!("Undercover word: {}", pair.undercover)));
        lines.push(Line::from(pair.relationship.clone()).style(Style::default().fg(Color::DarkGray)));
        lines.push(Line::from(""));
    }
    for player in session.roster().players() {
        let status = if player.is_alive { "alive" } else { "out" };
        lines.push(
            Line::from(format!("{}  {}  ({})", player_label(player), player.role.label(), status))
                .style(Style::default().fg(role_color(player.role))),
        );
    }

    let summary = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(summary, layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "Enter Points  Esc Home");
}

fn render_points(frame: &mut Frame, coordinator: &AppCoordinator, awards: &[PointAward]) {
    let layout = screen_layout(frame.area());
    let roster = coordinator.session.roster();
    render_header(
        frame,
        layout[0],
        &format!("Points after game {}", coordinator.session.game_number()),
        Color::Yellow,
    );

    let mut sorted: Vec<&PointAward> = awards.iter().collect();
    sorted.sort_by(|a, b| b.total.cmp(&a.total));

    let items: Vec<ListItem> = sorted
        .iter()
        .enumerate()
        .map(|(rank, award)| {
            let player = roster.player(award.player);
            ListItem::new(format!(
                "  {}. {:<20} {:>3}  (+{} as {})",
                rank + 1,
                player_label(player),
                award.total,
                award.earned,
                award.role.label()
            ))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Leaderboard"));
    frame.render_widget(list, layout[1]);

    render_feedback(frame, layout[2], &coordinator.feedback);
    render_footer(frame, layout[3], "Enter Play again  Esc Home");
}
