use crate::{
    TOKEN_CAPACITY,
    client::AppSnapshot,
    state::{
        Affordance,
        claim_units,
        format_whole_tokens,
    },
};
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::io::stdout;

pub enum UserEvent {
    Quit,
    Connect,
    ConfirmMint(u64),
    Claim,
    Withdraw,
    OpenMintModal,
    Redraw,
}

#[derive(Debug)]
pub struct UiState {
    mode: Mode,
    affordance: Affordance,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            affordance: Affordance::Connect,
            terminal: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    MintModal(MintState),
    QuitModal,
}

#[derive(Clone, Debug, Default)]
struct MintState {
    amount: u64,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    // cache the affordance so key handling matches what is on screen
    state.affordance = snap.affordance;
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub async fn next_event(state: &mut UiState) -> Result<UserEvent> {
    loop {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press { continue; }
            match &mut state.mode {
                Mode::MintModal(ms) => {
                    match k.code {
                        KeyCode::Esc => { state.mode = Mode::Normal; return Ok(UserEvent::Redraw); }
                        KeyCode::Enter => {
                            // the affordance stays disabled until the amount is positive
                            if ms.amount == 0 { return Ok(UserEvent::Redraw); }
                            let amount = ms.amount;
                            state.mode = Mode::Normal;
                            return Ok(UserEvent::ConfirmMint(amount));
                        }
                        KeyCode::Up | KeyCode::Char('+') => { ms.amount = ms.amount.saturating_add(1); return Ok(UserEvent::Redraw); }
                        KeyCode::Down | KeyCode::Char('-') => { ms.amount = ms.amount.saturating_sub(1); return Ok(UserEvent::Redraw); }
                        KeyCode::Backspace => { ms.amount /= 10; return Ok(UserEvent::Redraw); }
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            let d = u64::from(c.to_digit(10).unwrap_or(0));
                            ms.amount = ms.amount.saturating_mul(10).saturating_add(d);
                            return Ok(UserEvent::Redraw);
                        }
                        _ => {}
                    }
                }
                Mode::QuitModal => {
                    match k.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => { return Ok(UserEvent::Quit); }
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => { state.mode = Mode::Normal; return Ok(UserEvent::Redraw); }
                        _ => {}
                    }
                }
                Mode::Normal => {
                    return Ok(match k.code {
                        KeyCode::Char('q') | KeyCode::Esc => { state.mode = Mode::QuitModal; UserEvent::Redraw }
                        KeyCode::Char('c') => UserEvent::Connect,
                        KeyCode::Char('m') if matches!(state.affordance, Affordance::Mint) => {
                            state.mode = Mode::MintModal(MintState::default());
                            UserEvent::OpenMintModal
                        }
                        KeyCode::Enter => match state.affordance {
                            Affordance::Connect => UserEvent::Connect,
                            Affordance::Withdraw => UserEvent::Withdraw,
                            Affordance::Claim { .. } => UserEvent::Claim,
                            Affordance::Mint => {
                                state.mode = Mode::MintModal(MintState::default());
                                UserEvent::OpenMintModal
                            }
                            // nothing to trigger while a transaction is pending
                            Affordance::InProgress(_) => continue,
                        },
                        _ => continue,
                    });
                }
            }
        }
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // status
            Constraint::Length(5), // action
            Constraint::Length(4), // errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_status(f, chunks[0], snap);
    draw_action(f, chunks[1], snap);
    draw_errors(f, chunks[2], snap);
    draw_help(f, chunks[3]);
    draw_modals(f, state);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let wallet_line = match &snap.session {
        Some(session) => {
            let role = if session.is_owner { " (owner)" } else { "" };
            format!(
                "Balance: {} tokens | Minted: {} / {}{}",
                format_whole_tokens(snap.accounting.balance),
                format_whole_tokens(snap.accounting.total_minted),
                TOKEN_CAPACITY,
                role,
            )
        }
        None => String::from("Connect a wallet to mint or claim tokens"),
    };
    let status = Paragraph::new(format!("{}\n{}", wallet_line, snap.status))
        .block(Block::default().borders(Borders::ALL).title("Devs Token"));
    f.render_widget(status, area);
}

fn draw_action(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let (title, lines) = match snap.affordance {
        Affordance::Connect => (
            "Connect",
            vec![Line::from("Press c or Enter to connect your wallet")],
        ),
        Affordance::InProgress(pending) => (
            "In progress",
            vec![Line::styled(
                format!("Waiting for confirmation ({})...", pending.label()),
                Style::default().fg(Color::DarkGray),
            )],
        ),
        Affordance::Withdraw => (
            "Withdraw",
            vec![Line::from("Press Enter to withdraw the contract funds")],
        ),
        Affordance::Claim { claimable } => (
            "Claim",
            vec![
                Line::styled(
                    format!("{} token units can be claimed!", claim_units(claimable)),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Line::from("Press Enter to claim"),
            ],
        ),
        Affordance::Mint => (
            "Mint",
            vec![Line::from("Press m to choose an amount and mint tokens")],
        ),
    };
    let action =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(action, area);
}

fn draw_errors(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines: Vec<Line> = Vec::new();
    if snap.errors.is_empty() {
        lines.push(Line::from("No errors"));
    } else {
        for e in &snap.errors { lines.push(Line::from(e.clone())); }
    }
    let color = if snap.errors.is_empty() { Color::Green } else { Color::Red };
    let errors = Paragraph::new(lines)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Errors"));
    f.render_widget(errors, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "c connect | Enter act | m mint amount | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::MintModal(ms) => {
            let area = centered_rect(40, 30, f.area());
            let block = Block::default().borders(Borders::ALL).title("Mint Tokens");
            let hint = if ms.amount == 0 {
                "enter a positive amount to enable minting"
            } else {
                "Enter=mint Esc=cancel"
            };
            let p = Paragraph::new(format!(
                "Amount of tokens: {}\n{}\n+/- or digits to edit",
                ms.amount, hint
            ));
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}
