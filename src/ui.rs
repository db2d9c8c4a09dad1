//! Layout and drawing: board with the falling piece, sidebar, pause and game over overlays.

use crate::game::{BOARD_COLS, BOARD_ROWS, Cell, Snapshot};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
const OVERLAY_WIDTH: u16 = 24;
const OVERLAY_HEIGHT: u16 = 7;

/// Board size in terminal cells, border included.
fn board_outer_size() -> (u16, u16) {
    (BOARD_COLS as u16 * CELL_WIDTH + 2, BOARD_ROWS as u16 + 2)
}

/// Draw one frame: board and sidebar centred in `frame.area()`, overlay on top if paused or over.
pub fn draw(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme) {
    let area = frame.area();
    let board_area = draw_game(frame, snap, theme, area);
    if snap.game_over || snap.paused {
        draw_overlay(frame, snap, theme, board_area);
    }
}

/// Draw game: board + sidebar; use full area and center both. Returns the board rect.
fn draw_game(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, area: Rect) -> Rect {
    let (bw, bh) = board_outer_size();
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    draw_board(frame, snap, theme, inner[0]);
    draw_sidebar(frame, snap, theme, inner[1]);
    inner[0]
}

fn draw_board(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            " Tetris ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for row in 0..BOARD_ROWS {
        let y = inner.y + row as u16;
        if y >= inner.bottom() {
            break;
        }
        for col in 0..BOARD_COLS {
            let x = inner.x + col as u16 * CELL_WIDTH;
            if x + CELL_WIDTH > inner.right() {
                break;
            }
            let (symbol, style) = match snap.display_cell(row, col) {
                Cell::Block(kind) => {
                    let c = theme.piece_color(kind);
                    ("██", Style::default().fg(c).bg(theme.bg))
                }
                Cell::Empty => (" ·", Style::default().fg(theme.div_line).bg(theme.bg)),
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Score + state
            Constraint::Length(1), // gap
            Constraint::Length(9), // Controls
        ])
        .split(area);

    let (state_label, state_color) = if snap.game_over {
        ("Game Over", Color::Red)
    } else if snap.paused {
        ("Paused", Color::Yellow)
    } else {
        ("Playing", Color::Green)
    };

    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(snap.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("State: ", title_style),
            Span::styled(state_label, Style::default().fg(state_color)),
        ]),
    ];
    Paragraph::new(stats_lines).render(stats_inner, frame.buffer_mut());

    let help_block = sidebar_block(theme).title(Span::styled(" Controls ", title_style));
    let help_inner = help_block.inner(chunks[2]);
    help_block.render(chunks[2], frame.buffer_mut());
    let help_lines: Vec<Line> = [
        ("↑ / k", "Rotate"),
        ("← / h", "Left"),
        ("→ / l", "Right"),
        ("↓ / j", "Down"),
        ("P", "Pause / Resume"),
        ("R", "Reset"),
        ("Q / Esc", "Quit"),
    ]
    .into_iter()
    .map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("{key:<8}"), fg_style),
            Span::styled(what, help_style),
        ])
    })
    .collect();
    Paragraph::new(help_lines).render(help_inner, frame.buffer_mut());
}

/// "Game Over" or "Paused" box centred over the board, with the score and the action button.
fn draw_overlay(frame: &mut Frame, snap: &Snapshot<'_>, theme: &Theme, board: Rect) {
    let popup = Rect {
        x: board.x + board.width.saturating_sub(OVERLAY_WIDTH) / 2,
        y: board.y + board.height.saturating_sub(OVERLAY_HEIGHT) / 2,
        width: OVERLAY_WIDTH.min(board.width),
        height: OVERLAY_HEIGHT.min(board.height),
    };
    let (title, title_style, button) = if snap.game_over {
        (
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
            " Enter — Play Again ",
        )
    } else {
        (
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
            " Enter — Resume ",
        )
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, title_style)),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", snap.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            button,
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .style(Style::default().bg(theme.bg)),
    )
    .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, Session};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn render(session: &Session) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, &session.snapshot(), &theme))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draws_board_and_score() {
        let session = Session::with_seed(1);
        let text = buffer_text(&render(&session));
        assert!(text.contains("Tetris"));
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Playing"));
        assert!(!text.contains("Paused"));
        // Four piece cells, two columns each.
        assert_eq!(text.matches('█').count(), 8);
    }

    #[test]
    fn test_paused_overlay() {
        let session = Session::with_seed(1).step(Command::TogglePause);
        let text = buffer_text(&render(&session));
        assert!(text.contains("Paused"));
        assert!(text.contains("Resume"));
    }

    #[test]
    fn test_game_over_overlay() {
        let mut session = Session::with_seed(5);
        while !session.is_game_over() {
            session.apply(Command::Down);
        }
        let text = buffer_text(&render(&session));
        assert!(text.contains("Game Over"));
        assert!(text.contains("Play Again"));
        assert!(!text.contains("Paused"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(10, 5)).unwrap();
        let session = Session::with_seed(1).step(Command::TogglePause);
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, &session.snapshot(), &theme))
            .unwrap();
    }
}
