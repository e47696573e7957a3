use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::engine::{Ending, GameState, Snapshot};
use crate::geometry::{Direction, Pos};
use crate::input::DPad;

/// Terminal columns per board cell, so cells come out roughly square.
pub const CELL_WIDTH: u16 = 2;

const HEAD_COLOR: Color = Color::Rgb(0, 255, 65);
const BODY_COLOR: Color = Color::Rgb(0, 204, 51);
const FOOD_COLOR: Color = Color::Rgb(255, 107, 53);
const SCORE_COLOR: Color = Color::Rgb(244, 197, 66);

/// What the driver wants on screen this frame.
pub struct Screen<'a> {
    pub snapshot: &'a Snapshot,
    pub paused: bool,
    pub sound_on: bool,
}

/// Draws a full frame and returns where the d-pad ended up.
pub fn draw(frame: &mut Frame, screen: &Screen) -> DPad {
    let [hud_area, game_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(frame.area());

    frame.render_widget(
        Paragraph::new(hud_text(screen))
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL)),
        hud_area,
    );

    let size = screen.snapshot.size;
    let board_width = size.width * CELL_WIDTH + 2;
    let board_height = size.height + 2;

    let [board_column, pad_column] = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(DPad::WIDTH),
    ])
    .flex(Flex::Center)
    .spacing(3)
    .areas(game_area);
    let [board_area] = Layout::vertical([Constraint::Length(board_height)])
        .flex(Flex::Center)
        .areas(board_column);
    let [pad_area] = Layout::vertical([Constraint::Length(DPad::HEIGHT)])
        .flex(Flex::Center)
        .areas(pad_column);

    let block = Block::default()
        .title(board_title(screen))
        .borders(Borders::ALL);
    let inner_area = block.inner(board_area);
    frame.render_widget(block, board_area);
    frame.render_widget(screen.snapshot, inner_area);

    if let Some(text) = overlay_text(screen.snapshot) {
        let lines = text.lines().count() as u16;
        let [text_area] = Layout::vertical([Constraint::Length(lines)])
            .flex(Flex::Center)
            .areas(inner_area);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(SCORE_COLOR).bold()),
            text_area,
        );
    }

    let pad = DPad::new(pad_area);
    frame.render_widget(pad, pad_area);
    pad
}

fn hud_text(screen: &Screen) -> String {
    let snapshot = screen.snapshot;
    let sfx = if screen.sound_on { "SFX on" } else { "SFX off" };
    match snapshot.state {
        GameState::Idle => format!("SNEK    High Score: {}    {}", snapshot.high_score, sfx),
        _ => format!(
            "SNEK    High Score: {}    Score: {}    Speed: {}ms    {}",
            snapshot.high_score,
            snapshot.score,
            snapshot.interval.as_millis(),
            sfx
        ),
    }
}

fn board_title(screen: &Screen) -> &'static str {
    match screen.snapshot.state {
        GameState::Running if screen.paused => "Paused. Press SPACE to continue",
        GameState::Running => "Playing",
        GameState::Idle => "Snake",
        GameState::GameOver(_) => "Press SPACE to play again",
    }
}

fn overlay_text(snapshot: &Snapshot) -> Option<String> {
    match snapshot.state {
        GameState::Idle => Some("SNAKE\nPRESS START\n(SPACE)".to_string()),
        GameState::Running => None,
        GameState::GameOver(Ending::BoardCleared) => Some(format!(
            "BOARD CLEARED\nSCORE: {}\nINSERT COIN",
            snapshot.score
        )),
        GameState::GameOver(_) => Some(format!(
            "GAME OVER\nSCORE: {}\nINSERT COIN",
            snapshot.score
        )),
    }
}

fn paint(area: Rect, buf: &mut Buffer, pos: Pos, symbol: &str, style: Style) {
    let x = pos.x * CELL_WIDTH;
    if x + CELL_WIDTH > area.width || pos.y >= area.height {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + x, area.y + pos.y)) {
        cell.set_symbol(symbol).set_style(style);
    }
    // Second column of the cell keeps the colour but no glyph
    if let Some(cell) = buf.cell_mut((area.x + x + 1, area.y + pos.y)) {
        cell.set_symbol(" ").set_style(style);
    }
}

impl Widget for &Snapshot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let faint = Style::default().fg(Color::DarkGray);
        for pos in self.size.positions() {
            paint(area, buf, pos, "·", faint);
        }

        if let Some(food) = self.food {
            paint(area, buf, food, "●", Style::default().fg(FOOD_COLOR));
        }

        let mut segments = self.snake.iter();
        if let Some(&head) = segments.next() {
            for &pos in segments {
                paint(area, buf, pos, " ", Style::default().bg(BODY_COLOR));
            }
            // Head last so a collision shows it on top
            paint(area, buf, head, " ", Style::default().bg(HEAD_COLOR));
        }
    }
}

impl Widget for DPad {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Black).bg(Color::Gray);
        for (direction, rect) in self.buttons() {
            let arrow = match direction {
                Direction::Up => "▲",
                Direction::Down => "▼",
                Direction::Left => "◀",
                Direction::Right => "▶",
            };
            Paragraph::new(arrow)
                .alignment(Alignment::Center)
                .style(style)
                .render(rect, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use std::time::Duration;

    fn snapshot(state: GameState) -> Snapshot {
        Snapshot {
            state,
            size: Size::square(4),
            snake: vec![Pos::new(2, 1), Pos::new(1, 1), Pos::new(0, 1)],
            direction: Direction::Right,
            food: Some(Pos::new(3, 3)),
            score: 30,
            interval: Duration::from_millis(135),
            high_score: 90,
        }
    }

    #[test]
    fn test_board_rendering() {
        let snapshot = snapshot(GameState::Running);
        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);

        (&snapshot).render(area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "·");
        assert_eq!(buf[(6, 3)].symbol(), "●");
        assert_eq!(buf[(4, 1)].bg, HEAD_COLOR);
        assert_eq!(buf[(5, 1)].bg, HEAD_COLOR);
        assert_eq!(buf[(0, 1)].bg, BODY_COLOR);
        assert_eq!(buf[(2, 1)].bg, BODY_COLOR);
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let snapshot = snapshot(GameState::Running);
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);

        (&snapshot).render(area, &mut buf);
        assert_eq!(buf[(0, 1)].bg, BODY_COLOR);
    }

    #[test]
    fn test_overlays() {
        assert!(overlay_text(&snapshot(GameState::Running)).is_none());
        assert!(overlay_text(&snapshot(GameState::Idle))
            .is_some_and(|t| t.contains("PRESS START")));

        let over = overlay_text(&snapshot(GameState::GameOver(Ending::HitWall)));
        assert_eq!(over.as_deref(), Some("GAME OVER\nSCORE: 30\nINSERT COIN"));

        let cleared = overlay_text(&snapshot(GameState::GameOver(Ending::BoardCleared)));
        assert!(cleared.is_some_and(|t| t.starts_with("BOARD CLEARED")));
    }

    #[test]
    fn test_hud() {
        let snapshot = snapshot(GameState::Running);
        let screen = Screen {
            snapshot: &snapshot,
            paused: false,
            sound_on: false,
        };
        assert_eq!(
            hud_text(&screen),
            "SNEK    High Score: 90    Score: 30    Speed: 135ms    SFX off"
        );
        assert_eq!(board_title(&screen), "Playing");

        let paused = Screen {
            paused: true,
            ..screen
        };
        assert!(board_title(&paused).starts_with("Paused"));
    }
}
