//! Maps keyboard and mouse events onto game commands.
//!
//! Three input sources end up as a [`Direction`]: arrow/WASD keys, clicks on
//! the on-screen d-pad, and mouse drags across the terminal (swipes).

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::config::SWIPE_THRESHOLD;
use crate::geometry::Direction;
use crate::ui::CELL_WIDTH;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Start a round, or pause/resume one in progress.
    Select,
    ToggleSound,
    Exit,
}

pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('w') => Command::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Command::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Command::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Command::Turn(Direction::Right),
        KeyCode::Char(' ') | KeyCode::Enter => Command::Select,
        KeyCode::Char('m') => Command::ToggleSound,
        KeyCode::Char('q') | KeyCode::Esc => Command::Exit,
        _ => return None,
    };
    Some(command)
}

/// Direction of a drag of `dx`, `dy` board cells.
///
/// The dominant axis decides, and it has to move strictly further than
/// `threshold` to register.
pub fn swipe_direction(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > threshold {
            Some(Direction::Right)
        } else if dx < -threshold {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy > threshold {
        Some(Direction::Down)
    } else if dy < -threshold {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Remembers where a left-button drag started.
#[derive(Debug, Default, Clone)]
pub struct SwipeTracker {
    origin: Option<Position>,
}

impl SwipeTracker {
    pub fn handle(&mut self, event: MouseEvent) -> Option<Direction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some(Position::new(event.column, event.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let origin = self.origin.take()?;
                let columns = i32::from(event.column) - i32::from(origin.x);
                let rows = i32::from(event.row) - i32::from(origin.y);
                // A board cell is CELL_WIDTH columns wide but one row tall.
                // Pick the axis before truncating to whole cells.
                let cell_width = i32::from(CELL_WIDTH);
                let (dx, dy) = if columns.abs() > rows.abs() * cell_width {
                    (columns / cell_width, 0)
                } else {
                    (0, rows)
                };
                swipe_direction(dx, dy, SWIPE_THRESHOLD)
            }
            _ => None,
        }
    }
}

/// On-screen direction pad, laid out as a plus sign of four buttons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DPad {
    area: Rect,
}

impl DPad {
    pub const WIDTH: u16 = 9;
    pub const HEIGHT: u16 = 3;
    const BUTTON_WIDTH: u16 = 3;

    pub fn new(area: Rect) -> Self {
        DPad { area }
    }

    pub fn buttons(&self) -> [(Direction, Rect); 4] {
        let Rect { x, y, .. } = self.area;
        let w = Self::BUTTON_WIDTH;
        let button =
            |col: u16, row: u16| Rect::new(x + col * w, y + row, w, 1).intersection(self.area);
        [
            (Direction::Up, button(1, 0)),
            (Direction::Left, button(0, 1)),
            (Direction::Right, button(2, 1)),
            (Direction::Down, button(1, 2)),
        ]
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<Direction> {
        let position = Position::new(column, row);
        self.buttons()
            .into_iter()
            .find(|(_, rect)| rect.contains(position))
            .map(|(direction, _)| direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            command_for_key(key(KeyCode::Up)),
            Some(Command::Turn(Direction::Up))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Char('a'))),
            Some(Command::Turn(Direction::Left))
        );
        assert_eq!(command_for_key(key(KeyCode::Char(' '))), Some(Command::Select));
        assert_eq!(command_for_key(key(KeyCode::Char('m'))), Some(Command::ToggleSound));
        assert_eq!(command_for_key(key(KeyCode::Esc)), Some(Command::Exit));
        assert_eq!(command_for_key(key(KeyCode::Char('q'))), Some(Command::Exit));
        assert_eq!(command_for_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_swipe_direction() {
        assert_eq!(swipe_direction(5, 1, 1), Some(Direction::Right));
        assert_eq!(swipe_direction(-5, 2, 1), Some(Direction::Left));
        assert_eq!(swipe_direction(1, 4, 1), Some(Direction::Down));
        assert_eq!(swipe_direction(0, -3, 1), Some(Direction::Up));

        // Must strictly exceed the threshold
        assert_eq!(swipe_direction(1, 0, 1), None);
        assert_eq!(swipe_direction(0, -1, 1), None);
        assert_eq!(swipe_direction(0, 0, 1), None);
    }

    #[test]
    fn test_swipe_tracker() {
        let mut tracker = SwipeTracker::default();

        assert_eq!(tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5)), None);
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 20, 6)),
            Some(Direction::Right)
        );

        // Release without a press is ignored
        assert_eq!(tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0)), None);

        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 11, 4)),
            Some(Direction::Up)
        );

        // Two and a half cells across beats two cells down
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5));
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 15, 7)),
            Some(Direction::Right)
        );

        // Two cells down beats one and a half across
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5));
        assert_eq!(
            tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 7, 7)),
            Some(Direction::Down)
        );
    }

    #[test]
    fn test_short_horizontal_drag_is_not_a_swipe() {
        let mut tracker = SwipeTracker::default();

        // Three columns is a single board cell
        tracker.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5));
        assert_eq!(tracker.handle(mouse(MouseEventKind::Up(MouseButton::Left), 13, 5)), None);
    }

    #[test]
    fn test_dpad_hit() {
        let pad = DPad::new(Rect::new(40, 10, DPad::WIDTH, DPad::HEIGHT));

        assert_eq!(pad.hit(43, 10), Some(Direction::Up));
        assert_eq!(pad.hit(40, 11), Some(Direction::Left));
        assert_eq!(pad.hit(48, 11), Some(Direction::Right));
        assert_eq!(pad.hit(45, 12), Some(Direction::Down));

        // Centre and corners are dead space
        assert_eq!(pad.hit(44, 11), None);
        assert_eq!(pad.hit(40, 10), None);
        assert_eq!(pad.hit(0, 0), None);
    }

    #[test]
    fn test_default_dpad_hits_nothing() {
        let pad = DPad::default();
        assert_eq!(pad.hit(0, 0), None);
    }
}
