use battlesnake_api::{Match, MatchStatus, Placement, PlayerId, Tournament};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::ui::bracket_layout::{Connector, MatchNode, MatchRect, RenderPlan};

// ---------------------------------------------------------------------------
// Player colours
// ---------------------------------------------------------------------------

/// Keyed by raw player id, so a snake keeps its colour from round to round.
pub const SNAKE_PALETTE: [Color; 8] = [
    Color::LightYellow,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightRed,
    Color::Magenta,
    Color::LightMagenta,
    Color::LightCyan,
    Color::Rgb(255, 167, 38),
];

pub fn snake_color(id: PlayerId) -> Color {
    SNAKE_PALETTE[(id.0 % SNAKE_PALETTE.len() as u64) as usize]
}

const WINNER_MARK: &str = " ★";
const RUNNER_UP_MARK: &str = " ☆";

// ---------------------------------------------------------------------------
// Projection from layout units to terminal cells
// ---------------------------------------------------------------------------

/// How many layout units one terminal column / row covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub units_per_col: f64,
    pub units_per_row: f64,
}

impl Default for CellScale {
    fn default() -> Self {
        // 300x100 boxes become 30 columns and 4 rows per player.
        Self { units_per_col: 10.0, units_per_row: 25.0 }
    }
}

impl CellScale {
    pub fn col(&self, x: f64) -> i32 {
        (x / self.units_per_col).round() as i32
    }

    pub fn row(&self, y: f64) -> i32 {
        (y / self.units_per_row).round() as i32
    }

    /// Size of the whole plan in cells, including boxes that hang below the
    /// nominal height.
    pub fn extent(&self, plan: &RenderPlan) -> (u16, u16) {
        let bottom = plan
            .nodes
            .iter()
            .map(|n| n.rect.bottom())
            .fold(plan.height, f64::max);
        (
            self.col(plan.width).clamp(0, u16::MAX as i32) as u16,
            self.row(bottom).clamp(0, u16::MAX as i32) as u16,
        )
    }

    fn cells(&self, rect: &MatchRect) -> (i32, i32, i32, i32) {
        let left = self.col(rect.x);
        let top = self.row(rect.y);
        let right = (self.col(rect.right()) - 1).max(left + 1);
        let bottom = (self.row(rect.bottom()) - 1).max(top + 1);
        (left, top, right, bottom)
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Draws a [`RenderPlan`] with box-drawing connectors between rounds.
pub struct BracketView<'a> {
    pub tournament: &'a Tournament,
    pub plan: &'a RenderPlan,
    pub scale: CellScale,
    /// Horizontal scroll in terminal columns.
    pub scroll_x: u16,
    /// Vertical scroll in terminal rows.
    pub scroll_y: u16,
}

impl<'a> BracketView<'a> {
    /// Map a plan-relative cell to an absolute screen position, if visible.
    fn screen(&self, area: Rect, col: i32, row: i32) -> Option<(u16, u16)> {
        let x = col - self.scroll_x as i32;
        let y = row - self.scroll_y as i32;
        if x < 0 || y < 0 || x >= area.width as i32 || y >= area.height as i32 {
            return None;
        }
        Some((area.x + x as u16, area.y + y as u16))
    }

    fn put(&self, buf: &mut Buffer, area: Rect, col: i32, row: i32, ch: char, style: Style) {
        if let Some((x, y)) = self.screen(area, col, row) {
            put_char(buf, x, y, ch, style);
        }
    }

    fn put_str(&self, buf: &mut Buffer, area: Rect, col: i32, row: i32, text: &str, width: usize, style: Style) {
        for (offset, ch) in text.chars().take(width).enumerate() {
            self.put(buf, area, col + offset as i32, row, ch, style);
        }
    }

    /// Draw a line glyph, merging it with any line already in the cell.
    fn put_line(&self, buf: &mut Buffer, area: Rect, col: i32, row: i32, ch: char, style: Style) {
        if let Some((x, y)) = self.screen(area, col, row) {
            let existing = buf.cell((x, y)).and_then(|c| c.symbol().chars().next());
            put_char(buf, x, y, merge_junction(existing, ch), style);
        }
    }

    fn draw_connector(&self, connector: &Connector, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Rgb(139, 92, 246));
        let [start, bend, _, end] = connector.points;
        let row_a = self.scale.row(start.y);
        let row_b = self.scale.row(end.y);
        let mid = self.scale.col(bend.x);

        for col in self.scale.col(start.x)..mid {
            self.put_line(buf, area, col, row_a, '─', style);
        }
        for col in (mid + 1)..self.scale.col(end.x) {
            self.put_line(buf, area, col, row_b, '─', style);
        }

        if row_a == row_b {
            self.put_line(buf, area, mid, row_a, '─', style);
            return;
        }

        let (top, bottom) = if row_a < row_b { (row_a, row_b) } else { (row_b, row_a) };
        for row in (top + 1)..bottom {
            self.put_line(buf, area, mid, row, '│', style);
        }
        let (turn, join) = if row_a < row_b { ('┐', '└') } else { ('┘', '┌') };
        self.put_line(buf, area, mid, row_a, turn, style);
        self.put_line(buf, area, mid, row_b, join, style);
    }

    fn draw_match(&self, node: &MatchNode, m: &Match, area: Rect, buf: &mut Buffer) {
        let status = m.status();
        let border = match status {
            MatchStatus::InProgress => Style::default().fg(Color::Cyan),
            MatchStatus::Complete => Style::default().fg(Color::LightMagenta),
            MatchStatus::Bye => Style::default().fg(Color::DarkGray),
        };
        let (left, top, right, bottom) = self.scale.cells(&node.rect);

        for row in top..=bottom {
            for col in left..=right {
                let ch = match (row == top, row == bottom, col == left, col == right) {
                    (true, _, true, _) => '╭',
                    (true, _, _, true) => '╮',
                    (_, true, true, _) => '╰',
                    (_, true, _, true) => '╯',
                    (true, _, _, _) | (_, true, _, _) => '─',
                    (_, _, true, _) | (_, _, _, true) => '│',
                    _ => ' ',
                };
                self.put(buf, area, col, row, ch, border);
            }
        }

        let inner_col = left + 1;
        let inner_width = (right - left - 1).max(0) as usize;
        let mut row = top + 1;

        if status == MatchStatus::InProgress && row < bottom {
            let pulse = Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC);
            self.put_str(buf, area, inner_col, row, "in progress…", inner_width, pulse);
            row += 1;
        }

        for player in &m.players {
            if row >= bottom {
                break;
            }
            let color = snake_color(player.id);
            let (mark, style) = match m.placement(player.id) {
                Placement::Winner => (
                    WINNER_MARK,
                    Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
                ),
                Placement::RunnerUp => (RUNNER_UP_MARK, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Placement::Unplaced => ("", Style::default().fg(color)),
            };
            let name_style = Style::default().fg(Color::Gray);
            self.put_str(buf, area, inner_col, row, &player.name, inner_width, name_style);
            row += 1;
            if row >= bottom {
                break;
            }
            let label = format!("{}{mark}", player.snake_name);
            self.put_str(buf, area, inner_col, row, &label, inner_width, style);
            row += 1;
        }

        let waiting = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
        for _ in 0..m.open_slots {
            if row >= bottom {
                break;
            }
            self.put_str(buf, area, inner_col, row, "waiting…", inner_width, waiting);
            row += 2;
        }
    }
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 2 {
            return;
        }

        // Pass 1: connectors, so boxes drawn afterwards sit on top of them.
        for connector in &self.plan.connectors {
            self.draw_connector(connector, area, buf);
        }

        // Pass 2: match boxes.
        for node in &self.plan.nodes {
            let Some(m) = self
                .tournament
                .rounds
                .get(node.round)
                .and_then(|r| r.matches.get(node.index))
            else {
                continue;
            };
            self.draw_match(node, m, area, buf);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

const LINE_GLYPHS: [(char, u8); 11] = [
    ('─', LEFT | RIGHT),
    ('│', UP | DOWN),
    ('┐', LEFT | DOWN),
    ('┘', LEFT | UP),
    ('┌', RIGHT | DOWN),
    ('└', RIGHT | UP),
    ('├', UP | DOWN | RIGHT),
    ('┤', UP | DOWN | LEFT),
    ('┬', LEFT | RIGHT | DOWN),
    ('┴', LEFT | RIGHT | UP),
    ('┼', UP | DOWN | LEFT | RIGHT),
];

fn arms(ch: char) -> Option<u8> {
    LINE_GLYPHS.iter().find(|(g, _)| *g == ch).map(|(_, a)| *a)
}

/// Overlapping connector lines combine into the glyph covering both, so two
/// children meeting at one parent row share a tee.
fn merge_junction(existing: Option<char>, incoming: char) -> char {
    let (Some(old), Some(new)) = (existing.and_then(arms), arms(incoming)) else {
        return incoming;
    };
    let merged = old | new;
    LINE_GLYPHS
        .iter()
        .find(|(_, a)| *a == merged)
        .map(|(g, _)| *g)
        .unwrap_or(incoming)
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
