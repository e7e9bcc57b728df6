use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const LOG_PANE_HEIGHT: u16 = 8;
pub const STATUS_HEIGHT: u16 = 1;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    /// Zero-sized unless the log pane is shown.
    pub logs: Rect,
    pub status: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let tab_height = if full_screen { 0 } else { TAB_BAR_HEIGHT };
        let log_height = if show_logs { LOG_PANE_HEIGHT } else { 0 };

        let [tab, main, logs, status] = Layout::vertical([
            Constraint::Length(tab_height),
            Constraint::Fill(1),
            Constraint::Length(log_height),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: if full_screen { [Rect::ZERO, Rect::ZERO] } else { Self::split_tab_bar(tab) },
            main,
            logs,
            status,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(80), Constraint::Percentage(20)]).areas(area)
    }
}
