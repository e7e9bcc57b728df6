use crate::app::MenuItem;
use crate::state::konami::SequenceTracker;
use battlesnake_api::{MatchMode, PlayerDraft};
use crossterm::event::KeyCode;

// ---------------------------------------------------------------------------
// Bracket viewport
// ---------------------------------------------------------------------------

/// Scroll offset of the bracket canvas, in terminal cells.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BracketViewport {
    pub scroll_x: u16,
    pub scroll_y: u16,
}

impl BracketViewport {
    pub const STEP_X: u16 = 4;
    pub const STEP_Y: u16 = 2;

    pub fn scroll_left(&mut self) {
        self.scroll_x = self.scroll_x.saturating_sub(Self::STEP_X);
    }

    pub fn scroll_right(&mut self) {
        self.scroll_x = self.scroll_x.saturating_add(Self::STEP_X);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_y = self.scroll_y.saturating_sub(Self::STEP_Y);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_y = self.scroll_y.saturating_add(Self::STEP_Y);
    }

    /// Keep the offset inside a canvas of `extent` shown through `viewport`.
    pub fn clamp(&mut self, extent: (u16, u16), viewport: (u16, u16)) {
        self.scroll_x = self.scroll_x.min(extent.0.saturating_sub(viewport.0));
        self.scroll_y = self.scroll_y.min(extent.1.saturating_sub(viewport.1));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Text input
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a tournament id to load.
    TournamentId,
    /// Filling in the new player form.
    NewPlayer,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    #[default]
    Name,
    SnakeName,
    SnakeUrl,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::SnakeName, DraftField::SnakeUrl];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::SnakeName => "Snake name",
            DraftField::SnakeUrl => "Snake URL",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DraftField::Name => DraftField::SnakeName,
            DraftField::SnakeName => DraftField::SnakeUrl,
            DraftField::SnakeUrl => DraftField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DraftField::Name => DraftField::SnakeUrl,
            DraftField::SnakeName => DraftField::Name,
            DraftField::SnakeUrl => DraftField::SnakeName,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayerFormState {
    pub draft: PlayerDraft,
    pub field: DraftField,
}

impl PlayerFormState {
    pub fn value(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.draft.name,
            DraftField::SnakeName => &self.draft.snake_name,
            DraftField::SnakeUrl => &self.draft.snake_url,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            DraftField::Name => &mut self.draft.name,
            DraftField::SnakeName => &mut self.draft.snake_name,
            DraftField::SnakeUrl => &mut self.draft.snake_url,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Admin controls
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AdminState {
    /// Unlocked for the rest of the session once set.
    pub unlocked: bool,
    pub match_mode: MatchMode,
    unlock_sequence: SequenceTracker,
}

impl AdminState {
    /// Feed a key press. Returns true when this press unlocked the controls.
    pub fn observe(&mut self, key: KeyCode) -> bool {
        if self.unlocked {
            return false;
        }
        if self.unlock_sequence.push(key) {
            self.unlocked = true;
            return true;
        }
        false
    }

    pub fn toggle_match_mode(&mut self) {
        self.match_mode = self.match_mode.toggle();
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub input_mode: InputMode,
    pub id_input: String,
    pub player_form: PlayerFormState,
    pub admin: AdminState,
    pub bracket_view: BracketViewport,
    /// Index of the highlighted row on the players tab.
    pub selected_player: usize,
}

impl AppState {
    pub fn new(admin_unlocked: bool) -> Self {
        let mut state = Self::default();
        state.admin.unlocked = admin_unlocked;
        state
    }
}
