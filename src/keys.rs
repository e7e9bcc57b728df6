use crate::app::{App, MenuItem};
use crate::state::app_state::InputMode;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        quit(&mut guard);
    }

    let mode = guard.state.input_mode;
    let request = match mode {
        InputMode::TournamentId => handle_id_input(&mut guard, key_event.code),
        InputMode::NewPlayer => handle_player_form(&mut guard, key_event.code),
        // The key completing the unlock sequence is not also a command.
        InputMode::Normal if guard.observe_key(key_event.code) => None,
        InputMode::Normal => handle_normal(&mut guard, key_event.code),
    };

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

fn handle_normal(app: &mut App, code: KeyCode) -> Option<NetworkRequest> {
    match (app.state.active_tab, code) {
        (_, Char('q')) => quit(app),

        // Tab switching
        (_, Char('1')) => app.update_tab(MenuItem::Bracket),
        (_, Char('2')) => app.update_tab(MenuItem::Players),
        (_, Char('3')) => app.update_tab(MenuItem::Controls),
        (_, Char('?')) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc) => app.exit_help(),

        // Bracket scrolling
        (MenuItem::Bracket, Char('h') | KeyCode::Left) => app.state.bracket_view.scroll_left(),
        (MenuItem::Bracket, Char('l') | KeyCode::Right) => app.state.bracket_view.scroll_right(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up) => app.state.bracket_view.scroll_up(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down) => app.state.bracket_view.scroll_down(),
        (MenuItem::Bracket, KeyCode::Home) => app.state.bracket_view.reset(),

        // Roster
        (MenuItem::Players, Char('j') | KeyCode::Down) => app.player_down(),
        (MenuItem::Players, Char('k') | KeyCode::Up) => app.player_up(),
        (MenuItem::Players, Char('r')) => return Some(NetworkRequest::LoadPlayers),

        // Tournament
        (_, Char('i') | Char('/')) => app.begin_tournament_id_input(),
        (_, Char('p')) => app.toggle_polling(),

        // Admin
        (_, Char('n')) => return app.create_tournament(),
        (_, Char('g')) => return app.generate_matches(),
        (_, Char('s')) => return app.start_game(),
        (_, Char('a')) => return app.advance_round(),
        (_, Char('m')) => app.toggle_match_mode(),
        (_, Char('+')) => {
            app.begin_player_form();
        }

        // Global
        (_, Char('f')) => app.toggle_full_screen(),
        (_, Char('"')) => app.toggle_show_logs(),
        (_, KeyCode::Esc) => app.dismiss_messages(),

        _ => {}
    }
    None
}

fn handle_id_input(app: &mut App, code: KeyCode) -> Option<NetworkRequest> {
    match code {
        KeyCode::Enter => return app.submit_tournament_id(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => {
            app.state.id_input.pop();
        }
        Char(c) if !c.is_control() => app.state.id_input.push(c),
        _ => {}
    }
    None
}

fn handle_player_form(app: &mut App, code: KeyCode) -> Option<NetworkRequest> {
    match code {
        KeyCode::Enter => return app.submit_player_form(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Tab | KeyCode::Down => app.state.player_form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.state.player_form.prev_field(),
        KeyCode::Backspace => app.state.player_form.backspace(),
        Char(c) if !c.is_control() => app.state.player_form.push(c),
        _ => {}
    }
    None
}

fn quit(app: &mut App) -> ! {
    app.shutdown();
    crate::cleanup_terminal();
    std::process::exit(0);
}
