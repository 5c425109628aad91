use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::events::Event;

/// Converts a crossterm event into a game event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        // Windows reports releases too
        CrossTermEvent::Key(KeyEvent {
            kind: KeyEventKind::Release,
            ..
        }) => None,
        CrossTermEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::Esc, ..
            } => Some(Event::Exit),
            KeyEvent {
                code: KeyCode::Char(' '),
                ..
            } => Some(Event::ToggleRun),
            KeyEvent {
                code: KeyCode::Char('r'),
                ..
            } => Some(Event::Run),
            KeyEvent {
                code: KeyCode::Char('s'),
                ..
            } => Some(Event::Stop),
            KeyEvent {
                code: KeyCode::Char('n'),
                ..
            } => Some(Event::Step),
            KeyEvent {
                code: KeyCode::Char('c'),
                ..
            } => Some(Event::Clear),
            KeyEvent {
                code: KeyCode::Char('+' | '='),
                ..
            } => Some(Event::Faster),
            KeyEvent {
                code: KeyCode::Char('-'),
                ..
            } => Some(Event::Slower),
            _ => None,
        },
        CrossTermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Event::Click { column, row }),
        _ => None,
    }
}
