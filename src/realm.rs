//! tui-realm plumbing: a single root component renders the whole frame and
//! turns terminal events into controller messages.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent,
    KeyModifiers as CrosstermKeyModifiers, MouseButton as CrosstermMouseButton,
    MouseEvent as CrosstermMouseEvent, MouseEventKind as CrosstermMouseEventKind,
};
use tuirealm::{
    Application, AttrValue, Attribute, Component, Event, EventListenerCfg, Frame, MockComponent,
    NoUserEvent, Props, State,
    command::{Cmd, CmdResult},
    event::{
        Key as RealmKey, KeyEvent as RealmKeyEvent, KeyModifiers as RealmKeyModifiers,
        MouseButton as RealmMouseButton, MouseEvent as RealmMouseEvent,
        MouseEventKind as RealmMouseEventKind,
    },
    ratatui::layout::Rect,
};

use crate::{
    app::{App, Message},
    ui,
};

pub type SharedApp = Arc<Mutex<App>>;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RootId {
    Root,
}

pub fn init_application(app: SharedApp) -> Result<Application<RootId, Message, NoUserEvent>> {
    let mut application: Application<RootId, Message, NoUserEvent> = Application::init(
        EventListenerCfg::default()
            .crossterm_input_listener(Duration::from_millis(20), 3)
            .poll_timeout(Duration::from_millis(10))
            .tick_interval(Duration::from_millis(500)),
    );

    application
        .mount(RootId::Root, Box::new(RootComponent::new(app)), Vec::new())
        .context("failed to mount root component")?;

    application
        .active(&RootId::Root)
        .context("failed to activate root component")?;

    Ok(application)
}

pub fn apply_message(shared_app: &SharedApp, message: Message) -> Result<()> {
    let mut app = lock_app(shared_app)?;
    app.update(message)
}

pub fn should_quit(shared_app: &SharedApp) -> Result<bool> {
    let app = lock_app(shared_app)?;
    Ok(app.should_quit)
}

fn lock_app(shared_app: &SharedApp) -> Result<MutexGuard<'_, App>> {
    shared_app
        .lock()
        .map_err(|_| anyhow!("failed to lock app state"))
}

struct RootComponent {
    props: Props,
    app: SharedApp,
}

impl RootComponent {
    fn new(app: SharedApp) -> Self {
        Self {
            props: Props::default(),
            app,
        }
    }
}

impl MockComponent for RootComponent {
    fn view(&mut self, frame: &mut Frame, _area: Rect) {
        if let Ok(mut app) = self.app.lock() {
            ui::render(frame, &mut app);
        }
    }

    fn query(&self, attr: Attribute) -> Option<AttrValue> {
        self.props.get(attr)
    }

    fn attr(&mut self, attr: Attribute, value: AttrValue) {
        self.props.set(attr, value);
    }

    fn state(&self) -> State {
        State::None
    }

    fn perform(&mut self, _cmd: Cmd) -> CmdResult {
        CmdResult::None
    }
}

impl Component<Message, NoUserEvent> for RootComponent {
    fn on(&mut self, ev: Event<NoUserEvent>) -> Option<Message> {
        match ev {
            Event::Keyboard(key) => key_message(key),
            Event::Mouse(mouse) => mouse_message(mouse),
            Event::WindowResize(width, height) => Some(Message::Resize(width, height)),
            Event::Paste(text) => Some(Message::Paste(text)),
            Event::FocusLost => Some(Message::FocusLost),
            Event::Tick => Some(Message::Tick),
            _ => None,
        }
    }
}

/// Keys the inputs and keymap understand; anything else never reaches the
/// controller.
fn key_message(key: RealmKeyEvent) -> Option<Message> {
    let code = match key.code {
        RealmKey::Char(ch) => CrosstermKeyCode::Char(ch),
        RealmKey::Enter => CrosstermKeyCode::Enter,
        RealmKey::Esc => CrosstermKeyCode::Esc,
        RealmKey::Tab => CrosstermKeyCode::Tab,
        RealmKey::BackTab => CrosstermKeyCode::BackTab,
        RealmKey::Backspace => CrosstermKeyCode::Backspace,
        RealmKey::Delete => CrosstermKeyCode::Delete,
        RealmKey::Left => CrosstermKeyCode::Left,
        RealmKey::Right => CrosstermKeyCode::Right,
        RealmKey::Up => CrosstermKeyCode::Up,
        RealmKey::Down => CrosstermKeyCode::Down,
        RealmKey::Home => CrosstermKeyCode::Home,
        RealmKey::End => CrosstermKeyCode::End,
        RealmKey::Function(index) => CrosstermKeyCode::F(index),
        _ => return None,
    };
    Some(Message::Key(CrosstermKeyEvent::new(
        code,
        modifiers(key.modifiers),
    )))
}

/// Left-button presses, drags and releases plus vertical scrolling. Hover
/// motion and other buttons are dropped so they do not force a redraw.
fn mouse_message(mouse: RealmMouseEvent) -> Option<Message> {
    let kind = match mouse.kind {
        RealmMouseEventKind::Down(RealmMouseButton::Left) => {
            CrosstermMouseEventKind::Down(CrosstermMouseButton::Left)
        }
        RealmMouseEventKind::Drag(RealmMouseButton::Left) => {
            CrosstermMouseEventKind::Drag(CrosstermMouseButton::Left)
        }
        RealmMouseEventKind::Up(RealmMouseButton::Left) => {
            CrosstermMouseEventKind::Up(CrosstermMouseButton::Left)
        }
        RealmMouseEventKind::ScrollUp => CrosstermMouseEventKind::ScrollUp,
        RealmMouseEventKind::ScrollDown => CrosstermMouseEventKind::ScrollDown,
        _ => return None,
    };
    Some(Message::Mouse(CrosstermMouseEvent {
        kind,
        column: mouse.column,
        row: mouse.row,
        modifiers: modifiers(mouse.modifiers),
    }))
}

fn modifiers(realm: RealmKeyModifiers) -> CrosstermKeyModifiers {
    [
        (RealmKeyModifiers::SHIFT, CrosstermKeyModifiers::SHIFT),
        (RealmKeyModifiers::CONTROL, CrosstermKeyModifiers::CONTROL),
        (RealmKeyModifiers::ALT, CrosstermKeyModifiers::ALT),
    ]
    .into_iter()
    .filter(|(from, _)| realm.contains(*from))
    .fold(CrosstermKeyModifiers::empty(), |acc, (_, to)| acc | to)
}
