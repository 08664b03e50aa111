use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Key presses and pastes merged with a render timer. A resize forces an
/// immediate render.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut render_interval = interval(render_rate);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = render_interval.tick() => {
                        tx.send(Event::Render).ok();
                    }
                    Some(Ok(evt)) = reader.next() => {
                        let forwarded = match evt {
                            CrosstermEvent::Key(key) if key.kind == event::KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
                            CrosstermEvent::Resize(..) => Some(Event::Render),
                            _ => None,
                        };
                        if let Some(evt) = forwarded {
                            tx.send(evt).ok();
                        }
                    }
                }
            }
        });

        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
