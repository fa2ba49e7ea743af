use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::thread;

// Keyboard reader on its own thread, feeding a single-slot bounded channel.
// A key arriving while the slot is full is dropped, so stale input never
// queues up between frames.
pub struct InputManager {
    rx: Receiver<KeyCode>,
}

impl InputManager {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        thread::spawn(move || loop {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(_) => break,
            };
            if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                continue;
            }
            match tx.try_send(key.code) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        });
        Self { rx }
    }

    pub fn poll(&self) -> Option<KeyCode> {
        self.rx.try_recv().ok()
    }

    // Blocks until a key arrives; None means the reader thread is gone.
    pub fn wait(&self) -> Option<KeyCode> {
        self.rx.recv().ok()
    }
}
