//! Navigation collaborator

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::Screen;

/// Invoked once per completed save
pub trait Navigator: Send + Sync {
    fn advance_to_next_screen(&mut self);
}

/// Tracks the current screen. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScreenNavigator {
    screen: Arc<Mutex<Screen>>,
    advances: Arc<AtomicUsize>,
}

impl ScreenNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        match self.screen.lock() {
            Ok(screen) => *screen,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Number of times navigation advanced
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }
}

impl Navigator for ScreenNavigator {
    fn advance_to_next_screen(&mut self) {
        self.advances.fetch_add(1, Ordering::SeqCst);
        let mut screen = match self.screen.lock() {
            Ok(screen) => screen,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *screen == Screen::FaceCapture {
            *screen = Screen::IdInfo;
        }
        tracing::info!(screen = ?*screen, "Navigated");
    }
}
