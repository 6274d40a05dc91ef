// Test-only helpers: an in-memory control link and file writing.

use crate::error::{CoreError, Result};
use crate::link::ControlLink;
use crate::protocol::ControlMessage;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Control link that records every frame it is handed
#[derive(Debug, Clone)]
pub struct MemoryLink {
    open: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MemoryLink {
    pub fn connected() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(true)),
            sent: Arc::default(),
        }
    }

    pub fn disconnected() -> Self {
        let link = Self::connected();
        link.set_open(false);
        link
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    /// Frames sent so far, clearing the record
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl ControlLink for MemoryLink {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send(&self, message: &ControlMessage) -> Result<()> {
        if !self.is_open() {
            return Err(CoreError::LinkClosed);
        }
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Write `contents` to `name` inside `dir`, returning the file path
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
