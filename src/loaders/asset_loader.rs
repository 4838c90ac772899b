//! Background asset loading with byte progress and cancellation.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use super::gltf::{load_gltf_from_slice, LoadedAsset};
use crate::core::CancelToken;
use crate::error::LoadError;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded_bytes: u64,
    pub total_bytes: Option<u64>,
}

impl ProgressEvent {
    /// Rounded percentage, `None` while the total is unknown
    pub fn percent(&self) -> Option<u32> {
        match self.total_bytes {
            Some(total) if total > 0 => {
                let ratio = self.loaded_bytes.min(total) as f64 / total as f64;
                Some((ratio * 100.0).round() as u32)
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    Progress(ProgressEvent),
    Loaded(LoadedAsset),
    Failed(LoadError),
}

/// Spawns loads on a worker thread
pub struct AssetLoader;

impl AssetLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> LoadHandle {
        let path = path.into();
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let worker_cancel = cancel.clone();
        let worker_path = path.clone();
        let thread = std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let event = match load_file(&worker_path, &tx, &worker_cancel) {
                    Ok(asset) => LoadEvent::Loaded(asset),
                    Err(e) => LoadEvent::Failed(e),
                };
                // the handle may already be gone
                let _ = tx.send(event);
            });

        match thread {
            Ok(thread) => LoadHandle {
                receiver: rx,
                cancel,
                thread: Some(thread),
                finished: false,
            },
            Err(source) => {
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(LoadEvent::Failed(LoadError::Io { path, source }));
                LoadHandle {
                    receiver: rx,
                    cancel,
                    thread: None,
                    finished: false,
                }
            }
        }
    }
}

/// Main-thread side of one in-flight load
pub struct LoadHandle {
    receiver: Receiver<LoadEvent>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl LoadHandle {
    /// Events received since the last poll, never blocking
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let events: Vec<LoadEvent> = self.receiver.try_iter().collect();
        if events
            .iter()
            .any(|e| matches!(e, LoadEvent::Loaded(_) | LoadEvent::Failed(_)))
        {
            self.finished = true;
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
        events
    }

    /// Block until the load settles, collecting every event in order
    pub fn wait(mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while !self.finished {
            match self.receiver.recv() {
                Ok(event) => {
                    self.finished = matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_));
                    events.push(event);
                }
                Err(_) => break,
            }
        }
        events
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn load_file(path: &Path, events: &Sender<LoadEvent>, cancel: &CancelToken) -> Result<LoadedAsset, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let total_bytes = file.metadata().ok().map(|m| m.len());
    log::info!("loading {} ({:?} bytes)", path.display(), total_bytes);

    let mut bytes = Vec::with_capacity(total_bytes.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        let read = file.read(&mut chunk).map_err(io_error)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        let _ = events.send(LoadEvent::Progress(ProgressEvent {
            loaded_bytes: bytes.len() as u64,
            total_bytes,
        }));
    }

    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }
    load_gltf_from_slice(&bytes, path.parent())
}
