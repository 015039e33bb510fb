//! Background file reads. Work runs on the rayon pool and reports back over a
//! channel; the UI thread applies results when it drains the channel, so the
//! collection is only ever mutated from the frame loop.

use crate::archive::{self, Archive};
use crate::collection::SlotAddress;
use crate::error::BinderError;
use crate::image_loader::{encode_image_bytes, encode_image_file};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Where the bytes of a new slot image come from.
pub enum ImageSource {
    Path(PathBuf),
    /// Platforms that hand over dropped file contents directly.
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl ImageSource {
    fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    fn encode(&self) -> Result<String, BinderError> {
        match self {
            Self::Path(path) => encode_image_file(path),
            Self::Bytes { name, bytes } => {
                encode_image_bytes(bytes, Some(std::path::Path::new(name)))
            }
        }
    }
}

pub enum TaskResult {
    /// An image finished encoding and should be appended at `address`.
    SlotImage {
        address: SlotAddress,
        source: String,
        result: Result<String, BinderError>,
    },
    Import {
        path: PathBuf,
        result: Result<Option<Archive>, BinderError>,
    },
}

pub struct BackgroundTasks {
    tx: Sender<TaskResult>,
    rx: Receiver<TaskResult>,
    in_flight: usize,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx, in_flight: 0 }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Reads and encodes an image for the slot captured in `address`.
    pub fn load_image(&mut self, ctx: &egui::Context, address: SlotAddress, source: ImageSource) {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = source.encode();
            let _ = tx.send(TaskResult::SlotImage {
                address,
                source: source.describe(),
                result,
            });
            ctx.request_repaint();
        });
    }

    pub fn import(&mut self, ctx: &egui::Context, path: PathBuf) {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = archive::import_from_path(&path);
            let _ = tx.send(TaskResult::Import { path, result });
            ctx.request_repaint();
        });
    }

    /// Collects every result that arrived since the last call.
    pub fn drain(&mut self) -> Vec<TaskResult> {
        let results: Vec<TaskResult> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(results.len());
        results
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
