use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BinderError {
    PageOutOfRange(usize),
    SlotOutOfRange(usize),
    ImageOutOfRange { index: usize, len: usize },
    BinderOutOfRange(usize),
    EmptyCollection,
    Io(String),
    Json(String),
    DataUri(String),
    UnsupportedImage(String),
}

impl Display for BinderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageOutOfRange(page) => write!(f, "page index {page} is outside the binder"),
            Self::SlotOutOfRange(slot) => write!(f, "slot index {slot} is outside the page"),
            Self::ImageOutOfRange { index, len } => {
                write!(f, "image index {index} is out of range for {len} images")
            }
            Self::BinderOutOfRange(binder) => write!(f, "binder index {binder} does not exist"),
            Self::EmptyCollection => write!(f, "collection does not contain any binders"),
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Json(msg) => write!(f, "json error: {msg}"),
            Self::DataUri(msg) => write!(f, "invalid data uri: {msg}"),
            Self::UnsupportedImage(msg) => write!(f, "unsupported image: {msg}"),
        }
    }
}

impl std::error::Error for BinderError {}

impl From<std::io::Error> for BinderError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for BinderError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value.to_string())
    }
}
