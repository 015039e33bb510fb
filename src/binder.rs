use crate::constants::{PAGES_PER_BINDER, SLOTS_PER_PAGE};
use crate::error::BinderError;
use serde::{Deserialize, Serialize};

/// One cell of a page: a stack of images, the one currently shown, and a caption.
///
/// Images are stored as self-describing data URIs so a collection can be written
/// out as a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SlotRecord")]
pub struct Slot {
    pub images: Vec<String>,
    pub caption: String,
    pub active_image_index: usize,
}

/// Wire shape accepted for a slot. Older documents carry a single nullable `image`
/// instead of the `images` stack. Any JSON number is taken as the active index.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotRecord {
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    active_image_index: Option<f64>,
}

impl From<SlotRecord> for Slot {
    fn from(record: SlotRecord) -> Self {
        let images = record
            .images
            .unwrap_or_else(|| record.image.into_iter().collect());
        let mut slot = Self {
            images,
            caption: record.caption.unwrap_or_default(),
            active_image_index: record.active_image_index.map_or(0, index_from_number),
        };
        slot.clamp_active_index();
        slot
    }
}

// Negative values become 0, fractions are truncated; `as` saturates past usize::MAX.
fn index_from_number(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.trunc() as usize
    } else {
        0
    }
}

impl Slot {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// The image currently displayed for this slot, if any.
    pub fn active_image(&self) -> Option<&str> {
        self.images.get(self.active_image_index).map(String::as_str)
    }

    pub fn push_image(&mut self, data: String) {
        self.images.push(data);
        if self.images.len() == 1 {
            self.active_image_index = 0;
        }
    }

    /// Removes one image. The active index is pulled back onto the last image when
    /// it would otherwise point past the end.
    pub fn remove_image(&mut self, index: usize) -> Result<String, BinderError> {
        if index >= self.images.len() {
            return Err(BinderError::ImageOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        let removed = self.images.remove(index);
        self.clamp_active_index();
        Ok(removed)
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
        self.active_image_index = 0;
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), BinderError> {
        if index >= self.images.len() {
            return Err(BinderError::ImageOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.active_image_index = index;
        Ok(())
    }

    fn clamp_active_index(&mut self) {
        if self.active_image_index >= self.images.len() {
            self.active_image_index = self.images.len().saturating_sub(1);
        }
    }
}

/// A named stack of pages. The grid is always `PAGES_PER_BINDER` pages of
/// `SLOTS_PER_PAGE` slots; deserialization pads or truncates to that shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BinderRecord")]
pub struct Binder {
    pub name: String,
    pages: Vec<Vec<Slot>>,
}

#[derive(Deserialize)]
struct BinderRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pages: Vec<Vec<Slot>>,
}

impl From<BinderRecord> for Binder {
    fn from(record: BinderRecord) -> Self {
        let mut pages = record.pages;
        if pages.len() != PAGES_PER_BINDER
            || pages.iter().any(|page| page.len() != SLOTS_PER_PAGE)
        {
            log::warn!(
                "Binder \"{}\" does not have a {}x{} grid, normalizing",
                record.name,
                PAGES_PER_BINDER,
                SLOTS_PER_PAGE
            );
        }
        pages.resize_with(PAGES_PER_BINDER, empty_page);
        for page in &mut pages {
            page.resize_with(SLOTS_PER_PAGE, Slot::default);
        }
        Self {
            name: record.name,
            pages,
        }
    }
}

fn empty_page() -> Vec<Slot> {
    vec![Slot::default(); SLOTS_PER_PAGE]
}

impl Binder {
    /// Creates a binder with every page and slot pre-populated empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: (0..PAGES_PER_BINDER).map(|_| empty_page()).collect(),
        }
    }

    pub fn pages(&self) -> &[Vec<Slot>] {
        &self.pages
    }

    pub fn page(&self, page: usize) -> Option<&[Slot]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    pub fn slot(&self, page: usize, slot: usize) -> Result<&Slot, BinderError> {
        self.pages
            .get(page)
            .ok_or(BinderError::PageOutOfRange(page))?
            .get(slot)
            .ok_or(BinderError::SlotOutOfRange(slot))
    }

    pub fn slot_mut(&mut self, page: usize, slot: usize) -> Result<&mut Slot, BinderError> {
        self.pages
            .get_mut(page)
            .ok_or(BinderError::PageOutOfRange(page))?
            .get_mut(slot)
            .ok_or(BinderError::SlotOutOfRange(slot))
    }

    pub fn image_count(&self) -> usize {
        self.pages.iter().flatten().map(Slot::image_count).sum()
    }
}

/// 1-based number of the item shown at `slot` on `page`.
pub fn item_number(page: usize, slot: usize) -> usize {
    page * SLOTS_PER_PAGE + slot + 1
}

/// First and last item numbers printed on a page.
pub fn page_item_range(page: usize) -> (usize, usize) {
    (item_number(page, 0), item_number(page, SLOTS_PER_PAGE - 1))
}
