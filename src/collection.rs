//! Collection state holder: the binders, the current selection, and every mutation
//! the UI can request.
//!
//! Slot mutations address the currently selected binder. Background image loads
//! capture a full [`SlotAddress`] instead, so a result that arrives after the user
//! navigated away still lands in the slot it was requested for.

use crate::binder::{Binder, Slot};
use crate::constants::{DEFAULT_BINDER_NAME, PAGES_PER_BINDER};
use crate::error::BinderError;

/// Where a pending image belongs, captured when the load is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    pub binder: usize,
    pub page: usize,
    pub slot: usize,
}

/// All binders plus navigation state. Always holds at least one binder.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    binders: Vec<Binder>,
    current_binder: usize,
    current_page: usize,
}

impl Collection {
    /// Creates a collection with the single default binder.
    pub fn new() -> Self {
        Self {
            binders: vec![Binder::new(DEFAULT_BINDER_NAME)],
            current_binder: 0,
            current_page: 0,
        }
    }

    /// Builds a collection from imported binders, resetting navigation to the start.
    pub fn from_binders(binders: Vec<Binder>) -> Result<Self, BinderError> {
        if binders.is_empty() {
            return Err(BinderError::EmptyCollection);
        }
        Ok(Self {
            binders,
            current_binder: 0,
            current_page: 0,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn binders(&self) -> &[Binder] {
        &self.binders
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn current_binder_index(&self) -> usize {
        self.current_binder
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_binder(&self) -> &Binder {
        &self.binders[self.current_binder]
    }

    fn current_binder_mut(&mut self) -> &mut Binder {
        &mut self.binders[self.current_binder]
    }

    /// Slots of the page currently on screen.
    pub fn current_page_slots(&self) -> &[Slot] {
        self.current_binder()
            .page(self.current_page)
            .unwrap_or_default()
    }

    pub fn slot(&self, page: usize, slot: usize) -> Result<&Slot, BinderError> {
        self.current_binder().slot(page, slot)
    }

    /// Address of a slot in the current binder, for handing to a background load.
    pub fn address(&self, page: usize, slot: usize) -> SlotAddress {
        SlotAddress {
            binder: self.current_binder,
            page,
            slot,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Slot Mutation
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn add_image(&mut self, page: usize, slot: usize, data: String) -> Result<(), BinderError> {
        self.current_binder_mut().slot_mut(page, slot)?.push_image(data);
        Ok(())
    }

    /// Appends an image to the slot captured in `address`, whichever binder is
    /// selected now.
    pub fn add_image_at(&mut self, address: SlotAddress, data: String) -> Result<(), BinderError> {
        self.binders
            .get_mut(address.binder)
            .ok_or(BinderError::BinderOutOfRange(address.binder))?
            .slot_mut(address.page, address.slot)?
            .push_image(data);
        Ok(())
    }

    pub fn remove_image(
        &mut self,
        page: usize,
        slot: usize,
        image: usize,
    ) -> Result<(), BinderError> {
        self.current_binder_mut()
            .slot_mut(page, slot)?
            .remove_image(image)?;
        Ok(())
    }

    pub fn remove_all_images(&mut self, page: usize, slot: usize) -> Result<(), BinderError> {
        self.current_binder_mut().slot_mut(page, slot)?.clear_images();
        Ok(())
    }

    /// Selects the displayed image of a slot. Indices past the end are rejected.
    pub fn set_active_image(
        &mut self,
        page: usize,
        slot: usize,
        image: usize,
    ) -> Result<(), BinderError> {
        self.current_binder_mut().slot_mut(page, slot)?.set_active(image)
    }

    pub fn set_caption(
        &mut self,
        page: usize,
        slot: usize,
        text: impl Into<String>,
    ) -> Result<(), BinderError> {
        self.current_binder_mut().slot_mut(page, slot)?.caption = text.into();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Moves `delta` pages forward or back, clamped to the binder.
    pub fn change_page(&mut self, delta: isize) {
        let target = (self.current_page as isize).saturating_add(delta);
        self.current_page = target.clamp(0, PAGES_PER_BINDER as isize - 1) as usize;
    }

    pub fn can_go_back(&self) -> bool {
        self.current_page > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_page + 1 < PAGES_PER_BINDER
    }

    /// Switches to another binder and returns to its first page.
    pub fn select_binder(&mut self, index: usize) {
        if index >= self.binders.len() {
            log::warn!("Ignoring selection of missing binder {index}");
            return;
        }
        self.current_binder = index;
        self.current_page = 0;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Binder Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Appends a new empty binder and selects it. Returns false when the trimmed
    /// name is empty.
    pub fn create_binder(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.binders.push(Binder::new(name));
        self.current_binder = self.binders.len() - 1;
        self.current_page = 0;
        log::info!("Created binder \"{name}\"");
        true
    }

    /// Removes a binder unless it is the last one. Returns whether it was removed.
    pub fn delete_binder(&mut self, index: usize) -> bool {
        if self.binders.len() <= 1 || index >= self.binders.len() {
            return false;
        }
        let removed = self.binders.remove(index);
        self.current_binder = self.current_binder.min(self.binders.len() - 1);
        log::info!("Deleted binder \"{}\"", removed.name);
        true
    }

    /// Replaces every binder at once, as an import does.
    pub fn replace(&mut self, other: Collection) {
        *self = other;
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SLOTS_PER_PAGE;

    fn image(n: usize) -> String {
        format!("data:image/png;base64,{n}")
    }

    #[test]
    fn test_starts_with_default_binder() {
        let collection = Collection::new();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.current_binder().name, DEFAULT_BINDER_NAME);
        assert_eq!(collection.current_page(), 0);
        assert_eq!(collection.current_page_slots().len(), SLOTS_PER_PAGE);
    }

    #[test]
    fn test_add_then_remove_keeps_active_valid() {
        let mut collection = Collection::new();
        for page in [0, 7, PAGES_PER_BINDER - 1] {
            for slot in [0, 4, SLOTS_PER_PAGE - 1] {
                for n in 0..5 {
                    collection.add_image(page, slot, image(n)).unwrap();
                }
                collection.set_active_image(page, slot, 4).unwrap();
                collection.remove_image(page, slot, 2).unwrap();
                let s = collection.slot(page, slot).unwrap();
                assert_eq!(s.images.len(), 4);
                assert!(s.active_image_index < s.images.len());
            }
        }
    }

    #[test]
    fn test_remove_only_image_resets_to_zero() {
        let mut collection = Collection::new();
        collection.add_image(0, 0, image(0)).unwrap();
        collection.remove_image(0, 0, 0).unwrap();
        let slot = collection.slot(0, 0).unwrap();
        assert!(slot.images.is_empty());
        assert_eq!(slot.active_image_index, 0);
    }

    #[test]
    fn test_mutations_reject_bad_indices() {
        let mut collection = Collection::new();
        let before = collection.clone();
        assert!(collection.add_image(PAGES_PER_BINDER, 0, image(0)).is_err());
        assert!(collection.add_image(0, SLOTS_PER_PAGE, image(0)).is_err());
        assert!(collection.remove_image(0, 0, 0).is_err());
        assert!(collection.set_active_image(0, 0, 0).is_err());
        assert!(collection.set_caption(0, 99, "x").is_err());
        assert_eq!(collection, before);
    }

    #[test]
    fn test_remove_all_images() {
        let mut collection = Collection::new();
        collection.add_image(1, 2, image(0)).unwrap();
        collection.add_image(1, 2, image(1)).unwrap();
        collection.set_active_image(1, 2, 1).unwrap();
        collection.remove_all_images(1, 2).unwrap();
        let slot = collection.slot(1, 2).unwrap();
        assert!(slot.images.is_empty());
        assert_eq!(slot.active_image_index, 0);
    }

    #[test]
    fn test_set_caption() {
        let mut collection = Collection::new();
        collection.set_caption(3, 3, "Rookie card").unwrap();
        assert_eq!(collection.slot(3, 3).unwrap().caption, "Rookie card");
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut collection = Collection::new();
        collection.change_page(-1);
        assert_eq!(collection.current_page(), 0);
        assert!(!collection.can_go_back());
        collection.change_page(5);
        assert_eq!(collection.current_page(), 5);
        collection.change_page(100);
        assert_eq!(collection.current_page(), PAGES_PER_BINDER - 1);
        assert!(!collection.can_go_forward());
        collection.change_page(-100);
        assert_eq!(collection.current_page(), 0);

        collection.change_page(1);
        collection.change_page(isize::MAX);
        assert_eq!(collection.current_page(), PAGES_PER_BINDER - 1);
        collection.change_page(isize::MIN);
        assert_eq!(collection.current_page(), 0);
    }

    #[test]
    fn test_create_binder_selects_it() {
        let mut collection = Collection::new();
        collection.change_page(4);
        assert!(collection.create_binder("  Stamps  "));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.current_binder_index(), 1);
        assert_eq!(collection.current_binder().name, "Stamps");
        assert_eq!(collection.current_page(), 0);
    }

    #[test]
    fn test_create_binder_with_blank_name_is_noop() {
        let mut collection = Collection::new();
        let before = collection.clone();
        assert!(!collection.create_binder(""));
        assert!(!collection.create_binder("   \t"));
        assert_eq!(collection, before);
    }

    #[test]
    fn test_cannot_delete_last_binder() {
        let mut collection = Collection::new();
        let before = collection.clone();
        assert!(!collection.delete_binder(0));
        assert_eq!(collection, before);
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut collection = Collection::new();
        collection.create_binder("B");
        collection.create_binder("C");
        assert_eq!(collection.current_binder_index(), 2);
        assert!(collection.delete_binder(2));
        assert_eq!(collection.current_binder_index(), 1);
        assert_eq!(collection.current_binder().name, "B");
        assert!(!collection.delete_binder(5));
    }

    #[test]
    fn test_select_binder_resets_page() {
        let mut collection = Collection::new();
        collection.create_binder("Second");
        collection.change_page(3);
        collection.select_binder(0);
        assert_eq!(collection.current_binder_index(), 0);
        assert_eq!(collection.current_page(), 0);
        collection.change_page(2);
        collection.select_binder(9);
        assert_eq!(collection.current_page(), 2);
    }

    #[test]
    fn test_mutations_only_touch_current_binder() {
        let mut collection = Collection::new();
        collection.create_binder("Second");
        collection.add_image(0, 0, image(0)).unwrap();
        collection.select_binder(0);
        assert!(!collection.slot(0, 0).unwrap().has_images());
    }

    #[test]
    fn test_add_image_at_captured_address() {
        let mut collection = Collection::new();
        let address = collection.address(2, 5);
        collection.create_binder("Elsewhere");
        collection.add_image_at(address, image(1)).unwrap();
        assert!(!collection.slot(2, 5).unwrap().has_images());
        collection.select_binder(0);
        assert_eq!(collection.slot(2, 5).unwrap().images, vec![image(1)]);
    }

    #[test]
    fn test_add_image_at_deleted_binder_fails() {
        let mut collection = Collection::new();
        collection.create_binder("Gone");
        let address = collection.address(0, 0);
        collection.delete_binder(1);
        assert!(collection.add_image_at(address, image(0)).is_err());
    }

    #[test]
    fn test_from_binders_rejects_empty() {
        assert!(Collection::from_binders(Vec::new()).is_err());
    }
}
