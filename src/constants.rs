//! Centralized constants for the binder grid, UI sizing, spacing, and colors.
//!
//! This module consolidates all magic numbers and colors used throughout the application
//! to improve maintainability and provide semantic meaning to values.

use eframe::egui::Color32;

// =============================================================================
// BINDER GRID CONSTANTS
// =============================================================================

/// Number of pages every binder holds.
pub const PAGES_PER_BINDER: usize = 20;

/// Number of slots on a single page.
pub const SLOTS_PER_PAGE: usize = 9;

/// Number of slot columns in the page grid (3x3).
pub const GRID_COLUMNS: usize = 3;

/// Name of the binder a fresh collection starts with.
pub const DEFAULT_BINDER_NAME: &str = "My Collection";

// =============================================================================
// CARD SIZE CONSTANTS
// =============================================================================

/// Smallest card scale selectable in the settings window.
pub const MIN_CARD_SCALE: f32 = 0.5;

/// Largest card scale selectable in the settings window.
pub const MAX_CARD_SCALE: f32 = 2.0;

/// Slider step for the card scale.
pub const CARD_SCALE_STEP: f64 = 0.1;

/// Width of a slot card at a scale of 1.0.
pub const BASE_CARD_WIDTH: f32 = 180.0;

/// Height to width ratio of the image area of a card (3:4 portrait).
pub const CARD_IMAGE_ASPECT: f32 = 4.0 / 3.0;

/// Spacing between cards in the grid.
pub const CARD_SPACING: f32 = 16.0;

/// Inner margin of a card.
pub const CARD_INNER_MARGIN: f32 = 8.0;

/// Corner radius of a card frame.
pub const CARD_CORNER_RADIUS: f32 = 8.0;

/// Stroke width of the image drop area outline.
pub const DROP_AREA_STROKE: f32 = 2.0;

/// Edge length of the thumbnails shown in the main image picker.
pub const PICKER_THUMBNAIL_SIZE: f32 = 64.0;

/// Number of thumbnail columns in the main image picker.
pub const PICKER_COLUMNS: usize = 2;

/// Thumbnails shown per page of the main image picker. Together with the visible
/// cards this must stay below `MAX_CACHED_TEXTURES`.
pub const PICKER_PAGE_SIZE: usize = 24;

// =============================================================================
// IMAGE LOADING CONSTANTS
// =============================================================================

/// Longest edge, in pixels, of the textures uploaded for display.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 512;

/// Maximum number of decoded textures kept in memory simultaneously.
pub const MAX_CACHED_TEXTURES: usize = 96;

/// File extensions offered by the image file dialog and accepted from drops.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif", "bmp"];

// =============================================================================
// WINDOW CONSTANTS
// =============================================================================

/// Initial window width when the application starts.
pub const INITIAL_WINDOW_WIDTH: f32 = 900.0;

/// Initial window height when the application starts.
pub const INITIAL_WINDOW_HEIGHT: f32 = 900.0;

// =============================================================================
// TOOLBAR CONSTANTS
// =============================================================================

/// Spacing at the start of the toolbar.
pub const TOOLBAR_START_SPACING: f32 = 8.0;

/// Size of toolbar button icons.
pub const TOOLBAR_ICON_SIZE: f32 = 20.0;

/// Minimum size for toolbar buttons.
pub const TOOLBAR_BUTTON_SIZE: f32 = 32.0;

/// Font size of the application title.
pub const TITLE_FONT_SIZE: f32 = 22.0;

// =============================================================================
// COLORS
// =============================================================================

/// Outline of a slot while files are dragged over it.
pub const COLOR_DROP_HIGHLIGHT: Color32 = Color32::from_rgb(59, 130, 246);

/// Dashed outline of an idle slot.
pub const COLOR_DROP_AREA: Color32 = Color32::from_rgb(209, 213, 219);

/// Remove button color in normal state.
pub const COLOR_REMOVE_BUTTON: Color32 = Color32::from_rgb(239, 68, 68);

/// Remove button color when hovered.
pub const COLOR_REMOVE_BUTTON_HOVER: Color32 = Color32::from_rgb(220, 38, 38);

/// Background of the image count badge and the "Main" marker.
pub const COLOR_BADGE: Color32 = Color32::from_rgb(59, 130, 246);

/// Placeholder text color of empty slots.
pub const COLOR_PLACEHOLDER_TEXT: Color32 = Color32::from_rgb(156, 163, 175);
