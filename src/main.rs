mod archive;
mod binder;
mod collection;
mod constants;
mod data_uri;
mod error;
mod image_loader;
mod paths;
mod settings;
mod slot_view;
mod tasks;
mod texture_cache;

use binder::page_item_range;
use chrono::Utc;
use collection::{Collection, SlotAddress};
use constants::{
    BASE_CARD_WIDTH, CARD_SCALE_STEP, CARD_SPACING, GRID_COLUMNS, IMAGE_EXTENSIONS,
    INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, MAX_CACHED_TEXTURES, MAX_CARD_SCALE,
    MIN_CARD_SCALE, PAGES_PER_BINDER, TITLE_FONT_SIZE, TOOLBAR_BUTTON_SIZE, TOOLBAR_ICON_SIZE,
    TOOLBAR_START_SPACING,
};
use eframe::egui::{self, Align2, Pos2, Rect, RichText, Vec2};
use image_loader::first_image_file;
use paths::AppPaths;
use settings::{clamp_card_scale, Settings};
use slot_view::{show_image_picker, SlotAction, SlotCard};
use tasks::{BackgroundTasks, ImageSource, TaskResult};
use texture_cache::TextureCache;

const IMPORT_ERROR_MESSAGE: &str = "Error importing collection. Please check the file format.";

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT])
            .with_title("Digital Collection Binder")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "DigitalBinder",
        options,
        Box::new(|cc| Ok(Box::new(BinderApp::new(cc)))),
    )
}

struct BinderApp {
    collection: Collection,
    settings: Settings,
    applied_dark_mode: Option<bool>,
    paths: Option<AppPaths>,
    tasks: BackgroundTasks,
    textures: TextureCache,
    show_binder_window: bool,
    focus_binder_name: bool,
    new_binder_name: String,
    show_settings: bool,
    pending_delete: Option<usize>,
    alert: Option<String>,
    /// Slot whose main image picker is open.
    picker: Option<SlotAddress>,
    picker_page: usize,
    /// Slot under the pointer while files are dragged over the window.
    drop_target: Option<usize>,
    /// Image areas of the visible slots, laid out last frame.
    slot_rects: Vec<(usize, Rect)>,
}

impl BinderApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        settings.set_card_scale(settings.card_scale);

        let paths = AppPaths::from_project_dirs();
        if let Some(paths) = &paths {
            if let Err(err) = paths.ensure_dirs_exist() {
                log::warn!(
                    "Could not create {}: {err}",
                    paths.exports.display()
                );
            }
        }

        Self {
            collection: Collection::new(),
            settings,
            applied_dark_mode: None,
            paths,
            tasks: BackgroundTasks::new(),
            textures: TextureCache::new(MAX_CACHED_TEXTURES),
            show_binder_window: false,
            focus_binder_name: false,
            new_binder_name: String::new(),
            show_settings: false,
            pending_delete: None,
            alert: None,
            picker: None,
            picker_page: 0,
            drop_target: None,
            slot_rects: Vec::new(),
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_dark_mode == Some(self.settings.dark_mode) {
            return;
        }
        ctx.set_visuals(if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        self.applied_dark_mode = Some(self.settings.dark_mode);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Background Results
    // ─────────────────────────────────────────────────────────────────────────────

    fn apply_task_results(&mut self) {
        for result in self.tasks.drain() {
            match result {
                TaskResult::SlotImage {
                    address,
                    source,
                    result: Ok(uri),
                } => match self.collection.add_image_at(address, uri) {
                    Ok(()) => log::info!(
                        "Added {source} to page {} slot {}",
                        address.page + 1,
                        address.slot + 1
                    ),
                    Err(err) => log::warn!("Discarding {source}: {err}"),
                },
                TaskResult::SlotImage {
                    source,
                    result: Err(err),
                    ..
                } => log::error!("Failed to load {source}: {err}"),
                TaskResult::Import {
                    path,
                    result: Ok(Some(archive)),
                } => {
                    let images: usize = archive
                        .collection
                        .binders()
                        .iter()
                        .map(|binder| binder.image_count())
                        .sum();
                    log::info!(
                        "Imported {} binders with {images} images from {}",
                        archive.collection.len(),
                        path.display()
                    );
                    self.collection.replace(archive.collection);
                    if let Some(dark_mode) = archive.dark_mode {
                        self.settings.dark_mode = dark_mode;
                    }
                    self.textures.clear();
                    self.picker = None;
                    self.pending_delete = None;
                }
                TaskResult::Import {
                    path,
                    result: Ok(None),
                } => log::warn!("{} has no binders, nothing imported", path.display()),
                TaskResult::Import {
                    path,
                    result: Err(err),
                } => {
                    log::error!("Failed to import {}: {err}", path.display());
                    self.alert = Some(IMPORT_ERROR_MESSAGE.to_string());
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Image Ingestion
    // ─────────────────────────────────────────────────────────────────────────────

    fn pick_image(&mut self, ctx: &egui::Context, slot: usize) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            let address = self.collection.address(self.collection.current_page(), slot);
            self.tasks.load_image(ctx, address, ImageSource::Path(path));
        }
    }

    fn slot_at(&self, pos: Pos2) -> Option<usize> {
        self.slot_rects
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(slot, _)| *slot)
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovering, dropped, pointer) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
                i.pointer.latest_pos(),
            )
        });

        self.drop_target = if hovering {
            pointer.and_then(|pos| self.slot_at(pos))
        } else {
            None
        };

        if dropped.is_empty() {
            return;
        }
        let Some(slot) = pointer.and_then(|pos| self.slot_at(pos)) else {
            log::debug!("Ignoring {} files dropped outside a slot", dropped.len());
            return;
        };
        let Some(file) = first_image_file(&dropped) else {
            log::debug!("Ignoring drop without image files");
            return;
        };

        let source = match (&file.path, &file.bytes) {
            (Some(path), _) => ImageSource::Path(path.clone()),
            (None, Some(bytes)) => ImageSource::Bytes {
                name: file.name.clone(),
                bytes: bytes.clone(),
            },
            (None, None) => {
                log::debug!("Dropped file {} has no readable contents", file.name);
                return;
            }
        };
        let address = self.collection.address(self.collection.current_page(), slot);
        self.tasks.load_image(ctx, address, source);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Import / Export
    // ─────────────────────────────────────────────────────────────────────────────

    fn export_collection(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(archive::export_file_name(Utc::now()));
        if let Some(paths) = &self.paths {
            dialog = dialog.set_directory(&paths.exports);
        }
        if let Some(path) = dialog.save_file() {
            if let Err(err) =
                archive::export_to_path(&path, &self.collection, self.settings.dark_mode)
            {
                log::error!("Failed to export to {}: {err}", path.display());
                self.alert = Some(format!("Error exporting collection: {err}"));
            }
        }
    }

    fn import_collection(&mut self, ctx: &egui::Context) {
        let mut dialog = rfd::FileDialog::new().add_filter("JSON", &["json"]);
        if let Some(paths) = &self.paths {
            dialog = dialog.set_directory(&paths.exports);
        }
        if let Some(path) = dialog.pick_file() {
            self.tasks.import(ctx, path);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Slot Actions
    // ─────────────────────────────────────────────────────────────────────────────

    fn apply_slot_actions(&mut self, ctx: &egui::Context, actions: Vec<SlotAction>) {
        let page = self.collection.current_page();
        for action in actions {
            let result = match action {
                SlotAction::PickImage { slot } => {
                    self.pick_image(ctx, slot);
                    Ok(())
                }
                SlotAction::OpenPicker { slot } => {
                    self.picker = Some(self.collection.address(page, slot));
                    self.picker_page = 0;
                    Ok(())
                }
                SlotAction::RemoveImage { slot, image } => {
                    self.textures.forget_slot(self.collection.address(page, slot));
                    self.collection.remove_image(page, slot, image)
                }
                SlotAction::SetActive { slot, image } => {
                    self.collection.set_active_image(page, slot, image)
                }
                SlotAction::RemoveAll { slot } => {
                    self.textures.forget_slot(self.collection.address(page, slot));
                    self.collection.remove_all_images(page, slot)
                }
                SlotAction::SetCaption { slot, text } => {
                    self.collection.set_caption(page, slot, text)
                }
            };
            if let Err(err) = result {
                log::warn!("Rejected slot change: {err}");
            }
        }
    }

    fn close_stale_picker(&mut self) {
        let Some(address) = self.picker else {
            return;
        };
        let still_visible = address.binder == self.collection.current_binder_index()
            && address.page == self.collection.current_page()
            && self
                .collection
                .slot(address.page, address.slot)
                .is_ok_and(|slot| slot.image_count() > 1);
        if !still_visible {
            self.picker = None;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Panels
    // ─────────────────────────────────────────────────────────────────────────────

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(TOOLBAR_START_SPACING);
                ui.label(
                    RichText::new("Digital Collection Binder")
                        .size(TITLE_FONT_SIZE)
                        .strong(),
                );

                let mut selected = self.collection.current_binder_index();
                egui::ComboBox::from_id_salt("binder_select")
                    .selected_text(self.collection.current_binder().name.as_str())
                    .show_ui(ui, |ui| {
                        for (index, binder) in self.collection.binders().iter().enumerate() {
                            ui.selectable_value(&mut selected, index, binder.name.as_str());
                        }
                    });
                if selected != self.collection.current_binder_index() {
                    self.collection.select_binder(selected);
                }

                let can_delete = self.collection.len() > 1;
                if ui
                    .add_enabled(can_delete, toolbar_button("🗑", None))
                    .on_hover_text("Delete Binder")
                    .clicked()
                {
                    self.pending_delete = Some(self.collection.current_binder_index());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let theme_icon = if self.settings.dark_mode { "☀" } else { "🌙" };
                    if ui
                        .add(toolbar_button(theme_icon, None))
                        .on_hover_text("Toggle Dark Mode")
                        .clicked()
                    {
                        self.settings.dark_mode = !self.settings.dark_mode;
                    }
                    if ui.add(toolbar_button("📂", Some("Import"))).clicked() {
                        self.import_collection(ctx);
                    }
                    if ui.add(toolbar_button("💾", Some("Export"))).clicked() {
                        self.export_collection();
                    }
                    if ui.add(toolbar_button("⚙", Some("Settings"))).clicked() {
                        self.show_settings = true;
                    }
                    if ui.add(toolbar_button("➕", Some("New Binder"))).clicked() {
                        self.show_binder_window = true;
                        self.focus_binder_name = true;
                    }
                });
            });
        });
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.collection.can_go_back(), egui::Button::new("⏴ Previous"))
                    .clicked()
                {
                    self.collection.change_page(-1);
                }

                let page = self.collection.current_page();
                let (first, last) = page_item_range(page);
                ui.label(RichText::new(format!("Items {first}-{last} • ")).small().weak());
                ui.label(
                    RichText::new(format!("Page {} of {PAGES_PER_BINDER}", page + 1)).strong(),
                );
                if self.tasks.in_flight() > 0 {
                    ui.add(egui::Spinner::new());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(self.collection.can_go_forward(), egui::Button::new("Next ⏵"))
                        .clicked()
                    {
                        self.collection.change_page(1);
                    }
                });
            });
        });

        let typing = ctx.memory(|m| m.focused().is_some());
        if !typing {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.collection.change_page(-1);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.collection.change_page(1);
            }
        }
    }

    fn show_grid(&mut self, ctx: &egui::Context) -> Vec<SlotAction> {
        let mut actions = Vec::new();
        let mut slot_rects = Vec::new();
        let scale = self.settings.card_scale;
        let card_width = BASE_CARD_WIDTH * scale;
        let binder = self.collection.current_binder_index();
        let page = self.collection.current_page();
        let slots = self.collection.current_page_slots();
        let textures = &mut self.textures;
        let drop_target = self.drop_target;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both()
                .id_salt("binder_page")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    egui::Grid::new("binder_grid")
                        .spacing(Vec2::splat(CARD_SPACING))
                        .show(ui, |ui| {
                            for (index, slot) in slots.iter().enumerate() {
                                let card = SlotCard {
                                    slot,
                                    address: SlotAddress {
                                        binder,
                                        page,
                                        slot: index,
                                    },
                                    width: card_width,
                                    scale,
                                    drop_highlight: drop_target == Some(index),
                                };
                                let rect = card.show(ui, textures, &mut actions);
                                slot_rects.push((index, rect));
                                if (index + 1) % GRID_COLUMNS == 0 {
                                    ui.end_row();
                                }
                            }
                        });
                });
        });

        self.slot_rects = slot_rects;
        actions
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Windows
    // ─────────────────────────────────────────────────────────────────────────────

    fn show_new_binder_window(&mut self, ctx: &egui::Context) {
        if !self.show_binder_window {
            return;
        }
        let mut create = false;
        let mut cancel = false;
        egui::Window::new("Create New Binder")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.new_binder_name)
                        .hint_text("Enter binder name...")
                        .desired_width(260.0),
                );
                if self.focus_binder_name {
                    response.request_focus();
                    self.focus_binder_name = false;
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    create = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    let can_create = !self.new_binder_name.trim().is_empty();
                    if ui
                        .add_enabled(can_create, egui::Button::new("Create"))
                        .clicked()
                    {
                        create = true;
                    }
                });
            });

        if create && self.collection.create_binder(&self.new_binder_name) {
            self.new_binder_name.clear();
            self.show_binder_window = false;
        } else if cancel {
            self.new_binder_name.clear();
            self.show_binder_window = false;
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }
        let mut close = false;
        egui::Window::new("⚙ Binder Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Card Size");
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Small").small().weak());
                    let mut scale = self.settings.card_scale;
                    let slider = egui::Slider::new(&mut scale, MIN_CARD_SCALE..=MAX_CARD_SCALE)
                        .step_by(CARD_SCALE_STEP)
                        .show_value(false);
                    if ui.add(slider).changed() {
                        self.settings.card_scale = clamp_card_scale(scale);
                    }
                    ui.label(RichText::new("Large").small().weak());
                });
                ui.label(
                    RichText::new(format!("Current: {}%", self.settings.card_scale_percent()))
                        .small()
                        .weak(),
                );
                ui.separator();
                ui.label(RichText::new("▦ All cards resize together").small().weak());
                ui.add_space(8.0);
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        if close {
            self.show_settings = false;
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(index) = self.pending_delete else {
            return;
        };
        let Some(name) = self
            .collection
            .binders()
            .get(index)
            .map(|binder| binder.name.clone())
        else {
            self.pending_delete = None;
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Delete Binder")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Delete \"{name}\"? This cannot be undone."));
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                    if ui.button("Delete").clicked() {
                        confirmed = true;
                    }
                });
            });

        if confirmed {
            if self.collection.delete_binder(index) {
                self.textures.forget_positions();
            }
            self.pending_delete = None;
        } else if cancelled {
            self.pending_delete = None;
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }

    fn show_picker_window(&mut self, ctx: &egui::Context) -> Vec<SlotAction> {
        let mut actions = Vec::new();
        let Some(address) = self.picker else {
            return actions;
        };
        let Ok(slot) = self.collection.slot(address.page, address.slot) else {
            return actions;
        };
        let textures = &mut self.textures;
        let picker_page = &mut self.picker_page;
        let mut open = true;
        egui::Window::new(format!(
            "Item #{}",
            binder::item_number(address.page, address.slot)
        ))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            show_image_picker(ui, slot, address, picker_page, textures, &mut actions);
        });
        if !open {
            self.picker = None;
        }
        actions
    }
}

impl eframe::App for BinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.textures.poll(ctx);
        self.apply_task_results();
        self.handle_file_drops(ctx);

        self.show_toolbar(ctx);
        self.show_navigation(ctx);
        let mut actions = self.show_grid(ctx);
        self.close_stale_picker();
        actions.extend(self.show_picker_window(ctx));
        self.apply_slot_actions(ctx, actions);
        self.close_stale_picker();

        self.show_new_binder_window(ctx);
        self.show_settings_window(ctx);
        self.show_delete_confirmation(ctx);
        self.show_alert(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}

fn toolbar_button(icon: &str, label: Option<&str>) -> egui::Button<'static> {
    let text = match label {
        Some(label) => format!("{icon} {label}"),
        None => icon.to_string(),
    };
    egui::Button::new(RichText::new(text).size(TOOLBAR_ICON_SIZE * 0.75))
        .min_size(Vec2::splat(TOOLBAR_BUTTON_SIZE))
}
