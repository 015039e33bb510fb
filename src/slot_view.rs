//! Drawing of a single slot card and of the main image picker.
//!
//! Widgets never mutate the collection; they push [`SlotAction`]s that the app
//! applies after the frame's layout is done.

use crate::binder::{item_number, Slot};
use crate::collection::SlotAddress;
use crate::constants::{
    CARD_CORNER_RADIUS, CARD_IMAGE_ASPECT, CARD_INNER_MARGIN, COLOR_BADGE, COLOR_DROP_AREA,
    COLOR_DROP_HIGHLIGHT, COLOR_PLACEHOLDER_TEXT, COLOR_REMOVE_BUTTON, COLOR_REMOVE_BUTTON_HOVER,
    DROP_AREA_STROKE, PICKER_COLUMNS, PICKER_PAGE_SIZE, PICKER_THUMBNAIL_SIZE,
};
use crate::texture_cache::{ImageId, TextureCache};
use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Vec2};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotAction {
    PickImage { slot: usize },
    RemoveImage { slot: usize, image: usize },
    SetActive { slot: usize, image: usize },
    SetCaption { slot: usize, text: String },
    OpenPicker { slot: usize },
    RemoveAll { slot: usize },
}

pub struct SlotCard<'a> {
    pub slot: &'a Slot,
    pub address: SlotAddress,
    pub width: f32,
    pub scale: f32,
    pub drop_highlight: bool,
}

impl SlotCard<'_> {
    /// Draws the card and returns the rect of its image area, the drop target.
    pub fn show(
        self,
        ui: &mut egui::Ui,
        textures: &mut TextureCache,
        actions: &mut Vec<SlotAction>,
    ) -> Rect {
        let number = item_number(self.address.page, self.address.slot);
        let mut image_rect = Rect::NOTHING;

        egui::Frame::group(ui.style())
            .rounding(CARD_CORNER_RADIUS)
            .inner_margin(CARD_INNER_MARGIN)
            .show(ui, |ui| {
                ui.set_width(self.width);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("#{number}")).small().weak());
                        if self.slot.image_count() > 1 {
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let badge = egui::Button::new(
                                    RichText::new(format!("{} imgs", self.slot.image_count()))
                                        .small()
                                        .color(Color32::WHITE),
                                )
                                .fill(COLOR_BADGE)
                                .small();
                                if ui
                                    .add(badge)
                                    .on_hover_text("Select main image")
                                    .clicked()
                                {
                                    actions.push(SlotAction::OpenPicker { slot: self.address.slot });
                                }
                            });
                        }
                    });

                    image_rect = self.show_image_area(ui, textures, actions);

                    let mut caption = self.slot.caption.clone();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut caption)
                            .hint_text(format!("Item #{number} caption..."))
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        actions.push(SlotAction::SetCaption {
                            slot: self.address.slot,
                            text: caption,
                        });
                    }
                });
            });

        image_rect
    }

    fn show_image_area(
        &self,
        ui: &mut egui::Ui,
        textures: &mut TextureCache,
        actions: &mut Vec<SlotAction>,
    ) -> Rect {
        let size = vec2(self.width, self.width * CARD_IMAGE_ASPECT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        let painter = ui.painter_at(rect);

        let stroke = if self.drop_highlight {
            Stroke::new(DROP_AREA_STROKE, COLOR_DROP_HIGHLIGHT)
        } else if response.hovered() {
            Stroke::new(DROP_AREA_STROKE, COLOR_DROP_HIGHLIGHT.gamma_multiply(0.6))
        } else {
            Stroke::new(DROP_AREA_STROKE, COLOR_DROP_AREA)
        };

        let remove_rect = remove_button_rect(rect, self.scale);
        let over_remove = response
            .hover_pos()
            .is_some_and(|pos| remove_rect.contains(pos));

        match self.slot.active_image() {
            Some(uri) => {
                let id = ImageId::new(self.address, self.slot.active_image_index, uri);
                match textures.get(ui.ctx(), id, uri) {
                    Some(texture) => {
                        let target = fitted_rect(rect.shrink(DROP_AREA_STROKE), texture.size_vec2());
                        painter.image(
                            texture.id(),
                            target,
                            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                            Color32::WHITE,
                        );
                    }
                    None if textures.is_broken(id, uri) => {
                        painter.text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            "⚠ Unreadable image",
                            FontId::proportional(12.0 * self.scale),
                            COLOR_REMOVE_BUTTON,
                        );
                    }
                    None => {
                        ui.put(
                            Rect::from_center_size(rect.center(), Vec2::splat(24.0)),
                            egui::Spinner::new(),
                        );
                    }
                }

                let fill = if over_remove {
                    COLOR_REMOVE_BUTTON_HOVER
                } else {
                    COLOR_REMOVE_BUTTON
                };
                painter.circle_filled(remove_rect.center(), remove_rect.width() / 2.0, fill);
                painter.text(
                    remove_rect.center(),
                    Align2::CENTER_CENTER,
                    "🗑",
                    FontId::proportional(12.0 * self.scale),
                    Color32::WHITE,
                );
            }
            None => {
                let text = if self.drop_highlight {
                    "Drop image here"
                } else {
                    "⬆ Upload or Drop Image"
                };
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(13.0 * self.scale),
                    COLOR_PLACEHOLDER_TEXT,
                );
            }
        }
        painter.rect_stroke(rect.shrink(DROP_AREA_STROKE / 2.0), 4.0, stroke);

        if response.clicked() {
            let on_remove = response
                .interact_pointer_pos()
                .is_some_and(|pos| remove_rect.contains(pos));
            if on_remove && self.slot.has_images() {
                actions.push(SlotAction::RemoveImage {
                    slot: self.address.slot,
                    image: self.slot.active_image_index,
                });
            } else {
                actions.push(SlotAction::PickImage { slot: self.address.slot });
            }
        }
        if self.slot.has_images() {
            response.context_menu(|ui| {
                if ui.button("Remove all images").clicked() {
                    actions.push(SlotAction::RemoveAll { slot: self.address.slot });
                    ui.close_menu();
                }
            });
        }

        rect
    }
}

/// Lists the images of a slot so one can be made the main image or removed.
/// Large stacks are split into pages of `PICKER_PAGE_SIZE` thumbnails.
pub fn show_image_picker(
    ui: &mut egui::Ui,
    slot: &Slot,
    address: SlotAddress,
    picker_page: &mut usize,
    textures: &mut TextureCache,
    actions: &mut Vec<SlotAction>,
) {
    let pages = picker_page_count(slot.image_count());
    *picker_page = (*picker_page).min(pages - 1);
    let index = address.slot;

    ui.label(RichText::new("Select main image:").small().weak());
    if pages > 1 {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(*picker_page > 0, egui::Button::new("⏴").small())
                .clicked()
            {
                *picker_page -= 1;
            }
            let shown = picker_range(slot.image_count(), *picker_page);
            ui.label(
                RichText::new(format!(
                    "{}-{} of {}",
                    shown.start + 1,
                    shown.end,
                    slot.image_count()
                ))
                .small(),
            );
            if ui
                .add_enabled(*picker_page + 1 < pages, egui::Button::new("⏵").small())
                .clicked()
            {
                *picker_page += 1;
            }
        });
    }

    let shown = picker_range(slot.image_count(), *picker_page);
    egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
        egui::Grid::new(("image_picker", index))
            .spacing(vec2(8.0, 8.0))
            .show(ui, |ui| {
                for (column, image) in shown.enumerate() {
                    let uri = &slot.images[image];
                    ui.vertical(|ui| {
                        let size = Vec2::splat(PICKER_THUMBNAIL_SIZE);
                        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
                        let is_main = image == slot.active_image_index;
                        let id = ImageId::new(address, image, uri);
                        if let Some(texture) = textures.get(ui.ctx(), id, uri) {
                            ui.painter().image(
                                texture.id(),
                                fitted_rect(rect, texture.size_vec2()),
                                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                                Color32::WHITE,
                            );
                        }
                        let border = if is_main { COLOR_BADGE } else { COLOR_DROP_AREA };
                        ui.painter()
                            .rect_stroke(rect, 2.0, Stroke::new(DROP_AREA_STROKE, border));
                        if response
                            .on_hover_text(format!("Version {}", image + 1))
                            .clicked()
                        {
                            actions.push(SlotAction::SetActive { slot: index, image });
                        }

                        ui.horizontal(|ui| {
                            if is_main {
                                ui.label(RichText::new("Main").small().color(COLOR_BADGE));
                            }
                            if ui.small_button("✕").on_hover_text("Remove").clicked() {
                                actions.push(SlotAction::RemoveImage { slot: index, image });
                            }
                        });
                    });
                    if (column + 1) % PICKER_COLUMNS == 0 {
                        ui.end_row();
                    }
                }
            });
    });
}

fn picker_page_count(image_count: usize) -> usize {
    image_count.div_ceil(PICKER_PAGE_SIZE).max(1)
}

/// Indices of the images shown on one picker page.
fn picker_range(image_count: usize, page: usize) -> Range<usize> {
    let start = (page * PICKER_PAGE_SIZE).min(image_count);
    start..(start + PICKER_PAGE_SIZE).min(image_count)
}

fn remove_button_rect(image_rect: Rect, scale: f32) -> Rect {
    let size = 22.0 * scale;
    Rect::from_center_size(
        image_rect.right_top() + vec2(-size / 2.0 - 6.0, size / 2.0 + 6.0),
        Vec2::splat(size),
    )
}

/// Largest rect with the aspect ratio of `content` centered inside `container`.
pub fn fitted_rect(container: Rect, content: Vec2) -> Rect {
    if content.x <= 0.0 || content.y <= 0.0 {
        return container;
    }
    let scale = (container.width() / content.x).min(container.height() / content.y);
    Rect::from_center_size(container.center(), content * scale)
}
