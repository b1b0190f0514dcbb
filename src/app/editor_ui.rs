use egui::{Color32, Margin, RichText, Stroke};
use uuid::Uuid;

use super::App;
use crate::intake::ShapeSelection;
use crate::shape::ShapeKind;

const FORM_PANEL_WIDTH: f32 = 220.0;
const LIST_PANEL_WIDTH: f32 = 320.0;

/// What the user asked for during one UI pass. Applied after the pass, never inside it.
#[derive(Default, Debug, PartialEq)]
pub(super) struct UiActions {
    pub spawn_requested: bool,
    pub delete: Vec<Uuid>,
    pub clear_all: bool,
    pub vsync_toggle: Option<bool>,
}

impl UiActions {
    pub fn is_empty(&self) -> bool {
        *self == UiActions::default()
    }
}

pub(super) struct EditorUiOutput {
    pub full_output: egui::FullOutput,
    pub actions: UiActions,
}

fn flagged_frame(invalid: bool) -> egui::Frame {
    let stroke = if invalid { Stroke::new(1.5, Color32::RED) } else { Stroke::NONE };
    egui::Frame::new().stroke(stroke).inner_margin(Margin::same(2))
}

impl App {
    pub(super) fn render_editor_ui(&mut self, raw_input: egui::RawInput) -> EditorUiOutput {
        let mut actions = UiActions::default();
        let mut vsync = self.config.window.vsync;
        let fps = if self.time.delta_seconds() > 0.0 { 1.0 / self.time.delta_seconds() } else { 0.0 };
        let ctx = self.shell.egui_ctx.clone();

        let full_output = ctx.run(raw_input, |ctx| {
            egui::SidePanel::left("shapeyard_form").default_width(FORM_PANEL_WIDTH).show(ctx, |ui| {
                ui.heading("New mesh");
                ui.add_space(6.0);

                let mut selection = self.form.selection;
                flagged_frame(self.form.shape_invalid()).show(ui, |ui| {
                    egui::ComboBox::from_id_salt("geometry")
                        .selected_text(selection.label())
                        .width(FORM_PANEL_WIDTH - 40.0)
                        .show_ui(ui, |ui| {
                            let placeholder = ShapeSelection::Placeholder;
                            ui.selectable_value(&mut selection, placeholder, placeholder.label());
                            for kind in ShapeKind::ALL {
                                ui.selectable_value(&mut selection, ShapeSelection::Shape(kind), kind.label());
                            }
                        });
                });
                if selection != self.form.selection {
                    self.form.select(selection);
                }

                ui.add_space(4.0);
                let mut scale_text = self.form.scale_text.clone();
                let scale_response = flagged_frame(self.form.scale_invalid())
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut scale_text)
                                .hint_text("Scale")
                                .desired_width(FORM_PANEL_WIDTH - 40.0),
                        )
                    })
                    .inner;
                if scale_response.changed() {
                    self.form.set_scale_text(scale_text);
                }
                let submitted_with_enter =
                    scale_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(6.0);
                if ui.button("Create").clicked() || submitted_with_enter {
                    actions.spawn_requested = true;
                }
            });

            egui::SidePanel::right("shapeyard_meshes").default_width(LIST_PANEL_WIDTH).show(ctx, |ui| {
                let list = self.editor.list();
                ui.heading(format!("Meshes ({})", list.len()));
                ui.separator();
                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    for entry in list.entries() {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&entry.label).monospace());
                            if ui.small_button("x").on_hover_text("Delete mesh").clicked() {
                                actions.delete.push(entry.id);
                            }
                        });
                    }
                });
                if !list.is_empty() {
                    ui.separator();
                    if ui.button("Clear all").clicked() {
                        actions.clear_all = true;
                    }
                }
            });

            egui::TopBottomPanel::bottom("shapeyard_status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match self.status.as_deref() {
                        Some(status) => ui.label(status),
                        None => ui.weak("Pick a geometry and press Create"),
                    };
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.checkbox(&mut vsync, "VSync").changed() {
                            actions.vsync_toggle = Some(vsync);
                        }
                        ui.label(format!("{fps:.0} fps"));
                    });
                });
            });
        });

        EditorUiOutput { full_output, actions }
    }
}
