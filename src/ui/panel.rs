//! Sidebar panel for placing and editing furniture.
//!
//! The panel never touches the scene. It renders a read-only
//! [`SelectionView`] and reports what the user asked for as
//! [`PanelCommand`]s, which the app hands to the scene controller.

use crate::{
    color::Color,
    furniture::{self, FurnitureKind},
    gfx::{
        gizmos::TransformMode,
        scene::{ItemId, ModelSource, Room, SceneStatistics, Transform},
    },
};

/// Snapshot of the selected item for display
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub id: ItemId,
    pub name: String,
    pub kind: FurnitureKind,
    pub color: Color,
    pub transform: Transform,
    pub source: ModelSource,
    pub mode: TransformMode,
}

/// Requests emitted by the panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    AddFurniture(FurnitureKind),
    SetMode(TransformMode),
    /// Raw text from the hex input; parsed by the receiver
    SetColorText(String),
    SetColor(Color),
    RotateQuarter,
    DeleteSelected,
    Deselect,
}

/// Text buffer for the color input of the last rendered selection
#[derive(Debug, Default)]
pub struct PanelState {
    shown: Option<ItemId>,
    color_text: String,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the color buffer whenever a different item (or none) is shown
    pub fn sync(&mut self, selection: Option<&SelectionView>) {
        let id = selection.map(|view| view.id);
        if id != self.shown {
            self.shown = id;
            self.color_text = selection.map(|view| view.color.to_hex()).unwrap_or_default();
        }
    }

    pub fn color_text(&self) -> &str {
        &self.color_text
    }
}

/// Renders the furniture panel and returns the requested changes
pub fn furnish_panel(
    ui: &imgui::Ui,
    state: &mut PanelState,
    selection: Option<&SelectionView>,
    room: &Room,
    stats: &SceneStatistics,
) -> Vec<PanelCommand> {
    let mut commands = Vec::new();

    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return commands;
    }
    let panel_width = (display_size[0] * 0.25).clamp(320.0, 440.0);
    let panel_height = (display_size[1] * 0.9).max(500.0);

    state.sync(selection);

    ui.window("Furnish")
        .size([panel_width, panel_height], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_assets_menu(ui, &mut commands);
            ui.separator();
            render_mode_buttons(ui, selection, &mut commands);
            ui.separator();
            match selection {
                Some(view) => render_properties(ui, state, view, &mut commands),
                None => render_empty_state(ui),
            }
            ui.separator();
            render_summary(ui, room, stats);
        });

    commands
}

fn render_assets_menu(ui: &imgui::Ui, commands: &mut Vec<PanelCommand>) {
    if ui.collapsing_header("Add Furniture", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        for kind in FurnitureKind::ALL {
            let furniture = furniture::create(kind);
            let (width, depth) = furniture.footprint();
            if ui.button(format!("Add {}", kind)) {
                commands.push(PanelCommand::AddFurniture(kind));
            }
            ui.same_line();
            ui.text_disabled(format!("{:.1} x {:.1} m", width, depth));
        }
    }
}

fn render_mode_buttons(
    ui: &imgui::Ui,
    selection: Option<&SelectionView>,
    commands: &mut Vec<PanelCommand>,
) {
    ui.text("Transform (G / R / S)");
    let current = selection.map(|view| view.mode);
    for (i, mode) in TransformMode::ALL.into_iter().enumerate() {
        if i > 0 {
            ui.same_line();
        }
        if ui.radio_button_bool(mode.label(), current == Some(mode)) {
            commands.push(PanelCommand::SetMode(mode));
        }
    }
}

fn render_properties(
    ui: &imgui::Ui,
    state: &mut PanelState,
    view: &SelectionView,
    commands: &mut Vec<PanelCommand>,
) {
    if !ui.collapsing_header("Properties", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    ui.text(format!("Selected: {}", view.name));
    ui.text_disabled(format!("{} {}", view.kind, view.id));
    if view.source == ModelSource::Placeholder {
        ui.text_disabled("Showing placeholder model");
    }

    ui.spacing();
    ui.set_next_item_width(120.0);
    if ui
        .input_text("Hex##color_text", &mut state.color_text)
        .enter_returns_true(true)
        .build()
    {
        commands.push(PanelCommand::SetColorText(state.color_text.clone()));
    }

    let mut rgb = view.color.to_rgb_f32();
    if ui.color_edit3("Color##color_picker", &mut rgb) {
        let color = Color::from_rgb_f32(rgb);
        state.color_text = color.to_hex();
        commands.push(PanelCommand::SetColor(color));
    }

    ui.spacing();
    let t = &view.transform;
    ui.text(format!(
        "Position  {:.2}, {:.2}, {:.2}",
        t.position.x, t.position.y, t.position.z
    ));
    ui.text(format!(
        "Rotation  {:.0}, {:.0}, {:.0}",
        t.rotation.x, t.rotation.y, t.rotation.z
    ));
    ui.text(format!(
        "Scale     {:.2}, {:.2}, {:.2}",
        t.scale.x, t.scale.y, t.scale.z
    ));

    ui.spacing();
    if ui.button("Rotate 90") {
        commands.push(PanelCommand::RotateQuarter);
    }
    ui.same_line();
    if ui.button("Delete") {
        commands.push(PanelCommand::DeleteSelected);
    }
    ui.same_line();
    if ui.button("Deselect") {
        commands.push(PanelCommand::Deselect);
    }
}

fn render_empty_state(ui: &imgui::Ui) {
    ui.spacing();
    ui.text_disabled("Nothing selected");
    ui.text_disabled("Click an item in the room to edit it.");
    ui.spacing();
}

fn render_summary(ui: &imgui::Ui, room: &Room, stats: &SceneStatistics) {
    if ui.collapsing_header("Summary", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        ui.columns(2, "summary", false);
        ui.text("Items:");
        ui.next_column();
        ui.text(format!("{}", stats.item_count));
        ui.next_column();
        ui.text("Room:");
        ui.next_column();
        ui.text(format!(
            "{:.1} x {:.1} x {:.1} m",
            room.width, room.depth, room.height
        ));
        ui.next_column();
        ui.text("Floor area:");
        ui.next_column();
        ui.text(format!("{:.1} m²", stats.floor_area));
        ui.next_column();
        ui.text("Triangles:");
        ui.next_column();
        ui.text(format!("{}", stats.total_triangles));
        ui.columns(1, "", false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u64, color: Color) -> SelectionView {
        SelectionView {
            id: ItemId(id),
            name: format!("Chair {id}"),
            kind: FurnitureKind::Chair,
            color,
            transform: Transform::default(),
            source: ModelSource::Placeholder,
            mode: TransformMode::Translate,
        }
    }

    #[test]
    fn buffer_follows_selection_changes() {
        let mut state = PanelState::new();
        state.sync(Some(&view(1, Color::rgb(0x46, 0x82, 0xB4))));
        assert_eq!(state.color_text(), "#4682B4");

        // Same item: the user's in-progress edit survives
        state.color_text = "#12".to_string();
        state.sync(Some(&view(1, Color::WHITE)));
        assert_eq!(state.color_text(), "#12");

        state.sync(Some(&view(2, Color::WHITE)));
        assert_eq!(state.color_text(), "#FFFFFF");

        state.sync(None);
        assert_eq!(state.color_text(), "");
    }
}
