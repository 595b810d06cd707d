// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the common note and connection operations.

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    NewNote,
    ConnectSelected,
    DisconnectSelected,
    DeleteSelected,
}

/// Display the toolbar.
///
/// `connected_pair` is true when exactly two notes are selected and they
/// are linked.
pub fn show(ui: &mut egui::Ui, selected: usize, connected_pair: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("+ New note").clicked() {
            action = ToolbarAction::NewNote;
        }

        ui.separator();

        if ui
            .add_enabled(selected >= 2, egui::Button::new("Connect"))
            .on_hover_text("Ctrl+L")
            .clicked()
        {
            action = ToolbarAction::ConnectSelected;
        }

        if ui
            .add_enabled(connected_pair, egui::Button::new("Disconnect"))
            .on_hover_text("Ctrl+Shift+L")
            .clicked()
        {
            action = ToolbarAction::DisconnectSelected;
        }

        if ui
            .add_enabled(selected > 0, egui::Button::new("Delete"))
            .on_hover_text("Delete")
            .clicked()
        {
            action = ToolbarAction::DeleteSelected;
        }

        ui.separator();

        let hint = match selected {
            0 => "Double-click the canvas to add a note, drag the background to pan",
            1 => "Ctrl-click another note to select it too",
            _ => "Connect links every selected pair",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
