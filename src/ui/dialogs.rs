// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Modal prompts: startup chooser, exit confirmation and error messages.

use crate::persistence::coordinator::ExitDecision;

/// How the user wants to begin a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupChoice {
    OpenExisting,
    StartNew,
    RecoverAutosave,
}

fn modal(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

/// Ask how to start. `can_recover` offers the autosaved document.
pub fn startup(ctx: &egui::Context, can_recover: bool) -> Option<StartupChoice> {
    modal("Welcome to Scenarist")
        .show(ctx, |ui| {
            let mut choice = None;
            ui.label("What would you like to do?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Open existing project…").clicked() {
                    choice = Some(StartupChoice::OpenExisting);
                }
                if ui.button("Start new project").clicked() {
                    choice = Some(StartupChoice::StartNew);
                }
            });
            if can_recover {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Unsaved work from the last session was found.").weak());
                if ui.button("Recover unsaved work").clicked() {
                    choice = Some(StartupChoice::RecoverAutosave);
                }
            }
            choice
        })
        .and_then(|response| response.inner)
        .flatten()
}

/// Ask what to do with unsaved changes before closing.
pub fn exit_confirmation(ctx: &egui::Context) -> Option<ExitDecision> {
    modal("Unsaved changes")
        .show(ctx, |ui| {
            let mut decision = None;
            ui.label("Save the project before exiting?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    decision = Some(ExitDecision::SaveThenExit);
                }
                if ui.button("Don't save").clicked() {
                    decision = Some(ExitDecision::DiscardAndExit);
                }
                if ui.button("Cancel").clicked() {
                    decision = Some(ExitDecision::CancelExit);
                }
            });
            decision
        })
        .and_then(|response| response.inner)
        .flatten()
}

/// Show `message` until the user dismisses it.
pub fn error(ctx: &egui::Context, message: &mut Option<String>) {
    let Some(text) = message.as_deref() else {
        return;
    };
    let dismissed = modal("Error")
        .show(ctx, |ui| {
            ui.label(text);
            ui.add_space(8.0);
            ui.button("OK").clicked()
        })
        .and_then(|response| response.inner)
        .unwrap_or(false);
    if dismissed {
        *message = None;
    }
}
