//! Message bubbles and the transcript column. Tab selections for artifact
//! cards live in a map owned by the app, keyed by message and artifact id so
//! a selection survives transcript refreshes.

use std::collections::HashMap;
use std::path::Path;

use eframe::egui::{self, RichText};

use super::artifact::{artifact_ui, ViewMode};
use crate::model::{Message, Role};
use crate::theme::Theme;

pub fn transcript_ui(
    ui: &mut egui::Ui,
    theme: &Theme,
    messages: &[Message],
    modes: &mut HashMap<(String, String), ViewMode>,
    downloads_dir: &Path,
) {
    for message in messages {
        message_ui(ui, theme, message, modes, downloads_dir);
        ui.add_space(theme.spacing_12);
    }
}

pub fn message_ui(
    ui: &mut egui::Ui,
    theme: &Theme,
    message: &Message,
    modes: &mut HashMap<(String, String), ViewMode>,
    downloads_dir: &Path,
) {
    let (label, fill) = match message.role {
        Role::User => ("You", theme.user_bubble),
        Role::Assistant => ("Assistant", theme.surface_1),
    };

    ui.horizontal(|ui| {
        ui.label(RichText::new(label).small().strong().color(theme.text_muted));
        ui.label(
            RichText::new(message.timestamp.format("%H:%M").to_string())
                .small()
                .color(theme.text_muted),
        );
    });

    theme.bubble_frame(fill).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        super::markdown::markdown_ui(ui, theme, &message.content);
    });

    for artifact in &message.artifacts {
        ui.add_space(theme.spacing_8);
        let key = (message.id.clone(), artifact.id.clone());
        let mode = modes.entry(key).or_default();
        artifact_ui(ui, theme, artifact, mode, downloads_dir);
    }
}
