use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use eframe::egui::{self, RichText};

use crate::event::AppEvent;
use crate::render::{message::transcript_ui, ViewMode};
use crate::session::{SessionHandle, SessionPhase, SessionSnapshot};
use crate::theme::Theme;

pub struct ChatApp {
    rx: Receiver<AppEvent>,
    session: SessionHandle,
    snapshot: SessionSnapshot,
    input: String,
    notice: Option<String>,
    /// Preview/Source tab per artifact, keyed by (message id, artifact id).
    modes: HashMap<(String, String), ViewMode>,
    downloads_dir: PathBuf,
    theme: Theme,
}

impl ChatApp {
    pub fn new(rx: Receiver<AppEvent>, session: SessionHandle, downloads_dir: PathBuf) -> Self {
        Self {
            rx,
            session,
            snapshot: SessionSnapshot::empty(),
            input: String::new(),
            notice: None,
            modes: HashMap::new(),
            downloads_dir,
            theme: Theme::default(),
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                AppEvent::State(snapshot) => {
                    if let Some(notice) = &snapshot.notice {
                        self.notice = Some(notice.clone());
                    }
                    self.snapshot = snapshot;
                }
                AppEvent::RestoreDraft(draft) => {
                    // Only restore if the user has not started typing again.
                    if self.input.trim().is_empty() {
                        self.input = draft;
                    }
                }
            }
        }
    }

    fn stage_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.session.stage_path(path);
            } else if let Some(bytes) = file.bytes {
                self.session.stage_bytes(file.name.clone(), bytes.to_vec());
            }
        }
    }

    fn submit(&mut self) {
        let text = std::mem::take(&mut self.input);
        self.session.send(text);
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let title = self
                .snapshot
                .conversation
                .as_ref()
                .map(|c| c.title.as_str())
                .unwrap_or("Colloquy");
            ui.heading(title);
            if self.snapshot.sending {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("New conversation").clicked() {
                    self.modes.clear();
                    self.session.create_new();
                }
            });
        });
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Recent").small().color(self.theme.text_muted));
        ui.add_space(self.theme.spacing_8);
        let current = self
            .snapshot
            .conversation
            .as_ref()
            .map(|c| c.id.clone());
        egui::ScrollArea::vertical()
            .id_salt("sidebar")
            .show(ui, |ui| {
                for summary in self.snapshot.recent.clone() {
                    let selected = current.as_deref() == Some(summary.id.as_str());
                    let label = format!("{} ({})", summary.title, summary.message_count);
                    if ui.selectable_label(selected, label).clicked() && !selected {
                        self.modes.clear();
                        self.session.open(summary.id.clone());
                    }
                }
            });
    }

    fn notice_bar(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.notice.clone() else {
            return;
        };
        self.theme
            .bubble_frame(self.theme.surface_2)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(notice).color(self.theme.danger));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.notice = None;
                        }
                    });
                });
            });
        ui.add_space(self.theme.spacing_8);
    }

    fn staged_chips(&mut self, ui: &mut egui::Ui) {
        if self.snapshot.staged.is_empty() {
            return;
        }
        ui.horizontal_wrapped(|ui| {
            for file in self.snapshot.staged.clone() {
                self.theme
                    .bubble_frame(self.theme.surface_2)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&file.name).small());
                            ui.label(
                                RichText::new(format_size(file.size))
                                    .small()
                                    .color(self.theme.text_muted),
                            );
                            if ui.small_button("×").clicked() {
                                self.session.unstage(file.id.clone());
                            }
                        });
                    });
            }
        });
        ui.add_space(self.theme.spacing_8);
    }

    fn composer(&mut self, ui: &mut egui::Ui) {
        self.theme.composer_frame().show(ui, |ui| {
            let send_clicked = ui
                .with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let clicked = ui.button("Send").clicked();
                    let edit = egui::TextEdit::singleline(&mut self.input)
                        .hint_text("Message the assistant…")
                        .desired_width(ui.available_width())
                        .frame(false);
                    let response = ui.add(edit);
                    let entered = response.lost_focus()
                        && ui.input(|input| input.key_pressed(egui::Key::Enter));
                    if entered {
                        response.request_focus();
                    }
                    clicked || entered
                })
                .inner;
            if send_clicked {
                self.submit();
            }
        });
    }

    fn transcript(&mut self, ui: &mut egui::Ui) {
        let messages = self
            .snapshot
            .conversation
            .as_ref()
            .map(|c| c.messages.clone())
            .unwrap_or_default();
        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if messages.is_empty() {
                    ui.add_space(self.theme.spacing_12);
                    ui.label(
                        RichText::new("Start the conversation below.")
                            .color(self.theme.text_muted),
                    );
                } else {
                    transcript_ui(
                        ui,
                        &self.theme,
                        &messages,
                        &mut self.modes,
                        &self.downloads_dir,
                    );
                }
            });
    }

    fn central(&mut self, ui: &mut egui::Ui) {
        match self.snapshot.phase.clone() {
            SessionPhase::Uninitialized | SessionPhase::Loading => {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
            SessionPhase::Failed(reason) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.label(RichText::new("Could not reach the backend").heading());
                    ui.label(RichText::new(reason).color(self.theme.text_muted));
                    ui.add_space(self.theme.spacing_12);
                    if ui.button("Retry").clicked() {
                        self.session.initialize();
                    }
                });
            }
            SessionPhase::Ready => {
                egui::TopBottomPanel::bottom("composer")
                    .frame(egui::Frame::new().fill(self.theme.surface_0))
                    .show_inside(ui, |ui| {
                        ui.add_space(self.theme.spacing_8);
                        self.notice_bar(ui);
                        self.staged_chips(ui);
                        self.composer(ui);
                        ui.add_space(self.theme.spacing_8);
                    });
                egui::CentralPanel::default()
                    .frame(egui::Frame::new().fill(self.theme.surface_0))
                    .show_inside(ui, |ui| {
                        self.transcript(ui);
                    });
            }
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.stage_dropped_files(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            self.top_bar(ui);
            ui.add_space(6.0);
        });

        egui::SidePanel::left("sidebar")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_8);
                self.sidebar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.central(ui);
        });
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_format_with_sensible_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
