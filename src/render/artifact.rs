//! Artifact cards: Preview/Source tabs, copy, download, and the per-kind
//! preview dispatch. HTML and SVG content come from the assistant backend
//! and are treated as trusted markup, but HTML previews still pass through
//! an isolation step that drops scripts and styles entirely.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use eframe::egui::{self, RichText};
use tracing::warn;

use super::{code, markdown};
use crate::classify::{classify, source_token, RendererKind};
use crate::model::Artifact;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Source,
}

pub fn artifact_ui(
    ui: &mut egui::Ui,
    theme: &Theme,
    artifact: &Artifact,
    mode: &mut ViewMode,
    downloads_dir: &Path,
) {
    let classification = classify(&artifact.kind, artifact.language.as_deref());

    theme.card_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            let title = artifact.title.as_deref().unwrap_or("Artifact");
            ui.label(RichText::new(title).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save").clicked() {
                    // Failures here are log-only by design.
                    if let Err(err) = save_artifact(downloads_dir, artifact) {
                        warn!(artifact = %artifact.id, "download failed: {err}");
                    }
                }
                if ui.button("Copy").clicked() {
                    ui.ctx().copy_text(artifact.content.clone());
                }
            });
        });

        // Code and plain text look the same from both tabs; skip the tab row.
        let tabbed = !matches!(
            classification.renderer,
            RendererKind::Code | RendererKind::PlainText
        );
        if tabbed {
            ui.horizontal(|ui| {
                ui.selectable_value(mode, ViewMode::Preview, "Preview");
                ui.selectable_value(mode, ViewMode::Source, "Source");
            });
        }

        ui.separator();

        if tabbed && *mode == ViewMode::Source {
            let token = source_token(&artifact.kind, artifact.language.as_deref());
            code::code_block_ui(ui, theme, &token, &artifact.content);
            return;
        }

        match classification.renderer {
            RendererKind::Code => {
                let token = source_token(&artifact.kind, artifact.language.as_deref());
                code::code_block_ui(ui, theme, &token, &artifact.content);
            }
            RendererKind::Markdown => {
                markdown::markdown_ui(ui, theme, &artifact.content);
            }
            RendererKind::HtmlFrame => {
                theme.bubble_frame(theme.surface_2).show(ui, |ui| {
                    let text = html_text_content(&artifact.content);
                    if text.is_empty() {
                        ui.label(RichText::new("(no renderable text)").color(theme.text_muted));
                    } else {
                        ui.label(text);
                    }
                });
            }
            RendererKind::Svg => {
                let uri = format!("bytes://artifact-{}.svg", artifact.id);
                let image = egui::Image::from_bytes(uri, artifact.content.clone().into_bytes())
                    .max_height(280.0)
                    .max_width(ui.available_width());
                // Markup the loader rejects degrades to the raw source
                // instead of an inline loader error.
                if image.load_for_size(ui.ctx(), ui.available_size()).is_ok() {
                    ui.add(image);
                } else {
                    preformatted_ui(ui, theme, &artifact.content);
                }
            }
            RendererKind::Diagram | RendererKind::PlainText => {
                preformatted_ui(ui, theme, &artifact.content);
            }
        }
    });
}

fn preformatted_ui(ui: &mut egui::Ui, theme: &Theme, content: &str) {
    theme.code_frame().show(ui, |ui| {
        ui.label(RichText::new(content).monospace());
    });
}

/// Extracts displayable text from HTML markup: tags are removed, script and
/// style element bodies are dropped wholesale, and a handful of common
/// entities are decoded. This is the isolation boundary for HTML previews —
/// nothing executable survives it.
pub fn html_text_content(html: &str) -> String {
    let mut out = String::new();
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        push_decoded(&mut out, &rest[..open]);
        rest = &rest[open..];

        let lower = rest.to_ascii_lowercase();
        let skip_to = if lower.starts_with("<script") {
            lower.find("</script").map(|end| end + "</script".len())
        } else if lower.starts_with("<style") {
            lower.find("</style").map(|end| end + "</style".len())
        } else {
            None
        };
        if let Some(skip) = skip_to {
            rest = &rest[skip..];
        }

        match rest.find('>') {
            Some(close) => rest = &rest[close + 1..],
            None => {
                // Unterminated tag: nothing after it is text.
                rest = "";
            }
        }
        // A removed tag stays a word boundary between adjacent elements.
        out.push(' ');
    }
    push_decoded(&mut out, rest);

    // Collapse runs of whitespace left behind by removed markup.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_decoded(out: &mut String, text: &str) {
    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    out.push_str(&decoded);
}

/// Writes the artifact to `{title | "artifact"}.{extension}` under `dir`,
/// going through a sibling temp file so a failed write leaves nothing
/// half-finished behind.
pub fn save_artifact(dir: &Path, artifact: &Artifact) -> io::Result<PathBuf> {
    let classification = classify(&artifact.kind, artifact.language.as_deref());
    let stem = sanitize_file_name(artifact.title.as_deref().unwrap_or("artifact"));
    let final_path = dir.join(format!("{stem}.{}", classification.extension));
    let tmp_path = dir.join(format!(".{stem}.{}.tmp", classification.extension));

    fs::create_dir_all(dir)?;
    fs::write(&tmp_path, artifact.content.as_bytes())?;
    match fs::rename(&tmp_path, &final_path) {
        Ok(()) => Ok(final_path),
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn sanitize_file_name(raw: &str) -> String {
    let mut out = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch == ' ' {
            out.push('_');
        }
        if out.len() >= 64 {
            break;
        }
    }
    if out.is_empty() {
        "artifact".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactKind;

    fn artifact(kind: ArtifactKind, title: Option<&str>, content: &str) -> Artifact {
        Artifact {
            id: "a1".to_string(),
            title: title.map(String::from),
            kind,
            content: content.to_string(),
            language: None,
        }
    }

    #[test]
    fn html_preview_strips_tags_and_script_bodies() {
        let html = concat!(
            "<html><head><style>body { color: red }</style>",
            "<script>alert('xss')</script></head>",
            "<body><h1>Hello</h1><p>safe &amp; sound</p></body></html>"
        );
        let text = html_text_content(html);
        assert_eq!(text, "Hello safe & sound");
        assert!(!text.contains("alert"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn adjacent_elements_keep_a_word_boundary() {
        assert_eq!(html_text_content("<h1>Hello</h1><p>safe</p>"), "Hello safe");
        assert_eq!(html_text_content("<li>one</li><li>two</li>"), "one two");
    }

    #[test]
    fn html_preview_survives_unterminated_markup() {
        assert_eq!(html_text_content("text <b>bold"), "text bold");
        assert_eq!(html_text_content("broken <tag"), "broken");
    }

    #[test]
    fn unloadable_svg_renders_without_panicking() {
        // A bare context has no image loaders, so the load fails and the
        // card takes the raw-source fallback path.
        let ctx = egui::Context::default();
        let theme = crate::theme::Theme::default();
        let svg = artifact(ArtifactKind::Svg, Some("Broken"), "<svg nonsense");
        let mut mode = ViewMode::Preview;
        let dir = std::env::temp_dir();
        ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                artifact_ui(ui, &theme, &svg, &mut mode, &dir);
            });
        });
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("My Notes"), "My_Notes");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_name("??!!"), "artifact");
    }

    #[test]
    fn save_derives_the_classified_extension() {
        let dir = std::env::temp_dir().join(format!(
            "colloquy_save_test_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock after epoch")
                .as_nanos()
        ));

        let mut code = artifact(ArtifactKind::Code, Some("Fib Helper"), "print(1)");
        code.language = Some("python".to_string());
        let path = save_artifact(&dir, &code).expect("save succeeds");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("Fib_Helper.py"));
        assert_eq!(fs::read_to_string(&path).expect("file readable"), "print(1)");

        let untitled = artifact(ArtifactKind::Markdown, None, "# hi");
        let path = save_artifact(&dir, &untitled).expect("save succeeds");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("artifact.md"));

        let _ = fs::remove_dir_all(&dir);
    }
}
