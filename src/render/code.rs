//! Syntax highlighting through syntect, emitted as egui layout jobs. The
//! syntax and theme sets are expensive to build, so they load once.

use std::sync::OnceLock;

use eframe::egui::text::LayoutJob;
use eframe::egui::{self, Color32, FontId, TextFormat};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::theme::Theme;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn syntect_theme() -> &'static SyntectTheme {
    let themes = THEME_SET.get_or_init(ThemeSet::load_defaults);
    themes
        .themes
        .get("base16-ocean.dark")
        .unwrap_or_else(|| themes.themes.values().next().expect("bundled themes"))
}

/// Builds a highlighted layout job for `code`. Unknown tokens highlight as
/// plain text; a highlighter error falls back to an unstyled monospace run,
/// never a panic.
pub fn highlight_job(code: &str, token: &str) -> LayoutJob {
    let font = FontId::monospace(13.0);
    let syntaxes = syntax_set();
    let syntax = syntaxes
        .find_syntax_by_token(token)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, syntect_theme());

    let mut job = LayoutJob::default();
    for line in code.split_inclusive('\n') {
        match highlighter.highlight_line(line, syntaxes) {
            Ok(ranges) => {
                for (style, piece) in ranges {
                    let fg = style.foreground;
                    job.append(
                        piece,
                        0.0,
                        TextFormat {
                            font_id: font.clone(),
                            color: Color32::from_rgb(fg.r, fg.g, fg.b),
                            ..TextFormat::default()
                        },
                    );
                }
            }
            Err(_) => {
                job.append(
                    line,
                    0.0,
                    TextFormat {
                        font_id: font.clone(),
                        ..TextFormat::default()
                    },
                );
            }
        }
    }
    job
}

pub fn code_block_ui(ui: &mut egui::Ui, theme: &Theme, token: &str, code: &str) {
    theme.code_frame().show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        egui::ScrollArea::horizontal()
            .id_salt(ui.next_auto_id())
            .show(ui, |ui| {
                ui.label(highlight_job(code, token));
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_text_equals_the_input_code() {
        let code = "def fib(n):\n    return n\n";
        let job = highlight_job(code, "python");
        assert_eq!(job.text, code);
    }

    #[test]
    fn unknown_token_still_produces_a_job() {
        let code = "anything at all";
        let job = highlight_job(code, "no-such-language");
        assert_eq!(job.text, code);
    }

    #[test]
    fn highlighting_is_idempotent() {
        let code = "const x = 1;\n";
        let a = highlight_job(code, "js");
        let b = highlight_job(code, "js");
        assert_eq!(a.text, b.text);
        assert_eq!(a.sections.len(), b.sections.len());
    }
}
