//! Maps an artifact's content-kind tag (plus optional language) to the view
//! that should render it and the file extension used for downloads.

use crate::model::ArtifactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Syntax-highlighted code; the same view serves both tabs.
    Code,
    /// Rendered markdown with math segments.
    Markdown,
    /// Isolated HTML preview (scripts and styles never execute).
    HtmlFrame,
    /// Inline vector graphic from the raw markup.
    Svg,
    /// Diagram source shown as a framed monospace block.
    Diagram,
    /// Raw preformatted text; the fallback for anything unrecognized.
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub renderer: RendererKind,
    pub extension: &'static str,
}

/// Pure and total: unknown kinds fall through to plain text, unknown code
/// languages keep the highlighted view but download as `.txt`.
pub fn classify(kind: &ArtifactKind, language: Option<&str>) -> Classification {
    match kind {
        ArtifactKind::Code => Classification {
            renderer: RendererKind::Code,
            extension: code_extension(language),
        },
        ArtifactKind::Markdown => Classification {
            renderer: RendererKind::Markdown,
            extension: "md",
        },
        ArtifactKind::Html => Classification {
            renderer: RendererKind::HtmlFrame,
            extension: "html",
        },
        ArtifactKind::Svg => Classification {
            renderer: RendererKind::Svg,
            extension: "svg",
        },
        ArtifactKind::Diagram => Classification {
            renderer: RendererKind::Diagram,
            extension: "txt",
        },
        ArtifactKind::Other(_) => Classification {
            renderer: RendererKind::PlainText,
            extension: "txt",
        },
    }
}

fn code_extension(language: Option<&str>) -> &'static str {
    match language.map(|l| l.to_ascii_lowercase()).as_deref() {
        Some("javascript") => "js",
        Some("typescript") => "ts",
        Some("python") => "py",
        Some("html") => "html",
        Some("css") => "css",
        _ => "txt",
    }
}

/// Token handed to the syntax highlighter for the Source tab, mirroring how
/// the preview chooses a language when the artifact carries none.
pub fn source_token(kind: &ArtifactKind, language: Option<&str>) -> String {
    if let Some(lang) = language.filter(|l| !l.is_empty()) {
        return lang.to_ascii_lowercase();
    }
    match kind {
        ArtifactKind::Markdown => "md".to_string(),
        ArtifactKind::Html => "html".to_string(),
        ArtifactKind::Svg => "xml".to_string(),
        _ => "txt".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_routes_every_kind_per_table() {
        let cases = [
            (ArtifactKind::Code, RendererKind::Code, "txt"),
            (ArtifactKind::Markdown, RendererKind::Markdown, "md"),
            (ArtifactKind::Html, RendererKind::HtmlFrame, "html"),
            (ArtifactKind::Svg, RendererKind::Svg, "svg"),
            (ArtifactKind::Diagram, RendererKind::Diagram, "txt"),
            (
                ArtifactKind::Other("application/x-mystery".to_string()),
                RendererKind::PlainText,
                "txt",
            ),
        ];
        for (kind, renderer, extension) in cases {
            let got = classify(&kind, None);
            assert_eq!(got.renderer, renderer, "renderer for {kind:?}");
            assert_eq!(got.extension, extension, "extension for {kind:?}");
        }
    }

    #[test]
    fn code_extension_follows_language_tag() {
        let cases = [
            ("javascript", "js"),
            ("typescript", "ts"),
            ("python", "py"),
            ("html", "html"),
            ("css", "css"),
            ("rust", "txt"),
            ("", "txt"),
        ];
        for (language, extension) in cases {
            let got = classify(&ArtifactKind::Code, Some(language));
            assert_eq!(got.extension, extension, "extension for {language:?}");
            assert_eq!(got.renderer, RendererKind::Code);
        }
    }

    #[test]
    fn code_extension_is_case_insensitive() {
        assert_eq!(classify(&ArtifactKind::Code, Some("Python")).extension, "py");
        assert_eq!(classify(&ArtifactKind::Code, Some("JAVASCRIPT")).extension, "js");
    }

    #[test]
    fn source_token_falls_back_to_kind() {
        assert_eq!(source_token(&ArtifactKind::Code, Some("python")), "python");
        assert_eq!(source_token(&ArtifactKind::Code, Some("")), "txt");
        assert_eq!(source_token(&ArtifactKind::Markdown, None), "md");
        assert_eq!(source_token(&ArtifactKind::Svg, None), "xml");
        assert_eq!(
            source_token(&ArtifactKind::Other("x".to_string()), None),
            "txt"
        );
    }
}
