//! Markdown-with-math rendering. Parsing goes through pulldown-cmark into a
//! small block model so the structure is testable without a UI; drawing maps
//! blocks onto egui widgets. Math segments are shown in a distinct styled
//! run rather than typeset.

use eframe::egui::{self, RichText};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::code;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineSpan {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub math: bool,
    pub link: Option<String>,
}

impl InlineSpan {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, spans: Vec<InlineSpan> },
    Paragraph(Vec<InlineSpan>),
    CodeBlock { language: Option<String>, code: String },
    ListItem { marker: String, spans: Vec<InlineSpan> },
    BlockQuote(Vec<InlineSpan>),
    MathBlock(String),
    Rule,
}

struct BlockParser {
    blocks: Vec<Block>,
    spans: Vec<InlineSpan>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: Option<String>,
    heading: Option<u8>,
    item_depth: usize,
    item_marker: String,
    quote_depth: usize,
    lists: Vec<Option<u64>>,
    code: Option<(Option<String>, String)>,
}

impl BlockParser {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            spans: Vec::new(),
            strong: 0,
            emphasis: 0,
            strikethrough: 0,
            link: None,
            heading: None,
            item_depth: 0,
            item_marker: String::new(),
            quote_depth: 0,
            lists: Vec::new(),
            code: None,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, buffer)) = self.code.as_mut() {
            buffer.push_str(text);
            return;
        }
        self.spans.push(InlineSpan {
            text: text.to_string(),
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            strikethrough: self.strikethrough > 0,
            code: false,
            math: false,
            link: self.link.clone(),
        });
    }

    fn flush_paragraph(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        if self.quote_depth > 0 {
            self.blocks.push(Block::BlockQuote(spans));
        } else {
            self.blocks.push(Block::Paragraph(spans));
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_paragraph();
                self.heading = Some(heading_rank(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = self.heading.take().unwrap_or(1);
                let spans = std::mem::take(&mut self.spans);
                self.blocks.push(Block::Heading { level, spans });
            }
            Event::Start(Tag::List(start)) => {
                self.flush_paragraph();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush_paragraph();
                self.item_depth += 1;
                self.item_marker = match self.lists.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{index}.");
                        *index += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
            }
            Event::End(TagEnd::Item) => {
                self.item_depth = self.item_depth.saturating_sub(1);
                let spans = std::mem::take(&mut self.spans);
                if !spans.is_empty() {
                    self.blocks.push(Block::ListItem {
                        marker: std::mem::take(&mut self.item_marker),
                        spans,
                    });
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush_paragraph();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush_paragraph();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_paragraph();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let token = info.split_whitespace().next().unwrap_or("").to_string();
                        (!token.is_empty()).then_some(token)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock { language, code });
                }
            }
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.link = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => self.link = None,
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                // Paragraphs inside a list item keep accumulating so the
                // whole item renders as one run.
                if self.item_depth == 0 {
                    self.flush_paragraph();
                }
            }
            Event::Text(text) => self.push_text(&text),
            Event::Code(text) => {
                self.spans.push(InlineSpan {
                    text: text.to_string(),
                    code: true,
                    link: self.link.clone(),
                    ..InlineSpan::default()
                });
            }
            Event::InlineMath(math) => {
                self.spans.push(InlineSpan {
                    text: math.to_string(),
                    math: true,
                    ..InlineSpan::default()
                });
            }
            Event::DisplayMath(math) => {
                self.flush_paragraph();
                self.blocks.push(Block::MathBlock(math.to_string()));
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.push_text(&raw),
            Event::TaskListMarker(done) => {
                self.push_text(if done { "☑ " } else { "☐ " });
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

pub fn parse_blocks(source: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_MATH);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut parser = BlockParser::new();
    for event in Parser::new_ext(source, options) {
        parser.handle(event);
    }
    parser.finish()
}

pub fn markdown_ui(ui: &mut egui::Ui, theme: &Theme, source: &str) {
    for block in parse_blocks(source) {
        match block {
            Block::Heading { level, spans } => {
                let size = match level {
                    1 => 18.0,
                    2 => 16.5,
                    3 => 15.0,
                    _ => 14.0,
                };
                let text: String = spans.iter().map(|s| s.text.as_str()).collect();
                ui.label(RichText::new(text).strong().size(size));
            }
            Block::Paragraph(spans) => spans_ui(ui, theme, &spans),
            Block::CodeBlock { language, code: source } => {
                code::code_block_ui(ui, theme, language.as_deref().unwrap_or("txt"), &source);
            }
            Block::ListItem { marker, spans } => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label(RichText::new(format!("  {marker} ")).color(theme.text_muted));
                    for span in &spans {
                        span_label(ui, theme, span);
                    }
                });
            }
            Block::BlockQuote(spans) => {
                theme.bubble_frame(theme.surface_2).show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing.x = 0.0;
                        for span in &spans {
                            let mut quoted = span.clone();
                            quoted.emphasis = true;
                            span_label(ui, theme, &quoted);
                        }
                    });
                });
            }
            Block::MathBlock(math) => {
                theme.code_frame().show(ui, |ui| {
                    ui.label(RichText::new(math).monospace().color(theme.math));
                });
            }
            Block::Rule => {
                ui.separator();
            }
        }
    }
}

fn spans_ui(ui: &mut egui::Ui, theme: &Theme, spans: &[InlineSpan]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            span_label(ui, theme, span);
        }
    });
}

fn span_label(ui: &mut egui::Ui, theme: &Theme, span: &InlineSpan) {
    let mut rich = RichText::new(&span.text);
    if span.code {
        rich = rich.code();
    }
    if span.strong {
        rich = rich.strong();
    }
    if span.emphasis {
        rich = rich.italics();
    }
    if span.strikethrough {
        rich = rich.strikethrough();
    }
    if span.math {
        rich = rich.monospace().color(theme.math);
    }
    match &span.link {
        Some(url) => {
            ui.hyperlink_to(rich, url);
        }
        None => {
            ui.label(rich);
        }
    }
}
