//! Markdown rendering into a flat sequence of typed blocks.
//!
//! Parsing is delegated to pulldown-cmark with the table extension enabled.
//! Block containers (quotes, lists) are flattened: a heading or a table nested
//! inside them is emitted at the point where it closes, so the resulting
//! sequence is the document-order list of every block element.
//!
//! Raw HTML blocks are kept as [`Block::Html`], and any `<h3>` or `<table>`
//! elements written inside them are also emitted as headings and tables right
//! after it.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor pattern is valid")
});

static HTML_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h3\b[^>]*>(.*?)</h3\s*>|<table\b[^>]*>(.*?)</table\s*>")
        .expect("element pattern is valid")
});

static HTML_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("row pattern is valid")
});

static HTML_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</(?:th|td)\s*>").expect("cell pattern is valid")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// A single table cell with its plain text and first hyperlink target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub link: Option<String>,
}

impl Cell {
    pub fn new(text: &str, link: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            link: link.map(str::to_string),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Target of the first hyperlink found inside the cell.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

/// A rendered table. The first row is the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// All rows after the header row.
    pub fn body(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: HeadingLevel, text: String },
    Table(Table),
    Paragraph(String),
    ListItem(String),
    CodeBlock(String),
    Html(String),
    Rule,
}

/// Rendered markup tree, read-only once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// Render markdown text into a [`Document`]. Never fails; anything the parser
/// does not recognize ends up as literal paragraph text.
pub fn render(markdown: &str) -> Document {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(markdown, options) {
        builder.handle(event);
    }

    log::debug!("rendered {} blocks", builder.blocks.len());
    Document::from_blocks(builder.blocks)
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    heading: Option<HeadingLevel>,
    inline: Option<String>,
    // open list items, innermost last
    items: Vec<String>,
    code: Option<String>,
    html: Option<String>,
    table: Option<Vec<Row>>,
    row: Option<Vec<Cell>>,
    cell: Option<Cell>,
    image_depth: usize,
}

impl BlockBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag_end) => self.end(tag_end),
            Event::Text(text) | Event::Code(text) => self.push_text(&text),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Html(html) => {
                if let Some(buf) = self.html.as_mut() {
                    buf.push_str(&html);
                }
            }
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::Rule => self.blocks.push(Block::Rule),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.heading = Some(level);
                self.inline = Some(String::new());
            }
            Tag::Paragraph => {
                if self.cell.is_none() {
                    self.inline = Some(String::new());
                }
            }
            Tag::List(_) => {
                // text of the enclosing tight item comes before the nested list
                if let Some(item) = self.items.last_mut() {
                    let text = std::mem::take(item);
                    if !text.trim().is_empty() {
                        self.blocks.push(Block::ListItem(text));
                    }
                }
            }
            Tag::Item => self.items.push(String::new()),
            Tag::CodeBlock(_) => self.code = Some(String::new()),
            Tag::HtmlBlock => self.html = Some(String::new()),
            Tag::Table(_) => self.table = Some(Vec::new()),
            Tag::TableHead | Tag::TableRow => self.row = Some(Vec::new()),
            Tag::TableCell => self.cell = Some(Cell::default()),
            Tag::Link { dest_url, .. } => {
                if let Some(cell) = self.cell.as_mut() {
                    if cell.link.is_none() {
                        cell.link = Some(dest_url.to_string());
                    }
                }
            }
            Tag::Image { .. } => self.image_depth += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Heading(_) => {
                if let (Some(level), Some(text)) = (self.heading.take(), self.inline.take()) {
                    self.blocks.push(Block::Heading { level, text });
                }
            }
            TagEnd::Paragraph => {
                if let Some(text) = self.inline.take() {
                    self.blocks.push(Block::Paragraph(text));
                }
            }
            TagEnd::Item => {
                if let Some(text) = self.items.pop() {
                    if !text.trim().is_empty() {
                        self.blocks.push(Block::ListItem(text));
                    }
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.blocks.push(Block::CodeBlock(code));
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    let nested = html_blocks(&html);
                    self.blocks.push(Block::Html(html));
                    self.blocks.extend(nested);
                }
            }
            TagEnd::TableCell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell);
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let (Some(cells), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.push(Row::new(cells));
                }
            }
            TagEnd::Table => {
                if let Some(rows) = self.table.take() {
                    self.blocks.push(Block::Table(Table::new(rows)));
                }
            }
            TagEnd::Image => self.image_depth = self.image_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        // alt text is an attribute, not cell or heading content
        if self.image_depth > 0 {
            return;
        }
        let target = if let Some(cell) = self.cell.as_mut() {
            &mut cell.text
        } else if let Some(code) = self.code.as_mut() {
            code
        } else if let Some(inline) = self.inline.as_mut() {
            inline
        } else if let Some(item) = self.items.last_mut() {
            item
        } else {
            return;
        };
        target.push_str(text);
    }

    fn inline_html(&mut self, html: &str) {
        let Some(cell) = self.cell.as_mut() else {
            return;
        };
        if cell.link.is_some() {
            return;
        }
        cell.link = anchor_href(html);
    }
}

/// Decoded `href` of the first `<a>` tag in `html`.
fn anchor_href(html: &str) -> Option<String> {
    let caps = ANCHOR_HREF.captures(html)?;
    let href = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    Some(html_escape::decode_html_entities(href.as_str()).into_owned())
}

fn html_text(html: &str) -> String {
    let stripped = HTML_TAG.replace_all(html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Third-level headings and tables written as raw HTML, in document order.
fn html_blocks(html: &str) -> Vec<Block> {
    HTML_ELEMENT
        .captures_iter(html)
        .filter_map(|caps| match (caps.get(1), caps.get(2)) {
            (Some(heading), _) => Some(Block::Heading {
                level: HeadingLevel::H3,
                text: html_text(heading.as_str()),
            }),
            (None, Some(table)) => Some(Block::Table(html_table(table.as_str()))),
            (None, None) => None,
        })
        .collect()
}

fn html_table(html: &str) -> Table {
    let rows = HTML_ROW
        .captures_iter(html)
        .enumerate()
        .map(|(index, row)| {
            // header row holds <th> cells, body rows <td> cells
            let wanted = if index == 0 { "th" } else { "td" };
            let cells = HTML_CELL
                .captures_iter(&row[1])
                .filter(|cell| cell[1].eq_ignore_ascii_case(wanted))
                .map(|cell| Cell {
                    text: html_text(&cell[2]),
                    link: anchor_href(&cell[2]),
                })
                .collect();
            Row::new(cells)
        })
        .collect();
    Table::new(rows)
}
