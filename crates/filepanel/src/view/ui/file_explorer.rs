use crate::view::file_tree::{Caret, TreeRow};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_i18n::t;
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal columns per indentation level
const INDENT_COLUMNS: usize = 2;

pub struct FileExplorerRenderer;

impl FileExplorerRenderer {
    /// Render the panel into `area`: toolbar on top, rows below, status in the bottom border
    pub fn render(
        rows: &[TreeRow],
        toolbar: &[String],
        status: Option<&str>,
        frame: &mut Frame,
        area: Rect,
    ) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", t!("panel.title")))
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        if let Some(status) = status {
            block = block.title_bottom(format!(" {} ", status));
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let toolbar_height = if toolbar.is_empty() { 0 } else { 1 };
        let [toolbar_area, list_area] =
            Layout::vertical([Constraint::Length(toolbar_height), Constraint::Min(0)])
                .areas(inner);

        if !toolbar.is_empty() {
            let spans: Vec<Span> = toolbar
                .iter()
                .map(|command| {
                    Span::styled(format!("[{}] ", command), Style::default().fg(Color::Cyan))
                })
                .collect();
            frame.render_widget(Paragraph::new(Line::from(spans)), toolbar_area);
        }

        // Rows past the bottom are dropped; the panel has no scrolling
        let content_width = list_area.width as usize;
        let items: Vec<ListItem> = rows
            .iter()
            .take(list_area.height as usize)
            .map(|row| Self::render_row(row, content_width))
            .collect();
        frame.render_widget(List::new(items), list_area);
    }

    fn render_row(row: &TreeRow, content_width: usize) -> ListItem<'static> {
        let mut spans = Vec::new();

        // Listing children start at indentation 1
        let indent = row.indentation.saturating_sub(1) * INDENT_COLUMNS;
        if indent > 0 {
            spans.push(Span::raw(" ".repeat(indent)));
        }

        let caret = match row.caret {
            Caret::Open => "▾ ",
            Caret::Closed => "▸ ",
            Caret::None => "  ",
        };
        spans.push(Span::styled(caret, Style::default().fg(Color::Yellow)));

        let name_style = if row.name.starts_with('.') {
            Style::default().fg(Color::DarkGray)
        } else if row.caret != Caret::None {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let available = content_width.saturating_sub(indent + caret.width());
        spans.push(Span::styled(
            truncate_to_width(&row.name, available).into_owned(),
            name_style,
        ));

        ListItem::new(Line::from(spans))
    }
}

/// Shorten `text` to at most `width` columns, marking the cut with `…`
fn truncate_to_width(text: &str, width: usize) -> Cow<'_, str> {
    if text.width() <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    Cow::Owned(out)
}

/// Plain text of each buffer line, trailing blanks trimmed
pub fn buffer_to_lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            let mut x = area.left();
            while x < area.right() {
                let symbol = buffer[(x, y)].symbol();
                line.push_str(symbol);
                // Wide glyphs cover the cells after them
                x += symbol.width().max(1) as u16;
            }
            line.trim_end().to_string()
        })
        .collect()
}
