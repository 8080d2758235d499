use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

pub fn get_styles() -> Styles {
    let accent = |color: AnsiColor| Style::new().bold().fg_color(Some(Color::Ansi(color)));
    Styles::styled()
        .usage(accent(AnsiColor::Cyan).underline())
        .header(accent(AnsiColor::Cyan).underline())
        .literal(accent(AnsiColor::Green))
        .invalid(accent(AnsiColor::Red))
        .error(accent(AnsiColor::Red))
        .valid(accent(AnsiColor::Green))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 200,
        b: 220,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 220,
        b: 120,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

fn print_status(mark: &str, color: CtColor, message: &str) {
    println!(" {} {}", mark.with(color).bold(), message.with(color));
}

pub fn print_success(message: &str) {
    print_status("✓", colors::GREEN, message);
}

pub fn print_error(message: &str) {
    print_status("✗", colors::RED, message);
}

pub fn print_warning(message: &str) {
    print_status("⚠", colors::ORANGE, message);
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        "●".with(colors::CYAN),
        format!("{}:", key).with(colors::DIM),
        value
    );
}

/// A box-drawn table sized to the widest cell of each column.
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        TableBuilder {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.width()).collect(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.col_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(row);
    }

    fn border(&self, left: &str, junction: &str, right: &str) -> String {
        let segments: Vec<String> = self.col_widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(junction), right)
    }

    fn line(&self, cells: &[String], header: bool) -> String {
        let mut line = "│".with(colors::CYAN).to_string();
        for (i, width) in self.col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = " ".repeat(width.saturating_sub(cell.width()));
            let styled = if header {
                cell.with(colors::CYAN).bold().to_string()
            } else {
                cell.to_string()
            };
            line.push_str(&format!(" {}{} {}", styled, padding, "│".with(colors::CYAN)));
        }
        line
    }

    pub fn print(&self) {
        println!("{}", self.border("╭", "┬", "╮").with(colors::CYAN));
        println!("{}", self.line(&self.headers, true));
        println!("{}", self.border("├", "┼", "┤").with(colors::CYAN));
        for row in &self.rows {
            println!("{}", self.line(row, false));
        }
        println!("{}", self.border("╰", "┴", "╯").with(colors::CYAN));
    }
}
