use carebook::api::{detail_sections, CmdMessage, MessageLevel, PLACEHOLDER};
use carebook::config::CarebookConfig;
use carebook::model::Record;
use carebook::query::Page;
use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TAG_WIDTH: usize = 20;
const TIME_WIDTH: usize = 14;
const INACTIVE_MARKER: &str = "✕";

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn print_page(page: &Page<Record>, page_size: usize) {
    if page.items.is_empty() {
        println!("No records found.");
    }

    let first = page.current_page.saturating_sub(1) * page_size;
    for (i, record) in page.items.iter().enumerate() {
        let idx_str = format!("{}. ", first + i + 1);
        let left_prefix = if record.is_active() {
            "    ".to_string()
        } else {
            format!("  {} ", INACTIVE_MARKER)
        };

        let tag = match record {
            Record::Report(r) => r.form_type.clone(),
            Record::Patient(p) => p.registernumber.clone(),
        }
        .unwrap_or_else(|| PLACEHOLDER.to_string());
        let tag = format!("{:>width$}", truncate_to_width(&tag, TAG_WIDTH), width = TAG_WIDTH);

        let time_ago = match record.resolved_time() {
            Some(at) => format_time_ago(at),
            None => format!("{:>width$}", PLACEHOLDER, width = TIME_WIDTH),
        };

        let name = record.name().unwrap_or(PLACEHOLDER);
        let title = match record.address() {
            Some(address) if !address.is_empty() => format!("{}, {}", name, address),
            _ => name.to_string(),
        };

        let fixed_width = left_prefix.width() + idx_str.width() + 1 + TAG_WIDTH + 1 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title, available);
        let padding = available.saturating_sub(title_display.width());

        let idx_colored = if record.is_active() {
            idx_str.normal()
        } else {
            idx_str.red()
        };

        println!(
            "{}{}{}{} {} {}",
            left_prefix,
            idx_colored,
            title_display,
            " ".repeat(padding),
            tag.yellow(),
            time_ago.dimmed()
        );
    }

    println!(
        "{}",
        format!(
            "Page {} of {} ({} records)",
            page.current_page, page.page_count, page.total
        )
        .dimmed()
    );
}

pub fn print_record(record: &Record, route: Option<&str>) {
    println!(
        "{} {}",
        record.id().yellow(),
        record.name().unwrap_or(PLACEHOLDER).bold()
    );
    if let Some(route) = route {
        println!("{}", route.dimmed());
    }

    for section in detail_sections(record) {
        println!();
        println!("{}", section.title.bold());
        println!("--------------------------------");
        let label_width = section
            .fields
            .iter()
            .map(|(label, _)| label.width())
            .max()
            .unwrap_or(0);
        for (label, value) in &section.fields {
            let padding = label_width.saturating_sub(label.width());
            let value = if value == PLACEHOLDER {
                value.dimmed()
            } else {
                value.normal()
            };
            println!("  {}{}  {}", label, " ".repeat(padding), value);
        }
    }
}

pub fn print_options(options: &[String]) {
    for option in options {
        println!("{}", option);
    }
}

pub fn print_config(config: &CarebookConfig) {
    println!("page-size = {}", config.page_size);
    println!("confirmation-code = {}", config.confirmation_code);
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
