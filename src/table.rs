use console::{Term, measure_text_width, style, truncate_str};

const COLORS: [fn(&str) -> console::StyledObject<&str>; 6] = [
    |s| style(s).yellow(),
    |s| style(s).green(),
    |s| style(s).blue(),
    |s| style(s).magenta(),
    |s| style(s).cyan(),
    |s| style(s).red(),
];

const SEPARATOR: usize = 2;
const MIN_COLUMN: usize = 4;

/// Fits column widths into `max_width`, shrinking proportionally when needed.
fn column_widths(headers: &[String], content: &[Vec<String>], max_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in content {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let separators = headers.len().saturating_sub(1) * SEPARATOR;
    let total: usize = widths.iter().sum();
    let available = max_width.saturating_sub(4 + separators);
    if total > 0 && total + separators > max_width.saturating_sub(4) {
        let scale = available as f64 / total as f64;
        for width in &mut widths {
            *width = ((*width as f64 * scale) as usize).max(MIN_COLUMN);
        }
    }
    widths
}

pub fn draw_table(table_header: String, headers: Vec<String>, content: Vec<Vec<String>>) {
    if content.is_empty() {
        println!("{} No data to display.", style("ℹ️").dim());
        return;
    }
    if headers.is_empty() {
        return;
    }

    let terminal_width = Term::stdout().size().1 as usize;
    let max_width = if terminal_width > 10 { terminal_width } else { 80 };
    let widths = column_widths(&headers, &content, max_width);

    let content_width = widths.iter().sum::<usize>() + (widths.len() - 1) * SEPARATOR;
    let gap = " ".repeat(SEPARATOR);

    println!("{}", style(&table_header).bold());
    println!(
        "{}",
        "━".repeat(measure_text_width(&table_header).max(content_width))
    );

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{:<w$}", style(header).bold().cyan(), w = *width))
        .collect();
    println!("{}", header_line.join(&gap));
    println!("{}", "-".repeat(content_width));

    for row in &content {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                let shown = truncate_str(cell, *width, "...");
                format!("{:<w$}", COLORS[i % COLORS.len()](&shown), w = *width)
            })
            .collect();
        println!("{}", cells.join(&gap));
    }
}
