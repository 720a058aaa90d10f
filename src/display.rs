use crate::semester::{models::Category, Semester};
use crate::utils::{
    models::{Position, TabChar},
    DATE_FORMAT,
};

/// Horizontal line of the table
fn line_table(widths: &[usize], position: &Position) -> String {
    let (left, middle, right) = position.joints();
    let bar = TabChar::Bh.val().to_string();

    let cells: Vec<_> = widths.iter().map(|width| bar.repeat(width + 2)).collect();

    format!(
        "{}{}{}",
        left.val(),
        cells.join(&middle.val().to_string()),
        right.val()
    )
}

/// Row of the table
fn row_table(widths: &[usize], cells: &[String]) -> String {
    let sep = TabChar::Bv.val();
    let mut row = sep.to_string();
    for (cell, width) in cells.iter().zip(widths) {
        row.push_str(&format!(" {cell:<width$} {sep}"));
    }

    row
}

/// Build the table of a category: one row per class
pub fn table(semester: &Semester, category: Category) -> Vec<String> {
    let header = ["Date", "Day", "Subject", "#"].map(ToOwned::to_owned);

    let rows: Vec<[String; 4]> = semester
        .occurrences(category)
        .map(|(_, occurrence)| {
            [
                occurrence.date.format(DATE_FORMAT).to_string(),
                occurrence.date.format("%a").to_string(),
                occurrence.subject.to_owned(),
                // Shown from 1, like the tasks
                (occurrence.number + 1).to_string(),
            ]
        })
        .collect();

    // Width of each column, from the longest cell
    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![
        line_table(&widths, &Position::Top),
        row_table(&widths, &header),
        line_table(&widths, &Position::Middle),
    ];
    lines.extend(rows.iter().map(|row| row_table(&widths, row)));
    lines.push(line_table(&widths, &Position::Bottom));

    lines
}

/// Categories to show: the given one, or every category with classes
fn shown(semester: &Semester, category: Option<Category>) -> Vec<Category> {
    match category {
        Some(category) => vec![category],
        None => Category::ALL
            .into_iter()
            .filter(|category| !semester.rules(*category).is_empty())
            .collect(),
    }
}

/// Display the classes of the semester, every category when none is given
pub fn semester(semester: &Semester, category: Option<Category>) {
    println!("Semester {}", semester.number);
    for category in shown(semester, category) {
        println!("\n{}", category.title());
        for line in table(semester, category) {
            println!("{line}");
        }
    }
}
