//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::{AllocTree, FlatRow};

const INDENT_WIDTH: usize = 2;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Fixed-point rendering of a value; non-finite becomes "-".
pub fn format_value(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{value:.precision$}")
    } else {
        "-".to_string()
    }
}

/// Variance as a signed percentage; non-finite (zero baseline) becomes "-".
pub fn format_variance(variance: f64, precision: usize) -> String {
    if variance.is_finite() {
        format!("{variance:+.precision$}%")
    } else {
        "-".to_string()
    }
}

/// Print the allocation table: indented labels, values, variance, and a
/// bold grand-total row.
pub fn print_table(tree: &AllocTree, precision: usize) {
    let rows = tree.flatten();

    let label_width = rows
        .iter()
        .map(|r| r.depth * INDENT_WIDTH + r.label.chars().count())
        .chain(std::iter::once("Grand Total".len()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|r| format_value(r.value, precision).len())
        .chain(std::iter::once(
            format_value(tree.grand_total(), precision).len(),
        ))
        .max()
        .unwrap_or(0)
        .max("Value".len());

    println!(
        "{}",
        format!("{:<label_width$}  {:>value_width$}  {:>10}", "Label", "Value", "Variance").bold()
    );
    for row in &rows {
        let indent = " ".repeat(row.depth * INDENT_WIDTH);
        let label = format!("{indent}{}", row.label);
        let value = format_value(row.value, precision);
        let variance = format_variance(row.variance, precision);
        println!("{label:<label_width$}  {value:>value_width$}  {variance:>10}");
    }

    let total = format_value(tree.grand_total(), precision);
    println!(
        "{}",
        format!("{:<label_width$}  {total:>value_width$}", "Grand Total").bold()
    );
}

fn node_line(row_label: &str, value: f64, variance: f64, precision: usize) -> String {
    format!(
        "{} [{}  {}]",
        row_label,
        format_value(value, precision),
        format_variance(variance, precision)
    )
}

fn to_termtree(tree: &AllocTree, idx: generational_arena::Index, precision: usize) -> Tree<String> {
    let node = match tree.get_node(idx) {
        Some(node) => node,
        None => return Tree::new(String::new()),
    };
    let leaves: Vec<Tree<String>> = node
        .children
        .iter()
        .map(|&child| to_termtree(tree, child, precision))
        .collect();
    Tree::new(node_line(
        &node.data.label,
        node.data.value,
        node.data.variance,
        precision,
    ))
    .with_leaves(leaves)
}

/// Print the hierarchy as one termtree per root.
pub fn print_tree(tree: &AllocTree, precision: usize) {
    let rendered = tree
        .roots()
        .iter()
        .map(|&root| to_termtree(tree, root, precision).to_string())
        .join("");
    print!("{rendered}");
}

/// Selector display line for a flat row.
pub fn selection_display(row: &FlatRow, precision: usize) -> String {
    let indent = " ".repeat(row.depth * INDENT_WIDTH);
    format!(
        "{indent}{} ({})  {}",
        row.label,
        row.id,
        format_value(row.value, precision)
    )
}
