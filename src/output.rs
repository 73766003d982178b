use camino::Utf8Path;
use console::Style;

use crate::coverage::StatementMap;
use crate::mutants::Mutant;

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_mutant_summary(mutants: &[Mutant], file_count: usize) {
    if mutants.is_empty() {
        print_success("No mutable code found.");
        return;
    }
    let style = Style::new().yellow().bold();
    println!(
        "{} {} mutants in {} file{}",
        style.apply_to("!"),
        mutants.len(),
        file_count,
        if file_count == 1 { "" } else { "s" },
    );
    println!();
}

/// One line per mutant; `diff` adds the changed lines underneath.
pub fn print_mutant(index: usize, mutant: &Mutant, diff: Option<&str>) {
    let ref_style = Style::new().cyan().bold();
    let loc_style = Style::new().dim();
    let op_style = Style::new().magenta();
    let span = mutant.span();

    println!(
        "  {} {}:{}:{} {} {} → {}",
        ref_style.apply_to(format!("@m{}", index + 1)),
        mutant.source_file(),
        span.start.line + 1,
        span.start.column + 1,
        loc_style.apply_to(format!("[{}]", mutant.operator())),
        op_style.apply_to(mutant.original()),
        op_style.apply_to(mutant.replacement()),
    );

    let Some(diff) = diff else {
        return;
    };
    for line in diff.lines() {
        if line.starts_with('-') {
            println!("      {}", Style::new().red().apply_to(line));
        } else if line.starts_with('+') {
            println!("      {}", Style::new().green().apply_to(line));
        }
    }
}

pub fn print_operators(names: &[&str]) {
    for name in names {
        println!("  {}", Style::new().magenta().apply_to(name));
    }
}

/// Goes to stderr so instrumented code on stdout stays clean.
pub fn print_statement_map_summary(file: &Utf8Path, statement_map: &StatementMap) {
    let style = Style::new().green().bold();
    eprintln!(
        "{} {}: {} statements instrumented",
        style.apply_to("✓"),
        file,
        statement_map.len(),
    );
}
