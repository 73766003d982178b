use console::Style;

/// Operational log sink. Messages never end up in returned data.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Styled lines on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn info(&self, message: &str) {
        let dim = Style::new().dim();
        eprintln!("{} {}", dim.apply_to("·"), message);
    }

    fn error(&self, message: &str) {
        let style = Style::new().red().bold();
        eprintln!("{} {}", style.apply_to("✗"), message);
    }
}
