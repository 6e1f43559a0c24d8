//! Terminal output

use console::{style, Term};

use crate::config::Verbosity;

/// Writes command results to stdout
#[derive(Debug)]
pub struct Output {
    term: Term,
    quiet: bool,
    use_color: bool,
}

impl Output {
    /// Output honouring `verbosity`; colours only on a terminal
    #[must_use]
    pub fn new(verbosity: Verbosity) -> Self {
        let term = Term::stdout();
        let use_color = term.is_term();
        Self {
            term,
            quiet: verbosity.is_quiet(),
            use_color,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line(&styled);
    }

    /// Print a key/value line
    pub fn field(&self, key: &str, value: &str) {
        if self.quiet {
            return;
        }
        let key = if self.use_color {
            style(key).cyan().to_string()
        } else {
            key.to_string()
        };
        let _ = self.term.write_line(&format!("  {key}: {value}"));
    }

    /// Print data, even in quiet mode
    pub fn data(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
