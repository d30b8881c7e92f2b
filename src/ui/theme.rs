//! Colors and message prefixes.

use console::Style;

#[derive(Debug, Clone)]
pub struct ComcolTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub dim: Style,
    pub header: Style,
    pub border: Style,
}

impl Default for ComcolTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ComcolTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            border: Style::new().dim(),
        }
    }

    /// No styling, for non-TTY output or `--no-color`.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            border: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("[CC] {}", title)))
    }

    /// A boxed block with a title bar.
    pub fn format_block(&self, title: &str, body: &str) -> String {
        let b = &self.border;
        let mut out = format!("  {} {}\n", b.apply_to("┌─"), self.error.apply_to(title));
        for line in body.lines() {
            out.push_str(&format!("  {} {}\n", b.apply_to("│"), line));
        }
        out.push_str(&format!("  {}", b.apply_to("└──────────────────────────────")));
        out
    }
}

/// Whether colors should be enabled for stdout.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_prefixes() {
        let theme = ComcolTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_error("broke"), "✗ broke");
        assert_eq!(theme.format_header("refresh"), "[CC] refresh");
    }

    #[test]
    fn block_has_one_row_per_line() {
        let block = ComcolTheme::plain().format_block("lmod", "first\nsecond");
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("lmod"));
        assert!(lines[1].ends_with("first"));
        assert!(lines[2].ends_with("second"));
    }
}
