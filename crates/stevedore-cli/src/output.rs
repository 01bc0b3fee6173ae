use colored::Colorize;

/// Colored user-facing progress messages.
///
/// `silent` suppresses info, success and warning lines; errors always print.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Reporter {
    silent: bool,
}

impl Reporter {
    pub(crate) fn new(silent: bool) -> Self {
        Self { silent }
    }

    pub(crate) fn info(&self, message: impl AsRef<str>) {
        if !self.silent {
            println!("{}", message.as_ref().blue());
        }
    }

    pub(crate) fn success(&self, message: impl AsRef<str>) {
        if !self.silent {
            println!("{}", message.as_ref().green());
        }
    }

    pub(crate) fn warn(&self, message: impl AsRef<str>) {
        if !self.silent {
            eprintln!("{}", message.as_ref().yellow());
        }
    }

    pub(crate) fn error(&self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref().red().bold());
    }
}
