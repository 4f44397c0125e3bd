//! Domain error types.

/// A script parse error with line/column information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Format the error with the offending source line and a caret under the column.
    pub fn display_with_context(&self, source: &str) -> String {
        let text = source
            .lines()
            .nth(self.line.saturating_sub(1))
            .unwrap_or_default();
        let caret = " ".repeat(self.column.saturating_sub(1)) + "^";
        format!(
            "{text}\n{caret}\n{err}",
            text = text,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for pinebt.
#[derive(Debug, thiserror::Error)]
pub enum PinebtError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ScriptParse(#[from] ParseError),

    #[error("failed to read script {path}: {reason}")]
    ScriptRead { path: String, reason: String },

    #[error("market data is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid market data at row {row}: {reason}")]
    InvalidData { row: usize, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PinebtError> for std::process::ExitCode {
    fn from(err: &PinebtError) -> Self {
        let code: u8 = match err {
            PinebtError::Io(_) | PinebtError::Report { .. } => 1,
            PinebtError::ConfigParse { .. }
            | PinebtError::ConfigMissing { .. }
            | PinebtError::ConfigInvalid { .. } => 2,
            PinebtError::ScriptParse(_) | PinebtError::ScriptRead { .. } => 4,
            PinebtError::MissingColumn { .. } | PinebtError::InvalidData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError {
            message: "expected ')'".into(),
            line: 2,
            column: 5,
        };
        assert_eq!(
            err.to_string(),
            "parse error at line 2, column 5: expected ')'"
        );
    }

    #[test]
    fn display_with_context_points_at_column() {
        let err = ParseError {
            message: "expected ')'".into(),
            line: 2,
            column: 4,
        };
        let ctx = err.display_with_context("x = 1\ny = (2\n");
        let lines: Vec<&str> = ctx.lines().collect();
        assert_eq!(lines[0], "y = (2");
        assert_eq!(lines[1], "   ^");
        assert!(lines[2].contains("line 2"));
    }

    #[test]
    fn missing_column_message() {
        let err = PinebtError::MissingColumn {
            column: "volume".into(),
        };
        assert_eq!(
            err.to_string(),
            "market data is missing required column 'volume'"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        let cfg = PinebtError::ConfigMissing {
            section: "backtest".into(),
            key: "initial_capital".into(),
        };
        let script = PinebtError::ScriptParse(ParseError {
            message: "x".into(),
            line: 1,
            column: 1,
        });
        let data = PinebtError::MissingColumn {
            column: "open".into(),
        };
        let code = |e: &PinebtError| format!("{:?}", std::process::ExitCode::from(e));
        assert_eq!(code(&cfg), format!("{:?}", std::process::ExitCode::from(2)));
        assert_eq!(code(&script), format!("{:?}", std::process::ExitCode::from(4)));
        assert_eq!(code(&data), format!("{:?}", std::process::ExitCode::from(5)));
    }
}
