//! Status/message envelope printed by the data-producing commands.

use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// `{"status": "success", ...payload}` or `{"status": "error", "message": ...}`.
/// The payload must serialize as a JSON object.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Report<T> {
    Success(T),
    Error { message: String },
}

impl<T: Serialize> Report<T> {
    pub fn from_result(result: &Result<T>) -> Report<&T> {
        match result {
            Ok(payload) => Report::Success(payload),
            Err(e) => Report::Error {
                message: e.to_string(),
            },
        }
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Print the outcome of `result` and hand the error back for the exit code.
pub fn emit<T: Serialize, W: Write>(result: Result<T>, out: W) -> Result<()> {
    Report::from_result(&result).write_to(out)?;
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Payload {
        output_file: String,
        total_accounts: usize,
    }

    fn rendered<T: Serialize>(report: &Report<T>) -> serde_json::Value {
        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_success_flattens_payload() {
        let result: Result<Payload> = Ok(Payload {
            output_file: "filled.xlsx".into(),
            total_accounts: 3,
        });
        let report = Report::from_result(&result);

        assert_eq!(
            rendered(&report),
            json!({"status": "success", "output_file": "filled.xlsx", "total_accounts": 3})
        );
    }

    #[test]
    fn test_error_message() {
        let result: Result<Payload> = Err(Error::FileNotFound(PathBuf::from("template.xlsx")));

        assert_eq!(
            rendered(&Report::from_result(&result)),
            json!({"status": "error", "message": "file not found: template.xlsx"})
        );
    }

    #[test]
    fn test_emit_returns_error() {
        let mut out = Vec::new();
        let err = emit::<Payload, _>(
            Err(Error::Transport("connection refused".into())),
            &mut out,
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), 5);
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["status"], "error");
    }
}
