use inquire::{InquireError, error::InquireResult};

mod spinner;
mod style;

pub use spinner::Spinner;
pub use style::Style;

/// Unwraps a prompt the user may back out of.
///
/// Ctrl+C and Escape become `Ok(None)` so the landing gate, the REPL and
/// `configure` can each leave quietly; every other prompt failure (no TTY,
/// I/O) stays an error.
pub fn answered<T>(result: InquireResult<T>) -> InquireResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err),
    }
}
