/// What the user entered on the landing gate.
#[derive(Debug, Clone, Default)]
pub struct AccessForm {
    pub consent: bool,
    pub password: String,
}

/// Reasons the landing gate refuses entry. `Display` is the inline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Please accept the guidelines to proceed.")]
    ConsentRequired,
    #[error("Enter the access password.")]
    PasswordRequired,
    #[error("Invalid password.")]
    InvalidPassword,
}

impl AccessForm {
    /// Checks the form locally and returns the trimmed password to verify.
    pub fn validate(&self) -> Result<&str, GateError> {
        if !self.consent {
            return Err(GateError::ConsentRequired);
        }
        let password = self.password.trim();
        if password.is_empty() {
            return Err(GateError::PasswordRequired);
        }
        Ok(password)
    }
}

/// Which part of the UI is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    App,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_checked_before_password() {
        let form = AccessForm {
            consent: false,
            password: String::new(),
        };
        assert_eq!(form.validate(), Err(GateError::ConsentRequired));
    }

    #[test]
    fn test_blank_password_rejected() {
        let form = AccessForm {
            consent: true,
            password: "   ".to_string(),
        };
        assert_eq!(form.validate(), Err(GateError::PasswordRequired));
    }

    #[test]
    fn test_password_is_trimmed() {
        let form = AccessForm {
            consent: true,
            password: "  open-sesame \n".to_string(),
        };
        assert_eq!(form.validate(), Ok("open-sesame"));
    }

    #[test]
    fn test_gate_messages() {
        assert_eq!(
            GateError::ConsentRequired.to_string(),
            "Please accept the guidelines to proceed."
        );
        assert_eq!(
            GateError::PasswordRequired.to_string(),
            "Enter the access password."
        );
        assert_eq!(GateError::InvalidPassword.to_string(), "Invalid password.");
    }
}
