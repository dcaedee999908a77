//! Sign-in / sign-up form state.
//!
//! A successful sign-up does not sign the user in. The form walks a fixed
//! sequence instead: show the success banner, clear the fields, flip to login
//! mode with the email kept, then focus the password field.

use serde::{Deserialize, Serialize};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

impl AuthForm {
    /// First failing check wins, in field order.
    pub fn validate(&self, mode: AuthMode) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.trim().is_empty() {
            return Err("Password is required".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters long".to_string());
        }
        if mode == AuthMode::Signup {
            if normalize_username(&self.username).is_empty() {
                return Err("Username is required".to_string());
            }
            if self.full_name.trim().is_empty() {
                return Err("Full name is required".to_string());
            }
        }
        Ok(())
    }
}

/// Usernames are lowercase ASCII letters, digits, and underscores.
pub fn normalize_username(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Idle,
    Submitting,
    SuccessDisplay,
    ClearingFields,
    SwitchedToLogin,
    PasswordFocused,
}

/// One step of the post-sign-up sequence, entered `after_ms` after the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    pub phase: AuthPhase,
    pub after_ms: u64,
}

const SIGNUP_SEQUENCE: &[FlowStep] = &[
    FlowStep {
        phase: AuthPhase::SuccessDisplay,
        after_ms: 0,
    },
    FlowStep {
        phase: AuthPhase::ClearingFields,
        after_ms: 2000,
    },
    FlowStep {
        phase: AuthPhase::SwitchedToLogin,
        after_ms: 300,
    },
    FlowStep {
        phase: AuthPhase::PasswordFocused,
        after_ms: 100,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct AuthFlow {
    pub mode: AuthMode,
    pub phase: AuthPhase,
    pub error: Option<String>,
    /// Carried into login mode after a sign-up.
    pub email: Option<String>,
}

impl AuthFlow {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            phase: AuthPhase::Idle,
            error: None,
            email: None,
        }
    }

    /// Switches between login and signup, dropping any error. Ignored mid-submit.
    pub fn switch_mode(&mut self, mode: AuthMode) {
        if self.phase == AuthPhase::Submitting {
            return;
        }
        self.mode = mode;
        self.phase = AuthPhase::Idle;
        self.error = None;
    }

    pub fn begin_submit(&mut self, form: &AuthForm) -> Result<(), String> {
        if self.phase == AuthPhase::Submitting {
            return Err("A request is already in progress".to_string());
        }
        self.error = None;
        if let Err(message) = form.validate(self.mode) {
            self.error = Some(message.clone());
            return Err(message);
        }
        self.phase = AuthPhase::Submitting;
        Ok(())
    }

    pub fn fail(&mut self, message: String) {
        self.phase = AuthPhase::Idle;
        self.error = Some(message);
    }

    pub fn succeed_login(&mut self) {
        self.phase = AuthPhase::Idle;
        self.error = None;
        self.email = None;
    }

    /// Enters the post-sign-up sequence and returns the schedule the client plays.
    pub fn succeed_signup(&mut self, email: &str) -> Vec<FlowStep> {
        self.phase = AuthPhase::SuccessDisplay;
        self.error = None;
        self.email = Some(email.trim().to_string());
        SIGNUP_SEQUENCE.to_vec()
    }

    /// Moves one step along the post-sign-up sequence. Returns `None` outside it.
    pub fn advance(&mut self) -> Option<AuthPhase> {
        let next = match self.phase {
            AuthPhase::SuccessDisplay => AuthPhase::ClearingFields,
            AuthPhase::ClearingFields => AuthPhase::SwitchedToLogin,
            AuthPhase::SwitchedToLogin => AuthPhase::PasswordFocused,
            _ => return None,
        };
        if next == AuthPhase::SwitchedToLogin {
            self.mode = AuthMode::Login;
        }
        self.phase = next;
        Some(next)
    }

    /// Runs the rest of the sequence at once.
    pub fn finish_sequence(&mut self) {
        while self.advance().is_some() {}
    }
}
