//! Signup and login screens.

use crate::client::{Credentials, Reply, TaskApi};
use crate::form::Input;
use crate::notify::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialField {
    #[default]
    Username,
    Password,
}

impl CredentialField {
    pub fn toggle(self) -> Self {
        match self {
            CredentialField::Username => CredentialField::Password,
            CredentialField::Password => CredentialField::Username,
        }
    }
}

/// Username/password pair with the field that has focus.
#[derive(Debug, Clone, Default)]
pub struct CredentialsForm {
    pub username: Input,
    pub password: Input,
    pub focus: CredentialField,
}

impl CredentialsForm {
    pub fn focused_mut(&mut self) -> &mut Input {
        match self.focus {
            CredentialField::Username => &mut self.username,
            CredentialField::Password => &mut self.password,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.value(), self.password.value())
    }
}

#[derive(Debug, Default)]
pub struct SignupScreen {
    pub form: CredentialsForm,
}

impl SignupScreen {
    /// Registers the user; true when the backend accepted the signup.
    pub fn submit(&mut self, api: &impl TaskApi, notes: &mut Notifier) -> bool {
        notes.dismiss_all();
        if self.form.username.value().trim().is_empty()
            || self.form.password.value().trim().is_empty()
        {
            notes.error("Please fill all fields");
            return false;
        }

        match api.register(&self.form.credentials()) {
            Ok(reply) => {
                tracing::info!(username = self.form.username.value(), "registered");
                let message = reply.as_text().unwrap_or("Registration successful");
                notes.success(message);
                true
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "registration failed");
                if message.is_empty() {
                    notes.error("Registration failed");
                } else {
                    notes.error(message);
                }
                false
            }
        }
    }
}

/// Login outcome for a text reply: only a message mentioning success counts.
pub fn login_accepted(reply: &Reply) -> bool {
    match reply {
        Reply::Text(message) => message.contains("success"),
        Reply::Json(_) => true,
    }
}

#[derive(Debug, Default)]
pub struct LoginScreen {
    pub form: CredentialsForm,
    pub error: Option<String>,
}

impl LoginScreen {
    /// Logs in; returns the username to remember on success.
    pub fn submit(&mut self, api: &impl TaskApi) -> Option<String> {
        if self.form.username.value().trim().is_empty() {
            self.error = Some("Please type username".to_string());
            return None;
        }
        if self.form.password.value().trim().is_empty() {
            self.error = Some("Please type password".to_string());
            return None;
        }
        self.error = None;

        match api.login(&self.form.credentials()) {
            Ok(reply) if login_accepted(&reply) => {
                let username = self.form.username.value().to_string();
                tracing::info!(%username, "logged in");
                Some(username)
            }
            Ok(reply) => {
                tracing::info!(?reply, "login rejected");
                self.error = Some("Invalid username or password".to_string());
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.error = Some("Login failed".to_string());
                None
            }
        }
    }
}
