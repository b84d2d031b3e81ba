//! Form checks applied before anything is sent to the identity provider or
//! the backend.

use crate::domain_model::{CalendarDay, Task, TaskDraft, TaskTime};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_NAME_LEN: usize = 2;
pub const MIN_AGE: u32 = 13;
pub const PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address.")]
    Email,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords don't match")]
    PasswordMismatch,
    #[error("Username must be at least 3 characters.")]
    UsernameTooShort,
    #[error("Name must be at least 2 characters.")]
    NameTooShort,
    #[error("Age must be a positive number.")]
    AgeNotANumber,
    #[error("You must be at least 13 years old.")]
    TooYoung,
    #[error("Invalid phone number format (e.g., 1234567890).")]
    Phone,
    #[error("Title is required.")]
    TitleMissing,
    #[error("Time must be HH:MM.")]
    Time,
    #[error("Group name is required.")]
    GroupNameMissing,
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub age: String,
    pub phone_number: String,
}

/// Registration fields that end up in the backend profile record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub age: u32,
    pub phone_number: String,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or(ValidationError::Email)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

pub fn validate_sign_in(form: &SignInForm) -> Result<(), ValidationError> {
    validate_email(&form.email)?;
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_registration(form: &RegistrationForm) -> Result<Registration, ValidationError> {
    let username = form.username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    let name = form.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }
    validate_sign_in(&SignInForm {
        email: form.email.clone(),
        password: form.password.clone(),
    })?;
    if form.confirm_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    let age: u32 = form
        .age
        .trim()
        .parse()
        .map_err(|_| ValidationError::AgeNotANumber)?;
    if age == 0 {
        return Err(ValidationError::AgeNotANumber);
    }
    if age < MIN_AGE {
        return Err(ValidationError::TooYoung);
    }
    let phone = form.phone_number.trim();
    if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::Phone);
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(Registration {
        username: username.to_string(),
        name: name.to_string(),
        age,
        phone_number: phone.to_string(),
    })
}

/// Turns the add-task form into a task dated `draft.date`, or `fallback`
/// when the form did not pick a day.
pub fn validate_task(draft: &TaskDraft, fallback: CalendarDay) -> Result<Task, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleMissing);
    }
    let time: TaskTime = draft.time.parse().map_err(|_| ValidationError::Time)?;
    let content = draft.content.trim();
    Ok(Task {
        title: title.to_string(),
        time,
        date: draft.date.unwrap_or(fallback),
        content: (!content.is_empty()).then(|| content.to_string()),
        user_id: None,
        group_id: None,
    })
}

pub fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::GroupNameMissing)
    } else {
        Ok(())
    }
}
