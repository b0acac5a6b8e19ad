//! HTML form payloads and their validation rules

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{user::Registration, NewBook, Role};

static ISBN_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9][0-9-]*[0-9Xx]$").expect("static regex")
});

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const ISBN_MIN: usize = 10;
const ISBN_MAX: usize = 13;

/// Field name to error messages, in field order of the form
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Flatten validator output for templates
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        out.insert(field.to_string(), messages);
    }
    out
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_role(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Role>()
        .map(|_| ())
        .map_err(|_| invalid("role", "Not a valid choice"))
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if (NAME_MIN..=NAME_MAX).contains(&len) {
        Ok(())
    } else {
        Err(invalid("name", "Name must be between 2 and 100 characters"))
    }
}

fn validate_isbn(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if !(ISBN_MIN..=ISBN_MAX).contains(&value.chars().count()) {
        return Err(invalid("isbn", "Field must be between 10 and 13 characters long"));
    }
    if ISBN_CHARS.is_match(value) {
        Ok(())
    } else {
        Err(invalid("isbn", "ISBN may only contain digits, hyphens and a final X"))
    }
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| invalid("date", "Not a valid date value"))
}

fn validate_book_id(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(()),
        _ => Err(invalid("book_id", "Not a valid integer value")),
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default)]
    // users.email is VARCHAR(120)
    #[validate(
        email(message = "Invalid email address"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(other = "password", message = "Field must be equal to password"))]
    pub confirm_password: String,
    #[serde(default)]
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

impl RegisterForm {
    /// Registration input from a validated form
    pub fn to_registration(&self) -> Option<Registration> {
        let role = self.role.parse().ok()?;
        Some(Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddBookForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "This field is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "This field is required"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "This field is required"))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(custom(function = "validate_date"))]
    pub publication_date: String,
}

impl AddBookForm {
    pub fn to_new_book(&self) -> Option<NewBook> {
        let publication_date =
            NaiveDate::parse_from_str(self.publication_date.trim(), DATE_FORMAT).ok()?;
        Some(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            isbn: self.isbn.trim().to_string(),
            publication_date,
        })
    }
}

/// Shared by the borrow and return forms
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BookIdForm {
    #[serde(default)]
    #[validate(custom(function = "validate_book_id"))]
    pub book_id: String,
}

impl BookIdForm {
    pub fn book_id(&self) -> Option<i32> {
        self.book_id.trim().parse().ok().filter(|id| *id > 0)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChangePasswordForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required"))]
    pub new_password: String,
    #[serde(default)]
    #[validate(must_match(other = "new_password", message = "Field must be equal to new password"))]
    pub confirm_password: String,
}
