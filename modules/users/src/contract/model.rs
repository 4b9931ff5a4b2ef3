use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;

/// Limit applied when a caller asks for `page_size == 0`.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Pure user model for inter-crate communication (no serde).
///
/// The password is deliberately not part of this type: it is a write-only
/// value handed to create/update next to the profile and never read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    /// ISO 3166-1 alpha-2, stored upper-cased.
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for creating a new user.
///
/// `id` exists only so that a client-supplied identifier can be detected and
/// rejected; the storage layer always assigns a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
}

/// Partial update data for a user. Empty fields mean "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
}

/// List filter. Empty fields impose no constraint.
///
/// Text fields match as case-insensitive prefixes, `country` matches exactly
/// (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
}

/// Page request: `offset = page * page_size`, `limit = page_size` or the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

/// A single rejected input field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_country_code(s: &str) -> bool {
    char_len(s) == 2 && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Address part of a mailbox: `John Doe <john@x.com>` yields `john@x.com`,
/// a bare address is returned trimmed.
pub fn mailbox_address(raw: &str) -> &str {
    let s = raw.trim();
    match (s.rfind('<'), s.strip_suffix('>')) {
        (Some(open), Some(inner)) => inner[open + 1..].trim(),
        _ => s,
    }
}

impl NewUser {
    /// True when the caller supplied a non-nil identifier.
    pub fn has_preset_id(&self) -> bool {
        matches!(self.id, Some(id) if !id.is_nil())
    }

    /// Strict validation used on creation: every profile field is required.
    pub fn validate(&self) -> Result<(), FieldError> {
        if char_len(&self.first_name) < 2 {
            return Err(FieldError::new("first_name", "first name is too short"));
        }
        if char_len(&self.last_name) < 2 {
            return Err(FieldError::new("last_name", "last name is too short"));
        }
        if char_len(&self.nickname) < 3 {
            return Err(FieldError::new("nickname", "nickname is too short"));
        }
        if !is_country_code(&self.country) {
            return Err(FieldError::new(
                "country",
                "country code must be 2 letters",
            ));
        }
        if !mailbox_address(&self.email).validate_email() {
            return Err(FieldError::new("email", "invalid email address"));
        }
        Ok(())
    }

    /// Canonical stored form: no id, bare email address, upper-cased country.
    pub fn normalize(&mut self) {
        self.id = None;
        self.email = mailbox_address(&self.email).to_owned();
        self.country = self.country.to_uppercase();
    }
}

/// Relaxed validation shared by patches and filters: only non-empty fields are checked.
fn validate_if_not_empty(
    first_name: &str,
    last_name: &str,
    nickname: &str,
    email: &str,
    country: &str,
) -> Result<(), FieldError> {
    let too_short = |s: &str| !s.is_empty() && char_len(s) < 2;

    if too_short(first_name) {
        return Err(FieldError::new(
            "first_name",
            "first_name must be at least 2 characters",
        ));
    }
    if too_short(last_name) {
        return Err(FieldError::new(
            "last_name",
            "last_name must be at least 2 characters",
        ));
    }
    if too_short(nickname) {
        return Err(FieldError::new(
            "nickname",
            "nickname must be at least 2 characters",
        ));
    }
    if too_short(email) {
        return Err(FieldError::new(
            "email",
            "email must be at least 2 characters",
        ));
    }
    if !country.is_empty() && !is_country_code(country) {
        return Err(FieldError::new(
            "country",
            "country must have exactly 2 letters",
        ));
    }
    Ok(())
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn normalize(&mut self) {
        if !self.email.is_empty() {
            self.email = mailbox_address(&self.email).to_owned();
        }
        self.country = self.country.to_uppercase();
    }

    pub fn validate_if_not_empty(&self) -> Result<(), FieldError> {
        validate_if_not_empty(
            &self.first_name,
            &self.last_name,
            &self.nickname,
            &self.email,
            &self.country,
        )
    }
}

impl UserFilter {
    pub fn validate_if_not_empty(&self) -> Result<(), FieldError> {
        validate_if_not_empty(
            &self.first_name,
            &self.last_name,
            &self.nickname,
            &self.email,
            &self.country,
        )
    }
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.page < 0 {
            return Err(FieldError::new("page", "page must be a positive number"));
        }
        if self.page_size < 0 {
            return Err(FieldError::new(
                "page_size",
                "page size must be a positive number",
            ));
        }
        Ok(())
    }

    /// Rows to skip. Only meaningful after `validate()` succeeded.
    pub fn offset(&self) -> u64 {
        self.page.max(0).saturating_mul(self.page_size.max(0)) as u64
    }

    /// Rows to return, falling back to `default_size` when `page_size` is zero.
    pub fn limit_or(&self, default_size: u64) -> u64 {
        if self.page_size > 0 {
            self.page_size as u64
        } else {
            default_size
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit_or(DEFAULT_PAGE_SIZE)
    }
}
