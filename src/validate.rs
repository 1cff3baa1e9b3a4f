//! Record validation, consulted by the table before every insert and update.

use crate::employee::Employee;
use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

pub trait Validator<R>: Send + Sync {
    fn validate(&self, record: &R) -> Result<(), ValidationError>;
}

/// Accepts every record.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl<R> Validator<R> for AcceptAll {
    #[inline]
    fn validate(&self, _record: &R) -> Result<(), ValidationError> {
        Ok(())
    }
}

pub const MAX_SALARY: f64 = 10_000_000.0;

// ASCII classes throughout: `\d` and `\s` would also accept other scripts'
// digits and spaces. Name whitespace excludes line breaks, which would
// split a record across lines of a data file.
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{4}$").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z \t\x0B\x0C'-]{2,50}$").unwrap());
static POSITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z \t\x0B\x0C-]{2,30}$").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn is_valid_position(position: &str) -> bool {
    POSITION_RE.is_match(position)
}

pub fn is_valid_salary(salary: f64) -> bool {
    (0.0..=MAX_SALARY).contains(&salary)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

// Field and list separators of the data file and CSV export.
fn has_separator(s: &str) -> bool {
    s.contains(|c| matches!(c, '|' | ',' | '\n' | '\r'))
}

/// A skill is stored in a `,`-joined list inside a `|`-separated line.
pub fn is_valid_skill(skill: &str) -> bool {
    !skill.trim().is_empty() && !has_separator(skill)
}

/// Empty means no manager.
pub fn is_valid_manager_id(id: &str) -> bool {
    !has_separator(id)
}

/// Field rules for [`Employee`]. The first failing rule is reported; email
/// and phone are optional and only checked when non-empty. Skills and the
/// manager id may not contain the separators of the line format, so every
/// valid record survives a save and load unchanged.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmployeeValidator;

impl Validator<Employee> for EmployeeValidator {
    fn validate(&self, e: &Employee) -> Result<(), ValidationError> {
        if !is_valid_id(&e.id) {
            return Err(ValidationError::InvalidKey { key: e.id.clone() });
        }
        if !is_valid_name(&e.first_name) || !is_valid_name(&e.last_name) {
            return Err(ValidationError::InvalidFormat { field: "name" });
        }
        if !is_valid_position(&e.position) {
            return Err(ValidationError::InvalidFormat { field: "position" });
        }
        if !is_valid_salary(e.salary) {
            return Err(ValidationError::OutOfRange {
                field: "salary",
                value: e.salary,
                min: 0.0,
                max: MAX_SALARY,
            });
        }
        if !e.email.is_empty() && !is_valid_email(&e.email) {
            return Err(ValidationError::InvalidFormat { field: "email" });
        }
        if !e.phone.is_empty() && !is_valid_phone(&e.phone) {
            return Err(ValidationError::InvalidFormat { field: "phone" });
        }
        if !e.skills.iter().all(|s| is_valid_skill(s)) {
            return Err(ValidationError::InvalidFormat { field: "skills" });
        }
        if !is_valid_manager_id(&e.manager_id) {
            return Err(ValidationError::InvalidFormat { field: "manager_id" });
        }
        Ok(())
    }
}
