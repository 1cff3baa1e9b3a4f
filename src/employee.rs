//! The employee record and its text encodings.

use crate::error::ParseError;
use crate::record::{CsvRow, LineCodec, Record};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Department {
    Engineering,
    Hr,
    Finance,
    Marketing,
    Operations,
    Sales,
    #[default]
    Unknown,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Engineering,
        Department::Hr,
        Department::Finance,
        Department::Marketing,
        Department::Operations,
        Department::Sales,
        Department::Unknown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Hr => "HR",
            Department::Finance => "Finance",
            Department::Marketing => "Marketing",
            Department::Operations => "Operations",
            Department::Sales => "Sales",
            Department::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
    Terminated,
}

impl EmployeeStatus {
    pub const ALL: [EmployeeStatus; 4] = [
        EmployeeStatus::Active,
        EmployeeStatus::Inactive,
        EmployeeStatus::OnLeave,
        EmployeeStatus::Terminated,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
            EmployeeStatus::OnLeave => "On Leave",
            EmployeeStatus::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum AccessLevel {
    #[default]
    Basic,
    Admin,
}

impl AccessLevel {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(AccessLevel::Basic),
            1 => Some(AccessLevel::Admin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AccessLevel::Basic => "Basic",
            AccessLevel::Admin => "Admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An employee keyed by `id` (e.g. `AB1234`).
///
/// Construction does not validate; pass records through a
/// [`Validator`](crate::validate::Validator) (the table does this on every
/// insert and update).
#[derive(Clone, Debug, PartialEq)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: Department,
    pub salary: f64,
    pub email: String,
    pub phone: String,
    pub hire_date: DateTime<Utc>,
    pub status: EmployeeStatus,
    pub skills: Vec<String>,
    pub manager_id: String,
    pub access_level: AccessLevel,
}

/// Current time truncated to whole seconds, the precision of the line format.
fn now_secs() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

impl Default for Employee {
    fn default() -> Self {
        Self {
            id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            position: String::new(),
            department: Department::Unknown,
            salary: 0.0,
            email: String::new(),
            phone: String::new(),
            hire_date: now_secs(),
            status: EmployeeStatus::Active,
            skills: Vec::new(),
            manager_id: String::new(),
            access_level: AccessLevel::Basic,
        }
    }
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        position: impl Into<String>,
        department: Department,
        salary: f64,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            position: position.into(),
            department,
            salary,
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_status(mut self, status: EmployeeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_manager(mut self, manager_id: impl Into<String>) -> Self {
        self.manager_id = manager_id.into();
        self
    }

    pub fn with_access(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    pub fn with_hire_date(mut self, hire_date: DateTime<Utc>) -> Self {
        self.hire_date = hire_date;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Employee {
    fn key(&self) -> &str {
        &self.id
    }
}

const FIELD_COUNT: usize = 12;

fn parse_index(field: &'static str, s: &str) -> Result<usize, ParseError> {
    s.trim().parse::<usize>().map_err(|_| ParseError::BadNumber {
        field,
        value: s.to_string(),
    })
}

fn variant<T>(field: &'static str, s: &str, f: impl FnOnce(usize) -> Option<T>) -> Result<T, ParseError> {
    f(parse_index(field, s)?).ok_or_else(|| ParseError::BadVariant {
        field,
        value: s.to_string(),
    })
}

impl LineCodec for Employee {
    /// `id|first|last|position|dept|salary|email|phone|hired|status|manager|access|skills`
    fn encode(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.id,
            self.first_name,
            self.last_name,
            self.position,
            self.department.index(),
            self.salary,
            self.email,
            self.phone,
            self.hire_date.timestamp(),
            self.status.index(),
            self.manager_id,
            self.access_level.index(),
            self.skills.join(","),
        )
    }

    fn decode(line: &str) -> Result<Self, ParseError> {
        let t: Vec<&str> = line.split('|').collect();
        if t.len() < FIELD_COUNT {
            return Err(ParseError::MissingFields {
                expected: FIELD_COUNT,
                found: t.len(),
            });
        }

        let salary = t[5].trim().parse::<f64>().map_err(|_| ParseError::BadNumber {
            field: "salary",
            value: t[5].to_string(),
        })?;
        let secs = t[8].trim().parse::<i64>().map_err(|_| ParseError::BadNumber {
            field: "hire_date",
            value: t[8].to_string(),
        })?;
        let hire_date = Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or(ParseError::BadTimestamp(secs))?;

        let skills = match t.get(FIELD_COUNT) {
            Some(s) if !s.is_empty() => s
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Ok(Employee {
            id: t[0].to_string(),
            first_name: t[1].to_string(),
            last_name: t[2].to_string(),
            position: t[3].to_string(),
            department: variant("department", t[4], Department::from_index)?,
            salary,
            email: t[6].to_string(),
            phone: t[7].to_string(),
            hire_date,
            status: variant("status", t[9], EmployeeStatus::from_index)?,
            manager_id: t[10].to_string(),
            access_level: variant("access_level", t[11], AccessLevel::from_index)?,
            skills,
        })
    }
}

impl CsvRow for Employee {
    fn csv_header() -> &'static str {
        "ID,FirstName,LastName,Position,Department,Salary,Email,Phone,HireDate,Status,ManagerID,Skills,AccessLevel"
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},\"{}\",{}",
            self.id,
            self.first_name,
            self.last_name,
            self.position,
            self.department,
            self.salary,
            self.email,
            self.phone,
            self.hire_date.format("%Y-%m-%d"),
            self.status,
            self.manager_id,
            self.skills.join(";"),
            self.access_level,
        )
    }
}
