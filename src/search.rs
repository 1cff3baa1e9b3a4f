//! Search predicates.

use crate::employee::{Department, Employee, EmployeeStatus};

/// A predicate evaluated against every stored record during a search.
pub trait Criteria<R: ?Sized> {
    fn matches(&self, record: &R) -> bool;
}

/// Conjunction of optional employee predicates. Unset fields match
/// everything, so `SearchCriteria::default()` matches every record.
///
/// Text fields use substring containment; with `case_sensitive == false`
/// both the field and the needle are lowercased before comparing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchCriteria {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub department: Option<Department>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
    pub skill: Option<String>,
    pub case_sensitive: bool,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn first_name(mut self, s: impl Into<String>) -> Self {
        self.first_name = Some(s.into());
        self
    }

    pub fn last_name(mut self, s: impl Into<String>) -> Self {
        self.last_name = Some(s.into());
        self
    }

    pub fn position(mut self, s: impl Into<String>) -> Self {
        self.position = Some(s.into());
        self
    }

    pub fn department(mut self, d: Department) -> Self {
        self.department = Some(d);
        self
    }

    /// Inclusive bounds; either side may be left open with `None`.
    pub fn salary_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    pub fn status(mut self, s: EmployeeStatus) -> Self {
        self.status = Some(s);
        self
    }

    pub fn skill(mut self, s: impl Into<String>) -> Self {
        self.skill = Some(s.into());
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.min_salary.is_none()
            && self.max_salary.is_none()
            && self.status.is_none()
            && self.skill.is_none()
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }

    fn text_matches(&self, field: &str, needle: &Option<String>) -> bool {
        needle.as_deref().map_or(true, |n| self.contains(field, n))
    }
}

impl Criteria<Employee> for SearchCriteria {
    fn matches(&self, e: &Employee) -> bool {
        if let Some(id) = &self.id {
            if &e.id != id {
                return false;
            }
        }
        if !self.text_matches(&e.first_name, &self.first_name)
            || !self.text_matches(&e.last_name, &self.last_name)
            || !self.text_matches(&e.position, &self.position)
        {
            return false;
        }
        if self.department.is_some_and(|d| d != e.department) {
            return false;
        }
        if self.min_salary.is_some_and(|min| e.salary < min)
            || self.max_salary.is_some_and(|max| e.salary > max)
        {
            return false;
        }
        if self.status.is_some_and(|s| s != e.status) {
            return false;
        }
        if let Some(skill) = &self.skill {
            if !e.skills.iter().any(|s| self.contains(s, skill)) {
                return false;
            }
        }
        true
    }
}

/// Matches every record.
#[derive(Copy, Clone, Debug, Default)]
pub struct MatchAll;

impl<R: ?Sized> Criteria<R> for MatchAll {
    #[inline]
    fn matches(&self, _record: &R) -> bool {
        true
    }
}
