//! Aggregate views over a snapshot of employees.
//!
//! Reports take a slice (typically [`Table::get_all`](crate::Table::get_all))
//! so they never hold the table lock while computing. They return data only;
//! rendering is left to the caller.

use crate::employee::{Department, Employee, EmployeeStatus};
use crate::error::ValidationError;
use crate::validate::Validator;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub struct DepartmentSummary {
    pub department: Department,
    pub count: usize,
    pub total_salary: f64,
    pub average_salary: f64,
}

/// One entry per department that has at least one employee, in
/// [`Department::ALL`] order.
pub fn department_summary(employees: &[Employee]) -> Vec<DepartmentSummary> {
    let mut acc = [(0usize, 0.0f64); Department::ALL.len()];
    for e in employees {
        let slot = &mut acc[e.department.index()];
        slot.0 += 1;
        slot.1 += e.salary;
    }
    Department::ALL
        .iter()
        .zip(acc)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(&department, (count, total_salary))| DepartmentSummary {
            department,
            count,
            total_salary,
            average_salary: total_salary / count as f64,
        })
        .collect()
}

/// Exclusive upper bounds of every salary band but the last.
pub const SALARY_BAND_BOUNDS: [f64; 5] = [30_000.0, 50_000.0, 75_000.0, 100_000.0, 150_000.0];
pub const SALARY_BAND_LABELS: [&str; 6] =
    ["<$30K", "$30K-50K", "$50K-75K", "$75K-100K", "$100K-150K", ">$150K"];

#[derive(Clone, Debug, PartialEq)]
pub struct SalaryReport {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Head counts per band, indexed like [`SALARY_BAND_LABELS`].
    pub bands: [usize; 6],
}

impl SalaryReport {
    /// Share of employees in band `i`, as a percentage.
    pub fn band_percent(&self, i: usize) -> f64 {
        100.0 * self.bands[i] as f64 / self.count as f64
    }
}

fn band_of(salary: f64) -> usize {
    SALARY_BAND_BOUNDS
        .iter()
        .position(|&bound| salary < bound)
        .unwrap_or(SALARY_BAND_BOUNDS.len())
}

/// `None` for an empty slice.
pub fn salary_report(employees: &[Employee]) -> Option<SalaryReport> {
    if employees.is_empty() {
        return None;
    }
    let mut salaries: Vec<f64> = employees.iter().map(|e| e.salary).collect();
    salaries.sort_by(f64::total_cmp);

    let n = salaries.len();
    let total: f64 = salaries.iter().sum();
    let median = if n % 2 == 0 {
        (salaries[n / 2 - 1] + salaries[n / 2]) / 2.0
    } else {
        salaries[n / 2]
    };
    let mut bands = [0usize; 6];
    for &s in &salaries {
        bands[band_of(s)] += 1;
    }

    Some(SalaryReport {
        count: n,
        total,
        average: total / n as f64,
        median,
        min: salaries[0],
        max: salaries[n - 1],
        bands,
    })
}

/// Head count for every status, zero counts included.
pub fn status_breakdown(employees: &[Employee]) -> [(EmployeeStatus, usize); 4] {
    let mut out = EmployeeStatus::ALL.map(|s| (s, 0));
    for e in employees {
        out[e.status.index()].1 += 1;
    }
    out
}

/// The `limit` most common skills, by descending count then name.
pub fn skill_frequency(employees: &[Employee], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for skill in employees.iter().flat_map(|e| &e.skills) {
        *counts.entry(skill.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(s, n)| (s.to_owned(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrgNode {
    pub id: String,
    pub name: String,
    pub position: String,
    pub reports: Vec<OrgNode>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hierarchy {
    /// Employees without a manager who manage someone.
    pub roots: Vec<OrgNode>,
    /// Manager ids referenced by some employee but not present, with the
    /// number of direct reports each has.
    pub external_managers: Vec<(String, usize)>,
}

/// Reporting tree, ordered by id at every level. An employee reachable
/// twice through a manager cycle appears once; the cycle edge is dropped.
pub fn hierarchy(employees: &[Employee]) -> Hierarchy {
    let by_id: HashMap<&str, &Employee> = employees.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut reports: BTreeMap<&str, Vec<&Employee>> = BTreeMap::new();
    for e in employees.iter().filter(|e| !e.manager_id.is_empty()) {
        reports.entry(e.manager_id.as_str()).or_default().push(e);
    }
    for subs in reports.values_mut() {
        subs.sort_by(|a, b| a.id.cmp(&b.id));
    }

    fn build<'a>(
        e: &'a Employee,
        reports: &BTreeMap<&str, Vec<&'a Employee>>,
        seen: &mut HashSet<&'a str>,
    ) -> OrgNode {
        seen.insert(e.id.as_str());
        let mut node = OrgNode {
            id: e.id.clone(),
            name: e.full_name(),
            position: e.position.clone(),
            reports: Vec::new(),
        };
        if let Some(subs) = reports.get(e.id.as_str()) {
            for &sub in subs {
                if !seen.contains(sub.id.as_str()) {
                    node.reports.push(build(sub, reports, seen));
                }
            }
        }
        node
    }

    let mut seen = HashSet::new();
    let mut out = Hierarchy::default();
    for (&manager, subs) in &reports {
        match by_id.get(manager) {
            Some(&m) if m.manager_id.is_empty() => out.roots.push(build(m, &reports, &mut seen)),
            Some(_) => {}
            None => out.external_managers.push((manager.to_owned(), subs.len())),
        }
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Audit {
    pub valid: usize,
    pub invalid: Vec<(String, ValidationError)>,
}

/// Re-check every employee, e.g. after the rules changed.
pub fn audit<V>(employees: &[Employee], validator: &V) -> Audit
where
    V: Validator<Employee> + ?Sized,
{
    let mut out = Audit::default();
    for e in employees {
        match validator.validate(e) {
            Ok(()) => out.valid += 1,
            Err(err) => out.invalid.push((e.id.clone(), err)),
        }
    }
    out
}
