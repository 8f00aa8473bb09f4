//! Wire-facing record shapes and the validation applied before any
//! service call.

use chrono::NaiveDate;
use entity::employees;
use serde::{Deserialize, Serialize};

/// The employee record as it appears in requests and responses.
///
/// `id` is assigned by the store; clients never supply it on create and a
/// supplied value is ignored on update.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
}

/// A single violated constraint, reported back in the 400 body.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl EmployeeDto {
    /// Shape checks applied before the service sees the record.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(FieldViolation {
                field: "name",
                message: "Name is mandatory",
            });
        }
        if !is_valid_email(&self.email) {
            violations.push(FieldViolation {
                field: "email",
                message: "Email should be valid",
            });
        }
        if let Some(salary) = self.salary {
            if salary <= 0.0 {
                violations.push(FieldViolation {
                    field: "salary",
                    message: "Salary must be a positive number",
                });
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn is_valid_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !raw.chars().any(char::is_whitespace)
}

fn default_page_size() -> u64 {
    10
}

fn default_sort_field() -> String {
    "id".to_string()
}

/// Raw pagination query parameters, defaults `page=0`, `size=10`,
/// `sortBy=id`.
#[derive(Clone, Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
    #[serde(default = "default_sort_field", rename = "sortBy")]
    pub sort_by: String,
}

/// A validated pagination request ready for the store.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: employees::Column,
}

impl PageQuery {
    pub fn into_page_request(self) -> Result<PageRequest, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        if self.size == 0 {
            violations.push(FieldViolation {
                field: "size",
                message: "size must be at least 1",
            });
        }
        let sort = sort_column(&self.sort_by);
        if sort.is_none() {
            violations.push(FieldViolation {
                field: "sortBy",
                message: "sortBy must be one of id, name, email, department, salary, joiningDate",
            });
        }
        match sort {
            Some(sort) if violations.is_empty() => Ok(PageRequest {
                page: self.page,
                size: self.size,
                sort,
            }),
            _ => Err(violations),
        }
    }
}

fn sort_column(field: &str) -> Option<employees::Column> {
    match field {
        "id" => Some(employees::Column::Id),
        "name" => Some(employees::Column::Name),
        "email" => Some(employees::Column::Email),
        "department" => Some(employees::Column::Department),
        "salary" => Some(employees::Column::Salary),
        "joiningDate" => Some(employees::Column::JoiningDate),
        _ => None,
    }
}

/// One bounded, sorted slice of the full result set.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> EmployeeDto {
        EmployeeDto {
            id: None,
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            department: None,
            salary: Some(1000.0),
            joining_date: None,
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn blank_name_and_bad_email_are_reported_together() {
        let dto = EmployeeDto {
            name: "  ".to_string(),
            email: "not-an-email".to_string(),
            ..valid_dto()
        };
        let violations = dto.validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn missing_fields_deserialize_to_violations() {
        let dto: EmployeeDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn non_positive_salary_is_rejected() {
        for salary in [0.0, -100.0] {
            let dto = EmployeeDto {
                salary: Some(salary),
                ..valid_dto()
            };
            assert!(dto.validate().is_err());
        }
        let dto = EmployeeDto {
            salary: None,
            ..valid_dto()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn email_syntax_edge_cases() {
        for bad in ["", "@x.com", "a@", "a@x", "a b@x.com", "a@.com", "a@x."] {
            assert!(!is_valid_email(bad), "{bad:?} should be invalid");
        }
        for good in ["a@x.com", "first.last@sub.domain.org"] {
            assert!(is_valid_email(good), "{good:?} should be valid");
        }
    }

    #[test]
    fn page_query_defaults_and_sort_mapping() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        let request = query.into_page_request().unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);

        let query = PageQuery {
            page: 2,
            size: 5,
            sort_by: "joiningDate".to_string(),
        };
        assert!(query.into_page_request().is_ok());
    }

    #[test]
    fn page_query_rejects_zero_size_and_unknown_sort() {
        let query = PageQuery {
            page: 0,
            size: 0,
            sort_by: "id".to_string(),
        };
        assert!(query.into_page_request().is_err());

        let query = PageQuery {
            page: 0,
            size: 10,
            sort_by: "favoriteColor".to_string(),
        };
        assert!(query.into_page_request().is_err());
    }
}
