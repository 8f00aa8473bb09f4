//! Conversion between the wire record and the storage record. Both
//! directions are plain field copies; the store owns id assignment.

use entity::employees;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::dto::EmployeeDto;

pub fn to_wire(model: employees::Model) -> EmployeeDto {
    EmployeeDto {
        id: Some(model.id),
        name: model.name,
        email: model.email,
        department: model.department,
        salary: model.salary,
        joining_date: model.joining_date,
    }
}

pub fn to_storage(dto: &EmployeeDto) -> employees::ActiveModel {
    employees::ActiveModel {
        id: NotSet,
        name: Set(dto.name.clone()),
        email: Set(dto.email.clone()),
        department: Set(dto.department.clone()),
        salary: Set(dto.salary),
        joining_date: Set(dto.joining_date),
    }
}
