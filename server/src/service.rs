//! Business rules for employee records: uniqueness on create, not-found
//! semantics for id-addressed operations, pagination delegation.

use entity::employees;
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};
use thiserror::Error;
use tracing::info;

use crate::dto::{EmployeeDto, PageRequest, PageResponse};
use crate::mapper;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no employee found with id {0}")]
    NotFound(i64),
    #[error("email already exists: {0}")]
    DuplicateEmail(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct EmployeeService {
    db: DbPool,
}

impl EmployeeService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Insert a new record. The `exists_by_email` check is advisory; the
    /// unique constraint on `email` is the authoritative guard, and a
    /// lost race surfaces as `DuplicateEmail` as well.
    pub async fn add_employee(&self, dto: EmployeeDto) -> ServiceResult<EmployeeDto> {
        if self.exists_by_email(&dto.email).await? {
            return Err(ServiceError::DuplicateEmail(dto.email));
        }
        let inserted = mapper::to_storage(&dto)
            .insert(&self.db)
            .await
            .map_err(|err| classify_unique_violation(err, &dto.email))?;
        info!(id = inserted.id, "employee added");
        Ok(mapper::to_wire(inserted))
    }

    pub async fn get_all_employees(&self) -> ServiceResult<Vec<EmployeeDto>> {
        let rows = employees::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(mapper::to_wire).collect())
    }

    pub async fn get_employees_paged(
        &self,
        request: PageRequest,
    ) -> ServiceResult<PageResponse<EmployeeDto>> {
        let paginator = employees::Entity::find()
            .order_by_asc(request.sort)
            .paginate(&self.db, request.size);
        let totals = paginator.num_items_and_pages().await?;
        let rows = paginator.fetch_page(request.page).await?;
        Ok(PageResponse {
            content: rows.into_iter().map(mapper::to_wire).collect(),
            page: request.page,
            size: request.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn get_employee_by_id(&self, id: i64) -> ServiceResult<EmployeeDto> {
        let model = employees::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        Ok(mapper::to_wire(model))
    }

    /// Overwrite every mutable field of the stored record; the id is
    /// preserved regardless of what the payload carries. Email uniqueness
    /// is not re-checked here; the store constraint backstops it.
    pub async fn update_employee(&self, id: i64, dto: EmployeeDto) -> ServiceResult<EmployeeDto> {
        let existing = employees::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        let email = dto.email.clone();
        let mut active: employees::ActiveModel = existing.into();
        active.name = Set(dto.name);
        active.email = Set(dto.email);
        active.department = Set(dto.department);
        active.salary = Set(dto.salary);
        active.joining_date = Set(dto.joining_date);
        let updated = active
            .update(&self.db)
            .await
            .map_err(|err| classify_unique_violation(err, &email))?;
        info!(id, "employee updated");
        Ok(mapper::to_wire(updated))
    }

    pub async fn delete_employee(&self, id: i64) -> ServiceResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(id));
        }
        info!(id, "employee deleted");
        Ok(())
    }

    pub async fn exists_by_id(&self, id: i64) -> ServiceResult<bool> {
        let count = employees::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    pub async fn exists_by_email(&self, email: &str) -> ServiceResult<bool> {
        let count = employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

fn classify_unique_violation(err: DbErr, email: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::DuplicateEmail(email.to_string())
        }
        _ => ServiceError::Db(err),
    }
}
