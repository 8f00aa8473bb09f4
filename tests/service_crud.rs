use anyhow::Result;
use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use server::{
    dto::{EmployeeDto, PageQuery},
    service::{EmployeeService, ServiceError},
};

async fn setup_service() -> Result<EmployeeService> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(EmployeeService::new(db))
}

fn employee(name: &str, email: &str) -> EmployeeDto {
    EmployeeDto {
        id: None,
        name: name.to_string(),
        email: email.to_string(),
        department: Some("Engineering".to_string()),
        salary: Some(1000.0),
        joining_date: NaiveDate::from_ymd_opt(2024, 1, 15),
    }
}

#[tokio::test]
async fn add_assigns_id_and_preserves_fields() -> Result<()> {
    let service = setup_service().await?;
    let created = service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    assert!(created.id.is_some());
    assert_eq!(created.name, "Ada Lovelace");
    assert_eq!(created.email, "ada@example.com");
    assert_eq!(created.department.as_deref(), Some("Engineering"));
    assert_eq!(created.salary, Some(1000.0));
    assert_eq!(created.joining_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    Ok(())
}

#[tokio::test]
async fn get_after_add_returns_equal_record() -> Result<()> {
    let service = setup_service().await?;
    let created = service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    let fetched = service.get_employee_by_id(created.id.unwrap()).await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_insert() -> Result<()> {
    let service = setup_service().await?;
    service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    let err = service
        .add_employee(employee("Grace Hopper", "ada@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEmail(email) if email == "ada@example.com"));
    assert_eq!(service.get_all_employees().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn operations_on_unknown_id_fail_with_not_found() -> Result<()> {
    let service = setup_service().await?;
    service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;

    let err = service.get_employee_by_id(42).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(42)));

    let err = service
        .update_employee(42, employee("Grace Hopper", "grace@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(42)));

    let err = service.delete_employee(42).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(42)));

    // none of the failures mutated the store
    assert_eq!(service.get_all_employees().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id() -> Result<()> {
    let service = setup_service().await?;
    let created = service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    let id = created.id.unwrap();

    let mut replacement = employee("Grace Hopper", "ada@example.com");
    replacement.id = Some(999);
    replacement.salary = Some(2000.0);
    replacement.department = None;

    let updated = service.update_employee(id, replacement).await?;
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.name, "Grace Hopper");
    assert_eq!(updated.department, None);

    let fetched = service.get_employee_by_id(id).await?;
    assert_eq!(fetched.salary, Some(2000.0));
    assert_eq!(fetched.id, Some(id));
    Ok(())
}

#[tokio::test]
async fn delete_then_exists_is_false() -> Result<()> {
    let service = setup_service().await?;
    let created = service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    let id = created.id.unwrap();
    assert!(service.exists_by_id(id).await?);

    service.delete_employee(id).await?;
    assert!(!service.exists_by_id(id).await?);
    Ok(())
}

#[tokio::test]
async fn exists_by_email_tracks_inserts() -> Result<()> {
    let service = setup_service().await?;
    assert!(!service.exists_by_email("ada@example.com").await?);
    service
        .add_employee(employee("Ada Lovelace", "ada@example.com"))
        .await?;
    assert!(service.exists_by_email("ada@example.com").await?);
    Ok(())
}

#[tokio::test]
async fn pagination_counts_and_ordering() -> Result<()> {
    let service = setup_service().await?;
    for i in 0..12 {
        service
            .add_employee(employee(&format!("Employee {i:02}"), &format!("e{i}@example.com")))
            .await?;
    }

    let request = PageQuery {
        page: 0,
        size: 10,
        sort_by: "id".to_string(),
    }
    .into_page_request()
    .unwrap();
    let page = service.get_employees_paged(request).await?;
    assert_eq!(page.content.len(), 10);
    assert_eq!(page.total_elements, 12);
    assert_eq!(page.total_pages, 2);

    let request = PageQuery {
        page: 1,
        size: 10,
        sort_by: "id".to_string(),
    }
    .into_page_request()
    .unwrap();
    let rest = service.get_employees_paged(request).await?;
    assert_eq!(rest.content.len(), 2);

    // sorted by name, the first record on page 0 is the lowest name
    let request = PageQuery {
        page: 0,
        size: 5,
        sort_by: "name".to_string(),
    }
    .into_page_request()
    .unwrap();
    let by_name = service.get_employees_paged(request).await?;
    assert_eq!(by_name.content[0].name, "Employee 00");
    Ok(())
}

#[tokio::test]
async fn page_past_the_end_is_empty_but_counts_all() -> Result<()> {
    let service = setup_service().await?;
    for i in 0..3 {
        service
            .add_employee(employee(&format!("Employee {i}"), &format!("e{i}@example.com")))
            .await?;
    }
    let request = PageQuery {
        page: 5,
        size: 10,
        sort_by: "id".to_string(),
    }
    .into_page_request()
    .unwrap();
    let page = service.get_employees_paged(request).await?;
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 3);
    Ok(())
}
