//! HR and manager directory handlers.
//!
//! HR has full access; managers may list and read their direct reports.
//! Address and date of birth are returned only to HR.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{NewAccount, User, sees_personal_details};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, message_only};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::session::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::inbound::http::validation::{FieldName, parse_user_id};
use crate::inbound::http::views::UserView;

const EMPLOYEE_ID: FieldName = FieldName::new("id");

fn view_for(viewer: &User, target: &User) -> UserView {
    UserView::for_viewer(target, sees_personal_details(viewer, target))
}

/// HR creates an employee account, optionally reporting to a manager.
#[utoipa::path(
    post,
    path = "/api/v1/hr/employees",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Employee created", body = UserView),
        (status = 400, description = "Invalid request or non-employee role", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not HR", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "createEmployee"
)]
#[post("/hr/employees")]
pub async fn create_employee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let account = NewAccount::try_from(payload.into_inner())?;
    let user = state
        .registration
        .create_employee(caller.id(), account)
        .await?;
    Ok(Envelope::created("Employee created", UserView::full(&user)))
}

/// Every employee for HR; direct reports for a manager.
#[utoipa::path(
    get,
    path = "/api/v1/hr/employees",
    responses(
        (status = 200, description = "Employees", body = [UserView]),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not HR or a manager", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "listEmployees"
)]
#[get("/hr/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let listed = state.directory.list_employees(caller.id()).await?;
    let views: Vec<UserView> = listed
        .records
        .iter()
        .map(|user| view_for(&listed.viewer, user))
        .collect();
    Ok(Envelope::ok("Employees retrieved", views))
}

/// A single employee, subject to the visibility rules.
#[utoipa::path(
    get,
    path = "/api/v1/hr/employees/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Employee", body = UserView),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Not visible to the caller", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "getEmployee"
)]
#[get("/hr/employees/{id}")]
pub async fn get_employee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), EMPLOYEE_ID)?;
    let found = state.directory.get_employee(caller.id(), &id).await?;
    Ok(Envelope::ok(
        "Employee retrieved",
        view_for(&found.viewer, &found.records),
    ))
}

/// HR edits another user's record.
#[utoipa::path(
    put,
    path = "/api/v1/hr/employees/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Employee updated", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not HR", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 409, description = "Email taken or manager still has reports", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "updateEmployee"
)]
#[put("/hr/employees/{id}")]
pub async fn update_employee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), EMPLOYEE_ID)?;
    let changes = payload.into_inner().into_hr_changes()?;
    let user = state
        .directory
        .update_employee(caller.id(), &id, changes)
        .await?;
    Ok(Envelope::ok("Employee updated", UserView::full(&user)))
}

/// HR removes another user.
#[utoipa::path(
    delete,
    path = "/api/v1/hr/employees/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 400, description = "Malformed id or own account", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not HR", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 409, description = "User has issued invite codes", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "deleteEmployee"
)]
#[delete("/hr/employees/{id}")]
pub async fn delete_employee(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner(), EMPLOYEE_ID)?;
    state.directory.delete_employee(caller.id(), &id).await?;
    Ok(message_only("Employee deleted"))
}

/// The caller's direct reports.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/team",
    responses(
        (status = 200, description = "Direct reports", body = [UserView]),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not a manager or HR", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listTeam"
)]
#[get("/users/me/team")]
pub async fn list_team(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let team = state.directory.list_team(caller.id()).await?;
    let views: Vec<UserView> = team
        .records
        .iter()
        .map(|user| view_for(&team.viewer, user))
        .collect();
    Ok(Envelope::ok("Team retrieved", views))
}

/// Every manager, for HR's assignment pickers.
#[utoipa::path(
    get,
    path = "/api/v1/hr/managers",
    responses(
        (status = 200, description = "Managers", body = [UserView]),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Caller is not HR", body = ErrorBody)
    ),
    tags = ["hr"],
    operation_id = "listManagers"
)]
#[get("/hr/managers")]
pub async fn list_managers(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let managers = state.directory.list_managers(caller.id()).await?;
    let views: Vec<UserView> = managers.iter().map(UserView::full).collect();
    Ok(Envelope::ok("Managers retrieved", views))
}

#[cfg(test)]
#[path = "employees_tests.rs"]
mod tests;
