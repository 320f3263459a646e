use crate::api::error::Message;
use crate::infra::auth::AuthUser;
use crate::service::budget::{BudgetInput, BudgetService};
use crate::service::AppError;
use actix_web::{delete, get, post, web, HttpResponse};

#[get("/budgets")]
async fn list_budgets(
    user: AuthUser,
    app: web::Data<BudgetService>,
) -> Result<HttpResponse, AppError> {
    let budgets = app.list(user.id()).await?;
    Ok(HttpResponse::Ok().json(budgets))
}

#[post("/budgets")]
async fn set_budget(
    user: AuthUser,
    body: web::Json<BudgetInput>,
    app: web::Data<BudgetService>,
) -> Result<HttpResponse, AppError> {
    let budget = app.set_budget(user.id(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(budget))
}

#[delete("/budgets/{id}")]
async fn delete_budget(
    user: AuthUser,
    id: web::Path<i64>,
    app: web::Data<BudgetService>,
) -> Result<HttpResponse, AppError> {
    app.delete(user.id(), id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Message::new("Budget deleted")))
}

#[get("/summary")]
async fn summary(user: AuthUser, app: web::Data<BudgetService>) -> Result<HttpResponse, AppError> {
    let summary = app.summary(user.id()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
