use crate::api::error::Message;
use crate::domain::filter::TransactionQuery;
use crate::domain::models::TransactionKind;
use crate::infra::auth::AuthUser;
use crate::service::ledger::{LedgerService, TransactionInput};
use crate::service::AppError;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse, Scope};
use serde_json::json;

/// Routes shared by `/income` and `/expenses`; the scope's `TransactionKind`
/// tells the handlers which collection they serve.
pub fn ledger_scope(kind: TransactionKind) -> Scope {
    let (path, labels_path) = match kind {
        TransactionKind::Income => ("/income", "/sources"),
        TransactionKind::Expense => ("/expenses", "/categories"),
    };

    web::scope(path)
        .app_data(web::Data::new(kind))
        .service(
            web::resource("")
                .route(web::get().to(list))
                .route(web::post().to(add)),
        )
        .service(web::resource("/export").route(web::get().to(export)))
        .service(web::resource(labels_path).route(web::get().to(labels)))
        .service(
            web::resource("/{id}")
                .route(web::put().to(update))
                .route(web::delete().to(delete)),
        )
}

async fn list(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    query: web::Query<Vec<(String, String)>>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    let query = TransactionQuery::from_pairs(query.into_inner());
    let rows = ledger.list(user.id(), **kind, &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn add(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    body: web::Json<TransactionInput>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    let tx = ledger.add(user.id(), **kind, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(tx))
}

async fn update(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    id: web::Path<i64>,
    body: web::Json<TransactionInput>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    let tx = ledger
        .update(user.id(), **kind, id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tx))
}

async fn delete(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    id: web::Path<i64>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    ledger.delete(user.id(), **kind, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Message::new(format!("{} deleted", kind.title()))))
}

async fn labels(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    let labels = ledger.labels(user.id(), **kind).await?;
    let body = match **kind {
        TransactionKind::Income => json!({ "sources": labels }),
        TransactionKind::Expense => json!({ "categories": labels }),
    };
    Ok(HttpResponse::Ok().json(body))
}

async fn export(
    user: AuthUser,
    kind: web::Data<TransactionKind>,
    ledger: web::Data<LedgerService>,
) -> Result<HttpResponse, AppError> {
    let csv = ledger.export(user.id(), **kind).await?;
    let filename = match **kind {
        TransactionKind::Income => "income.csv",
        TransactionKind::Expense => "expenses.csv",
    };

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        })
        .body(csv))
}

#[get("/transactions/recent")]
async fn recent(user: AuthUser, ledger: web::Data<LedgerService>) -> Result<HttpResponse, AppError> {
    let recent = ledger.recent(user.id()).await?;
    Ok(HttpResponse::Ok().json(recent))
}
