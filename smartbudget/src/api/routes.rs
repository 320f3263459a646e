use crate::api::error::Message;
use crate::infra::auth::{AuthManager, AuthUser};
use crate::service::account::AccountService;
use crate::service::AppError;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "SmartBudget backend is running!",
    }))
}

#[post("/auth/register")]
async fn register(
    body: web::Json<CredentialsBody>,
    app: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    app.create_user(body.username, body.password).await?;

    Ok(HttpResponse::Created().json(Message::new("User registered successfully")))
}

#[post("/auth/login")]
async fn login(
    body: web::Json<CredentialsBody>,
    auth_manager: web::Data<AuthManager>,
    app: web::Data<AccountService>,
) -> Result<HttpResponse, actix_web::Error> {
    let body = body.into_inner();
    let user = match app.login(body.username.clone(), body.password).await {
        Ok(user) => user,
        Err(err) => {
            log::info!(username:? = body.username; "Failed login attempt");
            return Err(err.into());
        }
    };

    let access_token = auth_manager.issue_token(user.id)?;
    log::info!(user:? = user.username; "User authenticated");

    Ok(HttpResponse::Ok().json(&LoginResponse {
        access_token,
        username: user.username,
    }))
}

#[get("/auth/me")]
async fn me(user: AuthUser, app: web::Data<AccountService>) -> Result<HttpResponse, AppError> {
    let user = app.me(user.id()).await?;
    Ok(HttpResponse::Ok().json(user))
}
