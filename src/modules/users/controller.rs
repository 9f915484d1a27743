use anyhow::anyhow;
use axum::{extract::Request, http::StatusCode};
use tracing::{info, warn};
use userhub_auth::Claims;
use userhub_core::AppError;
use userhub_models::{NewUser, TokenResponse, UpdateUser, UserView};

use crate::middleware::errors::MISSING_VALUES;
use crate::modules::users::UserCore;
use crate::web::request::{basic_auth, decode};
use crate::web::{Context, HandlerResult, Values, param, respond};

pub const MISSING_CREDENTIALS: &str = "must provide email and password in Basic auth";

fn values(ctx: &Context) -> Result<&Values, AppError> {
    ctx.values().ok_or_else(|| AppError::shutdown(MISSING_VALUES))
}

fn claims(ctx: &Context) -> Result<&Claims, AppError> {
    ctx.claims()
        .ok_or_else(|| AppError::internal(anyhow!("claims missing from context")))
}

/// Exchanges Basic auth credentials for a signed token.
pub async fn token(core: UserCore, ctx: Context, req: Request) -> HandlerResult {
    let now = values(&ctx)?.now;

    let Some((email, password)) = basic_auth(&req) else {
        return Err(AppError::unauthorized(MISSING_CREDENTIALS));
    };

    let claims = match core.authenticate(&ctx, now, &email, &password).await {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %format!("{:#}", err), "token request rejected");
            return Err(err.into());
        }
    };

    let token = core.generate_token(&claims)?;
    info!(user_id = %claims.sub, "token issued");

    respond(StatusCode::OK, &TokenResponse { token })
}

/// Lists every user.
pub async fn query(core: UserCore, ctx: Context, _req: Request) -> HandlerResult {
    let users = core.query_all(&ctx).await?;
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();

    respond(StatusCode::OK, &views)
}

pub async fn query_by_id(core: UserCore, ctx: Context, req: Request) -> HandlerResult {
    let claims = claims(&ctx)?;
    let user_id = param(&req, "id").to_string();
    let user = core.query_by_id(&ctx, claims, &user_id).await?;

    respond(StatusCode::OK, &UserView::from(&user))
}

pub async fn create(core: UserCore, ctx: Context, req: Request) -> HandlerResult {
    let now = values(&ctx)?.now;
    let new_user: NewUser = decode(req).await?;

    let user = core.create(&ctx, new_user, now).await?;
    info!(user_id = %user.id, "user created");

    respond(StatusCode::CREATED, &UserView::from(&user))
}

pub async fn update(core: UserCore, ctx: Context, req: Request) -> HandlerResult {
    let now = values(&ctx)?.now;
    let claims = claims(&ctx)?.clone();
    let user_id = param(&req, "id").to_string();
    let update: UpdateUser = decode(req).await?;

    core.update(&ctx, &claims, &user_id, update, now).await?;

    respond(StatusCode::NO_CONTENT, &())
}

pub async fn delete(core: UserCore, ctx: Context, req: Request) -> HandlerResult {
    let claims = claims(&ctx)?;
    let user_id = param(&req, "id").to_string();
    core.delete(&ctx, claims, &user_id).await?;

    respond(StatusCode::NO_CONTENT, &())
}
