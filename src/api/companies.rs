//! Company endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Identity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::company::{Company, CompanyId};
use crate::domain::user::UserId;
use crate::infrastructure::company::CreateCompanyRequest;

pub fn create_companies_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_company))
        .route("/{id}", get(get_company))
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Company> for CompanyResponse {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            description: company.description.clone(),
            created_by: company.created_by,
            created_at: company.created_at.to_rfc3339(),
            updated_at: company.updated_at.to_rfc3339(),
        }
    }
}

/// POST /api/v1/companies
pub async fn create_company(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(body): Json<CreateCompanyBody>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let company = state
        .company_service
        .create(
            actor,
            CreateCompanyRequest {
                name: body.name,
                description: body.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from(&company))))
}

/// GET /api/v1/companies/{id}
pub async fn get_company(
    State(state): State<AppState>,
    Identity(_): Identity,
    Path(id): Path<String>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let id = id.parse::<CompanyId>()?;
    let company = state.company_service.get(id).await?;

    Ok(Json(CompanyResponse::from(&company)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::TestApp;

    #[tokio::test]
    async fn test_create_and_get_company() {
        let app = TestApp::new();
        let (user_id, token) = app.register("owner@x.com", Some("manager")).await;

        let (status, body) = app
            .post("/api/v1/companies", Some(&token), json!({"name": "Acme"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["created_by"], user_id);

        let (status, body) = app
            .get(&format!("/api/v1/companies/{}", body["id"]), Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Acme");
    }

    #[tokio::test]
    async fn test_company_errors() {
        let app = TestApp::new();
        let (_, token) = app.register("owner@x.com", None).await;

        let (status, _) = app.get("/api/v1/companies/99", Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get("/api/v1/companies/zero", Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .post("/api/v1/companies", Some(&token), json!({"name": "  "}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.post("/api/v1/companies", None, json!({"name": "Acme"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
