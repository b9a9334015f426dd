//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, authors, books, covers, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "0.1.0",
        description = "Bookstore administration REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Account & sessions
        accounts::signup,
        accounts::me,
        accounts::update_me,
        accounts::change_password,
        accounts::login,
        accounts::logout,
        // Admin user management
        accounts::list_users,
        accounts::create_user,
        accounts::get_user,
        accounts::update_user,
        accounts::delete_user,
        accounts::set_user_password,
        accounts::delete_user_sessions,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Covers (the public GET lives at the server root, outside this
        // document's /api/v1 base)
        covers::upload_cover,
        covers::delete_cover,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::models::account::Account,
            crate::models::account::CreateAccount,
            crate::models::account::UpdateAccount,
            crate::models::account::UpdatePassword,
            crate::models::account::SetPassword,
            crate::models::account::CreateSession,
            crate::models::account::SessionCreated,
            crate::models::genre::Genre,
            crate::models::genre::GenrePayload,
            crate::models::author::Author,
            crate::models::author::AuthorPayload,
            crate::models::book::Book,
            crate::models::book::BookResponse,
            crate::models::book::BookPayload,
            health::ProbeResponse,
        )
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                ),
            );
        }
    }
}

/// Create a router serving the Swagger UI and the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
