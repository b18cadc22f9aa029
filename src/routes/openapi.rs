use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BotCure API",
        version = "1.0.0",
        description = "Supportive chat with crisis detection and curated resources"
    ),
    paths(
        // Health
        super::health::root,
        super::health::health,
        super::health::status,
        // Chat
        super::chat::chat,
        // Resources
        super::resources::search,
        // Users
        super::auth::register,
        super::auth::login,
        // Feedback
        super::feedback::send_feedback,
    ),
    components(schemas(
        // Requests
        crate::models::requests::ChatRequest,
        crate::models::requests::SearchRequest,
        crate::models::requests::CredentialsRequest,
        crate::models::requests::FeedbackRequest,
        // Responses
        crate::models::responses::ChatResponse,
        crate::models::responses::HelplineInfo,
        crate::models::responses::SearchResponse,
        crate::models::responses::AuthResponse,
        crate::models::responses::UserInfo,
        crate::models::responses::MessageResponse,
        crate::models::responses::ServiceHealth,
        crate::models::responses::HealthResponse,
        crate::models::responses::StatusResponse,
        crate::models::responses::DatabaseStats,
        crate::models::responses::SystemStatistics,
        // Entities
        crate::models::entities::MessageRole,
        crate::models::entities::Part,
        crate::models::entities::ChatMessage,
        crate::models::entities::SearchItem,
        // Error
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Health", description = "Health and status endpoints"),
        (name = "Chat", description = "Crisis-aware conversational replies"),
        (name = "Resources", description = "Curated articles and videos"),
        (name = "Users", description = "Registration and login"),
        (name = "Feedback", description = "User feedback relay"),
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/explore").url("/api-docs/openapi.json", ApiDoc::openapi())
}
