use utoipa::openapi::{InfoBuilder, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub const SWAGGER_UI_PATH: &str = "/swagger-ui";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

pub fn create_swagger_ui(mut openapi: OpenApi) -> SwaggerUi {
    openapi.info = InfoBuilder::new()
        .title("Order Intake API")
        .version(env!("CARGO_PKG_VERSION"))
        .build();
    SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, openapi)
}
