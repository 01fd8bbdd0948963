//! API documentation endpoints
//!
//! `/openapi.yaml` serves the embedded OpenAPI document and `/docs` a Swagger
//! UI page that loads it.

use warp::http::header::CONTENT_TYPE;
use warp::Reply;

/// OpenAPI description of every route, embedded at build time
pub const OPENAPI_YAML: &str = include_str!("../../openapi.yaml");

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Bond Trading API - Swagger UI</title>
  <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
</head>
<body>
<div id="swagger-ui"></div>
<script>
const ui = SwaggerUIBundle({
  url: "/openapi.yaml",
  dom_id: '#swagger-ui',
  presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
  layout: "BaseLayout"
});
</script>
</body>
</html>
"#;

pub fn openapi_reply() -> impl Reply {
    warp::reply::with_header(OPENAPI_YAML, CONTENT_TYPE, "application/yaml")
}

pub fn swagger_ui_reply() -> impl Reply {
    warp::reply::html(SWAGGER_UI_HTML)
}
