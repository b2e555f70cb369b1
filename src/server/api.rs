use serde_json::{Map, Value};

use super::http::{HttpMethod, HttpRequest, HttpResponse, HttpStatus};
use crate::core::commands::CommandError;
use crate::core::Pipeline;

pub const EXECUTE_PATH: &str = "/api/execute";
pub const HEALTH_PATH: &str = "/api/health";

pub async fn route(pipeline: &Pipeline, request: &HttpRequest) -> HttpResponse {
    if request.method == HttpMethod::Options {
        return HttpResponse::new(HttpStatus::NO_CONTENT);
    }

    match (request.path.as_str(), request.method) {
        (EXECUTE_PATH, HttpMethod::Post) => execute(pipeline, request).await,
        (HEALTH_PATH, HttpMethod::Get) => health(pipeline),
        (EXECUTE_PATH, _) | (HEALTH_PATH, _) => {
            HttpResponse::error(HttpStatus::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        _ => HttpResponse::error(HttpStatus::NOT_FOUND, "Not found"),
    }
}
pub fn with_cors(response: HttpResponse) -> HttpResponse {
    response
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

async fn execute(pipeline: &Pipeline, request: &HttpRequest) -> HttpResponse {
    // only an object body carries a command
    let Ok(mut payload) = serde_json::from_slice::<Map<String, Value>>(&request.body) else {
        return HttpResponse::error(HttpStatus::BAD_REQUEST, "Invalid JSON body");
    };

    // missing, null, non-string and "" are all the same client error
    let command = match payload.remove("command") {
        Some(Value::String(command)) if !command.is_empty() => command,
        _ => {
            return HttpResponse::error(
                HttpStatus::BAD_REQUEST,
                &CommandError::MissingCommand.to_string(),
            )
        }
    };

    let outcome = pipeline.handle(&command).await;
    HttpResponse::json(HttpStatus::OK, &outcome)
}

fn health(pipeline: &Pipeline) -> HttpResponse {
    match pipeline.working_dir().get() {
        Ok(cwd) => HttpResponse::json(
            HttpStatus::OK,
            &serde_json::json!({ "status": "ok", "cwd": cwd.to_string_lossy() }),
        ),
        Err(e) => HttpResponse::error(HttpStatus::INTERNAL_ERROR, &e.to_string()),
    }
}
