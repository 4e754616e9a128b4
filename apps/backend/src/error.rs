use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::GameError;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Bad request: {detail}")]
    BadRequest { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Game(e) => e.code(),
            AppError::Unauthorized => "unauthorized",
            AppError::BadRequest { .. } => "bad_request",
            AppError::Internal { .. } => "internal",
        }
    }

    fn detail(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Game(e) => match e {
                GameError::NotFound | GameError::NoActiveGame => StatusCode::NOT_FOUND,
                GameError::AlreadyInGame | GameError::SeatNotOpen | GameError::Conflict => {
                    StatusCode::CONFLICT
                }
                GameError::NotHost | GameError::NotYourTurn => StatusCode::FORBIDDEN,
                GameError::InvalidState(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().to_string();

        let problem_details = ProblemDetails {
            type_: format!("https://losiento.app/errors/{code}"),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail: self.detail(),
            code,
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_expected_statuses() {
        assert_eq!(
            AppError::from(GameError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(GameError::AlreadyInGame).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(GameError::NotYourTurn).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(GameError::IllegalMove).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn problem_code_is_the_stable_string() {
        let err = AppError::from(GameError::MoveSelectionRequired);
        assert_eq!(err.code(), "move_selection_required");
    }
}
