use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("自分が所有するゲームを借りることはできません。")]
    SelfBorrowDenied,
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("ハッシュ値を作成できませんでした。")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("IDの変換に失敗しました。")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("アクセストークンを作成できませんでした。")]
    JwtError(#[source] jsonwebtoken::errors::Error),
    #[error("アクセストークンの有効期限が切れています。")]
    ExpiredToken,
    #[error("アクセストークンが不正です。")]
    MalformedToken,
    #[error("ログインに失敗しました。")]
    UnauthenticatedError,
    #[error("この操作を行う権限がありません。")]
    ForbiddenOperation,
    #[error("ユーザー名またはメールアドレスはすでに使われています。")]
    DuplicateUser,
    #[error("このゲームにはすでにレビューを投稿しています。")]
    DuplicateReview,
    #[error("他の操作と競合しました。再度お試しください。")]
    ConflictError,
    #[error("{0}")]
    ConversionEntityError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_) | AppError::SelfBorrowDenied => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::ConvertToUuidError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UnauthenticatedError
            | AppError::ExpiredToken
            | AppError::MalformedToken => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::DuplicateUser | AppError::DuplicateReview | AppError::ConflictError => {
                StatusCode::CONFLICT
            }
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::ConversionEntityError(_)) => {
                // 内部エラーの詳細はログにのみ残し、レスポンスには含めない
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        status_code.into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::NoRowsAffectedError("secret table detail".into());
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_class_maps_to_409() {
        assert_eq!(
            AppError::DuplicateReview.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::ConflictError.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn transition_errors_map_to_422() {
        assert_eq!(
            AppError::SelfBorrowDenied.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
