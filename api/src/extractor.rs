// api/src/extractor.rs
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kernel::model::{auth::AccessToken, id::UserId, role::Role, user::User};
use kernel::permission::RoleBearer;
use registry::AppRegistry;
use shared::error::AppError;
use std::convert::Infallible;

// Authorization ヘッダーのトークンを検証し、
// ユーザー ID をストレージ上のユーザーに解決する。
// トークンが構造上有効でもユーザーが存在しなければ認証エラーにする
pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.user_id
    }
}

impl RoleBearer for AuthorizedUser {
    fn role(&self) -> Role {
        self.user.role
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::UnauthenticatedError)?;

        let access_token = AccessToken(bearer.token().to_string());
        let user_id = registry
            .auth_repository()
            .fetch_user_id_from_token(&access_token)
            .await?;
        let user = registry
            .user_repository()
            .find_current_user(user_id)
            .await?
            .ok_or(AppError::UnauthenticatedError)?;

        Ok(Self { access_token, user })
    }
}

// 認証してもしなくても良いエンドポイント用。
// 資格情報が無い・無効な場合はエラーにせず匿名として扱う
pub struct OptionalAuthorizedUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppRegistry> for OptionalAuthorizedUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        match AuthorizedUser::from_request_parts(parts, registry).await {
            Ok(authorized) => Ok(Self(Some(authorized.user))),
            Err(_) => Ok(Self(None)),
        }
    }
}
