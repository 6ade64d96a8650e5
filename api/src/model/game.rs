use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    game::{
        event::{CreateGame, GameListOptions, UpdateGame},
        Game, GameStatus,
    },
    id::{GameId, UserId},
    user::{Borrower, GameOwner},
};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatusName {
    Available,
    Borrowed,
    Playing,
}

impl From<GameStatus> for GameStatusName {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::Available => Self::Available,
            GameStatus::Borrowed => Self::Borrowed,
            GameStatus::Playing => Self::Playing,
        }
    }
}

impl From<GameStatusName> for GameStatus {
    fn from(value: GameStatusName) -> Self {
        match value {
            GameStatusName::Available => Self::Available,
            GameStatusName::Borrowed => Self::Borrowed,
            GameStatusName::Playing => Self::Playing,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub platform: String,
    #[garde(length(min = 1))]
    pub genre: String,
    #[garde(range(min = 1970, max = 2100))]
    pub release_year: i32,
    #[garde(skip)]
    pub status: Option<GameStatusName>,
}

impl From<CreateGameRequest> for CreateGame {
    fn from(value: CreateGameRequest) -> Self {
        let CreateGameRequest {
            title,
            platform,
            genre,
            release_year,
            status,
        } = value;
        CreateGame {
            title,
            platform,
            genre,
            release_year,
            status: status.map(GameStatus::from),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub platform: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub genre: Option<String>,
    #[garde(inner(range(min = 1970, max = 2100)))]
    pub release_year: Option<i32>,
    #[garde(skip)]
    pub status: Option<GameStatusName>,
}

#[derive(new)]
pub struct UpdateGameRequestWithIds(GameId, UserId, UpdateGameRequest);

impl From<UpdateGameRequestWithIds> for UpdateGame {
    fn from(value: UpdateGameRequestWithIds) -> Self {
        let UpdateGameRequestWithIds(
            game_id,
            requested_user,
            UpdateGameRequest {
                title,
                platform,
                genre,
                release_year,
                status,
            },
        ) = value;
        UpdateGame {
            game_id,
            requested_user,
            title,
            platform,
            genre,
            release_year,
            status: status.map(GameStatus::from),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameListQuery {
    #[garde(skip)]
    pub platform: Option<String>,
    #[garde(skip)]
    pub genre: Option<String>,
    #[garde(skip)]
    pub status: Option<GameStatusName>,
    // 認証済みの場合のみ有効。自分が所有するゲームに絞り込む
    #[garde(skip)]
    pub mine: Option<bool>,
}

impl GameListQuery {
    pub fn into_options(self, current_user: Option<UserId>) -> GameListOptions {
        let GameListQuery {
            platform,
            genre,
            status,
            mine,
        } = self;
        GameListOptions {
            platform,
            genre,
            status: status.map(GameStatus::from),
            owned_by: match mine {
                Some(true) => current_user,
                _ => None,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesResponse {
    pub items: Vec<GameResponse>,
}

impl From<Vec<Game>> for GamesResponse {
    fn from(value: Vec<Game>) -> Self {
        Self {
            items: value.into_iter().map(GameResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub game_id: GameId,
    pub title: String,
    pub platform: String,
    pub genre: String,
    pub release_year: i32,
    pub status: GameStatusName,
    pub owner: GameOwnerResponse,
    pub borrowed_by: Option<BorrowerResponse>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Game> for GameResponse {
    fn from(value: Game) -> Self {
        let Game {
            game_id,
            title,
            platform,
            genre,
            release_year,
            status,
            owner,
            borrowed_by,
            borrowed_at,
            created_at,
        } = value;
        Self {
            game_id,
            title,
            platform,
            genre,
            release_year,
            status: status.into(),
            owner: owner.into(),
            borrowed_by: borrowed_by.map(BorrowerResponse::from),
            borrowed_at,
            created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOwnerResponse {
    pub owner_id: UserId,
    pub owner_name: String,
}

impl From<GameOwner> for GameOwnerResponse {
    fn from(value: GameOwner) -> Self {
        let GameOwner {
            owner_id,
            owner_name,
        } = value;
        Self {
            owner_id,
            owner_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerResponse {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<Borrower> for BorrowerResponse {
    fn from(value: Borrower) -> Self {
        let Borrower { user_id, user_name } = value;
        Self { user_id, user_name }
    }
}
