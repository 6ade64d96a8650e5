// kernel/src/model/auth/mod.rs
pub mod event;

// 署名付きアクセストークン。サーバー側には保存しない（ステートレス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);
