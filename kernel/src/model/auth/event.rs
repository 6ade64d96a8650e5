use crate::model::id::UserId;
use derive_new::new;

#[derive(new)]
pub struct CreateToken {
    pub user_id: UserId,
}
