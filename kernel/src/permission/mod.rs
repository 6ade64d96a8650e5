// kernel/src/permission/mod.rs
//
// 認可エンジン。静的なロール階層と権限マトリクス、
// およびリソース単位の所有権チェックを組み合わせる。
// ここでの判定はすべて純粋で、状態を変更しない。
use std::collections::{HashMap, HashSet};

use crate::model::{id::UserId, role::Role};

// 権限マトリクスで使うアクション名
pub mod action {
    pub const USER_LIST: &str = "user.list";
    pub const USER_ROLE_UPDATE: &str = "user.role.update";
    pub const GAME_DELETE_ANY: &str = "game.delete.any";
}

// Identity 相当の値は role() アクセサだけを公開する。
// 認可エンジンはフィールドを直接見ない。
pub trait RoleBearer {
    fn role(&self) -> Role;
}

// プロセス起動時に一度だけ構築し、参照で引き回す不変の設定値
#[derive(Debug)]
pub struct AuthorizationPolicy {
    matrix: HashMap<&'static str, HashSet<Role>>,
}

impl AuthorizationPolicy {
    pub fn new(matrix: HashMap<&'static str, HashSet<Role>>) -> Self {
        Self { matrix }
    }

    // 呼び出し元のロールの順位が要求ロールの順位以上か
    pub fn has_minimum_role(&self, bearer: &impl RoleBearer, required: Role) -> bool {
        bearer.role().rank() >= required.rank()
    }

    // 集合への所属のみで判定する（順位は見ない）。
    // 互いに順序関係のない複数ロールが等しく十分な場合に使う
    pub fn has_any_role(&self, bearer: &impl RoleBearer, roles: &[Role]) -> bool {
        roles.contains(&bearer.role())
    }

    // 未知のアクションは全員拒否（フェイルクローズ）
    pub fn can_perform(&self, bearer: &impl RoleBearer, action: &str) -> bool {
        self.matrix
            .get(action)
            .map(|allowed| allowed.contains(&bearer.role()))
            .unwrap_or(false)
    }

    // 所有権チェックはロールと独立で、リソースインスタンス単位
    pub fn is_owner(&self, user_id: UserId, owner_id: UserId) -> bool {
        user_id == owner_id
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        let matrix = HashMap::from([
            (
                action::USER_LIST,
                HashSet::from([Role::Vendor, Role::Admin]),
            ),
            (action::USER_ROLE_UPDATE, HashSet::from([Role::Admin])),
            (action::GAME_DELETE_ANY, HashSet::from([Role::Admin])),
        ]);
        Self::new(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bearer(Role);

    impl RoleBearer for Bearer {
        fn role(&self) -> Role {
            self.0
        }
    }

    #[test]
    fn minimum_role_compares_by_rank() {
        let policy = AuthorizationPolicy::default();
        assert!(policy.has_minimum_role(&Bearer(Role::Admin), Role::Vendor));
        assert!(policy.has_minimum_role(&Bearer(Role::Vendor), Role::Vendor));
        assert!(!policy.has_minimum_role(&Bearer(Role::User), Role::Vendor));
    }

    #[test]
    fn any_role_is_set_membership_not_rank() {
        let policy = AuthorizationPolicy::default();
        let allowed = [Role::Vendor, Role::Admin];
        assert!(policy.has_any_role(&Bearer(Role::Vendor), &allowed));
        assert!(policy.has_any_role(&Bearer(Role::Admin), &allowed));
        assert!(!policy.has_any_role(&Bearer(Role::User), &allowed));
        // admin であっても集合に含まれなければ false になる
        assert!(!policy.has_any_role(&Bearer(Role::Admin), &[Role::Vendor]));
    }

    #[test]
    fn unknown_action_denies_everyone() {
        let policy = AuthorizationPolicy::default();
        assert!(!policy.can_perform(&Bearer(Role::Admin), "game.transmogrify"));
    }

    #[test]
    fn matrix_lookup_checks_role_membership() {
        let policy = AuthorizationPolicy::default();
        assert!(policy.can_perform(&Bearer(Role::Admin), action::USER_ROLE_UPDATE));
        assert!(!policy.can_perform(&Bearer(Role::Vendor), action::USER_ROLE_UPDATE));
        assert!(policy.can_perform(&Bearer(Role::Vendor), action::USER_LIST));
        assert!(!policy.can_perform(&Bearer(Role::User), action::USER_LIST));
    }

    #[test]
    fn ownership_is_id_equality() {
        let policy = AuthorizationPolicy::default();
        let owner = UserId::new();
        assert!(policy.is_owner(owner, owner));
        assert!(!policy.is_owner(UserId::new(), owner));
    }
}
