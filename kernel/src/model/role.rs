// kernel/src/model/role.rs
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    // 登録直後のユーザーは必ず最小権限のロールになる
    #[default]
    User,
    Vendor,
    Admin,
}

impl Role {
    // ロール階層は全順序（user < vendor < admin）
    pub fn rank(self) -> u8 {
        match self {
            Role::User => 0,
            Role::Vendor => 1,
            Role::Admin => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_hierarchy_is_totally_ordered() {
        assert!(Role::User.rank() < Role::Vendor.rank());
        assert!(Role::Vendor.rank() < Role::Admin.rank());
    }

    #[test]
    fn role_round_trips_through_text() -> anyhow::Result<()> {
        for role in [Role::User, Role::Vendor, Role::Admin] {
            assert_eq!(Role::from_str(role.as_ref())?, role);
        }
        Ok(())
    }

    #[test]
    fn default_role_is_lowest_privilege() {
        assert_eq!(Role::default(), Role::User);
    }
}
