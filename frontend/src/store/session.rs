//! 会话状态 (纯逻辑)
//!
//! 认证凭据本身是后端下发的 Cookie；这里只保存角色与用户 ID，
//! 并在本地存储中持久化，以便刷新页面后恢复。

use bookclub_shared::{Role, STORAGE_ROLE_KEY, STORAGE_USER_ID_KEY, UserId};

use super::cart::CartOwner;
use crate::web::KeyValueStore;

/// 客户端会话
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub is_authorized: bool,
    pub role: Option<Role>,
    pub user_id: Option<UserId>,
}

/// JS 时代遗留的 "null" / "undefined" 字符串同样视为缺失
fn stored_value(storage: &impl KeyValueStore, key: &str) -> Option<String> {
    storage
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "null" && v != "undefined")
}

impl Session {
    /// 从本地存储恢复会话，不向后端校验
    pub fn restore(storage: &impl KeyValueStore) -> Self {
        let role = stored_value(storage, STORAGE_ROLE_KEY).and_then(|r| r.parse::<Role>().ok());
        let user_id = stored_value(storage, STORAGE_USER_ID_KEY)
            .and_then(|id| id.parse::<UserId>().ok())
            .filter(|id| *id > 0);

        match (role, user_id) {
            (Some(role), Some(user_id)) => Self {
                is_authorized: true,
                role: Some(role),
                user_id: Some(user_id),
            },
            _ => Self::default(),
        }
    }

    /// 三个参数都有效时写入会话并持久化，否则等同于 `logout`
    pub fn set_authorized(
        &mut self,
        storage: &impl KeyValueStore,
        is_authorized: bool,
        role: Option<Role>,
        user_id: Option<UserId>,
    ) {
        match (is_authorized, role, user_id) {
            (true, Some(role), Some(user_id)) if user_id > 0 => {
                self.is_authorized = true;
                self.role = Some(role);
                self.user_id = Some(user_id);
                storage.set(STORAGE_ROLE_KEY, role.as_str());
                storage.set(STORAGE_USER_ID_KEY, &user_id.to_string());
            }
            _ => self.logout(storage),
        }
    }

    pub fn logout(&mut self, storage: &impl KeyValueStore) {
        *self = Self::default();
        storage.delete(STORAGE_ROLE_KEY);
        storage.delete(STORAGE_USER_ID_KEY);
    }

    pub fn is_admin(&self) -> bool {
        self.is_authorized && self.role == Some(Role::Admin)
    }

    pub fn can_manage_events(&self) -> bool {
        self.is_authorized && self.role.is_some_and(|r| r.can_manage_events())
    }

    /// 购物车缓存归属：已登录用户按 ID，否则为访客
    pub fn cart_owner(&self) -> CartOwner {
        match (self.is_authorized, self.user_id) {
            (true, Some(id)) => CartOwner::User(id),
            _ => CartOwner::Guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryStorage;

    #[test]
    fn restores_persisted_session() {
        let storage = MemoryStorage::new();
        storage.set(STORAGE_ROLE_KEY, "ADMIN");
        storage.set(STORAGE_USER_ID_KEY, "42");

        let session = Session::restore(&storage);
        assert!(session.is_authorized);
        assert_eq!(session.role, Some(Role::Admin));
        assert_eq!(session.user_id, Some(42));
        assert!(session.is_admin());
    }

    #[test]
    fn null_strings_are_treated_as_missing() {
        let storage = MemoryStorage::new();
        storage.set(STORAGE_ROLE_KEY, "null");
        storage.set(STORAGE_USER_ID_KEY, "7");
        assert_eq!(Session::restore(&storage), Session::default());

        storage.set(STORAGE_ROLE_KEY, "USER");
        storage.set(STORAGE_USER_ID_KEY, "undefined");
        assert_eq!(Session::restore(&storage), Session::default());
    }

    #[test]
    fn unknown_role_starts_logged_out() {
        let storage = MemoryStorage::new();
        storage.set(STORAGE_ROLE_KEY, "SUPERUSER");
        storage.set(STORAGE_USER_ID_KEY, "1");
        assert!(!Session::restore(&storage).is_authorized);
    }

    #[test]
    fn set_authorized_persists_role_and_id() {
        let storage = MemoryStorage::new();
        let mut session = Session::default();
        session.set_authorized(&storage, true, Some(Role::Organizer), Some(5));

        assert_eq!(storage.get(STORAGE_ROLE_KEY).as_deref(), Some("ORGANIZER"));
        assert_eq!(storage.get(STORAGE_USER_ID_KEY).as_deref(), Some("5"));
        assert!(session.can_manage_events());
        assert!(!session.is_admin());
        assert_eq!(session.cart_owner(), CartOwner::User(5));
    }

    #[test]
    fn any_falsy_argument_logs_out() {
        let cases = [
            (false, Some(Role::User), Some(1)),
            (true, None, Some(1)),
            (true, Some(Role::User), None),
            (true, Some(Role::User), Some(0)),
        ];
        for (authorized, role, id) in cases {
            let storage = MemoryStorage::new();
            let mut session = Session::default();
            session.set_authorized(&storage, true, Some(Role::Admin), Some(9));

            session.set_authorized(&storage, authorized, role, id);

            assert_eq!(session, Session::default());
            assert!(!storage.contains(STORAGE_ROLE_KEY));
            assert!(!storage.contains(STORAGE_USER_ID_KEY));
            assert_eq!(session.cart_owner(), CartOwner::Guest);
        }
    }
}
