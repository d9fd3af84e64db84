use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use pumpfiction_models::{NewUser, Role, UserFilter, UserId, UserIdentity};

use super::store::{RoleStore, RoleStoreError};

/// Process-local [`RoleStore`] for tests and `STORAGE_BACKEND=memory`.
///
/// `set_role` failures can be injected to exercise the approval role-sync path.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    users: Mutex<HashMap<UserId, UserIdentity>>,
    failing_set_role_calls: AtomicU32,
    unavailable: AtomicBool,
    set_role_calls: AtomicU32,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` calls to `set_role` fail with `Unavailable`.
    pub fn fail_next_set_role(&self, count: u32) {
        self.failing_set_role_calls.store(count, Ordering::SeqCst);
    }

    /// Makes every operation fail with `Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `set_role` calls seen, failed ones included.
    pub fn set_role_calls(&self) -> u32 {
        self.set_role_calls.load(Ordering::SeqCst)
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<UserId, UserIdentity>>, RoleStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RoleStoreError::Unavailable("role store is offline".into()));
        }
        self.users
            .lock()
            .map_err(|_| RoleStoreError::Unavailable("role store lock poisoned".into()))
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_set_role_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserIdentity>, RoleStoreError> {
        Ok(self.users()?.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, RoleStoreError> {
        Ok(self
            .users()?
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> Result<UserIdentity, RoleStoreError> {
        self.set_role_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_injected_failure() {
            return Err(RoleStoreError::Unavailable("injected set_role failure".into()));
        }

        let mut users = self.users()?;
        let user = users
            .get_mut(&user_id)
            .ok_or(RoleStoreError::NotFound(user_id))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_full_name(
        &self,
        user_id: UserId,
        full_name: &str,
    ) -> Result<UserIdentity, RoleStoreError> {
        let mut users = self.users()?;
        let user = users
            .get_mut(&user_id)
            .ok_or(RoleStoreError::NotFound(user_id))?;
        user.full_name = full_name.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserIdentity, RoleStoreError> {
        let mut users = self.users()?;
        let id = new_user.id.unwrap_or_default();
        if users.contains_key(&id)
            || users
                .values()
                .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(RoleStoreError::Conflict(new_user.email));
        }

        let now = Utc::now();
        let user = UserIdentity {
            id,
            email: new_user.email,
            full_name: new_user.full_name,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserIdentity>, i64), RoleStoreError> {
        let mut matching: Vec<UserIdentity> = self
            .users()?
            .values()
            .filter(|u| filter.role.is_none_or(|r| r == u.role))
            .filter(|u| {
                filter
                    .email_contains
                    .as_deref()
                    .is_none_or(|needle| u.email.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset.max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }
}
