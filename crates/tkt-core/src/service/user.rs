// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account service: signup, profile lookup and admin management.

use chrono::Utc;
use tracing::{info, warn};

use crate::account::{Account, PublicProfile, Signup};
use crate::credentials::{hash_off_runtime, SharedCredentialVerifier};
use crate::error::{CoreError, CoreResult};
use crate::policy;
use crate::store::SharedSubjectStore;
use crate::types::{Identity, Role, UserId};

/// Account operations.
#[derive(Clone)]
pub struct UserService {
    subjects: SharedSubjectStore,
    credentials: SharedCredentialVerifier,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(subjects: SharedSubjectStore, credentials: SharedCredentialVerifier) -> Self {
        Self {
            subjects,
            credentials,
        }
    }

    /// Registers a new account with the `User` role.
    pub async fn signup(&self, request: Signup) -> CoreResult<Account> {
        request.validate()?;
        let hash = hash_off_runtime(&self.credentials, &request.password).await?;
        let account = Account::new(request.email, hash, Role::User)
            .with_name(request.first_name.trim(), request.last_name.trim());
        let account = self.subjects.create(account).await?;
        info!(user_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Creates an account with an explicit role, bypassing the policy.
    ///
    /// Used to seed a fresh deployment. Returns the existing account if the
    /// email is already registered.
    pub async fn provision(
        &self,
        email: &str,
        password: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> CoreResult<Account> {
        if role == Role::Unknown {
            return Err(CoreError::validation("cannot provision an account with an unknown role"));
        }
        if let Ok(existing) = self.subjects.get_by_email(email).await {
            warn!(user_id = %existing.id, "Seed account already exists, skipping");
            return Ok(existing);
        }
        let hash = hash_off_runtime(&self.credentials, password).await?;
        let account = Account::new(email, hash, role).with_name(first_name, last_name);
        let account = self.subjects.create(account).await?;
        info!(user_id = %account.id, role = %role, "Account provisioned");
        Ok(account)
    }

    /// Returns the caller's own account.
    pub async fn me(&self, identity: &Identity) -> CoreResult<Account> {
        Ok(self.subjects.get_by_id(&identity.subject).await?)
    }

    /// Lists every account. Admin only.
    pub async fn list(&self, identity: &Identity) -> CoreResult<Vec<Account>> {
        policy::authorize_user_management(identity)?;
        Ok(self.subjects.list().await?)
    }

    /// Lists public profiles for ticket assignment. Any recognized role.
    pub async fn list_assignable(&self, identity: &Identity) -> CoreResult<Vec<PublicProfile>> {
        if identity.role == Role::Unknown {
            return Err(CoreError::AccessDenied);
        }
        let accounts = self.subjects.list().await?;
        Ok(accounts.iter().map(Account::profile).collect())
    }

    /// Changes an account's role. Admin only.
    pub async fn update_role(
        &self,
        identity: &Identity,
        id: &UserId,
        role: Role,
    ) -> CoreResult<Account> {
        policy::authorize_user_management(identity)?;
        if role == Role::Unknown {
            return Err(CoreError::validation("invalid role"));
        }
        let mut account = self.subjects.get_by_id(id).await?;
        let previous = account.role;
        account.role = role;
        account.updated_at = Utc::now();
        let account = self.subjects.update(account).await?;
        info!(
            user_id = %id,
            admin = %identity.subject,
            from = %previous,
            to = %role,
            "Account role updated"
        );
        Ok(account)
    }

    /// Deletes an account. Admin only; an admin cannot delete themselves.
    pub async fn delete(&self, identity: &Identity, id: &UserId) -> CoreResult<()> {
        policy::authorize_user_management(identity)?;
        if identity.is(id) {
            return Err(CoreError::validation("cannot delete your own account"));
        }
        self.subjects.delete(id).await?;
        info!(user_id = %id, admin = %identity.subject, "Account deleted");
        Ok(())
    }
}
