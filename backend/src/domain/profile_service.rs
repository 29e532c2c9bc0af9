//! Profile sharing.
//!
//! A user grants other users access to their ledger by email, with view-only
//! or edit permission. The profile selector unions the user's own ledger
//! with every ledger shared with them.

use anyhow::{anyhow, Result};
use log::info;
use shared::{GrantAccessRequest, ProfileSummary, ShareGrant, SharePermission};

use crate::domain::errors::ValidationError;
use crate::storage::{Connection, ShareStore};

/// Display label of the user's own ledger in the profile selector
const OWN_PROFILE_LABEL: &str = "Minhas finanças";

/// Service managing access grants and the profile selector
#[derive(Clone)]
pub struct ProfileService<C: Connection> {
    connection: C,
}

impl<C: Connection> ProfileService<C> {
    /// Create a new profile service
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Grant another user access to the owner's ledger
    pub async fn grant_access(
        &self,
        owner_email: &str,
        request: &GrantAccessRequest,
    ) -> Result<ShareGrant> {
        let email = request.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail.into());
        }

        let repository = self.connection.create_share_repository();

        let existing = repository.list_by_owner(owner_email).await?;
        if existing.iter().any(|g| g.email == email) {
            return Err(ValidationError::DuplicateGrant.into());
        }

        let grant = ShareGrant::new(email, request.permission, owner_email);
        repository.store_grant(&grant).await?;

        info!(
            "🤝 Granted {} access to '{}' for '{}'",
            grant.permission.as_str(),
            owner_email,
            email
        );
        Ok(grant)
    }

    /// Change the permission of an existing grant
    pub async fn update_permission(
        &self,
        grant_id: &str,
        permission: SharePermission,
    ) -> Result<()> {
        let repository = self.connection.create_share_repository();
        let updated = repository.update_permission(grant_id, permission).await?;

        if !updated {
            return Err(anyhow!("Grant not found: {}", grant_id));
        }
        Ok(())
    }

    /// Revoke a grant
    pub async fn revoke_access(&self, grant_id: &str) -> Result<()> {
        let repository = self.connection.create_share_repository();
        let deleted = repository.delete_grant(grant_id).await?;

        if !deleted {
            return Err(anyhow!("Grant not found: {}", grant_id));
        }
        Ok(())
    }

    /// The grants an owner has created, for the sharing screen
    pub async fn grants_for_owner(&self, owner_email: &str) -> Result<Vec<ShareGrant>> {
        let repository = self.connection.create_share_repository();
        repository.list_by_owner(owner_email).await
    }

    /// Every profile the user can open: their own ledger first, then one
    /// entry per ledger shared with them
    pub async fn accessible_profiles(&self, user_email: &str) -> Result<Vec<ProfileSummary>> {
        let repository = self.connection.create_share_repository();

        let mut profiles = vec![ProfileSummary {
            label: OWN_PROFILE_LABEL.to_string(),
            owner_email: user_email.to_string(),
            permission: SharePermission::Edit,
            is_own: true,
        }];

        for grant in repository.list_by_grantee(user_email).await? {
            profiles.push(ProfileSummary {
                label: grant.owner_email.clone(),
                owner_email: grant.owner_email,
                permission: grant.permission,
                is_own: false,
            });
        }

        Ok(profiles)
    }
}
