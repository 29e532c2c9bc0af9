//! # CSV Share Repository
//!
//! Stores access grants in a CSV file. A grant pairs the owner of a ledger
//! with the email of the user receiving access and the permission level.

use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, Writer};
use log::{info, warn};
use shared::{ShareGrant, SharePermission};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::storage::traits::ShareStore;

const SHARES_HEADER: &str = "id,email,permission,owner_email";

/// CSV-based share grant repository
#[derive(Clone)]
pub struct ShareRepository {
    connection: CsvConnection,
}

impl ShareRepository {
    /// Create a new CSV share repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every grant from the shares file
    async fn read_grants(&self) -> Result<Vec<ShareGrant>> {
        let file_path = self.connection.get_shares_file_path();
        self.connection.ensure_file_exists(&file_path, SHARES_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut grants = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            // Unknown permission values fall back to view-only
            let permission = SharePermission::parse(record.get(2).unwrap_or("view"))
                .unwrap_or(SharePermission::View);

            grants.push(ShareGrant {
                id: record.get(0).unwrap_or("").to_string(),
                email: record.get(1).unwrap_or("").to_string(),
                permission,
                owner_email: record.get(3).unwrap_or("").to_string(),
            });
        }

        Ok(grants)
    }

    /// Write the full grant list back to the shares file
    async fn write_grants(&self, grants: &[ShareGrant]) -> Result<()> {
        let file_path = self.connection.get_shares_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(&["id", "email", "permission", "owner_email"])?;

            for grant in grants {
                csv_writer.write_record(&[
                    grant.id.as_str(),
                    grant.email.as_str(),
                    grant.permission.as_str(),
                    grant.owner_email.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn store_grant(&self, grant: &ShareGrant) -> Result<()> {
        let mut grants = self.read_grants().await?;
        grants.push(grant.clone());
        self.write_grants(&grants).await?;

        info!("✅ Stored grant for '{}' on ledger of '{}'", grant.email, grant.owner_email);
        Ok(())
    }

    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<ShareGrant>> {
        let grants = self.read_grants().await?;
        Ok(grants
            .into_iter()
            .filter(|g| g.owner_email == owner_email)
            .collect())
    }

    async fn list_by_grantee(&self, email: &str) -> Result<Vec<ShareGrant>> {
        let grants = self.read_grants().await?;
        Ok(grants.into_iter().filter(|g| g.email == email).collect())
    }

    async fn update_permission(&self, grant_id: &str, permission: SharePermission) -> Result<bool> {
        let mut grants = self.read_grants().await?;

        let grant = match grants.iter_mut().find(|g| g.id == grant_id) {
            Some(grant) => grant,
            None => {
                warn!("❌ Grant not found for update: {}", grant_id);
                return Ok(false);
            }
        };

        grant.permission = permission;
        self.write_grants(&grants).await?;

        info!("✅ Updated grant {} to {}", grant_id, permission.as_str());
        Ok(true)
    }

    async fn delete_grant(&self, grant_id: &str) -> Result<bool> {
        let mut grants = self.read_grants().await?;
        let initial_count = grants.len();

        grants.retain(|g| g.id != grant_id);

        if grants.len() == initial_count {
            warn!("❌ Grant not found for deletion: {}", grant_id);
            return Ok(false);
        }

        self.write_grants(&grants).await?;

        info!("🗑️ Deleted grant: {}", grant_id);
        Ok(true)
    }
}
