//! # CSV Category Repository
//!
//! Stores user-defined categories in a CSV file. These extend the built-in
//! category lists and belong to the user who created them.

use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, Writer};
use log::info;
use shared::CustomCategory;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::storage::traits::CategoryStore;

const CATEGORIES_HEADER: &str = "id,name,owner";

/// CSV-based custom category repository
#[derive(Clone)]
pub struct CategoryRepository {
    connection: CsvConnection,
}

impl CategoryRepository {
    /// Create a new CSV category repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every category from the categories file
    async fn read_categories(&self) -> Result<Vec<CustomCategory>> {
        let file_path = self.connection.get_categories_file_path();
        self.connection
            .ensure_file_exists(&file_path, CATEGORIES_HEADER)?;

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut categories = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            categories.push(CustomCategory {
                id: record.get(0).unwrap_or("").to_string(),
                name: record.get(1).unwrap_or("").to_string(),
                owner: record.get(2).unwrap_or("").to_string(),
            });
        }

        Ok(categories)
    }

    /// Write the full category list back to the categories file
    async fn write_categories(&self, categories: &[CustomCategory]) -> Result<()> {
        let file_path = self.connection.get_categories_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let writer = BufWriter::new(file);
            let mut csv_writer = Writer::from_writer(writer);

            csv_writer.write_record(&["id", "name", "owner"])?;

            for category in categories {
                csv_writer.write_record(&[
                    category.id.as_str(),
                    category.name.as_str(),
                    category.owner.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;

        Ok(())
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn store_category(&self, category: &CustomCategory) -> Result<()> {
        let mut categories = self.read_categories().await?;
        categories.push(category.clone());
        self.write_categories(&categories).await?;

        info!("✅ Stored custom category '{}'", category.name);
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<CustomCategory>> {
        let categories = self.read_categories().await?;
        Ok(categories.into_iter().filter(|c| c.owner == owner).collect())
    }
}
