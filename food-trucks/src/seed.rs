use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use derive_more::{Display, Error, From};
use sqlx::SqliteConnection;

use crate::models::food_trucks::{FoodTruck, FoodTrucks, StoreError};

/// Public source of the permit export the store is seeded from.
pub const PERMIT_CSV_URL: &str = "https://data.sfgov.org/api/views/rqzj-sfat/rows.csv";

#[derive(Debug, Display, From, Error)]
pub enum SeedError {
    #[from]
    Io(std::io::Error),
    #[from]
    Csv(csv::Error),
    #[from]
    Field(FieldError),
    #[from]
    Store(StoreError),
}

#[derive(Debug, Display, Error)]
#[display("row {row}, column `{column}`: cannot parse `{value}` as a number: {reason}")]
pub struct FieldError {
    pub row: usize,
    pub column: &'static str,
    pub value: String,
    pub reason: String,
}

/// One data line of the export, addressed by header name.
struct PermitRow<'r> {
    record: &'r csv::StringRecord,
    columns: &'r HashMap<String, usize>,
    row: usize,
}

impl PermitRow<'_> {
    fn raw(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .unwrap_or("")
    }

    fn text(&self, column: &str) -> String {
        self.raw(column).to_string()
    }

    /// Blank cells become zero, anything else must parse.
    fn number<T>(&self, column: &'static str) -> Result<T, FieldError>
    where
        T: FromStr + Default,
        T::Err: fmt::Display,
    {
        let value = self.raw(column).trim();
        if value.is_empty() {
            return Ok(T::default());
        }

        value.parse().map_err(|err: T::Err| FieldError {
            row: self.row,
            column,
            value: value.to_string(),
            reason: err.to_string(),
        })
    }

    fn location_id(&self) -> Result<Option<i64>, FieldError> {
        // Older exports spell the header `location_id`.
        let column = if self.columns.contains_key("locationid") {
            "locationid"
        } else {
            "location_id"
        };

        let id: i64 = self.number(column)?;
        Ok((id != 0).then_some(id))
    }

    fn into_food_truck(self) -> Result<FoodTruck, FieldError> {
        Ok(FoodTruck {
            location_id: self.location_id()?,
            applicant: self.text("Applicant"),
            facility_type: self.text("FacilityType"),
            cnn: self.number("cnn")?,
            location_description: self.text("LocationDescription"),
            address: self.text("Address"),
            blocklot: self.text("blocklot"),
            block: self.text("block"),
            lot: self.text("lot"),
            permit: self.text("permit"),
            status: self.text("Status"),
            food_items: self.text("FoodItems"),
            x: self.number("X")?,
            y: self.number("Y")?,
            latitude: self.number("Latitude")?,
            longitude: self.number("Longitude")?,
            schedule: self.text("Schedule"),
            dayshours: self.text("dayshours"),
            noi_sent: self.text("NOISent"),
            approved: self.text("Approved"),
            received: self.text("Received"),
            prior_permit: self.text("PriorPermit"),
            expiration_date: self.text("ExpirationDate"),
            location: self.text("Location"),
            fire_prevention_districts: self.number("Fire Prevention Districts")?,
            police_districts: self.number("Police Districts")?,
            supervisor_districts: self.number("Supervisor Districts")?,
            zip_codes: self.number("Zip Codes")?,
            neighborhoods_old: self.number("Neighborhoods (old)")?,
        })
    }
}

/// Parses a permit export. Columns missing from the header are read as blank.
pub fn read_permits<R: Read>(reader: R) -> Result<Vec<FoodTruck>, SeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();

    let mut food_trucks = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = PermitRow {
            record: &record,
            columns: &columns,
            // header is row 1
            row: idx + 2,
        };
        food_trucks.push(row.into_food_truck()?);
    }

    Ok(food_trucks)
}

/// Loads every permit in `path` into the store, returning the number of rows written.
#[tracing::instrument(skip(executor))]
pub async fn seed_from_csv(executor: &mut SqliteConnection, path: &Path) -> Result<u64, SeedError> {
    let food_trucks = read_permits(File::open(path)?)?;
    tracing::info!(records = food_trucks.len(), "parsed permit export");

    let inserted = FoodTrucks::insert_bulk(executor, food_trucks).await?;
    tracing::info!(%inserted, "seeded food trucks");

    Ok(inserted)
}
