use sqlx::prelude::FromRow;
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use thiserror::Error;

use crate::nearest::{Coordinate, Located};

// SQLite caps bound parameters per statement, 29 columns * 500 rows stays well below it.
const BULK_CHUNK_SIZE: usize = 500;

const DATA_COLUMNS: &str = "applicant, facility_type, cnn, location_description, address, \
    blocklot, block, lot, permit, status, food_items, x, y, latitude, longitude, schedule, \
    dayshours, NOISent, approved, received, prior_permit, expiration_date, location, \
    fire_prevention_districts, police_districts, supervisor_districts, zip_codes, \
    neighborhoods_old";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Food truck {0} already exists")]
    Conflict(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A mobile food facility permit.
///
/// `location_id` is `None` until the record has been stored; inserting a record without one
/// lets the store assign the next free id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodTruck {
    pub location_id: Option<i64>,
    pub applicant: String,
    pub facility_type: String,
    pub cnn: i64,
    pub location_description: String,
    pub address: String,
    pub blocklot: String,
    pub block: String,
    pub lot: String,
    pub permit: String,
    pub status: String,
    pub food_items: String,
    pub x: f64,
    pub y: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub schedule: String,
    pub dayshours: String,
    pub noi_sent: String,
    pub approved: String,
    pub received: String,
    pub prior_permit: String,
    pub expiration_date: String,
    pub location: String,
    pub fire_prevention_districts: i64,
    pub police_districts: i64,
    pub supervisor_districts: i64,
    pub zip_codes: i64,
    pub neighborhoods_old: i64,
}

impl Located for FoodTruck {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Row of the `food_trucks` table.
#[derive(Debug, FromRow)]
pub struct FoodTrucks {
    pub location_id: i64,
    pub applicant: String,
    pub facility_type: String,
    pub cnn: i64,
    pub location_description: String,
    pub address: String,
    pub blocklot: String,
    pub block: String,
    pub lot: String,
    pub permit: String,
    pub status: String,
    pub food_items: String,
    pub x: f64,
    pub y: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub schedule: String,
    pub dayshours: String,
    #[sqlx(rename = "NOISent")]
    pub noi_sent: String,
    pub approved: String,
    pub received: String,
    pub prior_permit: String,
    pub expiration_date: String,
    pub location: String,
    pub fire_prevention_districts: i64,
    pub police_districts: i64,
    pub supervisor_districts: i64,
    pub zip_codes: i64,
    pub neighborhoods_old: i64,
}

impl From<FoodTrucks> for FoodTruck {
    fn from(row: FoodTrucks) -> Self {
        Self {
            location_id: Some(row.location_id),
            applicant: row.applicant,
            facility_type: row.facility_type,
            cnn: row.cnn,
            location_description: row.location_description,
            address: row.address,
            blocklot: row.blocklot,
            block: row.block,
            lot: row.lot,
            permit: row.permit,
            status: row.status,
            food_items: row.food_items,
            x: row.x,
            y: row.y,
            latitude: row.latitude,
            longitude: row.longitude,
            schedule: row.schedule,
            dayshours: row.dayshours,
            noi_sent: row.noi_sent,
            approved: row.approved,
            received: row.received,
            prior_permit: row.prior_permit,
            expiration_date: row.expiration_date,
            location: row.location,
            fire_prevention_districts: row.fire_prevention_districts,
            police_districts: row.police_districts,
            supervisor_districts: row.supervisor_districts,
            zip_codes: row.zip_codes,
            neighborhoods_old: row.neighborhoods_old,
        }
    }
}

/// Binds every column listed in `DATA_COLUMNS`, in the same order.
fn push_data_columns(builder: &mut Separated<'_, '_, Sqlite, &'static str>, truck: FoodTruck) {
    builder
        .push_bind(truck.applicant)
        .push_bind(truck.facility_type)
        .push_bind(truck.cnn)
        .push_bind(truck.location_description)
        .push_bind(truck.address)
        .push_bind(truck.blocklot)
        .push_bind(truck.block)
        .push_bind(truck.lot)
        .push_bind(truck.permit)
        .push_bind(truck.status)
        .push_bind(truck.food_items)
        .push_bind(truck.x)
        .push_bind(truck.y)
        .push_bind(truck.latitude)
        .push_bind(truck.longitude)
        .push_bind(truck.schedule)
        .push_bind(truck.dayshours)
        .push_bind(truck.noi_sent)
        .push_bind(truck.approved)
        .push_bind(truck.received)
        .push_bind(truck.prior_permit)
        .push_bind(truck.expiration_date)
        .push_bind(truck.location)
        .push_bind(truck.fire_prevention_districts)
        .push_bind(truck.police_districts)
        .push_bind(truck.supervisor_districts)
        .push_bind(truck.zip_codes)
        .push_bind(truck.neighborhoods_old);
}

fn insert_builder<'args>(trucks: impl IntoIterator<Item = FoodTruck>) -> QueryBuilder<'args, Sqlite> {
    let mut query_builder =
        QueryBuilder::new(format!("INSERT INTO food_trucks (location_id, {DATA_COLUMNS}) "));

    query_builder.push_values(trucks, |mut b, truck| {
        b.push_bind(truck.location_id);
        push_data_columns(&mut b, truck);
    });

    query_builder
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// `LIKE` treats `%` and `_` as wildcards, escape them so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl FoodTrucks {
    #[tracing::instrument(skip_all, fields(location_id = ?food_truck.location_id))]
    pub async fn insert(
        executor: &mut SqliteConnection,
        food_truck: &FoodTruck,
    ) -> Result<FoodTruck, StoreError> {
        let mut query_builder = insert_builder(std::iter::once(food_truck.clone()));
        query_builder.push(" RETURNING *");

        let row = query_builder
            .build_query_as::<FoodTrucks>()
            .fetch_one(executor)
            .await
            .map_err(|err| match food_truck.location_id {
                Some(id) if is_unique_violation(&err) => StoreError::Conflict(id),
                _ => StoreError::Database(err),
            })?;

        Ok(row.into())
    }

    /// Inserts every record, in chunks, returning how many rows were written.
    ///
    /// Records carrying an id are written before those without one, so an assigned id can never
    /// take a key that appears later in the batch. Callers wanting all-or-nothing semantics should
    /// pass a connection inside a transaction.
    pub async fn insert_bulk(
        executor: &mut SqliteConnection,
        food_trucks: Vec<FoodTruck>,
    ) -> Result<u64, StoreError> {
        let (mut ordered, unkeyed): (Vec<_>, Vec<_>) = food_trucks
            .into_iter()
            .partition(|truck| truck.location_id.is_some());
        ordered.extend(unkeyed);

        let mut inserted = 0;

        for chunk in ordered.chunks(BULK_CHUNK_SIZE) {
            let mut query_builder = insert_builder(chunk.iter().cloned());
            let result = query_builder.build().execute(&mut *executor).await?;
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }

    #[tracing::instrument(skip(executor))]
    pub async fn find_by_id(
        executor: &mut SqliteConnection,
        location_id: i64,
    ) -> Result<Option<FoodTruck>, StoreError> {
        let row = sqlx::query_as::<_, FoodTrucks>(
            "SELECT * FROM food_trucks WHERE location_id = ?",
        )
        .bind(location_id)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(FoodTruck::from))
    }

    /// Case-insensitive (ASCII) substring match on the applicant name.
    #[tracing::instrument(skip(executor))]
    pub async fn find_by_name(
        executor: &mut SqliteConnection,
        name: &str,
    ) -> Result<Vec<FoodTruck>, StoreError> {
        let pattern = format!("%{}%", escape_like(name));

        let rows = sqlx::query_as::<_, FoodTrucks>(
            r#"
            SELECT
                *
            FROM
                food_trucks
            WHERE
                applicant LIKE ? ESCAPE '\'
            ORDER BY
                location_id;
            "#,
        )
        .bind(pattern)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(FoodTruck::from).collect())
    }

    #[tracing::instrument(skip_all)]
    pub async fn find_all(executor: &mut SqliteConnection) -> Result<Vec<FoodTruck>, StoreError> {
        let rows =
            sqlx::query_as::<_, FoodTrucks>("SELECT * FROM food_trucks ORDER BY location_id")
                .fetch_all(executor)
                .await?;

        Ok(rows.into_iter().map(FoodTruck::from).collect())
    }

    pub async fn count(executor: &mut SqliteConnection) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM food_trucks")
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Replaces every column of the row keyed by `location_id`. The key itself is never
    /// rewritten, whatever `food_truck.location_id` holds.
    #[tracing::instrument(skip(executor, food_truck))]
    pub async fn update(
        executor: &mut SqliteConnection,
        location_id: i64,
        food_truck: &FoodTruck,
    ) -> Result<Option<FoodTruck>, StoreError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
            "UPDATE food_trucks SET ({DATA_COLUMNS}) = ("
        ));

        {
            let mut values = query_builder.separated(", ");
            push_data_columns(&mut values, food_truck.clone());
        }

        query_builder
            .push(") WHERE location_id = ")
            .push_bind(location_id)
            .push(" RETURNING *");

        let row = query_builder
            .build_query_as::<FoodTrucks>()
            .fetch_optional(executor)
            .await?;

        Ok(row.map(FoodTruck::from))
    }

    /// Returns `false` when no row had this id.
    #[tracing::instrument(skip(executor))]
    pub async fn delete(
        executor: &mut SqliteConnection,
        location_id: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM food_trucks WHERE location_id = ?")
            .bind(location_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
