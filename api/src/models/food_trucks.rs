use food_trucks::FoodTruck;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Full record as sent and received over HTTP.
///
/// Every field may be omitted on input: text defaults to `""`, numbers to zero, and a missing
/// or zero `location_id` means "assign one".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodTruckPayload {
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
    #[serde(rename = "NOISent")]
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

impl From<FoodTruckPayload> for FoodTruck {
    fn from(payload: FoodTruckPayload) -> Self {
        Self {
            location_id: payload.location_id.filter(|&id| id != 0),
            applicant: payload.applicant,
            facility_type: payload.facility_type,
            cnn: payload.cnn,
            location_description: payload.location_description,
            address: payload.address,
            blocklot: payload.blocklot,
            block: payload.block,
            lot: payload.lot,
            permit: payload.permit,
            status: payload.status,
            food_items: payload.food_items,
            x: payload.x,
            y: payload.y,
            latitude: payload.latitude,
            longitude: payload.longitude,
            schedule: payload.schedule,
            dayshours: payload.dayshours,
            noi_sent: payload.noi_sent,
            approved: payload.approved,
            received: payload.received,
            prior_permit: payload.prior_permit,
            expiration_date: payload.expiration_date,
            location: payload.location,
            fire_prevention_districts: payload.fire_prevention_districts,
            police_districts: payload.police_districts,
            supervisor_districts: payload.supervisor_districts,
            zip_codes: payload.zip_codes,
            neighborhoods_old: payload.neighborhoods_old,
        }
    }
}

impl From<FoodTruck> for FoodTruckPayload {
    fn from(food_truck: FoodTruck) -> Self {
        Self {
            location_id: food_truck.location_id,
            applicant: food_truck.applicant,
            facility_type: food_truck.facility_type,
            cnn: food_truck.cnn,
            location_description: food_truck.location_description,
            address: food_truck.address,
            blocklot: food_truck.blocklot,
            block: food_truck.block,
            lot: food_truck.lot,
            permit: food_truck.permit,
            status: food_truck.status,
            food_items: food_truck.food_items,
            x: food_truck.x,
            y: food_truck.y,
            latitude: food_truck.latitude,
            longitude: food_truck.longitude,
            schedule: food_truck.schedule,
            dayshours: food_truck.dayshours,
            noi_sent: food_truck.noi_sent,
            approved: food_truck.approved,
            received: food_truck.received,
            prior_permit: food_truck.prior_permit,
            expiration_date: food_truck.expiration_date,
            location: food_truck.location,
            fire_prevention_districts: food_truck.fire_prevention_districts,
            police_districts: food_truck.police_districts,
            supervisor_districts: food_truck.supervisor_districts,
            zip_codes: food_truck.zip_codes,
            neighborhoods_old: food_truck.neighborhoods_old,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FoodTruckSummary {
    pub applicant: String,
    pub food_items: String,
    pub address: String,
}

impl From<FoodTruck> for FoodTruckSummary {
    fn from(food_truck: FoodTruck) -> Self {
        Self {
            applicant: food_truck.applicant,
            food_items: food_truck.food_items,
            address: food_truck.address,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FoodTruckLocation {
    pub applicant: String,
    pub food_items: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<FoodTruck> for FoodTruckLocation {
    fn from(food_truck: FoodTruck) -> Self {
        Self {
            applicant: food_truck.applicant,
            food_items: food_truck.food_items,
            address: food_truck.address,
            latitude: food_truck.latitude,
            longitude: food_truck.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClosestParams {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: String,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}
