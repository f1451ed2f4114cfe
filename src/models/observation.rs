use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::error::FieldError;

pub const OBSERVATIONS_COLLECTION: &str = "observations";
pub const POINT: &str = "Point";

/// Largest count that survives a round trip through a JSON number
pub const MAX_COUNT: f64 = 9_007_199_254_740_991.0;

/// Biological classification attached to an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Taxon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kingdom: Option<String>,
    pub category: String,
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// GeoJSON point, `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: POINT.to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

// ==================== REQUEST ====================

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
pub struct TaxonInput {
    pub kingdom: Option<String>,
    pub category: Option<String>,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInput {
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
pub struct LocationInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub coordinates: Option<Vec<f64>>,
}

/// Body of `POST /observations`. Every field is optional here so that
/// missing values surface as field errors from [`CreateObservationRequest::validate`].
#[derive(Debug, Default, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateObservationRequest {
    pub contributor: Option<String>,
    pub taxon: Option<TaxonInput>,
    pub count: Option<f64>,
    pub notes: Option<String>,
    pub photos: Option<Vec<PhotoInput>>,
    pub location: Option<LocationInput>,
    /// RFC 3339 timestamp, `YYYY-MM-DD` date or epoch milliseconds
    #[schema(value_type = Option<String>, format = DateTime)]
    pub observed_at: Option<Value>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_date: Option<Value>,
}

/// An observation that passed validation and is ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub contributor: String,
    pub taxon: Taxon,
    pub count: i64,
    pub notes: Option<String>,
    pub photos: Vec<Photo>,
    pub location: GeoPoint,
    pub observed_at: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
}

fn required(value: Option<&String>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match value.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => {
            errors.push(FieldError::new(field, "is required"));
            String::new()
        }
    }
}

impl CreateObservationRequest {
    /// Applies the observation field rules, collecting every failure.
    pub fn validate(self) -> Result<NewObservation, Vec<FieldError>> {
        let mut errors = Vec::new();

        let contributor = required(self.contributor.as_ref(), "contributor", &mut errors);

        let taxon_input = self.taxon.unwrap_or_default();
        let taxon = Taxon {
            kingdom: taxon_input.kingdom,
            category: required(taxon_input.category.as_ref(), "taxon.category", &mut errors),
            common_name: required(
                taxon_input.common_name.as_ref(),
                "taxon.common_name",
                &mut errors,
            ),
            scientific_name: taxon_input.scientific_name,
        };

        let count = match self.count {
            None => 1,
            Some(n) if n.fract() != 0.0 || !n.is_finite() => {
                errors.push(FieldError::new("count", "must be an integer"));
                0
            }
            Some(n) if n < 1.0 => {
                errors.push(FieldError::new("count", "must be at least 1"));
                0
            }
            Some(n) if n > MAX_COUNT => {
                errors.push(FieldError::new("count", "is too large"));
                0
            }
            Some(n) => n as i64,
        };

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut photos = Vec::new();
        for (i, photo) in self.photos.unwrap_or_default().into_iter().enumerate() {
            let url = required(photo.url.as_ref(), &format!("photos.{}.url", i), &mut errors);
            for (name, dim) in [("width", photo.width), ("height", photo.height)] {
                if matches!(dim, Some(d) if d < 0.0) {
                    errors.push(FieldError::new(
                        format!("photos.{}.{}", i, name),
                        "must not be negative",
                    ));
                }
            }
            photos.push(Photo {
                url,
                thumbnail_url: photo.thumbnail_url,
                width: photo.width,
                height: photo.height,
            });
        }

        let location = validate_location(self.location, &mut errors);
        let observed_at = parse_date(self.observed_at, "observedAt", &mut errors);
        let updated_date = parse_date(self.updated_date, "updatedDate", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewObservation {
            contributor,
            taxon,
            count,
            notes,
            photos,
            location,
            observed_at,
            updated_date,
        })
    }
}

fn parse_date(value: Option<Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<DateTime<Utc>> {
    let parsed = match value? {
        Value::Null => return None,
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|dt| dt.and_utc())
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };

    if parsed.is_none() {
        errors.push(FieldError::new(field, "must be a valid date"));
    }
    parsed
}

fn validate_location(input: Option<LocationInput>, errors: &mut Vec<FieldError>) -> GeoPoint {
    let Some(location) = input else {
        errors.push(FieldError::new("location", "is required"));
        return GeoPoint::new(0.0, 0.0);
    };

    match location.kind.as_deref() {
        Some(POINT) => {}
        Some(other) => errors.push(FieldError::new(
            "location.type",
            format!("`{}` is not a valid enum value, expected `Point`", other),
        )),
        None => errors.push(FieldError::new("location.type", "is required")),
    }

    match location.coordinates.as_deref() {
        Some([lng, lat]) => {
            if !(-180.0..=180.0).contains(lng) {
                errors.push(FieldError::new(
                    "location.coordinates",
                    "longitude must be between -180 and 180",
                ));
            }
            if !(-90.0..=90.0).contains(lat) {
                errors.push(FieldError::new(
                    "location.coordinates",
                    "latitude must be between -90 and 90",
                ));
            }
            GeoPoint::new(*lng, *lat)
        }
        Some(_) => {
            errors.push(FieldError::new(
                "location.coordinates",
                "must be a [longitude, latitude] pair",
            ));
            GeoPoint::new(0.0, 0.0)
        }
        None => {
            errors.push(FieldError::new("location.coordinates", "is required"));
            GeoPoint::new(0.0, 0.0)
        }
    }
}

// ==================== STORAGE ====================

/// Observation as stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub contributor: String,
    pub taxon: Taxon,
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<BsonDateTime>,
    pub updated_date: BsonDateTime,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

fn to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

fn to_chrono(dt: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
}

impl ObservationDocument {
    pub fn from_new(new: NewObservation, now: DateTime<Utc>) -> Self {
        let created = to_bson(now);
        Self {
            id: ObjectId::new(),
            contributor: new.contributor,
            taxon: new.taxon,
            count: new.count,
            notes: new.notes,
            photos: new.photos,
            location: new.location,
            observed_at: new.observed_at.map(to_bson),
            updated_date: new.updated_date.map(to_bson).unwrap_or(created),
            created_at: created,
            updated_at: created,
        }
    }
}

// ==================== RESPONSE ====================

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub contributor: String,
    pub taxon: Taxon,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub photos: Vec<Photo>,
    pub location: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
    pub updated_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ObservationDocument> for ObservationResponse {
    fn from(doc: ObservationDocument) -> Self {
        ObservationResponse {
            id: doc.id.to_hex(),
            contributor: doc.contributor,
            taxon: doc.taxon,
            count: doc.count,
            notes: doc.notes,
            photos: doc.photos,
            location: doc.location,
            observed_at: doc.observed_at.map(to_chrono),
            updated_date: to_chrono(doc.updated_date),
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> CreateObservationRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "contributor": "  ann  ",
            "taxon": { "category": "Bird", "common_name": "Robin" },
            "location": { "type": "Point", "coordinates": [-0.12, 51.5] }
        })
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn count_defaults_to_one() {
        let obs = request(valid_body()).validate().unwrap();
        assert_eq!(obs.count, 1);
        assert_eq!(obs.contributor, "ann");
        assert!(obs.photos.is_empty());
    }

    #[test]
    fn count_zero_rejected() {
        let mut body = valid_body();
        body["count"] = json!(0);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["count"]);
    }

    #[test]
    fn fractional_count_rejected() {
        let mut body = valid_body();
        body["count"] = json!(2.5);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(errors[0].message, "must be an integer");
    }

    #[test]
    fn oversized_count_rejected() {
        let mut body = valid_body();
        body["count"] = json!(1e20);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["count"]);

        let mut body = valid_body();
        body["count"] = json!(MAX_COUNT);
        assert_eq!(request(body).validate().unwrap().count, 9_007_199_254_740_991);
    }

    #[test]
    fn dates_accept_common_forms() {
        let mut body = valid_body();
        body["observedAt"] = json!("2024-05-01");
        body["updatedDate"] = json!("2024-05-02T08:30:00Z");
        let obs = request(body).validate().unwrap();
        assert_eq!(obs.observed_at.unwrap().to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(obs.updated_date.unwrap().to_rfc3339(), "2024-05-02T08:30:00+00:00");

        let mut body = valid_body();
        body["observedAt"] = json!(1_714_521_600_000i64);
        let obs = request(body).validate().unwrap();
        assert_eq!(obs.observed_at.unwrap().to_rfc3339(), "2024-05-01T00:00:00+00:00");

        let mut body = valid_body();
        body["observedAt"] = json!(null);
        assert!(request(body).validate().unwrap().observed_at.is_none());
    }

    #[test]
    fn unparsable_dates_are_field_errors() {
        let mut body = valid_body();
        body["observedAt"] = json!("last tuesday");
        body["updatedDate"] = json!(true);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["observedAt", "updatedDate"]);
    }

    #[test]
    fn collects_all_missing_fields() {
        let errors = request(json!({})).validate().unwrap_err();
        let f = fields(&errors);
        assert!(f.contains(&"contributor"));
        assert!(f.contains(&"taxon.category"));
        assert!(f.contains(&"taxon.common_name"));
        assert!(f.contains(&"location"));
    }

    #[test]
    fn location_type_is_an_enum() {
        let mut body = valid_body();
        body["location"]["type"] = json!("Polygon");
        let errors = request(body).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["location.type"]);
    }

    #[test]
    fn coordinates_must_be_in_range() {
        let mut body = valid_body();
        body["location"]["coordinates"] = json!([10.0, 95.0]);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(errors[0].message, "latitude must be between -90 and 90");

        let mut body = valid_body();
        body["location"]["coordinates"] = json!([10.0]);
        assert!(request(body).validate().is_err());
    }

    #[test]
    fn photo_needs_url() {
        let mut body = valid_body();
        body["photos"] = json!([{ "url": "https://img/1.jpg", "width": 640 }, { "thumbnailUrl": "t" }]);
        let errors = request(body).validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["photos.1.url"]);
    }

    #[test]
    fn blank_notes_dropped() {
        let mut body = valid_body();
        body["notes"] = json!("   ");
        let obs = request(body).validate().unwrap();
        assert_eq!(obs.notes, None);
    }

    #[test]
    fn document_defaults_updated_date_to_creation() {
        let now = Utc::now();
        let doc = ObservationDocument::from_new(request(valid_body()).validate().unwrap(), now);
        assert_eq!(doc.updated_date, doc.created_at);
        assert_eq!(doc.created_at.timestamp_millis(), now.timestamp_millis());

        let resp = ObservationResponse::from(doc.clone());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["_id"], doc.id.to_hex());
        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["taxon"]["common_name"], "Robin");
        assert!(json.get("notes").is_none());
    }
}
