//! Turns raw listing entries into [`Restaurant`]s.
//!
//! Parsing is two-phase: an entry is first viewed as a loose JSON object
//! (`field name -> value`), then every required field is checked for presence
//! and shape by hand. Anything that does not fit is rejected; nothing is
//! coerced. A rejected entry never affects its neighbours.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::clients::RawPayload;
use crate::domain::{Address, Coordinate, Cuisine, Location, Rating, Restaurant, RestaurantId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("internal test restaurant")]
    TestRecord,

    #[error("{0} is not an object")]
    NotAnObject(String),

    #[error("missing field {0}")]
    MissingField(String),

    #[error("{field} should be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },
}

impl RecordError {
    /// Short label used for the skip counter.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::TestRecord => "test_record",
            Self::NotAnObject(_) | Self::MissingField(_) | Self::WrongType { .. } => "schema",
            Self::InvalidCoordinates(_) => "coordinates",
            Self::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Loosely-typed view of one JSON object, remembering where it sits in the
/// record so errors can name the full field path.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, RecordError> {
        Self::at(value, String::new(), "record")
    }

    fn at(value: &'a Value, prefix: String, name: &str) -> Result<Self, RecordError> {
        value.as_object().map_or_else(
            || Err(RecordError::NotAnObject(name.to_string())),
            |map| Ok(Self { map, prefix }),
        )
    }

    fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> RecordError {
        RecordError::WrongType {
            field: self.path(key),
            expected,
        }
    }

    /// Present and not `null`.
    fn required(&self, key: &str) -> Result<&'a Value, RecordError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Err(RecordError::MissingField(self.path(key))),
            Some(value) => Ok(value),
        }
    }

    fn object(&self, key: &str) -> Result<Fields<'a>, RecordError> {
        let path = self.path(key);
        Fields::at(self.required(key)?, format!("{path}."), &path)
    }

    fn string(&self, key: &str) -> Result<String, RecordError> {
        self.required(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type(key, "a string"))
    }

    fn unsigned(&self, key: &str) -> Result<u64, RecordError> {
        self.required(key)?
            .as_u64()
            .ok_or_else(|| self.wrong_type(key, "a non-negative integer"))
    }

    fn number(&self, key: &str) -> Result<f64, RecordError> {
        self.required(key)?
            .as_f64()
            .ok_or_else(|| self.wrong_type(key, "a number"))
    }

    fn optional_number(&self, key: &str) -> Result<Option<f64>, RecordError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "a number or null")),
        }
    }

    fn boolean(&self, key: &str) -> Result<bool, RecordError> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| self.wrong_type(key, "a boolean"))
    }

    fn array(&self, key: &str) -> Result<&'a [Value], RecordError> {
        self.required(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.wrong_type(key, "an array"))
    }
}

/// Validates one raw listing entry.
///
/// # Errors
///
/// [`RecordError::TestRecord`] for entries flagged `isTestRestaurant`, checked
/// before anything else; otherwise the first schema violation found.
pub fn parse_listing(raw: &Value) -> Result<Restaurant, RecordError> {
    if raw.get("isTestRestaurant") == Some(&Value::Bool(true)) {
        return Err(RecordError::TestRecord);
    }

    let record = Fields::root(raw)?;

    Ok(Restaurant {
        id: RestaurantId::new(record.unsigned("id")?),
        name: record.string("name")?,
        address: parse_address(&record.object("address")?)?,
        rating: parse_rating(&record.object("rating")?)?,
        cuisines: parse_cuisines(&record)?,
        logo_url: record.string("logoUrl")?,
        is_test_restaurant: record.boolean("isTestRestaurant")?,
    })
}

fn parse_address(address: &Fields<'_>) -> Result<Address, RecordError> {
    Ok(Address {
        city: address.string("city")?,
        first_line: address.string("firstLine")?,
        postal_code: address.string("postalCode")?,
        location: parse_location(&address.object("location")?)?,
    })
}

fn parse_location(location: &Fields<'_>) -> Result<Location, RecordError> {
    let kind = location.string("type")?;
    let point = lon_lat_to_coordinate(location.array("coordinates")?)?;

    Ok(Location {
        kind,
        longitude: point.longitude,
        latitude: point.latitude,
    })
}

/// The feed sends `[longitude, latitude]`; distance math wants latitude first.
///
/// # Errors
///
/// Anything other than exactly two in-range numbers.
pub fn lon_lat_to_coordinate(pair: &[Value]) -> Result<Coordinate, RecordError> {
    let [lon, lat] = pair else {
        return Err(RecordError::InvalidCoordinates(format!(
            "expected [longitude, latitude], got {} values",
            pair.len()
        )));
    };

    let (Some(lon), Some(lat)) = (lon.as_f64(), lat.as_f64()) else {
        return Err(RecordError::InvalidCoordinates(
            "coordinates must be numbers".to_string(),
        ));
    };

    let point = Coordinate::from_lon_lat([lon, lat]);
    if !point.is_valid() {
        return Err(RecordError::InvalidCoordinates(format!(
            "{point} is outside latitude/longitude bounds"
        )));
    }
    Ok(point)
}

fn parse_rating(rating: &Fields<'_>) -> Result<Rating, RecordError> {
    let star_rating = rating.number("starRating")?;
    if !(0.0..=5.0).contains(&star_rating) {
        return Err(RecordError::OutOfRange {
            field: rating.path("starRating"),
            value: star_rating,
        });
    }

    Ok(Rating {
        count: rating.unsigned("count")?,
        star_rating,
        user_rating: rating.optional_number("userRating")?,
    })
}

fn parse_cuisines(record: &Fields<'_>) -> Result<Vec<Cuisine>, RecordError> {
    record
        .array("cuisines")?
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let cuisine = Fields::at(entry, format!("cuisines[{index}]."), "cuisine")?;
            Ok(Cuisine {
                name: cuisine.string("name")?,
                unique_name: cuisine.string("uniqueName")?,
            })
        })
        .collect()
}

/// Outcome of validating a whole payload.
#[derive(Debug, Default)]
pub struct ParsedListings {
    pub restaurants: Vec<Restaurant>,
    pub skipped: usize,
}

/// Validates every entry, keeping feed order and silently dropping rejects.
#[must_use]
pub fn parse_listings(payload: &RawPayload) -> ParsedListings {
    let mut parsed = ParsedListings::default();

    for (index, entry) in payload.entries().iter().enumerate() {
        match parse_listing(entry) {
            Ok(restaurant) => parsed.restaurants.push(restaurant),
            Err(e) => {
                trace!(index, error = %e, "Skipping listing");
                metrics::counter!("listings_skipped_total", "reason" => e.reason()).increment(1);
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_entry() -> Value {
        json!({
            "id": 101,
            "name": "Pasta Place",
            "uniqueName": "pasta-place",
            "address": {
                "city": "London",
                "firstLine": "10 Downing Street",
                "postalCode": "SW1A 2AA",
                "location": {"type": "Point", "coordinates": [-0.1276, 51.5034]}
            },
            "rating": {"count": 250, "starRating": 4.2, "userRating": null},
            "cuisines": [
                {"name": "Italian", "uniqueName": "italian"},
                {"name": "Pizza", "uniqueName": "pizza"}
            ],
            "logoUrl": "https://img.example.com/101.gif",
            "isTestRestaurant": false,
            "deliveryEtaMinutes": {"rangeLower": 20, "rangeUpper": 35}
        })
    }

    #[test]
    fn parses_a_complete_entry() {
        let restaurant = parse_listing(&valid_entry()).unwrap();

        assert_eq!(restaurant.id, RestaurantId::new(101));
        assert_eq!(restaurant.name, "Pasta Place");
        assert_eq!(restaurant.address.first_line, "10 Downing Street");
        assert_eq!(restaurant.address.location.kind, "Point");
        assert_eq!(restaurant.rating.count, 250);
        assert_eq!(restaurant.rating.star_rating, 4.2);
        assert_eq!(restaurant.rating.user_rating, None);
        assert_eq!(restaurant.cuisines.len(), 2);
        assert!(!restaurant.is_test_restaurant);
    }

    #[test]
    fn coordinates_are_read_longitude_first() {
        let restaurant = parse_listing(&valid_entry()).unwrap();
        assert_eq!(restaurant.address.location.longitude, -0.1276);
        assert_eq!(restaurant.address.location.latitude, 51.5034);
        assert_eq!(restaurant.coordinate(), Coordinate::new(51.5034, -0.1276));
    }

    #[test]
    fn lon_lat_conversion_in_isolation() {
        let point = lon_lat_to_coordinate(&[json!(-3.19), json!(55.95)]).unwrap();
        assert_eq!(point, Coordinate::new(55.95, -3.19));

        assert!(lon_lat_to_coordinate(&[json!(1.0)]).is_err());
        assert!(lon_lat_to_coordinate(&[json!(1.0), json!(2.0), json!(3.0)]).is_err());
        assert!(lon_lat_to_coordinate(&[json!("1.0"), json!(2.0)]).is_err());
        // Latitude 120 only happens if the axes were swapped upstream.
        assert!(lon_lat_to_coordinate(&[json!(51.5), json!(120.0)]).is_err());
    }

    #[test]
    fn test_restaurants_are_skipped_before_validation() {
        let mut entry = valid_entry();
        entry["isTestRestaurant"] = json!(true);
        assert_eq!(parse_listing(&entry), Err(RecordError::TestRecord));

        // Even a broken test entry reports as a test record.
        assert_eq!(
            parse_listing(&json!({"isTestRestaurant": true})),
            Err(RecordError::TestRecord)
        );
    }

    #[test]
    fn missing_required_fields_are_named() {
        let mut entry = valid_entry();
        entry["address"].as_object_mut().unwrap().remove("postalCode");
        assert_eq!(
            parse_listing(&entry),
            Err(RecordError::MissingField("address.postalCode".to_string()))
        );

        let mut entry = valid_entry();
        entry["logoUrl"] = Value::Null;
        assert_eq!(
            parse_listing(&entry),
            Err(RecordError::MissingField("logoUrl".to_string()))
        );
    }

    #[test]
    fn values_are_not_coerced() {
        let mut entry = valid_entry();
        entry["id"] = json!("101");
        assert!(matches!(
            parse_listing(&entry),
            Err(RecordError::WrongType { ref field, .. }) if field == "id"
        ));

        let mut entry = valid_entry();
        entry["rating"]["starRating"] = json!("4.2");
        assert!(matches!(
            parse_listing(&entry),
            Err(RecordError::WrongType { ref field, .. }) if field == "rating.starRating"
        ));

        let mut entry = valid_entry();
        entry["isTestRestaurant"] = json!("false");
        assert!(matches!(parse_listing(&entry), Err(RecordError::WrongType { .. })));
    }

    #[test]
    fn malformed_location_is_rejected() {
        let mut entry = valid_entry();
        entry["address"]["location"] = json!({"coordinates": [-0.1, 51.5]});
        assert_eq!(
            parse_listing(&entry),
            Err(RecordError::MissingField("address.location.type".to_string()))
        );

        let mut entry = valid_entry();
        entry["address"]["location"] = json!({"type": "Point", "coordinates": [51.5]});
        assert!(matches!(
            parse_listing(&entry),
            Err(RecordError::InvalidCoordinates(_))
        ));

        let mut entry = valid_entry();
        entry["address"]["location"] = json!([-0.1, 51.5]);
        assert_eq!(
            parse_listing(&entry),
            Err(RecordError::NotAnObject("address.location".to_string()))
        );
    }

    #[test]
    fn bad_cuisine_entry_rejects_the_record() {
        let mut entry = valid_entry();
        entry["cuisines"][1] = json!({"name": "Pizza"});
        assert_eq!(
            parse_listing(&entry),
            Err(RecordError::MissingField("cuisines[1].uniqueName".to_string()))
        );
    }

    #[test]
    fn star_rating_must_be_within_five_stars() {
        let mut entry = valid_entry();
        entry["rating"]["starRating"] = json!(5.5);
        assert!(matches!(parse_listing(&entry), Err(RecordError::OutOfRange { .. })));
    }

    #[test]
    fn integer_star_ratings_and_user_ratings_are_accepted() {
        let mut entry = valid_entry();
        entry["rating"]["starRating"] = json!(3);
        entry["rating"]["userRating"] = json!(4.5);
        let restaurant = parse_listing(&entry).unwrap();
        assert_eq!(restaurant.rating.star_rating, 3.0);
        assert_eq!(restaurant.rating.user_rating, Some(4.5));
    }

    #[test]
    fn malformed_entries_do_not_disturb_valid_ones() {
        let mut second = valid_entry();
        second["id"] = json!(202);
        let payload = RawPayload::new(json!({
            "restaurants": [
                valid_entry(),
                "not even an object",
                {"id": 5},
                second,
            ]
        }));

        let parsed = parse_listings(&payload);
        let ids: Vec<u64> = parsed.restaurants.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![101, 202]);
        assert_eq!(parsed.skipped, 2);
    }
}
