//! Sensor catalog
//!
//! Sensor metadata documents have no fixed schema, so they are returned as
//! relaxed extended JSON rather than decoded into a record.

use bson::{doc, Bson, Document};

use crate::store::{FindOptions, SortSpec};

/// Stored key of the sensor kind in the sensors collection
pub const SENSOR_TYPE_KEY: &str = "type";

/// Sensors of the given types, one page at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorListRequest {
    /// Sensor kinds to include; empty means all
    pub types: Vec<String>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl SensorListRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: restrict to these types
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Predicate: `{"type": {"$in": types}}`, or `{}` for all sensors
    pub fn filter(&self) -> Document {
        if self.types.is_empty() {
            return Document::new();
        }

        let types: Vec<Bson> = self.types.iter().cloned().map(Bson::String).collect();
        let mut filter = Document::new();
        filter.insert(SENSOR_TYPE_KEY, doc! { "$in": types });
        filter
    }

    /// Find options: `_id` ascending, limit and skip passed through
    pub fn options(&self) -> FindOptions {
        FindOptions {
            sort: Some(SortSpec::ascending("_id")),
            limit: self.limit,
            skip: self.skip,
        }
    }
}

/// Split a comma separated list of sensor types, dropping blanks
pub fn parse_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a raw sensor document as relaxed extended JSON
pub fn to_json(document: Document) -> serde_json::Value {
    Bson::Document(document).into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_filter_by_types() {
        let request = SensorListRequest::new().types(["PH", "DO"]);
        assert_eq!(request.filter(), doc! { "type": { "$in": ["PH", "DO"] } });
    }

    #[test]
    fn test_no_types_means_all() {
        assert_eq!(SensorListRequest::new().filter(), Document::new());
    }

    #[test]
    fn test_options() {
        let options = SensorListRequest::new().limit(3).skip(0).options();
        assert_eq!(options.sort, Some(SortSpec::ascending("_id")));
        assert_eq!(options.limit, Some(3));
        assert_eq!(options.skip, Some(0));
    }

    #[test]
    fn test_parse_types() {
        assert_eq!(parse_types("PH, DO,,LUX "), vec!["PH", "DO", "LUX"]);
        assert!(parse_types("").is_empty());
    }

    #[test]
    fn test_to_json() {
        let oid = ObjectId::parse_str("67b3039d85c10e3ee466eccd").unwrap();
        let value = to_json(doc! { "_id": oid, "type": "PH", "depth": 2 });

        assert_eq!(
            value,
            json!({ "_id": { "$oid": "67b3039d85c10e3ee466eccd" }, "type": "PH", "depth": 2 })
        );
    }
}
