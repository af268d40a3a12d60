//! Splits embedded reviews out of app records.

use crate::constants::UNKNOWN_APP_ID;
use crate::models::{ApplicationRecord, Fields, ReviewRecord};
use serde_json::Value;
use tracing::warn;

/// Result of [`split_records`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutput {
    /// App records in input order, without the reviews field.
    pub applications: Vec<ApplicationRecord>,
    /// Reviews in input order, each carrying its owner's `appId`.
    pub reviews: Vec<ReviewRecord>,
    /// Apps that had no usable `appId`.
    pub unidentified_apps: usize,
    /// Reviews whose back-reference is the `unknown` sentinel.
    pub orphan_reviews: usize,
    /// Review array elements that were not objects and were dropped.
    pub skipped_reviews: usize,
    /// Apps whose reviews field held something other than an array or null.
    pub malformed_review_fields: usize,
}

/// Separates each app's embedded reviews into a flat review sequence.
///
/// The input is left untouched: new app records are built without
/// `reviews_field`, and every review object is copied with `appId` set to the
/// owning app's identifier. Apps without an identifier get the `unknown`
/// sentinel as back-reference; those reviews are kept but counted in
/// [`SplitOutput::orphan_reviews`]. A missing or null reviews field means the
/// app has no reviews; any other non-array value is also treated as no reviews
/// but counted in [`SplitOutput::malformed_review_fields`].
pub fn split_records(records: &[ApplicationRecord], reviews_field: &str) -> SplitOutput {
    let mut out = SplitOutput {
        applications: Vec::with_capacity(records.len()),
        ..SplitOutput::default()
    };

    for (index, record) in records.iter().enumerate() {
        let (owner_id, orphaned) = match record.app_id() {
            Some(id) => (id, false),
            None => {
                out.unidentified_apps += 1;
                warn!(index, "App record has no appId, using sentinel");
                (UNKNOWN_APP_ID.to_string(), true)
            }
        };

        let mut fields = Fields::with_capacity(record.fields().len());
        let mut embedded: Option<&Value> = None;
        for (key, value) in record.fields() {
            if key == reviews_field {
                embedded = Some(value);
            } else {
                fields.insert(key.clone(), value.clone());
            }
        }

        let items: &[Value] = match embedded {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => &[],
            Some(other) => {
                out.malformed_review_fields += 1;
                warn!(
                    app_id = %owner_id,
                    field = reviews_field,
                    found = json_kind(other),
                    "Reviews field is not an array, app kept without reviews"
                );
                &[]
            }
        };
        for item in items {
            match item {
                Value::Object(review) => {
                    out.reviews
                        .push(ReviewRecord::with_owner(review.clone(), &owner_id));
                    if orphaned {
                        out.orphan_reviews += 1;
                    }
                }
                _ => {
                    out.skipped_reviews += 1;
                    warn!(app_id = %owner_id, "Skipping review element that is not an object");
                }
            }
        }

        out.applications.push(ApplicationRecord::new(fields));
    }

    if out.orphan_reviews > 0 {
        warn!(
            unidentified_apps = out.unidentified_apps,
            orphan_reviews = out.orphan_reviews,
            sentinel = UNKNOWN_APP_ID,
            "Reviews reference apps without an identifier"
        );
    }

    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
