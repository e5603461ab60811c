use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// Converts a BSON document into plain JSON for API responses.
///
/// ObjectIds become hex strings and datetimes become RFC 3339 strings,
/// instead of the `{"$oid": ...}` extended-JSON wrappers the default
/// serializer produces.
pub fn doc_to_json(doc: Document) -> Value {
    Value::Object(
        doc.into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(dt.try_to_rfc3339_string().unwrap_or_default()),
        Bson::Document(doc) => doc_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_object_id_becomes_hex_string() {
        let oid = ObjectId::new();
        let json = doc_to_json(doc! { "_id": oid, "title": "Pasta" });
        assert_eq!(json["_id"], Value::String(oid.to_hex()));
        assert_eq!(json["title"], Value::String("Pasta".to_string()));
    }

    #[test]
    fn test_nested_arrays_and_documents() {
        let json = doc_to_json(doc! {
            "reviews": [ { "email": "a@b.com", "review": "good" } ],
            "likes": 3_i64,
            "price": 12.5,
        });
        assert_eq!(json["reviews"][0]["email"], "a@b.com");
        assert_eq!(json["likes"], 3);
        assert_eq!(json["price"], 12.5);
    }
}
