use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

/// Converts a stored document into the JSON shape clients expect:
/// object ids become hex strings and dates become RFC 3339 strings.
pub fn document_to_json(doc: Document) -> Value {
    let mut map = Map::with_capacity(doc.len());
    for (key, value) in doc {
        map.insert(key, bson_to_json(value));
    }
    Value::Object(map)
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_object_ids_render_as_hex() {
        let id = ObjectId::new();
        let json = document_to_json(doc! {
            "_id": id,
            "name": "CBC",
            "price": 12.5,
            "slots": [ { "ref": id } ],
        });

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["name"], "CBC");
        assert_eq!(json["price"], 12.5);
        assert_eq!(json["slots"][0]["ref"], id.to_hex());
    }
}
