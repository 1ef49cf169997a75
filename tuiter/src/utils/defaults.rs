use bson::oid::ObjectId;

/// Fresh document id, the hex form of a new ObjectId.
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}
