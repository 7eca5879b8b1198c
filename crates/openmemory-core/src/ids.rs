/// Generate a fresh UUID v4 identifier, used for Memory, Vector, Waypoint,
/// and EmbedLog primary keys unless the caller supplies an override.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
