use arrayvec::ArrayString;
use blake3::Hasher;
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::database::schema::asset::RecordId;

/// Generate a fresh record identifier in canonical `8-4-4-4-12` form.
///
/// The identifier is the first 16 bytes of blake3 over the current time and a
/// random salt.
pub fn generate_id() -> RecordId {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let mut hasher = Hasher::new();
    hasher.update(format!("{}-{}", Utc::now().timestamp_millis(), salt).as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest.as_bytes()[..16]);

    let mut id = ArrayString::<36>::new();
    for c in Uuid::from_bytes(bytes).hyphenated().to_string().chars() {
        id.push(c);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_canonical_and_distinct() {
        let ids: HashSet<RecordId> = (0..200).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 200);
        for id in &ids {
            assert!(Uuid::try_parse(id).is_ok());
            let groups: Vec<usize> = id.split('-').map(str::len).collect();
            assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        }
    }
}
