use rand::Rng;

/// URL-safe alphabet shared with nanoid.
pub const ID_ALPHABET: &[u8; 64] =
    b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated request and session identifiers.
pub const ID_LENGTH: usize = 21;

/// Generates a 21 character URL-safe identifier.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Whether `id` has the shape produced by [`generate_id`].
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_valid() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LENGTH);
            assert!(is_valid_id(&id), "{id} should be valid");
        }
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("short"));
        assert!(!is_valid_id("abcdefghijklmnopqrstuv")); // 22
        assert!(!is_valid_id("abcdefghij klmnopqrst")); // space
        assert!(!is_valid_id("abcdefghij/klmnopqrst"));
        assert!(!is_valid_id("abcdéfghijklmnopqrst")); // multibyte
        assert!(is_valid_id("V1StGXR8_Z5jdHi6B-myT"));
    }
}
