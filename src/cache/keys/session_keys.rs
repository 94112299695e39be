/// Session key prefix
const SESSION_PREFIX: &str = "session:";

/// Backing-store key for a session id
pub fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_PREFIX, session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_are_namespaced() {
        assert_eq!(session_key("abc"), "session:abc");
    }
}
