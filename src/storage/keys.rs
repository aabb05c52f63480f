use uuid::Uuid;

/// Builds object keys of the form `{prefix}/{username}-{millis}-{suffix}-{file_name}`.
///
/// `suffix` is 8 random hex characters, so two files with the same name in
/// the same millisecond still get distinct keys.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    prefix: String,
}

impl KeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    pub fn generate(&self, username: Option<&str>, file_name: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        let name = format!(
            "{}-{}-{}-{}",
            sanitize(username.unwrap_or_default()),
            millis,
            suffix,
            sanitize(file_name)
        );

        if self.prefix.is_empty() {
            name
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new("uploads")
    }
}

/// Keep caller-supplied segments from introducing path separators.
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_layout() {
        let key = KeyGenerator::default().generate(Some("alice"), "cat.jpg");

        let rest = key.strip_prefix("uploads/alice-").unwrap();
        let parts: Vec<&str> = rest.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "cat.jpg");
    }

    #[test]
    fn missing_username_and_file_name_are_empty() {
        let key = KeyGenerator::default().generate(None, "");
        assert!(key.starts_with("uploads/-"));
        assert!(key.ends_with('-'));
    }

    #[test]
    fn identical_names_do_not_collide() {
        let keys = KeyGenerator::default();
        let generated: HashSet<String> = (0..100).map(|_| keys.generate(Some("u"), "same.png")).collect();
        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn separators_are_replaced() {
        let key = KeyGenerator::new("/media/").generate(Some("a/b"), "../etc\\passwd");
        assert!(key.starts_with("media/a_b-"));
        assert!(key.ends_with("-.._etc_passwd"));
        assert_eq!(key.matches('/').count(), 1);
    }
}
