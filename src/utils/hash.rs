use sha2::{Digest, Sha256};

/// 学生标识匿名化
///
/// 哈希输入为「标识_作业ID」，同一学生在不同作业下得到不同哈希，
/// 在同一作业内保持可关联。原始标识从不落库。
pub fn hash_student_identifier(identifier: &str, assignment_id: i64) -> String {
    format!(
        "{:x}",
        Sha256::digest(format!("{identifier}_{assignment_id}").as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(
            hash_student_identifier("alice@example.edu", 7),
            hash_student_identifier("alice@example.edu", 7)
        );
    }

    #[test]
    fn test_hash_varies_per_assignment() {
        assert_ne!(
            hash_student_identifier("alice@example.edu", 7),
            hash_student_identifier("alice@example.edu", 8)
        );
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let h = hash_student_identifier("bob", 1);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
