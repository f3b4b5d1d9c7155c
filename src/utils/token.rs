use rand::Rng;
use rand::distr::Alphanumeric;

/// 会话令牌长度，约 285 位熵
const TOKEN_LEN: usize = 48;

/// 生成不可猜测的会话令牌
pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_session_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
