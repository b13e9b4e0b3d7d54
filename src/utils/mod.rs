pub mod code_generator;
pub mod url_validator;

pub use code_generator::CodeGenerator;

/// 生成短码使用的字母表（数字 + 小写 + 大写，共 62 个符号）
pub const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 用户自定义短码的长度下限
pub const MIN_CODE_LENGTH: usize = 4;
/// 用户自定义短码的长度上限
pub const MAX_CODE_LENGTH: usize = 12;

/// 生成指定长度的随机短码
///
/// `rand::random_range` 走线程本地的 ThreadRng：ChaCha 流密码，
/// 由操作系统熵源播种并定期重播种，属于 CSPRNG。
pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Characters allowed anywhere in a short code
#[inline]
pub fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Check a caller-supplied short code against `[A-Za-z0-9_-]{4,12}`
pub fn is_valid_short_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) && code.chars().all(is_code_char)
}

/// Looser check used by the redirect path: any non-empty token built from
/// code characters. Generated fallback codes may exceed `MAX_CODE_LENGTH`.
pub fn is_resolvable_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LENGTH + 2 && code.chars().all(is_code_char)
}
