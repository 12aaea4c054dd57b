pub mod data_uri;
pub mod url_validator;

use sha2::{Digest, Sha512};

/// 短 key 字符集，去掉了易混淆字符（0/O、1/l/I、9/g、u/v 等）
pub const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTWXYZabcdefhijkmnprstwxyz2345678";

/// 从 [`KEY_ALPHABET`] 中均匀随机选取字符组成字符串
pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| KEY_ALPHABET[rand::random_range(0..KEY_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// SHA-512 十六进制摘要（unique_link 反向索引的 key）
pub fn content_digest(value: &str) -> String {
    hex::encode(Sha512::digest(value.as_bytes()))
}

/// 是否形如 [`content_digest`] 的输出（128 位小写十六进制）
pub fn is_content_digest(key: &str) -> bool {
    key.len() == 128 && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
