//! 短码生成器
//!
//! 在 62 个字母数字符号上均匀抽取，冲突时重试；重试次数用尽后
//! 以 `length + 2` 的长度再抽一次并直接返回，保证最坏情况下的延迟有界。

use tracing::{trace, warn};

use super::generate_random_code;

/// Extra symbols appended on the fallback draw
pub const FALLBACK_EXTRA_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    length: usize,
    max_attempts: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(6, 50)
    }
}

impl CodeGenerator {
    pub fn new(length: usize, max_attempts: usize) -> Self {
        Self {
            length,
            max_attempts,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw a code that `exists` reports as unused
    ///
    /// The fallback draw is returned without consulting `exists`; callers
    /// still insert it with an insert-if-absent primitive.
    pub fn generate<F>(&self, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_random_code(self.length);
            if !exists(&candidate) {
                trace!("CodeGenerator: '{}' accepted on attempt {}", candidate, attempt);
                return candidate;
            }
            trace!("CodeGenerator: '{}' already taken", candidate);
        }

        warn!(
            "CodeGenerator: {} attempts collided at length {}, falling back to length {}",
            self.max_attempts,
            self.length,
            self.length + FALLBACK_EXTRA_LENGTH
        );
        generate_random_code(self.length + FALLBACK_EXTRA_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    #[test]
    fn test_generates_configured_length() {
        let generator = CodeGenerator::new(6, 50);
        let code = generator.generate(|_| false);
        assert_eq!(code.len(), 6);
        assert!(crate::utils::is_valid_short_code(&code));
    }

    #[test]
    fn test_retries_on_collision() {
        let calls = Cell::new(0);
        let generator = CodeGenerator::new(6, 50);
        let code = generator.generate(|_| {
            calls.set(calls.get() + 1);
            calls.get() < 3
        });
        assert_eq!(calls.get(), 3);
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_fallback_extends_length_when_exhausted() {
        let calls = Cell::new(0);
        let generator = CodeGenerator::new(6, 50);
        let code = generator.generate(|_| {
            calls.set(calls.get() + 1);
            true
        });
        assert_eq!(calls.get(), 50);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_codes_are_spread_out() {
        let generator = CodeGenerator::default();
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate(|_| false)).collect();
        // 62^6 的空间里 1000 次抽取几乎不可能重复
        assert!(codes.len() >= 999);
    }

    #[test]
    fn test_avoids_existing_keys() {
        let existing: HashSet<String> = (0..200)
            .map(|_| crate::utils::generate_random_code(4))
            .collect();
        let generator = CodeGenerator::new(4, 50);
        for _ in 0..200 {
            let code = generator.generate(|c| existing.contains(c));
            assert!(!existing.contains(&code) || code.len() == 6);
        }
    }
}
