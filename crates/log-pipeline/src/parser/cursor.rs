//! 문법 파서가 공유하는 전진 전용 커서
//!
//! 모든 위치는 원본 라인의 바이트 오프셋이며, 항상 문자 경계에 놓입니다.

/// 라인 위를 앞으로만 이동하는 커서
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// 지정 위치에서 시작하는 커서. 위치는 문자 경계여야 합니다.
    pub(crate) fn at(input: &'a str, pos: usize) -> Self {
        debug_assert!(input.is_char_boundary(pos));
        Self { input, pos }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    /// 아직 소비하지 않은 나머지
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// 다음 문자가 `c`이면 소비하고 true
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// `prefix`로 시작하면 소비하고 true
    pub(crate) fn eat_str(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// 조건을 만족하는 문자를 최대한 소비하고 그 구간을 반환합니다.
    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// 공백(스페이스, 탭)을 소비하고 소비한 길이를 반환합니다.
    pub(crate) fn skip_ws(&mut self) -> usize {
        self.take_while(is_blank).len()
    }

    /// 공백이 한 칸 이상 있어야 합니다.
    pub(crate) fn expect_ws(&mut self) -> Option<usize> {
        match self.skip_ws() {
            0 => None,
            n => Some(n),
        }
    }

    /// `delim` 직전까지 소비합니다. `delim`이 없으면 이동하지 않고 None.
    pub(crate) fn take_until(&mut self, delim: char) -> Option<&'a str> {
        let rest = self.rest();
        let idx = rest.find(delim)?;
        self.pos += idx;
        Some(&rest[..idx])
    }

    /// 정확히 `count`개의 ASCII 숫자를 읽습니다.
    pub(crate) fn fixed_digits(&mut self, count: usize) -> Option<u32> {
        let bytes = self.rest().as_bytes();
        if bytes.len() < count || !bytes[..count].iter().all(u8::is_ascii_digit) {
            return None;
        }
        let value = digits_value(&bytes[..count]);
        self.pos += count;
        Some(value)
    }

    /// `min..=max`개의 ASCII 숫자를 최대한 읽고 (값, 자릿수)를 반환합니다.
    pub(crate) fn digits(&mut self, min: usize, max: usize) -> Option<(u32, usize)> {
        let bytes = self.rest().as_bytes();
        let len = bytes
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii_digit())
            .count();
        if len < min {
            return None;
        }
        let value = digits_value(&bytes[..len]);
        self.pos += len;
        Some((value, len))
    }

    /// 후보 목록 중 현재 위치에서 시작하는 항목의 인덱스를 찾아 소비합니다.
    pub(crate) fn one_of(&mut self, candidates: &[&str]) -> Option<usize> {
        let idx = candidates
            .iter()
            .position(|cand| self.rest().starts_with(cand))?;
        self.pos += candidates[idx].len();
        Some(idx)
    }
}

pub(crate) fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn digits_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0')))
}
