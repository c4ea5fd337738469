// 行ソース
//
// スクリプトテキストを1行ずつ、1行先読み付きで提供します。

use std::iter::{Enumerate, Peekable};
use std::str::Lines;

/// 先読み付きの行ソース
///
/// 行番号は1始まりです。行末の `\r\n` は取り除かれます。
pub struct LineSource<'s> {
    lines: Peekable<Enumerate<Lines<'s>>>,
}

impl<'s> LineSource<'s> {
    /// スクリプトテキストから行ソースを作成
    pub fn new(text: &'s str) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
        }
    }

    /// 次の行を消費せずに参照
    pub fn peek(&mut self) -> Option<&'s str> {
        self.lines.peek().map(|(_, line)| *line)
    }

    /// 次の行を消費し、行番号とともに返す
    pub fn next_line(&mut self) -> Option<(usize, &'s str)> {
        self.lines.next().map(|(index, line)| (index + 1, line))
    }

    /// 次に返される行の行番号（終端ならNone）
    pub fn next_line_number(&mut self) -> Option<usize> {
        self.lines.peek().map(|(index, _)| index + 1)
    }

    /// 全行を消費したか
    pub fn is_exhausted(&mut self) -> bool {
        self.lines.peek().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut source = LineSource::new("a\r\nb");
        assert_eq!(source.peek(), Some("a"));
        assert_eq!(source.next_line_number(), Some(1));
        assert_eq!(source.next_line(), Some((1, "a")));
        assert_eq!(source.next_line(), Some((2, "b")));
        assert!(source.is_exhausted());
        assert_eq!(source.next_line(), None);
    }
}
