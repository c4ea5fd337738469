// コンテンツリーダー
//
// 行内の現在位置にある構文（行コメント・引用符で囲まれた範囲）を認識します。
// 各リーダーは何も消費しないか、認識した1つの範囲を区切り文字ごと消費します。

/// 文字列リテラル内のバックスラッシュの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEscapes {
    /// エスケープなし（引用符の二重化のみ）
    Standard,
    /// すべての `'...'` でバックスラッシュエスケープ（MySQL）
    Backslash,
    /// `E'...'` の中だけバックスラッシュエスケープ（PostgreSQL）
    EscapeStringOnly,
}

/// リーダーが消費した範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'t> {
    /// 区切り文字を含む範囲のテキスト
    pub text: &'t str,
    /// 行内で閉じたかどうか（falseなら次の行へ続く）
    pub closed: bool,
}

/// コンテンツリーダートレイト
pub trait ContentReader: Send + Sync {
    /// テキストの先頭にある構文を読む（該当しなければNone）
    fn read<'t>(&self, text: &'t str) -> Option<Span<'t>>;

    /// 前の行から続いている範囲の残りを読む
    fn resume<'t>(&self, text: &'t str) -> Span<'t>;

    /// 行コメントかどうか（以降の行内容は文の判定に使われない）
    fn is_comment(&self) -> bool {
        false
    }
}

/// `--` から行末までのコメント
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentReader;

impl ContentReader for CommentReader {
    fn read<'t>(&self, text: &'t str) -> Option<Span<'t>> {
        text.starts_with("--").then_some(Span { text, closed: true })
    }

    fn resume<'t>(&self, text: &'t str) -> Span<'t> {
        Span { text, closed: true }
    }

    fn is_comment(&self) -> bool {
        true
    }
}

/// 開始・終了の区切り文字で囲まれた範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedReader {
    start: &'static str,
    end: &'static str,
    backslash_escape: bool,
}

impl QuotedReader {
    /// 新しいQuotedReaderを作成
    ///
    /// # Arguments
    ///
    /// * `start` - 開始区切り
    /// * `end` - 終了区切り
    /// * `backslash_escape` - 範囲内で `\` による次の1文字のエスケープを認めるか
    pub fn new(start: &'static str, end: &'static str, backslash_escape: bool) -> Self {
        Self {
            start,
            end,
            backslash_escape,
        }
    }

    /// 文字列リテラル `'...'`
    pub fn single_quote(backslash_escape: bool) -> Self {
        Self::new("'", "'", backslash_escape)
    }

    /// エスケープ文字列 `E'...'`（`prefix` は "E" または "e"）
    pub fn escape_string(prefix: &'static str) -> Self {
        match prefix {
            "e" => Self::new("e'", "'", true),
            _ => Self::new("E'", "'", true),
        }
    }

    /// 引用符付き識別子 `"..."`
    pub fn double_quote() -> Self {
        Self::new("\"", "\"", false)
    }

    /// MySQLの識別子 `` `...` ``
    pub fn backtick() -> Self {
        Self::new("`", "`", false)
    }

    /// ブロックコメント `/* ... */`
    pub fn block_comment() -> Self {
        Self::new("/*", "*/", false)
    }

    /// `offset` から終了区切りを探し、見つかればその直後までを閉じた範囲として返す
    fn scan_from<'t>(&self, text: &'t str, offset: usize) -> Span<'t> {
        let mut escaped = false;
        for (index, c) in text[offset..].char_indices() {
            let position = offset + index;
            if escaped {
                escaped = false;
                continue;
            }
            if self.backslash_escape && c == '\\' {
                escaped = true;
                continue;
            }
            if text[position..].starts_with(self.end) {
                return Span {
                    text: &text[..position + self.end.len()],
                    closed: true,
                };
            }
        }
        Span {
            text,
            closed: false,
        }
    }
}

impl ContentReader for QuotedReader {
    fn read<'t>(&self, text: &'t str) -> Option<Span<'t>> {
        text.starts_with(self.start)
            .then(|| self.scan_from(text, self.start.len()))
    }

    fn resume<'t>(&self, text: &'t str) -> Span<'t> {
        self.scan_from(text, 0)
    }
}

/// 既定のリーダー一式
///
/// 行コメント・ブロックコメント・文字列リテラル・引用符付き識別子を認識します。
pub fn default_readers(escapes: StringEscapes) -> Vec<Box<dyn ContentReader>> {
    let mut readers: Vec<Box<dyn ContentReader>> =
        vec![Box::new(CommentReader), Box::new(QuotedReader::block_comment())];
    if escapes == StringEscapes::EscapeStringOnly {
        readers.push(Box::new(QuotedReader::escape_string("E")));
        readers.push(Box::new(QuotedReader::escape_string("e")));
    }
    readers.push(Box::new(QuotedReader::single_quote(
        escapes == StringEscapes::Backslash,
    )));
    readers.push(Box::new(QuotedReader::double_quote()));
    readers.push(Box::new(QuotedReader::backtick()));
    readers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_reader() {
        let reader = CommentReader;
        assert_eq!(reader.read("select"), None);
        assert_eq!(
            reader.read("-- note; here"),
            Some(Span {
                text: "-- note; here",
                closed: true
            })
        );
    }

    #[test]
    fn test_quoted_reader_consumes_one_span() {
        let reader = QuotedReader::single_quote(false);
        assert_eq!(reader.read("x'a'"), None);
        assert_eq!(
            reader.read("'a;b', 2"),
            Some(Span {
                text: "'a;b'",
                closed: true
            })
        );
    }

    #[test]
    fn test_quoted_reader_open_span_and_resume() {
        let reader = QuotedReader::single_quote(false);
        let span = reader.read("'first line").unwrap();
        assert!(!span.closed);
        assert_eq!(span.text, "'first line");

        let rest = reader.resume("still; open' || 'x'");
        assert!(rest.closed);
        assert_eq!(rest.text, "still; open'");
    }

    #[test]
    fn test_backslash_escape() {
        let escaping = QuotedReader::single_quote(true);
        assert_eq!(escaping.read(r"'it\'s' x").unwrap().text, r"'it\'s'");

        let plain = QuotedReader::single_quote(false);
        assert_eq!(plain.read(r"'it\'s' x").unwrap().text, r"'it\'");
    }

    #[test]
    fn test_escape_string_reader() {
        let reader = QuotedReader::escape_string("E");
        assert_eq!(reader.read(r"'C:' x"), None);
        assert_eq!(reader.read(r"E'it's' x").unwrap().text, r"E'it's'");
        assert_eq!(
            QuotedReader::escape_string("e").read(r"e'a\' x").unwrap().text,
            r"e'a\'"
        );
    }

    #[test]
    fn test_block_comment_with_multibyte_text() {
        let reader = QuotedReader::block_comment();
        let span = reader.read("/* 日本語; */ select").unwrap();
        assert!(span.closed);
        assert_eq!(span.text, "/* 日本語; */");
    }
}
