// 行ハンドラー
//
// 行単位で動作するハンドラー。空行・コメント行を読み飛ばす NoOpHandler と、
// 終端行まで行を蓄積して1つの文にする CommandHandler を提供します。

use super::content_reader::ContentReader;
use super::line_source::LineSource;
use regex::Regex;
use std::sync::LazyLock;

/// 空行と行全体のコメント
static NO_OP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:--.*)?$").expect("valid regex"));

/// 文の終端
///
/// 終端の判定は引用符・コメントの外側のテキストに対してのみ行います。
#[derive(Debug, Clone)]
pub struct StatementTerminator {
    name: &'static str,
    pattern: Regex,
}

impl StatementTerminator {
    /// 行末のセミコロン（文からは取り除かれる）
    pub fn semicolon() -> Self {
        Self {
            name: "semicolon",
            pattern: Regex::new(r";\s*$").expect("valid regex"),
        }
    }

    /// 単独の `go` 行（行ごと取り除かれる）
    pub fn go() -> Self {
        Self {
            name: "go",
            pattern: Regex::new(r"(?i)^\s*go\s*$").expect("valid regex"),
        }
    }

    /// 名前
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 引用符・コメントの外側のテキストが終端の形をしているか
    pub fn matches(&self, outside: &str) -> bool {
        self.pattern.is_match(outside)
    }

    /// 終端行のうち文に含める部分
    fn statement_part<'l>(&self, code: &'l str) -> &'l str {
        match self.pattern.find_iter(code).last() {
            Some(found) => &code[..found.start()],
            None => code,
        }
    }
}

impl std::str::FromStr for StatementTerminator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semicolon" | ";" => Ok(Self::semicolon()),
            "go" => Ok(Self::go()),
            other => Err(anyhow::anyhow!(
                "Unknown statement terminator: {}. Please specify 'semicolon' or 'go'.",
                other
            )),
        }
    }
}

/// 空行・コメント行を読み飛ばすハンドラー
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHandler;

impl NoOpHandler {
    /// 読み飛ばす行かどうか
    pub fn matches(&self, line: &str) -> bool {
        NO_OP_LINE.is_match(line)
    }

    /// 該当する行を連続して消費し、消費した行数を返す
    pub fn consume(&self, source: &mut LineSource<'_>) -> usize {
        let mut skipped = 0;
        while source.peek().is_some_and(|line| self.matches(line)) {
            source.next_line();
            skipped += 1;
        }
        skipped
    }
}

/// 蓄積された1つの文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatement {
    /// 文の開始行（1始まり）
    pub line: usize,
    /// 文のテキスト（終端を含まない）
    pub text: String,
}

/// 1行の走査結果
struct LineScan {
    /// 引用符の外側のテキスト（引用範囲は `_` に置き換え、コメントは除外）
    outside: String,
    /// 行コメントの開始位置（なければ行の長さ）
    code_end: usize,
}

/// 終端行まで行を蓄積するハンドラー
pub struct CommandHandler {
    readers: Vec<Box<dyn ContentReader>>,
    terminator: StatementTerminator,
}

impl CommandHandler {
    /// 新しいCommandHandlerを作成
    pub fn new(readers: Vec<Box<dyn ContentReader>>, terminator: StatementTerminator) -> Self {
        Self {
            readers,
            terminator,
        }
    }

    /// 終端
    pub fn terminator(&self) -> &StatementTerminator {
        &self.terminator
    }

    /// 終端行（または入力の終わり）まで行を蓄積
    ///
    /// 引用範囲が行末で開いたままの行は終端と判定しません。
    /// 蓄積したテキストが空白のみの場合はNoneを返します。
    pub fn accumulate(&self, source: &mut LineSource<'_>) -> Option<PendingStatement> {
        let start_line = source.next_line_number()?;
        let mut buffer: Vec<&str> = Vec::new();
        let mut open: Option<usize> = None;

        while let Some((_, line)) = source.next_line() {
            let scan = self.scan(line, &mut open);
            if open.is_none() && self.terminator.matches(&scan.outside) {
                buffer.push(self.terminator.statement_part(line[..scan.code_end].trim_end()));
                break;
            }
            buffer.push(line);
        }

        let text = buffer.join("\n");
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(PendingStatement {
            line: start_line,
            text: text.to_string(),
        })
    }

    /// 1行を走査し、引用符の外側のテキストを取り出す
    ///
    /// `open` は前の行から続いている引用範囲のリーダー番号で、走査後の状態に更新されます。
    fn scan(&self, line: &str, open: &mut Option<usize>) -> LineScan {
        let mut outside = String::with_capacity(line.len());
        let mut position = 0;

        if let Some(index) = *open {
            let span = self.readers[index].resume(line);
            if !span.closed {
                return LineScan {
                    outside,
                    code_end: line.len(),
                };
            }
            *open = None;
            outside.push('_');
            position = span.text.len();
        }

        while position < line.len() {
            let rest = &line[position..];
            let recognized = self
                .readers
                .iter()
                .enumerate()
                .find_map(|(index, reader)| reader.read(rest).map(|span| (index, span)));

            match recognized {
                Some((index, _)) if self.readers[index].is_comment() => {
                    return LineScan {
                        outside,
                        code_end: position,
                    };
                }
                Some((index, span)) => {
                    if !span.closed {
                        *open = Some(index);
                        return LineScan {
                            outside,
                            code_end: line.len(),
                        };
                    }
                    outside.push('_');
                    position += span.text.len();
                }
                None => {
                    // 識別子の途中（例: LIKE'x'）で E'...' を認識しないよう単語ごと進める
                    let word = word_length(rest);
                    if word > 0 {
                        outside.push_str(&rest[..word]);
                        position += word;
                        continue;
                    }
                    let Some(c) = rest.chars().next() else {
                        break;
                    };
                    outside.push(c);
                    position += c.len_utf8();
                }
            }
        }

        LineScan {
            outside,
            code_end: line.len(),
        }
    }
}

/// 先頭の識別子文字の並びのバイト長
fn word_length(text: &str) -> usize {
    text.char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(text.len(), |(index, _)| index)
}
