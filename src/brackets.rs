// src/brackets.rs
//! テキストバックエンド用の字句ヘルパー。
//! 文字列リテラルとコメントを読み飛ばしつつ、括弧の対応付けとトップレベル分割を行う。
//!
//! 区切り文字はすべて ASCII なので、返すバイトオフセットは常に
//! `str` のスライス境界になる。ループは必ず前進し、
//! 対応が取れない入力は推測せず None を返す。

use std::ops::Range;

fn closer(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

/// `start` で始まる文字列リテラルの直後の位置。閉じていなければ None。
/// 通常の引用符は行をまたがないので、
/// JSX テキスト中のアポストロフィを文字列と取り違えない
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return None,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// `i` の次に見る位置。
/// `i` で文字列リテラルかコメントが始まるならまるごと読み飛ばす
fn skip_trivia(bytes: &[u8], i: usize) -> usize {
    match bytes[i] {
        b'"' | b'\'' | b'`' => skip_string(bytes, i).unwrap_or(i + 1),
        b'/' if bytes.get(i + 1) == Some(&b'/') => bytes[i..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |n| i + n),
        b'/' if bytes.get(i + 1) == Some(&b'*') => bytes[i + 2..]
            .windows(2)
            .position(|w| w == b"*/")
            .map_or(bytes.len(), |n| i + 2 + n + 2),
        _ => i + 1,
    }
}

fn skip_blank(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i < end {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
        } else if bytes[i] == b'/' && matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) {
            i = skip_trivia(bytes, i);
        } else {
            break;
        }
    }
    i.min(end)
}

/// `open` の括弧に対応する閉じ括弧の位置
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !matches!(bytes.get(open), Some(b'(' | b'[' | b'{')) {
        return None;
    }
    let mut stack: Vec<u8> = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b @ (b'(' | b'[' | b'{') => {
                stack.push(closer(b));
                i += 1;
            }
            b @ (b')' | b']' | b'}') => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
                i += 1;
            }
            _ => i = skip_trivia(bytes, i),
        }
    }
    None
}

/// `open`..=`close` の括弧直下にあるカンマ区切りの要素。
/// 前後の空白と先頭のコメントは取り除く
pub fn split_top_level(text: &str, open: usize, close: usize) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;
    let mut i = open + 1;
    while i < close {
        match bytes[i] {
            b'(' | b'[' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b',' if depth == 0 => {
                push_trimmed(bytes, start..i, &mut items);
                i += 1;
                start = i;
            }
            _ => i = skip_trivia(bytes, i),
        }
    }
    push_trimmed(bytes, start..close.min(bytes.len()), &mut items);
    items
}

fn push_trimmed(bytes: &[u8], range: Range<usize>, items: &mut Vec<Range<usize>>) {
    let start = skip_blank(bytes, range.start, range.end);
    let mut end = range.end;
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    if start < end {
        items.push(start..end);
    }
}

/// オブジェクトリテラル `object` (波括弧を含む) のトップレベルにある
/// `key` プロパティの値の範囲
pub fn object_property(text: &str, object: Range<usize>, key: &str) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    if object.end < object.start + 2 || bytes.get(object.start) != Some(&b'{') {
        return None;
    }
    for entry in split_top_level(text, object.start, object.end - 1) {
        let entry_text = &text[entry.clone()];
        let Some(rest) = strip_key(entry_text, key) else {
            continue;
        };
        let Some(value) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let value_start = entry.end - value.len();
        let start = skip_blank(bytes, value_start, entry.end);
        if start < entry.end {
            return Some(start..entry.end);
        }
    }
    None
}

fn strip_key<'a>(entry: &'a str, key: &str) -> Option<&'a str> {
    for quote in ['"', '\''] {
        if let Some(rest) = entry.strip_prefix(quote) {
            return rest.strip_prefix(key)?.strip_prefix(quote);
        }
    }
    let rest = entry.strip_prefix(key)?;
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => None,
        _ => Some(rest),
    }
}

/// 単純な文字列リテラルの中身
/// (引用符、または埋め込みのないテンプレートリテラル)
pub fn string_literal(text: &str) -> Option<&str> {
    let text = text.trim();
    let quote = text.chars().next()?;
    if !matches!(quote, '"' | '\'' | '`') || text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains(quote) || (quote == '`' && inner.contains("${")) {
        return None;
    }
    Some(inner)
}

/// `start` で始まる JSX タグを閉じる `>` の位置。
/// `{...}` の属性式と引用符付きの属性値は読み飛ばす
pub fn jsx_tag_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => i = matching_close(text, i)? + 1,
            b'"' | b'\'' => i = skip_string(bytes, i).unwrap_or(i + 1),
            b'>' => return Some(i),
            b'<' => return None,
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_close_skips_strings_and_comments() {
        let src = r#"[ { path: "/a]" }, // ] stray
 { path: '/b' } ]"#;
        let close = matching_close(src, 0).unwrap();
        assert_eq!(close, src.len() - 1);
    }

    #[test]
    fn unbalanced_input_yields_none() {
        assert_eq!(matching_close("[ { path: '/a' ]", 0), None);
        assert_eq!(matching_close("[ { path: '/a' }", 0), None);
        assert_eq!(matching_close("x[]", 0), None);
    }

    #[test]
    fn split_top_level_ignores_nested_commas() {
        let src = "[ { path: '/a', children: [1, 2] },\n  // @tags x\n  { path: '/b' }, ]";
        let close = matching_close(src, 0).unwrap();
        let items: Vec<&str> = split_top_level(src, 0, close)
            .into_iter()
            .map(|r| &src[r])
            .collect();
        assert_eq!(items, vec!["{ path: '/a', children: [1, 2] }", "{ path: '/b' }"]);
    }

    #[test]
    fn object_property_reads_top_level_keys_only() {
        let src = "{ meta: { path: '/inner' }, 'path': \"/outer\", children: [] }";
        let value = object_property(src, 0..src.len(), "path").unwrap();
        assert_eq!(&src[value], "\"/outer\"");
        assert!(object_property(src, 0..src.len(), "element").is_none());
        assert!(object_property("{ pathname: '/x' }", 0..18, "path").is_none());
    }

    #[test]
    fn string_literal_rejects_interpolation() {
        assert_eq!(string_literal(" '/about' "), Some("/about"));
        assert_eq!(string_literal("`/static`"), Some("/static"));
        assert_eq!(string_literal("`/users/${id}`"), None);
        assert_eq!(string_literal("ROUTES.home"), None);
    }

    #[test]
    fn jsx_tag_end_steps_over_expressions() {
        let src = r#"<Route path="/a" element={<About />} />"#;
        assert_eq!(jsx_tag_end(src, 0), Some(src.len() - 1));
    }
}
