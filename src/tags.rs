// src/tags.rs
use crate::patterns::catalog;

/// `needle` を含む最初の行の直上にある行コメント群から
/// `// @tags a, b` のタグを取り出す
pub fn extract_tags(code: &str, needle: &str) -> Vec<String> {
    match code.find(needle) {
        Some(offset) => extract_tags_at(code, offset),
        None => Vec::new(),
    }
}

/// バイト位置 `offset` を含む行の宣言に付いたタグ
///
/// 直上に連続する `//` 行だけを見る。
/// 空行かコード行で打ち切り、最も近いマーカーを採用する
pub fn extract_tags_at(code: &str, offset: usize) -> Vec<String> {
    let Some(before) = code.get(..offset.min(code.len())) else {
        return Vec::new();
    };
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    for line in code[..line_start].lines().rev() {
        let line = line.trim();
        if !line.starts_with("//") {
            break;
        }
        if let Some(caps) = catalog().tag_marker.captures(line) {
            return caps["tags"]
                .split(',')
                .map(|tag| tag.trim().to_string())
                .collect();
        }
    }
    Vec::new()
}
