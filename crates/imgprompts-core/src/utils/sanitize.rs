//! 上传文件名净化工具

/// 净化文件名主干（不含扩展名），用于生成落盘文件名
pub fn sanitize_filename_component(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "image".to_string();
    }

    let mut out = String::with_capacity(trimmed.len().min(120));
    for c in trimmed.chars() {
        if matches!(c, '(' | ')') {
            continue;
        }
        let forbidden = matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%' | '#')
            || c.is_control()
            || c.is_whitespace();
        out.push(if forbidden { '_' } else { c });
        if out.len() >= 120 {
            break;
        }
    }

    let out = out.trim_matches([' ', '.']).to_string();
    if out.is_empty() {
        "image".to_string()
    } else {
        out
    }
}

/// 构造 LIKE 子串匹配模式，转义通配符
pub fn like_pattern(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() + 2);
    out.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_component_strips_path_chars() {
        let s = sanitize_filename_component("../..\\evil:name");
        assert!(!s.contains('/'));
        assert!(!s.contains('\\'));
        assert!(!s.contains(':'));
        assert!(!s.starts_with('.'));
    }

    #[test]
    fn sanitize_filename_component_replaces_spaces_and_parens() {
        assert_eq!(sanitize_filename_component("my photo (1)"), "my_photo_1");
    }

    #[test]
    fn sanitize_filename_component_never_empty() {
        assert_eq!(sanitize_filename_component("   "), "image");
        assert_eq!(sanitize_filename_component(".."), "image");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("sunset"), "%sunset%");
    }
}
