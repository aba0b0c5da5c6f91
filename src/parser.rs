use anyhow::Result;
use ruby_prism::{parse, ParseResult};
use std::path::Path;

/// Parse Ruby source text, reporting syntax errors as file:line:column.
///
/// The returned AST borrows `source`; callers keep the text alive for
/// the duration of the walk (the installer needs it for lexemes anyway),
/// so no 'static copy of the buffer is made.
pub fn parse_ruby<'src>(source: &'src str, file: &Path) -> Result<ParseResult<'src>> {
    let result = parse(source.as_bytes());

    let mut problems = Vec::new();
    for diagnostic in result.errors() {
        let (line, column) = position_of(source, diagnostic.location().start_offset());
        problems.push(format!(
            "{}:{}:{}: {}",
            file.display(),
            line,
            column,
            diagnostic.message()
        ));
    }

    if !problems.is_empty() {
        anyhow::bail!(
            "{} syntax error(s)\n{}",
            problems.len(),
            problems.join("\n")
        );
    }

    Ok(result)
}

/// 1-based line and column of a byte offset
fn position_of(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let prefix = &source[..offset];
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (prefix.matches('\n').count() + 1, offset - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_assignment() {
        let result = parse_ruby("x = 1", Path::new("test.rb"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_class_with_method() {
        let source = r#"class User
  def greet
    "hello"
  end
end"#;
        let result = parse_ruby(source, Path::new("test.rb"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_invalid_source() {
        let result = parse_ruby("def\nend end", Path::new("test.rb"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_carries_file_position() {
        let err = parse_ruby("class", Path::new("broken.rb")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("syntax error"));
        assert!(message.contains("broken.rb:1:"));
    }

    #[test]
    fn test_position_of() {
        let source = "a = 1\nbb = 2\n";
        assert_eq!(position_of(source, 0), (1, 1));
        assert_eq!(position_of(source, 4), (1, 5));
        assert_eq!(position_of(source, 6), (2, 1));
        assert_eq!(position_of(source, 11), (2, 6));
        // clamped past the end
        assert_eq!(position_of(source, 99), (3, 1));
    }
}
