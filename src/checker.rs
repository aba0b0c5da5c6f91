use crate::analyzer::AstInstaller;
use crate::env::const_registry::ConstantKind;
use crate::env::method_registry::MethodId;
use crate::env::GlobalEnv;
use crate::graph::VertexId;
use crate::parser;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// The outcome of walking one file: the populated registries plus the
/// local bindings left at top level
pub struct Analysis {
    pub genv: GlobalEnv,
    pub top_locals: Vec<(String, VertexId)>,
}

/// Single-file analysis driver. Each analysis uses a fresh GlobalEnv.
pub struct FileAnalyzer;

impl FileAnalyzer {
    pub fn analyze_file(file_path: &Path) -> Result<Analysis> {
        let source = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        Self::analyze_source(&source, file_path)
    }

    pub fn analyze_source(source: &str, file_path: &Path) -> Result<Analysis> {
        let parse_result = parser::parse_ruby(source, file_path)?;

        let mut genv = GlobalEnv::new();
        let top_locals = {
            let mut installer = AstInstaller::new(&mut genv, source, file_path);
            installer.install_program(&parse_result);
            installer.top_level_locals()
        };

        debug!(file = %file_path.display(), "analysis finished");
        Ok(Analysis { genv, top_locals })
    }
}

/// Render the inferred signatures of one analysis as text: constants,
/// then methods in registration order, then top-level locals
pub fn render_report(analysis: &Analysis) -> String {
    let genv = &analysis.genv;
    let mut lines = Vec::new();

    let mut constants: Vec<_> = genv.const_registry.iter().collect();
    constants.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
    for constant in constants {
        let keyword = match constant.kind {
            ConstantKind::Class => "class",
            ConstantKind::Module => "module",
        };
        lines.push(format!("{} {}", keyword, constant.name));
    }

    for i in 0..genv.method_registry.len() {
        lines.push(genv.method_signature(MethodId(i)));
    }

    for (name, vertex) in &analysis.top_locals {
        lines.push(format!("{}: {}", name, genv.infer_vertex(*vertex).to_ts()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_source_populates_registries() {
        let source = r#"
class A
  def self.hello = 1
end

a_class = A
b = a_class.hello
"#;
        let analysis = FileAnalyzer::analyze_source(source, Path::new("test.rb")).unwrap();

        assert!(analysis.genv.const_registry.find("A").is_some());
        assert_eq!(analysis.top_locals.len(), 2);
        assert_eq!(analysis.top_locals[0].0, "a_class");
        assert_eq!(analysis.top_locals[1].0, "b");
    }

    #[test]
    fn test_render_report() {
        let source = r#"
class A
  def self.hello = 1
end

a_class = A
b = a_class.hello
"#;
        let analysis = FileAnalyzer::analyze_source(source, Path::new("test.rb")).unwrap();
        let report = render_report(&analysis);

        assert!(report.contains("class A"));
        assert!(report.contains("def A.hello: () -> Integer"));
        assert!(report.contains("a_class: singleton(A)"));
        assert!(report.contains("b: Integer"));
    }

    #[test]
    fn test_analyze_source_rejects_invalid_ruby() {
        let result = FileAnalyzer::analyze_source("def\nend end", Path::new("bad.rb"));
        assert!(result.is_err());
    }
}
