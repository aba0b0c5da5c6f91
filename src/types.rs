use smallvec::SmallVec;

/// Fully qualified constant path such as "Api::V1::User".
///
/// Stored as the rendered text plus the length of each `::`-separated
/// segment, so segment access never re-scans the text. Short paths keep
/// the length table on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    text: String,
    seg_lens: SmallVec<[u16; 8]>,
}

impl QualifiedName {
    pub fn new(path: &str) -> Self {
        let seg_lens = path.split("::").map(|segment| segment.len() as u16).collect();
        Self {
            text: path.to_string(),
            seg_lens,
        }
    }

    /// The rendered path text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The last segment, without its namespace
    pub fn base_name(&self) -> &str {
        let len = *self.seg_lens.last().unwrap() as usize;
        &self.text[self.text.len() - len..]
    }

    /// Number of `::`-separated segments
    pub fn segment_count(&self) -> usize {
        self.seg_lens.len()
    }

    /// The enclosing namespace, if any ("Api::V1" for "Api::V1::User")
    pub fn namespace(&self) -> Option<Self> {
        if self.seg_lens.len() <= 1 {
            return None;
        }
        let last = *self.seg_lens.last().unwrap() as usize;
        let mut parent = self.clone();
        parent.text.truncate(parent.text.len() - last - 2);
        parent.seg_lens.pop();
        Some(parent)
    }

    /// This path extended by one child segment
    pub fn nested(&self, child: &str) -> Self {
        let mut result = self.clone();
        result.text.reserve(child.len() + 2);
        result.text.push_str("::");
        result.text.push_str(child);
        result.seg_lens.push(child.len() as u16);
        result
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for QualifiedName {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for QualifiedName {
    fn from(path: String) -> Self {
        let seg_lens = path.split("::").map(|segment| segment.len() as u16).collect();
        Self {
            text: path,
            seg_lens,
        }
    }
}

/// Kind of a hash-literal key: `foo: 1` vs `"foo" => 1`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Symbol(String),
    Str(String),
}

impl KeyKind {
    pub fn name(&self) -> &str {
        match self {
            KeyKind::Symbol(s) | KeyKind::Str(s) => s,
        }
    }
}

/// The closed type algebra produced by inference
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Unknown / unresolved
    Any,
    /// nil
    Nil,
    /// true or false
    Bool(bool),
    /// Integer base type
    Integer,
    /// A specific integer literal (widens to Integer through bindings)
    IntegerLiteral(i64),
    /// String base type
    String,
    /// A specific string literal
    StringLiteral(String),
    /// A specific symbol literal (:hoge). Symbols have no base type here.
    SymbolLiteral(String),
    /// Homogeneous array: [Integer]
    ArrayOf(Box<Type>),
    /// Keyed hash literal shape, keys in source order
    HashShape(Vec<(KeyKind, Type)>),
    /// The class object itself: singleton(A)
    Singleton(QualifiedName),
    /// An instance of a class: Api::User
    Instance(QualifiedName),
    /// Sum of multiple types, insertion-ordered and deduplicated
    Union(Vec<Type>),
}

impl Type {
    /// Canonical textual rendering of the type
    pub fn to_ts(&self) -> String {
        match self {
            Type::Any => "any".to_string(),
            Type::Nil => "nil".to_string(),
            Type::Bool(true) => "true".to_string(),
            Type::Bool(false) => "false".to_string(),
            Type::Integer => "Integer".to_string(),
            Type::IntegerLiteral(n) => n.to_string(),
            Type::String => "String".to_string(),
            Type::StringLiteral(s) => format!("\"{}\"", s),
            Type::SymbolLiteral(s) => format!(":{}", s),
            Type::ArrayOf(elem) => format!("[{}]", elem.to_ts()),
            Type::HashShape(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let pairs: Vec<_> = entries
                    .iter()
                    .map(|(key, ty)| match key {
                        KeyKind::Symbol(name) => format!("{}: {}", name, ty.to_ts()),
                        KeyKind::Str(name) => format!("\"{}\" => {}", name, ty.to_ts()),
                    })
                    .collect();
                format!("{{ {} }}", pairs.join(", "))
            }
            Type::Singleton(name) => format!("singleton({})", name),
            Type::Instance(name) => name.as_str().to_string(),
            Type::Union(types) => {
                let names: Vec<_> = types.iter().map(|t| t.to_ts()).collect();
                names.join(" | ")
            }
        }
    }

    /// Promote a literal type to its base. Symbols and bools have no base
    /// in this algebra and stay literal.
    pub fn widen(&self) -> Type {
        match self {
            Type::IntegerLiteral(_) => Type::Integer,
            Type::StringLiteral(_) => Type::String,
            other => other.clone(),
        }
    }

    /// Build a union from the given types: flattens nested unions and
    /// deduplicates while preserving insertion order. An empty input is
    /// Any; a single distinct member collapses to itself.
    pub fn union_of(types: Vec<Type>) -> Type {
        fn push(ty: Type, members: &mut Vec<Type>) {
            if !members.contains(&ty) {
                members.push(ty);
            }
        }

        let mut members: Vec<Type> = Vec::new();
        for ty in types {
            match ty {
                Type::Union(inner) => {
                    for t in inner {
                        push(t, &mut members);
                    }
                }
                other => push(other, &mut members),
            }
        }
        match members.len() {
            0 => Type::Any,
            1 => members.pop().unwrap(),
            _ => Type::Union(members),
        }
    }

    /// Combine the types flowing into a binding (local write, ivar write,
    /// argument or return aggregation). Integer literals always widen; a
    /// sole string/symbol/bool literal keeps its literal form; distinct
    /// literals widen to their base before the union is formed.
    pub fn widen_union(types: Vec<Type>) -> Type {
        let mut distinct: Vec<Type> = Vec::new();
        for ty in types {
            if !distinct.contains(&ty) {
                distinct.push(ty);
            }
        }
        match distinct.len() {
            0 => Type::Any,
            1 => {
                let ty = distinct.pop().unwrap();
                match ty {
                    Type::IntegerLiteral(_) => Type::Integer,
                    other => other,
                }
            }
            _ => Type::union_of(distinct.into_iter().map(|t| t.widen()).collect()),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_ts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // QualifiedName tests

    #[test]
    fn test_qualified_name_single_segment() {
        let name = QualifiedName::new("User");
        assert_eq!(name.as_str(), "User");
        assert_eq!(name.base_name(), "User");
        assert_eq!(name.segment_count(), 1);
        assert!(name.namespace().is_none());
    }

    #[test]
    fn test_qualified_name_nested_segments() {
        let name = QualifiedName::new("Api::V1::User");
        assert_eq!(name.as_str(), "Api::V1::User");
        assert_eq!(name.base_name(), "User");
        assert_eq!(name.segment_count(), 3);

        let namespace = name.namespace().unwrap();
        assert_eq!(namespace.as_str(), "Api::V1");
        assert_eq!(namespace.base_name(), "V1");
        assert_eq!(namespace.namespace().unwrap().as_str(), "Api");
    }

    #[test]
    fn test_qualified_name_nested_builder() {
        let name = QualifiedName::new("Api").nested("V1").nested("User");
        assert_eq!(name.as_str(), "Api::V1::User");
        assert_eq!(name.segment_count(), 3);
        assert_eq!(name, QualifiedName::new("Api::V1::User"));
    }

    #[test]
    fn test_qualified_name_display_and_from() {
        let name: QualifiedName = "Api::User".into();
        assert_eq!(format!("{}", name), "Api::User");

        let owned: QualifiedName = String::from("Api::User").into();
        assert_eq!(owned, name);
    }

    // Rendering tests

    #[test]
    fn test_to_ts_primitives() {
        assert_eq!(Type::Any.to_ts(), "any");
        assert_eq!(Type::Nil.to_ts(), "nil");
        assert_eq!(Type::Bool(true).to_ts(), "true");
        assert_eq!(Type::Bool(false).to_ts(), "false");
        assert_eq!(Type::Integer.to_ts(), "Integer");
        assert_eq!(Type::String.to_ts(), "String");
    }

    #[test]
    fn test_to_ts_literals() {
        assert_eq!(Type::IntegerLiteral(42).to_ts(), "42");
        assert_eq!(Type::StringLiteral("foo".to_string()).to_ts(), "\"foo\"");
        assert_eq!(Type::SymbolLiteral("hoge".to_string()).to_ts(), ":hoge");
    }

    #[test]
    fn test_to_ts_array() {
        assert_eq!(Type::ArrayOf(Box::new(Type::Integer)).to_ts(), "[Integer]");
    }

    #[test]
    fn test_to_ts_hash_shape() {
        let hash = Type::HashShape(vec![
            (KeyKind::Symbol("foo".to_string()), Type::Integer),
            (KeyKind::Str("bar".to_string()), Type::Integer),
        ]);
        assert_eq!(hash.to_ts(), "{ foo: Integer, \"bar\" => Integer }");
    }

    #[test]
    fn test_to_ts_singleton_and_instance() {
        assert_eq!(Type::Singleton("A".into()).to_ts(), "singleton(A)");
        assert_eq!(Type::Instance("Api::User".into()).to_ts(), "Api::User");
    }

    #[test]
    fn test_to_ts_union() {
        let union = Type::Union(vec![
            Type::IntegerLiteral(1),
            Type::IntegerLiteral(2),
            Type::Nil,
        ]);
        assert_eq!(union.to_ts(), "1 | 2 | nil");
    }

    // Union construction tests

    #[test]
    fn test_union_of_dedup_preserves_order() {
        let ty = Type::union_of(vec![Type::String, Type::Integer, Type::String]);
        assert_eq!(ty.to_ts(), "String | Integer");
    }

    #[test]
    fn test_union_of_flattens_nested() {
        let inner = Type::Union(vec![Type::Integer, Type::Nil]);
        let ty = Type::union_of(vec![Type::String, inner]);
        assert_eq!(ty.to_ts(), "String | Integer | nil");
    }

    #[test]
    fn test_union_of_single_collapses() {
        assert_eq!(Type::union_of(vec![Type::Integer]), Type::Integer);
        assert_eq!(Type::union_of(vec![]), Type::Any);
    }

    // Widening tests

    #[test]
    fn test_widen_union_sole_integer_literal() {
        let ty = Type::widen_union(vec![Type::IntegerLiteral(1)]);
        assert_eq!(ty, Type::Integer);
    }

    #[test]
    fn test_widen_union_sole_string_literal_kept() {
        let ty = Type::widen_union(vec![Type::StringLiteral("foo".to_string())]);
        assert_eq!(ty.to_ts(), "\"foo\"");
    }

    #[test]
    fn test_widen_union_sole_symbol_literal_kept() {
        let ty = Type::widen_union(vec![Type::SymbolLiteral("hoge".to_string())]);
        assert_eq!(ty.to_ts(), ":hoge");
    }

    #[test]
    fn test_widen_union_matching_literals_kept() {
        let ty = Type::widen_union(vec![
            Type::StringLiteral("foo".to_string()),
            Type::StringLiteral("foo".to_string()),
        ]);
        assert_eq!(ty.to_ts(), "\"foo\"");
    }

    #[test]
    fn test_widen_union_distinct_literals_widen() {
        let ty = Type::widen_union(vec![
            Type::StringLiteral("foo".to_string()),
            Type::StringLiteral("bar".to_string()),
        ]);
        assert_eq!(ty, Type::String);

        let ty = Type::widen_union(vec![
            Type::IntegerLiteral(1),
            Type::StringLiteral("x".to_string()),
        ]);
        assert_eq!(ty.to_ts(), "Integer | String");
    }

    #[test]
    fn test_widen_union_symbols_stay_literal() {
        let ty = Type::widen_union(vec![
            Type::SymbolLiteral("a".to_string()),
            Type::SymbolLiteral("b".to_string()),
        ]);
        assert_eq!(ty.to_ts(), ":a | :b");
    }
}
