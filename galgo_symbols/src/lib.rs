pub mod names;
pub mod scanner;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use scanner::{
    AutoloadClass, ClassMethods, ClassScan, DeclaredMember, NotifyClass, NotifyField,
    scan_autoload_classes, scan_class_methods, scan_classes, scan_notify_classes,
};

/// A type reference by assembly identity plus fully-qualified name. Base
/// chains are walked through these, never through pointer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub assembly: String,
    pub qualified_name: String,
}

impl TypeRef {
    pub fn new(assembly: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            qualified_name: qualified_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Positional constructor argument of a marker attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrArg {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl AttrArg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeUse {
    pub qualified_name: String,
    pub args: Vec<AttrArg>,
    pub location: SourceLocation,
}

impl AttributeUse {
    pub fn new(qualified_name: impl Into<String>, args: Vec<AttrArg>, location: SourceLocation) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            args,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// Fully-qualified C# type text, e.g. `int` or `global::Godot.Vector2`.
    pub ty: String,
}

/// One declared member of a class, as the compiled snapshot exposes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberSymbol {
    Field {
        name: String,
        ty: String,
        is_static: bool,
        attributes: Vec<AttributeUse>,
    },
    Property {
        name: String,
        ty: String,
        is_static: bool,
        attributes: Vec<AttributeUse>,
    },
    Method {
        name: String,
        params: Vec<Param>,
        is_static: bool,
        is_implicit: bool,
        attributes: Vec<AttributeUse>,
    },
    Delegate {
        name: String,
        params: Vec<Param>,
        attributes: Vec<AttributeUse>,
    },
}

impl MemberSymbol {
    pub fn attributes(&self) -> &[AttributeUse] {
        match self {
            Self::Field { attributes, .. }
            | Self::Property { attributes, .. }
            | Self::Method { attributes, .. }
            | Self::Delegate { attributes, .. } => attributes,
        }
    }

    pub fn find_attribute(&self, qualified_name: &str) -> Option<&AttributeUse> {
        self.attributes()
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    /// Containing namespace; empty for the global namespace.
    pub namespace: String,
    pub assembly: String,
    pub base: Option<TypeRef>,
    /// Source file the class was declared in, relative to the project root.
    pub source_path: String,
    pub members: Vec<MemberSymbol>,
    pub attributes: Vec<AttributeUse>,
}

impl ClassSymbol {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// `global::`-prefixed name, the form generated code references types by.
    pub fn full_name(&self) -> String {
        format!("global::{}", self.qualified_name())
    }

    pub fn hint_name(&self) -> String {
        sanitize_qualified_name(&self.qualified_name())
    }

    pub fn has_attribute(&self, qualified_name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.qualified_name == qualified_name)
    }
}

/// A type outside the compilation (engine assembly); carries just enough to
/// continue a base-chain walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalType {
    pub assembly: String,
    pub qualified_name: String,
    pub base: Option<TypeRef>,
}

/// Read-only snapshot of the compiled program's declared types. Supplied by
/// the host build; the generator never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolGraph {
    pub classes: Vec<ClassSymbol>,
    pub externals: Vec<ExternalType>,
}

impl SymbolGraph {
    /// Walks the base chain starting at `class`'s base, matching by
    /// assembly plus fully-qualified name. The snapshot is host-supplied
    /// and untrusted, so a cyclic base chain stops the walk instead of
    /// spinning.
    pub fn inherits_from(&self, class: &ClassSymbol, assembly: &str, qualified_name: &str) -> bool {
        let mut visited: Vec<TypeRef> = Vec::new();
        let mut current = class.base.clone();
        while let Some(type_ref) = current {
            if type_ref.assembly == assembly && type_ref.qualified_name == qualified_name {
                return true;
            }
            if visited.contains(&type_ref) {
                return false;
            }
            current = self.base_of(&type_ref);
            visited.push(type_ref);
        }
        false
    }

    /// True when the class reaches the recognized engine root object.
    pub fn inherits_root(&self, class: &ClassSymbol) -> bool {
        self.inherits_from(class, names::ENGINE_ASSEMBLY, names::ROOT_OBJECT)
    }

    pub fn find_class(&self, qualified_name: &str) -> Option<&ClassSymbol> {
        self.classes
            .iter()
            .find(|c| c.qualified_name() == qualified_name)
    }

    fn base_of(&self, type_ref: &TypeRef) -> Option<TypeRef> {
        if let Some(class) = self
            .classes
            .iter()
            .find(|c| c.assembly == type_ref.assembly && c.qualified_name() == type_ref.qualified_name)
        {
            return class.base.clone();
        }
        self.externals
            .iter()
            .find(|e| e.assembly == type_ref.assembly && e.qualified_name == type_ref.qualified_name)
            .and_then(|e| e.base.clone())
    }
}

/// A structured problem bound to a declaration's source location. Never
/// fatal; the offending item degrades to "nothing generated".
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub location: SourceLocation,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.location, self.message, self.code)
    }
}

/// Generated-fragment identifiers cannot contain angle brackets, so generic
/// type names are rewritten the same way every time.
pub fn sanitize_qualified_name(qualified_name: &str) -> String {
    qualified_name.replace('<', "(Of ").replace('>', ")")
}
