//! Declared names and the class of their types.

use std::fmt;
use std::ops::ControlFlow;

use tracing::trace;

use crate::ast::{
    Array, BaseType, DepthFirst, MemberSuffix, Node, NodeRef, SourceLocation, Token,
    TypeSpecifier, TypedefTarget, Walk,
};

/// Coarse classification of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Built-in arithmetic types and `void`.
    Scalar,
    Pointer,
    Array,
    /// `struct` or `union`.
    Aggregate,
    Enum,
    /// A typedef name.
    Named,
    Function,
}

impl TypeClass {
    /// Class of `spec`, with `array` the declarator's own dimension.
    ///
    /// Arrays take precedence over pointers: `char *argv[]` is an array.
    pub fn of(spec: &TypeSpecifier, array: Option<&Array>) -> TypeClass {
        if array.is_some() || spec.array().is_present() {
            return TypeClass::Array;
        }
        if spec.pointer().is_present() {
            return TypeClass::Pointer;
        }
        match spec.base() {
            BaseType::Aggregate(_) => TypeClass::Aggregate,
            BaseType::Enum(_) => TypeClass::Enum,
            BaseType::Named(_) => TypeClass::Named,
            _ => TypeClass::Scalar,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeClass::Scalar => "scalar",
            TypeClass::Pointer => "pointer",
            TypeClass::Array => "array",
            TypeClass::Aggregate => "struct/union",
            TypeClass::Enum => "enum",
            TypeClass::Named => "named",
            TypeClass::Function => "function",
        };
        f.write_str(name)
    }
}

/// What a declared name is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Function,
    Parameter,
    Global,
    Local,
    Member,
    Typedef,
    Enumerator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub role: Role,
    pub class: TypeClass,
    pub location: SourceLocation,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} `{}`: {}",
            self.location, self.role, self.name, self.class
        )
    }
}

/// Collects every declared name of a tree, in source order.
#[derive(Debug, Default)]
pub struct DeclarationCollector {
    declarations: Vec<Declaration>,
    /// Function bodies currently entered.
    functions: usize,
}

impl DeclarationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }

    fn declare(&mut self, name: &Token, role: Role, class: TypeClass) {
        trace!(name = name.text(), ?role, ?class, "declared");
        self.declarations.push(Declaration {
            name: name.text().to_string(),
            role,
            class,
            location: name.location(),
        });
    }
}

impl Walk for DeclarationCollector {
    type Output = ();

    fn empty(&mut self) {}

    fn token(&mut self, _token: &Token, _ctx: &()) {}

    fn merge(&mut self, _acc: (), _next: ()) {}

    // Names that follow their type are declared on the way out, so
    // enumerators and members of an inline definition come first.
    fn enter(&mut self, node: NodeRef<'_>, _ctx: &()) -> ControlFlow<()> {
        match node {
            NodeRef::FunctionDeclaration(function) => {
                self.declare(function.name(), Role::Function, TypeClass::Function);
                self.functions += 1;
            }
            NodeRef::TypeDeclaration(typedef) => {
                if let TypedefTarget::Function(function) = typedef.target() {
                    self.declare(function.name(), Role::Typedef, TypeClass::Function);
                }
            }
            NodeRef::Enumerator(enumerator) => {
                self.declare(enumerator.name(), Role::Enumerator, TypeClass::Enum);
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn leave(&mut self, node: NodeRef<'_>, output: ()) {
        match node {
            NodeRef::FunctionDeclaration(_) => self.functions -= 1,
            NodeRef::ParameterDeclaration(param) => {
                let class = TypeClass::of(param.param_type(), param.array().as_option());
                self.declare(param.name(), Role::Parameter, class);
            }
            NodeRef::VariableDeclaration(var) => {
                let role = if self.functions > 0 { Role::Local } else { Role::Global };
                let list = var.declarators();
                let declarators =
                    std::iter::once(list.first()).chain(list.rest().iter().map(|(_, d)| d));
                for declarator in declarators {
                    let class = TypeClass::of(var.var_type(), declarator.array().as_option());
                    self.declare(declarator.name(), role, class);
                }
            }
            NodeRef::StructDeclaration(member) => {
                let array = match member.suffix().as_option() {
                    Some(MemberSuffix::Array(array)) => Some(array),
                    _ => None,
                };
                let class = TypeClass::of(member.member_type(), array);
                self.declare(member.name(), Role::Member, class);
            }
            NodeRef::TypeDeclaration(typedef) => {
                if let TypedefTarget::Data(data) = typedef.target() {
                    self.declare(data.name(), Role::Typedef, TypeClass::Aggregate);
                }
            }
            _ => {}
        }
        output
    }
}

/// Every name declared in `node`.
pub fn collect_declarations<N: Node>(node: &N) -> Vec<Declaration> {
    let mut walker = DepthFirst::new(DeclarationCollector::new());
    walker.run(node, ());
    walker.into_inner().into_declarations()
}
