//! Calls to library functions with no bounds checking.
//!
//! A call is recognised syntactically: a postfix expression whose primary is
//! a plain identifier and whose first suffix is an argument list. Calls
//! through function pointers or parenthesized names are not reported.

use std::fmt;
use std::ops::ControlFlow;

use tracing::debug;

use crate::ast::{
    DepthFirst, Node, NodeRef, PostfixExpression, PostfixSuffix, PrimaryForm, SourceLocation,
    Token, Walk,
};

/// Functions reported when no other list is configured.
pub const DEFAULT_BANNED: &[&str] = &["gets", "strcpy", "strcat", "sprintf", "vsprintf", "scanf"];

/// Configuration for [`UnsafeCallFinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    pub banned: Vec<String>,
    /// Stop the walk at the first reported call.
    pub stop_at_first: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            banned: DEFAULT_BANNED.iter().map(|name| name.to_string()).collect(),
            stop_at_first: false,
        }
    }
}

/// One reported call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub callee: String,
    pub location: SourceLocation,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: call to unsafe function `{}`", self.location, self.callee)
    }
}

/// Collects the banned calls of a tree, in source order.
#[derive(Debug, Clone, Default)]
pub struct UnsafeCallFinder {
    config: FinderConfig,
}

impl UnsafeCallFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn banned_call(&self, node: NodeRef<'_>) -> Option<Finding> {
        let NodeRef::PostfixExpression(postfix) = node else {
            return None;
        };
        let callee = callee(postfix)?;
        if !self.config.banned.iter().any(|name| name == callee.text()) {
            return None;
        }
        debug!(callee = callee.text(), location = %callee.location(), "unsafe call");
        Some(Finding {
            callee: callee.text().to_string(),
            location: callee.location(),
        })
    }
}

/// The called name, when `postfix` is a direct call `name(...)`.
fn callee(postfix: &PostfixExpression) -> Option<&Token> {
    let PrimaryForm::Identifier(name) = postfix.primary().form() else {
        return None;
    };
    match postfix.suffixes().iter().next() {
        Some(PostfixSuffix::Call(_)) => Some(name),
        _ => None,
    }
}

impl Walk for UnsafeCallFinder {
    type Output = Vec<Finding>;

    fn empty(&mut self) -> Vec<Finding> {
        Vec::new()
    }

    fn token(&mut self, _token: &Token, _ctx: &()) -> Vec<Finding> {
        Vec::new()
    }

    fn merge(&mut self, mut acc: Vec<Finding>, next: Vec<Finding>) -> Vec<Finding> {
        acc.extend(next);
        acc
    }

    fn enter(&mut self, node: NodeRef<'_>, _ctx: &()) -> ControlFlow<Vec<Finding>> {
        // With stop_at_first the outermost call wins and its arguments are
        // never searched.
        if self.config.stop_at_first {
            if let Some(finding) = self.banned_call(node) {
                return ControlFlow::Break(vec![finding]);
            }
        }
        ControlFlow::Continue(())
    }

    fn leave(&mut self, node: NodeRef<'_>, mut output: Vec<Finding>) -> Vec<Finding> {
        if !self.config.stop_at_first {
            if let Some(finding) = self.banned_call(node) {
                output.insert(0, finding);
            }
        }
        output
    }

    fn is_done(&self, acc: &Vec<Finding>) -> bool {
        self.config.stop_at_first && !acc.is_empty()
    }
}

/// Runs an [`UnsafeCallFinder`] with `config` over `node`.
pub fn find_unsafe_calls<N: Node>(node: &N, config: FinderConfig) -> Vec<Finding> {
    DepthFirst::new(UnsafeCallFinder::new(config)).run(node, ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
int main() {
    char buf[16];
    puts("name?");
    gets(buf);
    strcpy(buf, gets(buf));
    return 0;
}
"#;

    fn callees(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.callee.as_str()).collect()
    }

    #[test]
    fn test_reports_in_source_order() {
        let unit = parse(SOURCE).unwrap();
        let findings = find_unsafe_calls(&unit, FinderConfig::default());
        assert_eq!(callees(&findings), vec!["gets", "strcpy", "gets"]);
        assert_eq!(findings[0].location, SourceLocation::new(5, 5));
        assert_eq!(findings[2].location, SourceLocation::new(6, 17));
    }

    #[test]
    fn test_stop_at_first() {
        let unit = parse(SOURCE).unwrap();
        let config = FinderConfig {
            stop_at_first: true,
            ..FinderConfig::default()
        };
        let findings = find_unsafe_calls(&unit, config);
        assert_eq!(callees(&findings), vec!["gets"]);
    }

    #[test]
    fn test_custom_list_and_non_calls() {
        let unit = parse("int f() { puts(s); x = puts; (gets)(b); }").unwrap();
        let config = FinderConfig {
            banned: vec!["puts".into(), "gets".into()],
            stop_at_first: false,
        };
        let findings = find_unsafe_calls(&unit, config);
        assert_eq!(callees(&findings), vec!["puts"]);
        assert_eq!(findings[0].to_string(), "1:11: call to unsafe function `puts`");
    }
}
