//! JavaScript utilities backed by oxc.
//!
//! The translator never rewrites authored expressions. It only validates the
//! fragments it synthesizes, re-prints whole-file module code, and peeks at
//! literals so constant content can be folded at compile time.

use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingPattern, Expression, ImportDeclarationSpecifier, Statement};
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;

use std::collections::HashSet;

use crate::ir::{CompilerError, ERR_EXPRESSION_SYNTAX, ERR_MODULE_CODE_SYNTAX};

/// A compile-time constant recognized by [`literal_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

impl Literal {
    /// The text the runtime would write for this value.
    ///
    /// `null` and `undefined` render nothing.
    pub fn render_text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Number(n) => format_number(*n),
            Literal::Bool(b) => b.to_string(),
            Literal::Null | Literal::Undefined => String::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn module_source_type() -> SourceType {
    SourceType::default().with_module(true)
}

/// Check that `code` is a single JavaScript expression.
pub fn parse_expression_fragment(file: &str, code: &str) -> Result<(), CompilerError> {
    let allocator = Allocator::default();
    match Parser::new(&allocator, code, module_source_type()).parse_expression() {
        Ok(_) => Ok(()),
        Err(errors) => {
            let detail = errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown parse error".to_string());
            Err(CompilerError::with_details(
                ERR_EXPRESSION_SYNTAX,
                &format!("Invalid expression: {}", detail),
                file,
                0,
                0,
                Some(code.to_string()),
                vec![],
            ))
        }
    }
}

/// Parse a whole file of executable code and print it back out.
pub fn parse_module_code(file: &str, code: &str) -> Result<String, CompilerError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, module_source_type()).parse();
    if let Some(first) = ret.errors.first() {
        return Err(CompilerError::with_details(
            ERR_MODULE_CODE_SYNTAX,
            &format!("Module code does not parse: {}", first),
            file,
            0,
            0,
            None,
            vec![format!("{} parse error(s) in total", ret.errors.len())],
        ));
    }

    Ok(Codegen::new().build(&ret.program).code)
}

/// Top-level names bound by `code`. Unparseable code binds nothing.
pub fn declared_names(code: &str) -> HashSet<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, module_source_type()).parse();

    let mut names = HashSet::new();
    if !ret.errors.is_empty() {
        return names;
    }

    for stmt in &ret.program.body {
        match stmt {
            Statement::VariableDeclaration(var_decl) => {
                for decl in &var_decl.declarations {
                    collect_binding_pattern(&decl.id, &mut names);
                }
            }
            Statement::FunctionDeclaration(func_decl) => {
                if let Some(id) = &func_decl.id {
                    names.insert(id.name.to_string());
                }
            }
            Statement::ClassDeclaration(class_decl) => {
                if let Some(id) = &class_decl.id {
                    names.insert(id.name.to_string());
                }
            }
            Statement::ImportDeclaration(import_decl) => {
                for specifier in import_decl.specifiers.iter().flatten() {
                    let local = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                    };
                    names.insert(local.name.to_string());
                }
            }
            _ => {}
        }
    }

    names
}

fn collect_binding_pattern(pattern: &BindingPattern, names: &mut HashSet<String>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.insert(id.name.to_string());
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_pattern(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_pattern(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for pattern in arr.elements.iter().flatten() {
                collect_binding_pattern(pattern, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_pattern(&rest.argument, names);
            }
        }
        _ => {}
    }
}

/// Recognize `code` as a constant, or `None` when it depends on render input.
pub fn literal_value(code: &str) -> Option<Literal> {
    let allocator = Allocator::default();
    let expr = Parser::new(&allocator, code, module_source_type())
        .parse_expression()
        .ok()?;
    expression_literal(&expr)
}

fn expression_literal(expr: &Expression) -> Option<Literal> {
    match expr {
        Expression::StringLiteral(s) => Some(Literal::String(s.value.to_string())),
        Expression::NumericLiteral(n) => Some(Literal::Number(n.value)),
        Expression::BooleanLiteral(b) => Some(Literal::Bool(b.value)),
        Expression::NullLiteral(_) => Some(Literal::Null),
        Expression::Identifier(id) if id.name == "undefined" => Some(Literal::Undefined),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() => t
            .quasis
            .first()
            .and_then(|q| q.value.cooked.as_ref())
            .map(|cooked| Literal::String(cooked.to_string())),
        Expression::ParenthesizedExpression(p) => expression_literal(&p.expression),
        Expression::UnaryExpression(u) if u.operator.as_str() == "-" => {
            match expression_literal(&u.argument)? {
                Literal::Number(n) => Some(Literal::Number(-n)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_values() {
        assert_eq!(literal_value("'hi'"), Some(Literal::String("hi".to_string())));
        assert_eq!(literal_value("`plain`"), Some(Literal::String("plain".to_string())));
        assert_eq!(literal_value("(42)"), Some(Literal::Number(42.0)));
        assert_eq!(literal_value("true"), Some(Literal::Bool(true)));
        assert_eq!(literal_value("null"), Some(Literal::Null));
        assert_eq!(literal_value("undefined"), Some(Literal::Undefined));
        assert_eq!(literal_value("-1"), Some(Literal::Number(-1.0)));
        assert_eq!(literal_value("-'a'"), None);
    }

    #[test]
    fn test_non_literals() {
        assert_eq!(literal_value("input.name"), None);
        assert_eq!(literal_value("`a${b}`"), None);
        assert_eq!(literal_value("a + 1"), None);
        assert_eq!(literal_value("{"), None);
    }

    #[test]
    fn test_render_text() {
        assert_eq!(Literal::Number(3.0).render_text(), "3");
        assert_eq!(Literal::Number(1.5).render_text(), "1.5");
        assert_eq!(Literal::Null.render_text(), "");
    }

    #[test]
    fn test_expression_fragment_validation() {
        assert!(parse_expression_fragment("a.marko", r#"["./a.css", "b"]"#).is_ok());
        let err = parse_expression_fragment("a.marko", "[1, ").unwrap_err();
        assert_eq!(err.code, ERR_EXPRESSION_SYNTAX);
        assert_eq!(err.context.as_deref(), Some("[1, "));
    }

    #[test]
    fn test_declared_names() {
        let names = declared_names(
            "import Foo, { a as b } from './x.js';\nconst { c, d: [e] } = input;\nfunction f() {}\nclass G {}",
        );
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["Foo", "G", "b", "c", "e", "f"]);
        assert!(declared_names("const = ;").is_empty());
    }

    #[test]
    fn test_module_code_reprint() {
        let code = parse_module_code("a.marko", "export default   function render(){ return 1 }")
            .unwrap();
        assert!(code.contains("export default function render()"));

        let err = parse_module_code("a.marko", "export default {").unwrap_err();
        assert_eq!(err.code, ERR_MODULE_CODE_SYNTAX);
    }
}
