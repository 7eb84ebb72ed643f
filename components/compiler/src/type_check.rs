//! Type rules and expression type inference
//!
//! Inference walks expression subtrees of the syntax tree. Identifier types
//! come from a [`TypeEnvironment`], which the semantic pass implements on top
//! of its scope tree, so scope building and type checking share one
//! traversal.

use crate::error::{type_error, type_info};
use crate::lexer::TokenKind;
use crate::syntax_tree::{NodeId, Rule, SyntaxTree};
use core_types::{Diagnostic, Type};

/// Identifier resolution and diagnostic sink used during inference
pub trait TypeEnvironment {
    /// Type of the identifier branch `node`, or `None` if it is undeclared.
    /// Resolving an identifier here counts as a use.
    fn identifier_type(&mut self, tree: &SyntaxTree, node: NodeId) -> Option<Type>;

    /// Record a diagnostic
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Type of a literal token
pub fn literal_type(kind: TokenKind) -> Option<Type> {
    match kind {
        TokenKind::Digit => Some(Type::Int),
        TokenKind::StringLiteral => Some(Type::String),
        TokenKind::True | TokenKind::False => Some(Type::Boolean),
        _ => None,
    }
}

/// Type named by a type keyword
pub fn declared_type(kind: TokenKind) -> Option<Type> {
    match kind {
        TokenKind::IntType => Some(Type::Int),
        TokenKind::StringType => Some(Type::String),
        TokenKind::BooleanType => Some(Type::Boolean),
        _ => None,
    }
}

/// Unknown types never match anything, including another unknown type
pub fn types_match(left: Option<Type>, right: Option<Type>) -> bool {
    left.is_some() && left == right
}

/// Display name of a possibly unknown type
pub fn describe(ty: Option<Type>) -> String {
    match ty {
        Some(ty) => ty.to_string(),
        None => "unknown".to_string(),
    }
}

/// Infer the type of an `Expression` (or any expression rule) node.
///
/// Type errors found inside the expression are reported through `env`.
pub fn infer_expression<E: TypeEnvironment>(
    tree: &SyntaxTree,
    node: NodeId,
    env: &mut E,
) -> Option<Type> {
    let ty = match tree.rule(node)? {
        Rule::Expression => {
            let inner = tree.child(node, 0)?;
            infer_expression(tree, inner, env)
        }
        Rule::Identifier => env.identifier_type(tree, node),
        Rule::IntExpr => infer_int(tree, node, env),
        Rule::StringExpr => Some(Type::String),
        Rule::BooleanExpr => infer_boolean(tree, node, env),
        _ => None,
    };
    log::trace!("inferred {} for node {:?}", describe(ty), node);
    ty
}

/// `Digit ['+' Expression]`: every operand of the chain must be `int`
fn infer_int<E: TypeEnvironment>(tree: &SyntaxTree, node: NodeId, env: &mut E) -> Option<Type> {
    if let Some(right) = tree.child_with_rule(node, Rule::Expression) {
        let right_ty = infer_expression(tree, right, env);
        if !types_match(right_ty, Some(Type::Int)) {
            let plus = tree
                .children(node)
                .iter()
                .find_map(|&c| tree.token(c).filter(|t| t.kind == TokenKind::Plus));
            env.report(type_error(
                format!(
                    "type mismatch: cannot add {} to int",
                    describe(right_ty)
                ),
                plus.or_else(|| tree.first_token(right)),
            ));
        }
    }
    Some(Type::Int)
}

fn infer_boolean<E: TypeEnvironment>(
    tree: &SyntaxTree,
    node: NodeId,
    env: &mut E,
) -> Option<Type> {
    let operands = tree.children_with_rule(node, Rule::Expression);
    let op = tree.child_with_rule(node, Rule::BoolOp);

    match (operands.as_slice(), op) {
        // '(' Expression BoolOp Expression ')'
        ([left, right], Some(op)) => {
            let left_ty = infer_expression(tree, *left, env);
            let right_ty = infer_expression(tree, *right, env);
            check_comparison(tree, op, left_ty, right_ty, env);
        }
        // BoolVal BoolOp Expression
        ([right], Some(op)) => {
            let right_ty = infer_expression(tree, *right, env);
            check_comparison(tree, op, Some(Type::Boolean), right_ty, env);
        }
        _ => {}
    }
    Some(Type::Boolean)
}

/// Both sides of `==` / `!=` must have the same type; the result is boolean
pub fn check_comparison<E: TypeEnvironment>(
    tree: &SyntaxTree,
    op: NodeId,
    left: Option<Type>,
    right: Option<Type>,
    env: &mut E,
) -> Type {
    if !types_match(left, right) {
        env.report(type_error(
            format!(
                "type mismatch: cannot compare {} with {}",
                describe(left),
                describe(right)
            ),
            tree.first_token(op),
        ));
    }
    Type::Boolean
}

/// Check a `Condition` node of `while` / `if`.
///
/// With an operator both operands must agree; a lone expression must be
/// boolean.
pub fn check_condition<E: TypeEnvironment>(tree: &SyntaxTree, node: NodeId, env: &mut E) {
    let operands = tree.children_with_rule(node, Rule::Expression);
    let op = tree.child_with_rule(node, Rule::BoolOp);

    match (operands.as_slice(), op) {
        ([left, right], Some(op)) => {
            let left_ty = infer_expression(tree, *left, env);
            let right_ty = infer_expression(tree, *right, env);
            check_comparison(tree, op, left_ty, right_ty, env);
        }
        ([expr], _) => {
            let ty = infer_expression(tree, *expr, env);
            if !types_match(ty, Some(Type::Boolean)) {
                env.report(type_error(
                    format!("type mismatch: condition must be boolean, found {}", describe(ty)),
                    tree.first_token(*expr),
                ));
            }
        }
        _ => {}
    }
}

/// The assigned value must have the variable's declared type
pub fn check_assignment<E: TypeEnvironment>(
    tree: &SyntaxTree,
    name: &str,
    target: Type,
    value: NodeId,
    env: &mut E,
) -> bool {
    let value_ty = infer_expression(tree, value, env);
    let token = tree.first_token(value);
    if types_match(Some(target), value_ty) {
        env.report(type_info(
            format!("type match on assignment to {}", name),
            token,
        ));
        true
    } else {
        env.report(type_error(
            format!(
                "type mismatch: cannot assign {} to {} variable {}",
                describe(value_ty),
                target,
                name
            ),
            token,
        ));
        false
    }
}
