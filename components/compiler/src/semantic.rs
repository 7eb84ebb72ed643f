//! Semantic analysis: scope building and type checking in one traversal

use crate::error::semantic_error;
use crate::scope::{ScopeId, ScopeTree};
use crate::syntax_tree::{NodeId, Rule, SyntaxTree};
use crate::type_check::{self, TypeEnvironment};
use core_types::{Diagnostic, DiagnosticLog, Severity, SourceSpan, Stage, Type};
use std::collections::HashMap;

/// Result of semantic analysis, consumed by code generation
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    /// The finished scope tree
    pub scopes: ScopeTree,
    /// Scope opened by each `Block` node
    pub block_scopes: HashMap<NodeId, ScopeId>,
    /// Declaring scope of each resolved `Identifier` node
    pub resolutions: HashMap<NodeId, ScopeId>,
}

impl SemanticModel {
    /// Scope opened by a block node
    pub fn scope_of_block(&self, block: NodeId) -> Option<ScopeId> {
        self.block_scopes.get(&block).copied()
    }

    /// Declaring scope of an identifier node
    pub fn resolution(&self, identifier: NodeId) -> Option<ScopeId> {
        self.resolutions.get(&identifier).copied()
    }
}

/// Walks a valid syntax tree once, building scopes and checking types
pub struct SemanticAnalyzer<'a> {
    tree: &'a SyntaxTree,
    diagnostics: &'a mut DiagnosticLog,
    model: SemanticModel,
}

impl<'a> SemanticAnalyzer<'a> {
    /// Create an analyzer over `tree`
    pub fn new(tree: &'a SyntaxTree, diagnostics: &'a mut DiagnosticLog) -> Self {
        Self {
            tree,
            diagnostics,
            model: SemanticModel::default(),
        }
    }

    /// Run the traversal and the unused-variable check
    pub fn analyze(mut self) -> SemanticModel {
        let before = self.diagnostics.error_count();
        if let Some(root) = self.tree.root() {
            self.visit(root);
        }
        self.report_unused();

        let errors = self.diagnostics.error_count() - before;
        log::debug!(
            "semantic analysis finished: {} scopes, {} symbols, {} errors",
            self.model.scopes.len(),
            self.model.scopes.symbols().len(),
            errors
        );
        self.diagnostics.info(
            Stage::SemanticAnalysis,
            format!("semantic analysis completed with {} error(s)", errors),
            None,
        );
        self.model
    }

    fn visit(&mut self, node: NodeId) {
        let tree = self.tree;
        let Some(rule) = tree.rule(node) else {
            return;
        };
        match rule {
            Rule::Block => {
                let scope = self.model.scopes.open_scope();
                self.model.block_scopes.insert(node, scope);
                self.visit_children(node);
                self.model.scopes.close_scope();
            }
            Rule::VarDecl => self.visit_var_decl(node),
            Rule::AssignmentStatement => self.visit_assignment(node),
            Rule::PrintStatement => {
                if let Some(expr) = tree.child_with_rule(node, Rule::Expression) {
                    type_check::infer_expression(tree, expr, self);
                }
            }
            Rule::WhileStatement | Rule::IfStatement => {
                if let Some(condition) = tree.child_with_rule(node, Rule::Condition) {
                    type_check::check_condition(tree, condition, self);
                }
                if let Some(body) = tree.child_with_rule(node, Rule::Statement) {
                    self.visit(body);
                }
            }
            Rule::Program | Rule::StatementList | Rule::Statement => self.visit_children(node),
            _ => {}
        }
    }

    fn visit_children(&mut self, node: NodeId) {
        let tree = self.tree;
        for &child in tree.children(node) {
            self.visit(child);
        }
    }

    fn visit_var_decl(&mut self, node: NodeId) {
        let tree = self.tree;
        let ty = tree
            .child_with_rule(node, Rule::Type)
            .and_then(|t| tree.child_token(t))
            .and_then(|t| type_check::declared_type(t.kind));
        let Some(ident) = tree.child_with_rule(node, Rule::Identifier) else {
            return;
        };
        let (Some(ty), Some(token)) = (ty, tree.child_token(ident)) else {
            return;
        };

        match self.model.scopes.declare(&token.text, ty, token.position()) {
            Ok(symbol) => {
                let scope = symbol.scope;
                self.model.resolutions.insert(ident, scope);
                self.diagnostics.info(
                    Stage::SemanticAnalysis,
                    format!("declared {} as {} in scope {}", token.text, ty, scope),
                    Some(token.span()),
                );
            }
            Err(existing) => {
                let message = format!(
                    "symbol {} already declared in scope {} at ({})",
                    existing.name, existing.scope, existing.position
                );
                self.diagnostics.push(semantic_error(message, token));
            }
        }
    }

    fn visit_assignment(&mut self, node: NodeId) {
        let tree = self.tree;
        let Some(ident) = tree.child_with_rule(node, Rule::Identifier) else {
            return;
        };
        let Some(token) = tree.child_token(ident) else {
            return;
        };
        let name = token.text.as_str();

        let target = self.lookup(ident);
        if target.is_none() {
            self.diagnostics
                .push(semantic_error(format!("undeclared identifier {}", name), token));
        }

        // The right-hand side sees the target as it was before this assignment
        if let Some(value) = tree.child_with_rule(node, Rule::Expression) {
            match target {
                Some((_, ty)) => {
                    type_check::check_assignment(tree, name, ty, value, self);
                }
                // Still resolve identifiers on the right-hand side
                None => {
                    type_check::infer_expression(tree, value, self);
                }
            }
        }

        if let Some((scope, _)) = target {
            self.model.scopes.mark_initialized(scope, name);
        }
    }

    /// Resolve the identifier branch `ident` from the current scope outward,
    /// recording the resolution and the lookup trail.
    fn lookup(&mut self, ident: NodeId) -> Option<(ScopeId, Type)> {
        let tree = self.tree;
        let token = tree.child_token(ident)?;
        let current = self.model.scopes.current()?;

        for scope in self.model.scopes.ancestors(current) {
            self.diagnostics.debug(
                Stage::SemanticAnalysis,
                format!("looking up {} in scope {}", token.text, scope),
                Some(token.span()),
            );
            if let Some(symbol) = self.model.scopes.symbol(scope, &token.text) {
                let ty = symbol.ty;
                self.model.resolutions.insert(ident, scope);
                self.diagnostics.info(
                    Stage::SemanticAnalysis,
                    format!("found {} in scope {}", token.text, scope),
                    Some(token.span()),
                );
                return Some((scope, ty));
            }
        }
        None
    }

    fn report_unused(&mut self) {
        let unused: Vec<Diagnostic> = self
            .model
            .scopes
            .unused()
            .into_iter()
            .map(|symbol| {
                Diagnostic::new(
                    Severity::Warning,
                    Stage::SemanticAnalysis,
                    format!("unused variable {}", symbol.name),
                )
                .with_span(SourceSpan::new(symbol.name.clone(), symbol.position))
            })
            .collect();
        for diagnostic in unused {
            self.diagnostics.push(diagnostic);
        }
    }
}

impl TypeEnvironment for SemanticAnalyzer<'_> {
    fn identifier_type(&mut self, tree: &SyntaxTree, node: NodeId) -> Option<Type> {
        let token = tree.child_token(node)?;
        match self.lookup(node) {
            Some((scope, ty)) => {
                let initialized = self
                    .model
                    .scopes
                    .symbol(scope, &token.text)
                    .map_or(false, |s| s.initialized);
                if !initialized {
                    self.diagnostics.warning(
                        Stage::SemanticAnalysis,
                        format!("variable {} used before being initialized", token.text),
                        Some(token.span()),
                    );
                }
                self.model.scopes.mark_used(scope, &token.text);
                Some(ty)
            }
            None => {
                self.diagnostics.push(semantic_error(
                    format!("undeclared identifier {}", token.text),
                    token,
                ));
                None
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Analyze a parsed program
pub fn analyze(tree: &SyntaxTree, diagnostics: &mut DiagnosticLog) -> SemanticModel {
    SemanticAnalyzer::new(tree, diagnostics).analyze()
}
