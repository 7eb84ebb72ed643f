//! Block Language Compiler Component
//!
//! Provides the lexer, parser, concrete syntax tree, scope tree, type checker
//! and code generator for the block language.
//!
//! # Overview
//!
//! - [`Lexer`] - Turns one program unit into tokens
//! - [`Parser`] - Recursive descent parser with panic-mode recovery
//! - [`SyntaxTree`] - Arena-backed concrete syntax tree
//! - [`ScopeTree`] - Nested scopes with shadowing lookup
//! - [`SemanticAnalyzer`] - Scope building and type checking in one pass
//! - [`CodeGenerator`] - Emits into a [`runtime_image::RuntimeImage`] with backpatching
//! - [`compile_unit`] - Runs every stage with error gating
//!
//! # Example
//!
//! ```
//! use compiler::{compile_unit, CompileOptions};
//!
//! let output = compile_unit("{string s s = \"hi\" print(s)}$", &CompileOptions::default());
//! assert!(output.succeeded());
//!
//! let code = output.code.unwrap();
//! assert!(code.temps.is_resolved());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod code_gen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod scope;
pub mod semantic;
pub mod syntax_tree;
pub mod type_check;

pub use code_gen::{CodeGenOutput, CodeGenerator};
pub use lexer::{lex_all, tokenize, Lexer, Token, TokenKind, TokenStream, END_OF_PROGRAM};
pub use parser::Parser;
pub use pipeline::{compile_unit, CompileOptions, CompileOutput};
pub use scope::{Scope, ScopeId, ScopeTree, Symbol, SymbolRow};
pub use semantic::{SemanticAnalyzer, SemanticModel};
pub use syntax_tree::{NodeId, NodeKind, Rule, SyntaxNode, SyntaxTree, TreeBuilder};
