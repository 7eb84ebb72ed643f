//! Scope tree and symbol table
//!
//! Scopes are stored in a vector and refer to their parent and children by
//! index. The tree tracks a current scope; lookups walk from it outward.

use core_types::{SourcePosition, Type};
use std::collections::HashMap;

/// Index of a scope in its [`ScopeTree`]
pub type ScopeId = usize;

/// A declared variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Identifier name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Where the declaring identifier appears
    pub position: SourcePosition,
    /// Declaring scope
    pub scope: ScopeId,
    /// Assigned at least once
    pub initialized: bool,
    /// Read at least once in expression position
    pub used: bool,
    /// Declaration order across the whole tree
    pub order: usize,
}

/// A lexical block's namespace
#[derive(Debug, Clone)]
pub struct Scope {
    /// Scope ID
    pub id: ScopeId,
    /// Nesting level, 0 for the outermost block
    pub level: usize,
    /// Parent scope ID
    pub parent: Option<ScopeId>,
    /// Child scope IDs in opening order
    pub children: Vec<ScopeId>,
    /// Symbols declared directly in this scope
    pub symbols: HashMap<String, Symbol>,
}

/// One row of the symbol table display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRow {
    /// Identifier name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Declaring scope
    pub scope: ScopeId,
    /// Level of the declaring scope
    pub level: usize,
    /// Declaration line
    pub line: u32,
    /// Declaration column
    pub column: u32,
}

/// Tree of scopes built during semantic analysis
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: Option<ScopeId>,
    declared: usize,
}

impl ScopeTree {
    /// Create an empty tree with no current scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a child of the current scope (or the root) and make it current
    pub fn open_scope(&mut self) -> ScopeId {
        let id = self.scopes.len();
        let level = match self.current {
            Some(parent) => self.scopes[parent].level + 1,
            None => 0,
        };
        self.scopes.push(Scope {
            id,
            level,
            parent: self.current,
            children: Vec::new(),
            symbols: HashMap::new(),
        });
        if let Some(parent) = self.current {
            self.scopes[parent].children.push(id);
        }
        self.current = Some(id);
        log::trace!("opened scope {} at level {}", id, level);
        id
    }

    /// Return to the parent of the current scope
    pub fn close_scope(&mut self) {
        if let Some(current) = self.current {
            log::trace!("closed scope {}", current);
            self.current = self.scopes[current].parent;
        }
    }

    /// The scope declarations go into
    pub fn current(&self) -> Option<ScopeId> {
        self.current
    }

    /// The outermost scope
    pub fn root(&self) -> Option<ScopeId> {
        if self.scopes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Scope by id
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// All scopes in opening order
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Number of scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// True if no scope was opened
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Declare `name` in the current scope.
    ///
    /// A name already present in the current scope is left untouched and the
    /// existing symbol is returned as the error. Ancestor scopes are not
    /// consulted, so inner declarations may shadow outer ones.
    pub fn declare(
        &mut self,
        name: &str,
        ty: Type,
        position: SourcePosition,
    ) -> Result<&Symbol, &Symbol> {
        let scope = match self.current {
            Some(id) => id,
            None => self.open_scope(),
        };
        if self.scopes[scope].symbols.contains_key(name) {
            return Err(&self.scopes[scope].symbols[name]);
        }

        let order = self.declared;
        self.declared += 1;
        let symbol = Symbol {
            name: name.to_string(),
            ty,
            position,
            scope,
            initialized: false,
            used: false,
            order,
        };
        log::debug!("declared {} as {} in scope {}", name, ty, scope);
        Ok(self.scopes[scope]
            .symbols
            .entry(name.to_string())
            .or_insert(symbol))
    }

    /// The scope chain from `id` outward to the root
    pub fn ancestors(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(scope) = current.and_then(|s| self.scopes.get(s)) {
            chain.push(scope.id);
            current = scope.parent;
        }
        chain
    }

    /// Find the scope declaring `name`, walking outward from `from`
    pub fn resolve_from(&self, from: ScopeId, name: &str) -> Option<ScopeId> {
        self.ancestors(from)
            .into_iter()
            .find(|&id| self.scopes[id].symbols.contains_key(name))
    }

    /// Find the scope declaring `name`, walking outward from the current scope
    pub fn resolve(&self, name: &str) -> Option<ScopeId> {
        self.current.and_then(|id| self.resolve_from(id, name))
    }

    /// Look up `name` from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.resolve(name).and_then(|id| self.symbol(id, name))
    }

    /// Symbol declared as `name` directly in `scope`
    pub fn symbol(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes.get(scope).and_then(|s| s.symbols.get(name))
    }

    fn symbol_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes.get_mut(scope).and_then(|s| s.symbols.get_mut(name))
    }

    /// Mark a symbol as read
    pub fn mark_used(&mut self, scope: ScopeId, name: &str) {
        if let Some(symbol) = self.symbol_mut(scope, name) {
            symbol.used = true;
        }
    }

    /// Mark a symbol as assigned
    pub fn mark_initialized(&mut self, scope: ScopeId, name: &str) {
        if let Some(symbol) = self.symbol_mut(scope, name) {
            symbol.initialized = true;
        }
    }

    /// Every symbol in declaration order
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut all: Vec<&Symbol> = self
            .scopes
            .iter()
            .flat_map(|s| s.symbols.values())
            .collect();
        all.sort_by_key(|s| s.order);
        all
    }

    /// Symbols never read, in declaration order
    pub fn unused(&self) -> Vec<&Symbol> {
        self.symbols().into_iter().filter(|s| !s.used).collect()
    }

    /// The symbol table as display rows
    pub fn symbol_table(&self) -> Vec<SymbolRow> {
        self.symbols()
            .into_iter()
            .map(|s| SymbolRow {
                name: s.name.clone(),
                ty: s.ty,
                scope: s.scope,
                level: self.scopes[s.scope].level,
                line: s.position.line,
                column: s.position.column,
            })
            .collect()
    }
}
