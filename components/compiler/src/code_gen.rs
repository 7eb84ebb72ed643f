//! Code generation into the runtime image
//!
//! The generator walks a checked syntax tree once. Variables and
//! intermediate values get temp table slots and are addressed through
//! placeholders (`T0 XX`); forward branches get jump table slots (`J0`).
//! Branch lengths are patched as soon as a body has been emitted, and every
//! temp placeholder is patched after the final `BRK` once the size of the
//! code, and so the start of static storage, is known.

use crate::lexer::TokenKind;
use crate::semantic::SemanticModel;
use crate::syntax_tree::{NodeId, Rule, SyntaxTree};
use core_types::{DiagnosticLog, Stage, Type};
use runtime_image::{
    format_address, ImageError, ImageResult, JumpTable, Opcode, RuntimeImage, SlotKind, TempTable,
};
use std::collections::{HashMap, HashSet};

/// Bytes a `BNE` skips to jump over a following `LDA #`
const SKIP_LOAD: u8 = 0x02;

/// Artifacts of a successful code generation run
#[derive(Debug, Clone)]
pub struct CodeGenOutput {
    /// The filled image
    pub image: RuntimeImage,
    /// Storage slots with resolved addresses
    pub temps: TempTable,
    /// Branch slots with resolved lengths
    pub jumps: JumpTable,
}

/// Where a value can be found after evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    /// Immediate byte
    Const(u8),
    /// Temp placeholder of the storage holding the value
    Memory(String),
    /// Already in the accumulator
    Accumulator,
}

/// Purpose of a scratch slot at one nesting depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scratch {
    Sum,
    Tail,
    Left,
    Right,
    Print,
    Condition,
}

/// Left operand of a comparison
enum Side {
    Node(NodeId),
    Const(u8),
}

/// Single-pass code generator for one program unit
pub struct CodeGenerator<'a> {
    tree: &'a SyntaxTree,
    model: &'a SemanticModel,
    diagnostics: &'a mut DiagnosticLog,
    image: RuntimeImage,
    temps: TempTable,
    jumps: JumpTable,
    visited: HashSet<NodeId>,
    scratch: HashMap<(usize, Scratch), String>,
    scopes: Vec<usize>,
    depth: usize,
    failed: bool,
}

impl<'a> CodeGenerator<'a> {
    /// Create a generator for a tree that passed semantic analysis
    pub fn new(
        tree: &'a SyntaxTree,
        model: &'a SemanticModel,
        diagnostics: &'a mut DiagnosticLog,
    ) -> Self {
        Self {
            tree,
            model,
            diagnostics,
            image: RuntimeImage::new(),
            temps: TempTable::new(),
            jumps: JumpTable::new(),
            visited: HashSet::new(),
            scratch: HashMap::new(),
            scopes: Vec::new(),
            depth: 0,
            failed: false,
        }
    }

    /// Emit the whole program and resolve every placeholder
    pub fn generate(mut self) -> CodeGenOutput {
        if let Some(root) = self.tree.root() {
            self.visit(root);
        }
        self.emit(Opcode::Break);
        self.resolve_temps();

        let code_end = self.image.cursor();
        log::debug!(
            "generated {} bytes of code, {} bytes static, heap at {:02X}",
            code_end,
            self.temps.static_size(),
            self.image.heap_start()
        );
        self.diagnostics.info(
            Stage::CodeGen,
            format!(
                "code generation completed: {} code bytes, {} temp slots, {} jumps",
                code_end,
                self.temps.len(),
                self.jumps.len()
            ),
            None,
        );
        CodeGenOutput {
            image: self.image,
            temps: self.temps,
            jumps: self.jumps,
        }
    }

    /// Report an image failure once; further writes are dropped silently
    fn check<T>(&mut self, result: ImageResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let repeat_overflow = matches!(err, ImageError::Overflow(_)) && self.failed;
                if !repeat_overflow {
                    self.diagnostics.error(Stage::CodeGen, err.to_string(), None);
                }
                self.failed = true;
                None
            }
        }
    }

    fn emit(&mut self, opcode: Opcode) {
        let result = self.image.write_opcode(opcode);
        self.check(result);
    }

    fn emit_const(&mut self, opcode: Opcode, value: u8) {
        self.emit(opcode);
        let result = self.image.write_hex(value);
        self.check(result);
    }

    fn emit_symbolic(&mut self, opcode: Opcode, symbol: &str) {
        self.emit(opcode);
        let result = self.image.write_symbolic(symbol);
        self.check(result);
    }

    fn current_scope(&self) -> usize {
        self.scopes.last().copied().unwrap_or(0)
    }

    fn level_of(&self, scope: usize) -> usize {
        self.model.scopes.get(scope).map_or(0, |s| s.level)
    }

    /// Scratch slot for `role` at nesting `depth`, allocated on first use
    fn scratch_slot(&mut self, depth: usize, role: Scratch) -> String {
        if let Some(placeholder) = self.scratch.get(&(depth, role)) {
            return placeholder.clone();
        }
        let scope = self.current_scope();
        let level = self.level_of(scope);
        let placeholder = self
            .temps
            .allocate("", Type::Int, SlotKind::Scratch, scope, level)
            .placeholder();
        log::trace!("scratch {:?} at depth {} is {}", role, depth, placeholder);
        self.scratch.insert((depth, role), placeholder.clone());
        placeholder
    }

    fn visit(&mut self, node: NodeId) {
        if !self.visited.insert(node) {
            return;
        }
        let tree = self.tree;
        let Some(rule) = tree.rule(node) else {
            return;
        };

        match rule {
            Rule::Block => {
                let scope = self.model.scope_of_block(node).unwrap_or(0);
                self.scopes.push(scope);
                self.visit_children(node);
                self.scopes.pop();
            }
            Rule::Program | Rule::StatementList | Rule::Statement => self.visit_children(node),
            Rule::VarDecl => self.var_decl(node),
            Rule::AssignmentStatement => self.assignment(node),
            Rule::PrintStatement => self.print(node),
            Rule::IfStatement => self.if_statement(node),
            Rule::WhileStatement => self.while_statement(node),
            _ => {}
        }
    }

    fn visit_children(&mut self, node: NodeId) {
        let tree = self.tree;
        for &child in tree.children(node) {
            self.visit(child);
        }
    }

    /// `LDA #00  STA Tn XX`
    fn var_decl(&mut self, node: NodeId) {
        let tree = self.tree;
        let Some(ident) = tree.child_with_rule(node, Rule::Identifier) else {
            return;
        };
        let Some(token) = tree.child_token(ident) else {
            return;
        };
        let ty = tree
            .child_with_rule(node, Rule::Type)
            .and_then(|t| tree.child_token(t))
            .and_then(|t| crate::type_check::declared_type(t.kind))
            .unwrap_or(Type::Int);
        let scope = self
            .model
            .resolution(ident)
            .unwrap_or_else(|| self.current_scope());
        let level = self.level_of(scope);

        let placeholder = self
            .temps
            .allocate(&token.text, ty, SlotKind::Variable, scope, level)
            .placeholder();
        self.diagnostics.debug(
            Stage::CodeGen,
            format!("allocated {} for {} in scope {}", placeholder, token.text, scope),
            Some(token.span()),
        );

        self.emit_const(Opcode::LoadAccConst, 0x00);
        self.emit_symbolic(Opcode::StoreAcc, &placeholder);
    }

    fn assignment(&mut self, node: NodeId) {
        let tree = self.tree;
        let target = tree
            .child_with_rule(node, Rule::Identifier)
            .and_then(|ident| self.variable(ident));
        let Some(expr) = tree.child_with_rule(node, Rule::Expression) else {
            return;
        };
        let value = self.operand(expr);
        self.load(value);
        if let Some(target) = target {
            self.emit_symbolic(Opcode::StoreAcc, &target);
        }
    }

    /// `LDY value  LDX #mode  SYS`
    fn print(&mut self, node: NodeId) {
        let tree = self.tree;
        let Some(expr) = tree.child_with_rule(node, Rule::Expression) else {
            return;
        };
        let mode = match self.expression_type(expr) {
            Some(Type::String) => 0x02,
            _ => 0x01,
        };
        let depth = self.depth;
        match self.operand(expr) {
            Operand::Const(value) => self.emit_const(Opcode::LoadYConst, value),
            Operand::Memory(slot) => self.emit_symbolic(Opcode::LoadYMem, &slot),
            Operand::Accumulator => {
                let slot = self.scratch_slot(depth, Scratch::Print);
                self.emit_symbolic(Opcode::StoreAcc, &slot);
                self.emit_symbolic(Opcode::LoadYMem, &slot);
            }
        }
        self.emit_const(Opcode::LoadXConst, mode);
        self.emit(Opcode::SystemCall);
    }

    /// Condition into the accumulator, then branch over the body unless it
    /// holds 1. Returns the jump tag and the scratch slot used.
    fn branch_on_condition(&mut self, node: NodeId) -> (String, String) {
        let tree = self.tree;
        if let Some(condition) = tree.child_with_rule(node, Rule::Condition) {
            self.condition(condition);
        }
        let slot = self.scratch_slot(self.depth, Scratch::Condition);
        let jump = self.jumps.allocate();
        self.emit_symbolic(Opcode::StoreAcc, &slot);
        self.emit_const(Opcode::LoadXConst, 0x01);
        self.emit_symbolic(Opcode::CompareX, &slot);
        self.emit_symbolic(Opcode::BranchNotEqual, &jump);
        (jump, slot)
    }

    fn condition(&mut self, node: NodeId) {
        let tree = self.tree;
        let operands = tree.children_with_rule(node, Rule::Expression);
        match (operands.as_slice(), tree.child_with_rule(node, Rule::BoolOp)) {
            ([left, right], Some(op)) => {
                let equal = self.is_equality(op);
                self.comparison(Side::Node(*left), *right, equal);
            }
            ([expr], _) => {
                let value = self.operand(*expr);
                self.load(value);
            }
            _ => self.emit_const(Opcode::LoadAccConst, 0x00),
        }
    }

    fn body(&mut self, node: NodeId) {
        let tree = self.tree;
        if let Some(body) = tree.child_with_rule(node, Rule::Statement) {
            self.visit(body);
        }
    }

    fn patch(&mut self, jump: &str, start: usize) {
        let distance = self.image.cursor().saturating_sub(start);
        match u8::try_from(distance) {
            Ok(length) => {
                let result = self.image.patch_jump(&mut self.jumps, jump, length);
                self.check(result);
            }
            Err(_) => {
                self.diagnostics.error(
                    Stage::CodeGen,
                    format!("branch {} spans {} bytes", jump, distance),
                    None,
                );
            }
        }
    }

    fn if_statement(&mut self, node: NodeId) {
        let (jump, _) = self.branch_on_condition(node);
        let start = self.image.cursor();
        self.body(node);
        self.patch(&jump, start);
    }

    fn while_statement(&mut self, node: NodeId) {
        let loop_start = self.image.cursor();
        let (jump, slot) = self.branch_on_condition(node);
        let start = self.image.cursor();
        self.body(node);

        // Unconditional branch back: compare 1 against a slot holding 0
        self.emit_const(Opcode::LoadAccConst, 0x00);
        self.emit_symbolic(Opcode::StoreAcc, &slot);
        self.emit_const(Opcode::LoadXConst, 0x01);
        self.emit_symbolic(Opcode::CompareX, &slot);
        self.emit(Opcode::BranchNotEqual);
        let after = self.image.cursor() as isize + 1;
        let back = (loop_start as isize - after).rem_euclid(256) as u8;
        let result = self.image.write_hex(back);
        self.check(result);

        self.patch(&jump, start);
    }

    /// Placeholder of the storage for an identifier node
    fn variable(&mut self, ident: NodeId) -> Option<String> {
        let tree = self.tree;
        let token = tree.child_token(ident)?;
        let scope = self.model.resolution(ident)?;
        match self.temps.find(&token.text, scope) {
            Some(entry) => Some(entry.placeholder()),
            None => {
                self.diagnostics.error(
                    Stage::CodeGen,
                    format!("no storage allocated for {} in scope {}", token.text, scope),
                    Some(token.span()),
                );
                None
            }
        }
    }

    fn expression_type(&self, node: NodeId) -> Option<Type> {
        let tree = self.tree;
        match tree.rule(node)? {
            Rule::Expression => self.expression_type(tree.child(node, 0)?),
            Rule::Identifier => {
                let token = tree.child_token(node)?;
                let scope = self.model.resolution(node)?;
                self.model.scopes.symbol(scope, &token.text).map(|s| s.ty)
            }
            Rule::IntExpr => Some(Type::Int),
            Rule::StringExpr => Some(Type::String),
            Rule::BooleanExpr => Some(Type::Boolean),
            _ => None,
        }
    }

    fn is_equality(&self, op: NodeId) -> bool {
        self.tree
            .child_token(op)
            .map_or(true, |t| t.kind == TokenKind::Equality)
    }

    fn load(&mut self, operand: Operand) {
        match operand {
            Operand::Const(value) => self.emit_const(Opcode::LoadAccConst, value),
            Operand::Memory(slot) => self.emit_symbolic(Opcode::LoadAccMem, &slot),
            Operand::Accumulator => {}
        }
    }

    /// Evaluate an expression node. Compound expressions emit code and leave
    /// their value in the accumulator.
    fn operand(&mut self, node: NodeId) -> Operand {
        let tree = self.tree;
        self.visited.insert(node);
        match tree.rule(node) {
            Some(Rule::Expression) => match tree.child(node, 0) {
                Some(inner) => self.operand(inner),
                None => Operand::Const(0),
            },
            Some(Rule::Identifier) => self
                .variable(node)
                .map_or(Operand::Const(0), Operand::Memory),
            Some(Rule::IntExpr) => self.int_expr(node),
            Some(Rule::StringExpr) => self.string_expr(node),
            Some(Rule::BooleanExpr) => self.boolean_expr(node),
            _ => Operand::Const(0),
        }
    }

    fn digit(&self, node: NodeId) -> u8 {
        self.tree
            .child_token(node)
            .and_then(|t| t.text.parse::<u8>().ok())
            .unwrap_or(0)
    }

    /// `Digit ['+' Expression]`, summed right to left into a scratch slot
    fn int_expr(&mut self, node: NodeId) -> Operand {
        let tree = self.tree;
        let mut terms = Vec::new();
        let mut tail = None;
        let mut current = node;
        loop {
            self.visited.insert(current);
            terms.push(Operand::Const(self.digit(current)));
            let Some(rest) = tree.child_with_rule(current, Rule::Expression) else {
                break;
            };
            match tree.child(rest, 0) {
                Some(inner) if tree.rule(inner) == Some(Rule::IntExpr) => current = inner,
                _ => {
                    tail = Some(rest);
                    break;
                }
            }
        }
        if terms.len() == 1 && tail.is_none() {
            return terms.remove(0);
        }

        let depth = self.depth;
        if let Some(rest) = tail {
            self.depth += 1;
            let value = self.operand(rest);
            self.depth = depth;
            let value = match value {
                Operand::Accumulator => {
                    let slot = self.scratch_slot(depth, Scratch::Tail);
                    self.emit_symbolic(Opcode::StoreAcc, &slot);
                    Operand::Memory(slot)
                }
                other => other,
            };
            terms.push(value);
        }

        let sum = self.scratch_slot(depth, Scratch::Sum);
        self.emit_const(Opcode::LoadAccConst, 0x00);
        self.emit_symbolic(Opcode::StoreAcc, &sum);
        for term in terms.into_iter().rev() {
            self.load(term);
            self.emit_symbolic(Opcode::AddWithCarry, &sum);
            self.emit_symbolic(Opcode::StoreAcc, &sum);
        }
        Operand::Accumulator
    }

    fn string_expr(&mut self, node: NodeId) -> Operand {
        let value = self
            .tree
            .child_token(node)
            .map(|t| t.string_value())
            .unwrap_or_default();
        let result = self.image.allocate_string(&value);
        let address = self.check(result).unwrap_or(0);
        Operand::Const(address)
    }

    fn boolean_expr(&mut self, node: NodeId) -> Operand {
        let tree = self.tree;
        let operands = tree.children_with_rule(node, Rule::Expression);
        let op = tree.child_with_rule(node, Rule::BoolOp);
        let literal = tree
            .child_token(node)
            .and_then(|t| match t.kind {
                TokenKind::True => Some(0x01),
                TokenKind::False => Some(0x00),
                _ => None,
            });

        match (operands.as_slice(), op, literal) {
            ([left, right], Some(op), _) => {
                let equal = self.is_equality(op);
                self.comparison(Side::Node(*left), *right, equal)
            }
            ([right], Some(op), Some(value)) => {
                let equal = self.is_equality(op);
                self.comparison(Side::Const(value), *right, equal)
            }
            (_, _, Some(value)) => Operand::Const(value),
            _ => Operand::Const(0),
        }
    }

    /// `X := left; CPX right; LDA #x; BNE +2; LDA #y` leaving 1 in the
    /// accumulator when the comparison holds
    fn comparison(&mut self, left: Side, right: NodeId, equal: bool) -> Operand {
        let depth = self.depth;
        self.depth += 1;

        let left_value = match left {
            Side::Node(node) => self.operand(node),
            Side::Const(value) => Operand::Const(value),
        };
        self.load(left_value);
        let left_slot = self.scratch_slot(depth, Scratch::Left);
        self.emit_symbolic(Opcode::StoreAcc, &left_slot);

        let right_value = self.operand(right);
        self.load(right_value);
        let right_slot = self.scratch_slot(depth, Scratch::Right);
        self.emit_symbolic(Opcode::StoreAcc, &right_slot);

        self.depth = depth;

        let (differ, same) = if equal { (0x00, 0x01) } else { (0x01, 0x00) };
        self.emit_symbolic(Opcode::LoadXMem, &left_slot);
        self.emit_symbolic(Opcode::CompareX, &right_slot);
        self.emit_const(Opcode::LoadAccConst, differ);
        self.emit_const(Opcode::BranchNotEqual, SKIP_LOAD);
        self.emit_const(Opcode::LoadAccConst, same);
        Operand::Accumulator
    }

    /// Place static storage after the code and patch every temp placeholder
    fn resolve_temps(&mut self) {
        let size = self.temps.static_size();
        let result = self.image.reserve_static(size);
        let Some(base) = self.check(result) else {
            return;
        };

        let resolved: Vec<(String, String)> = self
            .temps
            .entries()
            .iter()
            .map(|e| (e.placeholder(), format_address(base + e.offset - 1)))
            .collect();
        for (placeholder, address) in resolved {
            let result = self.image.backpatch(&mut self.temps, &placeholder, &address);
            if let Some(count) = self.check(result) {
                self.diagnostics.info(
                    Stage::CodeGen,
                    format!("backpatched {} to {} ({} occurrences)", placeholder, address, count),
                    None,
                );
            }
        }
    }
}

/// Generate code for a checked program
pub fn generate(
    tree: &SyntaxTree,
    model: &SemanticModel,
    diagnostics: &mut DiagnosticLog,
) -> CodeGenOutput {
    CodeGenerator::new(tree, model, diagnostics).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::semantic::analyze;

    fn compile(source: &str) -> (CodeGenOutput, DiagnosticLog) {
        let mut log = DiagnosticLog::new();
        let tree = parse(tokenize(source, &mut log), &mut log).unwrap();
        let model = analyze(&tree, &mut log);
        assert_eq!(log.error_count(), 0, "{:?}", log.diagnostics());
        let output = generate(&tree, &model, &mut log);
        (output, log)
    }

    fn code(output: &CodeGenOutput, len: usize) -> Vec<&str> {
        (0..len).map(|i| output.image.cell_at(i)).collect()
    }

    #[test]
    fn test_declaration_and_assignment() {
        let (output, log) = compile("{int x x=1}$");
        assert_eq!(log.error_count(), 0);
        assert_eq!(output.temps.len(), 1);
        let x = &output.temps.entries()[0];
        assert_eq!(x.name, "x");
        assert_eq!(x.offset, 1);
        assert_eq!(x.address, "0B 00");
        assert_eq!(
            code(&output, 11),
            vec!["A9", "00", "8D", "0B", "00", "A9", "01", "8D", "0B", "00", "00"]
        );
    }

    #[test]
    fn test_offsets_follow_previous_type() {
        let (output, _) = compile("{string s int i s = \"a\" i = 1}$");
        let offsets: Vec<usize> = output.temps.entries().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![1, 3]);
        assert!(output.temps.is_resolved());
    }

    #[test]
    fn test_string_stored_in_heap() {
        let (output, _) = compile("{string s s = \"hi\"}$");
        assert_eq!(output.image.heap_start(), 0xFD);
        assert_eq!(output.image.cell_at(5), "A9");
        assert_eq!(output.image.cell_at(6), "FD");
        assert_eq!(output.image.cell_at(0xFD), "68");
    }

    #[test]
    fn test_print_uses_y_and_mode() {
        let (output, _) = compile("{print(\"a\")}$");
        assert_eq!(code(&output, 6), vec!["A0", "FE", "A2", "02", "FF", "00"]);
        let (output, _) = compile("{print(5)}$");
        assert_eq!(code(&output, 6), vec!["A0", "05", "A2", "01", "FF", "00"]);
    }

    #[test]
    fn test_if_branch_length_backpatched() {
        let (output, _) = compile("{if (true) {print(1)}}$");
        assert_eq!(output.jumps.len(), 1);
        // LDA #01, STA C, LDX #01, CPX C, BNE J0, then 5 body bytes
        assert_eq!(output.jumps.entries()[0].length, Some(5));
        assert_eq!(output.image.cell_at(11), "05");
        assert!(output.jumps.is_resolved());
    }

    #[test]
    fn test_while_branches_back_to_condition() {
        let (output, _) = compile("{while (false) {}}$");
        // condition 12 bytes, body empty, back branch 12 bytes
        assert_eq!(output.jumps.entries()[0].length, Some(12));
        assert_eq!(output.image.cell_at(22), "D0");
        // branch from 24 back to 0
        assert_eq!(output.image.cell_at(23), "E8");
    }

    #[test]
    fn test_addition_sums_into_scratch() {
        let (output, _) = compile("{int x x = 1 + 2}$");
        let scratch: Vec<_> = output
            .temps
            .entries()
            .iter()
            .filter(|e| e.kind == SlotKind::Scratch)
            .collect();
        assert_eq!(scratch.len(), 1);
        assert!(output.temps.is_resolved());
    }

    #[test]
    fn test_comparison_sequence() {
        let (output, _) = compile("{boolean b b = (1 != 2)}$");
        let cells = code(&output, 30);
        let cpx = cells.iter().position(|c| *c == "EC").unwrap();
        assert_eq!(&cells[cpx + 3..cpx + 9], &["A9", "01", "D0", "02", "A9", "00"]);
    }

    #[test]
    fn test_overflow_is_one_error() {
        let body = "print(1)".repeat(60);
        let mut log = DiagnosticLog::new();
        let source = format!("{{{}}}$", body);
        let tree = parse(tokenize(&source, &mut log), &mut log).unwrap();
        let model = analyze(&tree, &mut log);
        let output = generate(&tree, &model, &mut log);
        assert_eq!(log.count(Stage::CodeGen, core_types::Severity::Error), 1);
        assert!(output.image.overflowed());
    }
}
