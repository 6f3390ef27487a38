/// A small internal text format for SSA functions, used to drive the CLI
/// and the test suite without a real frontend (the parser/SSA builder
/// proper is an external collaborator, out of scope for this crate).
///
/// Grammar (informal):
///
/// ```text
/// func name(a:int, b:int) int {
/// bb0:
///   t1 = a + b
///   if t1 > 0 goto bb1 else bb2
/// bb1:
///   return t1
/// bb2:
///   return a
/// }
/// ```
use std::fmt;

use crate::ir::types::Ty;
use crate::ir::var::Var;
use crate::ssa::{BasicBlock, Function, Instr, Span, Terminator};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedEof { context: String },
    UnexpectedToken { expected: String, found: String, pos: usize },
    UnknownType { text: String },
}

impl std::error::Error for ParseError {}
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof { context } => write!(f, "unexpected end of input in {context}"),
            ParseError::UnexpectedToken { expected, found, pos } => {
                write!(f, "expected {expected}, found '{found}' at byte {pos}")
            }
            ParseError::UnknownType { text } => write!(f, "unknown type '{text}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Func,
    Goto,
    If,
    Else,
    Return,
    Op(String),
    Colon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eq,
    Arrow,
    Phi,
    Eof,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer { chars: src.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> (Token, usize) {
        self.skip_trivia();
        let start = self.pos;
        let c = match self.peek() {
            None => return (Token::Eof, start),
            Some(c) => c,
        };

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut s = String::new();
            while let Some(c) = self.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    s.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let tok = match s.as_str() {
                "func" => Token::Func,
                "goto" => Token::Goto,
                "if" => Token::If,
                "else" => Token::Else,
                "return" => Token::Return,
                "phi" => Token::Phi,
                _ => Token::Ident(s),
            };
            return (tok, start);
        }

        if c.is_ascii_digit() || (c == '-' && self.chars.get(self.pos + 1).is_some_and(|n| n.is_ascii_digit())) {
            let mut s = String::new();
            if c == '-' {
                s.push(c);
                self.bump();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() || c == '.' {
                    s.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            return (Token::Number(s), start);
        }

        let two: String = self.chars[self.pos..(self.pos + 2).min(self.chars.len())].iter().collect();
        for op in ["<=", ">=", "==", "!=", "<<", ">>", "->"] {
            if two == op {
                self.pos += 2;
                return if op == "->" { (Token::Arrow, start) } else { (Token::Op(op.to_string()), start) };
            }
        }

        self.bump();
        let tok = match c {
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '=' => Token::Eq,
            '+' | '-' | '*' | '/' | '%' | '<' | '>' | '&' | '|' | '^' | '!' => Token::Op(c.to_string()),
            other => Token::Op(other.to_string()),
        };
        (tok, start)
    }
}

struct Parser {
    toks: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        let mut lexer = Lexer::new(src);
        let mut toks = Vec::new();
        loop {
            let (tok, pos) = lexer.next_token();
            let done = tok == Token::Eof;
            toks.push((tok, pos));
            if done {
                break;
            }
        }
        Parser { toks, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.toks[self.pos].0
    }

    fn bump(&mut self) -> Token {
        let t = self.toks[self.pos].0.clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        t
    }

    fn expect_ident(&mut self, context: &str) -> Result<String, ParseError> {
        let pos = self.toks[self.pos].1;
        match self.bump() {
            Token::Ident(s) => Ok(s),
            other => Err(ParseError::UnexpectedToken { expected: format!("identifier ({context})"), found: format!("{other:?}"), pos }),
        }
    }

    fn expect(&mut self, want: &Token, context: &str) -> Result<(), ParseError> {
        let pos = self.toks[self.pos].1;
        let got = self.bump();
        if &got == want {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken { expected: format!("{want:?} ({context})"), found: format!("{got:?}"), pos })
        }
    }

    fn parse_ty(&mut self) -> Result<Ty, ParseError> {
        if self.peek() == &Token::LBracket {
            self.bump();
            self.expect(&Token::RBracket, "slice type")?;
            let elem = self.parse_ty()?;
            return Ok(Ty::Slice(Box::new(elem)));
        }
        if self.peek() == &Token::Op("*".into()) {
            self.bump();
            let elem = self.parse_ty()?;
            return Ok(Ty::Pointer(Box::new(elem)));
        }
        let name = self.expect_ident("type")?;
        match name.as_str() {
            "int" => Ok(Ty::Int),
            "uint" => Ok(Ty::Uint),
            "bool" => Ok(Ty::Bool),
            "float64" => Ok(Ty::Float64),
            "complex128" => Ok(Ty::Complex128),
            "string" => Ok(Ty::String),
            other => Err(ParseError::UnknownType { text: other.into() }),
        }
    }

    fn parse_operand(&mut self, types: &std::collections::HashMap<String, Ty>) -> Result<Var, ParseError> {
        let pos = self.toks[self.pos].1;
        match self.bump() {
            Token::Number(n) => {
                let ty = if n.contains('.') { Ty::Float64 } else { Ty::Int };
                Ok(Var::constant(n, ty))
            }
            Token::Ident(name) if name == "true" || name == "false" => Ok(Var::constant(name, Ty::Bool)),
            Token::Ident(name) => {
                let ty = types.get(&name).cloned().unwrap_or(Ty::Int);
                Ok(Var::register(name, ty))
            }
            other => Err(ParseError::UnexpectedToken { expected: "operand".into(), found: format!("{other:?}"), pos }),
        }
    }

    fn parse_op_symbol(&mut self) -> Result<String, ParseError> {
        let pos = self.toks[self.pos].1;
        match self.bump() {
            Token::Op(s) => Ok(s),
            other => Err(ParseError::UnexpectedToken { expected: "operator".into(), found: format!("{other:?}"), pos }),
        }
    }
}

/// Parse one function from the internal text format.
pub fn parse_function(src: &str) -> Result<Function, ParseError> {
    let mut p = Parser::new(src);
    p.expect(&Token::Func, "function header")?;
    let name = p.expect_ident("function name")?;
    p.expect(&Token::LParen, "parameter list")?;

    let mut params = Vec::new();
    let mut types: std::collections::HashMap<String, Ty> = std::collections::HashMap::new();
    while p.peek() != &Token::RParen {
        let pname = p.expect_ident("parameter")?;
        p.expect(&Token::Colon, "parameter type separator")?;
        let ty = p.parse_ty()?;
        types.insert(pname.clone(), ty.clone());
        params.push(Var::register(pname, ty));
        if p.peek() == &Token::Comma {
            p.bump();
        }
    }
    p.bump(); // RParen

    let result_ty = p.parse_ty()?;
    p.expect(&Token::LBrace, "function body")?;

    let mut blocks: Vec<BasicBlock> = Vec::new();
    let mut label_index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    // First pass: discover block labels in order so forward `goto`s resolve.
    let mut scan = p.pos;
    let mut discovered = Vec::new();
    loop {
        match &p.toks[scan].0 {
            Token::Ident(label) if p.toks.get(scan + 1).map(|t| &t.0) == Some(&Token::Colon) => {
                discovered.push(label.clone());
                scan += 2;
            }
            Token::RBrace | Token::Eof => break,
            _ => scan += 1,
        }
    }
    for (i, label) in discovered.iter().enumerate() {
        label_index.insert(label.clone(), i);
    }

    while p.peek() != &Token::RBrace {
        let label = p.expect_ident("block label")?;
        p.expect(&Token::Colon, "block label colon")?;
        let index = *label_index.get(&label).expect("label discovered in first pass");

        let mut instrs = Vec::new();
        let term = loop {
            match p.peek().clone() {
                Token::If => {
                    p.bump();
                    let cond = p.parse_operand(&types)?;
                    p.expect(&Token::Goto, "if-true target")?;
                    let then_label = p.expect_ident("then label")?;
                    p.expect(&Token::Else, "if-false branch")?;
                    let else_label = p.expect_ident("else label")?;
                    break Terminator::If {
                        cond,
                        then_block: label_index[&then_label],
                        else_block: label_index[&else_label],
                    };
                }
                Token::Goto => {
                    p.bump();
                    let target = p.expect_ident("jump target")?;
                    break Terminator::Jump { target: label_index[&target] };
                }
                Token::Return => {
                    p.bump();
                    let mut results = Vec::new();
                    if !matches!(p.peek(), Token::RBrace) && !matches!(p.peek(), Token::Ident(ref s) if label_index.contains_key(s)) {
                        results.push(p.parse_operand(&types)?);
                    }
                    break Terminator::Return { results };
                }
                Token::Ident(result_name) => {
                    p.bump();
                    p.expect(&Token::Eq, "assignment")?;
                    let instr = parse_rhs(&mut p, result_name, &types, &label_index)?;
                    if let Instr::BinOp { ref result, .. }
                    | Instr::UnOp { ref result, .. }
                    | Instr::Convert { ref result, .. }
                    | Instr::Call { ref result, .. }
                    | Instr::IndexAddr { ref result, .. }
                    | Instr::FieldAddr { ref result, .. }
                    | Instr::Phi { ref result, .. } = &instr
                    {
                        types.insert(result.name.clone(), result.ty.clone());
                    }
                    instrs.push(instr);
                }
                Token::Eof => return Err(ParseError::UnexpectedEof { context: "basic block".into() }),
                other => {
                    return Err(ParseError::UnexpectedToken { expected: "instruction or terminator".into(), found: format!("{other:?}"), pos: 0 })
                }
            }
        };

        blocks.push(BasicBlock { index, instrs, term, preds: Vec::new() });
    }
    blocks.sort_by_key(|b| b.index);

    link_predecessors(&mut blocks);

    Ok(Function { name, package: "main".into(), params, result_ty, blocks })
}

fn parse_rhs(
    p: &mut Parser,
    result_name: String,
    types: &std::collections::HashMap<String, Ty>,
    _label_index: &std::collections::HashMap<String, usize>,
) -> Result<Instr, ParseError> {
    match p.peek().clone() {
        Token::Op(op) if op == "*" || op == "!" || op == "-" => {
            p.bump();
            let arg = p.parse_operand(types)?;
            let result = Var::register(result_name, arg.ty.clone());
            Ok(Instr::UnOp { result, op, arg })
        }
        Token::Ident(name) if name == "convert" => {
            p.bump();
            let arg = p.parse_operand(types)?;
            let result = Var::register(result_name, arg.ty.clone());
            Ok(Instr::Convert { result, arg })
        }
        Token::Ident(name) if name == "index_addr" => {
            p.bump();
            let array = p.parse_operand(types)?;
            p.expect(&Token::LBracket, "index")?;
            let index = p.parse_operand(types)?;
            p.expect(&Token::RBracket, "index close")?;
            let elem = array.ty.as_slice_elem().cloned().unwrap_or(Ty::Int);
            let result = Var::register(result_name, Ty::Pointer(Box::new(elem)));
            Ok(Instr::IndexAddr { result, array, index })
        }
        Token::Ident(name) if name == "field_addr" => {
            p.bump();
            let base = p.parse_operand(types)?;
            p.expect(&Token::Colon, "field separator")?;
            let field_name = p.expect_ident("field name")?;
            let field_index = base
                .ty
                .as_struct_fields()
                .and_then(|fields| fields.iter().position(|(n, _)| n == &field_name))
                .unwrap_or(0);
            let field_ty = base
                .ty
                .as_struct_fields()
                .and_then(|fields| fields.get(field_index))
                .map(|(_, t)| t.clone())
                .unwrap_or(Ty::Int);
            let result = Var::register(result_name, Ty::Pointer(Box::new(field_ty)));
            Ok(Instr::FieldAddr { result, base, field_index, field_name })
        }
        Token::Phi => {
            p.bump();
            p.expect(&Token::LParen, "phi edges")?;
            let mut edges = Vec::new();
            while p.peek() != &Token::RParen {
                edges.push(p.parse_operand(types)?);
                if p.peek() == &Token::Comma {
                    p.bump();
                }
            }
            p.bump(); // RParen
            let ty = edges.first().map(|v| v.ty.clone()).unwrap_or(Ty::Int);
            let result = Var::register(result_name, ty);
            Ok(Instr::Phi { result, edges })
        }
        Token::Ident(name) if p.toks.get(p.pos + 1).map(|t| &t.0) == Some(&Token::LParen) => {
            p.bump();
            p.bump(); // LParen
            let mut args = Vec::new();
            while p.peek() != &Token::RParen {
                args.push(p.parse_operand(types)?);
                if p.peek() == &Token::Comma {
                    p.bump();
                }
            }
            p.bump(); // RParen
            let same_package = !name.contains("::");
            let result = Var::register(result_name, Ty::Int);
            Ok(Instr::Call { result, callee: name, args, same_package })
        }
        _ => {
            let left = p.parse_operand(types)?;
            let op = p.parse_op_symbol()?;
            let right = p.parse_operand(types)?;
            let result_ty = if ["<", "<=", ">", ">=", "==", "!="].contains(&op.as_str()) { Ty::Bool } else { left.ty.clone() };
            let result = Var::register(result_name, result_ty);
            Ok(Instr::BinOp { result, op, left, right })
        }
    }
}

fn link_predecessors(blocks: &mut [BasicBlock]) {
    let edges: Vec<(usize, usize)> = blocks
        .iter()
        .flat_map(|b| match &b.term {
            Terminator::If { then_block, else_block, .. } => vec![(b.index, *then_block), (b.index, *else_block)],
            Terminator::Jump { target } => vec![(b.index, *target)],
            Terminator::Return { .. } => vec![],
        })
        .collect();
    for (from, to) in edges {
        if let Some(block) = blocks.iter_mut().find(|b| b.index == to) {
            block.preds.push(from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_scenario_one() {
        let src = r#"
        func f(a:int, b:int) int {
        bb0:
          t1 = a > b
          if t1 goto bb1 else bb2
        bb1:
          t2 = a + b
          return t2
        bb2:
          t3 = a * b
          return t3
        }
        "#;
        let f = parse_function(src).unwrap();
        assert_eq!(f.name, "f");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.blocks.len(), 3);
        assert!(matches!(f.blocks[0].term, Terminator::If { .. }));
    }

    #[test]
    fn parses_slice_and_index_addr() {
        let src = r#"
        func g(arr:[]int, i:int) int {
        bb0:
          p = index_addr arr[i]
          v = *p
          return v
        }
        "#;
        let f = parse_function(src).unwrap();
        assert_eq!(f.blocks[0].instrs.len(), 2);
        assert!(matches!(f.blocks[0].instrs[0], Instr::IndexAddr { .. }));
        assert!(matches!(f.blocks[0].instrs[1], Instr::UnOp { .. }));
    }
}
