//! 范围表达式的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_union()                    ',' '-'  (左结合, 最低优先级)
//!        └─ parse_intersect()           '&'      (左结合)
//!             └─ parse_prefix()
//!                  ├─ '%' operand [':' key]  → ClusterRef / Attribute
//!                  ├─ '@' operand            → LocalRef
//!                  ├─ '*' operand            → ClustersContaining
//!                  ├─ '?' operand            → LocalKeysContaining
//!                  └─ parse_primary()
//!                       ├─ atom [':' key]    → Attribute (`web:ENVIRONMENT`)
//!                       └─ parse_atom()
//!                            ├─ word '(' args ')' → 函数调用, 参数以 ';' 分隔
//!                            ├─ word              → parse_pattern() (花括号/数值展开)
//!                            ├─ "..." / q(...)    → 原样字面量
//!                            ├─ /regex/           → 正则字面量
//!                            └─ '(' union ')'     → 分组表达式
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **前缀运算符** `%` `@` `*` `?`
//! 3. **交集** `a & b`
//! 4. **并集与差集** `a , b`, `a - b`
//!
//! ## 单词内部的展开语法
//!
//! ```text
//! web{1-3}        → web1,web2,web3
//! web{01-03}      → web01,web02,web03
//! {a,b}.dc        → a.dc,b.dc
//! a{b{1-2},c}     → ab1,ab2,ac
//! n1..3.dc        → n1.dc,n2.dc,n3.dc
//! n10..2          → n10,n11,n12
//! ```

use crate::ast::{Expr, Fragment, Pattern, RangeSpec, RegexLiteral, SetOp};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use regex::Regex;

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn at_position(message: String, span: Span) -> Self {
        Self { message, span }
    }
}

/// 对表达式进行分词并解析为 AST
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(&tokens).parse()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        let tokens = self.tokens;
        tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    /// 输入结束处的位置, 用于 "缺少操作数" 之类的错误
    fn end_span(&self) -> Span {
        self.tokens.last().map(|t| Span::at(t.span.end)).unwrap_or_default()
    }

    /// 期望特定类型的 token 并推进，否则返回错误
    fn expect(&mut self, expected: TokenKind, what: &str) -> Result<&'a Token<'a>, ParseError> {
        match self.peek() {
            Some(token)
                if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) =>
            {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected {}, found {}", what, token.kind),
                token.span,
            )),
            None => Err(ParseError::at_position(
                format!("Expected {}, but reached end of input", what),
                self.end_span(),
            )),
        }
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        } else {
            false
        }
    }

    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Ok(Expr::Empty);
        }

        let expr = self.parse_union()?;

        if let Some(token) = self.peek() {
            let message = match token.kind {
                TokenKind::RParen => "Unbalanced ')'".to_string(),
                _ => format!("Expected operator, found {}", token.kind),
            };
            return Err(ParseError::at_position(message, token.span));
        }

        Ok(expr)
    }

    /// 解析并集/差集 (最低优先级)
    ///
    /// 语法: `intersect ((',' | '-') intersect)*`
    fn parse_union(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_intersect()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Comma) => SetOp::Union,
                Some(TokenKind::Dash) => SetOp::Subtract,
                _ => break,
            };
            self.advance(); // 消费运算符
            let right = self.parse_intersect()?;
            left = Expr::SetOp { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    /// 解析交集
    ///
    /// 语法: `prefix ('&' prefix)*`
    fn parse_intersect(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while self.match_token(&TokenKind::Amp) {
            self.advance(); // 消费 &
            let right = self.parse_prefix()?;
            left = Expr::SetOp {
                op: SetOp::Intersect,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// 解析前缀运算符 (最高优先级, 括号除外)
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek() else {
            return self.parse_primary();
        };

        match token.kind {
            TokenKind::Percent => {
                self.advance(); // 消费 %
                let operand = self.parse_operand()?;
                if self.match_token(&TokenKind::Colon) {
                    self.advance(); // 消费 :
                    let key = self.parse_key()?;
                    Ok(Expr::Attribute { cluster: Box::new(operand), key })
                } else {
                    Ok(Expr::ClusterRef(Box::new(operand)))
                }
            }
            TokenKind::At => {
                self.advance();
                Ok(Expr::LocalRef(Box::new(self.parse_operand()?)))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::ClustersContaining(Box::new(self.parse_operand()?)))
            }
            TokenKind::Question => {
                self.advance();
                Ok(Expr::LocalKeysContaining(Box::new(self.parse_operand()?)))
            }
            _ => self.parse_primary(),
        }
    }

    /// 前缀运算符的操作数: 另一个前缀表达式, 或者不带 `:key` 的基础表达式
    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Percent | TokenKind::At | TokenKind::Star | TokenKind::Question) => {
                self.parse_prefix()
            }
            _ => self.parse_atom(),
        }
    }

    /// 语法: `atom (':' key)?`
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let atom = self.parse_atom()?;
        if self.match_token(&TokenKind::Colon) {
            self.advance(); // 消费 :
            let key = self.parse_key()?;
            return Ok(Expr::Attribute { cluster: Box::new(atom), key });
        }
        Ok(atom)
    }

    fn parse_key(&mut self) -> Result<Pattern, ParseError> {
        let token = self.expect(TokenKind::Word(""), "key after ':'")?;
        match token.kind {
            TokenKind::Word(w) => parse_pattern(w, token.span.start),
            _ => unreachable!("expect() checked the token kind"),
        }
    }

    /// 解析基础表达式
    ///
    /// 支持的表达式类型:
    /// - `name(arg; ...)` - 函数调用
    /// - `word` - 单词 (可含花括号展开)
    /// - `"text"`, `q(text)` - 原样字面量
    /// - `/regex/` - 正则字面量
    /// - `(expression)` - 分组表达式
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::at_position(
                "Expected expression, but reached end of input".to_string(),
                self.end_span(),
            ));
        };

        match &token.kind {
            TokenKind::Word(w) => {
                if self.match_token(&TokenKind::LParen) {
                    self.advance(); // 消费 (
                    self.parse_function_call(w, token.span)
                } else {
                    Ok(Expr::Literal(parse_pattern(w, token.span.start)?))
                }
            }
            TokenKind::Quoted(q) => Ok(Expr::Quoted(q.to_string())),
            TokenKind::Regex(source) => {
                let regex = Regex::new(source).map_err(|e| {
                    ParseError::at_position(format!("Invalid regex /{}/: {}", source, e), token.span)
                })?;
                Ok(Expr::Regex(RegexLiteral { source: source.to_string(), regex }))
            }
            TokenKind::LParen => {
                let expr = self.parse_union()?;
                if !self.match_token(&TokenKind::RParen) {
                    return Err(ParseError::at_position("Unbalanced '('".to_string(), token.span));
                }
                self.advance(); // 消费 )
                Ok(Expr::Grouped(Box::new(expr)))
            }
            TokenKind::UnterminatedString
            | TokenKind::UnterminatedRegex
            | TokenKind::UnclosedBrace
            | TokenKind::Illegal => Err(ParseError::at_position(
                format!("Unexpected {}", token.kind),
                token.span,
            )),
            other => Err(ParseError::at_position(
                format!("Expected expression, found {}", other),
                token.span,
            )),
        }
    }

    /// 解析函数参数列表, 开始的 '(' 已经被消费
    fn parse_function_call(&mut self, name: &str, name_span: Span) -> Result<Expr, ParseError> {
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ParseError::at_position(
                format!("Invalid function name '{}'", name),
                name_span,
            ));
        }

        let mut args = Vec::new();
        if !self.match_token(&TokenKind::RParen) {
            loop {
                args.push(self.parse_union()?);
                if self.match_token(&TokenKind::Semicolon) {
                    self.advance(); // 消费 ;
                    continue;
                }
                break;
            }
        }
        let close = self.expect(TokenKind::RParen, "')' to close the argument list")?;

        Ok(Expr::Function {
            name: name.to_string(),
            args,
            span: Span::new(name_span.start, close.span.end),
        })
    }
}

/// 将单词解析为由文本、范围和备选组构成的模式
///
/// `offset` 是单词在原始表达式中的字节偏移, 用于错误位置。
pub fn parse_pattern(word: &str, offset: usize) -> Result<Pattern, ParseError> {
    WordParser { word, pos: 0, offset }.parse_sequence(false)
}

struct WordParser<'w> {
    word: &'w str,
    pos: usize,
    offset: usize,
}

impl<'w> WordParser<'w> {
    fn peek(&self) -> Option<char> {
        self.word[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.offset + start, self.offset + end)
    }

    fn error(&self, message: String) -> ParseError {
        ParseError::at_position(message, self.span(self.pos, self.pos + 1))
    }

    /// 解析片段序列, 直到输入结束或 (在花括号内) 遇到 ',' / '}'
    fn parse_sequence(&mut self, in_group: bool) -> Result<Pattern, ParseError> {
        let mut fragments = Vec::new();
        let mut text_start = self.pos;

        while let Some(c) = self.peek() {
            match c {
                '{' => {
                    push_text(&mut fragments, &self.word[text_start..self.pos], self.offset + text_start);
                    fragments.push(self.parse_group()?);
                    text_start = self.pos;
                }
                ',' | '}' if in_group => break,
                '}' => return Err(self.error("Unbalanced '}'".to_string())),
                '-' if in_group => {
                    return Err(self.error("Unexpected '-' in brace alternation".to_string()));
                }
                _ => {
                    self.bump();
                }
            }
        }
        push_text(&mut fragments, &self.word[text_start..self.pos], self.offset + text_start);

        Ok(Pattern { fragments })
    }

    /// 解析 `{...}`: 单个范围 `{1-3}` 或备选组 `{a,b{1-2},1-3}`
    fn parse_group(&mut self) -> Result<Fragment, ParseError> {
        let open = self.pos;
        self.bump(); // 消费 {

        let mut alternatives = Vec::new();
        loop {
            let segment_start = self.pos;
            let segment_end = self.segment_end();
            let segment = &self.word[segment_start..segment_end];

            if segment.is_empty() {
                return Err(self.error("Empty brace alternative".to_string()));
            }

            let alternative = if !segment.contains('{') && segment.contains('-') {
                let Some((start, end)) = segment.split_once('-').filter(|(_, end)| !end.contains('-')) else {
                    return Err(ParseError::at_position(
                        format!("Range '{}' must have the form start-end", segment),
                        self.span(segment_start, segment_end),
                    ));
                };
                self.pos = segment_end;
                Pattern {
                    fragments: vec![Fragment::Range(RangeSpec {
                        start: start.to_string(),
                        end: end.to_string(),
                        width: start.len(),
                        span: self.span(open, segment_end + 1),
                    })],
                }
            } else {
                self.parse_sequence(true)?
            };
            alternatives.push(alternative);

            match self.bump() {
                Some(',') => continue,
                Some('}') => break,
                _ => {
                    return Err(ParseError::at_position(
                        "Unclosed '{'".to_string(),
                        self.span(open, self.word.len()),
                    ))
                }
            }
        }

        let single_range = alternatives.len() == 1
            && matches!(alternatives[0].fragments.as_slice(), [Fragment::Range(_)]);
        if single_range {
            let mut only = alternatives.remove(0);
            return Ok(only.fragments.remove(0));
        }
        Ok(Fragment::Alternation(alternatives))
    }

    /// 当前备选项的结束位置: 同一层级上的下一个 ',' 或 '}'
    fn segment_end(&self) -> usize {
        let mut depth = 0usize;
        for (i, c) in self.word[self.pos..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return self.pos + i,
                '}' => depth -= 1,
                ',' if depth == 0 => return self.pos + i,
                _ => {}
            }
        }
        self.word.len()
    }
}

/// 追加文本片段, 并将其中的 `N..M` 数值范围拆分出来
fn push_text(fragments: &mut Vec<Fragment>, text: &str, offset: usize) {
    let mut rest = text;
    let mut base = offset;

    while let Some((before, range, consumed)) = find_dot_range(rest, base) {
        if !before.is_empty() {
            fragments.push(Fragment::Text(before.to_string()));
        }
        fragments.push(Fragment::Range(range));
        base += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        fragments.push(Fragment::Text(rest.to_string()));
    }
}

/// 在文本中查找第一个 `digits..[prefix]digits` 范围
///
/// 返回 (范围之前的文本, 范围, 消费的字节数)。右侧的前缀必须与左侧
/// 数字前的文本结尾一致 (`n1..n3`); 不一致时保留在结束边界中, 由求值器
/// 报告为无效范围。右侧数字较短时借用左侧的高位 (`n10..2` 即 `n10..12`)。
fn find_dot_range(text: &str, offset: usize) -> Option<(&str, RangeSpec, usize)> {
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find("..") {
        let dots = search_from + found;
        search_from = dots + 2;

        let before = &text[..dots];
        let left_digits = before.len() - before.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if left_digits == 0 {
            continue;
        }
        let prefix = &before[..before.len() - left_digits];
        let left = &before[before.len() - left_digits..];

        let after = &text[dots + 2..];
        let right_prefix_len = after.len() - after.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '_').len();
        let right_prefix = &after[..right_prefix_len];
        let right_rest = &after[right_prefix_len..];
        let right_digits = right_rest.len() - right_rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if right_digits == 0 {
            continue;
        }
        let right = &right_rest[..right_digits];

        let end = if !right_prefix.is_empty() && !prefix.ends_with(right_prefix) {
            format!("{}{}", right_prefix, right)
        } else if right.len() < left.len() {
            format!("{}{}", &left[..left.len() - right.len()], right)
        } else {
            right.to_string()
        };

        let consumed = dots + 2 + right_prefix_len + right_digits;
        let range = RangeSpec {
            start: left.to_string(),
            end,
            width: left.len(),
            span: Span::new(offset + prefix.len(), offset + consumed),
        };
        return Some((prefix, range, consumed));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_string(input: &str) -> Result<Expr, ParseError> {
        let tokens: Vec<_> = Lexer::new(input).collect();
        Parser::new(&tokens).parse()
    }

    fn literal(s: &str) -> Expr {
        Expr::Literal(Pattern::text(s))
    }

    fn range(start: &str, end: &str) -> Fragment {
        match parse_pattern(&format!("{{{}-{}}}", start, end), 0).unwrap().fragments.remove(0) {
            f @ Fragment::Range(_) => f,
            other => panic!("Expected range fragment, got {:?}", other),
        }
    }

    fn strip_spans(fragment: &Fragment) -> (String, String, usize) {
        if let Fragment::Range(r) = fragment {
            (r.start.clone(), r.end.clone(), r.width)
        } else {
            panic!("Expected range fragment, got {:?}", fragment);
        }
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(parse_string("").unwrap(), Expr::Empty);
        assert_eq!(parse_string("   ").unwrap(), Expr::Empty);
    }

    #[test]
    fn test_cluster_reference() {
        let result = parse_string("%web").unwrap();
        assert_eq!(result, Expr::ClusterRef(Box::new(literal("web"))));
    }

    #[test]
    fn test_cluster_attribute() {
        let result = parse_string("%web:ENVIRONMENT").unwrap();
        assert_eq!(
            result,
            Expr::Attribute {
                cluster: Box::new(literal("web")),
                key: Pattern::text("ENVIRONMENT"),
            }
        );
    }

    #[test]
    fn test_bare_attribute_lookup() {
        let result = parse_string("web:ENVIRONMENT").unwrap();
        if let Expr::Attribute { cluster, key } = result {
            assert_eq!(*cluster, literal("web"));
            assert_eq!(key, Pattern::text("ENVIRONMENT"));
        } else {
            panic!("Expected attribute lookup");
        }
    }

    #[test]
    fn test_subtraction_of_literal() {
        let result = parse_string("%web-web1").unwrap();
        if let Expr::SetOp { op, left, right } = result {
            assert_eq!(op, SetOp::Subtract);
            assert_eq!(*left, Expr::ClusterRef(Box::new(literal("web"))));
            assert_eq!(*right, literal("web1"));
        } else {
            panic!("Expected subtraction");
        }
    }

    #[test]
    fn test_union_and_subtraction_are_left_associative() {
        // a,b-c == (a,b)-c
        let result = parse_string("a,b-c").unwrap();
        if let Expr::SetOp { op: SetOp::Subtract, left, right } = result {
            assert_eq!(*right, literal("c"));
            assert!(matches!(*left, Expr::SetOp { op: SetOp::Union, .. }));
        } else {
            panic!("Expected subtraction at the root");
        }
    }

    #[test]
    fn test_intersection_binds_tighter() {
        // a,b&c == a,(b&c)
        let result = parse_string("a , b & c").unwrap();
        if let Expr::SetOp { op: SetOp::Union, left, right } = result {
            assert_eq!(*left, literal("a"));
            assert!(matches!(*right, Expr::SetOp { op: SetOp::Intersect, .. }));
        } else {
            panic!("Expected union at the root");
        }
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let result = parse_string("(a,b)&c").unwrap();
        if let Expr::SetOp { op: SetOp::Intersect, left, .. } = result {
            assert!(matches!(*left, Expr::Grouped(_)));
        } else {
            panic!("Expected intersection at the root");
        }
    }

    #[test]
    fn test_prefix_binds_tightest() {
        let result = parse_string("%a&%b").unwrap();
        if let Expr::SetOp { op: SetOp::Intersect, left, right } = result {
            assert!(matches!(*left, Expr::ClusterRef(_)));
            assert!(matches!(*right, Expr::ClusterRef(_)));
        } else {
            panic!("Expected intersection of two cluster references");
        }
    }

    #[test]
    fn test_nested_prefix_operators() {
        let result = parse_string("%%a").unwrap();
        assert_eq!(
            result,
            Expr::ClusterRef(Box::new(Expr::ClusterRef(Box::new(literal("a")))))
        );
        assert!(matches!(parse_string("@hosts").unwrap(), Expr::LocalRef(_)));
        assert!(matches!(parse_string("*web1").unwrap(), Expr::ClustersContaining(_)));
        assert!(matches!(parse_string("?web1").unwrap(), Expr::LocalKeysContaining(_)));
    }

    #[test]
    fn test_function_call() {
        let result = parse_string("has(ENV;prod,staging)").unwrap();
        if let Expr::Function { name, args, span } = result {
            assert_eq!(name, "has");
            assert_eq!(args.len(), 2);
            assert_eq!(args[0], literal("ENV"));
            assert!(matches!(args[1], Expr::SetOp { op: SetOp::Union, .. }));
            assert_eq!(span, Span::new(0, 21));
        } else {
            panic!("Expected function call");
        }
    }

    #[test]
    fn test_function_call_without_arguments() {
        let result = parse_string("allclusters()").unwrap();
        if let Expr::Function { name, args, .. } = result {
            assert_eq!(name, "allclusters");
            assert!(args.is_empty());
        } else {
            panic!("Expected function call");
        }
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(parse_string(r#""web-01""#).unwrap(), Expr::Quoted("web-01".to_string()));
        assert_eq!(parse_string("q(a-b)").unwrap(), Expr::Quoted("a-b".to_string()));
    }

    #[test]
    fn test_regex_literal() {
        let result = parse_string("%web & /^web1/").unwrap();
        if let Expr::SetOp { right, .. } = result {
            if let Expr::Regex(re) = *right {
                assert_eq!(re.source, "^web1");
                assert!(re.regex.is_match("web12"));
            } else {
                panic!("Expected regex literal");
            }
        } else {
            panic!("Expected set operation");
        }
    }

    #[test]
    fn test_brace_range_pattern() {
        let result = parse_string("web{01-03}.dc").unwrap();
        if let Expr::Literal(pattern) = result {
            assert_eq!(pattern.fragments.len(), 3);
            assert_eq!(pattern.fragments[0], Fragment::Text("web".to_string()));
            assert_eq!(strip_spans(&pattern.fragments[1]), ("01".to_string(), "03".to_string(), 2));
            assert_eq!(pattern.fragments[2], Fragment::Text(".dc".to_string()));
        } else {
            panic!("Expected literal");
        }
    }

    #[test]
    fn test_range_span_covers_braces() {
        let pattern = parse_pattern("web{1-3}", 10).unwrap();
        if let Fragment::Range(r) = &pattern.fragments[1] {
            assert_eq!(r.span, Span::new(13, 18));
        } else {
            panic!("Expected range fragment");
        }
    }

    #[test]
    fn test_alternation_with_nested_groups() {
        let pattern = parse_pattern("a{b{1-2},c,1-3}", 0).unwrap();
        assert_eq!(pattern.fragments.len(), 2);
        if let Fragment::Alternation(alts) = &pattern.fragments[1] {
            assert_eq!(alts.len(), 3);
            assert_eq!(alts[0].fragments[0], Fragment::Text("b".to_string()));
            assert_eq!(strip_spans(&alts[0].fragments[1]), ("1".to_string(), "2".to_string(), 1));
            assert_eq!(alts[1], Pattern::text("c"));
            assert_eq!(strip_spans(&alts[2].fragments[0]), strip_spans(&range("1", "3")));
        } else {
            panic!("Expected alternation");
        }
    }

    #[test]
    fn test_dot_dot_range() {
        let pattern = parse_pattern("n01..03.dc", 0).unwrap();
        assert_eq!(pattern.fragments[0], Fragment::Text("n".to_string()));
        assert_eq!(strip_spans(&pattern.fragments[1]), ("01".to_string(), "03".to_string(), 2));
        assert_eq!(pattern.fragments[2], Fragment::Text(".dc".to_string()));
    }

    #[test]
    fn test_dot_dot_range_with_repeated_prefix() {
        let pattern = parse_pattern("n1..n3", 0).unwrap();
        assert_eq!(strip_spans(&pattern.fragments[1]), ("1".to_string(), "3".to_string(), 1));
    }

    #[test]
    fn test_dot_dot_range_short_right_bound() {
        let pattern = parse_pattern("n10..2", 0).unwrap();
        assert_eq!(strip_spans(&pattern.fragments[1]), ("10".to_string(), "12".to_string(), 2));
    }

    #[test]
    fn test_dot_dot_range_mismatched_prefix_is_kept_for_evaluation() {
        let pattern = parse_pattern("n1..m3", 0).unwrap();
        assert_eq!(strip_spans(&pattern.fragments[1]), ("1".to_string(), "m3".to_string(), 1));
    }

    #[test]
    fn test_dots_without_digits_stay_literal() {
        assert_eq!(parse_pattern("a..b", 0).unwrap(), Pattern::text("a..b"));
    }

    #[test]
    fn test_syntax_errors() {
        // 括号不平衡
        let err = parse_string("(a,b").unwrap_err();
        assert_eq!(err.span, Span::new(0, 1));
        let err = parse_string("a,b)").unwrap_err();
        assert_eq!(err.span, Span::new(3, 4));

        // 缺少操作数
        let err = parse_string("a,").unwrap_err();
        assert_eq!(err.span, Span::at(2));
        assert!(parse_string("& a").is_err());
        assert!(parse_string("%").is_err());
        assert!(parse_string("web:").is_err());

        // 未结束的字面量
        assert!(parse_string("/abc").is_err());
        assert!(parse_string("\"abc").is_err());
        assert!(parse_string("web{1-3").is_err());

        // 无法识别的字符
        let err = parse_string("a # b").unwrap_err();
        assert_eq!(err.span, Span::new(2, 3));

        // 缺少运算符
        assert!(parse_string("a b").is_err());
    }

    #[test]
    fn test_malformed_brace_groups() {
        assert!(parse_string("a{}").is_err());
        assert!(parse_string("a{1-2-3}").is_err());
        assert!(parse_string("a{b,}").is_err());
        assert!(parse_string("a{b{1-2}-c}").is_err());
    }

    #[test]
    fn test_invalid_regex_is_a_syntax_error() {
        let err = parse_string("%a & /[/").unwrap_err();
        assert_eq!(err.span, Span::new(5, 8));
    }
}
