//! 范围表达式的词法分析器
//!
//! 花括号组 (`{1-3}`, `{a,b}`) 和 `..` 数值范围属于单词的词法结构,
//! 因此花括号内部的 `-` 与 `,` 不会被识别为集合运算符。

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token { kind, span: Span::new(start, self.position) }
    }

    /// 读取到结束分隔符为止的原始内容
    /// 注意：开始的分隔符已经被调用者消费
    fn read_delimited(
        &mut self,
        start: usize,
        close: char,
        make: fn(&'a str) -> TokenKind<'a>,
        unterminated: TokenKind<'a>,
    ) -> Token<'a> {
        let content_start = self.position;
        while let Some(c) = self.peek() {
            if c == close {
                let content = &self.input[content_start..self.position];
                self.bump(); // 消费结束分隔符
                return self.token(make(content), start);
            }
            self.bump();
        }
        self.token(unterminated, start)
    }

    /// 读取单词（包括其中的花括号组）
    /// 单词可以包含字母、数字、下划线和点
    fn read_word(&mut self, start: usize) -> Token<'a> {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if is_word_char(c) {
                self.bump();
            } else if c == '{' {
                depth += 1;
                self.bump();
            } else if c == '}' && depth > 0 {
                depth -= 1;
                self.bump();
            } else if depth > 0 && (c == '-' || c == ',') {
                self.bump();
            } else {
                break;
            }
        }
        if depth > 0 {
            return self.token(TokenKind::UnclosedBrace, start);
        }

        let literal = &self.input[start..self.position];

        // `q(...)` 是原样引用的字面量
        if literal == "q" && self.peek() == Some('(') {
            self.bump(); // 消费 '('
            return self.read_delimited(
                start,
                ')',
                TokenKind::Quoted,
                TokenKind::UnterminatedString,
            );
        }

        self.token(TokenKind::Word(literal), start)
    }
}

/// 单词字符（花括号之外）
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?; // 到达输入末尾时返回 None

        let token = match c {
            '%' => self.token(TokenKind::Percent, start),
            '@' => self.token(TokenKind::At, start),
            '*' => self.token(TokenKind::Star, start),
            '?' => self.token(TokenKind::Question, start),
            ',' => self.token(TokenKind::Comma, start),
            '-' => self.token(TokenKind::Dash, start),
            '&' => self.token(TokenKind::Amp, start),
            '(' => self.token(TokenKind::LParen, start),
            ')' => self.token(TokenKind::RParen, start),
            ':' => self.token(TokenKind::Colon, start),
            ';' => self.token(TokenKind::Semicolon, start),
            '"' => self.read_delimited(start, '"', TokenKind::Quoted, TokenKind::UnterminatedString),
            '/' => self.read_delimited(start, '/', TokenKind::Regex, TokenKind::UnterminatedRegex),
            '{' => {
                // 以花括号开头的单词, 例如 `{a,b}.example.com`
                self.position = start;
                self.read_word(start)
            }
            c if is_word_char(c) => self.read_word(start),
            _ => self.token(TokenKind::Illegal, start),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_cluster_reference() {
        let input = "%web";
        let mut lexer = Lexer::new(input);

        assert_eq!(lexer.next().unwrap().kind, TokenKind::Percent);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("web"));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_all_operators_and_punctuation() {
        let input = "% @ * ? , - & ( ) : ;";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Percent, TokenKind::At, TokenKind::Star, TokenKind::Question,
                TokenKind::Comma, TokenKind::Dash, TokenKind::Amp, TokenKind::LParen,
                TokenKind::RParen, TokenKind::Colon, TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_dash_outside_braces_is_an_operator() {
        assert_eq!(
            kinds("%web-web1"),
            vec![
                TokenKind::Percent,
                TokenKind::Word("web"),
                TokenKind::Dash,
                TokenKind::Word("web1"),
            ]
        );
    }

    #[test]
    fn test_braces_are_part_of_the_word() {
        assert_eq!(
            kinds("web{01-03}.dc,{a,b}x"),
            vec![
                TokenKind::Word("web{01-03}.dc"),
                TokenKind::Comma,
                TokenKind::Word("{a,b}x"),
            ]
        );
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(kinds("a{b{1-2},c}"), vec![TokenKind::Word("a{b{1-2},c}")]);
    }

    #[test]
    fn test_unclosed_brace() {
        let tokens: Vec<_> = Lexer::new("web{1-3").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::UnclosedBrace);
        assert_eq!(tokens[0].span, Span::new(0, 7));
    }

    #[test]
    fn test_numeric_dot_range_is_one_word() {
        assert_eq!(kinds("n01..03.dc"), vec![TokenKind::Word("n01..03.dc")]);
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(
            kinds(r#""web-01" q(a-b:c)"#),
            vec![TokenKind::Quoted("web-01"), TokenKind::Quoted("a-b:c")]
        );
    }

    #[test]
    fn test_q_is_only_a_quote_when_followed_by_paren() {
        assert_eq!(
            kinds("q , qq(x)"),
            vec![
                TokenKind::Word("q"),
                TokenKind::Comma,
                TokenKind::Word("qq"),
                TokenKind::LParen,
                TokenKind::Word("x"),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(
            kinds("%web & /^web[0-9]+$/"),
            vec![
                TokenKind::Percent,
                TokenKind::Word("web"),
                TokenKind::Amp,
                TokenKind::Regex("^web[0-9]+$"),
            ]
        );
    }

    #[test]
    fn test_unterminated_literals() {
        assert_eq!(kinds("/abc"), vec![TokenKind::UnterminatedRegex]);
        assert_eq!(kinds("\"abc"), vec![TokenKind::UnterminatedString]);
        assert_eq!(kinds("q(abc"), vec![TokenKind::UnterminatedString]);
    }

    #[test]
    fn test_function_call_and_attribute() {
        assert_eq!(
            kinds("has(ENV;prod) , web:ENVIRONMENT"),
            vec![
                TokenKind::Word("has"),
                TokenKind::LParen,
                TokenKind::Word("ENV"),
                TokenKind::Semicolon,
                TokenKind::Word("prod"),
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Word("web"),
                TokenKind::Colon,
                TokenKind::Word("ENVIRONMENT"),
            ]
        );
    }

    #[test]
    fn test_illegal_character() {
        let tokens: Vec<_> = Lexer::new("a # b").collect();
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].span, Span::new(2, 3));
    }
}
