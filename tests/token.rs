extern crate basalt_lang;

use basalt_lang::token::{Location, Token, Type};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[test]
fn create_token() {
    let token = Token::new(
        Type::LeftParen,
        "(".to_string(),
        None,
        Location::new(1, 3),
    );

    assert_eq!(token.r#type, Type::LeftParen);
    assert_eq!(token.lexeme, "(");
    assert_eq!(token.literal, None);
    assert_eq!(token.location.line, 1);
    assert_eq!(token.location.column, 3);
}

#[test]
fn create_token_from_str() {
    let token = Token::from("init");

    assert_eq!(token.r#type, Type::Identifier);
    assert_eq!(token.lexeme, "init");
    assert_eq!(token.literal, None);
    assert_eq!(token.location, Location::new(0, 0));
}

#[test]
fn tokens_hash_by_location() {
    let first = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 0));
    let same = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 0));
    let other = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 4));

    let hash = |token: &Token| {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    };

    assert_eq!(hash(&first), hash(&same));
    assert_ne!(hash(&first), hash(&other));
}

#[test]
fn location_displays_line_and_column() {
    assert_eq!(Location::new(3, 14).to_string(), "3:14");
}
