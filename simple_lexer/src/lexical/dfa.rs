//! Deterministic state machine behind the tokenizer
//!
//! [`transition`] is the whole table: given how much of which token shape
//! has matched and the next input character, it names the next state and
//! what to do with the character. Keyword recognition is part of the table;
//! the `Id*` states keep an identifier alive while a keyword might still
//! match, and any further identifier character demotes them to
//! [`DfaState::Identifier`].

use crate::tokens::{is_identifier_continue, is_identifier_start, TokenKind};

/// How much of which token shape has matched so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DfaState {
    /// Between tokens; nothing matched
    Start,

    Identifier,
    IntegerLiteral,

    // Keyword prefixes
    IdI,    // i
    IdIn,   // in
    IdInt,  // int
    IdIf,   // if
    IdE,    // e
    IdEl,   // el
    IdEls,  // els
    IdElse, // else

    // One-shot terminals
    Plus,
    Minus,
    Star,
    Slash,
    SemiColon,
    LeftParen,
    RightParen,
    Ge,
    Le,
    Eq,

    // Single character that may grow to two
    Gt,
    Lt,
    Assignment,
}

/// What the tokenizer does with the character it peeked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Append the character and keep matching
    ConsumeAndContinue,
    /// Append the character; the token is complete
    ConsumeAndFinalize,
    /// Leave the character for the next token; the token is complete
    PushbackAndFinalize,
    /// Drop the character; it starts no token
    DiscardAndRestart,
}

impl DfaState {
    /// Kind produced when a token is finalized in this state
    pub fn accepting_kind(&self) -> Option<TokenKind> {
        match self {
            Self::Start => None,
            Self::Identifier
            | Self::IdI
            | Self::IdIn
            | Self::IdE
            | Self::IdEl
            | Self::IdEls => Some(TokenKind::Identifier),
            Self::IntegerLiteral => Some(TokenKind::IntegerLiteral),
            Self::IdInt => Some(TokenKind::Int),
            Self::IdIf => Some(TokenKind::If),
            Self::IdElse => Some(TokenKind::Else),
            Self::Plus => Some(TokenKind::Plus),
            Self::Minus => Some(TokenKind::Minus),
            Self::Star => Some(TokenKind::Star),
            Self::Slash => Some(TokenKind::Slash),
            Self::SemiColon => Some(TokenKind::SemiColon),
            Self::LeftParen => Some(TokenKind::LeftParen),
            Self::RightParen => Some(TokenKind::RightParen),
            Self::Ge => Some(TokenKind::Ge),
            Self::Le => Some(TokenKind::Le),
            Self::Eq => Some(TokenKind::Eq),
            Self::Gt => Some(TokenKind::Gt),
            Self::Lt => Some(TokenKind::Lt),
            Self::Assignment => Some(TokenKind::Assignment),
        }
    }

    /// States that still might become a keyword
    pub fn is_keyword_prefix(&self) -> bool {
        matches!(
            self,
            Self::IdI
                | Self::IdIn
                | Self::IdInt
                | Self::IdIf
                | Self::IdE
                | Self::IdEl
                | Self::IdEls
                | Self::IdElse
        )
    }

    /// States holding a complete keyword that only a boundary can confirm
    pub fn is_keyword_boundary(&self) -> bool {
        matches!(self, Self::IdInt | Self::IdIf | Self::IdElse)
    }

    /// States that finalize on the very next character, whatever it is
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Slash
                | Self::SemiColon
                | Self::LeftParen
                | Self::RightParen
                | Self::Ge
                | Self::Le
                | Self::Eq
        )
    }
}

/// Continue a keyword prefix on `expected`, demote on any other identifier
/// character, finalize on anything else.
fn keyword_step(state: DfaState, c: char, expected: char, next: DfaState) -> (DfaState, Action) {
    if c == expected {
        (next, Action::ConsumeAndContinue)
    } else if is_identifier_continue(c) {
        (DfaState::Identifier, Action::ConsumeAndContinue)
    } else {
        (state, Action::PushbackAndFinalize)
    }
}

fn start(c: char) -> (DfaState, Action) {
    let next = match c {
        'i' => DfaState::IdI,
        'e' => DfaState::IdE,
        c if is_identifier_start(c) => DfaState::Identifier,
        c if c.is_ascii_digit() => DfaState::IntegerLiteral,
        '>' => DfaState::Gt,
        '<' => DfaState::Lt,
        '=' => DfaState::Assignment,
        '+' => DfaState::Plus,
        '-' => DfaState::Minus,
        '*' => DfaState::Star,
        '/' => DfaState::Slash,
        ';' => DfaState::SemiColon,
        '(' => DfaState::LeftParen,
        ')' => DfaState::RightParen,
        _ => return (DfaState::Start, Action::DiscardAndRestart),
    };
    (next, Action::ConsumeAndContinue)
}

/// The transition table
pub fn transition(state: DfaState, c: char) -> (DfaState, Action) {
    use DfaState::*;

    match state {
        Start => start(c),

        _ if state.is_one_shot() => (state, Action::PushbackAndFinalize),

        _ if state.is_keyword_boundary() => {
            if is_identifier_continue(c) {
                (Identifier, Action::ConsumeAndContinue)
            } else {
                (state, Action::PushbackAndFinalize)
            }
        }

        Gt if c == '=' => (Ge, Action::ConsumeAndFinalize),
        Lt if c == '=' => (Le, Action::ConsumeAndFinalize),
        Assignment if c == '=' => (Eq, Action::ConsumeAndFinalize),

        Identifier if is_identifier_continue(c) => (Identifier, Action::ConsumeAndContinue),
        IntegerLiteral if c.is_ascii_digit() => (IntegerLiteral, Action::ConsumeAndContinue),

        IdI if c == 'f' => (IdIf, Action::ConsumeAndContinue),
        IdI => keyword_step(IdI, c, 'n', IdIn),
        IdIn => keyword_step(IdIn, c, 't', IdInt),
        IdE => keyword_step(IdE, c, 'l', IdEl),
        IdEl => keyword_step(IdEl, c, 's', IdEls),
        IdEls => keyword_step(IdEls, c, 'e', IdElse),

        // Gt, Lt and Assignment without '=', or the end of an identifier or integer run
        _ => (state, Action::PushbackAndFinalize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [DfaState; 24] = [
        DfaState::Start,
        DfaState::Identifier,
        DfaState::IntegerLiteral,
        DfaState::IdI,
        DfaState::IdIn,
        DfaState::IdInt,
        DfaState::IdIf,
        DfaState::IdE,
        DfaState::IdEl,
        DfaState::IdEls,
        DfaState::IdElse,
        DfaState::Plus,
        DfaState::Minus,
        DfaState::Star,
        DfaState::Slash,
        DfaState::SemiColon,
        DfaState::LeftParen,
        DfaState::RightParen,
        DfaState::Ge,
        DfaState::Le,
        DfaState::Eq,
        DfaState::Gt,
        DfaState::Lt,
        DfaState::Assignment,
    ];

    /// Drive the table over a word from Start, stopping at the first finalize
    fn run(input: &str) -> (DfaState, Action, usize) {
        let mut state = DfaState::Start;
        for (consumed, c) in input.chars().enumerate() {
            let (next, action) = transition(state, c);
            match action {
                Action::ConsumeAndContinue => state = next,
                Action::ConsumeAndFinalize => return (next, action, consumed + 1),
                Action::PushbackAndFinalize | Action::DiscardAndRestart => {
                    return (next, action, consumed)
                }
            }
        }
        (state, Action::ConsumeAndContinue, input.chars().count())
    }

    #[test]
    fn test_start_classification() {
        assert_eq!(transition(DfaState::Start, 'i').0, DfaState::IdI);
        assert_eq!(transition(DfaState::Start, 'e').0, DfaState::IdE);
        assert_eq!(transition(DfaState::Start, 'x').0, DfaState::Identifier);
        assert_eq!(transition(DfaState::Start, 'I').0, DfaState::Identifier);
        assert_eq!(transition(DfaState::Start, '7').0, DfaState::IntegerLiteral);
        assert_eq!(transition(DfaState::Start, '>').0, DfaState::Gt);
        assert_eq!(transition(DfaState::Start, '(').0, DfaState::LeftParen);

        for c in [' ', '\t', '\n', '#', '_', '!', '"', 'é', '\0'] {
            assert_eq!(
                transition(DfaState::Start, c),
                (DfaState::Start, Action::DiscardAndRestart),
                "character {:?}",
                c
            );
        }
    }

    #[test]
    fn test_only_start_discards() {
        for state in ALL_STATES.iter().filter(|s| **s != DfaState::Start) {
            for c in [' ', '#', 'a', '1', '=', 'é'] {
                assert_ne!(transition(*state, c).1, Action::DiscardAndRestart);
            }
        }
    }

    #[test]
    fn test_only_start_lacks_accepting_kind() {
        for state in ALL_STATES {
            assert_eq!(state.accepting_kind().is_none(), state == DfaState::Start);
        }
    }

    #[test]
    fn test_one_shot_states_always_push_back() {
        for state in ALL_STATES.iter().filter(|s| s.is_one_shot()) {
            for c in ['=', 'a', '1', ' ', '+'] {
                assert_eq!(transition(*state, c), (*state, Action::PushbackAndFinalize));
            }
        }
    }

    #[test]
    fn test_keyword_boundary_states_follow_predicate() {
        let boundaries: Vec<DfaState> = ALL_STATES
            .iter()
            .copied()
            .filter(DfaState::is_keyword_boundary)
            .collect();
        assert_eq!(
            boundaries,
            vec![DfaState::IdInt, DfaState::IdIf, DfaState::IdElse]
        );

        for state in boundaries {
            assert!(state.is_keyword_prefix());
            assert!(!state.is_one_shot());
            for c in ['a', 'Z', '0'] {
                assert_eq!(
                    transition(state, c),
                    (DfaState::Identifier, Action::ConsumeAndContinue)
                );
            }
            for c in [' ', ';', '=', '_'] {
                assert_eq!(transition(state, c), (state, Action::PushbackAndFinalize));
            }
        }
    }

    #[test]
    fn test_one_shot_set() {
        let one_shot = ALL_STATES.iter().filter(|s| s.is_one_shot()).count();
        assert_eq!(one_shot, 10);
        assert!(ALL_STATES
            .iter()
            .filter(|s| s.is_one_shot())
            .all(|s| s.accepting_kind().is_some_and(|k| k.fixed_text().is_some())));
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(run(">="), (DfaState::Ge, Action::ConsumeAndFinalize, 2));
        assert_eq!(run("<="), (DfaState::Le, Action::ConsumeAndFinalize, 2));
        assert_eq!(run("=="), (DfaState::Eq, Action::ConsumeAndFinalize, 2));
        assert_eq!(run(">x"), (DfaState::Gt, Action::PushbackAndFinalize, 1));
        assert_eq!(run("<1"), (DfaState::Lt, Action::PushbackAndFinalize, 1));
        assert_eq!(run("= "), (DfaState::Assignment, Action::PushbackAndFinalize, 1));
    }

    #[test]
    fn test_keyword_paths() {
        assert_eq!(run("int;").0, DfaState::IdInt);
        assert_eq!(run("if(").0, DfaState::IdIf);
        assert_eq!(run("else ").0, DfaState::IdElse);
        assert_eq!(DfaState::IdInt.accepting_kind(), Some(TokenKind::Int));
        assert_eq!(DfaState::IdIf.accepting_kind(), Some(TokenKind::If));
        assert_eq!(DfaState::IdElse.accepting_kind(), Some(TokenKind::Else));
    }

    #[test]
    fn test_keyword_demotion() {
        for word in ["integer", "iffy", "elsewhere", "in2", "ix", "el", "elf", "int0"] {
            let (state, _, _) = run(&format!("{} ", word));
            assert_eq!(
                state.accepting_kind(),
                Some(TokenKind::Identifier),
                "word {:?}",
                word
            );
        }
    }

    #[test]
    fn test_keyword_boundary_on_any_non_identifier_character() {
        for c in [' ', ';', '(', '+', '#', '\n', 'é'] {
            assert_eq!(
                transition(DfaState::IdInt, c),
                (DfaState::IdInt, Action::PushbackAndFinalize)
            );
        }
        assert_eq!(
            transition(DfaState::IdElse, 'w'),
            (DfaState::Identifier, Action::ConsumeAndContinue)
        );
    }

    #[test]
    fn test_integer_run_stops_at_letter() {
        assert_eq!(run("12a"), (DfaState::IntegerLiteral, Action::PushbackAndFinalize, 2));
    }

    #[test]
    fn test_identifiers_exclude_underscore() {
        assert_eq!(run("ab_c"), (DfaState::Identifier, Action::PushbackAndFinalize, 2));
    }

    #[test]
    fn test_state_predicates() {
        assert!(DfaState::IdEls.is_keyword_prefix());
        assert!(!DfaState::IdEls.is_keyword_boundary());
        assert!(DfaState::IdIf.is_keyword_boundary());
        assert!(!DfaState::Identifier.is_keyword_prefix());
        assert!(DfaState::Ge.is_one_shot());
        assert!(!DfaState::Gt.is_one_shot());
    }
}
