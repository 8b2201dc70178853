//! Token kinds for the lossless PHP token stream
//!
//! Every byte of the input belongs to exactly one token, so printing the
//! token texts in order reproduces the source.

/// All token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,       // // or #
    BLOCK_COMMENT,      // /* */
    DOC_COMMENT,        // /** */
    OPEN_TAG,           // <?php (including one trailing whitespace)

    // =========================================================================
    // MODE SWITCHES
    // =========================================================================
    INLINE_HTML,        // text outside <?php ... ?>
    OPEN_TAG_ECHO,      // <?=
    CLOSE_TAG,          // ?> (including one trailing newline)

    // =========================================================================
    // NAMES AND LITERALS
    // =========================================================================
    IDENT,                  // Foo
    NAME_QUALIFIED,         // Foo\Bar
    NAME_FULLY_QUALIFIED,   // \Foo\Bar
    NAME_RELATIVE,          // namespace\Foo
    VARIABLE,               // $foo
    STRING,                 // 'x', "x", `x`
    HEREDOC,                // <<<EOT ... EOT
    NUMBER,                 // 42, 0x1F, 1.5e3

    // =========================================================================
    // KEYWORDS (only those the parser or the reference scanner inspect)
    // =========================================================================
    ABSTRACT_KW,
    AS_KW,
    CASE_KW,
    CATCH_KW,
    CLASS_KW,
    CONST_KW,
    DECLARE_KW,
    ELSE_KW,
    ELSEIF_KW,
    ENDDECLARE_KW,
    ENDIF_KW,
    EXIT_KW,            // exit, die
    EXTENDS_KW,
    FINAL_KW,
    FINALLY_KW,
    FN_KW,
    FUNCTION_KW,
    GOTO_KW,
    HALT_COMPILER_KW,   // __halt_compiler
    IF_KW,
    IMPLEMENTS_KW,
    INCLUDE_KW,         // include, include_once, require, require_once
    INSTANCEOF_KW,
    INSTEADOF_KW,
    INTERFACE_KW,
    NAMESPACE_KW,
    NEW_KW,
    READONLY_KW,
    RETURN_KW,
    STATIC_KW,
    TRAIT_KW,
    USE_KW,
    MAGIC_CONST,        // __CLASS__, __DIR__, ...
    KEYWORD,            // any other reserved word

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,            // (
    R_PAREN,            // )
    L_BRACE,            // {
    R_BRACE,            // }
    L_BRACKET,          // [
    R_BRACKET,          // ]
    ATTR_OPEN,          // #[
    SEMICOLON,          // ;
    COMMA,              // ,
    COLON,              // :
    COLON_COLON,        // ::
    ARROW,              // ->
    NULLSAFE_ARROW,     // ?->
    FAT_ARROW,          // =>
    EQ,                 // =
    QUESTION,           // ?
    PIPE,               // |
    AMP,                // &
    ELLIPSIS,           // ...
    BACKSLASH,          // \ (group use separator)
    DOLLAR,             // $ (variable variables)
    OPERATOR,           // every other operator

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
}

impl SyntaxKind {
    /// Check if this is trivia (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT | Self::DOC_COMMENT | Self::OPEN_TAG
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::ABSTRACT_KW as u16) && (self as u16) <= (Self::KEYWORD as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_PAREN as u16) && (self as u16) <= (Self::OPERATOR as u16)
    }

    /// Identifier or any qualified form of it
    pub fn is_name(self) -> bool {
        matches!(
            self,
            Self::IDENT | Self::NAME_QUALIFIED | Self::NAME_FULLY_QUALIFIED | Self::NAME_RELATIVE
        )
    }

    pub fn is_opening_bracket(self) -> bool {
        matches!(self, Self::L_PAREN | Self::L_BRACE | Self::L_BRACKET | Self::ATTR_OPEN)
    }

    pub fn is_closing_bracket(self) -> bool {
        matches!(self, Self::R_PAREN | Self::R_BRACE | Self::R_BRACKET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ranges() {
        assert!(SyntaxKind::CLASS_KW.is_keyword());
        assert!(SyntaxKind::KEYWORD.is_keyword());
        assert!(!SyntaxKind::IDENT.is_keyword());
        assert!(SyntaxKind::OPERATOR.is_punct());
        assert!(!SyntaxKind::ERROR.is_punct());
        assert!(SyntaxKind::DOC_COMMENT.is_trivia());
        assert!(!SyntaxKind::INLINE_HTML.is_trivia());
    }
}
