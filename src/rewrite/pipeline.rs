//! The ordered rewrite stages
//!
//! Each stage computes edits against a freshly parsed tree, applies them and
//! hands the text to the next stage, which parses again.

use super::edit::{TextEdit, apply_edits};
use super::imports::reimport;
use super::qualify::qualify;
use super::substitute::{ReviewItem, substitute};
use crate::parser::{SyntaxTree, parse};
use crate::project::IdentityIndex;

/// Text after rewriting plus what stage 2 found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutput {
    pub text: String,
    pub substituted: usize,
    pub review: Vec<ReviewItem>,
}

fn run_stage(text: String, stage: impl FnOnce(&SyntaxTree) -> Vec<TextEdit>) -> String {
    let tree = parse(&text);
    let edits = stage(&tree);
    if edits.is_empty() {
        return text;
    }
    apply_edits(&text, edits)
}

/// Stage 1 only
pub fn qualify_source(text: &str) -> String {
    run_stage(text.to_string(), qualify)
}

/// Stage 3 only
pub fn reimport_source(text: &str) -> String {
    run_stage(text.to_string(), reimport)
}

/// Stages 1 and 2: fully qualified text pointing at the new identities
pub fn qualify_and_substitute(text: &str, index: &IdentityIndex) -> RewriteOutput {
    let qualified = qualify_source(text);
    let tree = parse(&qualified);
    let result = substitute(&tree, index);
    let text = if result.edits.is_empty() {
        qualified
    } else {
        apply_edits(&qualified, result.edits)
    };
    RewriteOutput {
        text,
        substituted: result.substituted,
        review: result.review,
    }
}

/// All three stages
pub fn rewrite_source(text: &str, index: &IdentityIndex) -> RewriteOutput {
    let mut output = qualify_and_substitute(text, index);
    output.text = reimport_source(&output.text);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{PlannerConfig, plan_file};

    fn index() -> IdentityIndex {
        let config = PlannerConfig {
            underscore_conversion: true,
            ..PlannerConfig::new("Acme")
        };
        IdentityIndex::from_files(&[plan_file("a.php", "<?php\nclass Foo_Bar {}\nclass Foo_Baz {}\n", &config)])
    }

    #[test]
    fn test_rewrite_source_round_trip() {
        let source = "<?php\nnamespace App;\n\nuse Foo_Bar;\n\nclass Service extends Foo_Bar {\n    public function make(): \\Foo_Baz { return new \\Foo_Baz(); }\n}\n";
        let out = rewrite_source(source, &index());
        assert_eq!(out.substituted, 4);
        assert_eq!(
            out.text,
            "<?php\nnamespace App;\n\nuse Acme\\Foo\\Bar as Foo_Bar;\nuse Acme\\Foo\\Baz;\n\nclass Service extends Foo_Bar {\n    public function make(): Baz { return new Baz(); }\n}\n"
        );
    }

    #[test]
    fn test_untouched_source_is_unchanged() {
        let source = "<?php\nnamespace App;\n\nuse Vendor\\Lib;\n\nclass Service extends Lib {}\n";
        let out = rewrite_source(source, &index());
        assert_eq!(out.substituted, 0);
        assert_eq!(out.text, source);
    }

    #[test]
    fn test_doc_names_follow_same_namespace_renames() {
        let config = PlannerConfig {
            underscore_conversion: true,
            ..PlannerConfig::new("Acme")
        };
        let index = IdentityIndex::from_files(&[plan_file("lib.php", "<?php\nnamespace Lib;\nclass Old_Name {}\n", &config)]);
        let source = "<?php\nnamespace Lib;\n\nclass User\n{\n    /** @var Old_Name */\n    private $name;\n\n    public function set(Old_Name $name) {}\n}\n";
        let out = rewrite_source(source, &index);
        assert_eq!(out.substituted, 2);
        assert!(out.text.contains("use Acme\\Lib\\Old\\Name;"), "{}", out.text);
        assert!(out.text.contains("/** @var Name */"));
        assert!(out.text.contains("public function set(Name $name) {}"));
        assert!(!out.text.contains("Old_Name"));
    }
}
