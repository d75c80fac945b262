//! Confirmation gate for irreversible actions.
//!
//! Destructive payloads only build once the operator has seen a summary and affirmed it;
//! [`Confirmation::affirm`] is the only way to obtain the [`Confirmed`] token that
//! [`crate::CommandBuilder::confirmed`] takes.

/// Proof that an operator affirmed a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    _private: (),
}

/// A pending confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    message: String,
}

impl Confirmation {
    /// Prompt for removing `count` items. A single item reads "this node".
    pub fn for_count(count: usize, singular: &str, plural: &str) -> Self {
        if count == 1 {
            return Self {
                message: format!("Are you sure you want to remove this {}?", singular),
            };
        }
        Self::new("remove", count, singular, plural)
    }

    /// Prompt for applying `verb` to `count` items: "delete 3 query(s)". The plural noun
    /// is only used for an empty selection.
    pub fn new(verb: &str, count: usize, singular: &str, plural: &str) -> Self {
        let target = match count {
            0 => format!("0 {}", plural),
            n => format!("{} {}(s)", n, singular),
        };
        Self {
            message: format!("Are you sure you want to {} {}?", verb, target),
        }
    }

    /// Prompt for a single named entity, e.g. "delete the user alice".
    pub fn named(verb: &str, noun: &str, name: &str) -> Self {
        Self {
            message: format!("Are you sure you want to {} the {} {}?", verb, noun, name),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Resolve the prompt with the operator's answer.
    pub fn affirm(self, affirmed: bool) -> Option<Confirmed> {
        affirmed.then_some(Confirmed { _private: () })
    }
}

/// Summary line for removing `count` items.
pub fn build_confirmation_summary(count: usize, singular: &str, plural: &str) -> String {
    Confirmation::for_count(count, singular, plural).message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_item_reads_this() {
        assert_eq!(
            build_confirmation_summary(1, "node", "nodes"),
            "Are you sure you want to remove this node?"
        );
    }

    #[test]
    fn several_items_keep_singular_with_suffix() {
        assert_eq!(
            build_confirmation_summary(3, "node", "nodes"),
            "Are you sure you want to remove 3 node(s)?"
        );
        assert_eq!(
            Confirmation::new("delete", 2, "query", "queries").message(),
            "Are you sure you want to delete 2 query(s)?"
        );
    }

    #[test]
    fn generic_prompt_counts_even_a_single_item() {
        assert_eq!(
            Confirmation::new("delete", 1, "query", "queries").message(),
            "Are you sure you want to delete 1 query(s)?"
        );
    }

    #[test]
    fn empty_selection_uses_plural() {
        assert_eq!(
            build_confirmation_summary(0, "node", "nodes"),
            "Are you sure you want to remove 0 nodes?"
        );
    }

    #[test]
    fn named_prompt() {
        assert_eq!(
            Confirmation::named("delete", "user", "alice").message(),
            "Are you sure you want to delete the user alice?"
        );
    }

    #[test]
    fn declining_yields_no_token() {
        assert!(Confirmation::for_count(2, "carve", "carves").affirm(false).is_none());
        assert!(Confirmation::for_count(2, "carve", "carves").affirm(true).is_some());
    }
}
