use std::collections::BTreeSet;

use crate::operators::{
    ArithmeticOperator, BlockStatementRemoval, BooleanLiteral, BoundaryCondition,
    LogicalOperator, MutationOperator, NegateComparison, NumericLiteralNegation,
    RemoveConditional, UnaryOperator, UpdateOperator,
};
use crate::parser::TypeTag;

/// Ordered, immutable set of mutation operators.
///
/// Build it once and hand it to every [`crate::mutator::Mutator`] that needs it.
pub struct OperatorRegistry {
    operators: Vec<Box<dyn MutationOperator>>,
}

impl OperatorRegistry {
    pub fn new(operators: Vec<Box<dyn MutationOperator>>) -> Self {
        OperatorRegistry { operators }
    }

    /// Every operator this crate ships, in emission order.
    pub fn standard() -> Self {
        OperatorRegistry::new(vec![
            Box::new(ArithmeticOperator),
            Box::new(BoundaryCondition),
            Box::new(NegateComparison),
            Box::new(LogicalOperator),
            Box::new(UnaryOperator),
            Box::new(UpdateOperator),
            Box::new(BooleanLiteral),
            Box::new(NumericLiteralNegation),
            Box::new(RemoveConditional),
            Box::new(BlockStatementRemoval),
        ])
    }

    /// The standard operators named in `names`, still in standard order.
    /// Returns the first unknown name as the error.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let standard = OperatorRegistry::standard();
        let known = standard.names();
        for name in names {
            let name = name.as_ref();
            if !known.iter().any(|k| *k == name) {
                return Err(name.to_string());
            }
        }
        let operators = standard
            .operators
            .into_iter()
            .filter(|op| names.iter().any(|n| n.as_ref() == op.name()))
            .collect();
        Ok(OperatorRegistry::new(operators))
    }

    pub fn operators(&self) -> &[Box<dyn MutationOperator>] {
        &self.operators
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.operators.iter().map(|op| op.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Union of every operator's node types, deduplicated.
    pub fn types_of_interest(&self) -> BTreeSet<TypeTag> {
        self.operators
            .iter()
            .flat_map(|op| op.types_of_interest().iter().copied())
            .collect()
    }
}
