use super::Expression;
use crate::models::TableEntry;

pub type Filter<T> = Box<dyn Fn(&T) -> bool + Sync + Send>;

impl Expression {
    pub fn generate_filter<T: TableEntry + 'static>(self) -> Filter<T> {
        match self {
            Expression::Or(expressions) => {
                let filters: Vec<Filter<T>> = expressions
                    .into_iter()
                    .map(Expression::generate_filter)
                    .collect();
                Box::new(move |entry: &T| filters.iter().any(|filter| filter(entry)))
            }
            Expression::And(expressions) => {
                let filters: Vec<Filter<T>> = expressions
                    .into_iter()
                    .map(Expression::generate_filter)
                    .collect();
                Box::new(move |entry: &T| filters.iter().all(|filter| filter(entry)))
            }
            Expression::Not(expression) => {
                let inner_filter = expression.generate_filter();
                Box::new(move |entry: &T| !inner_filter(entry))
            }
            Expression::Tag(tag) => {
                Box::new(move |entry: &T| entry.tags().iter().any(|t| *t == tag))
            }
            Expression::Category(category) => {
                Box::new(move |entry: &T| entry.category() == category)
            }
            Expression::Kind(kind) => Box::new(move |entry: &T| entry.kind() == kind),
            Expression::Any(any_identifier) => {
                let any_lower = any_identifier.to_lowercase();
                Box::new(move |entry: &T| {
                    entry.name().to_lowercase().contains(&any_lower)
                        || entry.description().to_lowercase().contains(&any_lower)
                        || entry
                            .tags()
                            .iter()
                            .any(|tag| tag.to_lowercase().contains(&any_lower))
                })
            }
        }
    }
}
