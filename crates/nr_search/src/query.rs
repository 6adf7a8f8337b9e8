use nr_core::storage::{Comparison, TextField};
use nr_core::{Predicate, SearchFilterParameters, SortDirection};

use crate::cursor::{Direction, PageCursor};

const TEXT_FIELDS: [TextField; 3] = [TextField::Title, TextField::Category, TextField::Source];

/// Every whitespace-separated term must occur in the title, category or
/// source; dates bound inclusively; sources restrict by key.
pub fn build_filter_predicate(filters: &SearchFilterParameters) -> Predicate {
    let mut parts = Vec::new();

    if let Some(text) = &filters.text_filter {
        for term in text.split_whitespace() {
            let needle = term.to_lowercase();
            parts.push(Predicate::Or(
                TEXT_FIELDS
                    .iter()
                    .map(|field| Predicate::Contains {
                        field: *field,
                        needle: needle.clone(),
                    })
                    .collect(),
            ));
        }
    }

    if let Some(dates) = &filters.date_filter {
        if let Some(from) = dates.from {
            parts.push(Predicate::Timestamp(Comparison::Gte, from));
        }
        if let Some(to) = dates.to {
            parts.push(Predicate::Timestamp(Comparison::Lte, to));
        }
    }

    if let Some(sources) = &filters.sources {
        if !sources.is_empty() {
            parts.push(Predicate::SourceIn(sources.clone()));
        }
    }

    Predicate::And(parts)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedQuery {
    pub predicate: Predicate,
    pub direction: SortDirection,
}

/// Newest first unless walking back from a `prev` cursor.
pub fn sort_direction(cursor: Option<&PageCursor>) -> SortDirection {
    match cursor.map(|c| c.direction) {
        Some(Direction::Prev) => SortDirection::Ascending,
        _ => SortDirection::Descending,
    }
}

/// Rows strictly past `cursor` in `direction`, ties on timestamp broken by id.
pub fn keyset_condition(cursor: &PageCursor, direction: SortDirection) -> Predicate {
    let beyond = match direction {
        SortDirection::Descending => Comparison::Lt,
        SortDirection::Ascending => Comparison::Gt,
    };
    Predicate::Or(vec![
        Predicate::Timestamp(beyond, cursor.timestamp),
        Predicate::And(vec![
            Predicate::Timestamp(Comparison::Eq, cursor.timestamp),
            Predicate::Id(beyond, cursor.id.clone()),
        ]),
    ])
}

pub fn paginate(predicate: Predicate, cursor: Option<&PageCursor>) -> PaginatedQuery {
    let direction = sort_direction(cursor);
    let Some(cursor) = cursor else {
        return PaginatedQuery { predicate, direction };
    };

    let condition = keyset_condition(cursor, direction);
    let predicate = match predicate {
        Predicate::And(mut parts) => {
            parts.push(condition);
            Predicate::And(parts)
        }
        other => Predicate::And(vec![other, condition]),
    };
    PaginatedQuery { predicate, direction }
}
