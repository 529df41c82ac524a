use sea_orm::{ColumnTrait, Condition};

use super::search::{Criterion, SearchFilter};
use crate::entity::category::Column;

/// Translate a parsed search into a sea-orm condition; criteria are ANDed.
#[must_use]
pub fn apply_filters(filter: &SearchFilter) -> Condition {
    filter
        .criteria()
        .iter()
        .fold(Condition::all(), |condition, criterion| {
            condition.add(criterion_condition(criterion))
        })
}

fn criterion_condition(criterion: &Criterion) -> Condition {
    match criterion {
        Criterion::ParentEmpty | Criterion::IsRoot(true) => {
            Condition::all().add(Column::Parent.is_null())
        }
        Criterion::ParentNotEmpty | Criterion::IsRoot(false) => {
            Condition::all().add(Column::Parent.is_not_null())
        }
        Criterion::ParentEquals(code) => Condition::all().add(Column::Parent.eq(code.as_str())),
        // SQL comparisons skip NULL, so roots are added back explicitly
        Criterion::ParentNotEqual(code) => Condition::any()
            .add(Column::Parent.ne(code.as_str()))
            .add(Column::Parent.is_null()),
        Criterion::ParentIn(codes) => Condition::all().add(Column::Parent.is_in(codes.clone())),
        Criterion::ParentNotIn(codes) => Condition::any()
            .add(Column::Parent.is_not_in(codes.clone()))
            .add(Column::Parent.is_null()),
        Criterion::CodeIn(codes) => Condition::all().add(Column::Code.is_in(codes.clone())),
        Criterion::CodeNotIn(codes) => Condition::all().add(Column::Code.is_not_in(codes.clone())),
    }
}
