use fancy_loader::query_builder::PaginationArgs;
use proptest::prelude::*;

/// Partition sizes, including empty partitions
pub fn partition_total_strategy() -> impl Strategy<Value = i64> {
    0i64..=40
}

/// Any valid combination of pagination arguments
pub fn pagination_args_strategy() -> impl Strategy<Value = PaginationArgs> {
    (
        0i64..=45,
        prop::option::of(0i64..=45),
        prop::option::of(0i64..=45),
        prop::option::of(0i64..=45),
    )
        .prop_map(|(after, before, first, last)| PaginationArgs {
            before,
            after,
            first,
            last,
        })
}

/// Arguments with at most one of `first` / `last`
pub fn single_sided_args_strategy() -> impl Strategy<Value = PaginationArgs> {
    pagination_args_strategy().prop_filter("first and last both set", |args| {
        args.first.is_none() || args.last.is_none()
    })
}

/// Snake-case column names
pub fn column_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}(_[a-z][a-z0-9]{0,8}){0,3}"
}
