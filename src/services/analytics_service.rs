//! Admin dashboard statistics.
//!
//! Every call recomputes from the raw `bookings`, `payments` and `tests`
//! collections; nothing is cached or materialized. Bookings whose `bookId`
//! does not resolve to a test are left out of the joined views.

use crate::analytics::{Accumulator, GroupKey, Pipeline, SortOrder, Stage};
use crate::database::{Collection, DocumentStore};
use crate::models::{AdminStats, BookingStatus, CategoryStat, PopularTest};
use crate::utils::AppError;
use mongodb::bson::{from_document, Bson};
use serde::de::DeserializeOwned;

pub const POPULAR_TESTS_LIMIT: i64 = 5;

fn s(value: &str) -> String {
    value.to_string()
}

fn join_tests(local_field: &str) -> [Stage; 3] {
    [
        Stage::ToObjectId { field: s(local_field) },
        Stage::Lookup {
            from: Collection::Tests,
            local_field: s(local_field),
            foreign_field: s("_id"),
            as_field: s("test"),
        },
        Stage::Unwind { path: s("test") },
    ]
}

pub fn revenue_pipeline() -> Pipeline {
    Pipeline::over(Collection::Payments).stage(Stage::Group {
        key: GroupKey::All,
        accumulators: vec![(s("totalRevenue"), Accumulator::Sum(s("price")))],
    })
}

/// Bookings per `(bookId, status)`, joined to their test, regrouped by
/// test category, busiest category first.
pub fn category_pipeline() -> Pipeline {
    let status_count = |status: BookingStatus| Accumulator::SumWhere {
        value: s("count"),
        when: s("_id.status"),
        equals: Bson::String(status.as_str().to_string()),
    };

    let mut pipeline = Pipeline::over(Collection::Bookings).stage(Stage::Group {
        key: GroupKey::Fields(vec![(s("bookId"), s("bookId")), (s("status"), s("status"))]),
        accumulators: vec![
            (s("count"), Accumulator::Count),
            (s("revenue"), Accumulator::Sum(s("finalPrice"))),
        ],
    });
    for stage in join_tests("_id.bookId") {
        pipeline = pipeline.stage(stage);
    }

    pipeline
        .stage(Stage::Group {
            key: GroupKey::Field(s("test.category")),
            accumulators: vec![
                (s("totalCount"), Accumulator::Sum(s("count"))),
                (s("totalRevenue"), Accumulator::Sum(s("revenue"))),
                (s("pendingCount"), status_count(BookingStatus::Pending)),
                (s("deliveredCount"), status_count(BookingStatus::Delivered)),
            ],
        })
        .stage(Stage::Project {
            fields: vec![
                (s("category"), s("_id")),
                (s("totalCount"), s("totalCount")),
                (s("totalRevenue"), s("totalRevenue")),
                (s("pendingCount"), s("pendingCount")),
                (s("deliveredCount"), s("deliveredCount")),
            ],
        })
        .stage(Stage::Sort {
            field: s("totalCount"),
            order: SortOrder::Descending,
        })
}

/// Most booked tests. Ties keep the store's natural order.
pub fn popular_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::over(Collection::Bookings).stage(Stage::Group {
        key: GroupKey::Field(s("bookId")),
        accumulators: vec![(s("count"), Accumulator::Count)],
    });
    for stage in join_tests("_id") {
        pipeline = pipeline.stage(stage);
    }

    pipeline
        .stage(Stage::Sort {
            field: s("count"),
            order: SortOrder::Descending,
        })
        .stage(Stage::Limit(POPULAR_TESTS_LIMIT))
        .stage(Stage::Project {
            fields: vec![
                (s("_id"), s("test._id")),
                (s("name"), s("test.name")),
                (s("image"), s("test.image")),
                (s("category"), s("test.category")),
                (s("price"), s("test.price")),
                (s("count"), s("count")),
            ],
        })
}

/// Runs a report pipeline. Rows that do not fit `T` are logged and left out.
async fn run<T: DeserializeOwned>(store: &dyn DocumentStore, pipeline: &Pipeline) -> Result<Vec<T>, AppError> {
    let rows = store
        .aggregate(pipeline)
        .await?
        .into_iter()
        .filter_map(|row| match from_document::<T>(row.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::warn!("⚠️ Skipping {} report row {}: {}", pipeline.source.as_str(), row, e);
                None
            }
        })
        .collect();
    Ok(rows)
}

pub async fn summary(store: &dyn DocumentStore) -> Result<AdminStats, AppError> {
    let users = store.estimated_count(Collection::Users).await?;
    let tests = store.estimated_count(Collection::Tests).await?;
    let bookings = store.estimated_count(Collection::Bookings).await?;
    let payments = store.estimated_count(Collection::Payments).await?;

    let revenue = store
        .aggregate(&revenue_pipeline())
        .await?
        .first()
        .and_then(|row| match row.get("totalRevenue") {
            Some(Bson::Double(n)) => Some(*n),
            Some(Bson::Int32(n)) => Some(f64::from(*n)),
            Some(Bson::Int64(n)) => Some(*n as f64),
            _ => None,
        })
        .unwrap_or(0.0);

    Ok(AdminStats {
        users,
        tests,
        bookings,
        payments,
        revenue,
    })
}

pub async fn category_breakdown(store: &dyn DocumentStore) -> Result<Vec<CategoryStat>, AppError> {
    run(store, &category_pipeline()).await
}

pub async fn popular_tests(store: &dyn DocumentStore) -> Result<Vec<PopularTest>, AppError> {
    run(store, &popular_pipeline()).await
}
