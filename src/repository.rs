//! Storage operations on the `orders` table. Ids come from SQLite's
//! `AUTOINCREMENT`, never from the service.

use diesel::{OptionalExtension, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::{
    infra::db::DbConnection,
    models::{CreateOrderEntity, OrderEntity},
    schema::orders,
};

/// Writes one order in a single `INSERT ... RETURNING` statement.
pub async fn insert_order(
    conn: &mut DbConnection,
    order: CreateOrderEntity,
) -> QueryResult<OrderEntity> {
    diesel::insert_into(orders::table)
        .values(order)
        .returning(OrderEntity::as_returning())
        .get_result(conn)
        .await
}

pub async fn find_order(conn: &mut DbConnection, id: i64) -> QueryResult<Option<OrderEntity>> {
    orders::table
        .find(id)
        .select(OrderEntity::as_select())
        .first(conn)
        .await
        .optional()
}
