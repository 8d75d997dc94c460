//! Orders Repository

use async_trait::async_trait;
use binary_craft::{
    items::{ItemKind, LineItem},
    orders::{OrderStatus, PaymentStatus},
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    orders::{
        data::{PendingOrder, StatusGuard},
        records::{OrderRecord, OrderUuid, ShippingAddress},
    },
    users::records::UserUuid,
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const FIND_ORDER_SQL: &str = include_str!("sql/find_order.sql");
const LIST_ORDERS_BY_USER_SQL: &str = include_str!("sql/list_orders_by_user.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("sql/count_orders.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");

#[automock]
#[async_trait]
/// Order persistence.
pub trait OrdersRepository: Send + Sync {
    /// Write an order and its items in one transaction.
    async fn create_order(&self, order: PendingOrder) -> Result<OrderRecord, sqlx::Error>;

    /// Find one order with its items.
    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, sqlx::Error>;

    /// Every order placed by `user`, newest first.
    async fn list_orders_by_user(&self, user: UserUuid) -> Result<Vec<OrderRecord>, sqlx::Error>;

    /// One page of all orders, newest first.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error>;

    /// Number of orders, optionally with the given status.
    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<u64, sqlx::Error>;

    /// Set whichever status fields are given.
    ///
    /// With a `guard`, the write only applies while the order still has the
    /// guarded statuses. `None` if the order is unknown or the guard failed.
    async fn update_status(
        &self,
        order: OrderUuid,
        guard: Option<StatusGuard>,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<OrderRecord>, sqlx::Error>;
}

#[derive(Debug, Clone)]
/// PostgreSQL-backed order repository.
pub struct PgOrdersRepository {
    pool: PgPool,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_items(&self, mut orders: Vec<OrderRecord>) -> Result<Vec<OrderRecord>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, StoredOrderItem>(LIST_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&self.pool)
            .await?;

        let mut items: FxHashMap<Uuid, Vec<LineItem>> = FxHashMap::default();

        for row in rows {
            items.entry(row.order_uuid).or_default().push(row.item);
        }

        for order in &mut orders {
            order.items = items.remove(&order.uuid.into_uuid()).unwrap_or_default();
        }

        Ok(orders)
    }

    async fn attach_items_one(
        &self,
        order: Option<OrderRecord>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        match order {
            Some(order) => Ok(self.attach_items(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn create_order(&self, order: PendingOrder) -> Result<OrderRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let (created_at, updated_at): (SqlxTimestamp, SqlxTimestamp) =
            query_as(CREATE_ORDER_SQL)
                .bind(order.uuid.into_uuid())
                .bind(order.user.into_uuid())
                .bind(encode_amount(order.summary.subtotal, "subtotal")?)
                .bind(encode_amount(order.summary.discount, "discount")?)
                .bind(encode_amount(order.summary.total, "total_amount")?)
                .bind(order.summary.promo_code.as_deref())
                .bind(OrderStatus::Pending.as_str())
                .bind(PaymentStatus::Unpaid.as_str())
                .bind(&order.payment_method)
                .bind(&order.shipping_address.street)
                .bind(&order.shipping_address.city)
                .bind(&order.shipping_address.state)
                .bind(&order.shipping_address.zip)
                .bind(&order.shipping_address.country)
                .bind(&order.notes)
                .fetch_one(&mut *tx)
                .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(order.uuid.into_uuid())
                .bind(position)
                .bind(&item.reference)
                .bind(item.kind.as_str())
                .bind(&item.title)
                .bind(encode_amount(item.unit_price, "unit_price")?)
                .bind(i64::from(item.quantity))
                .bind(item.image.as_deref())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(OrderRecord {
            uuid: order.uuid,
            user: order.user,
            items: order.items,
            subtotal: order.summary.subtotal,
            discount: order.summary.discount,
            total_amount: order.summary.total,
            promo_code: order.summary.promo_code,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            notes: order.notes,
            created_at: created_at.to_jiff(),
            updated_at: updated_at.to_jiff(),
        })
    }

    async fn find_order(&self, order: OrderUuid) -> Result<Option<OrderRecord>, sqlx::Error> {
        let found = query_as::<Postgres, OrderRecord>(FIND_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        self.attach_items_one(found).await
    }

    async fn list_orders_by_user(&self, user: UserUuid) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_BY_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(orders).await
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let offset = i64::try_from(offset).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(orders).await
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        guard: Option<StatusGuard>,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let updated = query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.map(OrderStatus::as_str))
            .bind(payment_status.map(PaymentStatus::as_str))
            .bind(guard.map(|guard| guard.status.as_str()))
            .bind(guard.map(|guard| guard.payment_status.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        self.attach_items_one(updated).await
    }
}

fn encode_amount(amount: u64, column: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| {
        sqlx::Error::Encode(format!("{column} out of range: {e}").into())
    })
}

fn decode_amount(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    u64::try_from(row.try_get::<i64, _>(column)?).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode_parsed<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    row.try_get::<String, _>(column)?
        .parse::<T>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items: Vec::new(),
            subtotal: decode_amount(row, "subtotal")?,
            discount: decode_amount(row, "discount")?,
            total_amount: decode_amount(row, "total_amount")?,
            promo_code: row.try_get("promo_code")?,
            status: decode_parsed::<OrderStatus>(row, "status")?,
            payment_status: decode_parsed::<PaymentStatus>(row, "payment_status")?,
            payment_method: row.try_get("payment_method")?,
            shipping_address: ShippingAddress {
                street: row.try_get("shipping_street")?,
                city: row.try_get("shipping_city")?,
                state: row.try_get("shipping_state")?,
                zip: row.try_get("shipping_zip")?,
                country: row.try_get("shipping_country")?,
            },
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

struct StoredOrderItem {
    order_uuid: Uuid,
    item: LineItem,
}

impl<'r> FromRow<'r, PgRow> for StoredOrderItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity = u32::try_from(row.try_get::<i64, _>("quantity")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(Self {
            order_uuid: row.try_get("order_uuid")?,
            item: LineItem {
                reference: row.try_get("reference")?,
                kind: decode_parsed::<ItemKind>(row, "kind")?,
                title: row.try_get("title")?,
                unit_price: decode_amount(row, "unit_price")?,
                quantity,
                image: row.try_get("image")?,
            },
        })
    }
}
