//! Order request and response bodies.

use binary_craft::{items::LineItem, money::Currency};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use binary_craft_app::domain::{
    orders::{
        data::NewOrderItem,
        records::{OrderRecord, ShippingAddress},
    },
    validation::NewItem,
};

use crate::amounts::{format_amount, parse_amount, parse_kind};

/// Shipping Address
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct ShippingAddressBody {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(body: ShippingAddressBody) -> Self {
        ShippingAddress {
            street: body.street,
            city: body.city,
            state: body.state,
            zip: body.zip,
            country: body.country,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressBody {
    fn from(address: ShippingAddress) -> Self {
        ShippingAddressBody {
            street: address.street,
            city: address.city,
            state: address.state,
            zip: address.zip,
            country: address.country,
        }
    }
}

/// Order Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemRequest {
    /// Catalog identifier of the product or service
    pub item_id: String,

    /// `product` or `service`
    pub item_type: String,

    /// Title shown to the customer
    pub title: String,

    /// Unit price in major units, e.g. `"12.50"`
    pub price: String,

    /// Number of units
    pub quantity: i64,

    /// Display image
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderItemRequest {
    pub(crate) fn into_new_order_item(self) -> Result<NewOrderItem, StatusError> {
        Ok(NewOrderItem {
            item: NewItem {
                reference: self.item_id,
                kind: parse_kind(&self.item_type, "itemType")?,
                title: self.title,
                unit_price: parse_amount(&self.price, "price")?,
                image: self.image,
            },
            quantity: self.quantity,
        })
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    /// Catalog identifier of the product or service
    pub item_id: String,

    /// `product` or `service`
    pub item_type: String,

    /// Title at the time of ordering
    pub title: String,

    /// Unit price at the time of ordering
    pub price: String,

    /// Number of units
    pub quantity: u32,

    /// Display image
    pub image: Option<String>,
}

impl OrderItemResponse {
    fn from_line_item(item: LineItem, currency: &Currency) -> Result<Self, StatusError> {
        Ok(Self {
            price: format_amount(item.unit_price, currency)?,
            item_id: item.reference,
            item_type: item.kind.as_str().to_string(),
            title: item.title,
            quantity: item.quantity,
            image: item.image,
        })
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The customer who placed the order
    pub user: Uuid,

    /// Items frozen at the time of ordering
    pub items: Vec<OrderItemResponse>,

    /// Total units across all items
    pub item_count: u64,

    /// Sum of item prices before discount
    pub subtotal: String,

    /// Amount taken off by the promo code
    pub discount: String,

    /// Amount charged
    pub total_amount: String,

    /// Currency of every amount
    pub currency: String,

    /// Promo code that was applied, if any
    pub promo_code: Option<String>,

    /// Fulfilment status
    pub status: String,

    /// Payment status
    pub payment_status: String,

    /// Payment method chosen at checkout
    pub payment_method: String,

    /// Where the order ships to
    pub shipping_address: ShippingAddressBody,

    /// Customer notes
    pub notes: String,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl OrderResponse {
    pub(crate) fn from_record(order: OrderRecord, currency: &Currency) -> Result<Self, StatusError> {
        let item_count = order.item_count();

        Ok(Self {
            uuid: order.uuid.into_uuid(),
            user: order.user.into_uuid(),
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse::from_line_item(item, currency))
                .collect::<Result<_, _>>()?,
            item_count,
            subtotal: format_amount(order.subtotal, currency)?,
            discount: format_amount(order.discount, currency)?,
            total_amount: format_amount(order.total_amount, currency)?,
            currency: currency.iso_alpha_code.to_string(),
            promo_code: order.promo_code,
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            payment_method: order.payment_method,
            shipping_address: order.shipping_address.into(),
            notes: order.notes,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        })
    }

    pub(crate) fn from_records(
        orders: Vec<OrderRecord>,
        currency: &Currency,
    ) -> Result<Vec<Self>, StatusError> {
        orders
            .into_iter()
            .map(|order| Self::from_record(order, currency))
            .collect()
    }
}

/// Single Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderEnvelope {
    /// The order
    pub order: OrderResponse,
}

impl OrderEnvelope {
    pub(crate) fn from_record(order: OrderRecord, currency: &Currency) -> Result<Self, StatusError> {
        Ok(Self {
            order: OrderResponse::from_record(order, currency)?,
        })
    }
}
