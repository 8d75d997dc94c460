//! Cart response bodies.

use binary_craft::{items::LineItem, money::Currency};
use salvo::{Request, oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};

use binary_craft_app::domain::carts::models::CartView;

use crate::{amounts::format_amount, extensions::*};

/// Query parameter naming the promo code to price the cart with.
pub(crate) const PROMO_CODE_QUERY: &str = "promoCode";

/// The promo code requested for this cart view, if any.
pub(crate) fn requested_promo_code(req: &mut Request) -> Option<String> {
    req.query::<String>(PROMO_CODE_QUERY)
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    /// Catalog identifier of the product or service
    pub reference_id: String,

    /// `product` or `service`
    pub kind: String,

    /// Title shown to the customer
    pub title: String,

    /// Price of one unit
    pub unit_price: String,

    /// Number of units
    pub quantity: u32,

    /// `unitPrice × quantity`
    pub line_total: String,

    /// Display image
    pub image: Option<String>,
}

impl CartItemResponse {
    fn from_line_item(item: LineItem, currency: &Currency) -> Result<Self, StatusError> {
        let line_total = item
            .line_total()
            .or_500("cart line total overflowed")?;

        Ok(Self {
            unit_price: format_amount(item.unit_price, currency)?,
            line_total: format_amount(line_total, currency)?,
            reference_id: item.reference,
            kind: item.kind.as_str().to_string(),
            title: item.title,
            quantity: item.quantity,
            image: item.image,
        })
    }
}

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// Lines in the order they were first added
    pub items: Vec<CartItemResponse>,

    /// Total units across all lines
    pub item_count: u64,

    /// Sum of line totals
    pub subtotal: String,

    /// Amount taken off by the promo code
    pub discount: String,

    /// `subtotal - discount`
    pub total: String,

    /// The promo code that matched, if any
    pub promo_code: Option<String>,

    /// Currency of every amount
    pub currency: String,
}

impl CartResponse {
    pub(crate) fn from_view(view: CartView, currency: &Currency) -> Result<Self, StatusError> {
        Ok(Self {
            items: view
                .items
                .into_iter()
                .map(|item| CartItemResponse::from_line_item(item, currency))
                .collect::<Result<_, _>>()?,
            item_count: view.item_count,
            subtotal: format_amount(view.summary.subtotal, currency)?,
            discount: format_amount(view.summary.discount, currency)?,
            total: format_amount(view.summary.total, currency)?,
            promo_code: view.summary.promo_code,
            currency: currency.iso_alpha_code.to_string(),
        })
    }
}

/// Cart Envelope Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartEnvelope {
    /// The caller's cart
    pub cart: CartResponse,
}

impl CartEnvelope {
    pub(crate) fn from_view(view: CartView, currency: &Currency) -> Result<Self, StatusError> {
        Ok(Self {
            cart: CartResponse::from_view(view, currency)?,
        })
    }
}
