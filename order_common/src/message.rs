//! Wire messages exchanged over the order channel.
//!
//! Every request is a JSON object with a `method` name and a nested `params` object:
//!
//! ```text
//! {"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}
//! {"method":"place","params":{"order_id":"ETH-123456","amount":2,"price":1000}}
//! ```
//!
//! Responses are plain JSON objects whose shape depends on the request.
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Client to server request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "lowercase")]
pub enum Request {
    /// Subscribe to periodic order-book snapshots for a symbol.
    Subscribe(SubscribeParams),
    /// Place a new order.
    Place(PlaceOrderParams),
    /// Cancel an existing order.
    Cancel(CancelOrderParams),
    /// Change amount and/or price of an existing order.
    Modify(ModifyOrderParams),
    /// Request a one-off order-book snapshot.
    Orderbook(SymbolParams),
    /// Request the current position for a currency.
    Currpos(PositionParams),
}

/// Parameters of a `subscribe` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeParams {
    /// Instrument symbol, e.g. `BTC-PERPETUAL`.
    pub symbol: String,
}

/// Parameters of a `place` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderParams {
    /// Client-chosen order identifier.
    pub order_id: String,
    /// Order size.
    pub amount: u64,
    /// Limit price.
    pub price: u64,
}

/// Parameters of a `cancel` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderParams {
    /// Order to cancel.
    pub order_id: String,
}

/// Parameters of a `modify` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderParams {
    /// Order to modify.
    pub order_id: String,
    /// New size, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// New price, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

/// Parameters carrying a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolParams {
    /// Instrument symbol.
    pub symbol: String,
}

/// Parameters of a `currpos` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionParams {
    /// Settlement currency, e.g. `BTC`.
    pub currency: String,
}

impl Request {
    /// Creates a `subscribe` request.
    pub fn subscribe(symbol: &str) -> Self {
        Request::Subscribe(SubscribeParams {
            symbol: String::from(symbol),
        })
    }

    /// Creates a `place` request.
    pub fn place(order_id: &str, amount: u64, price: u64) -> Self {
        Request::Place(PlaceOrderParams {
            order_id: String::from(order_id),
            amount,
            price,
        })
    }

    /// Method name as it appears on the wire.
    pub fn method(&self) -> &'static str {
        match self {
            Request::Subscribe(_) => "subscribe",
            Request::Place(_) => "place",
            Request::Cancel(_) => "cancel",
            Request::Modify(_) => "modify",
            Request::Orderbook(_) => "orderbook",
            Request::Currpos(_) => "currpos",
        }
    }

    /// Encode the request as a JSON text frame.
    pub fn to_json(&self) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a request from a JSON text frame.
    pub fn from_json(raw: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Acknowledgement for order requests, e.g. `{"status":"order placed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Human-readable status.
    pub status: String,
}

/// One side of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Level price.
    pub price: u64,
    /// Size available at `price`.
    pub amount: u64,
}

/// Order-book snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Instrument symbol.
    pub symbol: String,
    /// Best bid.
    pub bids: BookLevel,
    /// Best ask.
    pub asks: BookLevel,
}

/// Open position summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument kind, e.g. `future`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Position size.
    pub amount: u64,
}

/// Reply to `currpos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReport {
    /// Currency the position was requested for.
    pub currency: String,
    /// Position held.
    pub positions: Position,
}
