//! Replies to order-channel requests.
//!
//! The demo book is static: every symbol shows one bid level at 5000 and one ask level at
//! 5100, and every currency holds a single future position of 10. Order requests are
//! acknowledged without being matched.
use order_common::message::{BookLevel, OrderBookSnapshot, OrderStatus, Position, PositionReport};
use order_common::{ChannelError, Request};

/// Best bid price of every demo book.
pub const BID_PRICE: u64 = 5000;
/// Best ask price of every demo book.
pub const ASK_PRICE: u64 = 5100;
/// Size shown at each level.
pub const LEVEL_AMOUNT: u64 = 1;
/// Instrument kind reported by `currpos`.
pub const POSITION_KIND: &str = "future";
/// Position size reported by `currpos`.
pub const POSITION_AMOUNT: u64 = 10;

/// Snapshot pushed to subscribers and returned by `orderbook`.
pub fn snapshot(symbol: &str) -> OrderBookSnapshot {
    OrderBookSnapshot {
        symbol: String::from(symbol),
        bids: BookLevel {
            price: BID_PRICE,
            amount: LEVEL_AMOUNT,
        },
        asks: BookLevel {
            price: ASK_PRICE,
            amount: LEVEL_AMOUNT,
        },
    }
}

/// Builds the JSON reply for `request`.
///
/// `subscribe` has no direct reply (the subscriber gets periodic snapshots instead), so
/// it yields `None`.
pub fn respond(request: &Request) -> Result<Option<String>, ChannelError> {
    let reply = match request {
        Request::Subscribe(_) => return Ok(None),
        Request::Place(_) => serde_json::to_string(&status("order placed"))?,
        Request::Cancel(_) => serde_json::to_string(&status("order cancelled"))?,
        Request::Modify(_) => serde_json::to_string(&status("order modified"))?,
        Request::Orderbook(params) => serde_json::to_string(&snapshot(&params.symbol))?,
        Request::Currpos(params) => serde_json::to_string(&PositionReport {
            currency: params.currency.clone(),
            positions: Position {
                kind: String::from(POSITION_KIND),
                amount: POSITION_AMOUNT,
            },
        })?,
    };
    Ok(Some(reply))
}

fn status(text: &str) -> OrderStatus {
    OrderStatus {
        status: String::from(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"method":"place","params":{"order_id":"ETH-1","amount":2,"price":1000}}"#, r#"{"status":"order placed"}"#)]
    #[case(r#"{"method":"cancel","params":{"order_id":"ETH-1"}}"#, r#"{"status":"order cancelled"}"#)]
    #[case(r#"{"method":"modify","params":{"order_id":"ETH-1","price":990}}"#, r#"{"status":"order modified"}"#)]
    #[case(
        r#"{"method":"orderbook","params":{"symbol":"BTC-PERPETUAL"}}"#,
        r#"{"symbol":"BTC-PERPETUAL","bids":{"price":5000,"amount":1},"asks":{"price":5100,"amount":1}}"#
    )]
    #[case(
        r#"{"method":"currpos","params":{"currency":"BTC"}}"#,
        r#"{"currency":"BTC","positions":{"type":"future","amount":10}}"#
    )]
    fn replies_match_request(#[case] raw: &str, #[case] expected: &str) {
        let request = Request::from_json(raw).unwrap();
        assert_eq!(respond(&request).unwrap().as_deref(), Some(expected));
    }

    #[test]
    fn subscribe_has_no_direct_reply() {
        assert_eq!(respond(&Request::subscribe("BTC-PERPETUAL")).unwrap(), None);
    }
}
