//! Paper venue for simulated order execution.
//!
//! Acknowledges every submission and fills resting limit orders once the
//! simulated quote for their contract crosses the limit price. Market
//! orders fill on arrival.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::{VenueError, VenueGatewayPort};
use crate::domain::shared::{ContractId, VenueOrderId};
use crate::domain::trading::{OrderType, Quote, TradeInstruction};

#[derive(Debug, Default)]
struct PaperBook {
    quotes: HashMap<ContractId, Quote>,
    resting: BTreeMap<VenueOrderId, TradeInstruction>,
    fills: Vec<VenueOrderId>,
    submitted: Vec<TradeInstruction>,
}

impl PaperBook {
    fn is_marketable(&self, instruction: &TradeInstruction) -> bool {
        if instruction.order_type == OrderType::Market {
            return true;
        }
        self.quotes
            .get(&instruction.contract)
            .is_some_and(|q| q.is_crossed_by(instruction.direction, instruction.price))
    }

    fn match_resting(&mut self) {
        let crossed: Vec<_> = self
            .resting
            .iter()
            .filter(|(_, instruction)| self.is_marketable(instruction))
            .map(|(id, _)| id.clone())
            .collect();
        for venue_id in crossed {
            self.resting.remove(&venue_id);
            self.fills.push(venue_id);
        }
    }
}

/// In-process simulated venue.
#[derive(Debug, Default)]
pub struct PaperVenue {
    order_counter: AtomicU64,
    book: Mutex<PaperBook>,
}

impl PaperVenue {
    /// Create an empty venue with no quotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the quote for `contract` and fill any resting order it crosses.
    pub async fn set_quote(&self, contract: &ContractId, quote: Quote) {
        let mut book = self.book.lock().await;
        book.quotes.insert(contract.clone(), quote);
        book.match_resting();
    }

    /// Every instruction received, in arrival order.
    pub async fn submitted(&self) -> Vec<TradeInstruction> {
        self.book.lock().await.submitted.clone()
    }

    /// Number of orders resting unfilled.
    pub async fn resting_count(&self) -> usize {
        self.book.lock().await.resting.len()
    }

    fn next_order_id(&self) -> VenueOrderId {
        let n = self.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        VenueOrderId::new(format!("PAPER-{n:06}"))
    }
}

#[async_trait]
impl VenueGatewayPort for PaperVenue {
    async fn submit(&self, instruction: &TradeInstruction) -> Result<VenueOrderId, VenueError> {
        if instruction.quantity == 0 {
            return Err(VenueError::Rejected {
                reason: "quantity must be positive".to_string(),
            });
        }

        let venue_id = self.next_order_id();
        let mut book = self.book.lock().await;
        book.submitted.push(instruction.clone());
        if book.is_marketable(instruction) {
            book.fills.push(venue_id.clone());
        } else {
            book.resting.insert(venue_id.clone(), instruction.clone());
        }
        Ok(venue_id)
    }

    async fn cancel(&self, venue_id: &VenueOrderId) -> Result<(), VenueError> {
        let mut book = self.book.lock().await;
        book.resting
            .remove(venue_id)
            .map(|_| ())
            .ok_or_else(|| VenueError::NotFound {
                venue_id: venue_id.clone(),
            })
    }

    async fn drain_fills(&self) -> Result<Vec<VenueOrderId>, VenueError> {
        Ok(std::mem::take(&mut self.book.lock().await.fills))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::{Direction, Offset};
    use rust_decimal_macros::dec;

    fn contract() -> ContractId {
        ContractId::new("rb2510.SHFE")
    }

    fn limit(direction: Direction, price: rust_decimal::Decimal) -> TradeInstruction {
        TradeInstruction::limit(contract(), direction, Offset::Open, 1, price)
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let venue = PaperVenue::new();
        let a = venue.submit(&limit(Direction::Buy, dec!(1))).await.unwrap();
        let b = venue.submit(&limit(Direction::Buy, dec!(1))).await.unwrap();
        assert_eq!(a.as_str(), "PAPER-000001");
        assert_eq!(b.as_str(), "PAPER-000002");
    }

    #[tokio::test]
    async fn marketable_order_fills_on_arrival() {
        let venue = PaperVenue::new();
        venue
            .set_quote(&contract(), Quote::new(dec!(100), dec!(101), dec!(1)))
            .await;

        let id = venue.submit(&limit(Direction::Buy, dec!(102))).await.unwrap();

        assert_eq!(venue.drain_fills().await.unwrap(), vec![id]);
        assert!(venue.drain_fills().await.unwrap().is_empty());
        assert_eq!(venue.resting_count().await, 0);
    }

    #[tokio::test]
    async fn resting_order_fills_when_quote_crosses() {
        let venue = PaperVenue::new();
        let id = venue.submit(&limit(Direction::Sell, dec!(100))).await.unwrap();
        assert_eq!(venue.resting_count().await, 1);

        venue
            .set_quote(&contract(), Quote::new(dec!(99), dec!(100), dec!(1)))
            .await;
        assert!(venue.drain_fills().await.unwrap().is_empty());

        venue
            .set_quote(&contract(), Quote::new(dec!(100), dec!(101), dec!(1)))
            .await;
        assert_eq!(venue.drain_fills().await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn market_order_fills_without_quote() {
        let venue = PaperVenue::new();
        let mut instruction = limit(Direction::Buy, dec!(0));
        instruction.order_type = OrderType::Market;

        let id = venue.submit(&instruction).await.unwrap();
        assert_eq!(venue.drain_fills().await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn cancel_unknown_order_is_not_found() {
        let venue = PaperVenue::new();
        let id = venue.submit(&limit(Direction::Buy, dec!(1))).await.unwrap();

        assert!(venue.cancel(&id).await.is_ok());
        let err = venue.cancel(&id).await.unwrap_err();
        assert_eq!(err, VenueError::NotFound { venue_id: id });
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let venue = PaperVenue::new();
        let mut instruction = limit(Direction::Buy, dec!(1));
        instruction.quantity = 0;
        assert!(matches!(
            venue.submit(&instruction).await,
            Err(VenueError::Rejected { .. })
        ));
    }
}
