use serde::Serialize;
use std::collections::BTreeMap;

use crate::derived::PaymentStatus;
use crate::model::Quote;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub amount: f64,
    pub advance: f64,
    pub remaining: f64,
}

impl Totals {
    fn add(&mut self, quote: &Quote) {
        self.count += 1;
        self.amount += quote.amount;
        self.advance += quote.advance_amount;
        self.remaining += quote.remaining();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub by_status: BTreeMap<PaymentStatus, Totals>,
    /// Largest billed amount first.
    pub by_client: Vec<(String, Totals)>,
    pub overall: Totals,
}

pub fn summarize(quotes: &EntityStore<Quote>) -> Summary {
    let mut by_status: BTreeMap<PaymentStatus, Totals> = BTreeMap::new();
    let mut clients: BTreeMap<String, Totals> = BTreeMap::new();
    let mut overall = Totals::default();

    for record in quotes.list() {
        let quote = &record.data;
        by_status.entry(quote.payment_status()).or_default().add(quote);
        clients.entry(quote.client.clone()).or_default().add(quote);
        overall.add(quote);
    }

    // Sort clients by total amount descending; BTreeMap order breaks ties by name
    let mut by_client: Vec<_> = clients.into_iter().collect();
    by_client.sort_by(|a, b| b.1.amount.total_cmp(&a.1.amount));

    Summary {
        by_status,
        by_client,
        overall,
    }
}
