use std::collections::VecDeque;

/// Bounded FIFO of recent prices for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    capacity: usize,
    prices: VecDeque<f64>,
}

impl PriceHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");

        Self {
            capacity,
            prices: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, price: f64) {
        if self.prices.len() == self.capacity {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PriceHistory;

    #[test]
    fn push_below_capacity_keeps_everything_in_order() {
        let mut history = PriceHistory::with_capacity(4);
        history.push(1.0);
        history.push(2.0);
        history.push(3.0);

        assert_eq!(history.to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(history.latest(), Some(3.0));
    }

    #[test]
    fn push_at_capacity_evicts_oldest_first() {
        let mut history = PriceHistory::with_capacity(3);
        for price in 1..=5 {
            history.push(price as f64);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn length_never_exceeds_default_capacity() {
        let mut history = PriceHistory::with_capacity(200);
        for step in 0..1_000 {
            history.push(100.0 + step as f64);
            assert!(history.len() <= 200);
        }

        assert_eq!(history.to_vec().first().copied(), Some(900.0));
    }

    #[test]
    #[should_panic(expected = "history capacity must be positive")]
    fn zero_capacity_is_rejected() {
        let _ = PriceHistory::with_capacity(0);
    }
}
